use super::*;

#[test]
fn every_key_carries_the_cb_prefix() {
    let k = Keys;
    assert_eq!(k.task("t-1"), "cb:task:t-1");
    assert_eq!(k.pending_queue(), "cb:queue:tasks:pending");
    assert_eq!(k.worker_queue("w1"), "cb:queue:instance:w1");
    assert_eq!(k.leader_current(), "cb:leader:current");
    assert_eq!(k.leader_lock(), "cb:leader:lock");
    assert_eq!(k.event_stream("task.created"), "cb:stream:task.created");
    assert_eq!(k.partition_list("p1"), "cb:partition:p1");
}

#[test]
fn session_keys_are_scoped_by_sid() {
    let k = Keys;
    assert_eq!(k.session_state("sess-1"), "cb:session:state:sess-1");
    assert_eq!(k.session_snapshot("sess-1", "snap-1"), "cb:snapshot:sess-1:snap-1");
    assert_eq!(k.session_snapshots("sess-1"), "cb:session:snapshots:sess-1");
}
