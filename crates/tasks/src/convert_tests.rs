use super::*;

fn fields() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("id".to_string(), "t-1".to_string());
    m.insert("text".to_string(), "do it".to_string());
    m.insert("priority".to_string(), "70".to_string());
    m.insert("status".to_string(), "in_progress".to_string());
    m.insert("metadata".to_string(), "{\"k\":1}".to_string());
    m.insert("createdAt".to_string(), "2026-01-01T00:00:00Z".to_string());
    m.insert("createdAtMs".to_string(), "1700000000000".to_string());
    m.insert("updatedAt".to_string(), "2026-01-01T00:00:01Z".to_string());
    m.insert("assignedTo".to_string(), "w1".to_string());
    m.insert("deny".to_string(), "[\"w2\"]".to_string());
    m
}

#[test]
fn maps_camel_case_hash_into_task() {
    let task = task_from_fields(&fields()).expect("conversion succeeds");
    assert_eq!(task.id, "t-1");
    assert_eq!(task.priority, 70);
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.assigned_to.as_deref(), Some("w1"));
    assert_eq!(task.deny, vec!["w2".to_string()]);
    assert_eq!(task.metadata, serde_json::json!({"k": 1}));
}

#[test]
fn empty_fields_is_not_found() {
    let err = task_from_fields(&HashMap::new()).expect_err("empty hash is not found");
    assert!(matches!(err, TaskError::NotFound));
}

#[test]
fn blank_optional_fields_become_none() {
    let mut f = fields();
    f.insert("assignedTo".to_string(), String::new());
    let task = task_from_fields(&f).expect("conversion succeeds");
    assert_eq!(task.assigned_to, None);
}
