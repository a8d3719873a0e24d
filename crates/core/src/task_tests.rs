use super::*;
use yare::parameterized;

#[parameterized(
    pending_to_in_progress = { TaskStatus::Pending, TaskStatus::InProgress, true },
    in_progress_to_completed = { TaskStatus::InProgress, TaskStatus::Completed, true },
    in_progress_to_failed = { TaskStatus::InProgress, TaskStatus::Failed, true },
    failed_to_pending = { TaskStatus::Failed, TaskStatus::Pending, true },
    in_progress_to_pending = { TaskStatus::InProgress, TaskStatus::Pending, true },
    completed_is_a_sink = { TaskStatus::Completed, TaskStatus::Pending, false },
    pending_cannot_skip_to_completed = { TaskStatus::Pending, TaskStatus::Completed, false },
    failed_cannot_go_to_completed_directly = { TaskStatus::Failed, TaskStatus::Completed, false },
)]
fn transition_rules(from: TaskStatus, to: TaskStatus, allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[test]
fn pending_score_is_negated_priority_so_highest_priority_sorts_first() {
    assert!(Task::pending_score(90) < Task::pending_score(50));
    assert!(Task::pending_score(50) < Task::pending_score(10));
}

#[test]
fn is_denied_checks_membership() {
    let task = Task::builder().deny(vec!["w1".to_string()]).build();
    assert!(task.is_denied("w1"));
    assert!(!task.is_denied("w2"));
}

#[test]
fn is_terminal_only_for_completed() {
    let mut task = Task::builder().status(TaskStatus::Failed).build();
    assert!(!task.is_terminal());
    task.status = TaskStatus::Completed;
    assert!(task.is_terminal());
}
