use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;
use parking_lot::Mutex;

struct RecordingHandler {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: Event) {
        self.seen.lock().push(event.event_type);
    }
}

#[tokio::test]
async fn subscription_decodes_published_events_by_exact_type() {
    let clock = fixed_clock();
    let store = FakeStore::new(clock.clone());
    let mut subscription = EventSubscription::bind(&store, "task.created").await.expect("bind succeeds");

    let event = Event::new(cb_core::EventId::from("evt-1"), "task.created", serde_json::json!({}), clock.epoch_ms());
    let json = serde_json::to_string(&event).expect("event serializes");
    store.publish("task.created", &json).await.expect("publish succeeds");

    let received = subscription.recv().await.expect("a message was delivered");
    assert_eq!(received.event_type, "task.created");
}

#[tokio::test]
async fn subscription_ignores_non_matching_channels() {
    let clock = fixed_clock();
    let store = FakeStore::new(clock.clone());
    let mut subscription = EventSubscription::bind(&store, "task.created").await.expect("bind succeeds");
    store.publish("task.completed", "{}").await.expect("publish succeeds");

    let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), subscription.recv()).await;
    assert!(timed_out.is_err());
}

#[tokio::test]
async fn dispatcher_delivers_every_event_to_the_handler() {
    let clock = fixed_clock();
    let store = FakeStore::new(clock.clone());
    let subscription = EventSubscription::bind(&store, "task.*").await.expect("bind succeeds");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(RecordingHandler { seen: seen.clone() });
    let dispatcher = Dispatcher::new(4);

    let run = tokio::spawn(async move {
        dispatcher.run(subscription, handler).await;
    });

    for n in 0..3 {
        let event = Event::new(cb_core::EventId::from(format!("evt-{n}")), "task.created", serde_json::json!({"n": n}), clock.epoch_ms());
        let json = serde_json::to_string(&event).expect("event serializes");
        store.publish("task.created", &json).await.expect("publish succeeds");
    }

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(seen.lock().len(), 3);
    run.abort();
}
