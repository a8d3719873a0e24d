use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::Clock;
use cb_store::fake::FakeStore;

struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(&self, _event_type: &str, _payload: Value) -> Result<(), CbError> {
        Ok(())
    }
}

fn ctx() -> EventContext {
    let clock = fixed_clock();
    let store: Arc<dyn StoreAdapter> = Arc::new(FakeStore::new(clock.clone()));
    let now = move || clock.epoch_ms();
    EventContext::new("instance-1", CallerMetadata::default(), store, Arc::new(NoopPublisher), Arc::new(now))
}

#[test]
fn now_ms_reflects_the_clock_passed_in() {
    let context = ctx();
    assert_eq!(context.now_ms(), fixed_clock().epoch_ms());
}

#[test]
fn cloning_context_is_cheap_and_shares_store() {
    let context = ctx();
    let cloned = context.clone();
    assert_eq!(Arc::strong_count(&context.store), 2);
    assert_eq!(cloned.instance_id, "instance-1");
}
