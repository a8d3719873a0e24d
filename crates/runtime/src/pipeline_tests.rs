use super::*;
use crate::context::CallerMetadata;
use cb_core::test_support::fixed_clock;
use cb_core::{Clock, ErrorKind};
use cb_store::fake::FakeStore;
use cb_store::StoreAdapter;
use std::sync::atomic::{AtomicU32, Ordering};

struct NoopPublisher;

#[async_trait::async_trait]
impl crate::context::Publisher for NoopPublisher {
    async fn publish(&self, _event_type: &str, _payload: Value) -> Result<(), CbError> {
        Ok(())
    }
}

struct CountingPersist {
    calls: Arc<AtomicU32>,
}

#[async_trait::async_trait]
impl PersistHook for CountingPersist {
    async fn persist(&self, _event_type: &str, _params: &Value, _result: &Value) -> Result<(), CbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct EchoHandler;

#[async_trait::async_trait]
impl Handler for EchoHandler {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        Ok(params)
    }
}

struct AlwaysFailsHandler;

#[async_trait::async_trait]
impl Handler for AlwaysFailsHandler {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        Err(CbError::internal("boom"))
    }
}

struct HangsHandler;

#[async_trait::async_trait]
impl Handler for HangsHandler {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Value::Null)
    }
}

fn ctx() -> EventContext {
    let clock = fixed_clock();
    let store: Arc<dyn StoreAdapter> = Arc::new(FakeStore::new(clock.clone()));
    let now = move || clock.epoch_ms();
    EventContext::new("instance-1", CallerMetadata::default(), store, Arc::new(NoopPublisher), Arc::new(now))
}

#[tokio::test]
async fn a_plain_call_round_trips_through_the_body() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry { descriptor: HandlerDescriptor::new("echo.call", "echoes params"), handler: Arc::new(EchoHandler), persist_hook: None };
    let params = serde_json::json!({"text": "hi"});
    let result = runtime.execute(&entry, params.clone(), &ctx()).await.expect("call succeeds");
    assert_eq!(result, params);
}

#[tokio::test]
async fn invalid_params_are_rejected_before_the_body_runs() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let schema = serde_json::json!({"type": "object", "required": ["text"]});
    let entry = Entry {
        descriptor: HandlerDescriptor::new("echo.call", "echoes params").with_input_schema(schema),
        handler: Arc::new(EchoHandler),
        persist_hook: None,
    };
    let err = runtime.execute(&entry, serde_json::json!({}), &ctx()).await.expect_err("missing required field");
    assert_eq!(err.kind, ErrorKind::InvalidParams);
}

#[tokio::test]
async fn calls_past_the_limit_are_rate_limited() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("echo.call", "echoes params").with_rate_limit(2),
        handler: Arc::new(EchoHandler),
        persist_hook: None,
    };
    let context = ctx();
    runtime.execute(&entry, Value::Null, &context).await.expect("first call admitted");
    runtime.execute(&entry, Value::Null, &context).await.expect("second call admitted");
    let err = runtime.execute(&entry, Value::Null, &context).await.expect_err("third call exceeds the limit");
    assert_eq!(err.kind, ErrorKind::RateLimited);
}

#[tokio::test]
async fn a_handler_that_never_returns_times_out() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("slow.call", "never returns").with_timeout(Duration::from_millis(10)),
        handler: Arc::new(HangsHandler),
        persist_hook: None,
    };
    let err = runtime.execute(&entry, Value::Null, &ctx()).await.expect_err("handler times out");
    assert_eq!(err.kind, ErrorKind::Timeout);
}

#[tokio::test]
async fn repeated_failures_open_the_breaker() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("boom.call", "always fails").with_circuit_breaker(2, Duration::from_secs(30)),
        handler: Arc::new(AlwaysFailsHandler),
        persist_hook: None,
    };
    let context = ctx();
    for _ in 0..2 {
        let err = runtime.execute(&entry, Value::Null, &context).await.expect_err("body fails");
        assert_eq!(err.kind, ErrorKind::Internal);
    }
    let err = runtime.execute(&entry, Value::Null, &context).await.expect_err("breaker is now open");
    assert_eq!(err.kind, ErrorKind::CircuitOpen);
}

#[tokio::test]
async fn an_open_breaker_with_a_fallback_returns_it_instead_of_an_error() {
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("task.claim", "claims a task")
            .with_circuit_breaker(2, Duration::from_secs(30))
            .with_fallback(serde_json::json!({"claimed": false})),
        handler: Arc::new(AlwaysFailsHandler),
        persist_hook: None,
    };
    let context = ctx();
    for _ in 0..2 {
        runtime.execute(&entry, Value::Null, &context).await.expect_err("body fails");
    }
    let result = runtime.execute(&entry, Value::Null, &context).await.expect("breaker open but fallback declared");
    assert_eq!(result, serde_json::json!({"claimed": false}));
}

#[tokio::test]
async fn a_cached_result_skips_a_second_body_invocation() {
    struct CountingHandler(Arc<AtomicU32>);
    #[async_trait::async_trait]
    impl Handler for CountingHandler {
        async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(params)
        }
    }

    let calls = Arc::new(AtomicU32::new(0));
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("cached.call", "cacheable").with_cache_ttl(Duration::from_secs(30)),
        handler: Arc::new(CountingHandler(calls.clone())),
        persist_hook: None,
    };
    let context = ctx();
    let params = serde_json::json!({"id": "t-1"});
    runtime.execute(&entry, params.clone(), &context).await.expect("first call runs the body");
    runtime.execute(&entry, params, &context).await.expect("second call hits the cache");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_successful_persisted_call_invokes_its_persist_hook() {
    let calls = Arc::new(AtomicU32::new(0));
    let runtime = HandlerRuntime::new(Duration::from_secs(60));
    let entry = Entry {
        descriptor: HandlerDescriptor::new("task.create", "creates a task").persisted(),
        handler: Arc::new(EchoHandler),
        persist_hook: Some(Arc::new(CountingPersist { calls: calls.clone() })),
    };
    runtime.execute(&entry, serde_json::json!({"text": "hi"}), &ctx()).await.expect("call succeeds");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
