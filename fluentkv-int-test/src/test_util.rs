use fluentkv::context::Context;
use fluentkv::errors::StoreResult;
use fluentkv::store::memory::{InMemoryDataStore, InMemoryStoreConfig};
use fluentkv::store::DataStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Epoch the manual clock starts from, in milliseconds.
pub const START_MILLIS: u64 = 1_700_000_000_000;

/// Clock that only moves when a test advances it.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start_millis: u64) -> ManualClock {
        ManualClock(Arc::new(AtomicU64::new(start_millis)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct TestContext {
    store: DataStore,
    backend: InMemoryDataStore,
    clock: ManualClock,
    ctx: Context,
}

impl TestContext {
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn backend(&self) -> &InMemoryDataStore {
        &self.backend
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }
}

pub fn create_test_context() -> StoreResult<TestContext> {
    create_test_context_with(InMemoryStoreConfig::new())
}

/// Builds a context around `config`, replacing its clock with a manual one.
pub fn create_test_context_with(config: InMemoryStoreConfig) -> StoreResult<TestContext> {
    let clock = ManualClock::new(START_MILLIS);
    let source = clock.clone();
    let config = config.time_source(Arc::new(move || source.now_millis() as u128));

    let backend = InMemoryDataStore::new(config);
    let store = DataStore::new(backend.clone());
    Ok(TestContext {
        store,
        backend,
        clock,
        ctx: Context::background(),
    })
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    ctx.backend.close()
}

/// Runs `test` between `before` and `after`, always running `after` once the
/// context exists.
pub fn run_test<B, T, A>(before: B, test: T, after: A)
where
    B: Fn() -> StoreResult<TestContext>,
    T: Fn(TestContext) -> StoreResult<()>,
    A: Fn(TestContext) -> StoreResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let start_time = Instant::now();
    let test_result = test(ctx.clone());
    log::debug!("Test body finished in {:?}", start_time.elapsed());

    let after_result = after(ctx);
    if let Err(e) = test_result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

pub fn random_key(prefix: &str) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4())
}
