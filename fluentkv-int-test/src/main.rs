use fluentkv::context::Context;
use fluentkv::errors::StoreResult;
use fluentkv::store::memory::InMemoryDataStore;
use fluentkv::store::DataStore;
use fluentkv_int_test::messages::audit_event;
use rand::Rng;

fn main() -> StoreResult<()> {
    println!("Starting stress test...");
    let store = DataStore::new(InMemoryDataStore::default());
    let ctx = Context::background();
    let mut rng = rand::rng();

    let count = 200_000u64;
    let start = std::time::Instant::now();
    for i in 0..count {
        let key = format!("audit:{}", uuid::Uuid::new_v4());
        store.set(&ctx).by_key(&key).proto(&audit_event(i, "login"))?;
        store
            .increment(&ctx)
            .by_key(format_args!("hits:{}", rng.random_range(0..64)))
            .execute()?;
    }
    println!("Wrote {} entries in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut scanned = 0u64;
    store
        .enumerate(&ctx)
        .by_prefix("audit:")
        .with_batch_size(1000)
        .only_keys()
        .for_each(|_| {
            scanned += 1;
            true
        })?;
    println!("Scanned {} keys in {:?}", scanned, start.elapsed());

    let mut hits = 0u64;
    store.enumerate(&ctx).by_prefix("hits:").for_each_counter(|entry| {
        hits += entry.value;
        true
    })?;
    assert_eq!(hits, count);
    println!("Stress test finished");
    Ok(())
}
