use fluentkv::context::Context;
use fluentkv::errors::ErrorKind;
use fluentkv::store::memory::InMemoryStoreConfig;
use fluentkv_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, run_test,
};
use std::time::Duration;

#[test]
fn test_closed_store_rejects_operations() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.store().set(ctx.ctx()).by_key("k").string("v")?;
            ctx.backend().close()?;

            let err = ctx.store().get(ctx.ctx()).by_key("k").to_string().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
            let err = ctx.store().set(ctx.ctx()).by_key("k").string("v").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
            let err = ctx.store().enumerate(ctx.ctx()).for_each(|_| true).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_read_only_store_rejects_writes() {
    run_test(
        || create_test_context_with(InMemoryStoreConfig::new().read_only(true)),
        |ctx| {
            let store = ctx.store();
            let err = store.set(ctx.ctx()).by_key("k").string("v").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ReadOnlyTransaction);
            let err = store.increment(ctx.ctx()).by_key("k").execute().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ReadOnlyTransaction);
            assert_eq!(store.get(ctx.ctx()).by_key("k").to_binary()?, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_size_limits() {
    run_test(
        || {
            create_test_context_with(
                InMemoryStoreConfig::new().max_key_size(8).max_value_size(4),
            )
        },
        |ctx| {
            let store = ctx.store();
            let err = store.set(ctx.ctx()).by_key("much-too-long").string("v").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidKey);
            let err = store.set(ctx.ctx()).by_key("k").string("12345").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidRequest);
            let err = store.set(ctx.ctx()).by_key("").string("v").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::EmptyKey);
            store.set(ctx.ctx()).by_key("k").string("1234")?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cancelled_context_fails_every_operation() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("k").counter(1)?;

            let cancelled = ctx.ctx().with_cancel();
            cancelled.cancel();
            assert!(store.get(&cancelled).by_key("k").to_counter().unwrap_err().is_cancelled());
            assert!(store.set(&cancelled).by_key("k").counter(2).unwrap_err().is_cancelled());
            assert!(store
                .compare_and_set(&cancelled)
                .by_key("k")
                .counter(2)
                .unwrap_err()
                .is_cancelled());
            assert!(store.increment(&cancelled).by_key("k").execute().unwrap_err().is_cancelled());
            assert!(store.touch(&cancelled).by_key("k").execute().unwrap_err().is_cancelled());
            assert!(store
                .enumerate(&cancelled)
                .for_each(|_| true)
                .unwrap_err()
                .is_cancelled());

            assert_eq!(store.get(ctx.ctx()).by_key("k").to_counter()?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cancel_mid_enumeration() {
    run_test(
        create_test_context,
        |ctx| {
            for i in 0..10 {
                ctx.store().set(ctx.ctx()).by_key(format_args!("n:{}", i)).counter(i)?;
            }
            let scoped = ctx.ctx().with_cancel();
            let mut calls = 0;
            let err = ctx
                .store()
                .enumerate(&scoped)
                .by_prefix("n:")
                .with_batch_size(3)
                .for_each(|_| {
                    calls += 1;
                    if calls == 3 {
                        scoped.cancel();
                    }
                    true
                })
                .unwrap_err();
            assert!(err.is_cancelled());
            assert_eq!(calls, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_expired_deadline() {
    run_test(
        create_test_context,
        |ctx| {
            let expired = Context::background().with_timeout(Duration::ZERO);
            let err = ctx.store().get(&expired).by_key("k").to_binary().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DeadlineExceeded);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_len_ignores_expired_entries() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.store().set(ctx.ctx()).by_key("a").with_ttl(1).string("a")?;
            ctx.store().set(ctx.ctx()).by_key("b").string("b")?;
            assert_eq!(ctx.backend().len()?, 2);
            ctx.clock().advance_secs(2);
            assert_eq!(ctx.backend().len()?, 1);
            assert!(!ctx.backend().is_empty()?);
            Ok(())
        },
        cleanup,
    )
}
