use fluentkv_int_test::messages::{audit_event, AuditEvent};
use fluentkv_int_test::test_util::{cleanup, create_test_context, run_test};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_version_zero_creates_only_when_absent() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            assert!(store.compare_and_set(ctx.ctx()).by_key("lock").string("owner-a")?);
            assert!(!store.compare_and_set(ctx.ctx()).by_key("lock").string("owner-b")?);
            assert_eq!(store.get(ctx.ctx()).by_key("lock").to_string()?, "owner-a");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_matching_version_applies_once() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("doc").proto(&audit_event(1, "create"))?;
            let version = store
                .get(ctx.ctx())
                .by_key("doc")
                .required()
                .to_entry()?
                .into_option()
                .map(|entry| entry.version)
                .unwrap_or_default();

            let applied = store
                .compare_and_set(ctx.ctx())
                .by_key("doc")
                .with_version(version)
                .proto(&audit_event(1, "update"))?;
            assert!(applied);

            let stale = store
                .compare_and_set(ctx.ctx())
                .by_key("doc")
                .with_version(version)
                .proto(&audit_event(1, "lost-update"))?;
            assert!(!stale);

            let current = store.get(ctx.ctx()).by_key("doc").to_proto::<AuditEvent>()?;
            assert_eq!(current.map(|event| event.action), Some("update".to_string()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_wrong_version_on_absent_key_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let applied = store
                .compare_and_set(ctx.ctx())
                .by_key("ghost")
                .with_version(7)
                .counter(1)?;
            assert!(!applied);
            assert_eq!(store.get(ctx.ctx()).by_key("ghost").to_binary()?, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cas_applies_ttl() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            assert!(store
                .compare_and_set(ctx.ctx())
                .by_key("lease")
                .with_ttl(10)
                .binary(vec![1])?);
            ctx.clock().advance_secs(11);
            assert!(store
                .compare_and_set(ctx.ctx())
                .by_key("lease")
                .with_ttl(10)
                .binary(vec![2])?);
            assert_eq!(store.get(ctx.ctx()).by_key("lease").to_binary()?, Some(vec![2]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_cas_has_single_winner() {
    run_test(
        create_test_context,
        |ctx| {
            let num_threads = 8;
            let barrier = Arc::new(Barrier::new(num_threads));
            let winners = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let ctx = ctx.clone();
                    let barrier = Arc::clone(&barrier);
                    let winners = Arc::clone(&winners);
                    thread::spawn(move || {
                        barrier.wait();
                        let applied = ctx
                            .store()
                            .compare_and_set(ctx.ctx())
                            .by_key("leader")
                            .string(format!("thread-{}", thread_id))
                            .unwrap_or(false);
                        if applied {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();

            for handle in handles {
                let _ = handle.join();
            }

            assert_eq!(winners.load(Ordering::SeqCst), 1);
            let leader = ctx.store().get(ctx.ctx()).by_key("leader").to_string()?;
            assert!(leader.starts_with("thread-"));
            Ok(())
        },
        cleanup,
    )
}
