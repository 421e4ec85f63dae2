use fluentkv::entry::RawEntry;
use fluentkv::errors::{ErrorKind, StoreResult};
use fluentkv_int_test::messages::{audit_event, AuditEvent};
use fluentkv_int_test::test_util::{cleanup, create_test_context, run_test, TestContext};

fn seed_users(ctx: &TestContext) -> StoreResult<()> {
    for name in ["user:carol", "user:alice", "user:dave", "user:bob", "team:red", "userx"] {
        ctx.store().set(ctx.ctx()).by_key(name).string(name)?;
    }
    Ok(())
}

fn key_of(entry: &RawEntry) -> String {
    String::from_utf8_lossy(&entry.key).into_owned()
}

#[test]
fn test_enumerate_prefix_in_key_order() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut keys = Vec::new();
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .for_each(|entry| {
                    assert_eq!(entry.value, entry.key);
                    keys.push(key_of(&entry));
                    true
                })?;
            assert_eq!(keys, vec!["user:alice", "user:bob", "user:carol", "user:dave"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_reverse() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut keys = Vec::new();
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .reverse()
                .with_batch_size(3)
                .for_each(|entry| {
                    keys.push(key_of(&entry));
                    true
                })?;
            assert_eq!(keys, vec!["user:dave", "user:carol", "user:bob", "user:alice"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_stops_after_two_calls() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut calls = 0;
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .with_batch_size(1)
                .for_each(|_| {
                    calls += 1;
                    calls < 2
                })?;
            assert_eq!(calls, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_small_batches_visit_everything_once() {
    run_test(
        create_test_context,
        |ctx| {
            for i in 0..25 {
                ctx.store()
                    .set(ctx.ctx())
                    .by_key(format_args!("item:{:03}", i))
                    .counter(i)?;
            }
            for batch_size in [1, 2, 7, 25, 100] {
                let mut seen = Vec::new();
                ctx.store()
                    .enumerate(ctx.ctx())
                    .by_prefix("item:")
                    .with_batch_size(batch_size)
                    .for_each_counter(|entry| {
                        seen.push(entry.value);
                        true
                    })?;
                assert_eq!(seen, (0..25).collect::<Vec<u64>>());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_seek() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut forward = Vec::new();
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .seek("user:b")
                .for_each(|entry| {
                    forward.push(key_of(&entry));
                    true
                })?;
            assert_eq!(forward, vec!["user:bob", "user:carol", "user:dave"]);

            let mut backward = Vec::new();
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .seek("user:carol")
                .reverse()
                .for_each(|entry| {
                    backward.push(key_of(&entry));
                    true
                })?;
            assert_eq!(backward, vec!["user:carol", "user:bob", "user:alice"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_only_keys() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut values_empty = true;
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("user:")
                .only_keys()
                .for_each(|entry| {
                    values_empty &= entry.value.is_empty();
                    true
                })?;
            assert!(values_empty);

            let keys = ctx.store().enumerate(ctx.ctx()).by_prefix("team:").keys()?;
            assert_eq!(keys, vec![b"team:red".to_vec()]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_skips_expired() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("tmp:a").with_ttl(5).string("a")?;
            store.set(ctx.ctx()).by_key("tmp:b").string("b")?;
            store.set(ctx.ctx()).by_key("tmp:c").with_ttl(50).string("c")?;
            ctx.clock().advance_secs(10);

            let mut seen = Vec::new();
            store.enumerate(ctx.ctx()).by_prefix("tmp:").for_each(|entry| {
                seen.push((key_of(&entry), entry.ttl));
                true
            })?;
            assert_eq!(
                seen,
                vec![("tmp:b".to_string(), None), ("tmp:c".to_string(), Some(40))]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_proto() {
    run_test(
        create_test_context,
        |ctx| {
            for id in 1..=3u64 {
                ctx.store()
                    .set(ctx.ctx())
                    .by_key(format_args!("audit:{}", id))
                    .proto(&audit_event(id, "login"))?;
            }
            let mut ids = Vec::new();
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("audit:")
                .reverse()
                .for_each_proto::<AuditEvent, _>(|entry| {
                    ids.push(entry.value.id);
                    true
                })?;
            assert_eq!(ids, vec![3, 2, 1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_proto_aborts_on_bad_value() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("audit:1").proto(&audit_event(1, "login"))?;
            store.set(ctx.ctx()).by_key("audit:2").binary(vec![0x12, 0x40])?;
            store.set(ctx.ctx()).by_key("audit:3").proto(&audit_event(3, "logout"))?;

            let mut ids = Vec::new();
            let err = store
                .enumerate(ctx.ctx())
                .by_prefix("audit:")
                .for_each_proto::<AuditEvent, _>(|entry| {
                    ids.push(entry.value.id);
                    true
                })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::EncodingError);
            assert_eq!(ids, vec![1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_enumerate_empty_range() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let mut calls = 0;
            ctx.store()
                .enumerate(ctx.ctx())
                .by_prefix("nobody:")
                .for_each(|_| {
                    calls += 1;
                    true
                })?;
            assert_eq!(calls, 0);
            Ok(())
        },
        cleanup,
    )
}
