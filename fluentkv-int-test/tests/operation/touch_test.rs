use fluentkv_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_ttl_expires_entry() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("session").with_ttl(30).string("token")?;

            ctx.clock().advance_secs(29);
            assert_eq!(store.get(ctx.ctx()).by_key("session").to_string()?, "token");

            ctx.clock().advance_secs(1);
            assert_eq!(store.get(ctx.ctx()).by_key("session").to_binary()?, None);
            assert!(store
                .get(ctx.ctx())
                .by_key("session")
                .required()
                .to_string()
                .unwrap_err()
                .is_not_found());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_entry_reports_remaining_ttl() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("k").with_ttl(100).string("v")?;
            store.set(ctx.ctx()).by_key("forever").string("v")?;
            ctx.clock().advance_secs(40);

            let entry = store.get(ctx.ctx()).by_key("k").to_entry()?.into_option();
            assert_eq!(entry.and_then(|entry| entry.ttl), Some(60));
            let entry = store.get(ctx.ctx()).by_key("forever").to_entry()?.into_option();
            assert_eq!(entry.map(|entry| entry.ttl), Some(None));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_touch_extends_expiry() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("session").with_ttl(10).string("token")?;
            let before = store.get(ctx.ctx()).by_key("session").required().to_entry()?;

            ctx.clock().advance_secs(8);
            store.touch(ctx.ctx()).by_key("session").with_ttl(10).execute()?;
            ctx.clock().advance_secs(8);
            let after = store.get(ctx.ctx()).by_key("session").required().to_entry()?;

            let (before, after) = (before.into_option().unwrap(), after.into_option().unwrap());
            assert_eq!(after.value, b"token".to_vec());
            assert_eq!(after.ttl, Some(2));
            assert_eq!(after.version, before.version);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_touch_zero_removes_expiry() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.set(ctx.ctx()).by_key("k").with_ttl(5).string("v")?;
            store.touch(ctx.ctx()).by_key("k").execute()?;
            ctx.clock().advance_secs(3600);
            assert_eq!(store.get(ctx.ctx()).by_key("k").to_string()?, "v");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_touch_missing_key_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let err = store.touch(ctx.ctx()).by_key("missing").with_ttl(5).execute().unwrap_err();
            assert!(err.is_not_found());

            store.set(ctx.ctx()).by_key("gone").with_ttl(1).string("v")?;
            ctx.clock().advance_secs(2);
            let err = store.touch(ctx.ctx()).by_key("gone").with_ttl(5).execute().unwrap_err();
            assert!(err.is_not_found());
            Ok(())
        },
        cleanup,
    )
}
