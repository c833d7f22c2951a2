use mongish::collection::{ForceFields, Update, UpdateOptions};
use mongish::common::{Value, DOC_CREATED, DOC_UPDATED};
use mongish::doc;
use mongish::errors::ErrorKind;
use mongish_int_test::test_util::{cleanup, create_test_context, create_user, id_of, run_test};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_update_refreshes_updated_only() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.users()?;
            let bob = create_user(&ctx, "bob")?;
            let filter = doc! { "_id": (id_of(&bob)) };

            let result = users.update(&filter, Update::new().set("age", 41)?, UpdateOptions::new())?;
            assert_eq!(result.matched, 1);
            assert_eq!(result.modified, 1);

            let stored = users.read(&filter, Default::default())?.unwrap();
            assert_eq!(stored.get("age"), Value::from(41));
            assert_eq!(stored.get(DOC_CREATED), bob.get(DOC_CREATED));
            assert!(stored.get(DOC_UPDATED) >= bob.get(DOC_UPDATED));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_without_match() {
    run_test(
        || create_test_context(),
        |ctx| {
            let result = ctx.users()?.update(
                &doc! { username: "nobody" },
                Update::new().set("age", 1)?,
                UpdateOptions::new(),
            )?;
            assert_eq!(result.matched, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_conflict_resolution() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.users()?;
            create_user(&ctx, "bob")?;
            create_user(&ctx, "carl")?;

            let rename = || Update::new().set("username", "bob");
            let err = users
                .update(&doc! { username: "carl" }, rename()?, UpdateOptions::new())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::WriteConflict);
            assert_eq!(users.count(&doc! { username: "carl" })?, 1);

            let force = UpdateOptions::new().force(ForceFields::new().field("username"));
            users.update(&doc! { username: "carl" }, rename()?, force)?;
            assert!(users.available(&doc! { username: "carl" })?);
            assert!(!users.available(&doc! { username: "bob-1" })?);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_force_requires_first_index_field() {
    run_test(
        || create_test_context(),
        |ctx| {
            let categories = ctx.db().collection("category")?;
            categories.create(doc! { owner: "ann", slug: "news" }, Default::default())?;
            categories.create(doc! { owner: "ann", slug: "tech" }, Default::default())?;

            let options = UpdateOptions::new().force(ForceFields::new().field("slug"));
            let err = categories
                .update(&doc! { slug: "tech" }, Update::new().set("slug", "news")?, options)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::WriteConflict);

            let options = UpdateOptions::new().force(ForceFields::new().field("owner").field("slug"));
            let update = Update::new().set("owner", "ann")?.set("slug", "news")?;
            categories.update(&doc! { slug: "tech" }, update, options)?;
            assert_eq!(categories.count(&doc! { owner: "ann-1", slug: "news" })?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
