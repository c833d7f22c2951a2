use mongish::collection::{CreateOptions, ForceFields};
use mongish::common::{Value, DOC_CREATED, DOC_UPDATED};
use mongish::doc;
use mongish::errors::ErrorKind;
use mongish::reference::{Projection, ReferenceSpec};
use mongish::Mongish;
use mongish_int_test::test_util::{cleanup, create_test_context, create_user, id_of, now, run_test, TestContext};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn force_email() -> CreateOptions {
    CreateOptions::new().force(ForceFields::new().field("primaryEmail"))
}

#[test]
fn test_duplicate_email_resolution() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.users()?;

            let bob = users.create(doc! { primaryEmail: "a@x.com", username: "bob" }, CreateOptions::new())?;
            assert!(bob.contains_key(DOC_CREATED));
            assert!(bob.contains_key(DOC_UPDATED));

            let err = users
                .create(doc! { primaryEmail: "a@x.com", username: "carl" }, CreateOptions::new())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::WriteConflict);
            assert!(err.conflict().unwrap().detail().contains("index: primaryEmail_1"));

            let carl = users.create(doc! { primaryEmail: "a@x.com", username: "carl" }, force_email())?;
            assert_eq!(carl.get("primaryEmail"), Value::from("a@x.com-1"));
            assert_eq!(carl.get("username"), Value::from("carl"));
            assert_eq!(users.count(&doc! {})?, 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_create_timestamps_within_call_window() {
    run_test(
        || create_test_context(),
        |ctx| {
            let before = now();
            let bob = create_user(&ctx, "bob")?;
            let after = now();

            for field in [DOC_CREATED, DOC_UPDATED] {
                let stamp = *bob.get(field).as_date_time().unwrap();
                assert!(before <= stamp && stamp <= after);
            }

            let supplied = ctx.users()?.create(
                doc! { username: "old", created: (before), updated: "never" },
                CreateOptions::new(),
            )?;
            assert_eq!(supplied.get(DOC_CREATED), Value::from(before));
            assert_eq!(supplied.get(DOC_UPDATED), Value::from("never"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_force_create_sequence() {
    run_test(
        || create_test_context(),
        |ctx: TestContext| {
            let users = ctx.users()?;
            let mut emails = Vec::new();
            for name in ["u1", "u2", "u3", "u4"] {
                let user = users.create(doc! { primaryEmail: "same@x.com", username: name }, force_email())?;
                emails.push(user.get("primaryEmail").to_text());
            }
            assert_eq!(
                emails,
                vec!["same@x.com", "same@x.com-1", "same@x.com-1-2", "same@x.com-1-2-3"]
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_force_on_compound_index() {
    run_test(
        || create_test_context(),
        |ctx| {
            let categories = ctx.db().collection("category")?;
            let force_slug = || CreateOptions::new().force(ForceFields::new().field("slug"));

            categories.create(doc! { owner: "ann", slug: "news" }, CreateOptions::new())?;
            categories.create(doc! { owner: "bob", slug: "news" }, CreateOptions::new())?;
            let renamed = categories.create(doc! { owner: "ann", slug: "news" }, force_slug())?;
            assert_eq!(renamed.get("slug"), Value::from("news-1"));

            let err = categories
                .create(
                    doc! { owner: "ann", slug: "news" },
                    CreateOptions::new().force(ForceFields::new().field("title")),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::WriteConflict);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_retry_limit() {
    run_test(
        || {
            let ctx = create_test_context()?;
            ctx.db().config().set_max_write_attempts(3)?;
            Ok(ctx)
        },
        |ctx| {
            let users = ctx.users()?;
            for email in ["x@x.com", "x@x.com-1", "x@x.com-1-2"] {
                users.create(doc! { primaryEmail: email }, CreateOptions::new())?;
            }

            let err = users.create(doc! { primaryEmail: "x@x.com" }, force_email()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::RetryLimitExceeded);
            assert!(err.cause().unwrap().is_write_conflict());
            assert_eq!(users.count(&doc! {})?, 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_create_with_inflate() {
    run_test(
        || create_test_context(),
        |ctx| {
            let ann = create_user(&ctx, "ann")?;
            let spec = ReferenceSpec::new().reference("author", Projection::new("user").copy("username"));
            let posts = ctx.db().collection("post")?;

            let post = posts.create(
                doc! { title: "hello", author_id: (id_of(&ann)) },
                CreateOptions::new().inflate(spec.clone()),
            )?;
            assert_eq!(post.get("author.username"), Value::from("ann"));
            assert_eq!(post.get("author._id"), id_of(&ann));
            assert!(!post.contains_key("author_id"));

            // the stored document still holds the raw id
            let stored = posts.store_collection().find_one(&doc! { title: "hello" })?.unwrap();
            assert_eq!(stored.get("author_id"), id_of(&ann));

            let orphan = posts.create(doc! { title: "orphan" }, CreateOptions::new().inflate(spec))?;
            assert_eq!(orphan.missing(), vec!["author"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_create_on_closed_store() {
    let db = Mongish::builder().open().unwrap();
    let users = db.add("user", mongish::CollectionConfig::new()).unwrap();
    db.close().unwrap();
    let err = users.create(doc! { username: "bob" }, CreateOptions::new()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StoreFailure);
}
