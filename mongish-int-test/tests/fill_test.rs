use mongish::collection::{order_by, CreateOptions, Document, FillOptions, ListOptions, SortOrder};
use mongish::common::Value;
use mongish::doc;
use mongish::errors::ErrorKind;
use mongish::reference::{Projection, ReferenceSpec};
use mongish_int_test::test_util::{cleanup, create_test_context, create_user, id_of, run_test, TestContext};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn parent_with_children(ctx: &TestContext, count: i64) -> mongish::errors::MongishResult<Document> {
    let parent = create_user(ctx, &format!("parent-{}", uuid::Uuid::new_v4()))?;
    let children = ctx.db().collection("child")?;
    for n in 0..count {
        children.create(doc! { n: n, parent_id: (id_of(&parent)) }, CreateOptions::new())?;
    }
    Ok(parent)
}

fn attached_numbers(document: &Document, key: &str) -> Vec<Value> {
    match document.get(key).as_array() {
        Some(items) => items
            .iter()
            .filter_map(|item| item.as_document().map(|d| d.get("n")))
            .collect(),
        None => Vec::new(),
    }
}

#[test]
fn test_fill_children() {
    run_test(
        || create_test_context(),
        |ctx| {
            let parent = parent_with_children(&ctx, 5)?;
            let filled = ctx.db().fill_one(parent, "child", "parent_id", FillOptions::new(), doc! {})?;

            assert_eq!(filled.get("child").as_array().map(|a| a.len()), Some(5));
            assert_eq!(filled.get("child_cnt"), Value::from(5));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_count_matches_list() {
    run_test(
        || create_test_context(),
        |ctx| {
            let owners = vec![
                parent_with_children(&ctx, 0)?,
                parent_with_children(&ctx, 3)?,
                parent_with_children(&ctx, 7)?,
            ];
            let filled = ctx.db().fill_many(owners, "child", "parent_id", FillOptions::new(), doc! {})?;

            let counts: Vec<Value> = filled.iter().map(|d| d.get("child_cnt")).collect();
            assert_eq!(counts, vec![Value::from(0), Value::from(3), Value::from(7)]);
            for owner in filled.iter() {
                let listed = owner.get("child").as_array().map(|a| a.len()).unwrap_or_default();
                assert_eq!(Value::from(listed), owner.get("child_cnt"));
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_reverse() {
    run_test(
        || create_test_context(),
        |ctx| {
            let parent = parent_with_children(&ctx, 6)?;
            let sorted = FillOptions::new().list(ListOptions::new().find(order_by("n", SortOrder::Ascending)));

            let forward = ctx.db().fill_one(parent.clone(), "child", "parent_id", sorted.clone(), doc! {})?;
            let backward = ctx.db().fill_one(parent, "child", "parent_id", sorted.reverse(true), doc! {})?;

            let mut expected = attached_numbers(&forward, "child");
            expected.reverse();
            assert_eq!(attached_numbers(&backward, "child"), expected);
            assert_eq!(backward.get("child_cnt"), Value::from(6));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_with_paging_and_base_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let parent = parent_with_children(&ctx, 10)?;
            let paged = FillOptions::new().list(
                ListOptions::new().find(order_by("n", SortOrder::Descending).skip(2).limit(3)),
            );
            let filled = ctx.db().fill_one(parent.clone(), "child", "parent_id", paged, doc! {})?;
            assert_eq!(
                attached_numbers(&filled, "child"),
                vec![Value::from(7), Value::from(6), Value::from(5)]
            );
            // the count ignores pagination
            assert_eq!(filled.get("child_cnt"), Value::from(10));

            let narrowed = ctx.db().fill_one(parent, "child", "parent_id", FillOptions::new(), doc! { n: 4 })?;
            assert_eq!(attached_numbers(&narrowed, "child"), vec![Value::from(4)]);
            assert_eq!(narrowed.get("child_cnt"), Value::from(1));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_with_inflated_children() {
    run_test(
        || create_test_context(),
        |ctx| {
            let author = create_user(&ctx, "author")?;
            let posts = ctx.db().collection("post")?;
            for i in 0..3 {
                posts.create(doc! { n: i, author_id: (id_of(&author)), editor_id: (id_of(&author)) }, CreateOptions::new())?;
            }

            let spec = ReferenceSpec::new().reference("editor", Projection::new("user").copy("username"));
            let options = FillOptions::new().list(ListOptions::new().inflate(spec));
            let filled = ctx.db().fill_one(author, "Posts", "author_id", options, doc! {})?;

            let attached = filled.get("posts");
            let attached = attached.as_array().unwrap();
            assert_eq!(attached.len(), 3);
            for post in attached {
                assert_eq!(post.as_document().unwrap().get("editor.username"), Value::from("author"));
            }
            assert_eq!(filled.get("posts_cnt"), Value::from(3));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_errors() {
    run_test(
        || create_test_context(),
        |ctx| {
            let parent = parent_with_children(&ctx, 1)?;
            let err = ctx
                .db()
                .fill_one(parent, "ghost", "parent_id", FillOptions::new(), doc! {})
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);

            let err = ctx
                .db()
                .fill_one(doc! { name: "no id" }, "child", "parent_id", FillOptions::new(), doc! {})
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);

            assert!(ctx
                .db()
                .fill_many(vec![], "ghost", "parent_id", FillOptions::new(), doc! {})?
                .is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
