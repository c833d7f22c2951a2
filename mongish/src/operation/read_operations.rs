use super::{inflate_many, inflate_one, OperationContext};
use crate::collection::{by_id, Document, ListOptions, ReadOptions, Update};
use crate::common::util::async_task;
use crate::common::Value;
use crate::errors::MongishResult;
use crate::store::StoreCollection;

/// Point lookup. Inflation keeps documents carrying a `missing` marker; the
/// caller inspects the marker.
pub(crate) fn read(
    ctx: &OperationContext,
    collection: &StoreCollection,
    filter: &Document,
    options: &ReadOptions,
) -> MongishResult<Option<Document>> {
    let document = match collection.find_one(filter)? {
        Some(document) => document,
        None => return Ok(None),
    };

    if options.inc {
        increment_views(ctx, collection, document.id().into_iter().collect());
    }

    match &options.inflate {
        Some(spec) => inflate_one(ctx, document, spec).map(Some),
        None => Ok(Some(document)),
    }
}

/// Set lookup. With inflation, documents left with a `missing` marker are
/// dropped; view counts are bumped for every document found, dropped or not.
pub(crate) fn list(
    ctx: &OperationContext,
    collection: &StoreCollection,
    filter: &Document,
    options: &ListOptions,
) -> MongishResult<Vec<Document>> {
    let documents = collection.find(filter, &options.find)?;

    if options.inc && !documents.is_empty() {
        increment_views(ctx, collection, documents.iter().filter_map(Document::id).collect());
    }

    match &options.inflate {
        Some(spec) => {
            let inflated = inflate_many(ctx, documents, spec)?;
            Ok(inflated.into_iter().filter(|doc| !doc.has_missing()).collect())
        }
        None => Ok(documents),
    }
}

pub(crate) fn delete(collection: &StoreCollection, filter: &Document) -> MongishResult<u64> {
    collection.remove(filter)
}

/// `true` when nothing matches `filter`, e.g. a username is still free.
pub(crate) fn available(collection: &StoreCollection, filter: &Document) -> MongishResult<bool> {
    Ok(collection.find_one(filter)?.is_none())
}

pub(crate) fn count(collection: &StoreCollection, filter: &Document) -> MongishResult<u64> {
    collection.count(filter)
}

// fire and forget; failures are only logged
fn increment_views(ctx: &OperationContext, collection: &StoreCollection, ids: Vec<Value>) {
    let field = ctx.config().view_count_field();
    let update = match Update::new().inc(&field, 1) {
        Ok(update) => update,
        Err(e) => {
            log::error!("Cannot build view count update on {}: {}", field, e);
            return;
        }
    };

    let collection = collection.clone();
    async_task(move || {
        for id in ids {
            if let Err(e) = collection.update_one(&by_id(id.clone()), &update) {
                log::error!(
                    "Failed to increment {} of {} in {}: {}",
                    field,
                    id,
                    collection.name(),
                    e
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{order_by, SortOrder};
    use crate::common::DOC_ID;
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::reference::{Projection, ReferenceSpec};
    use crate::test_support::{context_with, failing_context};
    use std::time::Duration;

    fn seeded() -> (OperationContext, StoreCollection, Document) {
        let ctx = context_with(&["user", "post"]);
        let users = ctx.registry().get("user").unwrap();
        let posts = ctx.registry().get("post").unwrap();
        let author = users.insert(doc! { username: "ann" }).unwrap();
        posts.insert(doc! { n: 1, author_id: (author.get(DOC_ID)) }).unwrap();
        posts.insert(doc! { n: 2, author_id: 999 }).unwrap();
        posts.insert(doc! { n: 3, author_id: (author.get(DOC_ID)) }).unwrap();
        (ctx, posts, author)
    }

    fn author_spec() -> ReferenceSpec {
        ReferenceSpec::new().reference("author", Projection::new("user").copy("username"))
    }

    #[test]
    fn test_read_returns_none_when_nothing_matches() {
        let (ctx, posts, _) = seeded();
        assert!(read(&ctx, &posts, &doc! { n: 42 }, &ReadOptions::new()).unwrap().is_none());
    }

    #[test]
    fn test_read_keeps_missing_marker() {
        let (ctx, posts, _) = seeded();
        let options = ReadOptions::new().inflate(author_spec());
        let post = read(&ctx, &posts, &doc! { n: 2 }, &options).unwrap().unwrap();
        assert_eq!(post.missing(), vec!["author"]);
    }

    #[test]
    fn test_list_with_inflate_drops_missing() {
        let (ctx, posts, _) = seeded();
        let options = ListOptions::new()
            .find(order_by("n", SortOrder::Ascending))
            .inflate(author_spec());
        let listed = list(&ctx, &posts, &doc! {}, &options).unwrap();

        let numbers: Vec<Value> = listed.iter().map(|d| d.get("n")).collect();
        assert_eq!(numbers, vec![Value::from(1), Value::from(3)]);
        assert!(listed.iter().all(|d| !d.has_missing()));
        assert_eq!(listed[0].get("author.username"), Value::from("ann"));
    }

    #[test]
    fn test_list_without_inflate_passes_through() {
        let (ctx, posts, _) = seeded();
        let listed = list(&ctx, &posts, &doc! {}, &ListOptions::new()).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|d| d.contains_key("author_id")));
    }

    #[test]
    fn test_read_inc_bumps_view_count() {
        let (ctx, posts, _) = seeded();
        read(&ctx, &posts, &doc! { n: 1 }, &ReadOptions::new().inc(true)).unwrap();

        awaitility::at_most(Duration::from_secs(2)).until(|| {
            posts
                .find_one(&doc! { n: 1 })
                .ok()
                .flatten()
                .map(|d| d.get("vcnt") == Value::from(1))
                .unwrap_or(false)
        });
    }

    #[test]
    fn test_list_inc_covers_filtered_documents() {
        let (ctx, posts, _) = seeded();
        let options = ListOptions::new().inflate(author_spec()).inc(true);
        assert_eq!(list(&ctx, &posts, &doc! {}, &options).unwrap().len(), 2);

        awaitility::at_most(Duration::from_secs(2))
            .until(|| posts.count(&doc! { vcnt: 1 }).unwrap_or(0) == 3);
    }

    #[test]
    fn test_available_and_count() {
        let (_, posts, _) = seeded();
        assert!(!available(&posts, &doc! { n: 1 }).unwrap());
        assert!(available(&posts, &doc! { n: 7 }).unwrap());
        assert_eq!(count(&posts, &doc! {}).unwrap(), 3);
        assert_eq!(delete(&posts, &doc! { n: 1 }).unwrap(), 1);
        assert_eq!(count(&posts, &doc! {}).unwrap(), 2);
    }

    #[test]
    fn test_store_failure_is_surfaced() {
        let (ctx, broken) = failing_context("post");
        let collection = StoreCollection::new(broken);
        let err = list(&ctx, &collection, &doc! {}, &ListOptions::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreFailure);
        assert!(read(&ctx, &collection, &doc! {}, &ReadOptions::new()).is_err());
    }
}
