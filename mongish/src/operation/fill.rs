use super::read_operations::{count, list};
use super::OperationContext;
use crate::collection::{Document, FillOptions};
use crate::common::util::{fan_out, join};
use crate::common::{Value, COUNT_SUFFIX};
use crate::errors::{ErrorKind, MongishError, MongishResult};

/// Fills a single owner document. See [fill_many].
pub fn fill_one(
    ctx: &OperationContext,
    document: Document,
    source: &str,
    key: &str,
    options: FillOptions,
    base_query: Document,
) -> MongishResult<Document> {
    let mut filled = fill_many(ctx, vec![document], source, key, options, base_query)?;
    Ok(filled.pop().unwrap_or_default())
}

/// Attaches to every owner the documents of `source` whose `key` field holds
/// the owner's `_id`, together with their count.
///
/// The list lands under the lower-cased source name and the count under the
/// same name suffixed with `_cnt`. Every owner binds `base_query[key]` to its
/// own id; the list and count queries of an owner run concurrently, and so do
/// the owners. [FillOptions::list] is handed to the list query, so it may
/// paginate or inflate the attached documents.
///
/// ```rust,ignore
/// let parent = fill_one(&ctx, parent, "children", "parent_id", FillOptions::new(), doc! {})?;
/// assert_eq!(parent.get("children_cnt"), Value::from(5));
/// ```
pub fn fill_many(
    ctx: &OperationContext,
    documents: Vec<Document>,
    source: &str,
    key: &str,
    options: FillOptions,
    base_query: Document,
) -> MongishResult<Vec<Document>> {
    if documents.is_empty() {
        return Ok(documents);
    }

    let collection = ctx.registry().get(source)?;
    let FillOptions {
        reverse,
        list: list_options,
    } = options;
    let list_key = source.to_lowercase();
    let count_key = format!("{}{}", list_key, COUNT_SUFFIX);
    log::debug!("Filling {} owner(s) from {} by {}", documents.len(), source, key);

    let parallelism = ctx.config().parallelism();
    fan_out(documents, ctx.workers(), parallelism, |mut owner| {
        let id = match owner.id() {
            Some(id) if !id.is_null() => id,
            _ => {
                log::error!("Cannot fill {} for a document without _id", source);
                return Err(MongishError::new(
                    &format!("Cannot fill {} for a document without _id", source),
                    ErrorKind::InvalidId,
                ));
            }
        };

        let mut query = base_query.clone();
        query.put(key, id)?;

        let (mut related, total) = join(
            ctx.workers(),
            parallelism,
            || list(ctx, &collection, &query, &list_options),
            || count(&collection, &query),
        )?;
        if reverse {
            related.reverse();
        }

        owner.put(&list_key, Value::from(related))?;
        owner.put(&count_key, total)?;
        Ok(owner)
    })
}
