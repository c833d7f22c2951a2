use super::{inflate_one, OperationContext};
use crate::collection::{CreateOptions, Document, ForceFields, Update, UpdateOptions, UpdateResult};
use crate::common::util::current_time;
use crate::common::{Value, DOC_CREATED, DOC_UPDATED};
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::store::{IndexConflict, StoreCollection};

/// Inserts `document`, stamping `created` and `updated` when they are absent.
///
/// A unique index violation is retried when `force` names one of the fields
/// of the violated index. When several do, the one forced last wins. That field
/// gets `-<attempt>` appended and the insert is repeated with the mutated
/// document. Suffixes accumulate, so
/// the third attempt on `a@x.com` writes `a@x.com-1-2`. Without a matching
/// force entry the conflict is returned as is. The loop gives up with
/// [ErrorKind::RetryLimitExceeded] after `max_write_attempts` inserts.
pub(crate) fn create(
    ctx: &OperationContext,
    collection: &StoreCollection,
    mut document: Document,
    options: &CreateOptions,
) -> MongishResult<Document> {
    let now = current_time();
    if document.get(DOC_CREATED).is_null() {
        document.put(DOC_CREATED, now)?;
    }
    if document.get(DOC_UPDATED).is_null() {
        document.put(DOC_UPDATED, now)?;
    }

    let max_attempts = ctx.config().max_write_attempts();
    let mut attempt: u32 = 1;
    let inserted = loop {
        let err = match collection.insert(document.clone()) {
            Ok(inserted) => break inserted,
            Err(err) => err,
        };

        let field = match err.conflict() {
            Some(conflict) if !options.force.is_empty() => {
                match create_retry_field(conflict, &options.force) {
                    Some(field) => field,
                    None => return Err(err),
                }
            }
            _ => return Err(err),
        };

        if attempt >= max_attempts {
            return Err(retry_limit_exceeded(collection, attempt, err));
        }

        let retried = suffixed(&document.get(&field), attempt);
        log::warn!(
            "Insert into {} conflicts on {}, retrying with {}",
            collection.name(),
            field,
            retried
        );
        document.put(&field, retried)?;
        attempt += 1;
    };

    match &options.inflate {
        Some(spec) => inflate_one(ctx, inserted, spec),
        None => Ok(inserted),
    }
}

/// Applies `update` to the first document matching `filter`, forcing
/// `$set.updated` to the current time.
///
/// Conflicts are retried like [create] does, except that only the first field
/// of the violated index is considered and it must be present both in `force`
/// and in `$set`.
pub(crate) fn update(
    ctx: &OperationContext,
    collection: &StoreCollection,
    filter: &Document,
    mut update: Update,
    options: &UpdateOptions,
) -> MongishResult<UpdateResult> {
    update.set_fields_mut().put(DOC_UPDATED, current_time())?;

    let max_attempts = ctx.config().max_write_attempts();
    let mut attempt: u32 = 1;
    loop {
        let err = match collection.update_one(filter, &update) {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };

        let field = match err.conflict().and_then(|c| c.candidate_fields().into_iter().next()) {
            Some(field)
                if options.force.contains(&field) && update.set_fields().contains_field(&field) =>
            {
                field
            }
            _ => return Err(err),
        };

        if attempt >= max_attempts {
            return Err(retry_limit_exceeded(collection, attempt, err));
        }

        let retried = suffixed(&update.set_fields().get(&field), attempt);
        log::warn!(
            "Update of {} conflicts on {}, retrying with {}",
            collection.name(),
            field,
            retried
        );
        update.set_fields_mut().put(&field, retried)?;
        attempt += 1;
    }
}

// the last force entry, in insertion order, that the violated index covers
fn create_retry_field(conflict: &IndexConflict, force: &ForceFields) -> Option<String> {
    let candidates = conflict.candidate_fields();
    force
        .names()
        .filter(|name| candidates.contains(*name))
        .last()
        .cloned()
}

fn suffixed(value: &Value, attempt: u32) -> String {
    format!("{}-{}", value.to_text(), attempt)
}

fn retry_limit_exceeded(collection: &StoreCollection, attempts: u32, last: MongishError) -> MongishError {
    log::error!(
        "Giving up write to {} after {} conflicting attempts",
        collection.name(),
        attempts
    );
    MongishError::new_with_cause(
        &format!(
            "Giving up write to {} after {} conflicting attempts",
            collection.name(),
            attempts
        ),
        ErrorKind::RetryLimitExceeded,
        last,
    )
}
