use super::OperationContext;
use crate::collection::{by_id, Document};
use crate::common::util::fan_out;
use crate::common::{Value, DOC_ID, NOT_FOUND, REFERENCE_ID_SUFFIX};
use crate::errors::MongishResult;
use crate::reference::{FieldRule, Projection, ReferenceSpec};
use crate::store::StoreCollection;
use std::collections::HashMap;

/// Inflates a single document. See [inflate_many].
pub fn inflate_one(
    ctx: &OperationContext,
    document: Document,
    spec: &ReferenceSpec,
) -> MongishResult<Document> {
    let mut inflated = inflate_many(ctx, vec![document], spec)?;
    Ok(inflated.pop().unwrap_or_default())
}

/// Replaces the `<field>_id` keys of every document with the referenced
/// documents, projected as `spec` describes.
///
/// For each reference field the raw id is removed from the document. An absent
/// (or null) id is recorded in the `missing` marker without a lookup. A dangling
/// id sets the field to [NOT_FOUND] and is recorded as missing too. Otherwise
/// the field receives the whole target (wildcard projections) or `{_id}` plus the
/// copied and transformed attributes.
///
/// Documents are processed concurrently, and so are the lookups of one document
/// while the context has workers to spare. The first lookup failure aborts the
/// call.
pub fn inflate_many(
    ctx: &OperationContext,
    documents: Vec<Document>,
    spec: &ReferenceSpec,
) -> MongishResult<Vec<Document>> {
    if documents.is_empty() || spec.is_empty() {
        return Ok(documents);
    }

    let collections = resolve_collections(ctx, spec)?;
    let parallelism = ctx.config().parallelism();
    log::debug!(
        "Inflating {} document(s) over {} reference(s)",
        documents.len(),
        spec.len()
    );

    fan_out(documents, ctx.workers(), parallelism, |document| {
        inflate_document(ctx, document, spec, &collections)
    })
}

// resolved once per call so an unregistered collection fails before any lookup
fn resolve_collections<'a>(
    ctx: &OperationContext,
    spec: &'a ReferenceSpec,
) -> MongishResult<HashMap<&'a str, StoreCollection>> {
    let mut collections = HashMap::new();
    for (_, projection) in spec.iter() {
        let name = projection.collection();
        if !collections.contains_key(name) {
            collections.insert(name, ctx.registry().get(name)?);
        }
    }
    Ok(collections)
}

enum Resolution {
    Absent,
    NotFound,
    Found(Document),
}

fn inflate_document(
    ctx: &OperationContext,
    mut document: Document,
    spec: &ReferenceSpec,
    collections: &HashMap<&str, StoreCollection>,
) -> MongishResult<Document> {
    let mut lookups = Vec::with_capacity(spec.len());
    for (field, projection) in spec.iter() {
        let raw_id = document
            .take(&format!("{}{}", field, REFERENCE_ID_SUFFIX))
            .unwrap_or_default();
        lookups.push((projection, raw_id));
    }

    let parallelism = ctx.config().parallelism();
    let resolutions = fan_out(lookups, ctx.workers(), parallelism, |(projection, raw_id)| {
        if raw_id.is_null() {
            return Ok(Resolution::Absent);
        }
        let collection = match collections.get(projection.collection()) {
            Some(collection) => collection,
            None => return Ok(Resolution::Absent),
        };
        match collection.find_one(&by_id(raw_id))? {
            Some(target) => Ok(Resolution::Found(target)),
            None => Ok(Resolution::NotFound),
        }
    })?;

    // transforms see the owner with raw ids stripped and no reference set yet
    let owner = document.clone();
    for ((field, projection), resolution) in spec.iter().zip(resolutions) {
        match resolution {
            Resolution::Absent => document.add_missing(field),
            Resolution::NotFound => {
                document.put(field, NOT_FOUND)?;
                document.add_missing(field);
            }
            Resolution::Found(target) => {
                let embedded = project(&target, projection, &owner)?;
                document.put(field, embedded)?;
            }
        }
    }
    Ok(document)
}

fn project(target: &Document, projection: &Projection, owner: &Document) -> MongishResult<Document> {
    if projection.is_wildcard() {
        return Ok(target.clone());
    }

    let mut embedded = Document::new();
    if let Some(id) = target.id() {
        embedded.put(DOC_ID, id)?;
    }
    for (name, rule) in projection.fields() {
        let value: Value = match rule {
            FieldRule::Copy => target.get(name),
            FieldRule::Transform(transform) => transform(target, owner),
        };
        embedded.put(name, value)?;
    }
    Ok(embedded)
}
