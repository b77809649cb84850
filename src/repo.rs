//! Typed access to the content store.
//!
//! Converts between [`Row`]s and the record structs in [`crate::content`],
//! and applies each record type's display order after a select. Rows that do
//! not deserialize into their record type are reported as
//! [`StoreError::Malformed`] rather than skipped.

use crate::content::{Ordered, PageHero, Record, Singleton};
use crate::store::{ContentStore, Filter, ID_COLUMN, REVISION_COLUMN, Row, StoreError};
use serde_json::Value;

pub fn to_row<R: Record>(record: &R) -> Result<Row, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Malformed {
            table: R::TABLE,
            reason: format!("record serialized to {other}"),
        }),
    }
}

pub fn from_row<R: Record>(row: Row) -> Result<R, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Malformed {
        table: R::TABLE,
        reason: e.to_string(),
    })
}

/// All rows of an ordered table in display order.
pub fn list<R: Ordered>(store: &dyn ContentStore) -> Result<Vec<R>, StoreError> {
    let mut records = store
        .select(R::TABLE)?
        .into_iter()
        .map(from_row::<R>)
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(R::display_cmp);
    Ok(records)
}

/// The singleton row, `None` when the table has not been seeded.
pub fn fetch_single<R: Singleton>(store: &dyn ContentStore) -> Result<Option<R>, StoreError> {
    store.select_single(R::TABLE, None)?.map(from_row).transpose()
}

pub fn find_page_hero(store: &dyn ContentStore, slug: &str) -> Result<Option<PageHero>, StoreError> {
    let value = Value::String(slug.to_string());
    store
        .select_single(
            PageHero::TABLE,
            Some(Filter {
                column: "page_slug",
                value: &value,
            }),
        )?
        .map(from_row)
        .transpose()
}

/// Insert a new record. Any `id` or `revision` on `record` is ignored.
pub fn insert<R: Record>(store: &dyn ContentStore, record: &R) -> Result<R, StoreError> {
    let mut row = to_row(record)?;
    row.remove(ID_COLUMN);
    row.remove(REVISION_COLUMN);
    from_row(store.insert(R::TABLE, row)?)
}

/// Write `record` back under its id, checked against its revision.
pub fn update<R: Record>(store: &dyn ContentStore, record: &R) -> Result<R, StoreError> {
    let row = to_row(record)?;
    from_row(store.update(R::TABLE, record.id(), row)?)
}

pub fn delete<R: Record>(store: &dyn ContentStore, id: &str) -> Result<(), StoreError> {
    store.delete(R::TABLE, id)
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value (including arrays and
/// `null`) replaces the base value.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
