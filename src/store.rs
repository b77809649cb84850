//! Content store: tables of JSON rows.
//!
//! The site and the admin editors talk to storage through [`ContentStore`],
//! which mirrors the handful of operations a hosted relational backend offers
//! to a browser client: select, select-single, insert-returning,
//! update-by-id, and delete-by-id. Rows are untyped JSON objects here; typed
//! access lives in [`crate::repo`].
//!
//! Two backends ship with the crate:
//!
//! - [`JsonDirStore`]: one `<table>.json` array per table under a data
//!   directory. Every write replaces the table file atomically.
//! - [`MemoryStore`]: process-local tables, used by tests and previews.
//!
//! ## Ids and revisions
//!
//! The store owns two columns on every row. `id` is a UUID v4 assigned on
//! insert and never changed afterwards. `revision` starts at 1 and is bumped
//! on every update. An update carrying a `revision` that no longer matches
//! the stored one is rejected with [`StoreError::Conflict`], so two admin
//! sessions editing the same row cannot silently overwrite each other. An
//! update without a `revision` skips the check (last write wins).

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// A stored row.
pub type Row = Map<String, Value>;

pub const ID_COLUMN: &str = "id";
pub const REVISION_COLUMN: &str = "revision";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no row with id {id} in {table}")]
    NotFound { table: Table, id: String },
    #[error(
        "row {id} in {table} was changed by another session \
         (editing revision {expected}, stored revision {found})"
    )]
    Conflict {
        table: Table,
        id: String,
        expected: u64,
        found: u64,
    },
    #[error("malformed row in {table}: {reason}")]
    Malformed { table: Table, reason: String },
}

/// Every table the site reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    HeroContent,
    Banners,
    Services,
    WhyChooseUs,
    ProcessSteps,
    Testimonials,
    Projects,
    BlogPosts,
    PageHeroes,
    CtaContent,
    ContactInfo,
}

impl Table {
    pub const ALL: [Table; 11] = [
        Table::HeroContent,
        Table::Banners,
        Table::Services,
        Table::WhyChooseUs,
        Table::ProcessSteps,
        Table::Testimonials,
        Table::Projects,
        Table::BlogPosts,
        Table::PageHeroes,
        Table::CtaContent,
        Table::ContactInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::HeroContent => "hero_content",
            Table::Banners => "banners",
            Table::Services => "services",
            Table::WhyChooseUs => "why_choose_us",
            Table::ProcessSteps => "process_steps",
            Table::Testimonials => "testimonials",
            Table::Projects => "projects",
            Table::BlogPosts => "blog_posts",
            Table::PageHeroes => "page_heroes",
            Table::CtaContent => "cta_content",
            Table::ContactInfo => "contact_info",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column equality filter for [`ContentStore::select_single`].
#[derive(Debug, Clone, Copy)]
pub struct Filter<'a> {
    pub column: &'a str,
    pub value: &'a Value,
}

pub trait ContentStore {
    /// All rows of a table, in storage order.
    fn select(&self, table: Table) -> Result<Vec<Row>, StoreError>;

    /// Insert a row; the store assigns `id` and `revision` and returns the
    /// stored row.
    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Replace the row with the given id and return the stored row.
    fn update(&self, table: Table, id: &str, row: Row) -> Result<Row, StoreError>;

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError>;

    /// First row matching `filter` (or the first row at all), `None` if the
    /// table has no such row.
    fn select_single(&self, table: Table, filter: Option<Filter<'_>>) -> Result<Option<Row>, StoreError> {
        let rows = self.select(table)?;
        Ok(rows
            .into_iter()
            .find(|row| filter.is_none_or(|f| row.get(f.column) == Some(f.value))))
    }
}

fn stored_revision(row: &Row) -> u64 {
    row.get(REVISION_COLUMN).and_then(Value::as_u64).unwrap_or(0)
}

fn row_id(row: &Row) -> Option<&str> {
    row.get(ID_COLUMN).and_then(Value::as_str)
}

/// Append `row` to `rows` with a fresh id and revision 1.
fn apply_insert(rows: &mut Vec<Row>, mut row: Row) -> Row {
    row.insert(ID_COLUMN.into(), Value::String(Uuid::new_v4().to_string()));
    row.insert(REVISION_COLUMN.into(), Value::from(1u64));
    rows.push(row.clone());
    row
}

fn apply_update(table: Table, rows: &mut [Row], id: &str, mut row: Row) -> Result<Row, StoreError> {
    let slot = rows
        .iter_mut()
        .find(|r| row_id(r) == Some(id))
        .ok_or_else(|| StoreError::NotFound {
            table,
            id: id.to_string(),
        })?;

    let found = stored_revision(slot);
    if let Some(expected) = row.get(REVISION_COLUMN).and_then(Value::as_u64)
        && expected != found
    {
        return Err(StoreError::Conflict {
            table,
            id: id.to_string(),
            expected,
            found,
        });
    }

    row.insert(ID_COLUMN.into(), Value::String(id.to_string()));
    row.insert(REVISION_COLUMN.into(), Value::from(found + 1));
    *slot = row.clone();
    Ok(row)
}

fn apply_delete(table: Table, rows: &mut Vec<Row>, id: &str) -> Result<(), StoreError> {
    let before = rows.len();
    rows.retain(|r| row_id(r) != Some(id));
    if rows.len() == before {
        return Err(StoreError::NotFound {
            table,
            id: id.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for MemoryStore {
    fn select(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        Ok(self.tables.lock().get(&table).cloned().unwrap_or_default())
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let mut tables = self.tables.lock();
        Ok(apply_insert(tables.entry(table).or_default(), row))
    }

    fn update(&self, table: Table, id: &str, row: Row) -> Result<Row, StoreError> {
        let mut tables = self.tables.lock();
        apply_update(table, tables.entry(table).or_default(), id, row)
    }

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        apply_delete(table, tables.entry(table).or_default(), id)
    }
}

// ============================================================================
// JSON directory backend
// ============================================================================

/// Tables stored as `<data_dir>/<table>.json`, each a JSON array of rows.
///
/// A missing file is an empty table. Nothing is cached between calls, so two
/// processes pointed at the same directory see each other's writes on the
/// next read.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.json", table.name()))
    }

    fn load(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let path = self.table_path(table);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let values: Vec<Value> = serde_json::from_str(&content)?;
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::Malformed {
                    table,
                    reason: format!("expected an object, found {other}"),
                }),
            })
            .collect()
    }

    fn save(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.table_path(table);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(rows)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl ContentStore for JsonDirStore {
    fn select(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        self.load(table)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let mut rows = self.load(table)?;
        let stored = apply_insert(&mut rows, row);
        self.save(table, &rows)?;
        tracing::debug!(%table, id = row_id(&stored), "inserted row");
        Ok(stored)
    }

    fn update(&self, table: Table, id: &str, row: Row) -> Result<Row, StoreError> {
        let mut rows = self.load(table)?;
        let stored = apply_update(table, &mut rows, id, row)?;
        self.save(table, &rows)?;
        tracing::debug!(%table, id, revision = stored_revision(&stored), "updated row");
        Ok(stored)
    }

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        let mut rows = self.load(table)?;
        apply_delete(table, &mut rows, id)?;
        self.save(table, &rows)?;
        tracing::debug!(%table, id, "deleted row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test row must be an object"),
        }
    }

    fn id_of(row: &Row) -> String {
        row_id(row).unwrap().to_string()
    }

    // =========================================================================
    // Shared behaviour, exercised against both backends
    // =========================================================================

    fn insert_assigns_id_and_revision(store: &dyn ContentStore) {
        let stored = store
            .insert(Table::Banners, row(json!({"id": "mine", "title": "A"})))
            .unwrap();
        let id = id_of(&stored);
        assert_ne!(id, "mine");
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(stored["revision"], json!(1));
        assert_eq!(store.select(Table::Banners).unwrap().len(), 1);
    }

    fn update_bumps_revision_and_keeps_id(store: &dyn ContentStore) {
        let stored = store.insert(Table::Services, row(json!({"title": "A"}))).unwrap();
        let id = id_of(&stored);

        let updated = store
            .update(
                Table::Services,
                &id,
                row(json!({"id": "other", "revision": 1, "title": "B"})),
            )
            .unwrap();
        assert_eq!(updated["id"], json!(id));
        assert_eq!(updated["revision"], json!(2));
        assert_eq!(updated["title"], json!("B"));
    }

    fn stale_revision_conflicts(store: &dyn ContentStore) {
        let stored = store.insert(Table::Projects, row(json!({"title": "A"}))).unwrap();
        let id = id_of(&stored);
        store
            .update(Table::Projects, &id, row(json!({"revision": 1, "title": "B"})))
            .unwrap();

        let err = store
            .update(Table::Projects, &id, row(json!({"revision": 1, "title": "C"})))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        let rows = store.select(Table::Projects).unwrap();
        assert_eq!(rows[0]["title"], json!("B"));
    }

    fn delete_removes_row(store: &dyn ContentStore) {
        let a = store.insert(Table::Testimonials, row(json!({"name": "a"}))).unwrap();
        let b = store.insert(Table::Testimonials, row(json!({"name": "b"}))).unwrap();
        store.delete(Table::Testimonials, &id_of(&a)).unwrap();
        let rows = store.select(Table::Testimonials).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(id_of(&rows[0]), id_of(&b));
        assert!(matches!(
            store.delete(Table::Testimonials, &id_of(&a)),
            Err(StoreError::NotFound { .. })
        ));
    }

    fn select_single_filters(store: &dyn ContentStore) {
        assert!(store.select_single(Table::PageHeroes, None).unwrap().is_none());
        store
            .insert(Table::PageHeroes, row(json!({"page_slug": "about"})))
            .unwrap();
        store
            .insert(Table::PageHeroes, row(json!({"page_slug": "blog"})))
            .unwrap();
        let slug = json!("blog");
        let found = store
            .select_single(
                Table::PageHeroes,
                Some(Filter {
                    column: "page_slug",
                    value: &slug,
                }),
            )
            .unwrap()
            .unwrap();
        assert_eq!(found["page_slug"], json!("blog"));
        let missing = json!("work");
        assert!(
            store
                .select_single(
                    Table::PageHeroes,
                    Some(Filter {
                        column: "page_slug",
                        value: &missing,
                    }),
                )
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn memory_store_contract() {
        insert_assigns_id_and_revision(&MemoryStore::new());
        update_bumps_revision_and_keeps_id(&MemoryStore::new());
        stale_revision_conflicts(&MemoryStore::new());
        delete_removes_row(&MemoryStore::new());
        select_single_filters(&MemoryStore::new());
    }

    #[test]
    fn json_dir_store_contract() {
        let tmp = TempDir::new().unwrap();
        insert_assigns_id_and_revision(&JsonDirStore::new(tmp.path().join("a")));
        update_bumps_revision_and_keeps_id(&JsonDirStore::new(tmp.path().join("b")));
        stale_revision_conflicts(&JsonDirStore::new(tmp.path().join("c")));
        delete_removes_row(&JsonDirStore::new(tmp.path().join("d")));
        select_single_filters(&JsonDirStore::new(tmp.path().join("e")));
    }

    // =========================================================================
    // Backend specifics
    // =========================================================================

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(Table::Banners, "nope", row(json!({"title": "x"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn update_without_revision_skips_check() {
        let store = MemoryStore::new();
        let id = id_of(&store.insert(Table::Banners, row(json!({"title": "a"}))).unwrap());
        store
            .update(Table::Banners, &id, row(json!({"revision": 1, "title": "b"})))
            .unwrap();
        let updated = store
            .update(Table::Banners, &id, row(json!({"title": "c"})))
            .unwrap();
        assert_eq!(updated["revision"], json!(3));
    }

    #[test]
    fn missing_table_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::new(tmp.path());
        assert!(store.select(Table::BlogPosts).unwrap().is_empty());
    }

    #[test]
    fn json_dir_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        JsonDirStore::new(tmp.path())
            .insert(Table::Services, row(json!({"title": "kept"})))
            .unwrap();
        let rows = JsonDirStore::new(tmp.path()).select(Table::Services).unwrap();
        assert_eq!(rows[0]["title"], json!("kept"));
        assert!(tmp.path().join("services.json").exists());
        assert!(!tmp.path().join("services.json.tmp").exists());
    }

    #[test]
    fn non_object_rows_are_malformed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("banners.json"), "[1, 2]").unwrap();
        let err = JsonDirStore::new(tmp.path()).select(Table::Banners).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn table_names_match_storage_names() {
        let names: Vec<&str> = Table::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            [
                "hero_content",
                "banners",
                "services",
                "why_choose_us",
                "process_steps",
                "testimonials",
                "projects",
                "blog_posts",
                "page_heroes",
                "cta_content",
                "contact_info",
            ]
        );
    }
}
