//! Admin dashboard: the section list and a command runner per section.
//!
//! Each [`Section`] maps to one table and one editor kind. [`run`] drives the
//! matching editor through a single [`AdminAction`] and returns what the CLI
//! should print. The editors do the notifying; the runner only translates
//! command-line input into editor calls.
//!
//! Field assignments use `httpie`-style syntax:
//!
//! - `title=Spring Sale` sets a string.
//! - `order_index:=3`, `is_reversed:=true`, `features:=["A","B"]` set raw
//!   JSON values.

use crate::cache::QueryCache;
use crate::content::{
    Banner, BlogPost, ContactInfo, CtaContent, HeroContent, Insertable, Ordered, PageHero,
    ProcessStep, Project, Reason, Record, Service, Singleton, Testimonial,
};
use crate::editor::{CollectionEditor, EditorError, SingletonEditor};
use crate::notify::{Confirm, Notifier};
use crate::store::{ContentStore, Table};
use crate::upload::{ImageFile, ImageUploader, ObjectStore};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("invalid assignment `{0}` (expected key=value or key:=json)")]
    Assignment(String),
    #[error("{section} does not support {action}")]
    Unsupported {
        section: Section,
        action: &'static str,
    },
    #[error("{section} needs a row id for {action}")]
    MissingId {
        section: Section,
        action: &'static str,
    },
}

/// Dashboard sections, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Hero,
    Banners,
    Services,
    WhyChooseUs,
    Process,
    Testimonials,
    Projects,
    Blog,
    PageHeroes,
    Cta,
    Contact,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::Hero,
        Section::Banners,
        Section::Services,
        Section::WhyChooseUs,
        Section::Process,
        Section::Testimonials,
        Section::Projects,
        Section::Blog,
        Section::PageHeroes,
        Section::Cta,
        Section::Contact,
    ];

    /// Stable identifier used on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Banners => "banners",
            Section::Services => "services",
            Section::WhyChooseUs => "why-choose-us",
            Section::Process => "process",
            Section::Testimonials => "testimonials",
            Section::Projects => "projects",
            Section::Blog => "blog",
            Section::PageHeroes => "page-heroes",
            Section::Cta => "cta",
            Section::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Hero => "Hero Section",
            Section::Banners => "Banners",
            Section::Services => "Services",
            Section::WhyChooseUs => "Why Choose Us",
            Section::Process => "Process Steps",
            Section::Testimonials => "Testimonials",
            Section::Projects => "Projects/Work",
            Section::Blog => "Blog Posts",
            Section::PageHeroes => "Page Heroes",
            Section::Cta => "CTA Section",
            Section::Contact => "Contact Info",
        }
    }

    pub fn table(self) -> Table {
        match self {
            Section::Hero => Table::HeroContent,
            Section::Banners => Table::Banners,
            Section::Services => Table::Services,
            Section::WhyChooseUs => Table::WhyChooseUs,
            Section::Process => Table::ProcessSteps,
            Section::Testimonials => Table::Testimonials,
            Section::Projects => Table::Projects,
            Section::Blog => Table::BlogPosts,
            Section::PageHeroes => Table::PageHeroes,
            Section::Cta => Table::CtaContent,
            Section::Contact => Table::ContactInfo,
        }
    }

    /// Single-row section.
    pub fn is_singleton(self) -> bool {
        matches!(self, Section::Hero | Section::Cta | Section::Contact)
    }

    /// Rows can be added and deleted.
    pub fn is_insertable(self) -> bool {
        !self.is_singleton() && self != Section::PageHeroes
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| {
                let ids: Vec<&str> = Section::ALL.iter().map(|s| s.id()).collect();
                format!("unknown section `{s}` (expected one of {})", ids.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    List,
    /// Show one row; singletons take no id.
    Show { id: Option<String> },
    Add,
    /// Patch fields and save.
    Set {
        id: Option<String>,
        assignments: Vec<String>,
    },
    /// Upload an image into a field and save.
    Attach {
        id: Option<String>,
        field: String,
        file: PathBuf,
    },
    Delete { id: String },
}

impl AdminAction {
    fn name(&self) -> &'static str {
        match self {
            AdminAction::List => "list",
            AdminAction::Show { .. } => "show",
            AdminAction::Add => "add",
            AdminAction::Set { .. } => "set",
            AdminAction::Attach { .. } => "attach",
            AdminAction::Delete { .. } => "delete",
        }
    }
}

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummary {
    pub position: String,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    Rows(Vec<RowSummary>),
    /// A row as stored, after any write.
    Record(Value),
    Deleted { id: String },
    /// Singleton table with no row yet.
    NotSeeded { noun: &'static str },
    /// Delete confirmation declined.
    Declined,
}

/// Everything a command needs.
pub struct AdminContext<'a> {
    pub store: &'a dyn ContentStore,
    pub objects: &'a dyn ObjectStore,
    pub notifier: &'a dyn Notifier,
    pub confirm: &'a dyn Confirm,
    pub cache: Option<&'a QueryCache>,
}

/// Parse `key=value` / `key:=json` pairs into a JSON object patch.
pub fn parse_assignments(assignments: &[String]) -> Result<Value, AdminError> {
    let mut patch = Map::new();
    for assignment in assignments {
        let invalid = || AdminError::Assignment(assignment.clone());
        let eq = assignment.find('=').ok_or_else(invalid)?;
        let (key, value) = if eq > 0 && assignment.as_bytes()[eq - 1] == b':' {
            let raw = &assignment[eq + 1..];
            let value: Value = serde_json::from_str(raw).map_err(|_| invalid())?;
            (&assignment[..eq - 1], value)
        } else {
            (
                &assignment[..eq],
                Value::String(assignment[eq + 1..].to_string()),
            )
        };
        if key.is_empty() {
            return Err(invalid());
        }
        patch.insert(key.to_string(), value);
    }
    Ok(Value::Object(patch))
}

fn record_value<R: Record>(record: &R) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

fn summaries<R: Ordered>(rows: &[R]) -> Vec<RowSummary> {
    rows.iter()
        .map(|r| RowSummary {
            position: r.position_label(),
            id: r.id().to_string(),
            label: r.label(),
        })
        .collect()
}

fn require_id(section: Section, action: &AdminAction, id: Option<String>) -> Result<String, AdminError> {
    id.ok_or(AdminError::MissingId {
        section,
        action: action.name(),
    })
}

/// List/show/set/attach, shared by every ordered section.
fn run_collection<R: Ordered>(
    ctx: &AdminContext<'_>,
    section: Section,
    editor: &mut CollectionEditor<'_, R>,
    action: AdminAction,
) -> Result<AdminOutcome, AdminError> {
    editor.list()?;
    match action {
        AdminAction::List => Ok(AdminOutcome::Rows(summaries(editor.rows()))),
        AdminAction::Show { ref id } => {
            let id = require_id(section, &action, id.clone())?;
            editor.start_edit(&id)?;
            let shown = editor.draft().map(record_value).unwrap_or(Value::Null);
            editor.cancel();
            Ok(AdminOutcome::Record(shown))
        }
        AdminAction::Set {
            ref id,
            ref assignments,
        } => {
            let id = require_id(section, &action, id.clone())?;
            let patch = parse_assignments(assignments)?;
            editor.start_edit(&id)?;
            editor.update_field(&id, patch)?;
            Ok(AdminOutcome::Record(record_value(&editor.save()?)))
        }
        AdminAction::Attach {
            ref id,
            ref field,
            ref file,
        } => {
            let id = require_id(section, &action, id.clone())?;
            let image = ImageFile::read(file).map_err(EditorError::from)?;
            let uploader = ImageUploader::new(ctx.objects, ctx.notifier);
            editor.start_edit(&id)?;
            editor.attach_image(&id, field, &uploader, &image)?;
            Ok(AdminOutcome::Record(record_value(&editor.save()?)))
        }
        AdminAction::Add | AdminAction::Delete { .. } => Err(AdminError::Unsupported {
            section,
            action: action.name(),
        }),
    }
}

fn collection_editor<'a, R: Ordered>(ctx: &AdminContext<'a>) -> CollectionEditor<'a, R> {
    let editor = CollectionEditor::new(ctx.store, ctx.notifier);
    match ctx.cache {
        Some(cache) => editor.invalidating(cache),
        None => editor,
    }
}

fn run_insertable<R: Insertable>(
    ctx: &AdminContext<'_>,
    section: Section,
    action: AdminAction,
) -> Result<AdminOutcome, AdminError> {
    let mut editor = collection_editor::<R>(ctx);
    match action {
        AdminAction::Add => {
            editor.list()?;
            Ok(AdminOutcome::Record(record_value(&editor.add()?)))
        }
        AdminAction::Delete { id } => {
            editor.list()?;
            if editor.remove(&id, ctx.confirm)? {
                Ok(AdminOutcome::Deleted { id })
            } else {
                Ok(AdminOutcome::Declined)
            }
        }
        other => run_collection(ctx, section, &mut editor, other),
    }
}

fn run_ordered<R: Ordered>(
    ctx: &AdminContext<'_>,
    section: Section,
    action: AdminAction,
) -> Result<AdminOutcome, AdminError> {
    let mut editor = collection_editor::<R>(ctx);
    run_collection(ctx, section, &mut editor, action)
}

fn run_singleton<R: Singleton>(
    ctx: &AdminContext<'_>,
    section: Section,
    action: AdminAction,
) -> Result<AdminOutcome, AdminError> {
    let mut editor = SingletonEditor::<R>::new(ctx.store, ctx.notifier);
    if let Some(cache) = ctx.cache {
        editor = editor.invalidating(cache);
    }
    if editor.load()?.is_none() && !matches!(action, AdminAction::Add | AdminAction::Delete { .. }) {
        return Ok(AdminOutcome::NotSeeded { noun: R::NOUN });
    }
    match action {
        AdminAction::List | AdminAction::Show { .. } => Ok(AdminOutcome::Record(
            editor.record().map(record_value).unwrap_or(Value::Null),
        )),
        AdminAction::Set { assignments, .. } => {
            let patch = parse_assignments(&assignments)?;
            editor.update_field(patch)?;
            Ok(AdminOutcome::Record(record_value(&editor.save()?)))
        }
        AdminAction::Attach { field, file, .. } => {
            let image = ImageFile::read(&file).map_err(EditorError::from)?;
            let uploader = ImageUploader::new(ctx.objects, ctx.notifier);
            editor.attach_image(&field, &uploader, &image)?;
            Ok(AdminOutcome::Record(record_value(&editor.save()?)))
        }
        AdminAction::Add | AdminAction::Delete { .. } => Err(AdminError::Unsupported {
            section,
            action: action.name(),
        }),
    }
}

/// Run one admin action against a section.
pub fn run(ctx: &AdminContext<'_>, section: Section, action: AdminAction) -> Result<AdminOutcome, AdminError> {
    tracing::debug!(%section, action = action.name(), "admin action");
    match section {
        Section::Hero => run_singleton::<HeroContent>(ctx, section, action),
        Section::Banners => run_insertable::<Banner>(ctx, section, action),
        Section::Services => run_insertable::<Service>(ctx, section, action),
        Section::WhyChooseUs => run_insertable::<Reason>(ctx, section, action),
        Section::Process => run_insertable::<ProcessStep>(ctx, section, action),
        Section::Testimonials => run_insertable::<Testimonial>(ctx, section, action),
        Section::Projects => run_insertable::<Project>(ctx, section, action),
        Section::Blog => run_insertable::<BlogPost>(ctx, section, action),
        Section::PageHeroes => run_ordered::<PageHero>(ctx, section, action),
        Section::Cta => run_singleton::<CtaContent>(ctx, section, action),
        Section::Contact => run_singleton::<ContactInfo>(ctx, section, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FallbackContent, seed};
    use crate::store::MemoryStore;
    use crate::test_helpers::{RecordingNotifier, RecordingObjectStore, ScriptedConfirm, png_bytes};
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        store: MemoryStore,
        objects: RecordingObjectStore,
        notifier: RecordingNotifier,
        confirm: ScriptedConfirm,
    }

    impl Fixture {
        fn new(seeded: bool) -> Self {
            let store = MemoryStore::new();
            if seeded {
                seed(&store, &FallbackContent::default()).unwrap();
            }
            Self {
                store,
                objects: RecordingObjectStore::default(),
                notifier: RecordingNotifier::default(),
                confirm: ScriptedConfirm::yes(),
            }
        }

        fn run(&self, section: Section, action: AdminAction) -> Result<AdminOutcome, AdminError> {
            let ctx = AdminContext {
                store: &self.store,
                objects: &self.objects,
                notifier: &self.notifier,
                confirm: &self.confirm,
                cache: None,
            };
            run(&ctx, section, action)
        }

        fn rows(&self, section: Section) -> Vec<RowSummary> {
            match self.run(section, AdminAction::List).unwrap() {
                AdminOutcome::Rows(rows) => rows,
                other => panic!("expected rows, got {other:?}"),
            }
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Sections
    // =========================================================================

    #[test]
    fn sections_in_menu_order() {
        let ids: Vec<&str> = Section::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            [
                "hero",
                "banners",
                "services",
                "why-choose-us",
                "process",
                "testimonials",
                "projects",
                "blog",
                "page-heroes",
                "cta",
                "contact"
            ]
        );
        assert_eq!("page-heroes".parse::<Section>(), Ok(Section::PageHeroes));
        assert!("team".parse::<Section>().is_err());
    }

    #[test]
    fn section_kinds() {
        assert!(Section::Hero.is_singleton());
        assert!(!Section::PageHeroes.is_insertable());
        assert!(Section::Blog.is_insertable());
        assert_eq!(Section::Process.table(), Table::ProcessSteps);
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    #[test]
    fn parse_string_and_json_assignments() {
        let patch = parse_assignments(&strings(&[
            "title=Spring Sale",
            "order_index:=3",
            "features:=[\"A\",\"B\"]",
            "button_link=/a=b",
        ]))
        .unwrap();
        assert_eq!(
            patch,
            json!({
                "title": "Spring Sale",
                "order_index": 3,
                "features": ["A", "B"],
                "button_link": "/a=b"
            })
        );
    }

    #[test]
    fn parse_rejects_malformed_assignments() {
        assert!(parse_assignments(&strings(&["title"])).is_err());
        assert!(parse_assignments(&strings(&["=x"])).is_err());
        assert!(parse_assignments(&strings(&["rating:=five"])).is_err());
    }

    // =========================================================================
    // Collections
    // =========================================================================

    #[test]
    fn banner_scenario_from_empty() {
        let fx = Fixture::new(false);
        assert!(fx.rows(Section::Banners).is_empty());

        let AdminOutcome::Record(added) = fx.run(Section::Banners, AdminAction::Add).unwrap() else {
            panic!("expected record");
        };
        let id = added["id"].as_str().unwrap().to_string();
        fx.run(
            Section::Banners,
            AdminAction::Set {
                id: Some(id.clone()),
                assignments: strings(&["title=Spring Sale"]),
            },
        )
        .unwrap();

        let rows = fx.rows(Section::Banners);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].position, "#0");
        assert!(rows[0].label.starts_with("Spring Sale"));
        assert_eq!(fx.notifier.messages(), ["Banner added!", "Banner updated!"]);
    }

    #[test]
    fn show_returns_record_json() {
        let fx = Fixture::new(true);
        let id = fx.rows(Section::Services)[0].id.clone();
        let AdminOutcome::Record(record) = fx
            .run(Section::Services, AdminAction::Show { id: Some(id) })
            .unwrap()
        else {
            panic!("expected record");
        };
        assert_eq!(record["title"], "Website Development");
        assert_eq!(record["icon"], "Globe");
    }

    #[test]
    fn show_without_id_is_error() {
        let fx = Fixture::new(true);
        assert!(matches!(
            fx.run(Section::Projects, AdminAction::Show { id: None }),
            Err(AdminError::MissingId { .. })
        ));
    }

    #[test]
    fn delete_through_runner() {
        let fx = Fixture::new(true);
        let id = fx.rows(Section::Process)[3].id.clone();
        assert_eq!(
            fx.run(Section::Process, AdminAction::Delete { id: id.clone() })
                .unwrap(),
            AdminOutcome::Deleted { id }
        );
        assert_eq!(fx.rows(Section::Process).len(), 3);
    }

    #[test]
    fn page_heroes_cannot_be_added_or_deleted() {
        let fx = Fixture::new(true);
        assert!(matches!(
            fx.run(Section::PageHeroes, AdminAction::Add),
            Err(AdminError::Unsupported { action: "add", .. })
        ));
        let id = fx.rows(Section::PageHeroes)[0].id.clone();
        assert!(matches!(
            fx.run(Section::PageHeroes, AdminAction::Delete { id }),
            Err(AdminError::Unsupported { action: "delete", .. })
        ));
    }

    #[test]
    fn attach_uploads_and_saves() {
        let fx = Fixture::new(true);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shot.png");
        std::fs::write(&path, png_bytes(256)).unwrap();
        let id = fx.rows(Section::Projects)[0].id.clone();

        let AdminOutcome::Record(record) = fx
            .run(
                Section::Projects,
                AdminAction::Attach {
                    id: Some(id),
                    field: "image_url".into(),
                    file: path,
                },
            )
            .unwrap()
        else {
            panic!("expected record");
        };
        assert!(record["image_url"].as_str().unwrap().contains("/projects/"));
        assert_eq!(
            fx.notifier.messages(),
            ["Image uploaded successfully!", "Project updated!"]
        );
    }

    // =========================================================================
    // Singletons
    // =========================================================================

    #[test]
    fn unseeded_singleton_reports_not_seeded() {
        let fx = Fixture::new(false);
        assert_eq!(
            fx.run(Section::Cta, AdminAction::Show { id: None }).unwrap(),
            AdminOutcome::NotSeeded { noun: "call to action" }
        );
        assert_eq!(
            fx.run(
                Section::Cta,
                AdminAction::Set {
                    id: None,
                    assignments: strings(&["title=x"])
                }
            )
            .unwrap(),
            AdminOutcome::NotSeeded { noun: "call to action" }
        );
        assert!(fx.store.select(Table::CtaContent).unwrap().is_empty());
    }

    #[test]
    fn singleton_set_saves() {
        let fx = Fixture::new(true);
        let AdminOutcome::Record(record) = fx
            .run(
                Section::Contact,
                AdminAction::Set {
                    id: None,
                    assignments: strings(&["phone=+1 555 0100", "whatsapp_number:=null"]),
                },
            )
            .unwrap()
        else {
            panic!("expected record");
        };
        assert_eq!(record["phone"], "+1 555 0100");
        assert_eq!(record["whatsapp_number"], Value::Null);
        assert_eq!(fx.notifier.messages(), ["Contact info updated!"]);
    }

    #[test]
    fn singleton_add_is_unsupported() {
        let fx = Fixture::new(true);
        assert!(matches!(
            fx.run(Section::Hero, AdminAction::Add),
            Err(AdminError::Unsupported { .. })
        ));
    }
}
