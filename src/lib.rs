//! # Agency Site
//!
//! A static site generator and content editor for a digital agency's
//! marketing site. Content lives in a small table store, is edited through
//! per-section editors, and is rendered to plain HTML. Any section with no
//! stored content renders built-in fallback content, so the site is complete
//! from the first build.
//!
//! # Architecture: Store → Fetch → Render, with Editors on the Side
//!
//! ```text
//! data/*.json  ──ContentStore──►  QueryCache  ──►  SiteContent  ──►  dist/
//!      ▲                                               ▲
//!      └── editors (admin) ◄── uploads (storage/)      └── FallbackContent
//! ```
//!
//! - **Store**: rows are JSON objects in named tables. Every row carries an
//!   `id` and a `revision`; updates name the revision they were read at.
//! - **Fetch**: one hook per content type reads through a query cache with a
//!   stale window and an idle eviction window, and returns a load state.
//! - **Render**: [`generate`] resolves each section to stored or fallback
//!   content and writes one HTML file per page with Maud.
//! - **Edit**: [`editor`] wraps a table in a viewing/editing/saving state
//!   machine that reports every write through a notifier. [`admin`] maps
//!   dashboard sections and command-line actions onto editors.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Table store trait, in-memory and JSON-directory backends, revision checks |
//! | [`content`] | Typed records for every table, validation, display order, placeholders |
//! | [`repo`] | Typed reads and writes over a store, JSON patch merging |
//! | [`cache`] | Query cache with stale and idle windows and a pluggable clock |
//! | [`fetch`] | Content fetch hooks and fallback resolution for the renderer |
//! | [`fallback`] | Built-in fallback content, `fallback.toml` overrides, seeding |
//! | [`editor`] | Collection and singleton editors |
//! | [`admin`] | Dashboard sections and the command runner |
//! | [`upload`] | Image validation, object keys, object store seam, local bucket |
//! | [`notify`] | Notification and confirmation seams |
//! | [`contact`] | Contact form relay client and chat deep-link |
//! | [`provision`] | Idempotent administrator provisioning |
//! | [`generate`] | HTML rendering of every page |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`icons`] | Closed icon set with inline SVG glyphs |
//! | [`naming`] | Slugs and upload key naming |
//! | [`output`] | CLI output formatting and terminal notifier/confirm |
//!
//! # Design Decisions
//!
//! ## Fallback Over Failure
//!
//! A section whose fetch fails, is empty, or has no row renders its fallback
//! content and is listed in the build report. Nothing about content state
//! stops a build; only unreadable config does.
//!
//! ## Revision Counter Instead of Last-Write-Wins
//!
//! Two editors working on the same row used to overwrite each other. Every
//! row now carries a `revision`; an update naming a stale revision fails with
//! a conflict and the editor keeps its draft so nothing typed is lost.
//!
//! ## Closed Icon Set
//!
//! Icons are an enum, not free-form names. A record naming an unknown icon is
//! rejected when it is read or patched instead of rendering a default glyph.
//!
//! ## Uploads Are Decoupled From Saves
//!
//! An upload returns a public URL; writing that URL into a record is a
//! separate save. Objects that end up unreferenced are never collected.

pub mod admin;
pub mod cache;
pub mod config;
pub mod contact;
pub mod content;
pub mod editor;
pub mod fallback;
pub mod fetch;
pub mod generate;
pub mod icons;
pub mod naming;
pub mod notify;
pub mod output;
pub mod provision;
pub mod repo;
pub mod store;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
