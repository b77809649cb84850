//! Content records, one struct per table.
//!
//! Records are plain serde structs. The store owns `id` and `revision`; both
//! are empty/zero on a record that has not been inserted yet. Unknown fields
//! are rejected so a mistyped column in a patch or a data file surfaces as an
//! error rather than being dropped.
//!
//! Three capability traits sit on top of [`Record`]:
//!
//! - [`Ordered`]: a collection with an explicit display order.
//! - [`Insertable`]: an ordered collection the admin can add to and delete
//!   from. Page heroes are ordered but not insertable.
//! - [`Singleton`]: at most one row; editors never insert.

use crate::icons::Icon;
use crate::store::Table;
use crate::upload::Folder;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug + 'static {
    const TABLE: Table;
    /// Singular noun for notifications ("banner").
    const NOUN: &'static str;
    /// Plural noun for notifications ("banners").
    const PLURAL: &'static str;
    /// Columns the editor refuses to patch, besides `id` and `revision`.
    const READ_ONLY: &'static [&'static str] = &[];
    /// Object-store folder for images attached to this record type.
    const UPLOAD_FOLDER: Folder = Folder::Uploads;

    fn id(&self) -> &str;
    fn revision(&self) -> u64;
    /// One-line summary for listings.
    fn label(&self) -> String;

    /// Form-level checks applied before a save.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

pub trait Ordered: Record {
    /// Display order. Sorting with this is stable, so duplicate positions
    /// keep storage order.
    fn display_cmp(&self, other: &Self) -> Ordering;
    /// Short position marker for listings (`#3`, a date, a slug).
    fn position_label(&self) -> String;
}

pub trait Insertable: Ordered {
    /// Placeholder row created by "Add". `position` is the current
    /// collection length.
    fn placeholder(position: usize, now: DateTime<Utc>) -> Self;
}

pub trait Singleton: Record {}

fn position(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

macro_rules! record_identity {
    () => {
        fn id(&self) -> &str {
            &self.id
        }

        fn revision(&self) -> u64 {
            self.revision
        }
    };
}

macro_rules! ordered_by_index {
    ($ty:ty) => {
        impl Ordered for $ty {
            fn display_cmp(&self, other: &Self) -> Ordering {
                self.order_index.cmp(&other.order_index)
            }

            fn position_label(&self) -> String {
                format!("#{}", self.order_index)
            }
        }
    };
}

const STOCK_BANNER_IMAGE: &str =
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=1920&q=80";
const STOCK_PROJECT_IMAGE: &str =
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&q=80";
const STOCK_BLOG_IMAGE: &str =
    "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=800&q=80";

// ============================================================================
// Singletons
// ============================================================================

/// Home page hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeroContent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub subtitle: String,
    pub title: String,
    /// Trailing part of the title rendered in the accent color.
    pub highlight_text: String,
    pub description: String,
    pub button_text: String,
    pub button_link: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Record for HeroContent {
    const TABLE: Table = Table::HeroContent;
    const NOUN: &'static str = "hero content";
    const PLURAL: &'static str = "hero content";
    const UPLOAD_FOLDER: Folder = Folder::Hero;

    record_identity!();

    fn label(&self) -> String {
        format!("{} {}", self.title, self.highlight_text)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("button_link", &self.button_link)
    }
}

impl Singleton for HeroContent {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CtaContent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub button_link: String,
}

impl Record for CtaContent {
    const TABLE: Table = Table::CtaContent;
    const NOUN: &'static str = "call to action";
    const PLURAL: &'static str = "call to action";

    record_identity!();

    fn label(&self) -> String {
        self.title.clone()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("button_link", &self.button_link)
    }
}

impl Singleton for CtaContent {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Digits only, international format without `+`.
    #[serde(default)]
    pub whatsapp_number: Option<String>,
}

impl Record for ContactInfo {
    const TABLE: Table = Table::ContactInfo;
    const NOUN: &'static str = "contact info";
    const PLURAL: &'static str = "contact info";

    record_identity!();

    fn label(&self) -> String {
        format!("{} / {}", self.email, self.phone)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email)
    }
}

impl Singleton for ContactInfo {}

// ============================================================================
// Page heroes (one row per page slug)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageHero {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub page_slug: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub background_image: String,
}

impl PageHero {
    /// Bare hero for a page with neither stored nor fallback content.
    pub fn untitled(slug: &str) -> Self {
        let mut chars = slug.chars();
        let title = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            id: String::new(),
            revision: 0,
            page_slug: slug.to_string(),
            title,
            subtitle: String::new(),
            description: String::new(),
            background_image: String::new(),
        }
    }
}

impl Record for PageHero {
    const TABLE: Table = Table::PageHeroes;
    const NOUN: &'static str = "page hero";
    const PLURAL: &'static str = "page heroes";
    const READ_ONLY: &'static [&'static str] = &["page_slug"];
    const UPLOAD_FOLDER: Folder = Folder::PageHeroes;

    record_identity!();

    fn label(&self) -> String {
        self.title.clone()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl Ordered for PageHero {
    fn display_cmp(&self, other: &Self) -> Ordering {
        self.page_slug.cmp(&other.page_slug)
    }

    fn position_label(&self) -> String {
        self.page_slug.clone()
    }
}

// ============================================================================
// Ordered collections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Banner {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub subtitle: String,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub button_link: String,
    pub image_url: String,
    /// Image on the left instead of the right.
    pub is_reversed: bool,
    pub order_index: i32,
}

impl Record for Banner {
    const TABLE: Table = Table::Banners;
    const NOUN: &'static str = "banner";
    const PLURAL: &'static str = "banners";
    const UPLOAD_FOLDER: Folder = Folder::Banners;

    record_identity!();

    fn label(&self) -> String {
        format!("{} ({})", self.title, self.subtitle)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

ordered_by_index!(Banner);

impl Insertable for Banner {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            subtitle: "New Banner".into(),
            title: "Banner Title".into(),
            description: "Banner description text".into(),
            button_text: "Learn More".into(),
            button_link: "/".into(),
            image_url: STOCK_BANNER_IMAGE.into(),
            is_reversed: false,
            order_index: self::position(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub title: String,
    pub description: String,
    pub icon: Icon,
    pub features: Vec<String>,
    pub order_index: i32,
}

impl Record for Service {
    const TABLE: Table = Table::Services;
    const NOUN: &'static str = "service";
    const PLURAL: &'static str = "services";

    record_identity!();

    fn label(&self) -> String {
        format!("{} [{}]", self.title, self.icon)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)
    }
}

ordered_by_index!(Service);

impl Insertable for Service {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            title: "New Service".into(),
            description: "Service description".into(),
            icon: Icon::Globe,
            features: vec!["Feature 1".into(), "Feature 2".into()],
            order_index: self::position(position),
        }
    }
}

/// A "why choose us" reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reason {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub icon: Icon,
    pub title: String,
    pub description: String,
    pub order_index: i32,
}

impl Record for Reason {
    const TABLE: Table = Table::WhyChooseUs;
    const NOUN: &'static str = "reason";
    const PLURAL: &'static str = "reasons";

    record_identity!();

    fn label(&self) -> String {
        format!("{} [{}]", self.title, self.icon)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

ordered_by_index!(Reason);

impl Insertable for Reason {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            icon: Icon::Target,
            title: "New Reason".into(),
            description: "Description of why clients should choose us".into(),
            order_index: self::position(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessStep {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    /// Display label such as `"01"`; independent of `order_index`.
    pub step_number: String,
    pub icon: Icon,
    pub title: String,
    pub description: String,
    pub order_index: i32,
}

impl Record for ProcessStep {
    const TABLE: Table = Table::ProcessSteps;
    const NOUN: &'static str = "process step";
    const PLURAL: &'static str = "process steps";

    record_identity!();

    fn label(&self) -> String {
        format!("{} {}", self.step_number, self.title)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

ordered_by_index!(ProcessStep);

impl Insertable for ProcessStep {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            step_number: format!("{:02}", position + 1),
            icon: Icon::MessageSquare,
            title: "New Step".into(),
            description: "Step description".into(),
            order_index: self::position(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Testimonial {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Star rating, 1 to 5.
    pub rating: i32,
    pub order_index: i32,
}

impl Record for Testimonial {
    const TABLE: Table = Table::Testimonials;
    const NOUN: &'static str = "testimonial";
    const PLURAL: &'static str = "testimonials";
    const UPLOAD_FOLDER: Folder = Folder::Testimonials;

    record_identity!();

    fn label(&self) -> String {
        format!("{}, {} ({}★)", self.name, self.company, self.rating)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        required("content", &self.content)?;
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: 1,
                max: 5,
                value: i64::from(self.rating),
            });
        }
        Ok(())
    }
}

ordered_by_index!(Testimonial);

impl Insertable for Testimonial {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            name: "Client Name".into(),
            role: "CEO".into(),
            company: "Company Name".into(),
            content: "Testimonial content goes here...".into(),
            avatar_url: None,
            rating: 5,
            order_index: self::position(position),
        }
    }
}

/// Portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    pub order_index: i32,
}

impl Record for Project {
    const TABLE: Table = Table::Projects;
    const NOUN: &'static str = "project";
    const PLURAL: &'static str = "projects";
    const UPLOAD_FOLDER: Folder = Folder::Projects;

    record_identity!();

    fn label(&self) -> String {
        format!("{} ({})", self.title, self.category)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("category", &self.category)
    }
}

ordered_by_index!(Project);

impl Insertable for Project {
    fn placeholder(position: usize, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            title: "New Project".into(),
            category: "WordPress".into(),
            description: "Project description".into(),
            image_url: STOCK_PROJECT_IMAGE.into(),
            link: None,
            order_index: self::position(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogPost {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub title: String,
    pub excerpt: String,
    /// Markdown body.
    pub content: String,
    pub category: String,
    pub author: String,
    pub author_role: String,
    pub image_url: String,
    pub read_time: String,
    pub is_featured: bool,
    pub published_at: DateTime<Utc>,
}

impl Record for BlogPost {
    const TABLE: Table = Table::BlogPosts;
    const NOUN: &'static str = "post";
    const PLURAL: &'static str = "posts";
    const UPLOAD_FOLDER: Folder = Folder::Blog;

    record_identity!();

    fn label(&self) -> String {
        if self.is_featured {
            format!("{} ★", self.title)
        } else {
            self.title.clone()
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("content", &self.content)
    }
}

impl Ordered for BlogPost {
    /// Newest first.
    fn display_cmp(&self, other: &Self) -> Ordering {
        other.published_at.cmp(&self.published_at)
    }

    fn position_label(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }
}

impl Insertable for BlogPost {
    fn placeholder(_position: usize, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            revision: 0,
            title: "New Blog Post".into(),
            excerpt: "Brief excerpt of the post...".into(),
            content: "Full blog post content goes here...".into(),
            category: "Development".into(),
            author: "SyncMindTech".into(),
            author_role: "Team".into(),
            image_url: STOCK_BLOG_IMAGE.into(),
            read_time: "5 min read".into(),
            is_featured: false,
            published_at: now,
        }
    }
}
