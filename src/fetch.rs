//! Content fetch hooks.
//!
//! One function per content type, each reading through the [`QueryCache`]
//! and returning a [`FetchState`]. Collections come back in display order;
//! singletons come back as `Data(None)` when the table has not been seeded.
//!
//! [`SiteContent`] sits on top for the page renderer: it resolves every
//! section to either fetched content or fallback content, and remembers
//! which sections fell back so the build can report them.

use crate::cache::{FetchState, QueryCache, QueryKey};
use crate::content::{
    Banner, BlogPost, ContactInfo, CtaContent, HeroContent, Ordered, PageHero, ProcessStep,
    Project, Reason, Record, Service, Singleton, Testimonial,
};
use crate::fallback::FallbackContent;
use crate::repo;
use crate::store::ContentStore;
use std::cell::RefCell;
use std::collections::BTreeSet;

pub fn collection<R: Ordered>(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<R>> {
    cache.fetch(&QueryKey::table(R::TABLE), || repo::list::<R>(store))
}

pub fn singleton<R: Singleton>(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Option<R>> {
    cache.fetch(&QueryKey::table(R::TABLE), || repo::fetch_single::<R>(store))
}

pub fn services(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<Service>> {
    collection(cache, store)
}

pub fn banners(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<Banner>> {
    collection(cache, store)
}

pub fn why_choose_us(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<Reason>> {
    collection(cache, store)
}

pub fn process_steps(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<ProcessStep>> {
    collection(cache, store)
}

pub fn testimonials(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<Testimonial>> {
    collection(cache, store)
}

pub fn projects(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<Project>> {
    collection(cache, store)
}

/// Newest first.
pub fn blog_posts(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Vec<BlogPost>> {
    collection(cache, store)
}

pub fn hero_content(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Option<HeroContent>> {
    singleton(cache, store)
}

pub fn cta_content(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Option<CtaContent>> {
    singleton(cache, store)
}

pub fn contact_info(cache: &QueryCache, store: &dyn ContentStore) -> FetchState<Option<ContactInfo>> {
    singleton(cache, store)
}

/// Hero for one page, cached per slug.
pub fn page_hero(
    cache: &QueryCache,
    store: &dyn ContentStore,
    slug: &str,
) -> FetchState<Option<PageHero>> {
    cache.fetch(&QueryKey::slug(PageHero::TABLE, slug), || {
        repo::find_page_hero(store, slug)
    })
}

/// Every section a page needs, fetched or fallen back.
pub struct SiteContent<'a> {
    cache: &'a QueryCache,
    store: &'a dyn ContentStore,
    fallback: &'a FallbackContent,
    fell_back: RefCell<BTreeSet<String>>,
}

impl<'a> SiteContent<'a> {
    pub fn new(cache: &'a QueryCache, store: &'a dyn ContentStore, fallback: &'a FallbackContent) -> Self {
        Self {
            cache,
            store,
            fallback,
            fell_back: RefCell::new(BTreeSet::new()),
        }
    }

    /// Sections that rendered fallback content, sorted.
    pub fn fallbacks(&self) -> Vec<String> {
        self.fell_back.borrow().iter().cloned().collect()
    }

    fn note_fallback(&self, section: String, reason: &str) {
        tracing::info!(%section, reason, "using fallback content");
        self.fell_back.borrow_mut().insert(section);
    }

    fn resolve_list<R: Ordered>(&self, stock: &[R]) -> Vec<R> {
        match collection::<R>(self.cache, self.store) {
            FetchState::Data(rows) if !rows.is_empty() => rows,
            FetchState::Data(_) => {
                self.note_fallback(R::TABLE.to_string(), "empty");
                stock.to_vec()
            }
            FetchState::Error(e) => {
                self.note_fallback(R::TABLE.to_string(), &e);
                stock.to_vec()
            }
            FetchState::Loading => {
                self.note_fallback(R::TABLE.to_string(), "loading");
                stock.to_vec()
            }
        }
    }

    fn resolve_single<R: Singleton>(&self, stock: &R) -> R {
        self.resolve_option(singleton::<R>(self.cache, self.store), R::TABLE.to_string(), stock)
    }

    fn resolve_option<R: Clone>(&self, state: FetchState<Option<R>>, section: String, stock: &R) -> R {
        match state {
            FetchState::Data(Some(record)) => record,
            FetchState::Data(None) => {
                self.note_fallback(section, "not seeded");
                stock.clone()
            }
            FetchState::Error(e) => {
                self.note_fallback(section, &e);
                stock.clone()
            }
            FetchState::Loading => {
                self.note_fallback(section, "loading");
                stock.clone()
            }
        }
    }

    pub fn hero(&self) -> HeroContent {
        self.resolve_single(&self.fallback.hero)
    }

    pub fn banners(&self) -> Vec<Banner> {
        self.resolve_list(&self.fallback.banners)
    }

    pub fn services(&self) -> Vec<Service> {
        self.resolve_list(&self.fallback.services)
    }

    pub fn reasons(&self) -> Vec<Reason> {
        self.resolve_list(&self.fallback.reasons)
    }

    pub fn process_steps(&self) -> Vec<ProcessStep> {
        self.resolve_list(&self.fallback.process_steps)
    }

    pub fn testimonials(&self) -> Vec<Testimonial> {
        self.resolve_list(&self.fallback.testimonials)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.resolve_list(&self.fallback.projects)
    }

    pub fn blog_posts(&self) -> Vec<BlogPost> {
        self.resolve_list(&self.fallback.blog_posts)
    }

    pub fn cta(&self) -> CtaContent {
        self.resolve_single(&self.fallback.cta)
    }

    pub fn contact(&self) -> ContactInfo {
        self.resolve_single(&self.fallback.contact)
    }

    pub fn page_hero(&self, slug: &str) -> PageHero {
        let state = page_hero(self.cache, self.store, slug);
        self.resolve_option(
            state,
            format!("{}/{}", PageHero::TABLE, slug),
            &self.fallback.page_hero(slug),
        )
    }
}
