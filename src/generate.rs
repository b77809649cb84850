//! HTML site generation.
//!
//! Renders the public site from [`SiteContent`]: every section is either the
//! stored content or its fallback, so a build against an empty or unreachable
//! store still produces a complete site.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): hero, banners interleaved with services,
//!   reasons, process steps, about, testimonials and the call to action
//! - **About** (`/about/index.html`)
//! - **Services** (`/services/index.html`): service cards plus a feature
//!   breakdown per service
//! - **Work** (`/work/index.html`): project grid with category filter chips
//! - **Blog** (`/blog/index.html`) and one page per post
//!   (`/blog/{slug}/index.html`), bodies rendered from markdown
//! - **Contact** (`/contact/index.html`): contact details and the relay form
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about/index.html
//! ├── services/index.html
//! ├── work/index.html
//! ├── blog/
//! │   ├── index.html
//! │   └── {slug}/index.html
//! ├── contact/index.html
//! └── storage/cms-images/...      # copied object bucket
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/reveal.js`: scroll-in animations
//! - `static/contact.js`: posts the contact form to the relay
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated content is escaped; raw HTML inside markdown bodies is
//! rendered as text.

use crate::cache::{CacheStats, QueryCache};
use crate::config::{self, ConfigError, SiteConfig, SiteInfo};
use crate::contact::{self, FAILED_MESSAGE, SENT_MESSAGE};
use crate::content::{
    Banner, BlogPost, ContactInfo, CtaContent, HeroContent, PageHero, ProcessStep, Project, Reason,
    Service, Testimonial,
};
use crate::fallback::FallbackContent;
use crate::fetch::SiteContent;
use crate::icons::Icon;
use crate::naming;
use crate::store::{ContentStore, JsonDirStore};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Parser, Tag, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const REVEAL_JS: &str = include_str!("../static/reveal.js");
const CONTACT_JS: &str = include_str!("../static/contact.js");

/// Top navigation, in display order. Paths are relative to the site base.
const NAV: [(&str, &str); 5] = [
    ("Services", "services/"),
    ("About", "about/"),
    ("Work", "work/"),
    ("Blog", "blog/"),
    ("Contact", "contact/"),
];

/// What a build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Written pages, relative to the output directory.
    pub pages: Vec<String>,
    /// Sections that rendered fallback content.
    pub fallbacks: Vec<String>,
    /// Files copied from the object bucket.
    pub assets: usize,
    pub cache: CacheStats,
}

/// Build the site from the project at `root` into `output_dir`.
pub fn build(root: &Path, output_dir: &Path, config: &SiteConfig) -> Result<BuildReport, GenerateError> {
    let store = JsonDirStore::new(config.data_dir(root));
    let fallback = FallbackContent::load(root)?;
    let cache = QueryCache::new(config.cache.policy());

    let mut report = render_site(&store, &cache, &fallback, config, output_dir)?;
    report.assets = copy_bucket(root, output_dir, config)?;
    Ok(report)
}

/// Render every page from `store` into `output_dir`.
pub fn render_site(
    store: &dyn ContentStore,
    cache: &QueryCache,
    fallback: &FallbackContent,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<BuildReport, GenerateError> {
    let site = SiteContent::new(cache, store, fallback);
    let contact = site.contact();
    let color_css = config::generate_color_css(&config.colors);
    let chrome = Chrome {
        site: &config.site,
        css: format!("{}\n\n{}", color_css, CSS_STATIC),
        chat_number: contact::chat_number(Some(&contact), &config.chat),
        contact,
    };

    fs::create_dir_all(output_dir)?;
    let mut pages = Vec::new();
    let mut write = |path: String, page: Markup| -> Result<(), GenerateError> {
        let target = output_dir.join(&path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, page.into_string())?;
        tracing::debug!(page = %path, "wrote page");
        pages.push(path);
        Ok(())
    };

    write("index.html".into(), render_home(&chrome, &site))?;
    write("about/index.html".into(), render_about_page(&chrome, &site))?;
    write("services/index.html".into(), render_services_page(&chrome, &site))?;
    write("work/index.html".into(), render_work_page(&chrome, &site))?;

    let posts = site.blog_posts();
    let slugs = naming::unique_slugs(posts.iter().map(|p| p.title.as_str()));
    write(
        "blog/index.html".into(),
        render_blog_page(&chrome, &site.page_hero("blog"), &posts, &slugs),
    )?;
    for (post, slug) in posts.iter().zip(&slugs) {
        write(format!("blog/{slug}/index.html"), render_post_page(&chrome, post))?;
    }

    write(
        "contact/index.html".into(),
        render_contact_page(&chrome, &site.page_hero("contact"), &config.contact),
    )?;

    Ok(BuildReport {
        pages,
        fallbacks: site.fallbacks(),
        assets: 0,
        cache: cache.stats(),
    })
}

/// Copy the object bucket to where its public URLs point inside the output.
/// Buckets served from another host are left alone.
fn copy_bucket(root: &Path, output_dir: &Path, config: &SiteConfig) -> Result<usize, GenerateError> {
    let Some(served_at) = config.storage.public_url.strip_prefix('/') else {
        tracing::debug!(url = %config.storage.public_url, "bucket served externally, not copied");
        return Ok(0);
    };
    let source = config.storage_dir(root).join(&config.storage.bucket);
    if !source.is_dir() {
        return Ok(0);
    }
    let target = output_dir.join(served_at).join(&config.storage.bucket);
    copy_tree(&source, &target)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|source| GenerateError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let dst_path = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst_path)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Everything every page shares.
struct Chrome<'a> {
    site: &'a SiteInfo,
    css: String,
    contact: ContactInfo,
    chat_number: Option<String>,
}

/// Renders the base HTML document structure
fn base_document(chrome: &Chrome, title: &str, current: &str, content: Markup) -> Markup {
    let full_title = if title.is_empty() {
        chrome.site.name()
    } else {
        format!("{} | {}", title, chrome.site.name())
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(chrome.site.tagline);
                title { (full_title) }
                style { (PreEscaped(&chrome.css)) }
            }
            body {
                (site_header(chrome.site, current))
                (content)
                (site_footer(chrome))
                @if let Some(number) = &chrome.chat_number {
                    (chat_button(number))
                }
                script { (PreEscaped(REVEAL_JS)) }
            }
        }
    }
}

fn wordmark(site: &SiteInfo) -> Markup {
    html! {
        a.wordmark href=(site.link("")) {
            (site.name_primary)
            span.accent { (site.name_secondary) }
        }
    }
}

/// Renders the site header: wordmark, navigation and the contact button
fn site_header(site: &SiteInfo, current: &str) -> Markup {
    html! {
        header.site-header {
            (wordmark(site))
            nav.site-nav {
                (render_nav(site, current))
            }
        }
    }
}

/// Renders the navigation menu (hamburger on narrow screens)
pub fn render_nav(site: &SiteInfo, current: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" aria-label="Menu" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        ul.nav-links {
            @for (title, path) in NAV {
                @let is_current = !current.is_empty() && current.starts_with(path);
                li class=[is_current.then_some("current")] {
                    a href=(site.link(path)) aria-current=[is_current.then_some("page")] { (title) }
                }
            }
            li.nav-cta {
                a.button href=(site.link("contact/")) { "Get Started" }
            }
        }
    }
}

fn site_footer(chrome: &Chrome) -> Markup {
    let site = chrome.site;
    html! {
        footer.site-footer {
            div.footer-grid {
                div.footer-brand {
                    (wordmark(site))
                    p.muted { (site.footer_blurb) }
                }
                div {
                    h4 { "Services" }
                    ul {
                        @for name in ["WordPress", "Webflow", "Shopify", "SEO", "Figma Design"] {
                            li { a href=(site.link("services/")) { (name) } }
                        }
                    }
                }
                div {
                    h4 { "Company" }
                    ul {
                        @for (title, path) in NAV.iter().skip(1) {
                            li { a href=(site.link(path)) { (title) } }
                        }
                    }
                }
                div {
                    h4 { "Contact" }
                    ul.contact-lines {
                        li { a href={ "mailto:" (chrome.contact.email) } { (chrome.contact.email) } }
                        li { (chrome.contact.phone) }
                        li { (chrome.contact.address) }
                    }
                }
            }
            p.copyright {
                "© " (chrono::Utc::now().format("%Y").to_string()) " " (site.name()) ". All rights reserved."
            }
        }
    }
}

fn chat_button(number: &str) -> Markup {
    html! {
        a.chat-button href=(contact::whatsapp_link(number)) target="_blank" rel="noopener noreferrer"
            aria-label="Chat on WhatsApp" {
            (Icon::MessageSquare.render("chat-icon"))
        }
    }
}

fn section_heading(eyebrow: &str, title: &str, lead: Option<&str>) -> Markup {
    html! {
        header.section-heading.reveal {
            span.eyebrow { (eyebrow) }
            h2 { (title) }
            @if let Some(lead) = lead {
                p.lead { (lead) }
            }
        }
    }
}

fn button_link(text: &str, link: &str, class: &str) -> Markup {
    html! {
        a class={ "button " (class) } href=(link) { (text) }
    }
}

fn hero_section(hero: &HeroContent) -> Markup {
    html! {
        section.hero {
            div.hero-text.reveal {
                span.eyebrow { (hero.subtitle) }
                h1 {
                    (hero.title) " "
                    span.accent { (hero.highlight_text) }
                }
                p.lead { (hero.description) }
                (button_link(&hero.button_text, &hero.button_link, "primary"))
            }
            @if let Some(image) = hero.image_url.as_deref().filter(|u| !u.is_empty()) {
                img.hero-image src=(image) alt=(hero.title);
            }
        }
    }
}

/// Percent-encode the characters that could close a quoted CSS `url()`.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' | '"' | '(' | ')' | '\\' => out.push_str(&format!("%{:02X}", c as u32)),
            c if c.is_whitespace() || c.is_control() => out.push_str(&format!("%{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn page_hero_section(hero: &PageHero) -> Markup {
    let style = (!hero.background_image.is_empty())
        .then(|| format!("background-image: url('{}')", css_url(&hero.background_image)));
    html! {
        section.page-hero style=[style] {
            div.page-hero-text.reveal {
                @if !hero.subtitle.is_empty() {
                    span.eyebrow { (hero.subtitle) }
                }
                h1 { (hero.title) }
                @if !hero.description.is_empty() {
                    p.lead { (hero.description) }
                }
            }
        }
    }
}

fn banner_section(banner: &Banner) -> Markup {
    html! {
        section.banner.reveal.reversed[banner.is_reversed] {
            @if !banner.image_url.is_empty() {
                img.banner-image src=(banner.image_url) alt=(banner.title) loading="lazy";
            }
            div.banner-text {
                span.eyebrow { (banner.subtitle) }
                h2 { (banner.title) }
                p { (banner.description) }
                (button_link(&banner.button_text, &banner.button_link, "outline"))
            }
        }
    }
}

fn services_section(services: &[Service]) -> Markup {
    html! {
        section.services {
            (section_heading("What We Do", "Services That Drive Results",
                Some("From stunning websites to powerful e-commerce solutions, we deliver digital excellence.")))
            div.card-grid {
                @for service in services {
                    article.card.reveal {
                        (service.icon.render("card-icon"))
                        h3 { (service.title) }
                        p.muted { (service.description) }
                    }
                }
            }
        }
    }
}

fn service_details_section(services: &[Service]) -> Markup {
    html! {
        section.service-details {
            @for service in services {
                article.detail.reveal {
                    (service.icon.render("detail-icon"))
                    div {
                        h3 { (service.title) }
                        p { (service.description) }
                        @if !service.features.is_empty() {
                            ul.features {
                                @for feature in &service.features {
                                    li { (Icon::Check.render("check")) (feature) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reasons_section(reasons: &[Reason]) -> Markup {
    html! {
        section.reasons {
            (section_heading("Why Choose Us", "Your Success Is Our Priority", None))
            div.card-grid {
                @for reason in reasons {
                    article.card.reveal {
                        (reason.icon.render("card-icon"))
                        h3 { (reason.title) }
                        p.muted { (reason.description) }
                    }
                }
            }
        }
    }
}

fn process_section(steps: &[ProcessStep]) -> Markup {
    html! {
        section.process {
            (section_heading("How We Work", "Our Proven Process", None))
            ol.steps {
                @for step in steps {
                    li.step.reveal {
                        span.step-number { (step.step_number) }
                        (step.icon.render("step-icon"))
                        h3 { (step.title) }
                        p.muted { (step.description) }
                    }
                }
            }
        }
    }
}

fn about_section() -> Markup {
    html! {
        section.about {
            (section_heading("About Us", "Crafting Digital Experiences Since Day One",
                Some("We are a team of designers and developers who build websites, stores and brands that perform.")))
            div.about-grid.reveal {
                @for (icon, title, text) in [
                    (Icon::Target, "Mission-Driven", "Every project starts from your business goals."),
                    (Icon::Users, "Collaborative", "We work alongside you from wireframe to launch."),
                    (Icon::Award, "Quality First", "Pixel-perfect design and clean, fast code."),
                ] {
                    div.feature {
                        (icon.render("card-icon"))
                        h3 { (title) }
                        p.muted { (text) }
                    }
                }
            }
            blockquote.philosophy.reveal {
                p { "Great design is not just how it looks, it is how it works for your customers." }
                footer { "Our Philosophy" }
            }
        }
    }
}

fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn testimonials_section(testimonials: &[Testimonial]) -> Markup {
    html! {
        section.testimonials {
            (section_heading("Testimonials", "What Our Clients Say", None))
            div.card-grid {
                @for t in testimonials {
                    figure.card.testimonial.reveal {
                        span.rating aria-label={ (t.rating) " out of 5" } { (stars(t.rating)) }
                        blockquote { (t.content) }
                        figcaption {
                            @if let Some(avatar) = t.avatar_url.as_deref().filter(|u| !u.is_empty()) {
                                img.avatar src=(avatar) alt=(t.name) loading="lazy";
                            }
                            strong { (t.name) }
                            span.muted { (t.role) ", " (t.company) }
                        }
                    }
                }
            }
        }
    }
}

fn cta_section(cta: &CtaContent) -> Markup {
    html! {
        section.cta.reveal {
            h2 { (cta.title) }
            p.lead { (cta.description) }
            (button_link(&cta.button_text, &cta.button_link, "primary"))
        }
    }
}

/// Categories in first-seen order.
fn categories(projects: &[Project]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for project in projects {
        if !seen.contains(&project.category.as_str()) {
            seen.push(&project.category);
        }
    }
    seen
}

fn projects_section(projects: &[Project]) -> Markup {
    html! {
        section.projects {
            div.filters role="group" aria-label="Filter projects" {
                button.chip.active type="button" data-filter="all" { "All" }
                @for category in categories(projects) {
                    button.chip type="button" data-filter=(category) { (category) }
                }
            }
            div.project-grid {
                @for project in projects {
                    article.project.reveal data-category=(project.category) {
                        img src=(project.image_url) alt=(project.title) loading="lazy";
                        div.project-text {
                            span.eyebrow { (project.category) }
                            h3 {
                                @if let Some(link) = project.link.as_deref().filter(|l| !l.is_empty()) {
                                    a href=(link) target="_blank" rel="noopener" { (project.title) }
                                } @else {
                                    (project.title)
                                }
                            }
                            p.muted { (project.description) }
                        }
                    }
                }
            }
        }
    }
}

/// Whether a link target is relative or uses http, https or mailto.
/// Whitespace and control characters are ignored when reading the scheme.
fn is_safe_link(url: &str) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    match cleaned.find([':', '/', '?', '#']) {
        Some(i) if cleaned[i..].starts_with(':') => matches!(
            cleaned[..i].to_ascii_lowercase().as_str(),
            "http" | "https" | "mailto"
        ),
        _ => true,
    }
}

fn safe_dest(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_link(&url) {
        url
    } else {
        CowStr::Borrowed("")
    }
}

/// Markdown to HTML. Raw HTML in the source is escaped, not passed through,
/// and link or image targets with any other scheme than http, https or
/// mailto are emptied.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

fn post_meta(post: &BlogPost) -> Markup {
    html! {
        p.post-meta.muted {
            time datetime=(post.published_at.to_rfc3339()) { (post.published_at.format("%B %-d, %Y").to_string()) }
            " · " (post.read_time)
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_home(chrome: &Chrome, site: &SiteContent) -> Markup {
    let banners = site.banners();
    let (first, rest) = banners.split_at(banners.len().min(1));
    let (second, rest) = rest.split_at(rest.len().min(1));

    let content = html! {
        main.home {
            (hero_section(&site.hero()))
            @for banner in first { (banner_section(banner)) }
            (services_section(&site.services()))
            @for banner in second { (banner_section(banner)) }
            (reasons_section(&site.reasons()))
            (process_section(&site.process_steps()))
            @for banner in rest { (banner_section(banner)) }
            (about_section())
            (testimonials_section(&site.testimonials()))
            (cta_section(&site.cta()))
        }
    };
    base_document(chrome, "", "", content)
}

fn render_about_page(chrome: &Chrome, site: &SiteContent) -> Markup {
    let hero = site.page_hero("about");
    let content = html! {
        main.about-page {
            (page_hero_section(&hero))
            (about_section())
            (testimonials_section(&site.testimonials()))
        }
    };
    base_document(chrome, &hero.title, "about/", content)
}

fn render_services_page(chrome: &Chrome, site: &SiteContent) -> Markup {
    let hero = site.page_hero("services");
    let services = site.services();
    let content = html! {
        main.services-page {
            (page_hero_section(&hero))
            (services_section(&services))
            (service_details_section(&services))
            (cta_section(&site.cta()))
        }
    };
    base_document(chrome, &hero.title, "services/", content)
}

fn render_work_page(chrome: &Chrome, site: &SiteContent) -> Markup {
    let hero = site.page_hero("work");
    let content = html! {
        main.work-page {
            (page_hero_section(&hero))
            (projects_section(&site.projects()))
        }
    };
    base_document(chrome, &hero.title, "work/", content)
}

fn render_blog_page(chrome: &Chrome, hero: &PageHero, posts: &[BlogPost], slugs: &[String]) -> Markup {
    let site = chrome.site;
    let featured = posts.iter().zip(slugs).find(|(p, _)| p.is_featured);
    let content = html! {
        main.blog-page {
            (page_hero_section(hero))
            @if let Some((post, slug)) = featured {
                article.featured-post.reveal {
                    img src=(post.image_url) alt=(post.title) loading="lazy";
                    div {
                        span.eyebrow { "Featured · " (post.category) }
                        h2 { a href=(site.link(&format!("blog/{slug}/"))) { (post.title) } }
                        p { (post.excerpt) }
                        (post_meta(post))
                        p.author { strong { (post.author) } " " span.muted { (post.author_role) } }
                    }
                }
            }
            div.post-grid {
                @for (post, slug) in posts.iter().zip(slugs).filter(|(p, _)| !p.is_featured) {
                    article.post-card.reveal {
                        a href=(site.link(&format!("blog/{slug}/"))) {
                            img src=(post.image_url) alt=(post.title) loading="lazy";
                            span.eyebrow { (post.category) }
                            h3 { (post.title) }
                        }
                        p.muted { (post.excerpt) }
                        (post_meta(post))
                    }
                }
            }
        }
    };
    base_document(chrome, &hero.title, "blog/", content)
}

fn render_post_page(chrome: &Chrome, post: &BlogPost) -> Markup {
    let body = if post.content.trim().is_empty() {
        &post.excerpt
    } else {
        &post.content
    };
    let content = html! {
        main.post-page {
            article.post {
                header {
                    a.back href=(chrome.site.link("blog/")) { "← All posts" }
                    span.eyebrow { (post.category) }
                    h1 { (post.title) }
                    (post_meta(post))
                    p.author { strong { (post.author) } " " span.muted { (post.author_role) } }
                }
                @if !post.image_url.is_empty() {
                    img.post-image src=(post.image_url) alt=(post.title);
                }
                div.post-body { (PreEscaped(render_markdown(body))) }
            }
        }
    };
    base_document(chrome, &post.title, "blog/", content)
}

fn render_contact_page(chrome: &Chrome, hero: &PageHero, relay: &config::ContactConfig) -> Markup {
    let info = &chrome.contact;
    let content = html! {
        main.contact-page {
            (page_hero_section(hero))
            section.contact {
                div.contact-text.reveal {
                    span.eyebrow { "Get In Touch" }
                    h2 { "Let's Build Something " span.accent { "Amazing Together" } }
                    p.lead { "Ready to elevate your digital presence? Drop us a message and let's discuss how we can help your business grow." }
                    dl.contact-details {
                        dt { "Email" }
                        dd { a href={ "mailto:" (info.email) } { (info.email) } }
                        dt { "Phone" }
                        dd { (info.phone) }
                        dt { "Location" }
                        dd { (info.address) }
                    }
                }
                (contact_form(relay))
            }
        }
    };
    base_document(chrome, &hero.title, "contact/", content)
}

fn contact_form(relay: &config::ContactConfig) -> Markup {
    html! {
        @if relay.is_configured() {
            form.contact-form.reveal
                data-endpoint=(relay.endpoint)
                data-service-id=(relay.service_id)
                data-template-id=(relay.template_id)
                data-public-key=(relay.public_key)
                data-sent=(SENT_MESSAGE)
                data-failed=(FAILED_MESSAGE) {
                (contact_fields())
                button.button.primary type="submit" { "Send Message" }
                p.form-notice role="status" aria-live="polite" {}
            }
            script { (PreEscaped(CONTACT_JS)) }
        } @else {
            form.contact-form.reveal data-disabled="true" {
                (contact_fields())
                button.button.primary type="submit" disabled { "Send Message" }
                p.form-notice.muted { "The contact form is not available right now. Please email us instead." }
            }
        }
    }
}

/// Field names match the relay template variables.
fn contact_fields() -> Markup {
    html! {
        div.field-row {
            label { "Name" input name="user_name" placeholder="Your name" required; }
            label { "Email" input type="email" name="user_email" placeholder="your@email.com" required; }
        }
        label { "Subject" input name="subject" placeholder="What's this about?" required; }
        label { "Message" textarea name="message" rows="5" placeholder="Tell us about your project..." required {} }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachePolicy;
    use crate::content::Insertable;
    use crate::repo;
    use crate::store::MemoryStore;
    use crate::test_helpers::FlakyStore;
    use tempfile::TempDir;

    fn chrome(config: &SiteConfig) -> Chrome<'_> {
        Chrome {
            site: &config.site,
            css: String::new(),
            contact: FallbackContent::default().contact,
            chat_number: Some("447355612987".into()),
        }
    }

    fn read(dir: &Path, page: &str) -> String {
        fs::read_to_string(dir.join(page)).unwrap()
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn nav_marks_current_section() {
        let site = SiteInfo::default();
        let html = render_nav(&site, "blog/").into_string();
        assert!(html.contains(r#"<li class="current"><a href="/blog/" aria-current="page">Blog</a>"#));
        assert_eq!(html.matches(r#"class="current""#).count(), 1);
    }

    #[test]
    fn nav_on_home_marks_nothing() {
        let html = render_nav(&SiteInfo::default(), "").into_string();
        assert!(!html.contains("current"));
        assert!(html.contains(r#"href="/services/""#));
    }

    #[test]
    fn nav_respects_base_url() {
        let site = SiteInfo {
            base_url: "/agency/".into(),
            ..SiteInfo::default()
        };
        let html = render_nav(&site, "").into_string();
        assert!(html.contains(r#"href="/agency/work/""#));
    }

    #[test]
    fn base_document_includes_doctype_and_title() {
        let config = SiteConfig::default();
        let doc = base_document(&chrome(&config), "Work", "work/", html! { p { "x" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Work | SyncMindTech</title>"));
    }

    #[test]
    fn chat_button_links_to_whatsapp() {
        let config = SiteConfig::default();
        let doc = base_document(&chrome(&config), "", "", html! {}).into_string();
        assert!(doc.contains(r#"href="https://wa.me/447355612987""#));

        let mut quiet = chrome(&config);
        quiet.chat_number = None;
        let doc = base_document(&quiet, "", "", html! {}).into_string();
        assert!(!doc.contains("wa.me"));
    }

    #[test]
    fn content_is_escaped() {
        let mut banner = Banner::placeholder(0, chrono::Utc::now());
        banner.title = "<script>alert('xss')</script>".into();
        let html = banner_section(&banner).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn reversed_banner_gets_class() {
        let mut banner = Banner::placeholder(0, chrono::Utc::now());
        banner.is_reversed = true;
        assert!(banner_section(&banner).into_string().contains("reversed"));
    }

    #[test]
    fn markdown_renders_and_escapes_raw_html() {
        let html = render_markdown("This is **bold**.\n\n<iframe src=\"x\"></iframe>");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<iframe"));
        assert!(html.contains("&lt;iframe"));
    }

    #[test]
    fn markdown_drops_script_link_targets() {
        let html = render_markdown("[x](javascript:alert(1)) [y](JavaScript:void) ![i](data:image/png;base64,AA)");
        assert!(!html.to_ascii_lowercase().contains("javascript:"), "{html}");
        assert!(!html.contains("data:"), "{html}");
        assert!(html.contains(r#"<a href="">x</a>"#), "{html}");
        assert!(!is_safe_link("java\tscript:alert(1)"));
        assert!(!is_safe_link(" vbscript:msgbox"));
        assert!(is_safe_link("posts/next?ref=a:b"));

        let html = render_markdown("[a](https://example.com) [b](/work/) [c](mailto:hi@example.com) [d](#top)");
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"href="/work/""#));
        assert!(html.contains(r#"href="mailto:hi@example.com""#));
        assert!(html.contains(r##"href="#top""##));
    }

    #[test]
    fn page_hero_background_cannot_break_out_of_css_url() {
        let mut hero = PageHero::untitled("about");
        hero.background_image = "x.png') ; background: url(evil".into();
        let html = page_hero_section(&hero).into_string();
        assert!(html.contains("url('x.png%27%29%20;%20background:%20url%28evil')"), "{html}");
        assert_eq!(css_url("/storage/cms-images/page-heroes/1-abc.webp"), "/storage/cms-images/page-heroes/1-abc.webp");
    }

    #[test]
    fn stars_clamp_rating() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let fallback = FallbackContent::default();
        let cats = categories(&fallback.projects);
        assert!(!cats.is_empty());
        assert_eq!(cats[0], fallback.projects[0].category);
        let mut deduped = cats.clone();
        deduped.dedup();
        assert_eq!(cats.len(), deduped.len());
    }

    #[test]
    fn contact_form_carries_relay_config() {
        let relay = config::ContactConfig {
            service_id: "service_x".into(),
            template_id: "template_y".into(),
            public_key: "pk_z".into(),
            ..config::ContactConfig::default()
        };
        let html = contact_form(&relay).into_string();
        assert!(html.contains(r#"data-service-id="service_x""#));
        assert!(html.contains(r#"name="user_email""#));
        assert!(html.contains("data-sent="));

        let off = contact_form(&config::ContactConfig::default()).into_string();
        assert!(off.contains("disabled"));
        assert!(!off.contains("data-endpoint"));
    }

    // =========================================================================
    // Whole-site rendering
    // =========================================================================

    #[test]
    fn empty_store_renders_fallback_site() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let cache = QueryCache::new(CachePolicy::default());
        let fallback = FallbackContent::default();

        let report =
            render_site(&store, &cache, &fallback, &SiteConfig::default(), tmp.path()).unwrap();

        assert_eq!(report.pages.len(), 6 + fallback.blog_posts.len());
        assert!(report.pages.contains(&"contact/index.html".to_string()));
        assert!(report.fallbacks.contains(&"services".to_string()));
        let home = read(tmp.path(), "index.html");
        assert!(home.contains(&fallback.hero.title));
        assert!(home.contains(&fallback.services[0].title));
    }

    #[test]
    fn stored_content_is_rendered() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let mut post = BlogPost::placeholder(0, chrono::Utc::now());
        post.title = "Shipping Fast".into();
        post.content = "Hello *world*".into();
        repo::insert(&store, &post).unwrap();
        let cache = QueryCache::new(CachePolicy::default());

        let report = render_site(
            &store,
            &cache,
            &FallbackContent::default(),
            &SiteConfig::default(),
            tmp.path(),
        )
        .unwrap();

        assert!(report.pages.contains(&"blog/shipping-fast/index.html".to_string()));
        assert!(!report.fallbacks.contains(&"blog_posts".to_string()));
        let page = read(tmp.path(), "blog/shipping-fast/index.html");
        assert!(page.contains("<em>world</em>"));
        assert!(read(tmp.path(), "blog/index.html").contains(r#"href="/blog/shipping-fast/""#));
    }

    #[test]
    fn unreachable_store_still_builds() {
        let tmp = TempDir::new().unwrap();
        let store = FlakyStore::default();
        store.fail_reads.set(true);
        let cache = QueryCache::new(CachePolicy::default());

        let report = render_site(
            &store,
            &cache,
            &FallbackContent::default(),
            &SiteConfig::default(),
            tmp.path(),
        )
        .unwrap();
        assert!(report.fallbacks.contains(&"contact_info".to_string()));
        assert!(read(tmp.path(), "work/index.html").contains("data-filter"));
    }

    #[test]
    fn repeated_sections_hit_the_cache() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let cache = QueryCache::new(CachePolicy::default());
        let report = render_site(
            &store,
            &cache,
            &FallbackContent::default(),
            &SiteConfig::default(),
            tmp.path(),
        )
        .unwrap();
        // Testimonials and the CTA appear on several pages.
        assert!(report.cache.hits > 0);
    }

    #[test]
    fn bucket_is_copied_under_public_url() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let object = config
            .storage_dir(root.path())
            .join(&config.storage.bucket)
            .join("banners/1-abc.png");
        fs::create_dir_all(object.parent().unwrap()).unwrap();
        fs::write(&object, b"png").unwrap();

        let report = build(root.path(), out.path(), &config).unwrap();

        assert_eq!(report.assets, 1);
        assert!(out.path().join("storage/cms-images/banners/1-abc.png").is_file());
    }

    #[test]
    fn external_bucket_is_not_copied() {
        let root = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.storage.public_url = "https://cdn.example.com".into();
        assert_eq!(copy_bucket(root.path(), root.path(), &config).unwrap(), 0);
    }
}
