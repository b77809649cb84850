//! Fallback content.
//!
//! Every public section renders something even when the store has nothing
//! for it: an empty collection, a missing singleton, or a failed fetch all
//! fall back to the values here. The stock content ships with the crate; a
//! deployment can override any part of it with a `fallback.toml` in the
//! project root, merged over the stock values the same way `config.toml` is
//! merged over the stock config.
//!
//! The same content seeds an empty store (`agency-site seed`).

use crate::config::{ConfigError, load_raw_toml, merge_toml};
use crate::content::{
    Banner, BlogPost, ContactInfo, CtaContent, HeroContent, PageHero, ProcessStep, Project, Reason,
    Record, Service, Testimonial,
};
use crate::icons::Icon;
use crate::repo;
use crate::store::{ContentStore, StoreError, Table};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FALLBACK_FILE: &str = "fallback.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackContent {
    pub hero: HeroContent,
    pub banners: Vec<Banner>,
    pub services: Vec<Service>,
    pub reasons: Vec<Reason>,
    pub process_steps: Vec<ProcessStep>,
    pub testimonials: Vec<Testimonial>,
    pub projects: Vec<Project>,
    pub blog_posts: Vec<BlogPost>,
    pub page_heroes: Vec<PageHero>,
    pub cta: CtaContent,
    pub contact: ContactInfo,
}

impl FallbackContent {
    /// Stock content merged with `<root>/fallback.toml` when present.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let stock = toml::Value::try_from(Self::default())?;
        let merged = match load_raw_toml(root, FALLBACK_FILE)? {
            Some(overlay) => {
                tracing::debug!(root = %root.display(), "applying fallback overrides");
                merge_toml(stock, overlay)
            }
            None => stock,
        };
        Ok(merged.try_into()?)
    }

    /// Fallback hero for a page slug, or a bare one titled after the slug.
    pub fn page_hero(&self, slug: &str) -> PageHero {
        self.page_heroes
            .iter()
            .find(|hero| hero.page_slug == slug)
            .cloned()
            .unwrap_or_else(|| PageHero::untitled(slug))
    }
}

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn unsplash(photo: &str, w: u32, h: u32) -> String {
    format!("https://images.unsplash.com/photo-{photo}?w={w}&h={h}&fit=crop")
}

impl Default for FallbackContent {
    fn default() -> Self {
        let banner = |i: i32, subtitle: &str, title: &str, description: &str, button: (&str, &str), photo: &str, is_reversed: bool| Banner {
            id: String::new(),
            revision: 0,
            subtitle: subtitle.into(),
            title: title.into(),
            description: description.into(),
            button_text: button.0.into(),
            button_link: button.1.into(),
            image_url: format!("https://images.unsplash.com/photo-{photo}?w=1920&q=80"),
            is_reversed,
            order_index: i,
        };
        let service = |i: i32, title: &str, description: &str, icon: Icon, features: &[&str]| Service {
            id: String::new(),
            revision: 0,
            title: title.into(),
            description: description.into(),
            icon,
            features: strings(features),
            order_index: i,
        };
        let reason = |i: i32, icon: Icon, title: &str, description: &str| Reason {
            id: String::new(),
            revision: 0,
            icon,
            title: title.into(),
            description: description.into(),
            order_index: i,
        };
        let step = |i: i32, icon: Icon, title: &str, description: &str| ProcessStep {
            id: String::new(),
            revision: 0,
            step_number: format!("{:02}", i + 1),
            icon,
            title: title.into(),
            description: description.into(),
            order_index: i,
        };
        let testimonial = |i: i32, name: &str, role: &str, company: &str, content: &str| Testimonial {
            id: String::new(),
            revision: 0,
            name: name.into(),
            role: role.into(),
            company: company.into(),
            content: content.into(),
            avatar_url: None,
            rating: 5,
            order_index: i,
        };
        let project = |i: i32, title: &str, category: &str, description: &str, photo: &str| Project {
            id: String::new(),
            revision: 0,
            title: title.into(),
            category: category.into(),
            description: description.into(),
            image_url: unsplash(photo, 600, 400),
            link: None,
            order_index: i,
        };
        let post = |title: &str, excerpt: &str, category: &str, author: &str, read_time: &str, photo: &str, published_at: DateTime<Utc>, is_featured: bool| BlogPost {
            id: String::new(),
            revision: 0,
            title: title.into(),
            excerpt: excerpt.into(),
            content: format!("{excerpt}\n\nThe full article is on its way. In the meantime, get in touch and we will walk you through it."),
            category: category.into(),
            author: author.into(),
            author_role: "SyncMindTech".into(),
            image_url: unsplash(photo, 1200, 600),
            read_time: read_time.into(),
            is_featured,
            published_at,
        };
        let page_hero = |slug: &str, subtitle: &str, title: &str, description: &str, photo: &str| PageHero {
            id: String::new(),
            revision: 0,
            page_slug: slug.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            description: description.into(),
            background_image: unsplash(photo, 1920, 1080),
        };

        Self {
            hero: HeroContent {
                id: String::new(),
                revision: 0,
                subtitle: "Innovating Digital Excellence".into(),
                title: "We Build Stunning Websites That".into(),
                highlight_text: "Convert".into(),
                description: "WordPress • Webflow • Shopify • SEO • Figma Design. From concept to launch, we create digital experiences that captivate and convert.".into(),
                button_text: "Start Your Project".into(),
                button_link: "/contact".into(),
                image_url: None,
            },
            banners: vec![
                banner(
                    0,
                    "Web Development Excellence",
                    "Custom Websites That Drive Growth",
                    "We specialize in building high-performance websites using WordPress, Webflow, and Shopify. Our solutions are tailored to your unique business needs, ensuring a seamless user experience that converts visitors into customers.",
                    ("Explore Services", "/services"),
                    "1460925895917-afdab827c52f",
                    false,
                ),
                banner(
                    1,
                    "Design & Strategy",
                    "Beautiful Designs That Tell Your Story",
                    "Our expert designers use Figma to craft pixel-perfect interfaces that capture your brand essence. From wireframes to final designs, we create visually stunning experiences that resonate with your audience and set you apart.",
                    ("View Our Work", "/work"),
                    "1561070791-2526d30994b5",
                    true,
                ),
                banner(
                    2,
                    "SEO & Digital Marketing",
                    "Dominate Search Rankings & Grow Your Traffic",
                    "Our data-driven SEO strategies help your business climb the search rankings and attract qualified organic traffic. We optimize every aspect of your online presence to ensure maximum visibility and sustainable growth.",
                    ("Get Started", "/contact"),
                    "1432888498266-38ffec3eaf0a",
                    false,
                ),
            ],
            services: vec![
                service(0, "Website Development", "Custom website development using WordPress and Webflow, with powerful themes and plugins tailored to your business needs.", Icon::Globe, &["Custom Themes", "Plugin Development", "Webflow Sites", "Performance Optimization"]),
                service(1, "Website Maintenance", "Keep your website running smoothly with our comprehensive maintenance and support services.", Icon::Settings, &["Security Updates", "Performance Monitoring", "Bug Fixes", "Content Updates"]),
                service(2, "Shopify Stores", "E-commerce solutions that drive sales and provide seamless shopping experiences.", Icon::ShoppingBag, &["Store Setup", "Theme Customization", "Payment Integration", "Inventory Management"]),
                service(3, "SEO Optimization", "Data-driven SEO strategies to boost your visibility and organic traffic.", Icon::Search, &["Keyword Research", "On-Page SEO", "Technical SEO", "Analytics & Reporting"]),
                service(4, "Figma Design", "Beautiful UI/UX designs that combine aesthetics with user-centered functionality.", Icon::Figma, &["UI Design", "UX Research", "Prototyping", "Design Systems"]),
                service(5, "Digital Marketing", "Strategic digital marketing campaigns that grow your brand and drive measurable results.", Icon::TrendingUp, &["Social Media", "PPC Advertising", "Email Marketing", "Brand Strategy"]),
            ],
            reasons: vec![
                reason(0, Icon::Target, "Results-Driven Approach", "We focus on delivering measurable results that align with your business goals. Every design decision is backed by data and strategy to ensure maximum impact and ROI."),
                reason(1, Icon::Lightbulb, "Innovative Solutions", "Our team stays ahead of industry trends, implementing cutting-edge technologies and creative solutions that set your brand apart from the competition."),
                reason(2, Icon::Rocket, "Fast & Efficient Delivery", "We understand the importance of time-to-market. Our streamlined processes ensure your project is delivered on schedule without compromising quality."),
                reason(3, Icon::Shield, "Secure & Reliable", "Security is at the core of everything we build. From SSL certificates to secure payment gateways, we ensure your website and customer data are protected."),
                reason(4, Icon::Clock, "24/7 Support & Maintenance", "Our relationship doesn't end at launch. We provide ongoing support, updates, and maintenance to keep your website running smoothly around the clock."),
                reason(5, Icon::HeartHandshake, "Client-Centric Partnership", "We believe in building lasting relationships. Your success is our success, and we work as an extension of your team to achieve your digital vision."),
            ],
            process_steps: vec![
                step(0, Icon::MessageSquare, "Discovery & Strategy", "We start by understanding your business, goals, target audience, and competitive landscape. Through detailed consultations, we develop a comprehensive strategy that aligns with your vision and sets the foundation for success."),
                step(1, Icon::PenTool, "Design & Prototyping", "Our designers create stunning visual concepts and interactive prototypes using Figma. We iterate based on your feedback until we achieve a design that perfectly represents your brand and engages your users."),
                step(2, Icon::Code, "Development & Testing", "Our development team brings the designs to life using the best platform for your needs: WordPress, Webflow, or Shopify. We rigorously test across devices and browsers to ensure flawless performance."),
                step(3, Icon::Rocket, "Launch & Optimize", "After thorough quality assurance, we launch your website with SEO optimization baked in. We continue to monitor performance, gather analytics, and make data-driven improvements for ongoing success."),
            ],
            testimonials: vec![
                testimonial(0, "Sarah Johnson", "CEO", "TechStart", "SyncMindTech transformed our online presence completely. Our new Shopify store saw a 200% increase in conversions within the first month."),
                testimonial(1, "Michael Chen", "Founder", "GreenLeaf Co", "The SEO work they did was phenomenal. We went from page 5 to ranking in the top 3 for our main keywords. Couldn't be happier!"),
                testimonial(2, "Emily Rodriguez", "Marketing Director", "Bloom Agency", "Their Webflow expertise is unmatched. They delivered a stunning website that our clients constantly compliment. Highly recommended!"),
                testimonial(3, "David Park", "Owner", "Urban Fitness", "From the Figma designs to the final WordPress site, everything was executed flawlessly. A true partner for digital success."),
            ],
            projects: vec![
                project(0, "Apollo Running Store", "Shopify", "A modern e-commerce platform for running gear with seamless shopping experience and optimized checkout flow.", "1556906781-9a412961c28c"),
                project(1, "Grace Grid CMS", "WordPress", "A clean, modern content management website with elegant grid layouts and intuitive navigation for creative professionals.", "1507238691740-187a5b1d37b8"),
                project(2, "Tempo Tune Site", "Maintenance", "Comprehensive website maintenance and performance optimization for a music streaming platform with audio features.", "1493225457124-a3eb161ffa5f"),
                project(3, "Sports Gear Pro", "Design", "Athletic brand design with dynamic visuals, product showcases, and high-energy user experience.", "1571902943202-507ec2618e8f"),
                project(4, "Content Hub SEO", "SEO", "From page 10 to top 3 ranking in just 3 months through comprehensive SEO strategy for a content platform.", "1460925895917-afdab827c52f"),
                project(5, "Runner's Choice", "Shopify", "Premium running gear subscription service with custom checkout and seamless inventory management.", "1542291026-7eec264c27ff"),
            ],
            blog_posts: vec![
                post("The Future of Web Design: Trends to Watch in 2024", "Explore the cutting-edge design trends that are shaping the digital landscape. From AI-powered interfaces to immersive 3D experiences, discover what's next for web design.", "Design Trends", "Sarah Chen", "8 min read", "1467232004584-a241de8bcf5d", date(2024, 1, 15), true),
                post("10 SEO Strategies That Actually Work in 2024", "Discover proven SEO techniques that will boost your search rankings and drive organic traffic to your website.", "SEO", "Emily Davis", "6 min read", "1432888622747-4eb9a8efeb07", date(2024, 1, 12), false),
                post("WordPress vs Webflow: Which Is Right for You?", "A comprehensive comparison of two popular platforms to help you make the right choice for your next project.", "Development", "Michael Roberts", "10 min read", "1461749280684-dccba630e2f6", date(2024, 1, 10), false),
                post("How to Optimize Your Shopify Store for Conversions", "Learn the secrets to creating a high-converting e-commerce experience that turns visitors into customers.", "E-commerce", "Alex Johnson", "7 min read", "1556742049-0cfed4f6a45d", date(2024, 1, 8), false),
                post("The Psychology of Color in Web Design", "Understanding how color choices influence user behavior and can improve your website's effectiveness.", "Design", "Sarah Chen", "5 min read", "1561070791-2526d30994b5", date(2024, 1, 5), false),
                post("Building a Design System from Scratch", "A step-by-step guide to creating a scalable design system that ensures consistency across your products.", "Design", "Sarah Chen", "12 min read", "1559028012-481c04fa702d", date(2024, 1, 3), false),
            ],
            page_heroes: vec![
                page_hero("about", "Who We Are", "About Us", "A team of designers, developers and marketers building websites that grow businesses.", "1522071820081-009f0129c71c"),
                page_hero("services", "What We Offer", "Our Services", "Comprehensive digital solutions tailored to elevate your brand and drive measurable business results.", "1522071820081-009f0129c71c"),
                page_hero("work", "Portfolio", "Our Work", "A selection of websites, stores and campaigns we are proud of.", "1460925895917-afdab827c52f"),
                page_hero("blog", "Insights & Resources", "Our Blog", "Expert tips, industry insights, and the latest trends in web design, development, and digital marketing.", "1499750310107-5fef28a66643"),
                page_hero("contact", "Contact Us", "Get In Touch", "Ready to start your project? Let's discuss how we can help bring your vision to life.", "1423666639041-f56000c27a9a"),
            ],
            cta: CtaContent {
                id: String::new(),
                revision: 0,
                title: "Let's Create Something Extraordinary Together".into(),
                description: "Whether you need a stunning new website, a complete brand overhaul, or strategic SEO optimization, our team is ready to bring your vision to life. Let's discuss your project and explore the possibilities.".into(),
                button_text: "Start Your Project".into(),
                button_link: "/contact".into(),
            },
            contact: ContactInfo {
                id: String::new(),
                revision: 0,
                email: "syncmindtech1@gmail.com".into(),
                phone: "+256 757 330 656".into(),
                address: "Kampala, UG".into(),
                whatsapp_number: Some("447355612987".into()),
            },
        }
    }
}

// =============================================================================
// Seeding
// =============================================================================

/// Tables written and skipped by [`seed`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: Vec<(Table, usize)>,
    pub skipped: Vec<Table>,
}

fn seed_table<R: Record>(
    store: &dyn ContentStore,
    records: &[R],
    report: &mut SeedReport,
) -> Result<(), StoreError> {
    if !store.select(R::TABLE)?.is_empty() {
        report.skipped.push(R::TABLE);
        return Ok(());
    }
    for record in records {
        repo::insert(store, record)?;
    }
    tracing::info!(table = %R::TABLE, rows = records.len(), "seeded");
    report.seeded.push((R::TABLE, records.len()));
    Ok(())
}

/// Write the fallback content into every empty table. Tables that already
/// hold rows are left alone, so seeding twice is harmless.
pub fn seed(store: &dyn ContentStore, content: &FallbackContent) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();
    seed_table(store, std::slice::from_ref(&content.hero), &mut report)?;
    seed_table(store, &content.banners, &mut report)?;
    seed_table(store, &content.services, &mut report)?;
    seed_table(store, &content.reasons, &mut report)?;
    seed_table(store, &content.process_steps, &mut report)?;
    seed_table(store, &content.testimonials, &mut report)?;
    seed_table(store, &content.projects, &mut report)?;
    seed_table(store, &content.blog_posts, &mut report)?;
    seed_table(store, &content.page_heroes, &mut report)?;
    seed_table(store, std::slice::from_ref(&content.cta), &mut report)?;
    seed_table(store, std::slice::from_ref(&content.contact), &mut report)?;
    Ok(report)
}
