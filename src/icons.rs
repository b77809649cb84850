//! Icon set used by services, "why choose us" reasons, and process steps.
//!
//! Records store icons by name (`"Globe"`, `"HeartHandshake"`, ...). The name
//! is parsed into [`Icon`] when a row is read or patched, so an unknown name
//! is rejected at the edge instead of silently rendering a default glyph.
//! Every variant owns a fixed SVG glyph; adding a variant without a glyph is a
//! compile error.

use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Globe,
    Settings,
    ShoppingBag,
    Search,
    /// Rendered with the palette glyph.
    Figma,
    TrendingUp,
    Code,
    Palette,
    Zap,
    Shield,
    Target,
    Lightbulb,
    Rocket,
    Clock,
    HeartHandshake,
    Award,
    Users,
    Check,
    MessageSquare,
    PenTool,
}

impl Icon {
    pub const ALL: [Icon; 20] = [
        Icon::Globe,
        Icon::Settings,
        Icon::ShoppingBag,
        Icon::Search,
        Icon::Figma,
        Icon::TrendingUp,
        Icon::Code,
        Icon::Palette,
        Icon::Zap,
        Icon::Shield,
        Icon::Target,
        Icon::Lightbulb,
        Icon::Rocket,
        Icon::Clock,
        Icon::HeartHandshake,
        Icon::Award,
        Icon::Users,
        Icon::Check,
        Icon::MessageSquare,
        Icon::PenTool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Icon::Globe => "Globe",
            Icon::Settings => "Settings",
            Icon::ShoppingBag => "ShoppingBag",
            Icon::Search => "Search",
            Icon::Figma => "Figma",
            Icon::TrendingUp => "TrendingUp",
            Icon::Code => "Code",
            Icon::Palette => "Palette",
            Icon::Zap => "Zap",
            Icon::Shield => "Shield",
            Icon::Target => "Target",
            Icon::Lightbulb => "Lightbulb",
            Icon::Rocket => "Rocket",
            Icon::Clock => "Clock",
            Icon::HeartHandshake => "HeartHandshake",
            Icon::Award => "Award",
            Icon::Users => "Users",
            Icon::Check => "Check",
            Icon::MessageSquare => "MessageSquare",
            Icon::PenTool => "PenTool",
        }
    }

    /// Inner SVG elements for a 24×24 stroked glyph.
    fn glyph(self) -> &'static str {
        match self {
            Icon::Globe => {
                r#"<circle cx="12" cy="12" r="10"/><path d="M12 2a14.5 14.5 0 0 0 0 20 14.5 14.5 0 0 0 0-20"/><path d="M2 12h20"/>"#
            }
            Icon::Settings => {
                r#"<circle cx="12" cy="12" r="3"/><path d="M12 1v3M12 20v3M4.22 4.22l2.12 2.12M17.66 17.66l2.12 2.12M1 12h3M20 12h3M4.22 19.78l2.12-2.12M17.66 6.34l2.12-2.12"/>"#
            }
            Icon::ShoppingBag => {
                r#"<path d="M6 2 3 6v14a2 2 0 0 0 2 2h14a2 2 0 0 0 2-2V6l-3-4Z"/><path d="M3 6h18"/><path d="M16 10a4 4 0 0 1-8 0"/>"#
            }
            Icon::Search => r#"<circle cx="11" cy="11" r="8"/><path d="m21 21-4.3-4.3"/>"#,
            Icon::Figma | Icon::Palette => {
                r#"<circle cx="13.5" cy="6.5" r=".5"/><circle cx="17.5" cy="10.5" r=".5"/><circle cx="8.5" cy="7.5" r=".5"/><circle cx="6.5" cy="12.5" r=".5"/><path d="M12 2C6.5 2 2 6.5 2 12s4.5 10 10 10c.93 0 1.65-.75 1.65-1.69 0-.44-.18-.84-.44-1.13-.29-.29-.44-.65-.44-1.13a1.64 1.64 0 0 1 1.67-1.67h2c3.05 0 5.55-2.5 5.55-5.55C21.97 6.01 17.46 2 12 2z"/>"#
            }
            Icon::TrendingUp => {
                r#"<polyline points="22 7 13.5 15.5 8.5 10.5 2 17"/><polyline points="16 7 22 7 22 13"/>"#
            }
            Icon::Code => {
                r#"<polyline points="16 18 22 12 16 6"/><polyline points="8 6 2 12 8 18"/>"#
            }
            Icon::Zap => r#"<polygon points="13 2 3 14 12 14 11 22 21 10 12 10 13 2"/>"#,
            Icon::Shield => r#"<path d="M12 22s8-4 8-10V5l-8-3-8 3v7c0 6 8 10 8 10z"/>"#,
            Icon::Target => {
                r#"<circle cx="12" cy="12" r="10"/><circle cx="12" cy="12" r="6"/><circle cx="12" cy="12" r="2"/>"#
            }
            Icon::Lightbulb => {
                r#"<path d="M9 18h6"/><path d="M10 22h4"/><path d="M12 2a7 7 0 0 0-4 12.7c.6.5 1 1.3 1 2.3h6c0-1 .4-1.8 1-2.3A7 7 0 0 0 12 2z"/>"#
            }
            Icon::Rocket => {
                r#"<path d="M4.5 16.5c-1.5 1.26-2 5-2 5s3.74-.5 5-2c.71-.84.7-2.13-.09-2.91a2.18 2.18 0 0 0-2.91-.09z"/><path d="m12 15-3-3a22 22 0 0 1 2-3.95A12.88 12.88 0 0 1 22 2c0 2.72-.78 7.5-6 11a22.35 22.35 0 0 1-4 2z"/>"#
            }
            Icon::Clock => r#"<circle cx="12" cy="12" r="10"/><polyline points="12 6 12 12 16 14"/>"#,
            Icon::HeartHandshake => {
                r#"<path d="M19 14c1.49-1.46 3-3.21 3-5.5A5.5 5.5 0 0 0 16.5 3c-1.76 0-3 .5-4.5 2-1.5-1.5-2.74-2-4.5-2A5.5 5.5 0 0 0 2 8.5c0 2.3 1.5 4.05 3 5.5l7 7Z"/><path d="M12 5 9.04 7.96a2.17 2.17 0 0 0 0 3.08c.82.82 2.13.85 3 .07l2.07-1.9a2.82 2.82 0 0 1 3.79 0l2.96 2.66"/>"#
            }
            Icon::Award => {
                r#"<circle cx="12" cy="8" r="6"/><path d="M15.48 12.89 17 22l-5-3-5 3 1.52-9.11"/>"#
            }
            Icon::Users => {
                r#"<path d="M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2"/><circle cx="9" cy="7" r="4"/><path d="M22 21v-2a4 4 0 0 0-3-3.87"/><path d="M16 3.13a4 4 0 0 1 0 7.75"/>"#
            }
            Icon::Check => r#"<polyline points="20 6 9 17 4 12"/>"#,
            Icon::MessageSquare => {
                r#"<path d="M21 15a2 2 0 0 1-2 2H7l-4 4V5a2 2 0 0 1 2-2h14a2 2 0 0 1 2 2z"/>"#
            }
            Icon::PenTool => {
                r#"<path d="m12 19 7-7 3 3-7 7-3-3z"/><path d="m18 13-1.5-7.5L2 2l3.5 14.5L13 18l5-5z"/><path d="m2 2 7.59 7.59"/><circle cx="11" cy="11" r="2"/>"#
            }
        }
    }

    /// Render the icon as an inline SVG element.
    pub fn render(self, class: &str) -> Markup {
        html! {
            svg class={ "icon " (class) } data-icon=(self.name())
                xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"
                fill="none" stroke="currentColor" stroke-width="2"
                stroke-linecap="round" stroke-linejoin="round" aria-hidden="true" {
                (PreEscaped(self.glyph()))
            }
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Icon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Icon::ALL
            .into_iter()
            .find(|icon| icon.name() == s)
            .ok_or_else(|| format!("unknown icon `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_str() {
        for icon in Icon::ALL {
            assert_eq!(icon.name().parse::<Icon>(), Ok(icon));
        }
    }

    #[test]
    fn serde_uses_pascal_case_names() {
        let json = serde_json::to_string(&Icon::HeartHandshake).unwrap();
        assert_eq!(json, "\"HeartHandshake\"");
        let icon: Icon = serde_json::from_str("\"ShoppingBag\"").unwrap();
        assert_eq!(icon, Icon::ShoppingBag);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("Sparkles".parse::<Icon>().is_err());
        assert!(serde_json::from_str::<Icon>("\"Sparkles\"").is_err());
    }

    #[test]
    fn figma_renders_palette_glyph() {
        let figma = Icon::Figma.render("x").into_string();
        let palette = Icon::Palette.render("x").into_string();
        assert_eq!(
            figma.replace("data-icon=\"Figma\"", ""),
            palette.replace("data-icon=\"Palette\"", "")
        );
    }

    #[test]
    fn render_is_inline_svg() {
        let svg = Icon::Rocket.render("service-icon").into_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="icon service-icon""#));
        assert!(svg.contains("<path"));
    }
}
