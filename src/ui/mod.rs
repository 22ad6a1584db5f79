//! Mock patient-facing pages.
//!
//! Everything shown here comes from the hardcoded sample in [`sample`];
//! no page reads from or writes to the database or the FHIR proxy.

mod pages;
pub mod sample;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::api::AppState;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct UiSettings {
    /// How long the fake OCR step pretends to work.
    pub ocr_delay: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Page {
    Home,
    Register,
    Dashboard,
    Upload,
    Earnings,
    Privacy,
    Investor,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Home,
        Page::Register,
        Page::Dashboard,
        Page::Upload,
        Page::Earnings,
        Page::Privacy,
        Page::Investor,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Register => "Register",
            Page::Dashboard => "Dashboard",
            Page::Upload => "Upload Data",
            Page::Earnings => "Earnings",
            Page::Privacy => "Data Privacy & Usage",
            Page::Investor => "Investor Demo",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/ui/home",
            Page::Register => "/ui/register",
            Page::Dashboard => "/ui/dashboard",
            Page::Upload => "/ui/upload",
            Page::Earnings => "/ui/earnings",
            Page::Privacy => "/ui/privacy",
            Page::Investor => "/ui/investor",
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ui", get(pages::home))
        .route("/ui/home", get(pages::home))
        .route("/ui/register", get(pages::register_form).post(pages::register_submit))
        .route("/ui/dashboard", get(pages::dashboard))
        .route("/ui/upload", get(pages::upload_form).post(pages::upload_submit))
        .route("/ui/earnings", get(pages::earnings))
        .route("/ui/privacy", get(pages::privacy))
        .route("/ui/investor", get(pages::investor))
        .route("/ui/investor/ocr", post(pages::investor_ocr))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Wraps a page body in the shared layout with the sidebar navigation.
pub(crate) fn layout(current: Page, head_extra: &str, body: &str) -> Html<String> {
    let nav: String = Page::ALL
        .iter()
        .map(|page| {
            let class = if *page == current { " class=\"active\"" } else { "" };
            format!(
                "<li><a href=\"{}\"{}>{}</a></li>",
                page.path(),
                class,
                escape_html(page.title())
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title} - Veritas One</title>
{head_extra}
<style>
body {{ font-family: sans-serif; margin: 0; display: flex; }}
nav {{ width: 220px; min-height: 100vh; background: #f0f2f6; padding: 1rem; }}
nav a.active {{ font-weight: bold; }}
main {{ padding: 2rem; flex: 1; }}
.success {{ color: #0a7d32; }}
.warning {{ color: #a15c00; }}
.metric {{ font-size: 2rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: .3rem .6rem; }}
</style>
</head>
<body>
<nav>
<h2>Veritas One</h2>
<ul>{nav}</ul>
<hr>
<p>Built for Veritas One</p>
<p>BTG Health Consulting</p>
</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(current.title()),
        head_extra = head_extra,
        nav = nav,
        body = body,
    ))
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x & y")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn layout_marks_current_page() {
        let Html(page) = layout(Page::Earnings, "", "<p>body</p>");
        assert!(page.contains(r#"<a href="/ui/earnings" class="active">Earnings</a>"#));
        assert!(page.contains(r#"<a href="/ui/privacy">Data Privacy &amp; Usage</a>"#));
        assert!(page.contains("<p>body</p>"));
    }
}
