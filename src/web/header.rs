use maud::{html, Markup};

use crate::nls::Messages;
use crate::view::StatusStyles;

/// Renders the main header and subheader with navigation
pub fn render(active_page: &str, messages: &Messages, icons: &StatusStyles) -> Markup {
    html! {
        header {
            div class="header" {
                span class="header-logo" { "Travis CI" }
            }
            div class="subheader" {
                a href="/" class="subheader-brand" {
                    i class=(icons.named("cogs")) {}
                    " " (messages.label("subscriptions"))
                }
                div class="subheader-nav" {
                    a href="/" class=(if active_page == "subscriptions" { "subheader-nav-item active" } else { "subheader-nav-item" }) { (messages.label("subscriptions")) }
                    a href="/subscriptions/new" class=(if active_page == "new" { "subheader-nav-item active" } else { "subheader-nav-item" }) { (messages.label("subscription-new")) }
                }
            }
        }
    }
}

/// Common CSS styles for header, navigation and fragments
pub fn styles() -> &'static str {
    r#"
    :root {
        --header-bg: #3eaaaf;
        --border-color: #d0d7de;
        --text-color: #24292f;
        --primary-blue: #0969da;
    }
    body {
        margin: 0;
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
        color: var(--text-color);
    }
    .header {
        background-color: var(--header-bg);
        color: white;
        padding: 8px 16px;
        display: flex;
        align-items: center;
    }
    .header-logo {
        margin-right: 12px;
    }
    .subheader {
        border-bottom: 1px solid var(--border-color);
        display: flex;
        padding: 0 16px;
    }
    .subheader-brand {
        display: flex;
        align-items: center;
        padding: 12px 0;
        margin-right: 24px;
        color: var(--text-color);
        font-weight: 600;
        text-decoration: none;
    }
    .subheader-nav {
        display: flex;
    }
    .subheader-nav-item {
        color: var(--text-color);
        text-decoration: none;
        padding: 12px 16px;
        font-size: 14px;
        border-bottom: 2px solid transparent;
    }
    .subheader-nav-item:hover {
        border-bottom-color: #d0d7de;
    }
    .subheader-nav-item.active {
        border-bottom-color: var(--primary-blue);
        font-weight: 500;
    }
    .content {
        padding: 16px;
    }
    table.subscriptions {
        border-collapse: collapse;
        width: 100%;
    }
    table.subscriptions th, table.subscriptions td {
        border-bottom: 1px solid var(--border-color);
        padding: 8px;
        text-align: left;
    }
    .btn-link {
        background: none;
        border: none;
        color: var(--primary-blue);
        cursor: pointer;
    }
    .carousel-item {
        display: none;
    }
    .carousel-item.active {
        display: block;
    }
    .text-success { color: #1a7f37; }
    .text-danger { color: #cf222e; }
    .text-warning { color: #9a6700; }
    .text-muted { color: #6e7781; }

    /* Styles for fragments */

    .alert {
        padding: 16px;
        border: 2px solid grey;
        margin: 16px 0;
        width: 100%;
        box-sizing: border-box;
        word-wrap: break-word;
        overflow-wrap: break-word;
    }
    .alert-danger {
        background-color: #fdedee;
        border-color: #f8a9ad;
    }
    .alert-success {
        background-color: #e5f8f6;
        border-color: #7fded2;
    }
    .field-feedback {
        font-size: 12px;
        margin-left: 8px;
    }
    "#
}

/// Common scripts and icon font for all pages
pub fn scripts(icons: &StatusStyles) -> Markup {
    html! {
        script src="https://unpkg.com/htmx.org@1.9.12" {}
        link rel="stylesheet" href=(icons.stylesheet());
        style { (maud::PreEscaped(styles())) }
    }
}
