//! Placeholder pages for the guarded surfaces. Presentation lives elsewhere;
//! these exist so the guard has something to protect.

use axum::{
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse},
};

pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Sign in</title></head>\
         <body><main id=\"login\">Sign in</main></body></html>",
    )
}

pub async fn dashboard() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Dashboard</title></head>\
         <body><main id=\"dashboard\">Dashboard</main></body></html>",
    )
}

pub async fn dashboard_section(Path(section): Path<String>) -> Html<String> {
    let section = section.trim_matches('/');
    Html(format!(
        "<!doctype html><html><head><title>Dashboard</title></head>\
         <body><main id=\"dashboard\" data-section=\"{}\">Dashboard</main></body></html>",
        escape(section)
    ))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<!doctype html><html><body>Not found</body></html>"))
}

fn escape(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            other => other.to_string(),
        })
        .collect()
}
