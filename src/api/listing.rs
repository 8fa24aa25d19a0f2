//! Static file fallback
//!
//! Files, and directories holding an `index.html`, are served by tower-http's
//! `ServeDir`. Any other directory gets a generated HTML listing, matching
//! what `python -m http.server` shows for the same tree.

use super::routes::AppState;
use crate::datasets::archive::safe_relative_path;
use crate::error::ManagerError;
use axum::{
    body::Body,
    extract::{Request, State},
    response::{Html, IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Fallback for every path not claimed by an API route
pub async fn static_files(State(state): State<AppState>, request: Request) -> Response {
    let uri_path = request.uri().path().to_string();

    // Without the trailing slash ServeDir redirects to it first
    if uri_path.ends_with('/')
        && let Some((dir, display_path)) = listing_target(&state.serve_dir, &uri_path).await
    {
        return match render_listing(&dir, &display_path).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => ManagerError::io(dir, e).into_response(),
        };
    }

    match ServeDir::new(&state.serve_dir).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

/// Directory to list for `uri_path`, if it is one and has no index page
async fn listing_target(root: &Path, uri_path: &str) -> Option<(PathBuf, String)> {
    let decoded = urlencoding::decode(uri_path).ok()?;
    let dir = match safe_relative_path(decoded.trim_start_matches('/')).ok()? {
        Some(relative) => root.join(relative),
        None => root.to_path_buf(),
    };

    let metadata = tokio::fs::metadata(&dir).await.ok()?;
    if !metadata.is_dir() {
        return None;
    }
    if tokio::fs::try_exists(dir.join("index.html"))
        .await
        .unwrap_or(false)
    {
        return None;
    }

    Some((dir, decoded.into_owned()))
}

async fn render_listing(dir: &Path, display_path: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        entries.push((name, is_dir));
    }
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir) in entries {
        let slash = if is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{}{slash}\">{}{slash}</a></li>\n",
            urlencoding::encode(&name),
            escape_html(&name),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
