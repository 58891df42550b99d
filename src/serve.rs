//! Development server over the output directory.
//!
//! A lightweight `tiny_http` server for previewing the rendered site:
//!
//! - Static file serving from `[build] output`
//! - `index.html` resolution for directories, a plain listing otherwise
//! - Scan cycles in a background thread (via the `watch` module)
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │ Scheduler Thread │
//! │  (HTTP Server)  │     │  (scan cycles)   │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    Serve files              Render changed
//!    from output             documents into
//!          │                       │
//!          └───────────┬───────────┘
//!                      ▼
//!             config.build.output
//! ```
//!
//! The server has no knowledge of documents or templates; it only reads
//! whatever the pipeline last wrote.

use crate::{
    config::SiteConfig,
    log,
    tracker::ScanMode,
    watch::{SharedPipeline, watch_blocking},
};
use anyhow::{Context, Result, anyhow};
use std::{
    borrow::Cow,
    fs,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
    thread,
};
use tiny_http::{Header, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Directory listing page; `{path}`, `{parent_link}` and `{entries}` are replaced.
const DIRECTORY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Index of /{path}</title>
</head>
<body>
  <h1>Index of /{path}</h1>
  <ul>
    {parent_link}
    {entries}
  </ul>
</body>
</html>
"#;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the server, with scan cycles in the background unless `watch` is off.
///
/// Blocks until Ctrl+C is received.
pub fn serve_site(
    config: &'static SiteConfig,
    pipeline: SharedPipeline,
    watch: bool,
    first: ScanMode,
) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    if watch {
        thread::spawn(move || {
            if let Err(err) = watch_blocking(pipeline, config, first) {
                log!("watch"; "{err:#}");
            }
        });
    }

    let root = &config.build.output;
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Where a request URL points inside the served directory.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    File(PathBuf),
    /// A directory without `index.html`, with its URL path relative to the root.
    Listing(PathBuf, String),
    NotFound,
    Forbidden,
}

/// Resolve a raw request URL against `root`.
///
/// The query string is dropped before the path is percent-decoded.
/// Directories resolve to their `index.html`, or to a listing when there is
/// none. Any `..` component is refused.
fn resolve(root: &Path, url: &str) -> Target {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let path = urlencoding::decode(raw).map_or(Cow::Borrowed(raw), |decoded| decoded);
    let request_path = path.trim_matches('/');
    let relative = Path::new(request_path);

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Target::Forbidden;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Target::File(local);
    }

    if local.is_dir() {
        let index = local.join("index.html");
        if index.is_file() {
            return Target::File(index);
        }
        return Target::Listing(local, request_path.to_owned());
    }

    Target::NotFound
}

fn handle_request(request: Request, root: &Path) -> Result<()> {
    match resolve(root, request.url()) {
        Target::File(path) => serve_file(request, &path),
        Target::Listing(dir, request_path) => {
            let html = generate_directory_listing(&dir, &request_path)
                .with_context(|| format!("Failed to list {}", dir.display()))?;
            let response = Response::from_string(html)
                .with_header(content_type("text/html; charset=utf-8")?);
            request.respond(response)?;
            Ok(())
        }
        Target::NotFound => serve_status(request, 404, "404 Not Found"),
        Target::Forbidden => serve_status(request, 403, "403 Forbidden"),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn content_type(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow!("invalid header `{value}`"))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content).with_header(content_type(guess_content_type(path))?);

    request.respond(response)?;
    Ok(())
}

fn serve_status(request: Request, code: u16, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(code)
        .with_header(content_type("text/plain; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Documents
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}

// ============================================================================
// Directory Listing
// ============================================================================

/// Generate an HTML listing of `dir`, skipping hidden entries.
///
/// Directories come first, then files, each group sorted by name.
fn generate_directory_listing(dir: &Path, request_path: &str) -> std::io::Result<String> {
    let mut names: Vec<(bool, String)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| {
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            (!is_dir, entry.file_name().to_string_lossy().into_owned())
        })
        .filter(|(_, name)| !name.starts_with('.'))
        .collect();
    names.sort();

    let entries: Vec<_> = names
        .iter()
        .map(|(is_file, name)| {
            let href = format!("{}/{}", url_prefix(request_path), urlencoding::encode(name));
            let label = tera::escape_html(name);
            let slash = if *is_file { "" } else { "/" };
            format!(r#"<li><a href="{href}">{label}{slash}</a></li>"#)
        })
        .collect();

    let parent_link = if request_path.is_empty() {
        String::new()
    } else {
        let parent = Path::new(request_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(r#"<li class="parent"><a href="{}/">..</a></li>"#, url_prefix(&parent))
    };

    #[allow(clippy::literal_string_with_formatting_args)]
    // These are template placeholders, not format args
    Ok(DIRECTORY_TEMPLATE
        .replace("{path}", &tera::escape_html(request_path))
        .replace("{parent_link}", &parent_link)
        .replace("{entries}", &entries.join("\n    ")))
}

/// `/a/b` form of a relative request path, each segment percent-encoded.
fn url_prefix(request_path: &str) -> String {
    request_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("/{}", urlencoding::encode(segment)))
        .collect()
}
