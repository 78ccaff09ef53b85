//! Development server with live reload
//!
//! Serves the site root as static files, except for the blog index and post
//! URLs, which are rendered on the server by the grid and post renderers
//! from the same markdown sources a browser would fetch.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tera::Context;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::client::{ClientContext, FsFetcher, GridOutcome, PageMeta, PostRenderer};
use crate::commands::build;
use crate::content::{markdown_module, LazyModule, MarkdownRenderer};
use crate::i18n::I18n;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    root: PathBuf,
    fetcher: FsFetcher,
    context: RwLock<Arc<ClientContext>>,
    markdown: LazyModule<MarkdownRenderer>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn context(&self) -> Arc<ClientContext> {
        match self.context.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    fn replace_context(&self, context: ClientContext) {
        match self.context.write() {
            Ok(mut guard) => *guard = Arc::new(context),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(context),
        }
    }

    /// Add the live reload script when enabled
    fn finish(&self, html: String) -> String {
        if self.live_reload {
            inject_live_reload(&html)
        } else {
            html
        }
    }
}

/// Renderer context for a site
fn client_context(site: &Site) -> Result<ClientContext> {
    let i18n = I18n::load(&site.config.language, &site.i18n_dir)?;
    ClientContext::new(site.config.clone(), i18n)
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        root: site.base_dir.clone(),
        fetcher: FsFetcher::new(&site.base_dir),
        context: RwLock::new(Arc::new(client_context(site)?)),
        markdown: markdown_module(site.config.highlight.clone()),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let blog = site.config.blog_segment();
    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route(&format!("/{}/", blog), get(blog_index_handler))
        .route(&format!("/{}/post.html", blog), get(blog_post_handler))
        .route(&format!("/{}/:slug/", blog), get(blog_post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Blog: {}/{}/", url, blog);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let base_dir = site.base_dir.clone();
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            let result = build::watch_blocking(&base_dir, |site| {
                match client_context(site) {
                    Ok(context) => state.replace_context(context),
                    Err(e) => tracing::error!("Failed to reload renderers: {:#}", e),
                }
                let _ = state.reload_tx.send(());
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct GridQuery {
    page: Option<usize>,
    category: Option<String>,
    search: Option<String>,
}

/// Blog index rendered by the grid renderer
async fn blog_index_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<GridQuery>,
) -> Response {
    let ctx = state.context();
    let mut outcome = GridOutcome::load(ctx.as_ref(), &state.fetcher).await;

    if let GridOutcome::Loaded(grid) = &mut outcome {
        if let Some(category) = &query.category {
            grid.set_category(category);
        }
        if let Some(search) = &query.search {
            grid.set_search(search);
        }
    }

    let rendered = outcome
        .render_html(&ctx, query.page.unwrap_or(1))
        .and_then(|content| render_layout(&ctx, &PageMeta::for_blog(&ctx.config), None, &content));

    match rendered {
        Ok(html) => Html(state.finish(html)).into_response(),
        Err(e) => server_error(e),
    }
}

/// Single post rendered by the post renderer; unknown slugs fall through to
/// static files
async fn blog_post_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let ctx = state.context();
    let url = request.uri().to_string();
    let renderer = PostRenderer::new(ctx.as_ref(), &state.fetcher, &state.markdown);

    let rendered = match renderer.render(&url).await {
        Ok(rendered) => rendered,
        Err(e) if e.is_not_found() => {
            tracing::debug!("{}: {}", url, e);
            return fallback_handler(State(Arc::clone(&state)), request).await;
        }
        Err(e) => {
            tracing::error!("Error loading blog post {}: {}", url, e);
            let content = renderer.error_html(&e);
            let meta = PageMeta::for_blog(&ctx.config);
            return match render_layout(&ctx, &meta, None, &content) {
                Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(state.finish(html))).into_response(),
                Err(e) => server_error(e),
            };
        }
    };

    let related = renderer.related_posts(&rendered.post).await;
    let page = rendered.to_html(&ctx, &related).and_then(|content| {
        render_layout(&ctx, &rendered.meta, Some(rendered.schema_json()), &content)
    });

    match page {
        Ok(html) => Html(state.finish(html)).into_response(),
        Err(e) => server_error(e),
    }
}

/// Wrap rendered content in the page layout
fn render_layout(
    ctx: &ClientContext,
    meta: &PageMeta,
    schema: Option<String>,
    content: &str,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("language", &ctx.config.language);
    context.insert("meta", meta);
    context.insert("schema", &schema.unwrap_or_default());
    context.insert("content", content);
    ctx.templates.render("blog/layout.html", &context)
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Render failed").into_response()
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve files from the site root, injecting the live reload script into HTML
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path();
    let clean_path = path.trim_start_matches('/');
    let candidate = state.root.join(clean_path);

    let file_path = if path == "/" || candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.exists() {
        candidate
    } else {
        let with_html = state.root.join(format!("{}.html", clean_path));
        if with_html.exists() {
            with_html
        } else {
            candidate
        }
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload && !clean_path.contains("..") {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        let mut service = ServeDir::new(&state.root).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(i) => format!("{}{}{}", &html[..i], LIVE_RELOAD_SCRIPT, &html[i + "</body>".len()..]),
        None => format!("{}{}", html, LIVE_RELOAD_SCRIPT),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
