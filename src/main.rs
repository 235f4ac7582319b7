//! webroute demo server.
//!
//! Serves a small route table over HTTP (and optionally HTTPS) until
//! Ctrl+C or SIGTERM, then drains both listeners.

use std::path::PathBuf;

use axum::http::HeaderValue;
use clap::Parser;
use serde::Serialize;

use webroute::config::{load_config, ServerConfig};
use webroute::http::{render, AppContext, Next, Request, ResponseWriter, Server};
use webroute::lifecycle::wait_for_signal;
use webroute::observability::init_logging;
use webroute::routing::{Method, Route, Router};

#[derive(Parser)]
#[command(name = "webroute")]
#[command(about = "Minimal HTTP request router demo server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also start the HTTPS listener (needs cert_file and key_file)
    #[arg(long)]
    tls: bool,
}

#[derive(Serialize)]
struct AppInfo {
    name: &'static str,
    version: &'static str,
}

async fn hello(w: ResponseWriter, _req: Request) {
    render::ok(&w, "Hello world");
}

async fn echo(w: ResponseWriter, req: Request) {
    let payload = match req.read_body().await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            render::bad_request(&w, &e.to_string());
            return;
        }
    };

    render::ok(
        &w,
        &serde_json::json!({
            "p1": req.param("p1").unwrap_or_default(),
            "p2": req.param("p2").unwrap_or_default(),
            "payload": payload,
            "pattern": req.path(),
            "method": req.method().as_str(),
        }),
    );
}

async fn after_response(_w: ResponseWriter, req: Request) {
    tracing::info!(path = %req.path(), "Post-response handler ran");
}

async fn app_info(w: ResponseWriter, req: Request) {
    match req.context().app().get::<AppInfo>("info") {
        Some(info) => render::ok(&w, info),
        None => render::bad_request(&w, "No app info found"),
    }
}

async fn server_header(w: ResponseWriter, req: Request, next: Next) {
    w.set_header(
        axum::http::header::SERVER,
        HeaderValue::from_static("webroute"),
    );
    next.run(w, req).await;
}

fn routes() -> Vec<Route> {
    let mut routes = vec![
        Route::new("root", Method::Get, "/")
            .handler(hello)
            .handler(after_response)
            .fall_through(true)
            .trailing_slash(true),
        Route::new("appcontext", Method::Get, "/appcontext").handler(app_info),
    ];
    routes.extend(Method::ALL.iter().map(|&method| {
        Route::new(
            format!("params-{}", method.as_str().to_lowercase()),
            method,
            "/hello/:p1/goblin/:p2",
        )
        .handler(echo)
    }));
    routes
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    init_logging(&config.log_level)?;
    tracing::info!("webroute v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        http_address = %config.http_address(),
        https_address = %config.https_address(),
        read_timeout_secs = config.read_timeout_secs,
        write_timeout_secs = config.write_timeout_secs,
        "Configuration loaded"
    );

    let app = AppContext::new().with(
        "info",
        AppInfo {
            name: "webroute",
            version: env!("CARGO_PKG_VERSION"),
        },
    );
    let mut router = Router::new(routes(), app)?;
    router.use_middleware(server_header);

    let server = Server::new(router, config);
    server.start().await?;
    if cli.tls {
        if let Err(e) = server.start_secure().await {
            tracing::error!(error = %e, "HTTPS listener failed to start");
            server.shutdown().await?;
            return Err(e.into());
        }
    }

    wait_for_signal().await;

    server.shutdown().await?;
    if cli.tls {
        server.shutdown_secure().await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
