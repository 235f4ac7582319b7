//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method as HttpMethod, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use webroute::config::ServerConfig;
use webroute::http::{render, AppContext, Dispatcher, Next, Request, ResponseWriter};
use webroute::routing::{Method, Route, Router};

pub const P1: &str = "world";
pub const P2: &str = "spiderman";
pub const PAYLOAD: &str = r#"{"payload": "nothing"}"#;

/// Application value stored under the `config` key.
#[derive(Debug, Serialize)]
pub struct AppConfig {
    pub name: String,
}

/// Echo params, body, path, and method back in a success envelope.
pub async fn dummy(w: ResponseWriter, req: Request) {
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

pub async fn get_app_config(w: ResponseWriter, req: Request) {
    match req.context().app().get::<AppConfig>("config") {
        Some(config) => render::ok(&w, config),
        None => render::bad_request(&w, "No app config found"),
    }
}

pub async fn hello_world(w: ResponseWriter, _req: Request) {
    render::ok(&w, "Hello world");
}

pub async fn post_response(_w: ResponseWriter, req: Request) {
    tracing::debug!(path = %req.path(), "post-response handler");
}

/// Middleware adding `k1: v1` to every response.
pub async fn mware(w: ResponseWriter, req: Request, next: Next) {
    w.set_header("k1".parse().unwrap(), HeaderValue::from_static("v1"));
    next.run(w, req).await;
}

pub fn routes() -> Vec<Route> {
    let mut routes = vec![
        Route::new("root", Method::Get, "/")
            .handler(dummy)
            .handler(post_response)
            .fall_through(true)
            .trailing_slash(true),
        Route::new("appcontext", Method::Get, "/appcontext").handler(get_app_config),
        Route::new("hw-noparams", Method::Get, "/nparams").handler(hello_world),
        Route::new("hw-withparams", Method::Get, "/wparams/:p1/goblin/:p2")
            .handler(hello_world)
            .trailing_slash(true),
    ];
    routes.extend(Method::ALL.iter().map(|&method| {
        Route::new(
            format!("params-{}", method.as_str().to_lowercase()),
            method,
            "/hello/:p1/goblin/:p2",
        )
        .handler(dummy)
    }));
    routes
}

pub fn app_context() -> AppContext {
    AppContext::new().with(
        "config",
        AppConfig {
            name: "webroute".to_string(),
        },
    )
}

pub fn setup() -> Router {
    Router::new(routes(), app_context()).unwrap()
}

pub fn dispatcher(router: Router) -> Dispatcher {
    Dispatcher::new(router.into())
}

/// Config bound to ephemeral ports on loopback.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        https_port: 0,
        shutdown_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

pub fn hello_path() -> String {
    format!("/hello/{}/goblin/{}", P1, P2)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Drive one request through `dispatcher` without a socket.
pub async fn send(
    dispatcher: &Dispatcher,
    method: HttpMethod,
    uri: &str,
    body: impl Into<Body>,
) -> TestResponse {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    let resp = dispatcher.clone().oneshot(req).await.unwrap();

    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(dispatcher: &Dispatcher, uri: &str) -> TestResponse {
    send(dispatcher, HttpMethod::GET, uri, Body::empty()).await
}

/// A reqwest client that ignores proxy settings from the environment.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A reqwest client that trusts the self-signed test certificates.
pub fn https_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap()
}
