//! Dispatch tests driven through the `tower::Service` interface.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderValue, Method as HttpMethod, StatusCode};
use tower::ServiceExt;

use webroute::http::{render, AppContext, Next, Request, ResponseWriter, Server, X_REQUEST_ID};
use webroute::routing::{Method, Route, Router};

mod common;
use common::{P1, P2, PAYLOAD};

#[tokio::test]
async fn unsupported_method_is_not_implemented() {
    let dispatcher = common::dispatcher(common::setup());
    let method = HttpMethod::from_bytes(b"ABC").unwrap();

    let resp = common::send(&dispatcher, method, &common::hello_path(), Body::empty()).await;
    assert_eq!(resp.status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn get_and_head_bind_params() {
    let dispatcher = common::dispatcher(common::setup());

    for method in [HttpMethod::GET, HttpMethod::HEAD] {
        let resp =
            common::send(&dispatcher, method.clone(), &common::hello_path(), Body::empty()).await;
        assert_eq!(resp.status, StatusCode::OK);

        let data = resp.data();
        assert_eq!(data["method"], method.as_str());
        assert_eq!(data["p1"], P1);
        assert_eq!(data["p2"], P2);
        assert_eq!(data["pattern"], common::hello_path());
    }
}

#[tokio::test]
async fn body_methods_echo_payload() {
    let dispatcher = common::dispatcher(common::setup());

    for method in [
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::PATCH,
        HttpMethod::DELETE,
        HttpMethod::OPTIONS,
    ] {
        let resp = common::send(&dispatcher, method.clone(), &common::hello_path(), PAYLOAD).await;
        assert_eq!(resp.status, StatusCode::OK, "{}", method);

        let json = resp.json();
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"]["method"], method.as_str());
        assert_eq!(json["data"]["p1"], P1);
        assert_eq!(json["data"]["p2"], P2);
        assert_eq!(json["data"]["payload"], PAYLOAD);
    }
}

#[tokio::test]
async fn middleware_adds_header() {
    let mut router = common::setup();
    router.use_middleware(common::mware);
    let dispatcher = common::dispatcher(router);

    let resp = common::get(&dispatcher, "/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers.get("k1").unwrap(), "v1");
}

#[tokio::test]
async fn middleware_does_not_run_on_miss() {
    let mut router = common::setup();
    router.use_middleware(common::mware);
    let dispatcher = common::dispatcher(router);

    let resp = common::get(&dispatcher, "/random").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.headers.get("k1").is_none());
}

#[tokio::test]
async fn root_route_answers_get() {
    let dispatcher = common::dispatcher(common::setup());

    let resp = common::get(&dispatcher, "/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["method"], "GET");
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let dispatcher = common::dispatcher(common::setup());

    for path in [
        "/random",
        "/hello/world/goblin",
        "/hello/world/goblin/spiderman/extra",
        "/Hello/world/goblin/spiderman",
        "/hello//goblin/spiderman",
    ] {
        let resp = common::get(&dispatcher, path).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
async fn method_mismatch_is_not_found() {
    let dispatcher = common::dispatcher(common::setup());

    let resp = common::send(&dispatcher, HttpMethod::POST, "/nparams", Body::empty()).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    // HEAD does not fall back to GET routes.
    let resp = common::send(&dispatcher, HttpMethod::HEAD, "/appcontext", Body::empty()).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_policy_per_route() {
    let dispatcher = common::dispatcher(common::setup());

    let resp = common::get(&dispatcher, "/wparams/world/goblin/spiderman/").await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = common::get(&dispatcher, "/wparams/world/goblin/spiderman").await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = common::get(&dispatcher, &format!("{}/", common::hello_path())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_string_is_ignored_for_matching() {
    let dispatcher = common::dispatcher(common::setup());

    let resp = common::get(&dispatcher, "/nparams?lang=en").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data(), "Hello world");
}

#[tokio::test]
async fn app_context_reaches_handlers() {
    let dispatcher = common::dispatcher(common::setup());

    let resp = common::get(&dispatcher, "/appcontext").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "webroute");
}

#[tokio::test]
async fn missing_app_value_is_reported_by_handler() {
    let router = Router::new(common::routes(), AppContext::new()).unwrap();
    let dispatcher = common::dispatcher(router);

    let resp = common::get(&dispatcher, "/appcontext").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["errors"], "No app config found");
}

type Log = Arc<Mutex<Vec<&'static str>>>;

fn recording_router(log: &Log, fall_through: bool) -> Router {
    let first = {
        let log = Arc::clone(log);
        move |w: ResponseWriter, req: Request| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("first");
                assert_eq!(req.read_body().await.unwrap(), "body");
                w.write_status(StatusCode::CREATED);
                w.write_body("first");
            }
        }
    };
    let second = {
        let log = Arc::clone(log);
        move |w: ResponseWriter, req: Request| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("second");
                // The first handler already consumed the body.
                assert!(req.read_body().await.unwrap().is_empty());
                w.write_status(StatusCode::ACCEPTED);
                w.write_body("+second");
            }
        }
    };

    Router::new(
        vec![Route::new("multi", Method::Post, "/multi")
            .handler(first)
            .handler(second)
            .fall_through(fall_through)],
        AppContext::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn fall_through_runs_every_handler_in_order() {
    let log: Log = Arc::default();
    let dispatcher = common::dispatcher(recording_router(&log, true));

    let resp = common::send(&dispatcher, HttpMethod::POST, "/multi", "body").await;

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    // First status wins; later body writes still append.
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.text(), "first+second");
}

#[tokio::test]
async fn without_fall_through_only_first_handler_runs() {
    let log: Log = Arc::default();
    let dispatcher = common::dispatcher(recording_router(&log, false));

    let resp = common::send(&dispatcher, HttpMethod::POST, "/multi", "body").await;

    assert_eq!(*log.lock().unwrap(), vec!["first"]);
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.text(), "first");
}

#[tokio::test]
async fn middleware_runs_in_registration_order() {
    let log: Log = Arc::default();
    let mut router = recording_router(&log, false);

    for (pre, post) in [("outer-pre", "outer-post"), ("inner-pre", "inner-post")] {
        let log = Arc::clone(&log);
        router.use_middleware(move |w: ResponseWriter, req: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(pre);
                next.run(w, req).await;
                log.lock().unwrap().push(post);
            }
        });
    }
    let dispatcher = common::dispatcher(router);

    common::send(&dispatcher, HttpMethod::POST, "/multi", "body").await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["outer-pre", "inner-pre", "first", "inner-post", "outer-post"]
    );
}

#[tokio::test]
async fn middleware_can_short_circuit() {
    let log: Log = Arc::default();
    let mut router = recording_router(&log, true);
    router.use_middleware(|w: ResponseWriter, req: Request, _next: Next| async move {
        render::forbidden(&w, &format!("{} denied", req.path()));
    });
    let dispatcher = common::dispatcher(router);

    let resp = common::send(&dispatcher, HttpMethod::POST, "/multi", Body::empty()).await;

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.json()["errors"], "/multi denied");
}

#[tokio::test]
async fn middleware_sees_bound_params() {
    let mut router = common::setup();
    router.use_middleware(|w: ResponseWriter, req: Request, next: Next| async move {
        if let Some(p1) = req.param("p1") {
            w.set_header(
                "x-p1".parse().unwrap(),
                HeaderValue::from_str(p1).unwrap(),
            );
        }
        next.run(w, req).await;
    });
    let dispatcher = common::dispatcher(router);

    let resp = common::get(&dispatcher, &common::hello_path()).await;
    assert_eq!(resp.headers.get("x-p1").unwrap(), P1);
}

#[tokio::test]
async fn repeated_requests_yield_identical_results() {
    let dispatcher = common::dispatcher(common::setup());

    let first = common::get(&dispatcher, &common::hello_path()).await;
    let second = common::get(&dispatcher, &common::hello_path()).await;

    assert_eq!(first.status, second.status);
    assert_eq!(first.json(), second.json());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_keep_their_own_params() {
    let dispatcher = common::dispatcher(common::setup());

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let path = format!("/hello/user{}/goblin/item{}", i, i * 7);
                let resp = common::get(&dispatcher, &path).await;
                (i, resp.data())
            })
        })
        .collect();

    for task in tasks {
        let (i, data) = task.await.unwrap();
        assert_eq!(data["p1"], format!("user{}", i));
        assert_eq!(data["p2"], format!("item{}", i * 7));
    }
}

#[tokio::test]
async fn handler_panic_is_isolated() {
    let router = Router::new(
        vec![
            Route::new("boom", Method::Get, "/boom").handler(
                |_w: ResponseWriter, _r: Request| async {
                    panic!("handler failed");
                },
            ),
            Route::new("fine", Method::Get, "/fine").handler(common::hello_world),
        ],
        AppContext::new(),
    )
    .unwrap();
    let dispatcher = common::dispatcher(router);

    let resp = common::get(&dispatcher, "/boom").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);

    let resp = common::get(&dispatcher, "/fine").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn server_stack_assigns_request_id() {
    let server = Server::new(common::setup(), common::test_config());

    let req = axum::http::Request::builder()
        .uri("/nparams")
        .body(Body::empty())
        .unwrap();
    let resp = server.app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(X_REQUEST_ID).is_some());
}

#[tokio::test]
async fn server_stack_keeps_caller_request_id() {
    let server = Server::new(common::setup(), common::test_config());

    let req = axum::http::Request::builder()
        .uri("/nparams")
        .header(X_REQUEST_ID, "req-42")
        .body(Body::empty())
        .unwrap();
    let resp = server.app().oneshot(req).await.unwrap();

    assert_eq!(resp.headers().get(X_REQUEST_ID).unwrap(), "req-42");
}

#[tokio::test]
async fn server_stack_enforces_body_limit() {
    let config = webroute::config::ServerConfig {
        max_body_bytes: 8,
        ..common::test_config()
    };
    let server = Server::new(common::setup(), config);

    let req = axum::http::Request::builder()
        .method(HttpMethod::POST)
        .uri(common::hello_path())
        .header("content-length", PAYLOAD.len())
        .body(Body::from(PAYLOAD))
        .unwrap();
    let resp = server.app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
