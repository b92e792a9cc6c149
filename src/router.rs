//! Server router definition.
//!
//! The following routes are supported:
//!
//! - GET: `/health`
//! - POST: `/wekan/:network`

use crate::{chat::network::Networks, registry::ConfigStore, wekan::router::wekan_router};
use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

/// Dependencies shared by routes across requests.
#[derive(Clone)]
pub struct Deps {
    pub networks: Arc<dyn Networks>,
    pub store: Arc<dyn ConfigStore>,
}

/// Instantiate a new router with tracing.
pub fn new(deps: Deps) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
        .on_response(trace::DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(wekan_router())
        .layer(trace_layer)
        // Exclude the health check route from tracing.
        .route("/health", get(|| async { StatusCode::OK }))
        .with_state(deps)
}


#[cfg(test)]
mod tests_wekan {
    use super::*;
    use crate::{
        chat::{
            channel::ChannelName,
            message::{DeliveryMode, OutboundMessage},
            network::{LiveNetwork, NetworkSet},
        },
        config::JsonStore,
        registry,
        wekan::router::POST_ONLY,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tokio::sync::mpsc::UnboundedReceiver;
    use tower::ServiceExt;

    const BOARD: &str = "https://wekan.example.com/b/abc123";

    /// A router with `freenode` live and `#ops` joined and subscribed to
    /// [BOARD] as `proj`.
    fn router() -> (Router, UnboundedReceiver<OutboundMessage>) {
        let store = JsonStore::in_memory();
        registry::add(&store, &ChannelName::from("#ops"), "proj", BOARD).unwrap();

        let (net, rx) = LiveNetwork::new("freenode", ["#ops", "#dev"]);
        let mut networks = NetworkSet::default();
        networks.insert(Arc::new(net));

        let rt = super::new(Deps {
            networks: Arc::new(networks),
            store: Arc::new(store),
        });

        (rt, rx)
    }

    fn post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn plaintext_body(body: Body) -> String {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_success() {
        let (rt, mut rx) = router();
        let req = post(
            "/wekan/freenode",
            r#"{"text": "Card moved\nhttps://wekan.example.com/b/abc123/card/5"}"#,
        );

        let res = rt.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(plaintext_body(res.into_body()).await, "OK");

        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundMessage {
                target: ChannelName::from("#ops"),
                text: "Card moved".into(),
                mode: DeliveryMode::Public,
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_trailing_path_is_ignored() {
        let (rt, mut rx) = router();
        let req = post(
            "/wekan/freenode/anything/else",
            r#"{"text": "Card moved\nhttps://wekan.example.com/b/abc123"}"#,
        );

        let res = rt.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(rx.try_recv().unwrap().text, "Card moved");
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let (rt, mut rx) = router();
        let req = post(
            "/wekan/freenode",
            r#"{"text": "Card moved\nhttps://wekan.example.com/b/xyz999/card/1"}"#,
        );

        let res = rt.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(plaintext_body(res.into_body()).await, "OK");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_network() {
        for uri in ["/wekan", "/wekan/"] {
            let (rt, _rx) = router();

            let res = rt.oneshot(post(uri, "{}")).await.unwrap();

            assert_eq!(res.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                plaintext_body(res.into_body()).await,
                "Error: You need to provide the network name in the URL."
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let bodies = [
            r#"{"text": "Card moved\nhttps://wekan.example.com/b/abc123"}"#,
            "not-json",
            "",
        ];

        for body in bodies {
            let (rt, _rx) = router();

            let res = rt.oneshot(post("/wekan/Freenode", body)).await.unwrap();

            assert_eq!(res.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                plaintext_body(res.into_body()).await,
                "Error: Unknown network 'Freenode'"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (rt, mut rx) = router();

        let res = rt.oneshot(post("/wekan/freenode", "not-json")).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            plaintext_body(res.into_body()).await,
            "Error: Invalid JSON data sent."
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let (rt, _rx) = router();
        let req = Request::builder()
            .method("POST")
            .uri("/wekan/freenode")
            .body(Body::from(vec![b'"', 0xff, 0xfe, b'"']))
            .unwrap();

        let res = rt.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            plaintext_body(res.into_body()).await,
            "Error: Invalid JSON data sent."
        );
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let (rt, mut rx) = router();
        let body = format!(
            r#"{{"text": "{}\nhttps://wekan.example.com/b/abc123"}}"#,
            "x".repeat(3 * 1024 * 1024)
        );
        let req = Request::builder()
            .method("POST")
            .uri("/wekan/freenode")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let res = rt.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            plaintext_body(res.into_body()).await,
            "Error: Invalid JSON data sent."
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let bodies = [
            r#"{"text": "Card moved"}"#,
            r#"{"text": "Card\nmoved\nhttps://wekan.example.com/b/abc123"}"#,
            r#"{"title": "Card moved\nhttps://wekan.example.com/b/abc123"}"#,
            r#"["Card moved\nhttps://wekan.example.com/b/abc123"]"#,
            "null",
        ];

        for body in bodies {
            let (rt, mut rx) = router();

            let res = rt.oneshot(post("/wekan/freenode", body)).await.unwrap();

            assert_eq!(res.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                plaintext_body(res.into_body()).await,
                "Error: Invalid data sent."
            );
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_post_only() {
        for uri in ["/wekan", "/wekan/freenode", "/wekan/unknown"] {
            let (rt, _rx) = router();
            let req = Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap();

            let res = rt.oneshot(req).await.unwrap();

            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(plaintext_body(res.into_body()).await, POST_ONLY);
        }
    }
}
