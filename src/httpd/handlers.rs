//
// rctl_exporter
//
// This module deals with httpd route handlers.
//
#![forbid(unsafe_code)]
use super::{
    AppState,
    HttpdError,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{
    IntoResponse,
    Response,
};
use std::sync::Arc;
use tracing::{
    debug,
    error,
};

const HTML: &str = "text/html; charset=utf-8";
const OPENMETRICS: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";
const PLAINTEXT: &str = "text/plain; charset=utf-8";

// Displays the index page. This is a page which simply links to the actual
// telemetry path.
pub(in crate::httpd) async fn index(State(state): State<AppState>) -> Response {
    debug!("Displaying index page");

    ([(CONTENT_TYPE, HTML)], state.index_page).into_response()
}

// Returns the exporter output, or an InternalServerError carrying the error
// text if things fail for some reason.
pub(in crate::httpd) async fn metrics(State(state): State<AppState>) -> Response {
    debug!("Processing metrics request");

    let exporter = Arc::clone(&state.exporter);

    // Refreshing walks the process table and queries the kernel.
    let collected = tokio::task::spawn_blocking(move || exporter.collect())
        .await
        .map_err(|e| HttpdError::CollectorError(e.to_string()))
        .and_then(|collected| collected);

    match collected {
        Ok(body) => ([(CONTENT_TYPE, OPENMETRICS)], body).into_response(),
        Err(e) => {
            error!("Failed to collect metrics: {e}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, PLAINTEXT)],
                e.to_string(),
            ).into_response()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::httpd::Collector;
    use axum::Router;
    use axum::body::{
        Body,
        Bytes,
        to_bytes,
    };
    use axum::http::Request;
    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct TestCollector {
        fail: bool,
    }

    impl Collector for TestCollector {
        fn collect(&self) -> Result<Vec<u8>, HttpdError> {
            if self.fail {
                return Err(HttpdError::CollectorError("kaboom".into()));
            }

            Ok(b"rctl_up 1\n# EOF\n".to_vec())
        }
    }

    fn app(fail: bool) -> Router {
        let state = AppState {
            exporter:   Arc::new(TestCollector { fail }),
            index_page: Bytes::from_static(b"Test Body"),
        };

        Router::new()
            .route("/", get(index))
            .route("/metrics", get(metrics))
            .with_state(state)
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_ok() {
        let response = app(false).oneshot(request("/")).await.unwrap();
        assert!(response.status().is_success());

        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(content_type, HTML);

        assert_eq!(body_string(response).await, "Test Body");
    }

    #[tokio::test]
    async fn metrics_ok() {
        let response = app(false).oneshot(request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(content_type, OPENMETRICS);

        assert_eq!(body_string(response).await, "rctl_up 1\n# EOF\n");
    }

    #[tokio::test]
    async fn metrics_collector_error() {
        let response = app(true).oneshot(request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            body_string(response).await,
            "error collecting metrics: kaboom",
        );
    }
}
