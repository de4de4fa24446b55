use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id carried through request extensions and response headers
#[derive(Clone, Copy, Debug)]
pub struct RequestId(pub Uuid);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Attaches a request id to every request
///
/// A valid `x-request-id` header on the incoming request wins; otherwise a
/// fresh UUID is generated. The id is echoed back on the response so clients
/// can quote it when reporting a failure.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map_or_else(|| RequestId(Uuid::new_v4()), RequestId);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Span factory for the HTTP trace layer, tagging each span with the id
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use axum_test::TestServer;

    fn app() -> TestServer {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware));
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let server = app();
        let response = server.get("/").await;
        let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_echoes_caller_request_id() {
        let server = app();
        let id = Uuid::new_v4();
        let response = server
            .get("/")
            .add_header(
                axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_str(&id.to_string()).unwrap(),
            )
            .await;
        let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(header.to_str().unwrap(), id.to_string());
    }

    #[tokio::test]
    async fn test_replaces_malformed_request_id() {
        let server = app();
        let response = server
            .get("/")
            .add_header(
                axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_static("not-a-uuid"),
            )
            .await;
        let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
        assert_ne!(header.to_str().unwrap(), "not-a-uuid");
    }
}
