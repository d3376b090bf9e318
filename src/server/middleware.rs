use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::telemetry::{attributes, record_span_attributes};

/// Record HTTP method, path and status on the request span
pub async fn http_span_attributes(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    record_span_attributes([
        attributes::http_method(&method),
        attributes::http_path(&path),
        attributes::http_status(response.status().as_u16()),
    ]);

    response
}
