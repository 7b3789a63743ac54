//! Method override so plain HTML forms can reach PUT and DELETE routes.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

/// Rewrites a POST into the method named by the `_method` query parameter or
/// the `X-HTTP-Method-Override` header. Only PUT, PATCH, and DELETE are
/// honored; anything else leaves the request untouched.
pub async fn method_override(mut req: Request, next: Next) -> Response {
    if req.method() == Method::POST {
        let requested = query_override(req.uri().query()).or_else(|| {
            req.headers()
                .get("x-http-method-override")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });
        if let Some(name) = requested {
            if let Ok(method) = Method::from_bytes(name.to_uppercase().as_bytes()) {
                if matches!(method, Method::PUT | Method::PATCH | Method::DELETE) {
                    *req.method_mut() = method;
                }
            }
        }
    }
    next.run(req).await
}

fn query_override(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::put, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/posts/:id", put(|| async { "updated" }).delete(|| async { "deleted" }))
            .layer(axum::middleware::from_fn(method_override))
    }

    #[tokio::test]
    async fn post_with_method_param_reaches_put_route() {
        let req = Request::builder()
            .method("POST")
            .uri("/posts/1?_method=put")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn override_header_is_honored() {
        let req = Request::builder()
            .method("POST")
            .uri("/posts/1")
            .header("x-http-method-override", "DELETE")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn plain_post_is_not_rewritten() {
        let req = Request::builder()
            .method("POST")
            .uri("/posts/1")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn only_put_patch_delete_are_honored() {
        let req = Request::builder()
            .method("POST")
            .uri("/posts/1?_method=connect")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
