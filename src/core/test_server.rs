use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use url::Url;

pub const TOKEN: &str = "glpat-test-token";

/// Serves `router` on a random local port behind a bearer token check and
/// returns the host url to configure a client with.
pub async fn spawn(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = router.layer(middleware::from_fn(require_token));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn require_token(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {TOKEN}");
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if provided != Some(expected.as_str()) {
        let body = serde_json::json!({ "message": "401 Unauthorized" });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    next.run(request).await
}
