// src/app.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::services::AuthService;
use crate::handlers::auth::{
    forgot_password, login, logout, me, refresh_token, register, reset_password, verify_token,
};
use crate::handlers::health::health;
use crate::handlers::user::{
    change_password, create_preferences, delete_account, get_preferences, get_profile,
    list_activities, list_notifications, mark_notification_read, update_preferences,
    update_profile,
};

/// Routes under `/auth`. Public and protected handlers share the service
/// state; protection comes from the `AuthClaims` extractor on the handler.
pub fn auth_routes() -> Router<Arc<AuthService>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/account", delete(delete_account))
        .route(
            "/preferences",
            get(get_preferences)
                .post(create_preferences)
                .put(update_preferences),
        )
        .route("/activities", get(list_activities))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", put(mark_notification_read))
}

/// Builds the full application router.
pub fn build_router(auth_service: Arc<AuthService>) -> Router {
    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let mut allowed_origins = vec![
        "http://localhost:8080".parse().expect("Invalid origin"),
        "http://127.0.0.1:8080".parse().expect("Invalid origin"),
    ];
    if let Ok(origin) = frontend_url.parse() {
        if !allowed_origins.contains(&origin) {
            allowed_origins.push(origin);
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .expose_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600));

    let api = Router::new()
        .route("/verify", post(verify_token))
        .nest("/auth", auth_routes())
        .with_state(auth_service);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        // CORS before the trace layer
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenSigner;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt; // for oneshot

    fn test_router() -> Router {
        let signer = TokenSigner::new(
            "router_access_secret",
            "router_refresh_secret",
            "authd-tests",
            900,
            3600,
        );
        build_router(Arc::new(AuthService::new(signer, 8)))
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = test_router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_requires_authorization_header() {
        let app = test_router();

        let req = Request::builder()
            .uri("/api/v1/auth/logout")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_without_token_is_an_opaque_401() {
        let app = test_router();

        let req = Request::builder()
            .uri("/api/v1/verify")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get("X-Auth-Status").unwrap(),
            "failed"
        );
        assert!(resp.headers().get("X-User-ID").is_none());
    }
}
