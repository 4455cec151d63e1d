use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh_token,
        crate::handlers::auth::verify_token,
        crate::handlers::auth::logout,
    ),
    components(schemas(
        crate::dto::requests::RegisterRequest,
        crate::dto::requests::LoginRequest,
        crate::dto::requests::RefreshTokenRequest,
        crate::dto::requests::VerifyTokenRequest,
        crate::dto::responses::UserResponse,
        crate::dto::responses::AuthResponse,
        crate::dto::responses::RefreshResponse,
        crate::dto::responses::VerifyResponse,
        crate::dto::responses::ErrorResponse,
    )),
    tags(
        (name = "Health"),
        (name = "Auth"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("serializable document");
        assert!(json.contains("/api/v1/auth/login"));
        assert!(json.contains("/api/v1/verify"));
    }
}
