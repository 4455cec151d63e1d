use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Generic handler response: status code, optional headers, JSON body.
///
/// # Examples
///
/// ```ignore
/// AppResponse::ok(user_data)
/// AppResponse::created(new_user)
/// AppResponse::ok(attestation).with_headers(headers)
/// ```
pub struct AppResponse<T> {
    status: StatusCode,
    headers: Option<HeaderMap>,
    body: Option<T>,
}

impl<T> AppResponse<T>
where
    T: Serialize,
{
    pub fn new(status: StatusCode, body: T) -> Self {
        Self {
            status,
            headers: None,
            body: Some(body),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: None,
            body: None,
        }
    }

    /// Attach response headers (used by the forward-auth attestation).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    // === Constructeurs pour les status codes courants ===

    /// 200 OK
    pub fn ok(body: T) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 201 Created
    pub fn created(body: T) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    /// 401 Unauthorized with a body (verify keeps its opaque JSON shape)
    pub fn unauthorized(body: T) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, body)
    }
}

impl AppResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self::empty(StatusCode::NO_CONTENT)
    }
}

impl<T> IntoResponse for AppResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };

        if let Some(headers) = self.headers {
            response.headers_mut().extend(headers);
        }

        response
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<AppResponse<T>, crate::error::AppError>;
