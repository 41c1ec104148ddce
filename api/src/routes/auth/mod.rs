//! Authentication route handlers
//!
//! This module contains all session endpoints:
//! - Registration and login
//! - Token refresh (rotation)
//! - Logout of one session family or of every session

pub mod cookie;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

use std::sync::Arc;

use actix_web::HttpRequest;

use blog_core::repositories::{CredentialStore, UserDirectory};
use blog_core::services::SessionManager;
use blog_shared::RefreshCookieConfig;

use crate::dto::auth::RefreshTokenRequest;

/// Application state that holds shared services
pub struct AppState<S, U>
where
    S: CredentialStore,
    U: UserDirectory,
{
    pub sessions: Arc<SessionManager<S>>,
    pub users: Arc<U>,
    pub cookie: RefreshCookieConfig,
}

impl<S, U> AppState<S, U>
where
    S: CredentialStore,
    U: UserDirectory,
{
    pub fn new(
        sessions: Arc<SessionManager<S>>,
        users: Arc<U>,
        cookie: RefreshCookieConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            cookie,
        }
    }
}

/// Refresh token presented by the client, cookie first, then JSON body
pub(crate) fn presented_refresh_token(
    req: &HttpRequest,
    cookie_name: &str,
    body: Option<RefreshTokenRequest>,
) -> Option<String> {
    req.cookie(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| body.and_then(|body| body.refresh_token))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, test::TestRequest};

    fn body(token: &str) -> Option<RefreshTokenRequest> {
        Some(RefreshTokenRequest {
            refresh_token: Some(token.to_string()),
        })
    }

    #[test]
    fn test_cookie_takes_precedence_over_body() {
        let req = TestRequest::default()
            .cookie(Cookie::new("refresh_token", "from-cookie"))
            .to_http_request();
        assert_eq!(
            presented_refresh_token(&req, "refresh_token", body("from-body")),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_body() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(
            presented_refresh_token(&req, "refresh_token", body("from-body")),
            Some("from-body".to_string())
        );
        assert_eq!(presented_refresh_token(&req, "refresh_token", body("")), None);
        assert_eq!(presented_refresh_token(&req, "refresh_token", None), None);
    }
}
