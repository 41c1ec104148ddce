//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the access token from the Authorization header,
//! verifies it through the session manager and injects the caller's
//! [`AuthContext`] into the request.
//!
//! The verifier is looked up in app data as
//! `web::Data<Arc<dyn AccessTokenVerifier>>`, so the middleware does not
//! depend on the credential store backend.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{debug, error};

use blog_core::domain::TokenData;
use blog_core::errors::TokenError;
use blog_core::repositories::CredentialStore;
use blog_core::services::SessionManager;

use crate::handlers::ApiError;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject the access token was issued to
    pub user_id: u64,
    /// Version stamp carried by the token
    pub version: u64,
    /// Expiry of the access token, unix seconds
    pub expires_at: i64,
}

impl From<TokenData> for AuthContext {
    fn from(data: TokenData) -> Self {
        Self {
            user_id: data.user_id,
            version: data.version,
            expires_at: data.exp,
        }
    }
}

/// Access token verification as seen by the middleware
#[async_trait]
pub trait AccessTokenVerifier: Send + Sync {
    async fn verify_access(&self, token: &str) -> Result<TokenData, TokenError>;
}

#[async_trait]
impl<S: CredentialStore + 'static> AccessTokenVerifier for SessionManager<S> {
    async fn verify_access(&self, token: &str) -> Result<TokenData, TokenError> {
        self.authenticate_access(token).await
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Default, Clone, Copy)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = extract_bearer_token(&req)
                .ok_or(ApiError::MissingCredentials("Missing or invalid Authorization header"))?;

            let verifier = match req.app_data::<web::Data<Arc<dyn AccessTokenVerifier>>>() {
                Some(verifier) => verifier.clone(),
                None => {
                    error!("JwtAuth used without an AccessTokenVerifier in app data");
                    return Err(
                        ApiError::Internal("authentication is not configured".to_string()).into(),
                    );
                }
            };

            let data = verifier.verify_access(&token).await.map_err(|e| {
                debug!("Access token rejected: {}", e);
                ApiError::from(e)
            })?;

            req.extensions_mut().insert(AuthContext::from(data));

            service.call(req).await
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = req
            .extensions()
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| ApiError::MissingCredentials("Authentication required").into());

        ready(result)
    }
}
