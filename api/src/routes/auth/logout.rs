use actix_web::{web, HttpRequest, HttpResponse};

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::dto::auth::{MessageResponse, RefreshTokenRequest};
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

use super::cookie::removal_cookie;
use super::{presented_refresh_token, AppState};

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the session of the presented refresh token. All tokens issued to
/// the user before this call stop working, on every device.
///
/// ## Errors
/// - 401 Unauthorized: missing, invalid or already revoked refresh token
/// - 500 Internal Server Error: credential store unavailable
pub async fn logout<S, U>(
    req: HttpRequest,
    state: web::Data<AppState<S, U>>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    let token = presented_refresh_token(&req, &state.cookie.name, body.map(|b| b.into_inner()))
        .ok_or(ApiError::MissingCredentials("Missing refresh token"))?;

    state.sessions.logout(&token).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state.cookie))
        .json(MessageResponse::new("Logged out successfully")))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Requires a Bearer access token. Revokes every token of the caller.
pub async fn logout_all<S, U>(
    state: web::Data<AppState<S, U>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    state.sessions.revoke_all(auth.user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state.cookie))
        .json(MessageResponse::new("Logged out of all sessions")))
}
