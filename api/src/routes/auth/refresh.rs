use actix_web::{web, HttpRequest, HttpResponse};

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::dto::auth::{RefreshTokenRequest, TokenResponse};
use crate::handlers::ApiError;

use super::cookie::refresh_cookie;
use super::{presented_refresh_token, AppState};

/// Handler for POST /api/v1/auth/refresh
///
/// Trades the refresh token (cookie, or `refresh_token` in the JSON body)
/// for a new pair. The presented token is single-use: it is revoked and
/// every other token of the user stops working.
///
/// ## Errors
/// - 401 Unauthorized: missing, malformed, expired, stale or revoked token
/// - 500 Internal Server Error: credential store unavailable
pub async fn refresh<S, U>(
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

    let pair = state.sessions.refresh(&token).await?;

    let cookie = refresh_cookie(&state.cookie, pair.refresh_token.clone(), pair.refresh_expires_in);
    Ok(HttpResponse::Ok().cookie(cookie).json(TokenResponse::from(pair)))
}
