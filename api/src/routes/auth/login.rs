use actix_web::{web, HttpResponse};
use validator::Validate;

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::dto::auth::{LoginRequest, TokenResponse};
use crate::handlers::ApiError;

use super::cookie::refresh_cookie;
use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Exchanges e-mail and password for a token pair.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "Bearer",
///     "expires_in": 900,
///     "refresh_expires_in": 604800
/// }
/// ```
/// The refresh token is also set as an HttpOnly cookie.
///
/// ## Errors
/// - 400 Bad Request: malformed body
/// - 401 Unauthorized: unknown e-mail or wrong password
/// - 500 Internal Server Error: credential store unavailable
pub async fn login<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    request.validate()?;

    let user_id = state
        .users
        .authenticate(&request.email, &request.password)
        .await?;
    let pair = state.sessions.login(user_id).await?;

    let cookie = refresh_cookie(&state.cookie, pair.refresh_token.clone(), pair.refresh_expires_in);
    Ok(HttpResponse::Ok().cookie(cookie).json(TokenResponse::from(pair)))
}
