//! User route handlers

use actix_web::{web, HttpResponse};

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::dto::auth::MeResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;
use crate::routes::auth::AppState;

/// Handler for GET /api/v1/users/me
///
/// Requires a Bearer access token.
pub async fn me<S, U>(
    state: web::Data<AppState<S, U>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", auth.user_id)))?;

    Ok(HttpResponse::Ok().json(MeResponse::new(user, auth.version, auth.expires_at)))
}
