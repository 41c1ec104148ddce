use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::dto::auth::{RegisterRequest, UserResponse};
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/v1/auth/register
///
/// Creates an account. Does not log the user in.
///
/// ## Errors
/// - 400 Bad Request: invalid e-mail, password or name
/// - 409 Conflict: e-mail already registered
pub async fn register<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    request.validate()?;

    let user = state
        .users
        .register(&request.email, &request.password, &request.name)
        .await?;

    info!(user_id = user.id, "Registered user");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
