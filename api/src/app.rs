//! Application state and factory
//!
//! This module wires the session manager and the user directory into the
//! actix-web application and defines the route table.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use blog_core::repositories::{CredentialStore, UserDirectory};

use crate::handlers::ApiError;
use crate::middleware::auth::{AccessTokenVerifier, JwtAuth};
use crate::routes::auth::{login::login, logout, refresh::refresh, register::register, AppState};
use crate::routes::users::me;

/// Create and configure the application with all dependencies
pub fn create_app<S, U>(
    app_state: web::Data<AppState<S, U>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: CredentialStore + 'static,
    U: UserDirectory + 'static,
{
    let verifier: Arc<dyn AccessTokenVerifier> = app_state.sessions.clone();

    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(web::Data::new(verifier))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into()
        }))
        // Request span per call, with request id and status
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(register::<S, U>))
                        .route("/login", web::post().to(login::<S, U>))
                        .route("/refresh", web::post().to(refresh::<S, U>))
                        .route("/logout", web::post().to(logout::logout::<S, U>))
                        .service(
                            web::resource("/logout-all")
                                .wrap(JwtAuth::new())
                                .route(web::post().to(logout::logout_all::<S, U>)),
                        ),
                )
                .service(
                    web::scope("/users").service(
                        web::resource("/me")
                            .wrap(JwtAuth::new())
                            .route(web::get().to(me::<S, U>)),
                    ),
                ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "blog-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(
        "The requested resource was not found".to_string(),
    ))
}

