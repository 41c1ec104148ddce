//! HTTP transport for the blog API session lifecycle
//!
//! Maps the session manager onto actix-web routes: login hands out a token
//! pair, refresh rotates it, logout revokes it, and the [`JwtAuth`]
//! middleware guards everything that needs an access token.
//!
//! [`JwtAuth`]: middleware::auth::JwtAuth

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
