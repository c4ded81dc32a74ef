//! REST API routes for fmdash

pub mod auth;
pub mod dashboard;
pub mod health;

use actix_web::web;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth bridge routes
        .service(web::scope("/auth").configure(auth::configure))
        // Dashboard routes
        .service(web::scope("/dashboard").configure(dashboard::configure))
        // Health routes
        .service(web::scope("/health").configure(health::configure));
}
