//! Dashboard API routes

use actix_web::{delete, get, web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::debug;

use crate::core::dashboard::fetch_dashboard;
use crate::lastfm::LastfmClient;
use crate::models::Period;
use crate::stores::DashboardStore;

/// Query parameters for a dashboard fetch
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub user: String,
    pub period: Option<String>,
}

/// Fetch a fresh dashboard snapshot for a user and period
#[get("")]
pub async fn get_dashboard(query: web::Query<DashboardQuery>) -> impl Responder {
    let username = query.user.trim();
    if username.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Missing username"
        }));
    }

    let period = match query.period.as_deref() {
        None | Some("") => Period::default(),
        Some(p) => match Period::from_str(p) {
            Some(period) => period,
            None => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Unknown period '{}'", p)
                }))
            }
        },
    };

    // credential problems are caught before any network call
    let client = match LastfmClient::from_config() {
        Ok(client) => client,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    };

    let store = DashboardStore::get();
    let seq = store.begin();

    match fetch_dashboard(&client, username, period).await {
        Ok(data) => {
            if !store.commit(seq, data.clone()) {
                debug!("Fetch superseded; snapshot not stored");
            }
            HttpResponse::Ok().json(data)
        }
        Err(e) => HttpResponse::BadGateway().json(serde_json::json!({
            "error": format!("Failed to fetch Last.fm data: {}", e)
        })),
    }
}

/// Latest committed snapshot, if any
#[get("/current")]
pub async fn get_current() -> impl Responder {
    match DashboardStore::get().current() {
        Some(data) => HttpResponse::Ok().json(&*data),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "No dashboard loaded"
        })),
    }
}

/// Drop the stored snapshot (disconnect)
#[delete("/current")]
pub async fn clear_current() -> impl Responder {
    DashboardStore::get().clear();
    HttpResponse::Ok().json(serde_json::json!({ "msg": "Dashboard cleared" }))
}

/// Configure dashboard routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_dashboard)
        .service(get_current)
        .service(clear_current);
}
