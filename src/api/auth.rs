//! Last.fm auth bridge routes
//!
//! One POST endpoint with an `action` query parameter completes the
//! three-legged web-auth handoff: hand out the authorization URL, exchange
//! the redirect token for a local session, or expose the API key for
//! client-side reads. CORS (including the OPTIONS preflight) is handled by
//! the Cors wrap in main.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use anyhow::{anyhow, Result as AnyResult};
use serde::{Deserialize, Serialize};

use crate::config::UserConfig;
use crate::db::{ProfileTable, UserTable};
use crate::lastfm::LastfmClient;
use crate::models::{Profile, User};
use crate::utils::auth::{
    create_jwt, derive_lastfm_password, hash_password, verify_jwt, verify_password, UserIdentity,
};

const ACCESS_MAX_AGE: i64 = 30 * 24 * 3600; // 30 days in seconds
const REFRESH_MAX_AGE: i64 = 30 * 24 * 3600;

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlRequest {
    callback_url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    token: String,
}

/// Local session token pair
#[derive(Debug, Serialize, Clone)]
pub struct TokenResponse {
    pub msg: String,
    pub accesstoken: String,
    pub refreshtoken: String,
    pub maxage: i64,
}

/// Auth bridge endpoint, action selected by query parameter
#[post("/lastfm")]
pub async fn lastfm_auth(
    query: web::Query<ActionQuery>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    match query.action.as_str() {
        "get-auth-url" => {
            let req: AuthUrlRequest = match serde_json::from_value(body.into_inner()) {
                Ok(req) => req,
                Err(_) => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "Missing callbackUrl"
                    }))
                }
            };

            match get_auth_url(&req.callback_url) {
                Ok(auth_url) => {
                    HttpResponse::Ok().json(serde_json::json!({ "authUrl": auth_url }))
                }
                Err(e) => error_response(e),
            }
        }
        "exchange-token" => {
            let req: ExchangeRequest = match serde_json::from_value(body.into_inner()) {
                Ok(req) => req,
                Err(_) => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "Missing token"
                    }))
                }
            };

            match exchange_token(&req.token).await {
                Ok(payload) => HttpResponse::Ok().json(payload),
                Err(e) => error_response(e),
            }
        }
        "get-api-key" => match LastfmClient::from_config() {
            Ok(client) => HttpResponse::Ok().json(serde_json::json!({
                "apiKey": client.api_key()
            })),
            Err(e) => error_response(e.into()),
        },
        _ => HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid action"
        })),
    }
}

fn get_auth_url(callback_url: &str) -> AnyResult<String> {
    if callback_url.is_empty() {
        return Err(anyhow!("Missing callbackUrl"));
    }

    let client = LastfmClient::from_config()?;
    Ok(client.auth_url(callback_url))
}

/// Exchange a one-time Last.fm token for a local session
///
/// Signed getSession call, profile fetch, then sign-in with the derived
/// credential - provisioning the local account and profile record on first
/// contact, refreshing the mutable profile fields on every later login.
async fn exchange_token(token: &str) -> AnyResult<serde_json::Value> {
    if token.is_empty() {
        return Err(anyhow!("Missing token"));
    }

    let config = UserConfig::load()?;
    let client = LastfmClient::from_config()?;

    let (lastfm_username, session_key) = client.get_session(token).await?;
    let lastfm_user = client.get_user_info(&lastfm_username).await?;
    let avatar_url = lastfm_user.avatar_url();

    let derived = derive_lastfm_password(&lastfm_username, &config.lastfm_api_secret);

    let user = match UserTable::get_by_username(&lastfm_username).await? {
        Some(user) => {
            if !verify_password(&derived, &config.server_id, &user.password) {
                return Err(anyhow!("Invalid login credentials for {}", lastfm_username));
            }

            ProfileTable::update_on_login(
                user.id,
                &session_key,
                &avatar_url,
                lastfm_user.playcount(),
            )
            .await?;

            user
        }
        None => {
            tracing::info!("Provisioning local account for {}", lastfm_username);

            let password_hash = hash_password(&derived, &config.server_id);
            let mut user = User::new(lastfm_username.clone(), password_hash);
            user.id = UserTable::insert(&user).await?;

            let profile = Profile {
                id: 0,
                user_id: user.id,
                lastfm_username: lastfm_username.clone(),
                lastfm_session_key: session_key.clone(),
                display_name: lastfm_user.display_name().to_string(),
                avatar_url: avatar_url.clone(),
                country: Some(lastfm_user.country.clone()).filter(|c| !c.is_empty()),
                playcount: lastfm_user.playcount(),
                registered_at: lastfm_user.registered_unixtime(),
            };
            ProfileTable::insert(&profile).await?;

            user
        }
    };

    let session = create_tokens(&user, &config.server_id)?;

    Ok(serde_json::json!({
        "success": true,
        "session": session,
        "user": user,
        "lastfmUsername": lastfm_username,
        "sessionKey": session_key,
    }))
}

fn create_tokens(user: &User, server_id: &str) -> AnyResult<TokenResponse> {
    let identity = UserIdentity {
        id: user.id,
        username: user.username.clone(),
    };

    let accesstoken = create_jwt(identity.clone(), server_id, "access", ACCESS_MAX_AGE as u64)?;
    let refreshtoken = create_jwt(identity, server_id, "refresh", REFRESH_MAX_AGE as u64)?;

    Ok(TokenResponse {
        msg: format!("Logged in as {}", user.username),
        accesstoken,
        refreshtoken,
        maxage: ACCESS_MAX_AGE,
    })
}

/// Get the logged-in user's account and profile record
#[get("/user")]
pub async fn get_logged_in_user(req: HttpRequest) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No token provided"
            }))
        }
    };

    let config = match UserConfig::load() {
        Ok(cfg) => cfg,
        Err(_) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Config error"
            }))
        }
    };

    let claims = match verify_jwt(&token, &config.server_id, Some("access")) {
        Ok(claims) => claims,
        Err(_) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid token"
            }))
        }
    };

    match UserTable::get_by_id(claims.user.id).await {
        Ok(Some(user)) => {
            let profile = ProfileTable::get_by_user_id(user.id).await.ok().flatten();
            HttpResponse::Ok().json(serde_json::json!({
                "user": user,
                "profile": profile,
            }))
        }
        Ok(None) => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid token"
        })),
        Err(_) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Database error"
        })),
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?.trim();
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn error_response(e: anyhow::Error) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": e.to_string()
    }))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(lastfm_auth).service(get_logged_in_user);
}
