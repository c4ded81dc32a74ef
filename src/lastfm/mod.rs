//! Last.fm API client
//!
//! One shared client over the ws.audioscrobbler.com endpoint: unsigned GET
//! reads for the dashboard data and a signed `auth.getSession` exchange for
//! the web-auth flow.

use md5::{Digest, Md5};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::UserConfig;
use crate::models::{
    LastfmAlbum, LastfmArtist, LastfmImage, LastfmTag, LastfmTrack, LastfmUser, Period,
    RecentTrack, SimilarArtist,
};

const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
const LASTFM_AUTH_URL: &str = "https://www.last.fm/api/auth/";

/// Tags taken per artist lookup
const ARTIST_TAG_LIMIT: usize = 5;

/// Last.fm client errors
#[derive(Debug, thiserror::Error)]
pub enum LastfmError {
    #[error("Last.fm API credentials are not configured")]
    MissingCredentials,
    #[error("Last.fm API error: {0}")]
    Status(String),
    #[error("Last.fm error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("Last.fm returned no session")]
    MissingSession,
    #[error("Failed to decode Last.fm response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: Option<SessionInfo>,
}

#[derive(Debug, Deserialize)]
struct SessionInfo {
    name: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct RawSimilarArtist {
    name: String,
    #[serde(rename = "match", default)]
    match_score: String,
    #[serde(default)]
    image: Vec<LastfmImage>,
}

/// Last.fm API client
pub struct LastfmClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: Url,
}

impl LastfmClient {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_secret,
            base_url: Url::parse(LASTFM_API_URL).expect("static url"),
        }
    }

    /// Point the client at a different API endpoint
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build a client from the stored settings
    pub fn from_config() -> Result<Self, LastfmError> {
        let config = UserConfig::load().unwrap_or_default();
        if config.lastfm_api_key.is_empty() || config.lastfm_api_secret.is_empty() {
            return Err(LastfmError::MissingCredentials);
        }
        Ok(Self::new(config.lastfm_api_key, config.lastfm_api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Web-auth URL the user is redirected to, with our callback attached
    pub fn auth_url(&self, callback_url: &str) -> String {
        let mut url = reqwest::Url::parse(LASTFM_AUTH_URL).expect("static url");
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("cb", callback_url);
        url.to_string()
    }

    /// Unsigned GET request, shared by all read methods
    async fn request(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, LastfmError> {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("method", method);
            pairs.append_pair("api_key", &self.api_key);
            pairs.append_pair("format", "json");
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(LastfmError::Status(format!("{} {}", status.as_u16(), reason)));
        }

        let json: serde_json::Value = resp.json().await?;
        check_api_error(&json)?;

        Ok(json)
    }

    pub async fn get_user_info(&self, username: &str) -> Result<LastfmUser, LastfmError> {
        let data = self.request("user.getinfo", &[("user", username)]).await?;
        Ok(serde_json::from_value(
            data.get("user").cloned().unwrap_or_default(),
        )?)
    }

    pub async fn get_top_artists(
        &self,
        username: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<LastfmArtist>, LastfmError> {
        let limit = limit.to_string();
        let data = self
            .request(
                "user.gettopartists",
                &[
                    ("user", username),
                    ("period", period.as_str()),
                    ("limit", &limit),
                ],
            )
            .await?;
        list_at(&data, "/topartists/artist")
    }

    pub async fn get_top_tracks(
        &self,
        username: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<LastfmTrack>, LastfmError> {
        let limit = limit.to_string();
        let data = self
            .request(
                "user.gettoptracks",
                &[
                    ("user", username),
                    ("period", period.as_str()),
                    ("limit", &limit),
                ],
            )
            .await?;
        list_at(&data, "/toptracks/track")
    }

    pub async fn get_top_albums(
        &self,
        username: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<LastfmAlbum>, LastfmError> {
        let limit = limit.to_string();
        let data = self
            .request(
                "user.gettopalbums",
                &[
                    ("user", username),
                    ("period", period.as_str()),
                    ("limit", &limit),
                ],
            )
            .await?;
        list_at(&data, "/topalbums/album")
    }

    pub async fn get_recent_tracks(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<RecentTrack>, LastfmError> {
        let limit_param = limit.to_string();
        let data = self
            .request(
                "user.getrecenttracks",
                &[
                    ("user", username),
                    ("limit", &limit_param),
                    ("extended", "1"),
                ],
            )
            .await?;
        let mut tracks: Vec<RecentTrack> = list_at(&data, "/recenttracks/track")?;
        // a now-playing row rides along as an extra element beyond the limit
        tracks.truncate(limit as usize);
        Ok(tracks)
    }

    pub async fn get_user_top_tags(&self, username: &str) -> Result<Vec<LastfmTag>, LastfmError> {
        let data = self.request("user.gettoptags", &[("user", username)]).await?;
        list_at(&data, "/toptags/tag")
    }

    /// Top tags for an artist, capped at five
    pub async fn get_artist_top_tags(&self, artist: &str) -> Result<Vec<LastfmTag>, LastfmError> {
        let data = self
            .request("artist.gettoptags", &[("artist", artist)])
            .await?;
        let mut tags: Vec<LastfmTag> = list_at(&data, "/toptags/tag")?;
        tags.truncate(ARTIST_TAG_LIMIT);
        Ok(tags)
    }

    pub async fn get_similar_artists(
        &self,
        artist: &str,
        limit: u32,
    ) -> Result<Vec<SimilarArtist>, LastfmError> {
        let limit = limit.to_string();
        let data = self
            .request("artist.getsimilar", &[("artist", artist), ("limit", &limit)])
            .await?;
        let raw: Vec<RawSimilarArtist> = list_at(&data, "/similarartists/artist")?;

        Ok(raw
            .into_iter()
            .map(|a| SimilarArtist {
                match_pct: a.match_score.parse::<f64>().unwrap_or(0.0) * 100.0,
                image: crate::models::pick_image(&a.image, "extralarge"),
                name: a.name,
            })
            .collect())
    }

    /// Generate the API signature over all request parameters
    ///
    /// Keys sorted lexicographically, concatenated as key+value with no
    /// separators, secret appended, MD5, lowercase hex. Must stay bit-exact
    /// with what ws.audioscrobbler.com computes.
    fn generate_signature(&self, params: &BTreeMap<&str, String>) -> String {
        let mut sig_string = String::new();

        for (key, value) in params {
            sig_string.push_str(key);
            sig_string.push_str(value);
        }
        sig_string.push_str(&self.api_secret);

        let mut hasher = Md5::new();
        hasher.update(sig_string.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Exchange a one-time web-auth token for a session `(username, key)`
    pub async fn get_session(&self, token: &str) -> Result<(String, String), LastfmError> {
        let mut params = BTreeMap::new();
        params.insert("method", "auth.getSession".to_string());
        params.insert("api_key", self.api_key.clone());
        params.insert("token", token.to_string());

        let sig = self.generate_signature(&params);
        params.insert("api_sig", sig);
        params.insert("format", "json".to_string());

        let resp = self
            .client
            .post(self.base_url.clone())
            .form(&params)
            .send()
            .await?;

        let json: serde_json::Value = resp.json().await?;
        check_api_error(&json)?;

        let parsed: SessionResponse = serde_json::from_value(json)?;
        match parsed.session {
            Some(session) => Ok((session.name, session.key)),
            None => Err(LastfmError::MissingSession),
        }
    }
}

/// Reject `{error, message}` payloads that arrive with a 200 status
fn check_api_error(json: &serde_json::Value) -> Result<(), LastfmError> {
    if let Some(code) = json.get("error").and_then(|e| e.as_i64()) {
        let message = json
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(LastfmError::Api { code, message });
    }
    Ok(())
}

/// Deserialize a list at a JSON pointer, treating an absent node as empty
fn list_at<T: DeserializeOwned>(
    data: &serde_json::Value,
    pointer: &str,
) -> Result<Vec<T>, LastfmError> {
    match data.pointer(pointer) {
        Some(node) => Ok(serde_json::from_value(node.clone())?),
        None => Ok(Vec::new()),
    }
}

/// Test stub serving canned API responses on a local port
#[cfg(test)]
pub(crate) mod stub {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Canned response, matched by substrings of the request line
    pub(crate) struct Route {
        needles: Vec<String>,
        status: u16,
        body: String,
    }

    pub(crate) fn route(needles: &[&str], status: u16, body: serde_json::Value) -> Route {
        Route {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            status,
            body: body.to_string(),
        }
    }

    /// Bind a listener and answer each request with the first matching
    /// route. Returns the base url to point a client at. Routes are
    /// checked in order, so put the more specific ones first.
    pub(crate) async fn serve(routes: Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 2048];
                    loop {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                buf.extend_from_slice(&chunk[..n]);
                                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }

                    let request = String::from_utf8_lossy(&buf);
                    let line = request.lines().next().unwrap_or("");

                    let (status, body) = routes
                        .iter()
                        .find(|r| r.needles.iter().all(|n| line.contains(n.as_str())))
                        .map(|r| (r.status, r.body.clone()))
                        .unwrap_or((404, "{}".to_string()));

                    let reason = if status < 400 { "OK" } else { "Error" };
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic() {
        let client = LastfmClient::new("K".to_string(), "S".to_string());

        let mut params = BTreeMap::new();
        params.insert("method", "auth.getSession".to_string());
        params.insert("api_key", "K".to_string());
        params.insert("token", "T".to_string());

        // md5("api_keyKmethodauth.getSessiontokenTS")
        let sig = client.generate_signature(&params);
        assert_eq!(sig, "a9b7c596842f7f7bf14e3f42ba211de8");
        assert_eq!(sig, client.generate_signature(&params));
    }

    #[test]
    fn test_signature_sorts_keys() {
        let client = LastfmClient::new("K".to_string(), "S".to_string());

        // insertion order must not matter
        let mut params = BTreeMap::new();
        params.insert("token", "T".to_string());
        params.insert("method", "auth.getSession".to_string());
        params.insert("api_key", "K".to_string());

        assert_eq!(
            client.generate_signature(&params),
            "a9b7c596842f7f7bf14e3f42ba211de8"
        );
    }

    #[test]
    fn test_auth_url_carries_key_and_callback() {
        let client = LastfmClient::new("mykey".to_string(), "s".to_string());
        let url = client.auth_url("http://localhost:5173/callback");

        assert!(url.starts_with("https://www.last.fm/api/auth/?"));
        assert!(url.contains("api_key=mykey"));
        assert!(url.contains("cb=http%3A%2F%2Flocalhost%3A5173%2Fcallback"));
    }

    #[test]
    fn test_check_api_error() {
        let ok = serde_json::json!({"user": {"name": "alice"}});
        assert!(check_api_error(&ok).is_ok());

        let err = serde_json::json!({"error": 4, "message": "Invalid authentication token"});
        match check_api_error(&err) {
            Err(LastfmError::Api { code, message }) => {
                assert_eq!(code, 4);
                assert_eq!(message, "Invalid authentication token");
            }
            other => panic!("expected api error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_list_at_missing_node_is_empty() {
        let data = serde_json::json!({"topartists": {}});
        let artists: Vec<crate::models::LastfmArtist> =
            list_at(&data, "/topartists/artist").unwrap();
        assert!(artists.is_empty());
    }

    #[tokio::test]
    async fn test_recent_tracks_capped_at_limit() {
        // with a track playing the api returns limit+1 rows: the
        // now-playing row rides on top of the requested page
        let mut rows = vec![serde_json::json!({
            "name": "live one",
            "artist": {"name": "X"},
            "@attr": {"nowplaying": "true"}
        })];
        for i in 0..5 {
            rows.push(serde_json::json!({
                "name": format!("t{}", i),
                "artist": {"name": "X"},
                "date": {"uts": "1700000000", "#text": ""}
            }));
        }

        let base = stub::serve(vec![stub::route(
            &["method=user.getrecenttracks"],
            200,
            serde_json::json!({"recenttracks": {"track": rows}}),
        )])
        .await;

        let client = LastfmClient::new("K".to_string(), "S".to_string())
            .with_base_url(Url::parse(&base).unwrap());
        let tracks = client.get_recent_tracks("alice", 5).await.unwrap();

        assert_eq!(tracks.len(), 5);
        assert!(tracks[0].is_now_playing());
    }
}
