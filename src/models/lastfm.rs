//! Last.fm API response models
//!
//! Shapes mirror the ws.audioscrobbler.com JSON payloads. Numeric fields
//! frequently arrive as strings (and occasionally as numbers), so the
//! affected fields go through a permissive deserializer.

use serde::{Deserialize, Deserializer, Serialize};

/// One image variant (Last.fm serves several sizes per entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmImage {
    #[serde(default)]
    pub size: String,
    #[serde(rename = "#text", default)]
    pub url: String,
}

/// Pick an image variant by size, falling back to the last entry
pub fn pick_image(images: &[LastfmImage], size: &str) -> String {
    images
        .iter()
        .find(|i| i.size == size)
        .or_else(|| images.last())
        .map(|i| i.url.clone())
        .unwrap_or_default()
}

/// Last.fm user profile (`user.getinfo`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmUser {
    pub name: String,
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub image: Vec<LastfmImage>,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: String,
    #[serde(default)]
    pub registered: Option<Registered>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub url: String,
}

impl LastfmUser {
    /// Real name when set, username otherwise
    pub fn display_name(&self) -> &str {
        if self.realname.is_empty() {
            &self.name
        } else {
            &self.realname
        }
    }

    pub fn avatar_url(&self) -> String {
        pick_image(&self.image, "extralarge")
    }

    pub fn playcount(&self) -> i64 {
        self.playcount.parse().unwrap_or(0)
    }

    /// Registration date as unix seconds
    pub fn registered_unixtime(&self) -> Option<i64> {
        self.registered
            .as_ref()
            .and_then(|r| r.unixtime.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registered {
    #[serde(default, deserialize_with = "stringly")]
    pub unixtime: String,
}

/// Top artist entry (`user.gettopartists`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmArtist {
    pub name: String,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<LastfmImage>,
    #[serde(default)]
    pub mbid: Option<String>,
}

impl LastfmArtist {
    pub fn playcount(&self) -> i64 {
        self.playcount.parse().unwrap_or(0)
    }
}

/// Artist reference carried by tracks and albums
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Top track entry (`user.gettoptracks`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmTrack {
    pub name: String,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: String,
    #[serde(default)]
    pub url: String,
    pub artist: ArtistRef,
    #[serde(default)]
    pub image: Vec<LastfmImage>,
    #[serde(default, deserialize_with = "stringly_opt")]
    pub duration: Option<String>,
}

/// Top album entry (`user.gettopalbums`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmAlbum {
    pub name: String,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: String,
    #[serde(default)]
    pub url: String,
    pub artist: ArtistRef,
    #[serde(default)]
    pub image: Vec<LastfmImage>,
}

/// Tag entry (`user.gettoptags` / `artist.gettoptags`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmTag {
    pub name: String,
    #[serde(default, deserialize_with = "count")]
    pub count: i64,
    #[serde(default)]
    pub url: String,
}

/// Artist field of a recent track: `{name}` with extended=1,
/// `{"#text"}` without
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentArtist {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "#text", default)]
    pub text: String,
}

impl RecentArtist {
    pub fn display(&self) -> &str {
        if self.name.is_empty() {
            &self.text
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(rename = "#text", default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrobbleDate {
    #[serde(default, deserialize_with = "stringly")]
    pub uts: String,
    #[serde(rename = "#text", default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlayingAttr {
    #[serde(default)]
    pub nowplaying: String,
}

/// Recent scrobble entry (`user.getrecenttracks`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrack {
    pub name: String,
    pub artist: RecentArtist,
    #[serde(default)]
    pub album: Option<TextValue>,
    #[serde(default)]
    pub image: Vec<LastfmImage>,
    #[serde(default)]
    pub date: Option<ScrobbleDate>,
    #[serde(rename = "@attr", default)]
    pub attr: Option<NowPlayingAttr>,
    #[serde(default)]
    pub url: String,
}

impl RecentTrack {
    pub fn is_now_playing(&self) -> bool {
        self.attr
            .as_ref()
            .map(|a| a.nowplaying == "true")
            .unwrap_or(false)
    }
}

/// Similar artist (`artist.getsimilar`), match rescaled to 0..100
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarArtist {
    pub name: String,
    #[serde(rename = "match")]
    pub match_pct: f64,
    #[serde(default)]
    pub image: String,
}

// deserialize helpers

/// Accept a JSON string or number as a String
fn stringly<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(stringly_value(&value))
}

fn stringly_opt<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.map(|v| stringly_value(&v)))
}

/// Accept a JSON string or number as an i64
fn count<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0),
        serde_json::Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    })
}

fn stringly_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_image_prefers_requested_size() {
        let images = vec![
            LastfmImage {
                size: "small".to_string(),
                url: "s.png".to_string(),
            },
            LastfmImage {
                size: "extralarge".to_string(),
                url: "xl.png".to_string(),
            },
        ];
        assert_eq!(pick_image(&images, "extralarge"), "xl.png");
        // unknown size falls back to the last variant
        assert_eq!(pick_image(&images, "mega"), "xl.png");
        assert_eq!(pick_image(&[], "extralarge"), "");
    }

    #[test]
    fn test_artist_playcount_parses_string() {
        let artist: LastfmArtist = serde_json::from_str(
            r#"{"name": "X", "playcount": "100", "url": "", "image": []}"#,
        )
        .unwrap();
        assert_eq!(artist.playcount(), 100);
    }

    #[test]
    fn test_artist_playcount_accepts_number() {
        let artist: LastfmArtist =
            serde_json::from_str(r#"{"name": "X", "playcount": 42}"#).unwrap();
        assert_eq!(artist.playcount(), 42);
    }

    #[test]
    fn test_tag_count_accepts_both_shapes() {
        let tag: LastfmTag = serde_json::from_str(r#"{"name": "rock", "count": 95}"#).unwrap();
        assert_eq!(tag.count, 95);
        let tag: LastfmTag = serde_json::from_str(r#"{"name": "rock", "count": "95"}"#).unwrap();
        assert_eq!(tag.count, 95);
    }

    #[test]
    fn test_recent_artist_both_shapes() {
        let extended: RecentArtist = serde_json::from_str(r#"{"name": "Nico"}"#).unwrap();
        assert_eq!(extended.display(), "Nico");
        let compact: RecentArtist = serde_json::from_str(r##"{"#text": "Nico"}"##).unwrap();
        assert_eq!(compact.display(), "Nico");
    }

    #[test]
    fn test_user_display_name_falls_back_to_username() {
        let user: LastfmUser = serde_json::from_str(
            r#"{"name": "alice", "realname": "", "playcount": "12", "url": ""}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "alice");
        assert_eq!(user.playcount(), 12);
    }

    #[test]
    fn test_now_playing_attr() {
        let track: RecentTrack = serde_json::from_str(
            r#"{"name": "t", "artist": {"name": "a"}, "@attr": {"nowplaying": "true"}}"#,
        )
        .unwrap();
        assert!(track.is_now_playing());
    }
}
