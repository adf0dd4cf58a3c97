//! Share tokens.
//!
//! A token carries the eight panel scenes only, as
//! `{"panels":{"one":<scene or null>,...}}` compressed with LZ-string's
//! URI-component encoding. Thumbnails and metadata are left out to keep
//! links short; a receiver re-renders every panel from its scene.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zine::{PanelSet, Zine};

pub const SHARE_PATH: &str = "/share";
pub const SHARE_PARAM: &str = "data";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Share token is empty")]
    Empty,

    #[error("Share token is not valid compressed data")]
    Decompress,

    #[error("Share token does not contain text")]
    Text(#[from] std::string::FromUtf16Error),

    #[error("Share token has the wrong shape: {0}")]
    Schema(#[from] serde_json::Error),
}

pub type ShareResult<T> = Result<T, ShareError>;

/// Scenes carried by a share token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedZine {
    pub panels: PanelSet<Option<String>>,
}

impl SharedZine {
    pub fn from_zine(zine: &Zine) -> Self {
        Self {
            panels: zine.scenes(),
        }
    }

    /// Read-only zine for previewing or printing a share.
    pub fn into_zine(self) -> Zine {
        let mut zine = Zine::new_empty();
        for (position, scene) in self.panels.iter() {
            zine.panel_mut(position).canvas_json = scene.clone();
        }
        zine
    }
}

pub fn encode(zine: &Zine) -> ShareResult<String> {
    let json = serde_json::to_string(&SharedZine::from_zine(zine))?;
    let token = lz_str::compress_to_encoded_uri_component(json.as_str());
    debug!("Encoded share token: {} bytes of JSON into {}", json.len(), token.len());
    Ok(token)
}

/// Reverse [`encode`]. Every failure is reported, never panicked on.
pub fn decode(token: &str) -> ShareResult<SharedZine> {
    if token.trim().is_empty() {
        return Err(ShareError::Empty);
    }
    // Query parsers turn '+' into a space
    let token = token.replace(' ', "+");
    let words = lz_str::decompress_from_encoded_uri_component(token.as_str()).ok_or(ShareError::Decompress)?;
    if words.is_empty() {
        return Err(ShareError::Decompress);
    }
    let json = String::from_utf16(&words)?;
    let shared: SharedZine = serde_json::from_str(&json).inspect_err(|err| warn!("Rejected share token: {err}"))?;
    Ok(shared)
}

/// `<base>/share?data=<token>`
pub fn share_url(base: &str, zine: &Zine) -> ShareResult<String> {
    let token = encode(zine)?;
    Ok(format!(
        "{}{SHARE_PATH}?{SHARE_PARAM}={token}",
        base.trim_end_matches('/')
    ))
}

/// Pull the token out of a share link's query string.
pub fn token_from_url(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(SHARE_PARAM)?.strip_prefix('='))
}
