//! Transient request data that survives exactly one redirect.
//!
//! Stored in a cookie as base64 JSON; reading it removes the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub const TEMP_DATA_COOKIE: &str = "portal_temp_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempData {
    pub status_code: u16,
    pub error_message: String,
    pub request_id: Option<String>,
}

impl TempData {
    fn encode(&self) -> AppResult<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Cookie carrying this data to the next request
    pub fn into_cookie(self) -> AppResult<Cookie<'static>> {
        Ok(Cookie::build((TEMP_DATA_COOKIE, self.encode()?))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build())
    }

    /// Read and clear. A corrupt cookie is dropped and reads as absent.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Self>) {
        let Some(cookie) = jar.get(TEMP_DATA_COOKIE) else {
            return (jar, None);
        };

        let data = Self::decode(cookie.value());
        if data.is_none() {
            tracing::warn!("Discarding unreadable transient data cookie");
        }

        let jar = jar.remove(Cookie::build(TEMP_DATA_COOKIE).path("/"));
        (jar, data)
    }
}
