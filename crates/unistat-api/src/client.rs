// Controller session client
//
// Wraps `reqwest::Client` with Unifi URL construction and the session
// cookie jar. Login and station listing live in their own files as
// inherent methods.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use crate::auth::{Credentials, SessionToken};
use crate::error::Error;
use crate::transport::TransportConfig;

/// The only site this client talks to.
const SITE: &str = "default";

/// HTTP client for the Unifi controller's session-authenticated API.
///
/// Cheap to share behind an `Arc`: the underlying `reqwest::Client` pools
/// connections and the cookie jar synchronizes internally. Concurrent
/// [`authenticate`](Self::authenticate) calls race on the jar; whichever
/// login lands last wins, and any valid session works for the next fetch.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    cookie_jar: Arc<Jar>,
}

impl SessionClient {
    /// Create a new session client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// (session auth requires cookies). The `base_url` is the controller
    /// root, e.g. `https://controller:8443`.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config
            .cookie_jar
            .clone()
            .unwrap_or_else(|| Arc::new(Jar::default()));
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            cookie_jar,
        })
    }

    /// Parse an operator-supplied controller address.
    ///
    /// Accepts a full URL or a bare `host[:port]`, which is assumed to be
    /// HTTPS.
    pub fn parse_address(address: &str) -> Result<Url, Error> {
        let address = address.trim();
        if address.contains("://") {
            Ok(Url::parse(address)?)
        } else {
            Ok(Url::parse(&format!("https://{address}"))?)
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The session token currently held in the cookie jar, if any.
    ///
    /// `None` before the first successful login.
    pub fn session_token(&self) -> Option<SessionToken> {
        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies
            .to_str()
            .ok()
            .map(|s| SessionToken::new(s.to_owned()))
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// `{base}/api/s/default/{path}`
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        self.api_url(&format!("s/{SITE}/{path}"))
    }
}
