// Session login
//
// The login endpoint sets a session cookie in the client's jar;
// subsequent requests carry that cookie automatically.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::client::SessionClient;
use crate::error::Error;

impl SessionClient {
    /// Authenticate with the controller using the configured credentials.
    ///
    /// `POST /api/login`. Only HTTP 200 counts as success; any other status
    /// or a transport failure is reported as [`Error::Authentication`].
    /// On success the jar holds whatever cookie the controller set.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let url = self.api_url("login")?;

        debug!("logging in at {}", url);

        let creds = self.credentials();
        let body = json!({
            "username": creds.username,
            "password": creds.password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("contacting controller: {e}"),
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status})"),
            });
        }

        debug!("login successful");
        Ok(())
    }
}
