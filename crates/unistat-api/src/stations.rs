// Station endpoints
//
// Connected clients via stat/sta.

use reqwest::StatusCode;
use tracing::debug;

use crate::client::SessionClient;
use crate::error::Error;
use crate::models::{Station, StationList};

impl SessionClient {
    /// List all currently connected stations.
    ///
    /// `GET /api/s/default/stat/sta`. Relies on the session cookie from a
    /// prior [`authenticate`](Self::authenticate); use
    /// [`authenticated_stations`](Self::authenticated_stations) to do both.
    pub async fn stations(&self) -> Result<Vec<Station>, Error> {
        let url = self.site_url("stat/sta")?;
        debug!("GET {}", url);

        let resp = self.http().get(url.clone()).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        let list: StationList = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        debug!(count = list.data.len(), "fetched stations");
        Ok(list.data)
    }

    /// Log in, then list stations.
    ///
    /// The session is re-established on every call rather than tracking
    /// token expiry, so a fetch never runs without a login in the same
    /// cycle.
    pub async fn authenticated_stations(&self) -> Result<Vec<Station>, Error> {
        self.authenticate().await?;
        self.stations().await
    }
}
