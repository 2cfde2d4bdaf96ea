// ── InfluxDB 1.x writer ──
//
// Points are encoded as line protocol and posted to `/write` with second
// precision. One `Batch` maps to exactly one HTTP request.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use unistat_api::TransportConfig;

use crate::error::CoreError;

// ── Points ───────────────────────────────────────────────────────────

/// A line-protocol field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}i"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => {
                f.write_char('"')?;
                for c in v.chars() {
                    if c == '"' || c == '\\' {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('"')
            }
        }
    }
}

/// One time-series point, timestamped in Unix seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: i64,
}

impl Point {
    pub fn new(measurement: impl Into<String>, timestamp: i64) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Encode as a single line of line protocol (no trailing newline).
    ///
    /// Tags are sorted by key; tags with empty values are omitted since
    /// InfluxDB rejects them.
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        escape_into(&mut line, &self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        let mut sep = ' ';
        for (key, value) in &self.fields {
            line.push(sep);
            sep = ',';
            escape_into(&mut line, key, &[',', '=', ' ']);
            let _ = write!(line, "={value}");
        }

        let _ = write!(line, " {}", self.timestamp);
        line
    }
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Points gathered in one sync cycle, written with a single request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    points: Vec<Point>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Newline-separated line protocol for the whole batch.
    pub fn to_line_protocol(&self) -> String {
        let mut body = String::new();
        for point in &self.points {
            body.push_str(&point.to_line());
            body.push('\n');
        }
        body
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Connection settings for an InfluxDB 1.x server.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: Url,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub timeout: Duration,
}

/// Minimal InfluxDB 1.x HTTP client: `/ping` and `/write`.
pub struct InfluxClient {
    http: reqwest::Client,
    base_url: Url,
    database: String,
    username: Option<String>,
    password: Option<SecretString>,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Result<Self, CoreError> {
        let http = TransportConfig::default()
            .with_timeout(config.timeout)
            .build_client()
            .map_err(|e| CoreError::BackendWrite {
                message: e.to_string(),
                status: None,
            })?;
        Ok(Self {
            http,
            base_url: config.url,
            database: config.database,
            username: config.username,
            password: config.password,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => builder.basic_auth(
                user,
                self.password.as_ref().map(|p| p.expose_secret().to_owned()),
            ),
            None => builder,
        }
    }

    /// Check that the server is reachable. `GET /ping`, any 2xx is healthy.
    pub async fn ping(&self) -> Result<(), CoreError> {
        let url = self.endpoint("ping")?;
        debug!("GET {}", url);

        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| CoreError::BackendWrite {
                message: format!("contacting InfluxDB: {e}"),
                status: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::BackendWrite {
                message: format!("ping returned HTTP {status}"),
                status: Some(status.as_u16()),
            });
        }
        Ok(())
    }

    /// Write a batch with one `POST /write?db=..&precision=s` request.
    pub async fn write(&self, batch: &Batch) -> Result<(), CoreError> {
        let mut url = self.endpoint("write")?;
        url.query_pairs_mut()
            .append_pair("db", &self.database)
            .append_pair("precision", "s");
        debug!(points = batch.len(), "POST {}", url);

        let resp = self
            .apply_auth(self.http.post(url))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(batch.to_line_protocol())
            .send()
            .await
            .map_err(|e| CoreError::BackendWrite {
                message: format!("contacting InfluxDB: {e}"),
                status: None,
            })?;

        let status = resp.status();
        // 204 on success; some proxies in front of InfluxDB rewrite it to 200.
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let preview: String = body.chars().take(200).collect();
        Err(CoreError::BackendWrite {
            message: format!("HTTP {status}: {preview}"),
            status: Some(status.as_u16()),
        })
    }
}
