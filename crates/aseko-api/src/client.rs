// Async HTTP client for the Aseko cloud API.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <key>` header

use std::collections::BTreeSet;

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::aggregate::aggregate_units;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{AuthCheckResponse, Page, UnitDetailResponse, UnitListItem};
use crate::unit::UnitSnapshot;

/// Page size used when listing paired units.
pub const PAGE_LIMIT: u32 = 100;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Aseko REST API.
///
/// Stateless across calls: the API key is fixed at construction and
/// installed as a default header. No retries happen at this layer; the
/// coordinator's refresh cadence is the retry mechanism.
#[derive(Debug, Clone)]
pub struct AsekoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AsekoClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `"/auth/check"`) onto the base URL.
    fn url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    // ── Request layer ────────────────────────────────────────────────

    /// Perform one authenticated request and decode the JSON body.
    ///
    /// Use `serde_json::Value` as `T` for an untyped mapping.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] on 401/403
    /// - [`Error::NotFound`] on 404
    /// - [`Error::Api`] on any other non-2xx status
    /// - [`Error::Connection`] on transport failure
    /// - [`Error::Deserialization`] if a 2xx body is not the expected JSON
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!("{method} {url} params={params:?}");

        let mut builder = self.http.request(method, url);
        if !params.is_empty() {
            builder = builder.query(params);
        }

        let resp = builder.send().await?;
        Self::handle_response(endpoint, resp).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        self.request(Method::GET, endpoint, &[]).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(endpoint, status, resp).await)
        }
    }

    async fn parse_error(endpoint: &str, status: StatusCode, resp: reqwest::Response) -> Error {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Error::auth("Invalid or expired API key");
            }
            StatusCode::NOT_FOUND => {
                return Error::NotFound {
                    endpoint: endpoint.to_owned(),
                };
            }
            _ => {}
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message)
            .map_or_else(
                || format!("API request failed: {}", status.as_u16()),
                |m| format!("API request failed: {}: {m}", status.as_u16()),
            );

        Error::Api {
            message,
            status: Some(status.as_u16()),
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Auth ─────────────────────────────────────────────────────────

    /// Check whether the configured API key is accepted.
    ///
    /// A rejected key usually surfaces as [`Error::Authentication`]
    /// rather than `Ok(false)`.
    pub async fn validate_api_key(&self) -> Result<bool, Error> {
        let resp: AuthCheckResponse = self.get("/auth/check").await?;
        Ok(resp.valid)
    }

    // ── Units ────────────────────────────────────────────────────────

    /// Fetch one page of paired units (1-based page number).
    pub async fn list_units_page(&self, page: u32, limit: u32) -> Result<Page<UnitListItem>, Error> {
        self.request(
            Method::GET,
            "/paired-units",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// All paired unit serial numbers, deduplicated and sorted ascending.
    ///
    /// Walks pages of [`PAGE_LIMIT`] until a page is empty or the number
    /// of retrieved items reaches a positive `totalItems`. A missing or
    /// zero `totalItems` falls back on the empty-page condition.
    pub async fn get_unit_serials(&self) -> Result<Vec<String>, Error> {
        let mut serials = BTreeSet::new();
        let mut retrieved: u64 = 0;
        let mut page = 1;

        loop {
            let resp = self.list_units_page(page, PAGE_LIMIT).await?;
            if resp.items.is_empty() {
                break;
            }

            retrieved += u64::try_from(resp.items.len()).unwrap_or(u64::MAX);
            serials.extend(resp.items.into_iter().map(|item| item.serial_number));

            if resp.total_items.is_some_and(|total| total > 0 && retrieved >= total) {
                break;
            }
            page += 1;
        }

        debug!(count = serials.len(), pages = page, "listed paired units");
        Ok(serials.into_iter().collect())
    }

    /// Fetch and parse one unit's full status.
    pub async fn get_unit(&self, serial_number: &str) -> Result<UnitSnapshot, Error> {
        let resp: UnitDetailResponse = self.get(&format!("/paired-units/{serial_number}")).await?;
        UnitSnapshot::try_from(resp)
    }

    /// All currently retrievable units, in serial-number order.
    ///
    /// Detail requests are issued concurrently, one per serial. Per-unit
    /// failures are absorbed unless none succeed; an authentication
    /// failure on any unit fails the whole call.
    pub async fn get_units(&self) -> Result<Vec<UnitSnapshot>, Error> {
        let serials = self.get_unit_serials().await?;
        if serials.is_empty() {
            return Ok(Vec::new());
        }

        let results =
            futures_util::future::join_all(serials.iter().map(|sn| self.get_unit(sn))).await;

        aggregate_units(&serials, results)
    }
}
