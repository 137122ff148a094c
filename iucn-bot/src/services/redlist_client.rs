//! IUCN Red List API (v3) client
//!
//! Looks up the global assessment of a species, either by Red List taxon id
//! (`/species/id/{id}`) or by name (`/species/{name}`), and turns the first
//! result into an [`AssessmentRecord`] for validation by the core.

use iucn_common::{AssessmentRecord, LookupKey};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

pub const REDLIST_BASE_URL: &str = "https://apiv3.iucnredlist.org/api/v3";
const USER_AGENT: &str = concat!("IUCNBot/", env!("CARGO_PKG_VERSION"));
pub const RATE_LIMIT_MS: u64 = 500;

/// Red List client errors
#[derive(Debug, Error)]
pub enum RedListError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Not assessed")]
    NotAssessed,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Body of a `/species` response
///
/// The API answers errors (bad token, unknown route) with HTTP 200 and a
/// `message` instead of `result`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesResponse {
    pub result: Option<Vec<SpeciesResult>>,
    pub message: Option<String>,
}

/// One assessment in a `/species` response
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesResult {
    pub taxonid: i64,
    pub scientific_name: Option<String>,
    pub category: String,
    pub published_year: Option<i32>,
    pub assessment_date: Option<String>,
}

impl SpeciesResponse {
    /// First result as a record for the core to validate
    ///
    /// The published year wins over the assessment date; it is written as
    /// the first of January so it parses with the assessment date format.
    pub fn into_record(self) -> Result<AssessmentRecord, RedListError> {
        let results = match (self.result, self.message) {
            (Some(results), _) => results,
            (None, Some(message)) => return Err(RedListError::ApiError(200, message)),
            (None, None) => {
                return Err(RedListError::ParseError("Missing \"result\" key".to_string()))
            }
        };

        let first = results.into_iter().next().ok_or(RedListError::NotAssessed)?;

        let assessment_date_text = match first.published_year {
            Some(year) => Some(format!("{:04}-01-01", year)),
            None => first.assessment_date,
        };

        Ok(AssessmentRecord {
            subject_id: first.taxonid,
            category_text: first.category,
            assessment_date_text,
        })
    }
}

/// Rate limiter spacing requests at least `min_interval` apart
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Red List API client
pub struct RedListClient {
    http_client: reqwest::Client,
    base_url: Url,
    token: String,
    rate_limiter: Arc<RateLimiter>,
}

impl RedListClient {
    pub fn new(base_url: &str, token: &str, min_interval_ms: u64) -> Result<Self, RedListError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RedListError::NetworkError(e.to_string()))?;

        let base_url = Url::parse(base_url).map_err(|e| RedListError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            token: token.to_string(),
            rate_limiter: Arc::new(RateLimiter::new(min_interval_ms)),
        })
    }

    /// Request URL for `key`, token included
    pub fn species_url(&self, key: &LookupKey) -> Result<Url, RedListError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RedListError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("species");
            match key {
                LookupKey::RedListId(id) => {
                    segments.push("id").push(&id.to_string());
                }
                LookupKey::Name(name) => {
                    segments.push(name);
                }
            }
        }
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }

    /// Fetch the assessment for `key`
    ///
    /// An empty result set is [`RedListError::NotAssessed`].
    pub async fn lookup(&self, key: &LookupKey) -> Result<AssessmentRecord, RedListError> {
        self.rate_limiter.wait().await;

        let url = self.species_url(key)?;
        tracing::debug!(key = ?key, "Querying Red List API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| RedListError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(RedListError::NotAssessed);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RedListError::ApiError(status.as_u16(), error_text));
        }

        let body: SpeciesResponse = response
            .json()
            .await
            .map_err(|e| RedListError::ParseError(e.to_string()))?;

        let record = body.into_record()?;

        tracing::info!(
            key = ?key,
            taxon_id = record.subject_id,
            category = %record.category_text,
            "Retrieved assessment from Red List"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> SpeciesResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(1000);
        assert_eq!(limiter.min_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_client_creation() {
        assert!(RedListClient::new(REDLIST_BASE_URL, "token", RATE_LIMIT_MS).is_ok());
        assert!(matches!(
            RedListClient::new("geen url", "token", RATE_LIMIT_MS),
            Err(RedListError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_species_urls() {
        let client = RedListClient::new(REDLIST_BASE_URL, "abc", RATE_LIMIT_MS).unwrap();

        assert_eq!(
            client.species_url(&LookupKey::RedListId(22690)).unwrap().as_str(),
            "https://apiv3.iucnredlist.org/api/v3/species/id/22690?token=abc"
        );
        assert_eq!(
            client
                .species_url(&LookupKey::Name("Raphus cucullatus".to_string()))
                .unwrap()
                .as_str(),
            "https://apiv3.iucnredlist.org/api/v3/species/Raphus%20cucullatus?token=abc"
        );
    }

    #[test]
    fn test_published_year_becomes_date() {
        let record = response(json!({
            "name": "Raphus cucullatus",
            "result": [{
                "taxonid": 22690059,
                "scientific_name": "Raphus cucullatus",
                "category": "EX",
                "published_year": 2016,
                "assessment_date": "2016-10-01"
            }]
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.subject_id, 22690059);
        assert_eq!(record.category_text, "EX");
        assert_eq!(record.assessment_date_text.as_deref(), Some("2016-01-01"));
    }

    #[test]
    fn test_assessment_date_fallback() {
        let record = response(json!({
            "result": [{"taxonid": 1, "category": "LR/lc", "assessment_date": "1996-08-01"}]
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.category_text, "LR/lc");
        assert_eq!(record.assessment_date_text.as_deref(), Some("1996-08-01"));

        let record = response(json!({"result": [{"taxonid": 1, "category": "VU"}]}))
            .into_record()
            .unwrap();
        assert_eq!(record.assessment_date_text, None);
    }

    #[test]
    fn test_empty_result_is_not_assessed() {
        let err = response(json!({"name": "Draak", "result": []}))
            .into_record()
            .unwrap_err();
        assert!(matches!(err, RedListError::NotAssessed));
        assert_eq!(err.to_string(), "Not assessed");
    }

    #[test]
    fn test_message_without_result() {
        let err = response(json!({"message": "Token not valid!"}))
            .into_record()
            .unwrap_err();
        assert!(matches!(err, RedListError::ApiError(200, ref m) if m == "Token not valid!"));

        let err = response(json!({})).into_record().unwrap_err();
        assert!(matches!(err, RedListError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_rate_limiter_timing() {
        let limiter = RateLimiter::new(200);

        let start = Instant::now();
        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(100));
        assert!(second_elapsed >= Duration::from_millis(180));
    }
}
