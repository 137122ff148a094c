//! MediaWiki Action API client
//!
//! Bot login, category member traversal, page fetch and page save against
//! a single `api.php` endpoint. Session cookies are kept by the HTTP client.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const NLWIKI_ENDPOINT: &str = "https://nl.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("IUCNBot/", env!("CARGO_PKG_VERSION"), " (nlwiki)");

/// Edit summary used for every save
pub const EDIT_SUMMARY: &str = "Bijwerken/toevoegen status van de Rode Lijst van de IUCN";

/// Members requested per category query
pub const CATEGORY_BATCH_SIZE: u32 = 500;

/// MediaWiki client errors
#[derive(Debug, Error)]
pub enum MediaWikiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {code}: {info}")]
    ApiError { code: String, info: String },

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Invalid page content")]
    InvalidContent,

    #[error("Tried to save empty page")]
    EmptyPage,

    #[error("Failed to save revision: {0}")]
    SaveFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Continuation parameters returned by a query, passed back verbatim
pub type Continuation = BTreeMap<String, String>;

/// One page of category members
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBatch {
    pub titles: Vec<String>,
    /// `None` once the category is exhausted
    pub next: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct CategoryMembersResponse {
    query: Option<CategoryMembersQuery>,
    #[serde(rename = "continue")]
    continuation: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct CategoryMembersQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    pageid: Option<u64>,
    title: String,
}

#[derive(Debug, Deserialize)]
struct RevisionsResponse {
    query: Option<RevisionsQuery>,
}

#[derive(Debug, Deserialize)]
struct RevisionsQuery {
    #[serde(default)]
    pages: Vec<RevisionsPage>,
}

#[derive(Debug, Deserialize)]
struct RevisionsPage {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: RevisionSlots,
}

#[derive(Debug, Deserialize)]
struct RevisionSlots {
    main: MainSlot,
}

#[derive(Debug, Deserialize)]
struct MainSlot {
    content: Option<String>,
}

/// `{"error": {...}}` body as a typed error
fn api_error(body: &Value) -> Option<MediaWikiError> {
    let error = body.get("error")?;
    let parsed: ApiErrorBody = serde_json::from_value(error.clone()).ok()?;
    Some(MediaWikiError::ApiError {
        code: parsed.code,
        info: parsed.info,
    })
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, MediaWikiError> {
    if let Some(err) = api_error(&body) {
        return Err(err);
    }
    serde_json::from_value(body).map_err(|e| MediaWikiError::ParseError(e.to_string()))
}

/// Members of a `list=categorymembers` response
///
/// Entries without a page id are dropped. A response without `query`
/// ends the traversal.
pub fn parse_category_batch(body: Value) -> Result<CategoryBatch, MediaWikiError> {
    let response: CategoryMembersResponse = decode(body)?;

    let Some(query) = response.query else {
        return Ok(CategoryBatch::default());
    };

    let titles = query
        .categorymembers
        .into_iter()
        .filter(|member| member.pageid.is_some())
        .map(|member| member.title)
        .collect();

    let next = response.continuation.map(|params| {
        params
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()
    });

    Ok(CategoryBatch { titles, next })
}

/// Wikitext of the latest revision in a `prop=revisions` response
pub fn parse_page_content(body: Value) -> Result<String, MediaWikiError> {
    let response: RevisionsResponse = decode(body)?;

    response
        .query
        .and_then(|query| query.pages.into_iter().next())
        .filter(|page| !page.missing)
        .and_then(|page| page.revisions.into_iter().next())
        .and_then(|revision| revision.slots.main.content)
        .ok_or(MediaWikiError::InvalidContent)
}

/// MediaWiki API client
pub struct MediaWikiClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl MediaWikiClient {
    pub fn new(endpoint: &str) -> Result<Self, MediaWikiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MediaWikiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
        })
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value, MediaWikiError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| MediaWikiError::NetworkError(e.to_string()))?;

        Self::json_body(response).await
    }

    async fn post(&self, params: &[(&str, &str)]) -> Result<Value, MediaWikiError> {
        let mut form: Vec<(&str, &str)> = vec![("format", "json"), ("formatversion", "2")];
        form.extend_from_slice(params);

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| MediaWikiError::NetworkError(e.to_string()))?;

        Self::json_body(response).await
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, MediaWikiError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediaWikiError::ApiError {
                code: status.as_u16().to_string(),
                info: error_text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| MediaWikiError::ParseError(e.to_string()))
    }

    async fn token(&self, kind: &str) -> Result<String, MediaWikiError> {
        let body = self
            .get(&[("action", "query"), ("meta", "tokens"), ("type", kind)])
            .await?;
        if let Some(err) = api_error(&body) {
            return Err(err);
        }

        let field = format!("{}token", kind);
        body.pointer(&format!("/query/tokens/{}", field))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MediaWikiError::ParseError(format!("Missing {}", field)))
    }

    /// Log in with a bot password
    pub async fn login(&self, user: &str, password: &str) -> Result<(), MediaWikiError> {
        let token = self.token("login").await?;

        let body = self
            .post(&[
                ("action", "login"),
                ("lgname", user),
                ("lgpassword", password),
                ("lgtoken", token.as_str()),
            ])
            .await?;
        if let Some(err) = api_error(&body) {
            return Err(err);
        }

        let result = body
            .pointer("/login/result")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        if result != "Success" {
            let reason = body
                .pointer("/login/reason")
                .and_then(Value::as_str)
                .unwrap_or(result);
            return Err(MediaWikiError::LoginFailed(reason.to_string()));
        }

        tracing::info!(user = %user, "Logged in to MediaWiki");
        Ok(())
    }

    /// One batch of main-namespace pages in `category`
    pub async fn category_batch(
        &self,
        category: &str,
        continuation: Option<&Continuation>,
    ) -> Result<CategoryBatch, MediaWikiError> {
        let limit = CATEGORY_BATCH_SIZE.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmtype", "page"),
            ("cmnamespace", "0"),
            ("cmlimit", limit.as_str()),
        ];
        if let Some(continuation) = continuation {
            params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let batch = parse_category_batch(self.get(&params).await?)?;
        tracing::debug!(
            category = %category,
            members = batch.titles.len(),
            more = batch.next.is_some(),
            "Fetched category batch"
        );
        Ok(batch)
    }

    /// Wikitext of the latest revision of `title`
    pub async fn fetch_page(&self, title: &str) -> Result<String, MediaWikiError> {
        let body = self
            .get(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("titles", title),
            ])
            .await?;

        parse_page_content(body)
    }

    /// Save `text` as a new minor bot revision of `title`
    pub async fn save_page(&self, title: &str, text: &str) -> Result<(), MediaWikiError> {
        if text.trim().is_empty() {
            return Err(MediaWikiError::EmptyPage);
        }

        let token = self.token("csrf").await?;
        let body = self
            .post(&[
                ("action", "edit"),
                ("title", title),
                ("text", text),
                ("summary", EDIT_SUMMARY),
                ("bot", "1"),
                ("minor", "1"),
                ("nocreate", "1"),
                ("token", token.as_str()),
            ])
            .await?;
        if let Some(err) = api_error(&body) {
            return Err(err);
        }

        match body.pointer("/edit/result").and_then(Value::as_str) {
            Some("Success") => {
                tracing::info!(title = %title, "Saved revision");
                Ok(())
            }
            other => Err(MediaWikiError::SaveFailed(
                other.unwrap_or("no result").to_string(),
            )),
        }
    }
}
