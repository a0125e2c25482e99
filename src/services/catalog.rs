use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use crate::models::Listing;

/// Errors that can occur when talking to the listing store or profile source
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only access to the external listing store
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get_listing(&self, listing_id: &str) -> Result<Listing, CatalogError>;

    async fn get_active_flag(&self, listing_id: &str) -> Result<bool, CatalogError> {
        Ok(self.get_listing(listing_id).await?.active)
    }
}

/// Read-only access to user profile text held by the identity system
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn get_profile_text(&self, user_id: &str) -> Result<String, CatalogError>;
}

/// Profile document fields that feed the profile text
#[derive(Debug, Default, Deserialize)]
struct ProfileDocument {
    #[serde(rename = "resumeText", default)]
    resume_text: Option<String>,
    #[serde(default)]
    major: Option<String>,
    #[serde(default)]
    skills: Option<String>,
    #[serde(default)]
    experience: Option<String>,
    #[serde(default)]
    projects: Option<String>,
    #[serde(default)]
    certifications: Option<String>,
    #[serde(rename = "researchInterests", default)]
    research_interests: Option<String>,
}

impl ProfileDocument {
    /// Resume text when present, otherwise the descriptive fields joined
    fn profile_text(self) -> String {
        if let Some(resume) = self.resume_text.as_deref().map(str::trim) {
            if !resume.is_empty() {
                return resume.to_string();
            }
        }

        [
            self.major,
            self.skills,
            self.experience,
            self.projects,
            self.certifications,
            self.research_interests,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// REST client for the listing catalog and user profiles
///
/// Handles:
/// - Fetching a listing by id (`GET /listings/{id}`)
/// - Fetching a user profile by id (`GET /users/{id}`)
pub struct CatalogClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            collection,
            urlencoding::encode(id)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("X-Api-Key", key),
            None => request,
        }
    }

    /// Fetch one document, unwrapping a `data` envelope if present
    async fn get_document(&self, collection: &str, id: &str) -> Result<Value, CatalogError> {
        let url = self.url(collection, id);

        tracing::debug!("Fetching {} from: {}", collection, url);

        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(format!("{} {}", collection, id)));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CatalogError::Unauthorized);
            }
            status if !status.is_success() => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Failed to fetch {} {}: {} - {}", collection, id, status, body);
                return Err(CatalogError::ApiError(format!(
                    "Failed to fetch {}: {}",
                    collection, status
                )));
            }
            _ => {}
        }

        let mut json: Value = response.json().await?;

        if json.get("data").is_some_and(Value::is_object) {
            return Ok(json["data"].take());
        }

        Ok(json)
    }
}

#[async_trait]
impl ListingStore for CatalogClient {
    async fn get_listing(&self, listing_id: &str) -> Result<Listing, CatalogError> {
        let doc = self.get_document("listings", listing_id).await?;

        serde_json::from_value(doc)
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to parse listing: {}", e)))
    }
}

#[async_trait]
impl ProfileSource for CatalogClient {
    async fn get_profile_text(&self, user_id: &str) -> Result<String, CatalogError> {
        let doc = self.get_document("users", user_id).await?;

        let profile: ProfileDocument = serde_json::from_value(doc)
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        Ok(profile.profile_text())
    }
}
