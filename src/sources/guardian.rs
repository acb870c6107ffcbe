//! Extraction from the Guardian open platform: list the active sections,
//! then fetch one day's articles per section.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::errors::FetchError;

pub const API_URL: &str = "https://content.guardianapis.com";

const SHOW_FIELDS: &str = "headline,body,byline";
const SHOW_TAGS: &str = "keywords";

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    response: SectionsBody,
}

#[derive(Debug, Deserialize)]
struct SectionsBody {
    results: Vec<Section>,
}

/// One active section, addressed by its own content endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub api_url: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    response: ContentBody,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    results: Vec<RawArticle>,
}

/// An article as the provider returns it. Everything is optional at this
/// point; the transformer decides what is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub id: Option<String>,
    pub section_name: Option<String>,
    pub web_url: Option<String>,
    pub fields: Option<RawFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFields {
    pub headline: Option<String>,
    pub body: Option<String>,
    pub byline: Option<String>,
}

pub struct GuardianClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
}

impl GuardianClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Secret<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// List the content endpoint of every active section.
    #[tracing::instrument(skip(self))]
    pub async fn sections(&self) -> Result<Vec<Section>, FetchError> {
        let url = format!("{}/sections", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key.expose_secret().as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::StatusCode(response.status().as_u16()));
        }

        let sections: SectionsResponse = response.json().await?;
        let results = sections.response.results;
        tracing::info!("Fetched {} active sections", results.len());
        Ok(results)
    }

    /// Fetch a section's articles for a single day. An empty section is not
    /// an error.
    #[tracing::instrument(skip(self, section), fields(section = %section.api_url))]
    pub async fn content(
        &self,
        section: &Section,
        date: NaiveDate,
    ) -> Result<Vec<RawArticle>, FetchError> {
        let day = date.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&section.api_url)
            .query(&[
                ("api-key", self.api_key.expose_secret().as_str()),
                ("from-date", day.as_str()),
                ("to-date", day.as_str()),
                ("show-fields", SHOW_FIELDS),
                ("show-tags", SHOW_TAGS),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::StatusCode(response.status().as_u16()));
        }

        let content: ContentResponse = response.json().await?;
        let results = content.response.results;
        tracing::info!(
            "{} articles retrieved from {}",
            results.len(),
            section.api_url
        );
        Ok(results)
    }

    /// The whole extraction stage: every active section's articles for the
    /// given day, flattened in section order. Sections are fetched one at a
    /// time, there is no pagination.
    #[tracing::instrument(skip(self))]
    pub async fn extract(&self, date: NaiveDate) -> Result<Vec<RawArticle>, FetchError> {
        let mut results = Vec::new();
        for section in self.sections().await? {
            results.extend(self.content(&section, date).await?);
        }
        Ok(results)
    }
}
