//! Flickr REST API client
//!
//! Implements `PhotoSource` on top of `flickr.photos.search` and
//! `flickr.photos.getInfo` (JSON format). Responses are flattened into the
//! attribute model used by metadata extraction:
//! - scalar members become attributes
//! - object members become named children with their own scalar attributes
//! - `tags.tag[]` becomes the tag list

use crate::error::{CrawlError, Result};
use crate::types::{DetailChild, PhotoDescriptor, PhotoDetail, PhotoSource, SearchPage};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

const FLICKR_REST_URL: &str = "https://api.flickr.com/services/rest/";
const USER_AGENT: &str = concat!("palette-crawler/", env!("CARGO_PKG_VERSION"));

/// Search parameters shared by every page request
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Comma-separated license ids (4 = CC attribution, 7 = no known copyright)
    pub licenses: String,
    pub sort: String,
    pub per_page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            licenses: "4,7".to_string(),
            sort: "interestingness-desc".to_string(),
            per_page: 200,
        }
    }
}

/// Flickr API client
pub struct FlickrClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    options: SearchOptions,
}

impl FlickrClient {
    pub fn new(api_key: impl Into<String>, options: SearchOptions) -> Result<Self> {
        Self::with_base_url(api_key, options, FLICKR_REST_URL)
    }

    /// Client against a non-default endpoint
    pub fn with_base_url(
        api_key: impl Into<String>,
        options: SearchOptions,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CrawlError::Authentication("Flickr API key is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CrawlError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key,
            options,
        })
    }

    /// Check the API key with `flickr.test.echo`
    ///
    /// Any failure here means the run cannot authenticate and must stop.
    pub async fn verify_credentials(&self) -> Result<()> {
        self.call("flickr.test.echo", &[])
            .await
            .map(|_| ())
            .map_err(|e| CrawlError::Authentication(e.to_string()))?;

        tracing::info!("Flickr API key accepted");
        Ok(())
    }

    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut query: Vec<(&str, String)> = vec![
            ("method", method.to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
        ];
        query.extend(params.iter().cloned());

        tracing::debug!(method = %method, "Calling Flickr API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CrawlError::Api {
                code: status.as_u16() as i64,
                message: error_text,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CrawlError::Parse(e.to_string()))?;

        check_stat(body)
    }
}

#[async_trait::async_trait]
impl PhotoSource for FlickrClient {
    async fn search(&self, term: &str, page: u32) -> Result<SearchPage> {
        let body = self
            .call(
                "flickr.photos.search",
                &[
                    ("license", self.options.licenses.clone()),
                    ("tags", term.to_string()),
                    ("sort", self.options.sort.clone()),
                    ("per_page", self.options.per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        parse_search_page(&body)
    }

    async fn photo_info(&self, descriptor: &PhotoDescriptor) -> Result<PhotoDetail> {
        let body = self
            .call(
                "flickr.photos.getInfo",
                &[
                    ("photo_id", descriptor.id.clone()),
                    ("secret", descriptor.secret.clone()),
                ],
            )
            .await?;

        parse_photo_detail(&body)
    }
}

/// Static URL of one rendition of a photo
///
/// `size` is the Flickr size suffix (`s` = 75x75 square).
pub fn photo_url(descriptor: &PhotoDescriptor, size: &str) -> String {
    format!(
        "https://farm{}.staticflickr.com/{}/{}_{}_{}.jpg",
        descriptor.farm, descriptor.server, descriptor.id, descriptor.secret, size
    )
}

/// Turn `stat: fail` bodies into `CrawlError::Api`
fn check_stat(body: Value) -> Result<Value> {
    match body.get("stat").and_then(Value::as_str) {
        Some("ok") => Ok(body),
        _ => Err(CrawlError::Api {
            code: body.get("code").and_then(Value::as_i64).unwrap_or(-1),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown failure")
                .to_string(),
        }),
    }
}

/// Render a scalar JSON value as attribute text
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn scalar_attributes(object: &Map<String, Value>) -> HashMap<String, String> {
    object
        .iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
        .collect()
}

/// Parse a `flickr.photos.search` response body
pub fn parse_search_page(body: &Value) -> Result<SearchPage> {
    let photos = body
        .get("photos")
        .and_then(Value::as_object)
        .ok_or_else(|| CrawlError::Parse("search response has no photos object".to_string()))?;

    let number = |key: &str| -> u32 {
        photos
            .get(key)
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(0) as u32
    };

    let descriptors = photos
        .get("photo")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_object)
                .map(|photo| PhotoDescriptor::from_attributes(scalar_attributes(photo)))
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchPage {
        page: number("page"),
        pages: number("pages"),
        photos: descriptors,
    })
}

/// Parse a `flickr.photos.getInfo` response body
pub fn parse_photo_detail(body: &Value) -> Result<PhotoDetail> {
    let photo = body
        .get("photo")
        .and_then(Value::as_object)
        .ok_or_else(|| CrawlError::Parse("info response has no photo object".to_string()))?;

    let children = photo
        .iter()
        .filter_map(|(name, value)| {
            value.as_object().map(|object| DetailChild {
                name: name.clone(),
                attributes: scalar_attributes(object),
            })
        })
        .collect();

    let tags = photo
        .get("tags")
        .and_then(|tags| tags.get("tag"))
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|tag| {
                    tag.get("_content")
                        .or_else(|| tag.get("raw"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(PhotoDetail {
        attributes: scalar_attributes(photo),
        children,
        tags,
    })
}
