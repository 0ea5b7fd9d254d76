//! # Feature: Reaction Media
//!
//! Picks a media item (gif, clip or picture) to accompany a reply, driven by
//! the classified [`Feeling`]. Items come from a catalog that lists one
//! directory per category; the default catalog is a GitHub repository read
//! through the contents API.
//!
//! Selection never fails: lookup errors are logged and the next candidate
//! category is tried, ending with a draw from the full category list.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::random::RandomSource;
use crate::sentiment::Feeling;

const GITHUB_API_BASE: &str = "https://api.github.com";
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("sai-bot/", env!("CARGO_PKG_VERSION"));

/// Default feeling to category table. Order inside each list is the order
/// that gets shuffled.
pub const FEELING_CATEGORIES: &[(Feeling, &[&str])] = &[
    (Feeling::Happy, &["happy", "dance", "yay"]),
    (Feeling::Excited, &["excited", "yay", "dance"]),
    (Feeling::Sad, &["sad", "crying", "hug"]),
    (Feeling::Thinking, &["thinking", "hmm"]),
    (Feeling::Serious, &["serious", "nod"]),
    (Feeling::Greeting, &["hello", "wave"]),
    (Feeling::Grateful, &["thank-you", "Approved", "adorbs"]),
    (Feeling::Cute, &["adorbs", "cute"]),
    (Feeling::Approved, &["Approved", "thumbs-up"]),
    (Feeling::Wtf, &["wtf", "confused"]),
    (Feeling::Angry, &["angry", "facepalm"]),
    (Feeling::Bye, &["bye", "wave"]),
    (Feeling::Coffee, &["coffee"]),
    (Feeling::Childish, &["childish", "silly"]),
    (Feeling::Debate, &["debate", "thinking"]),
];

/// Every category known to exist in the catalog, including ones no feeling
/// maps to. Used as the last resort.
pub const ALL_CATEGORIES: &[&str] = &[
    "happy", "dance", "yay", "excited", "sad", "crying", "hug", "thinking", "hmm", "serious",
    "nod", "hello", "wave", "thank-you", "Approved", "adorbs", "cute", "thumbs-up", "wtf",
    "confused", "angry", "facepalm", "bye", "coffee", "childish", "silly", "debate", "anime",
    "meme", "random",
];

/// How a media file has to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Animation,
    Video,
    Photo,
}

impl MediaKind {
    /// Kind for a file name, or `None` if the extension is not a recognized media type.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "gif" => Some(MediaKind::Animation),
            "mp4" | "webm" => Some(MediaKind::Video),
            "png" | "jpg" | "jpeg" | "webp" => Some(MediaKind::Photo),
            _ => None,
        }
    }
}

/// One entry of a catalog directory listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub download_url: Option<String>,
}

impl CatalogEntry {
    pub fn file(name: &str, download_url: &str) -> Self {
        CatalogEntry {
            name: name.to_string(),
            entry_type: "file".to_string(),
            download_url: Some(download_url.to_string()),
        }
    }
}

/// A resolved media asset, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub url: String,
    pub name: String,
    pub category: String,
    pub kind: MediaKind,
}

impl MediaItem {
    fn from_entry(category: &str, entry: CatalogEntry) -> Option<Self> {
        if entry.entry_type != "file" {
            return None;
        }
        let kind = MediaKind::from_file_name(&entry.name)?;
        let url = entry.download_url?;
        Some(MediaItem {
            url,
            name: entry.name,
            category: category.to_string(),
            kind,
        })
    }
}

#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Lists the raw entries of one category directory.
    async fn list_items(&self, category: &str) -> Result<Vec<CatalogEntry>>;
}

/// Catalog backed by a GitHub repository, one directory per category.
#[derive(Clone)]
pub struct GithubMediaCatalog {
    client: reqwest::Client,
    api_base: String,
    repo: String,
    root: String,
    token: Option<String>,
}

impl GithubMediaCatalog {
    pub fn new(repo: &str, root: &str, token: Option<String>) -> Result<Self> {
        Self::with_api_base(GITHUB_API_BASE, repo, root, token)
    }

    pub fn with_api_base(
        api_base: &str,
        repo: &str,
        root: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CATALOG_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to build media catalog client: {}", e))?;

        Ok(GithubMediaCatalog {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo: repo.trim_matches('/').to_string(),
            root: root.trim_matches('/').to_string(),
            token,
        })
    }

    pub fn category_url(&self, category: &str) -> String {
        if self.root.is_empty() {
            format!("{}/repos/{}/contents/{}", self.api_base, self.repo, category)
        } else {
            format!("{}/repos/{}/contents/{}/{}", self.api_base, self.repo, self.root, category)
        }
    }
}

#[async_trait]
impl MediaCatalog for GithubMediaCatalog {
    async fn list_items(&self, category: &str) -> Result<Vec<CatalogEntry>> {
        let url = self.category_url(category);
        debug!("Listing media catalog category '{}' at {}", category, url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Media catalog error (status {}) for '{}': {}",
                status,
                category,
                body.chars().take(200).collect::<String>()
            ));
        }

        let entries: Vec<CatalogEntry> = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse media catalog listing for '{}': {}", category, e))?;
        Ok(entries)
    }
}

/// Feeling to ordered category list. Keys are unique and every list is non-empty.
#[derive(Debug, Clone)]
pub struct MediaCategoryMap {
    entries: Vec<(Feeling, Vec<&'static str>)>,
}

impl MediaCategoryMap {
    /// Builds a map, keeping the first list given for a feeling and dropping empty lists.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Feeling, Vec<&'static str>)>,
    {
        let mut kept: Vec<(Feeling, Vec<&'static str>)> = Vec::new();
        for (feeling, categories) in entries {
            if categories.is_empty() || kept.iter().any(|(f, _)| *f == feeling) {
                continue;
            }
            kept.push((feeling, categories));
        }
        MediaCategoryMap { entries: kept }
    }

    pub fn categories_for(&self, feeling: Feeling) -> Option<&[&'static str]> {
        self.entries
            .iter()
            .find(|(f, _)| *f == feeling)
            .map(|(_, categories)| categories.as_slice())
    }

    pub fn feelings(&self) -> impl Iterator<Item = Feeling> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MediaCategoryMap {
    fn default() -> Self {
        Self::new(
            FEELING_CATEGORIES
                .iter()
                .map(|(feeling, categories)| (*feeling, categories.to_vec())),
        )
    }
}

#[derive(Clone)]
pub struct MediaSelector {
    catalog: Arc<dyn MediaCatalog>,
    categories: Arc<MediaCategoryMap>,
    fallback_categories: Arc<Vec<&'static str>>,
    random: Arc<dyn RandomSource>,
}

impl MediaSelector {
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        categories: MediaCategoryMap,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        MediaSelector {
            catalog,
            categories: Arc::new(categories),
            fallback_categories: Arc::new(ALL_CATEGORIES.to_vec()),
            random,
        }
    }

    pub fn with_fallback_categories(mut self, fallback: Vec<&'static str>) -> Self {
        self.fallback_categories = Arc::new(fallback);
        self
    }

    /// Resolves a media item for `feeling`. `None` feeling, or one missing from
    /// the map, is replaced by a random mapped feeling.
    pub async fn select_media(&self, feeling: Option<Feeling>) -> Option<MediaItem> {
        let categories = self.candidate_categories(feeling);

        for category in &categories {
            if let Some(item) = self.resolve_category(category).await {
                info!("Selected media '{}' from category '{}'", item.name, category);
                return Some(item);
            }
        }

        if self.fallback_categories.is_empty() {
            warn!("No media found and no fallback categories configured");
            return None;
        }

        let index = self.random.index(self.fallback_categories.len());
        let fallback = self.fallback_categories[index];
        debug!(
            "All candidate categories {:?} came up empty, falling back to '{}'",
            categories, fallback
        );

        let item = self.resolve_category(fallback).await;
        if item.is_none() {
            warn!("Fallback category '{}' yielded no media", fallback);
        }
        item
    }

    /// Shuffled category list for a feeling, after random substitution.
    fn candidate_categories(&self, feeling: Option<Feeling>) -> Vec<&'static str> {
        let mapped = feeling.and_then(|f| self.categories_for_logged(f));

        let categories = match mapped {
            Some(categories) => categories,
            None => {
                let feelings: Vec<Feeling> = self.categories.feelings().collect();
                if feelings.is_empty() {
                    return Vec::new();
                }
                let substitute = feelings[self.random.index(feelings.len())];
                debug!("Substituting random feeling '{}' for {:?}", substitute, feeling);
                self.categories.categories_for(substitute).unwrap_or(&[])
            }
        };

        let mut shuffled = categories.to_vec();
        self.random.shuffle(&mut shuffled);
        shuffled
    }

    fn categories_for_logged(&self, feeling: Feeling) -> Option<&[&'static str]> {
        let categories = self.categories.categories_for(feeling);
        if categories.is_none() {
            debug!("Feeling '{}' has no media categories", feeling);
        }
        categories
    }

    /// One random recognized item from `category`; lookup failures count as empty.
    async fn resolve_category(&self, category: &str) -> Option<MediaItem> {
        let entries = match self.catalog.list_items(category).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Media lookup for category '{}' failed: {:#}", category, e);
                return None;
            }
        };

        let mut candidates: Vec<MediaItem> = entries
            .into_iter()
            .filter_map(|entry| MediaItem::from_entry(category, entry))
            .collect();

        if candidates.is_empty() {
            debug!("Category '{}' has no usable media", category);
            return None;
        }

        let index = self.random.index(candidates.len());
        Some(candidates.swap_remove(index))
    }
}
