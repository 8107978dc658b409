//! Landing page content. One page, many copy revisions: each revision is a
//! different `LandingContent` value rather than a different page.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN: &str = include_str!("landing.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCard {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    pub label: String,
    #[serde(default)]
    pub coming_soon: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub items: Vec<FeatureItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingContent {
    pub title: String,
    pub tagline: String,
    pub headline: String,
    #[serde(default)]
    pub cards: Vec<ContentCard>,
    pub feature_groups: Vec<FeatureGroup>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

impl LandingContent {
    /// The shipped revision
    pub fn builtin() -> Result<Self> {
        serde_json::from_str(BUILTIN).context("Built-in landing content is malformed")
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid landing content in {}", path.display()))
    }

    /// Count shown on the feature board, coming-soon items included
    pub fn total_features(&self) -> usize {
        self.feature_groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn coming_soon(&self) -> impl Iterator<Item = &FeatureItem> {
        self.feature_groups
            .iter()
            .flat_map(|g| g.items.iter())
            .filter(|item| item.coming_soon)
    }
}
