//! Agent data model.
//!
//! The persisted JSON layout of these structs is a compatibility surface:
//! downstream readers (HTTP API, bot commands) consume the same documents,
//! so serde field names must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lifecycle status derived from agent content at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Freshly created record that has never been re-persisted
    #[default]
    Default,
    /// Live profile with a price or description
    Active,
    /// Both price and description empty - the page rendered nothing
    Dead,
    /// Description flags the agent as inactive or discontinued
    Latent,
}

/// Social-reach metrics scraped from the profile's influence section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluenceMetrics {
    pub mindshare: String,
    pub impressions: String,
    pub engagement: String,
    pub followers: String,
    pub smart_followers: String,
    pub top_tweets: String,
}

/// Token market data scraped from the profile's token section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub mc_fdv: String,
    pub change_24h: String,
    pub tvl: String,
    pub holders: String,
    pub volume_24h: String,
    pub inferences: String,
}

/// A single agent profile with scrape bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stats: String,
    pub price: String,
    pub scraped_at: DateTime<Utc>,
    pub status: AgentStatus,
    pub last_checked: DateTime<Utc>,
    pub update_count: u32,
    pub influence_metrics: InfluenceMetrics,
    pub token_data: TokenData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub parse_success: bool,
    pub retry_count: u32,
}

/// Index document: rebuild timestamp plus one summary per known agent,
/// in the order the agents were supplied to the most recent rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIndex {
    pub last_updated: DateTime<Utc>,
    pub agents: Vec<AgentSummary>,
}

/// Narrow index projection of an [`Agent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub price: String,
}

/// Compute the content-derived agent ID.
///
/// The ID is a pure function of `(name, price)` so that re-fetches of an
/// unchanged profile collapse to the same record. It must never look at
/// volatile fields (timestamps, stats).
#[must_use]
pub fn agent_id(name: &str, price: &str) -> String {
    let digest = Sha256::digest(format!("{name}-{price}").as_bytes());
    // First 8 bytes keep IDs short while staying collision-safe at this scale
    hex::encode(&digest[..8])
}

impl Agent {
    /// Create an agent from freshly extracted fields, deriving the ID.
    #[must_use]
    pub fn new(name: String, description: String, stats: String, price: String) -> Self {
        let now = Utc::now();
        Self {
            id: agent_id(&name, &price),
            name,
            description,
            stats,
            price,
            scraped_at: now,
            status: AgentStatus::Default,
            last_checked: now,
            update_count: 0,
            influence_metrics: InfluenceMetrics::default(),
            token_data: TokenData::default(),
            last_error: None,
            parse_success: false,
            retry_count: 0,
        }
    }

    /// Re-derive the content ID from the current name and price.
    pub fn regenerate_id(&mut self) {
        self.id = agent_id(&self.name, &self.price);
    }

    /// Derive the lifecycle status from content. Rules are checked in a
    /// fixed order; the first match wins.
    #[must_use]
    pub fn derive_status(&self) -> AgentStatus {
        let description = self.description.to_lowercase();
        if self.price.is_empty() && self.description.is_empty() {
            AgentStatus::Dead
        } else if self.update_count == 0 {
            AgentStatus::Default
        } else if description.contains("inactive") || description.contains("discontinued") {
            AgentStatus::Latent
        } else {
            AgentStatus::Active
        }
    }

    /// Normalize scraped fields in place.
    ///
    /// Splits a compound `$NAME <price>` ticker line into name and price
    /// when the price cell was empty, keeps only the first line of a
    /// `$`-bearing price, and bounds the description length.
    pub fn validate_and_clean(&mut self) {
        self.name = self.name.trim().to_string();
        if self.name.starts_with('$') {
            let parts: Vec<&str> = self.name.split_whitespace().collect();
            if parts.len() > 1 {
                if self.price.is_empty() {
                    self.price = parts[1].to_string();
                }
                self.name = parts[0].to_string();
            }
        }

        if self.price.contains('$') {
            self.price = self
                .price
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
        }

        self.description = self.description.trim().to_string();
        if self.description.len() > 1000 {
            let mut cut = 1000;
            while !self.description.is_char_boundary(cut) {
                cut -= 1;
            }
            self.description.truncate(cut);
            self.description.push_str("...");
        }
    }

    /// Whether the record is older than `ttl` and due for a re-check.
    #[must_use]
    pub fn is_stale(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.last_checked > ttl
    }

    /// Record a diagnostic failure on this agent.
    pub fn set_error(&mut self, err: &dyn std::error::Error) {
        self.last_error = Some(err.to_string());
        self.parse_success = false;
    }

    /// Project into the narrow index form.
    #[must_use]
    pub fn to_summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
        }
    }

    /// Normalized content projection used for change detection.
    ///
    /// Excludes timestamps and derived bookkeeping (`update_count`,
    /// `status`, `retry_count`) so a re-save of unchanged content never
    /// registers as a change even if more volatile fields are added later.
    #[must_use]
    pub fn content_fingerprint(&self) -> ContentFingerprint<'_> {
        ContentFingerprint {
            name: &self.name,
            description: &self.description,
            stats: &self.stats,
            price: &self.price,
            influence_metrics: &self.influence_metrics,
            token_data: &self.token_data,
            last_error: self.last_error.as_deref(),
            parse_success: self.parse_success,
        }
    }
}

/// Borrowed view of the fields that participate in change detection.
#[derive(Debug, PartialEq, Eq)]
pub struct ContentFingerprint<'a> {
    name: &'a str,
    description: &'a str,
    stats: &'a str,
    price: &'a str,
    influence_metrics: &'a InfluenceMetrics,
    token_data: &'a TokenData,
    last_error: Option<&'a str>,
    parse_success: bool,
}
