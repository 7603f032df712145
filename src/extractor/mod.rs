//! Fallback-chained field extraction from rendered profile pages.
//!
//! The extractor owns all HTML parsing. `scraper`'s DOM is not `Send`,
//! so parsing happens synchronously inside [`Extractor::extract`] and the
//! document never crosses an await point.

pub mod selectors;

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, trace};

use crate::fetcher::RenderedPage;
use crate::models::{Agent, InfluenceMetrics, TokenData};
use selectors::{InfluenceField, SectionSpec, TokenField};

/// Extraction failure. Name is the only mandatory field; everything else
/// degrades to an empty string.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no selector candidate yielded an agent name for scan id {scan_id}")]
    MissingName { scan_id: u32 },
}

/// Capability seam between the scheduler and the parsing layer.
pub trait Extractor: Send + Sync {
    /// Parse a rendered page into a structured agent candidate.
    fn extract(&self, page: &RenderedPage, scan_id: u32) -> Result<Agent, ExtractionError>;
}

fn compile_all(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .map(|s| {
            Selector::parse(s)
                .expect("BUG: hardcoded CSS selector is invalid - this is a compile-time bug")
        })
        .collect()
}

lazy_static! {
    static ref NAME_SELECTORS: Vec<Selector> = compile_all(selectors::NAME);
    static ref PRICE_SELECTORS: Vec<Selector> = compile_all(selectors::PRICE);
    static ref DESCRIPTION_SELECTORS: Vec<Selector> = compile_all(selectors::DESCRIPTION);
    static ref STATS_SELECTORS: Vec<Selector> = compile_all(selectors::STATS);
}

/// Extractor for app.virtuals.io profile markup, driven by the tables in
/// [`selectors`].
#[derive(Debug, Default)]
pub struct VirtualsExtractor;

impl VirtualsExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for VirtualsExtractor {
    fn extract(&self, page: &RenderedPage, scan_id: u32) -> Result<Agent, ExtractionError> {
        let document = Html::parse_document(&page.html);

        let name = select_first_text(&document, &NAME_SELECTORS)
            .ok_or(ExtractionError::MissingName { scan_id })?;
        let price = select_first_text(&document, &PRICE_SELECTORS).unwrap_or_default();
        let description = select_first_text(&document, &DESCRIPTION_SELECTORS).unwrap_or_default();
        let stats = select_first_text(&document, &STATS_SELECTORS).unwrap_or_default();

        let mut agent = Agent::new(name, description, stats, price);

        extract_section(&document, &selectors::INFLUENCE_SECTION, |label, value| {
            apply_influence(&mut agent.influence_metrics, label, value)
        });
        extract_section(&document, &selectors::TOKEN_SECTION, |label, value| {
            apply_token(&mut agent.token_data, label, value)
        });

        agent.validate_and_clean();
        agent.regenerate_id();
        agent.parse_success = true;

        debug!(scan_id, id = %agent.id, name = %agent.name, "extracted agent");
        Ok(agent)
    }
}

/// First candidate selector whose first match has non-empty trimmed text.
fn select_first_text(document: &Html, candidates: &[Selector]) -> Option<String> {
    for selector in candidates {
        if let Some(element) = document.select(selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Walk a labeled section: find the first present container candidate,
/// then feed each child block's (label, value) pair to `apply`. Blocks
/// whose label the caller does not recognize are ignored.
fn extract_section<F>(document: &Html, spec: &SectionSpec, mut apply: F)
where
    F: FnMut(&str, String) -> bool,
{
    let row_selector = Selector::parse(spec.rows)
        .expect("BUG: hardcoded CSS selector is invalid - this is a compile-time bug");
    let label_selector = Selector::parse(spec.label)
        .expect("BUG: hardcoded CSS selector is invalid - this is a compile-time bug");
    let value_selector = Selector::parse(spec.value)
        .expect("BUG: hardcoded CSS selector is invalid - this is a compile-time bug");

    for container_raw in spec.containers {
        let container_selector = Selector::parse(container_raw)
            .expect("BUG: hardcoded CSS selector is invalid - this is a compile-time bug");
        let Some(container) = document.select(&container_selector).next() else {
            continue;
        };

        for row in container.select(&row_selector) {
            let Some(label_el) = row.select(&label_selector).next() else {
                continue;
            };
            let label = element_text(label_el).to_lowercase();
            let value = row
                .select(&value_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();
            if !apply(&label, value) {
                trace!(label = %label, "unmapped section label ignored");
            }
        }
        return;
    }
}

fn apply_influence(metrics: &mut InfluenceMetrics, label: &str, value: String) -> bool {
    let Some((_, field)) = selectors::INFLUENCE_LABELS
        .iter()
        .find(|(candidate, _)| *candidate == label)
    else {
        return false;
    };
    match field {
        InfluenceField::Mindshare => metrics.mindshare = value,
        InfluenceField::Impressions => metrics.impressions = value,
        InfluenceField::Engagement => metrics.engagement = value,
        InfluenceField::Followers => metrics.followers = value,
        InfluenceField::SmartFollowers => metrics.smart_followers = value,
        InfluenceField::TopTweets => metrics.top_tweets = value,
    }
    true
}

fn apply_token(token: &mut TokenData, label: &str, value: String) -> bool {
    let Some((_, field)) = selectors::TOKEN_LABELS
        .iter()
        .find(|(candidate, _)| *candidate == label)
    else {
        return false;
    };
    match field {
        TokenField::McFdv => token.mc_fdv = value,
        TokenField::Change24h => token.change_24h = value,
        TokenField::Tvl => token.tvl = value,
        TokenField::Holders => token.holders = value,
        TokenField::Volume24h => token.volume_24h = value,
        TokenField::Inferences => token.inferences = value,
    }
    true
}
