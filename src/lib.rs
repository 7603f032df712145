//! agentwatch: scheduled crawler for virtuals agent profiles.
//!
//! Five components wired through explicit seams: a file-backed
//! [`store::AgentStore`] with a summary index, an in-memory
//! [`store::FetchThrottle`], a chromium-driven [`fetcher::ChromiumFetcher`],
//! a table-driven [`extractor::VirtualsExtractor`], and the
//! [`scheduler::CrawlScheduler`] sweeping a numeric scan-ID range on a
//! fixed tick.

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod utils;

pub use config::ScoutConfig;
pub use extractor::{ExtractionError, Extractor, VirtualsExtractor};
pub use fetcher::{ChromiumFetcher, FetchError, Fetcher, RenderedPage};
pub use models::{
    Agent, AgentIndex, AgentStatus, AgentSummary, InfluenceMetrics, TokenData, agent_id,
};
pub use scheduler::{CrawlScheduler, SweepSummary};
pub use store::{AgentStore, FetchThrottle, StoreError};
