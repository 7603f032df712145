//! File-backed agent persistence with a queryable summary index.
//!
//! On-disk layout (a compatibility surface for external readers):
//!
//! ```text
//! <base_dir>/agents/<id>.json    one document per agent
//! <base_dir>/agent_index.json    last_updated + ordered summaries
//! ```
//!
//! Entity files are written via temp-file + rename so readers never see a
//! truncated document; the index is additionally guarded by a read/write
//! lock so `get_index` never observes a partially rebuilt index.

pub mod throttle;

pub use throttle::FetchThrottle;

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Agent, AgentIndex, AgentSummary};

/// Errors surfaced by the store.
///
/// `Io` and `Codec` are both persistence failures; `NotFound` is terminal
/// for the single read that raised it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record for {0}")]
    NotFound(String),
    #[error("storage i/o failed for {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode {}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const INDEX_FILE: &str = "agent_index.json";
const AGENTS_DIR: &str = "agents";

/// Durable agent store rooted at a base directory.
pub struct AgentStore {
    base_dir: PathBuf,
    index_lock: RwLock<()>,
}

impl AgentStore {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            index_lock: RwLock::new(()),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn agent_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(AGENTS_DIR).join(format!("{id}.json"))
    }

    fn index_path(&self) -> PathBuf {
        self.base_dir.join(INDEX_FILE)
    }

    /// Persist one agent, creating parent storage on demand.
    ///
    /// Change detection compares the normalized content projection of any
    /// existing record with the incoming one; a semantically identical
    /// re-save is a no-op. Otherwise `update_count` is bumped
    /// (existing + 1, or 1 for a brand-new record), `last_checked` is
    /// stamped, the status re-derived, and the document written via
    /// write-replace.
    ///
    /// Returns the agent exactly as persisted.
    pub async fn save(&self, mut agent: Agent) -> Result<Agent, StoreError> {
        if agent.id.is_empty() {
            agent.regenerate_id();
        }

        let existing = match self.get(&agent.id).await {
            Ok(existing) => Some(existing),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(existing) = existing {
            if existing.content_fingerprint() == agent.content_fingerprint() {
                debug!(id = %agent.id, "unchanged content, skipping write");
                return Ok(existing);
            }
            agent.update_count = existing.update_count + 1;
        } else {
            agent.update_count = 1;
        }

        agent.last_checked = Utc::now();
        agent.status = agent.derive_status();

        let path = self.agent_path(&agent.id);
        write_json_replace(&path, &agent).await?;
        debug!(id = %agent.id, update_count = agent.update_count, "agent persisted");
        Ok(agent)
    }

    /// Load one agent by its content ID.
    pub async fn get(&self, id: &str) -> Result<Agent, StoreError> {
        read_json(&self.agent_path(id), id).await
    }

    /// Replace the entire index with a fresh projection of `agents`,
    /// preserving their order. Holds the exclusive index lock for the
    /// duration; a failed write leaves the previous index file intact.
    pub async fn rebuild_index(&self, agents: &[Agent]) -> Result<(), StoreError> {
        let _guard = self.index_lock.write().await;

        let index = AgentIndex {
            last_updated: Utc::now(),
            agents: agents.iter().map(Agent::to_summary).collect(),
        };

        write_json_replace(&self.index_path(), &index).await?;
        debug!(agents = index.agents.len(), "index rebuilt");
        Ok(())
    }

    /// Current index; concurrent with other readers, exclusive against
    /// [`AgentStore::rebuild_index`]. `NotFound` before the first rebuild.
    pub async fn get_index(&self) -> Result<AgentIndex, StoreError> {
        let _guard = self.index_lock.read().await;
        read_json(&self.index_path(), "agent index").await
    }

    /// Best-match lookup by agent name over the current index.
    ///
    /// Case-insensitive; an exact name match wins over a containment
    /// match. Returns `NotFound` when nothing matches.
    pub async fn find_by_name(&self, query: &str) -> Result<Agent, StoreError> {
        let index = self.get_index().await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(StoreError::NotFound(query.to_string()));
        }

        let mut best: Option<&AgentSummary> = None;
        for summary in &index.agents {
            let name = summary.name.to_lowercase();
            if name == needle {
                best = Some(summary);
                break;
            }
            if best.is_none() && name.contains(&needle) {
                best = Some(summary);
            }
        }

        match best {
            Some(summary) => self.get(&summary.id).await,
            None => Err(StoreError::NotFound(query.to_string())),
        }
    }
}

/// Read and decode one JSON document. `label` names the record in the
/// `NotFound` error (an agent ID or "agent index").
async fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<T, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(label.to_string()));
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` and write it with write-replace semantics: the
/// document lands in a temp file first and is renamed over the target, so
/// a failed write never truncates an existing record.
async fn write_json_replace<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    })?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}
