//! Global leaderboard
//!
//! Submissions are written through to a local top-10 first and only then
//! sent to the server. A timeout or network failure is not an error for the
//! player: the outcome is reported as `offline` and the entry is queued for
//! `flush_pending`.

#[cfg(target_arch = "wasm32")]
mod fetch;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::LEADERBOARD_SIZE;
use crate::persistence::{KeyValueStore, ProfileStore};

/// Request timeout for leaderboard calls
pub const REQUEST_TIMEOUT_MS: i32 = 5_000;

/// Local copy of the board
pub const CACHE_KEY: &str = "leaderboard";

/// Submissions waiting for connectivity
pub const PENDING_KEY: &str = "leaderboard_pending";

const MAX_NAME_LEN: usize = 16;

/// Network errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("No network transport")]
    Offline,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub score: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        default,
        rename = "skinId",
        skip_serializing_if = "Option::is_none"
    )]
    pub skin_id: Option<String>,
}

/// `POST /leaderboard` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u64,
    #[serde(
        default,
        rename = "skinId",
        skip_serializing_if = "Option::is_none"
    )]
    pub skin_id: Option<String>,
}

impl ScoreSubmission {
    /// Build a submission with a cleaned-up display name
    pub fn new(name: &str, score: u64, skin_id: Option<String>) -> Self {
        let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        let name = if trimmed.is_empty() {
            "Anonymous".to_string()
        } else {
            trimmed
        };
        Self {
            name,
            score,
            skin_id,
        }
    }

    fn to_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            id: None,
            name: self.name.clone(),
            score: self.score,
            date: None,
            skin_id: self.skin_id.clone(),
        }
    }
}

/// `POST /leaderboard` response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub offline: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /leaderboard` response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// What the caller learns from a submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub success: bool,
    pub rank: Option<u32>,
    pub offline: bool,
    pub error: Option<String>,
}

/// Leaderboard as shown to the player
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    /// Served from the local cache
    pub offline: bool,
}

/// HTTP seam. Implementations enforce `REQUEST_TIMEOUT_MS` themselves.
#[allow(async_fn_in_trait)]
pub trait LeaderboardTransport {
    async fn post_score(&self, submission: &ScoreSubmission) -> Result<SubmitResponse, NetError>;
    async fn fetch_leaderboard(&self) -> Result<FetchResponse, NetError>;
}

/// Transport for builds without networking
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineTransport;

impl LeaderboardTransport for OfflineTransport {
    async fn post_score(&self, _submission: &ScoreSubmission) -> Result<SubmitResponse, NetError> {
        Err(NetError::Offline)
    }

    async fn fetch_leaderboard(&self) -> Result<FetchResponse, NetError> {
        Err(NetError::Offline)
    }
}

/// Sort descending by score and keep the top entries
fn sort_and_truncate(entries: &mut Vec<LeaderboardEntry>) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(LEADERBOARD_SIZE);
}

/// Cached board (empty when absent or corrupt)
pub fn cached_leaderboard<S: KeyValueStore>(store: &ProfileStore<S>) -> Vec<LeaderboardEntry> {
    store.load(CACHE_KEY).unwrap_or_default()
}

pub fn pending_submissions<S: KeyValueStore>(store: &ProfileStore<S>) -> Vec<ScoreSubmission> {
    store.load(PENDING_KEY).unwrap_or_default()
}

/// Write a submission into the local board. Returns its local rank.
pub fn record_local<S: KeyValueStore>(
    store: &ProfileStore<S>,
    submission: &ScoreSubmission,
) -> Option<u32> {
    let mut entries = cached_leaderboard(store);
    // Existing equal scores stay ahead of the new one
    let pos = entries
        .iter()
        .position(|e| submission.score > e.score)
        .unwrap_or(entries.len());
    entries.insert(pos, submission.to_entry());
    sort_and_truncate(&mut entries);
    if let Err(e) = store.save(CACHE_KEY, &entries) {
        log::warn!("Failed to cache leaderboard: {e}");
    }
    (pos < LEADERBOARD_SIZE).then(|| pos as u32 + 1)
}

fn queue_pending<S: KeyValueStore>(store: &ProfileStore<S>, submission: ScoreSubmission) {
    let mut pending = pending_submissions(store);
    pending.push(submission);
    if let Err(e) = store.save(PENDING_KEY, &pending) {
        log::warn!("Failed to queue leaderboard submission: {e}");
    }
}

/// Turn the network result into an outcome; failures are queued
pub fn resolve_submission<S: KeyValueStore>(
    store: &ProfileStore<S>,
    submission: ScoreSubmission,
    local_rank: Option<u32>,
    result: Result<SubmitResponse, NetError>,
) -> SubmitOutcome {
    match result {
        Ok(resp) if resp.success => SubmitOutcome {
            success: true,
            rank: resp.rank.or(local_rank),
            offline: resp.offline.unwrap_or(false),
            error: None,
        },
        Ok(resp) => {
            // The server answered and said no; retrying won't help
            log::warn!("Leaderboard rejected score: {:?}", resp.error);
            SubmitOutcome {
                success: false,
                rank: local_rank,
                offline: false,
                error: resp.error,
            }
        }
        Err(e) => {
            log::warn!("Leaderboard unreachable, queued score {}: {e}", submission.score);
            queue_pending(store, submission);
            SubmitOutcome {
                success: true,
                rank: local_rank,
                offline: true,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Submit a score: local write-through, then best-effort network
pub async fn submit_global_score<S, T>(
    store: &ProfileStore<S>,
    transport: &T,
    submission: ScoreSubmission,
) -> SubmitOutcome
where
    S: KeyValueStore,
    T: LeaderboardTransport,
{
    let local_rank = record_local(store, &submission);
    let result = transport.post_score(&submission).await;
    resolve_submission(store, submission, local_rank, result)
}

/// Fetch the global board, falling back to the cache
pub async fn fetch_global_leaderboard<S, T>(store: &ProfileStore<S>, transport: &T) -> LeaderboardView
where
    S: KeyValueStore,
    T: LeaderboardTransport,
{
    match transport.fetch_leaderboard().await {
        Ok(resp) if resp.success => {
            let mut entries = resp.leaderboard;
            sort_and_truncate(&mut entries);
            if let Err(e) = store.save(CACHE_KEY, &entries) {
                log::warn!("Failed to cache leaderboard: {e}");
            }
            LeaderboardView {
                entries,
                offline: false,
            }
        }
        Ok(_) | Err(_) => {
            log::info!("Showing cached leaderboard");
            LeaderboardView {
                entries: cached_leaderboard(store),
                offline: true,
            }
        }
    }
}

/// Retry queued submissions. Returns how many went through.
pub async fn flush_pending<S, T>(store: &ProfileStore<S>, transport: &T) -> usize
where
    S: KeyValueStore,
    T: LeaderboardTransport,
{
    let pending = pending_submissions(store);
    if pending.is_empty() {
        return 0;
    }

    let mut sent = 0;
    let mut still_pending = Vec::new();
    for submission in pending {
        match transport.post_score(&submission).await {
            // Rejected entries are dropped, not retried forever
            Ok(_) => sent += 1,
            Err(_) => still_pending.push(submission),
        }
    }

    let saved = if still_pending.is_empty() {
        store.remove(PENDING_KEY)
    } else {
        store.save(PENDING_KEY, &still_pending)
    };
    if let Err(e) = saved {
        log::warn!("Failed to update leaderboard queue: {e}");
    }
    log::info!("Flushed {sent} queued scores ({} left)", still_pending.len());
    sent
}
