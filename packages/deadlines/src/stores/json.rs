//! JSON file state store.
//!
//! Layout inside the data directory:
//! - `conferences.json` - snapshot keyed by conference id
//! - `deadline_history.json` - history keyed by conference id

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{DeadlineError, Result};
use crate::ledger::HistoryLedger;
use crate::snapshot::Snapshot;
use crate::traits::store::{CrawlState, StateStore};

pub const SNAPSHOT_FILE: &str = "conferences.json";
pub const HISTORY_FILE: &str = "deadline_history.json";

/// Stores crawl state as pretty-printed JSON files.
///
/// Each file is written to a temporary sibling and renamed into place, so a
/// reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<CrawlState> {
        let snapshot: Snapshot = read_json(&self.snapshot_path()).await?;
        let history: HistoryLedger = read_json(&self.history_path()).await?;
        debug!(
            conferences = snapshot.len(),
            history_entries = history.len(),
            "Loaded crawl state"
        );
        Ok(CrawlState { snapshot, history })
    }

    async fn save(&self, state: &CrawlState) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(storage)?;
        write_json(&self.snapshot_path(), &state.snapshot).await?;
        write_json(&self.history_path(), &state.history).await?;
        info!(dir = %self.data_dir.display(), "Saved snapshot and history");
        Ok(())
    }
}

fn storage(e: std::io::Error) -> DeadlineError {
    DeadlineError::Storage(Box::new(e))
}

/// Missing file reads as the default value.
async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) if text.trim().is_empty() => Ok(T::default()),
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage(e)),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await.map_err(storage)?;
    tokio::fs::rename(&tmp, path).await.map_err(storage)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::resolve;
    use crate::snapshot::ConferenceStatus;
    use crate::types::conference::Conference;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[tokio::test]
    async fn test_missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        let state = store.load().await.unwrap();
        assert!(state.snapshot.is_empty());
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap();

        let conf = Conference::new(
            "a-2027",
            "a",
            "https://a.org",
            NaiveDate::from_ymd_opt(2027, 3, 15).unwrap(),
        );
        let resolution = resolve(&conf, &[], None, now);

        let mut state = CrawlState::default();
        state
            .snapshot
            .insert(ConferenceStatus::build(&conf, &resolution, &[], 0, vec![]));
        state.history.register("a-2027");
        state
            .history
            .append(
                "a-2027",
                resolution.record.current_deadline,
                now,
                resolution.record.source,
            )
            .unwrap();

        store.save(&state).await.unwrap();
        assert!(store.snapshot_path().exists());
        assert!(!store.snapshot_path().with_extension("json.tmp").exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, DeadlineError::JsonParse(_)));
    }
}
