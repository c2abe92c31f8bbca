use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::event::AppEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub watchlist: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedUsers {
    #[serde(default)]
    users: BTreeMap<String, UserDocument>,
}

/// Per-user watchlist documents kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty document for `uid` if none exists. Returns true when
    /// a document was created.
    pub fn ensure_user(&self, uid: &str) -> Result<bool, AppError> {
        let mut persisted = self.read()?;
        if persisted.users.contains_key(uid) {
            return Ok(false);
        }
        persisted.users.insert(
            uid.to_string(),
            UserDocument {
                watchlist: Vec::new(),
                updated_at: Utc::now(),
            },
        );
        self.write(&persisted)?;
        tracing::info!(user = uid, path = %self.path.display(), "created watchlist document");
        Ok(true)
    }

    pub fn load(&self, uid: &str) -> Result<Option<UserDocument>, AppError> {
        Ok(self.read()?.users.remove(uid))
    }

    pub fn save(&self, uid: &str, watchlist: &[String]) -> Result<(), AppError> {
        let mut persisted = self.read()?;
        persisted.users.insert(
            uid.to_string(),
            UserDocument {
                watchlist: watchlist.to_vec(),
                updated_at: Utc::now(),
            },
        );
        self.write(&persisted)
    }

    /// Array-union: appends `ticker` unless already present. The user
    /// document must exist.
    pub fn add(&self, uid: &str, ticker: &str) -> Result<Vec<String>, AppError> {
        self.update(uid, |watchlist| {
            if !watchlist.iter().any(|s| s == ticker) {
                watchlist.push(ticker.to_string());
            }
        })
    }

    /// Array-remove: drops every occurrence of `ticker`. The user document
    /// must exist.
    pub fn remove(&self, uid: &str, ticker: &str) -> Result<Vec<String>, AppError> {
        self.update(uid, |watchlist| watchlist.retain(|s| s != ticker))
    }

    fn update<F>(&self, uid: &str, apply: F) -> Result<Vec<String>, AppError>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut persisted = self.read()?;
        let doc = persisted
            .users
            .get_mut(uid)
            .ok_or_else(|| AppError::Store(format!("no watchlist document for user '{}'", uid)))?;
        apply(&mut doc.watchlist);
        doc.updated_at = Utc::now();
        let watchlist = doc.watchlist.clone();
        self.write(&persisted)?;
        Ok(watchlist)
    }

    fn read(&self) -> Result<PersistedUsers, AppError> {
        if !self.path.exists() {
            return Ok(PersistedUsers::default());
        }
        let payload = std::fs::read_to_string(&self.path)?;
        if payload.trim().is_empty() {
            return Ok(PersistedUsers::default());
        }
        Ok(serde_json::from_str(&payload)?)
    }

    fn write(&self, persisted: &PersistedUsers) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(persisted)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Follows one user's document and reports each new version of it, including
/// writes made by other sessions sharing the same file.
#[derive(Debug)]
pub struct WatchlistListener {
    store: WatchlistStore,
    uid: String,
    last: Option<UserDocument>,
}

impl WatchlistListener {
    /// `current` is the document the caller already applied; only later
    /// versions are reported.
    pub fn new(store: WatchlistStore, uid: &str, current: Option<UserDocument>) -> Self {
        Self {
            store,
            uid: uid.to_string(),
            last: current,
        }
    }

    /// Re-reads the document. Returns its watchlist when it differs from the
    /// last version seen. A missing document reports nothing.
    pub fn poll(&mut self) -> Result<Option<Vec<String>>, AppError> {
        let current = self.store.load(&self.uid)?;
        if current == self.last {
            return Ok(None);
        }
        let changed = current.as_ref().map(|doc| doc.watchlist.clone());
        self.last = current;
        Ok(changed)
    }
}

/// Polls the store every `period` and forwards changes as
/// `AppEvent::WatchlistChanged` until shutdown or the receiver goes away.
pub async fn run_listener(
    mut listener: WatchlistListener,
    period: Duration,
    app_tx: mpsc::Sender<AppEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failing = false;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match listener.poll() {
                    Ok(Some(watchlist)) => {
                        failing = false;
                        tracing::debug!(user = %listener.uid, ?watchlist, "watchlist document changed");
                        if app_tx.send(AppEvent::WatchlistChanged(watchlist)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => failing = false,
                    Err(e) => {
                        // Report once per failure streak.
                        if !failing {
                            tracing::warn!(user = %listener.uid, error = %e, "watchlist listener read failed");
                            let _ = app_tx.try_send(AppEvent::Error(format!(
                                "Failed to read watchlist: {}",
                                e
                            )));
                        }
                        failing = true;
                    }
                }
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }
    tracing::debug!(user = %listener.uid, "watchlist listener stopped");
}
