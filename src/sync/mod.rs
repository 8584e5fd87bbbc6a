pub mod reconcile;
pub mod remote;
pub mod webhook;

use crate::core::config::AppConfig;
use crate::core::model::AppState;
use crate::store::StateStore;
use anyhow::{bail, Result};
use reconcile::{reconcile, Reconciliation};
use remote::RemoteStore;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use webhook::BackupWebhook;

/// Best-effort connectivity indicator. Offline never means data loss:
/// the local commit always stands and the next mutation pushes the full
/// state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Syncing,
    Offline,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Offline => "offline",
        };
        write!(f, "{label}")
    }
}

/// Connects the state store to the remote document and the backup webhook.
/// Constructed from config with the access code as a precondition, so a
/// built adapter is always ready to push.
#[derive(Debug)]
pub struct SyncAdapter {
    remote: RemoteStore,
    webhook: Option<BackupWebhook>,
    access_code: String,
    poll_interval: Duration,
    status: watch::Sender<SyncStatus>,
}

impl SyncAdapter {
    /// `Ok(None)` when sync is simply not configured; an error when a sync
    /// section exists without the access code that keys the remote document.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>> {
        let Some(sync) = &config.sync else {
            return Ok(None);
        };
        let Some(access_code) = &config.access_code else {
            bail!("Sync is configured but access_code is not set; add it to the config file");
        };
        let webhook = sync.webhook_url.as_deref().map(BackupWebhook::new);
        let (status, _) = watch::channel(SyncStatus::Synced);
        Ok(Some(SyncAdapter {
            remote: RemoteStore::new(&sync.base_url, access_code),
            webhook,
            access_code: access_code.clone(),
            poll_interval: Duration::from_secs(sync.poll_secs),
            status,
        }))
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Fire-and-forget propagation of a committed snapshot: the remote
    /// document first, then the backup webhook, each failure folded into
    /// the returned status. Nothing is retried inline.
    pub async fn propagate(&self, state: &AppState) -> SyncStatus {
        self.status.send_replace(SyncStatus::Syncing);

        let mut outcome = SyncStatus::Synced;
        if let Err(e) = self.remote.push(state).await {
            warn!("Remote push failed: {e:#}");
            outcome = SyncStatus::Offline;
        }
        if let Some(webhook) = &self.webhook {
            if let Err(e) = webhook.post(&self.access_code, state).await {
                warn!("Backup webhook failed: {e:#}");
                outcome = SyncStatus::Offline;
            }
        }

        self.status.send_replace(outcome);
        outcome
    }

    /// Pulls the remote document once and runs it through the reconciler,
    /// installing it on acceptance. An accepted snapshot is persisted but
    /// never pushed back, since that would bounce between devices forever.
    pub async fn fetch_and_apply(&self, store: &mut StateStore) -> Result<Reconciliation> {
        let Some(remote_state) = self.remote.fetch().await? else {
            debug!("No remote snapshot under this access code yet");
            return Ok(Reconciliation::KeepLocal);
        };
        let decision = reconcile(Some(store.state()), &remote_state);
        if decision == Reconciliation::AcceptRemote {
            info!("Adopting newer remote snapshot");
            store.replace_from_remote(remote_state)?;
        }
        Ok(decision)
    }

    /// Polls the remote at the configured interval until ctrl-c, feeding
    /// each fetched snapshot through the reconciler. `on_update` fires
    /// whenever a remote snapshot is adopted.
    pub async fn listen(
        &self,
        store: &mut StateStore,
        on_update: &(dyn Fn(&AppState)),
    ) -> Result<()> {
        info!(
            "Watching the remote every {}s, ctrl-c to stop",
            self.poll_interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.poll_interval);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Stopping the listen loop");
                    break;
                }
                _ = ticker.tick() => {
                    match self.fetch_and_apply(store).await {
                        Ok(Reconciliation::AcceptRemote) => {
                            self.status.send_replace(SyncStatus::Synced);
                            on_update(store.state());
                        }
                        Ok(Reconciliation::KeepLocal) => {
                            self.status.send_replace(SyncStatus::Synced);
                        }
                        Err(e) => {
                            warn!("Poll failed: {e:#}");
                            self.status.send_replace(SyncStatus::Offline);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Reads the remote document without applying it, for status reporting.
    pub async fn peek_remote(&self) -> Result<Option<AppState>> {
        self.remote.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SyncConfig;
    use crate::store::memory::MemoryStorage;
    use crate::store::StateStorage;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str, webhook_url: Option<String>) -> AppConfig {
        AppConfig {
            access_code: Some("fam-2024".to_string()),
            sync: Some(SyncConfig {
                base_url: base_url.to_string(),
                webhook_url,
                poll_secs: 1,
            }),
            quotes: None,
            data_path: None,
        }
    }

    fn adapter_for(base_url: &str, webhook_url: Option<String>) -> SyncAdapter {
        SyncAdapter::from_config(&config_for(base_url, webhook_url))
            .unwrap()
            .unwrap()
    }

    struct CountingStorage {
        inner: MemoryStorage,
        saves: Arc<AtomicUsize>,
    }

    impl StateStorage for CountingStorage {
        fn load(&self) -> Result<Option<AppState>> {
            self.inner.load()
        }
        fn save(&self, state: &AppState) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(state)
        }
    }

    fn counting_store(state: &AppState) -> (StateStore, Arc<AtomicUsize>) {
        let storage = MemoryStorage::new();
        storage.save(state).unwrap();
        let saves = Arc::new(AtomicUsize::new(0));
        let store = StateStore::open(Box::new(CountingStorage {
            inner: storage,
            saves: saves.clone(),
        }));
        (store, saves)
    }

    #[test]
    fn test_from_config_without_sync_section_is_disabled() {
        let config = AppConfig::default();
        assert!(SyncAdapter::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_requires_access_code() {
        let mut config = config_for("https://db.example.com", None);
        config.access_code = None;
        let err = SyncAdapter::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("access_code"));
    }

    #[tokio::test]
    async fn test_propagate_pushes_document_and_backup() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/users/fam-2024/current_status.json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/backup"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), Some(format!("{}/backup", server.uri())));
        let outcome = adapter.propagate(&AppState::seed()).await;
        assert_eq!(outcome, SyncStatus::Synced);
        assert_eq!(adapter.status(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_propagate_failure_goes_offline_but_still_backs_up() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/backup"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), Some(format!("{}/backup", server.uri())));
        let outcome = adapter.propagate(&AppState::seed()).await;
        assert_eq!(outcome, SyncStatus::Offline);
        assert_eq!(adapter.status(), SyncStatus::Offline);
    }

    #[tokio::test]
    async fn test_status_is_observable_while_propagating() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), None);
        let mut rx = adapter.subscribe();
        adapter.propagate(&AppState::seed()).await;

        // The channel retains the latest value; the Syncing transition
        // happened in between.
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_fetch_and_apply_adopts_newer_remote() {
        let mut local = AppState::seed();
        local.last_modified = Some(Utc::now() - ChronoDuration::hours(1));
        let (mut store, saves) = counting_store(&local);

        let mut remote_state = AppState::seed();
        remote_state.wealth_goal = 9_999_999;
        remote_state.last_modified = Some(Utc::now());

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/fam-2024/current_status.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&remote_state))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), None);
        let decision = adapter.fetch_and_apply(&mut store).await.unwrap();

        assert_eq!(decision, Reconciliation::AcceptRemote);
        assert_eq!(store.state().wealth_goal, 9_999_999);
        // Adopted snapshots are persisted locally, exactly once.
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_and_apply_discards_own_echo_without_persisting() {
        let mut local = AppState::seed();
        local.last_modified = Some(Utc::now() - ChronoDuration::minutes(10));
        let (mut store, saves) = counting_store(&local);

        // Same content, later stamp: the document this device pushed.
        let mut echo = local.clone();
        echo.last_modified = Some(Utc::now());

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/fam-2024/current_status.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&echo))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), None);
        let decision = adapter.fetch_and_apply(&mut store).await.unwrap();

        assert_eq!(decision, Reconciliation::KeepLocal);
        assert_eq!(store.state().last_modified, local.last_modified);
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_apply_with_no_remote_document_keeps_local() {
        let (mut store, saves) = counting_store(&AppState::seed());

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), None);
        let decision = adapter.fetch_and_apply(&mut store).await.unwrap();
        assert_eq!(decision, Reconciliation::KeepLocal);
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_apply_rejects_malformed_remote() {
        let (mut store, saves) = counting_store(&AppState::seed());
        let goal_before = store.state().wealth_goal;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"oops": true}"#))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server.uri(), None);
        assert!(adapter.fetch_and_apply(&mut store).await.is_err());
        assert_eq!(store.state().wealth_goal, goal_before);
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }
}
