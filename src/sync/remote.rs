use crate::core::model::AppState;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, instrument};

/// The remote copy of the snapshot: a single REST document keyed by the
/// access code, in the manner of a Firebase Realtime Database. `PUT`
/// replaces the document, `GET` returns it, and a JSON `null` body means
/// nobody has written under this code yet.
#[derive(Debug)]
pub struct RemoteStore {
    client: Client,
    document_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, access_code: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        RemoteStore {
            client: Client::new(),
            document_url: format!("{base}/users/{access_code}/current_status.json"),
        }
    }

    /// Replaces the remote document with this snapshot.
    #[instrument(name = "RemotePush", skip(self, state))]
    pub async fn push(&self, state: &AppState) -> Result<()> {
        debug!("Pushing snapshot to {}", self.document_url);
        let response = self
            .client
            .put(&self.document_url)
            .json(state)
            .send()
            .await
            .context("Failed to reach the remote store")?;
        response
            .error_for_status()
            .context("Remote store rejected the snapshot")?;
        Ok(())
    }

    /// Fetches the remote document. `Ok(None)` means no snapshot has been
    /// pushed under this access code.
    #[instrument(name = "RemoteFetch", skip(self))]
    pub async fn fetch(&self) -> Result<Option<AppState>> {
        debug!("Fetching snapshot from {}", self.document_url);
        let response = self
            .client
            .get(&self.document_url)
            .send()
            .await
            .context("Failed to reach the remote store")?
            .error_for_status()
            .context("Remote store refused the fetch")?;
        let snapshot: Option<AppState> = response
            .json()
            .await
            .context("Remote document is not a valid snapshot")?;
        Ok(snapshot)
    }
}
