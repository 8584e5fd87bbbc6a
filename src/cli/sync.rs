use super::ui;
use crate::core::config::AppConfig;
use crate::core::model::AppState;
use crate::store::StateStore;
use crate::sync::reconcile::{reconcile, Reconciliation};
use crate::sync::{SyncAdapter, SyncStatus};
use anyhow::Result;

/// Pushes the committed snapshot after a local change and prints where it
/// landed. Without an adapter the tracker is purely local and stays quiet.
pub async fn propagate_change(adapter: Option<&SyncAdapter>, state: &AppState) {
    let Some(adapter) = adapter else {
        return;
    };
    let status = adapter.propagate(state).await;
    report_status(status);
}

fn report_status(status: SyncStatus) {
    let line = format!("sync: {status}");
    let styled = match status {
        SyncStatus::Offline => ui::style_text(&line, ui::StyleType::Warning),
        _ => ui::style_text(&line, ui::StyleType::Subtle),
    };
    println!("{styled}");
}

pub async fn push(adapter: &SyncAdapter, state: &AppState) {
    match adapter.propagate(state).await {
        SyncStatus::Offline => println!(
            "{}",
            ui::style_text(
                "Push did not reach every endpoint; the next change retries automatically.",
                ui::StyleType::Warning,
            )
        ),
        _ => println!("Snapshot pushed."),
    }
}

pub async fn pull(store: &mut StateStore, adapter: &SyncAdapter) -> Result<()> {
    match adapter.fetch_and_apply(store).await? {
        Reconciliation::AcceptRemote => {
            println!("Adopted the remote snapshot.");
            super::print_committed_total(store.state());
        }
        Reconciliation::KeepLocal => println!("Local snapshot is current."),
    }
    Ok(())
}

pub async fn listen(store: &mut StateStore, adapter: &SyncAdapter) -> Result<()> {
    adapter
        .listen(store, &|state: &AppState| {
            println!("Remote update adopted.");
            super::print_committed_total(state);
        })
        .await
}

pub async fn status(config: &AppConfig, adapter: &SyncAdapter, state: &AppState) -> Result<()> {
    if let Some(sync) = &config.sync {
        println!("Remote: {}", sync.base_url);
        println!(
            "Backup webhook: {}",
            sync.webhook_url.as_deref().unwrap_or("not configured")
        );
        println!("Poll interval: {}s", sync.poll_secs);
    }
    if let Some(code) = &config.access_code {
        println!("Access code: {code}");
    }

    match adapter.peek_remote().await {
        Ok(Some(remote)) => {
            if remote.content_eq(state) {
                println!(
                    "{}",
                    ui::style_text("Remote matches the local snapshot.", ui::StyleType::TotalValue)
                );
            } else {
                match reconcile(Some(state), &remote) {
                    Reconciliation::AcceptRemote => {
                        println!("Remote holds newer data; `wsnap sync pull` adopts it.");
                    }
                    Reconciliation::KeepLocal => {
                        println!("Local holds newer data; the next change pushes it.");
                    }
                }
            }
        }
        Ok(None) => println!("No remote snapshot under this access code yet."),
        Err(e) => println!(
            "{}",
            ui::style_text(&format!("Remote unreachable: {e:#}"), ui::StyleType::Error)
        ),
    }
    Ok(())
}
