use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::event::{Command, EngineEvent, FeedSnapshot, StateEvent};
use crate::host::HostBridge;
use crate::state::EngineState;
use log::warn;
use std::sync::Arc;
use tabfeed_capability::Capability;
use tabfeed_model::{LiveTab, ScrapePayload, Tip};
use tabfeed_store::SnapshotGateway;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time;

/// Handle to a running tab-feed engine. Cloneable; dropping the last
/// clone asks the engine task to shut down.
#[derive(Clone)]
pub struct TabFeedHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    event_tx: mpsc::Sender<EngineEvent>,
    update_tx: broadcast::Sender<StateEvent>,
    snapshot_rx: watch::Receiver<FeedSnapshot>,
}

impl TabFeedHandle {
    /// Hydrate from the gateway, spawn the engine task, and trigger an
    /// immediate startup reconcile.
    pub async fn start(
        host: Arc<dyn HostBridge>,
        gateway: Arc<dyn SnapshotGateway>,
        capability: Capability,
        config: EngineConfig,
    ) -> TabFeedHandle {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
        let (update_tx, _) = broadcast::channel(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::default());

        let mut state = EngineState::new(
            config,
            host,
            gateway.clone(),
            capability,
            event_tx.clone(),
            update_tx.clone(),
            snapshot_tx,
        );

        match gateway.hydrate().await {
            Ok(Some(persisted)) => state.hydrate(persisted),
            Ok(None) => {}
            Err(err) => warn!("hydration failed, starting empty: {err}"),
        }
        state.structural.force();

        tokio::spawn(run_loop(state, event_rx));

        TabFeedHandle {
            inner: Arc::new(HandleInner {
                event_tx,
                update_tx,
                snapshot_rx,
            }),
        }
    }

    async fn send(&self, event: EngineEvent) -> Result<()> {
        self.inner
            .event_tx
            .send(event)
            .await
            .map_err(|_| EngineError::EngineStopped)
    }

    async fn send_host_command(
        &self,
        make: impl FnOnce(oneshot::Sender<std::result::Result<(), crate::host::HostError>>) -> Command,
    ) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineEvent::Command(make(reply_tx))).await?;
        reply_rx
            .await
            .map_err(|_| EngineError::EngineStopped)?
            .map_err(EngineError::from)
    }

    // --- host lifecycle intake ---

    pub async fn tab_created(&self, tab: LiveTab) -> Result<()> {
        self.send(EngineEvent::TabCreated(tab)).await
    }

    pub async fn tab_updated(&self, tab: LiveTab) -> Result<()> {
        self.send(EngineEvent::TabUpdated(tab)).await
    }

    pub async fn tab_moved(&self, tab_id: i64, window_id: i64, to_index: i32) -> Result<()> {
        self.send(EngineEvent::TabMoved {
            tab_id,
            window_id,
            to_index,
        })
        .await
    }

    pub async fn tab_removed(&self, tab_id: i64) -> Result<()> {
        self.send(EngineEvent::TabRemoved { tab_id }).await
    }

    // --- content & network intake ---

    pub async fn push_scrape(&self, payload: ScrapePayload) -> Result<()> {
        self.send(EngineEvent::Scrape(payload)).await
    }

    pub async fn network_request(
        &self,
        tab_id: i64,
        third_party: bool,
        tracker: bool,
    ) -> Result<()> {
        self.send(EngineEvent::NetworkRequest {
            tab_id,
            third_party,
            tracker,
        })
        .await
    }

    pub async fn mixed_content(&self, tab_id: i64) -> Result<()> {
        self.send(EngineEvent::MixedContent { tab_id }).await
    }

    pub async fn reading_time(&self, tab_id: i64, minutes: u32) -> Result<()> {
        self.send(EngineEvent::ReadingTime { tab_id, minutes }).await
    }

    // --- bundle commands ---

    pub async fn create_bundle(&self, title: impl Into<String>, tab_ids: Vec<i64>) -> Result<()> {
        self.send(EngineEvent::Command(Command::CreateBundle {
            title: title.into(),
            tab_ids,
        }))
        .await
    }

    pub async fn add_tab_to_bundle(&self, bundle_id: impl Into<String>, tab_id: i64) -> Result<()> {
        self.send(EngineEvent::Command(Command::AddTabToBundle {
            bundle_id: bundle_id.into(),
            tab_id,
        }))
        .await
    }

    pub async fn remove_tab_from_bundle(
        &self,
        bundle_id: impl Into<String>,
        tab_id: Option<i64>,
        url: Option<String>,
    ) -> Result<()> {
        self.send(EngineEvent::Command(Command::RemoveTabFromBundle {
            bundle_id: bundle_id.into(),
            tab_id,
            url,
        }))
        .await
    }

    pub async fn delete_bundle(&self, bundle_id: impl Into<String>) -> Result<()> {
        self.send(EngineEvent::Command(Command::DeleteBundle {
            bundle_id: bundle_id.into(),
        }))
        .await
    }

    pub async fn update_bundle_meta(
        &self,
        bundle_id: impl Into<String>,
        summary: Option<String>,
        tips: Vec<Tip>,
    ) -> Result<()> {
        self.send(EngineEvent::Command(Command::UpdateBundleMeta {
            bundle_id: bundle_id.into(),
            summary,
            tips,
        }))
        .await
    }

    pub async fn save_bundle_and_close(&self, bundle_id: impl Into<String>) -> Result<()> {
        self.send(EngineEvent::Command(Command::SaveBundleAndClose {
            bundle_id: bundle_id.into(),
        }))
        .await
    }

    pub async fn ask_question(
        &self,
        bundle_id: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<()> {
        self.send(EngineEvent::Command(Command::AskQuestion {
            bundle_id: bundle_id.into(),
            question: question.into(),
        }))
        .await
    }

    // --- host mutation commands (with failure reporting) ---

    pub async fn focus_tab(&self, tab_id: i64, window_id: i64) -> Result<()> {
        self.send_host_command(|reply| Command::FocusTab {
            tab_id,
            window_id,
            reply: Some(reply),
        })
        .await
    }

    pub async fn close_tab(&self, tab_id: i64) -> Result<()> {
        self.send_host_command(|reply| Command::CloseTab {
            tab_id,
            reply: Some(reply),
        })
        .await
    }

    pub async fn toggle_pin(&self, tab_id: i64) -> Result<()> {
        self.send_host_command(|reply| Command::TogglePin {
            tab_id,
            reply: Some(reply),
        })
        .await
    }

    pub async fn request_rescrape(&self, tab_id: i64) -> Result<()> {
        self.send(EngineEvent::Command(Command::Rescrape { tab_id }))
            .await
    }

    /// Force a full reconcile on the next loop turn.
    pub async fn reconcile_now(&self) -> Result<()> {
        self.send(EngineEvent::Command(Command::Reconcile)).await
    }

    // --- outbound ---

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.update_tx.subscribe()
    }

    /// Latest broadcast state. Cheap; reads the watch channel.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.snapshot_rx.borrow().clone()
    }

    pub async fn shutdown(&self) {
        let _ = self.send(EngineEvent::Shutdown).await;
    }
}

impl Drop for TabFeedHandle {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.event_tx.try_send(EngineEvent::Shutdown);
        }
    }
}

/// The engine task: one `select!` loop over inbound events and the four
/// debounce deadlines. Handlers run to completion before the next event
/// is taken, so every store mutation is serialized here.
async fn run_loop(mut state: EngineState, mut event_rx: mpsc::Receiver<EngineEvent>) {
    loop {
        let structural_deadline = state.structural.next_deadline();
        let content_deadline = state.content.next_deadline();
        let suggest_deadline = state.suggest.next_deadline();
        let stats_deadline = state.stats.next_deadline();

        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        if !state.handle_event(event).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            () = sleep_until(structural_deadline),
                if state.structural.should_run() && structural_deadline.is_some() =>
            {
                state.structural.reset();
                state.fire_structural().await;
            }
            () = sleep_until(content_deadline),
                if state.content.should_run() && content_deadline.is_some() =>
            {
                state.content.reset();
                state.fire_content().await;
            }
            () = sleep_until(suggest_deadline),
                if state.suggest.should_run() && suggest_deadline.is_some() =>
            {
                state.suggest.reset();
                state.fire_suggest().await;
            }
            () = sleep_until(stats_deadline),
                if state.stats.should_run() && stats_deadline.is_some() =>
            {
                state.stats.reset();
                state.fire_stats().await;
            }
        }
    }
}

async fn sleep_until(deadline: Option<time::Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
