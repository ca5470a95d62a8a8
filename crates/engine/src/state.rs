use crate::config::EngineConfig;
use crate::debounce::DebounceTimer;
use crate::event::{Command, EngineEvent, FeedSnapshot, StateEvent};
use crate::host::HostBridge;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tabfeed_bundles as bundles;
use tabfeed_capability::Capability;
use tabfeed_enrich::{run_batch, EnrichmentResult, Pipeline, PipelineKind};
use tabfeed_model::{
    now_unix_ms, Bundle, SuggestedBundle, TabItem, MIN_SUGGESTED_BUNDLE_TABS,
};
use tabfeed_stats::{compute_session_stats, RequestLog};
use tabfeed_store::{PersistedState, SnapshotGateway, TabStore};
use tokio::sync::{broadcast, mpsc, watch};

/// All mutable engine state. Owned by exactly one spawned task; every
/// handler runs to completion on that task, so no mutation ever races
/// another. Spawned work (enrichment batches, clustering passes, bundle
/// synthesis) reports back through `event_tx` and is applied against
/// whatever the state looks like at completion time.
pub(crate) struct EngineState {
    config: EngineConfig,
    host: Arc<dyn HostBridge>,
    gateway: Arc<dyn SnapshotGateway>,
    capability: Capability,

    store: TabStore,
    bundles: Vec<Bundle>,
    suggestions: Vec<SuggestedBundle>,

    summarize: Pipeline,
    classify: Pipeline,
    entities: Pipeline,
    request_log: RequestLog,

    pub(crate) structural: DebounceTimer,
    pub(crate) content: DebounceTimer,
    pub(crate) suggest: DebounceTimer,
    pub(crate) stats: DebounceTimer,

    event_tx: mpsc::Sender<EngineEvent>,
    update_tx: broadcast::Sender<StateEvent>,
    snapshot_tx: watch::Sender<FeedSnapshot>,

    rescrape_sweep_done: bool,
}

impl EngineState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: EngineConfig,
        host: Arc<dyn HostBridge>,
        gateway: Arc<dyn SnapshotGateway>,
        capability: Capability,
        event_tx: mpsc::Sender<EngineEvent>,
        update_tx: broadcast::Sender<StateEvent>,
        snapshot_tx: watch::Sender<FeedSnapshot>,
    ) -> Self {
        let structural =
            DebounceTimer::new(config.structural_debounce, config.structural_max_batch);
        let content = DebounceTimer::new(config.content_debounce, config.content_max_batch);
        let suggest = DebounceTimer::new(config.suggest_debounce, config.suggest_max_batch);
        let stats = DebounceTimer::new(config.stats_debounce, config.stats_max_batch);
        let queue_cap = config.queue_cap;
        Self {
            config,
            host,
            gateway,
            capability,
            store: TabStore::new(),
            bundles: Vec::new(),
            suggestions: Vec::new(),
            summarize: Pipeline::new(PipelineKind::Summarize, queue_cap),
            classify: Pipeline::new(PipelineKind::Classify, queue_cap),
            entities: Pipeline::new(PipelineKind::Entities, queue_cap),
            request_log: RequestLog::new(),
            structural,
            content,
            suggest,
            stats,
            event_tx,
            update_tx,
            snapshot_tx,
            rescrape_sweep_done: false,
        }
    }

    pub(crate) fn hydrate(&mut self, persisted: PersistedState) {
        self.store.seed(persisted.items);
        self.bundles = persisted.bundles;
        self.suggestions = persisted.suggested_bundles;
    }

    /// Returns `false` when the engine should stop.
    pub(crate) async fn handle_event(&mut self, event: EngineEvent) -> bool {
        let now = now_unix_ms();
        match event {
            EngineEvent::TabCreated(tab) | EngineEvent::TabUpdated(tab) => {
                self.store.upsert_live(&tab, now);
                self.structural.record();
            }
            EngineEvent::TabMoved {
                tab_id,
                window_id,
                to_index,
            } => {
                self.store.apply_move(tab_id, window_id, to_index, now);
                self.structural.record();
            }
            EngineEvent::TabRemoved { tab_id } => {
                self.drop_tab_state(tab_id);
                self.structural.record();
            }
            EngineEvent::Scrape(payload) => {
                if self.store.apply_scrape(&payload, now).is_some() {
                    self.enqueue_enrichment(payload.tab_id);
                    self.content.record();
                    self.stats.record();
                    self.suggest.record();
                    self.drain_pipelines();
                }
            }
            EngineEvent::NetworkRequest {
                tab_id,
                third_party,
                tracker,
            } => {
                self.request_log.record(tab_id, now, third_party, tracker);
                self.stats.record();
            }
            EngineEvent::MixedContent { tab_id } => {
                self.request_log.mark_mixed_content(tab_id);
                self.stats.record();
            }
            EngineEvent::ReadingTime { tab_id, minutes } => {
                if self.store.set_reading_minutes(tab_id, minutes, now) {
                    self.content.record();
                }
            }
            EngineEvent::Command(command) => self.handle_command(command).await,
            EngineEvent::BatchDone { kind, results } => self.apply_batch(kind, results),
            EngineEvent::SuggestionsReady(outcome) => {
                if let Some(suggestions) = outcome {
                    info!("Clustering pass proposed {} bundles", suggestions.len());
                    self.suggestions = suggestions;
                    self.content.record();
                }
            }
            EngineEvent::BundleMetaReady {
                bundle_id,
                summary,
                tips,
            } => {
                if let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == bundle_id) {
                    if summary.is_some() {
                        bundle.summary = summary;
                    }
                    if !tips.is_empty() {
                        bundle.tips = tips;
                    }
                    self.content.record();
                }
            }
            EngineEvent::AnswerReady {
                bundle_id,
                question,
                answer,
            } => {
                if let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == bundle_id) {
                    bundle.chat.push(tabfeed_model::ChatEntry {
                        question,
                        answer,
                        asked_at: now,
                    });
                    self.content.record();
                }
            }
            EngineEvent::Shutdown => return false,
        }
        true
    }

    async fn handle_command(&mut self, command: Command) {
        let now = now_unix_ms();
        match command {
            Command::CreateBundle { title, tab_ids } => {
                let tab_ids: Vec<i64> = tab_ids
                    .into_iter()
                    .filter(|id| self.store.contains(*id))
                    .collect();
                let bundle = bundles::new_bundle(&title, tab_ids, now);
                info!("Created bundle '{}' ({} tabs)", bundle.title, bundle.tab_ids.len());
                self.spawn_bundle_meta(&bundle);
                self.bundles.push(bundle);
                self.suggestions.clear();
                self.broadcast().await;
                self.suggest.record();
            }
            Command::AddTabToBundle { bundle_id, tab_id } => {
                if !self.store.contains(tab_id) {
                    debug!("add to bundle ignored: tab {tab_id} not in store");
                    return;
                }
                let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == bundle_id) else {
                    return;
                };
                if !bundle.tab_ids.contains(&tab_id) {
                    bundle.tab_ids.push(tab_id);
                    self.broadcast().await;
                }
            }
            Command::RemoveTabFromBundle {
                bundle_id,
                tab_id,
                url,
            } => {
                let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == bundle_id) else {
                    return;
                };
                if bundles::remove_member(bundle, tab_id, url.as_deref()) {
                    self.broadcast().await;
                }
            }
            Command::DeleteBundle { bundle_id } => {
                let before = self.bundles.len();
                self.bundles.retain(|b| b.id != bundle_id);
                if self.bundles.len() != before {
                    self.broadcast().await;
                }
            }
            Command::UpdateBundleMeta {
                bundle_id,
                summary,
                tips,
            } => {
                let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == bundle_id) else {
                    return;
                };
                if summary.is_some() {
                    bundle.summary = summary;
                }
                if !tips.is_empty() {
                    bundle.tips = tips;
                }
                self.broadcast().await;
            }
            Command::SaveBundleAndClose { bundle_id } => {
                self.save_bundle_and_close(&bundle_id).await;
            }
            Command::AskQuestion {
                bundle_id,
                question,
            } => {
                let Some(bundle) = self.bundles.iter().find(|b| b.id == bundle_id) else {
                    return;
                };
                let members = self.resolve_members(bundle);
                let bundle = bundle.clone();
                let capability = self.capability.clone();
                let timeout = self.config.answer_timeout;
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let Some(answer) =
                        bundles::answer_question(&capability, &bundle, &members, &question, timeout)
                            .await
                    else {
                        return;
                    };
                    let _ = event_tx
                        .send(EngineEvent::AnswerReady {
                            bundle_id: bundle.id,
                            question,
                            answer,
                        })
                        .await;
                });
            }
            Command::FocusTab {
                tab_id,
                window_id,
                reply,
            } => {
                let result = self.host.focus_tab(tab_id, window_id).await;
                if let Err(err) = &result {
                    warn!("focus tab {tab_id} failed: {err}");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            Command::CloseTab { tab_id, reply } => {
                let result = self.host.close_tab(tab_id).await;
                match &result {
                    Ok(()) => self.structural.record(),
                    Err(err) => warn!("close tab {tab_id} failed: {err}"),
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            Command::TogglePin { tab_id, reply } => {
                let pinned = self.store.get(tab_id).map(|item| item.pinned).unwrap_or(false);
                let result = self.host.set_pinned(tab_id, !pinned).await;
                match &result {
                    Ok(()) => self.structural.record(),
                    Err(err) => warn!("pin toggle for tab {tab_id} failed: {err}"),
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            Command::Rescrape { tab_id } => {
                if let Err(err) = self.host.request_rescrape(tab_id).await {
                    debug!("rescrape request for tab {tab_id} failed: {err}");
                }
            }
            Command::Reconcile => self.structural.force(),
        }
    }

    /// Full resync against the host's authoritative tab list, then
    /// persist + notify. A host query failure skips the whole cycle
    /// with no partial mutation; the next trigger retries fully.
    pub(crate) async fn fire_structural(&mut self) {
        let live = match self.host.list_tabs().await {
            Ok(live) => live,
            Err(err) => {
                warn!("reconcile skipped this cycle: {err}");
                return;
            }
        };
        let now = now_unix_ms();

        // Adds and updates strictly before the prune.
        let mut live_ids = HashSet::new();
        for tab in &live {
            if self.store.upsert_live(tab, now) {
                live_ids.insert(tab.id);
            }
        }
        let removed = self.store.retain_live(&live_ids);
        for tab_id in removed {
            self.forget_tab(tab_id);
        }

        if !self.rescrape_sweep_done {
            self.rescrape_sweep_done = true;
            for tab_id in &live_ids {
                if let Err(err) = self.host.request_rescrape(*tab_id).await {
                    debug!("startup rescrape for tab {tab_id} failed: {err}");
                }
            }
        }

        // Navigation may have changed urls/titles; let the dispatch
        // gate decide what actually needs re-enrichment.
        let ids: Vec<i64> = self.store.ids().into_iter().collect();
        for tab_id in ids {
            self.enqueue_enrichment(tab_id);
        }

        self.broadcast().await;
        self.stats.record();
        self.suggest.record();
        self.drain_pipelines();
    }

    /// Content-tier flush: persist + notify without a host resync.
    pub(crate) async fn fire_content(&mut self) {
        self.broadcast().await;
    }

    pub(crate) async fn fire_suggest(&mut self) {
        let items: Vec<TabItem> = self.store.iter().cloned().collect();
        let eligible = bundles::eligible_items(&items).len();
        if eligible < MIN_SUGGESTED_BUNDLE_TABS {
            if !self.suggestions.is_empty() {
                self.suggestions.clear();
                self.content.record();
            }
            return;
        }
        let titles: Vec<String> = self.bundles.iter().map(|b| b.title.clone()).collect();
        let capability = self.capability.clone();
        let timeout = self.config.cluster_timeout;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = bundles::propose_bundles(&capability, &items, &titles, timeout).await;
            let _ = event_tx.send(EngineEvent::SuggestionsReady(outcome)).await;
        });
    }

    pub(crate) async fn fire_stats(&mut self) {
        let items: Vec<TabItem> = self.store.iter().cloned().collect();
        let stats = compute_session_stats(&items, &self.request_log, now_unix_ms());
        let _ = self.update_tx.send(StateEvent::StatsUpdated(stats));
    }

    /// Sorted visible list → persisted snapshot → notify. Persist
    /// failures are logged and not retried here; the next natural
    /// trigger re-attempts with newer state.
    async fn broadcast(&mut self) {
        let items = self.store.sorted_for_display();
        let snapshot = FeedSnapshot {
            items,
            bundles: self.bundles.clone(),
            suggested_bundles: self.suggestions.clone(),
        };
        let state = PersistedState::new(
            snapshot.items.clone(),
            snapshot.bundles.clone(),
            snapshot.suggested_bundles.clone(),
        );
        if let Err(err) = self.gateway.persist(&state).await {
            warn!("snapshot persist failed: {err}");
        }
        let open_tabs = snapshot.items.len();
        let _ = self.snapshot_tx.send(snapshot);
        let _ = self.update_tx.send(StateEvent::StateChanged { open_tabs });
    }

    fn enqueue_enrichment(&mut self, tab_id: i64) {
        self.summarize.queue.push(tab_id);
        self.classify.queue.push(tab_id);
        self.entities.queue.push(tab_id);
    }

    fn drain_pipelines(&mut self) {
        for kind in PipelineKind::ALL {
            self.maybe_drain(kind);
        }
    }

    /// Start a batch for one pipeline unless one is already in flight.
    /// The dispatch gate re-checks eligibility, target-field state, and
    /// the signature against the *current* store record, so anything
    /// queued twice without a change collapses to a single invocation.
    fn maybe_drain(&mut self, kind: PipelineKind) {
        let pipeline = match kind {
            PipelineKind::Summarize => &mut self.summarize,
            PipelineKind::Classify => &mut self.classify,
            PipelineKind::Entities => &mut self.entities,
        };
        if pipeline.running {
            return;
        }
        let mut batch: Vec<TabItem> = Vec::new();
        while batch.len() < self.config.batch_size {
            let Some(tab_id) = pipeline.queue.pop() else {
                break;
            };
            let Some(item) = self.store.get(tab_id) else {
                continue;
            };
            if pipeline.admit(item).is_ok() {
                batch.push(item.clone());
            }
        }
        if batch.is_empty() {
            return;
        }
        pipeline.running = true;
        debug!("{}: dispatching batch of {}", kind.as_str(), batch.len());

        let capability = self.capability.clone();
        let enrich_config = self.config.enrich;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let results = run_batch(capability, kind, batch, enrich_config).await;
            let _ = event_tx.send(EngineEvent::BatchDone { kind, results }).await;
        });
    }

    /// Fold a completed batch into current state. Tabs removed while
    /// the batch was in flight are skipped by the store setters.
    fn apply_batch(&mut self, kind: PipelineKind, results: Vec<(i64, EnrichmentResult)>) {
        let now = now_unix_ms();
        let mut applied = 0u64;
        let mut failed = 0u64;
        for (tab_id, result) in results {
            let ok = match result {
                EnrichmentResult::Summary(summary) => self.store.set_summary(tab_id, summary, now),
                EnrichmentResult::Categories(categories) => {
                    self.store.set_categories(tab_id, categories, now)
                }
                EnrichmentResult::Entities(entities) => {
                    self.store.set_entities(tab_id, entities, now)
                }
                EnrichmentResult::Failed => {
                    failed += 1;
                    continue;
                }
            };
            if ok {
                applied += 1;
            }
        }

        let pipeline = match kind {
            PipelineKind::Summarize => &mut self.summarize,
            PipelineKind::Classify => &mut self.classify,
            PipelineKind::Entities => &mut self.entities,
        };
        pipeline.running = false;
        pipeline.queue.stats_mut().completed += applied;
        pipeline.queue.stats_mut().failed += failed;
        if failed > 0 {
            debug!("{}: {failed} jobs failed (kept prior fields)", kind.as_str());
        }

        if applied > 0 {
            self.content.record();
            self.stats.record();
        }
        // New categories/summaries change clustering signals either way.
        self.suggest.record();
        self.maybe_drain(kind);
    }

    async fn save_bundle_and_close(&mut self, bundle_id: &str) {
        let Some(index) = self.bundles.iter().position(|b| b.id == bundle_id) else {
            return;
        };
        let member_ids = self.bundles[index].tab_ids.clone();
        let members: Vec<TabItem> = member_ids
            .iter()
            .filter_map(|id| self.store.get(*id).cloned())
            .collect();
        bundles::archive_members(&mut self.bundles[index], members);
        info!("Archived bundle '{}'", self.bundles[index].title);
        self.broadcast().await;

        for tab_id in member_ids {
            if let Err(err) = self.host.close_tab(tab_id).await {
                warn!("closing tab {tab_id} for archived bundle failed: {err}");
            }
        }
        self.structural.force();
    }

    fn spawn_bundle_meta(&self, bundle: &Bundle) {
        let members = self.resolve_members(bundle);
        let capability = self.capability.clone();
        let timeout = self.config.bundle_meta_timeout;
        let event_tx = self.event_tx.clone();
        let bundle_id = bundle.id.clone();
        let title = bundle.title.clone();
        tokio::spawn(async move {
            let summary =
                bundles::generate_summary(&capability, &title, &members, timeout).await;
            let context = bundles::build_context(&members);
            let tips = bundles::generate_tips(&capability, &title, &context, timeout).await;
            let _ = event_tx
                .send(EngineEvent::BundleMetaReady {
                    bundle_id,
                    summary,
                    tips,
                })
                .await;
        });
    }

    fn resolve_members(&self, bundle: &Bundle) -> Vec<TabItem> {
        bundle
            .tab_ids
            .iter()
            .filter_map(|id| self.store.get(*id).cloned())
            .collect()
    }

    /// Eager removal on a host "removed" event; the next reconcile
    /// confirms against the live set either way.
    fn drop_tab_state(&mut self, tab_id: i64) {
        self.store.remove(tab_id);
        self.forget_tab(tab_id);
    }

    fn forget_tab(&mut self, tab_id: i64) {
        self.summarize.forget(tab_id);
        self.classify.forget(tab_id);
        self.entities.forget(tab_id);
        self.request_log.forget(tab_id);
    }
}
