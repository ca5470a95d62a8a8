#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tabfeed_capability::{CapabilityError, Result as CapResult, TextCapability};
use tabfeed_engine::{HostBridge, HostError, HostResult};
use tabfeed_model::LiveTab;
use tabfeed_store::{PersistedState, Result as StoreResult, SnapshotGateway};

pub fn live_tab(id: i64, url: &str, title: &str) -> LiveTab {
    LiveTab {
        id,
        window_id: 1,
        index: id as i32,
        url: url.to_string(),
        title: title.to_string(),
        favicon_url: String::new(),
        pinned: false,
        audible: false,
    }
}

/// Host fake: a settable live-tab list plus call recording.
pub struct FakeHost {
    tabs: Mutex<Vec<LiveTab>>,
    fail_listing: AtomicBool,
    pub closed: Mutex<Vec<i64>>,
    pub rescrapes: Mutex<Vec<i64>>,
}

impl FakeHost {
    pub fn new(tabs: Vec<LiveTab>) -> Arc<Self> {
        Arc::new(Self {
            tabs: Mutex::new(tabs),
            fail_listing: AtomicBool::new(false),
            closed: Mutex::new(Vec::new()),
            rescrapes: Mutex::new(Vec::new()),
        })
    }

    pub fn set_tabs(&self, tabs: Vec<LiveTab>) {
        *self.tabs.lock().unwrap() = tabs;
    }

    pub fn set_listing_fails(&self, fails: bool) {
        self.fail_listing.store(fails, Ordering::SeqCst);
    }

    pub fn closed_tabs(&self) -> Vec<i64> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostBridge for FakeHost {
    async fn list_tabs(&self) -> HostResult<Vec<LiveTab>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(HostError::Query("simulated listing failure".to_string()));
        }
        Ok(self.tabs.lock().unwrap().clone())
    }

    async fn focus_tab(&self, tab_id: i64, _window_id: i64) -> HostResult<()> {
        let tabs = self.tabs.lock().unwrap();
        if tabs.iter().any(|t| t.id == tab_id) {
            Ok(())
        } else {
            Err(HostError::TabGone(tab_id))
        }
    }

    async fn close_tab(&self, tab_id: i64) -> HostResult<()> {
        let mut tabs = self.tabs.lock().unwrap();
        let before = tabs.len();
        tabs.retain(|t| t.id != tab_id);
        if tabs.len() == before {
            return Err(HostError::TabGone(tab_id));
        }
        self.closed.lock().unwrap().push(tab_id);
        Ok(())
    }

    async fn set_pinned(&self, tab_id: i64, pinned: bool) -> HostResult<()> {
        let mut tabs = self.tabs.lock().unwrap();
        match tabs.iter_mut().find(|t| t.id == tab_id) {
            Some(tab) => {
                tab.pinned = pinned;
                Ok(())
            }
            None => Err(HostError::TabGone(tab_id)),
        }
    }

    async fn request_rescrape(&self, tab_id: i64) -> HostResult<()> {
        self.rescrapes.lock().unwrap().push(tab_id);
        Ok(())
    }
}

/// In-memory persistence gateway with write accounting.
#[derive(Default)]
pub struct MemoryGateway {
    pub state: Mutex<Option<PersistedState>>,
    pub persist_count: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(state: PersistedState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(Some(state)),
            persist_count: AtomicUsize::new(0),
        })
    }

    pub fn persisted(&self) -> Option<PersistedState> {
        self.state.lock().unwrap().clone()
    }

    pub fn persists(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotGateway for MemoryGateway {
    async fn persist(&self, state: &PersistedState) -> StoreResult<()> {
        *self.state.lock().unwrap() = Some(state.clone());
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn hydrate(&self) -> StoreResult<Option<PersistedState>> {
        Ok(self.state.lock().unwrap().clone())
    }
}

/// Capability fake routing on instruction text, with per-kind call
/// counters. Individual responses can be swapped per test.
pub struct ScriptedCapability {
    pub summarize_calls: AtomicUsize,
    pub classify_calls: AtomicUsize,
    pub entities_calls: AtomicUsize,
    pub cluster_calls: AtomicUsize,
    pub tips_calls: AtomicUsize,
    pub answer_calls: AtomicUsize,
    pub cluster_response: Mutex<String>,
    pub tips_response: Mutex<String>,
    pub answer_response: Mutex<String>,
}

impl ScriptedCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            summarize_calls: AtomicUsize::new(0),
            classify_calls: AtomicUsize::new(0),
            entities_calls: AtomicUsize::new(0),
            cluster_calls: AtomicUsize::new(0),
            tips_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            cluster_response: Mutex::new("[]".to_string()),
            tips_response: Mutex::new("not json".to_string()),
            answer_response: Mutex::new("**The answer.**".to_string()),
        })
    }

    pub fn set_cluster_response(&self, raw: &str) {
        *self.cluster_response.lock().unwrap() = raw.to_string();
    }

    pub fn set_tips_response(&self, raw: &str) {
        *self.tips_response.lock().unwrap() = raw.to_string();
    }
}

#[async_trait]
impl TextCapability for ScriptedCapability {
    async fn generate(&self, instruction: &str, _input: &str) -> CapResult<String> {
        if instruction.contains("bundle of related tabs") {
            return Ok("- bundle synthesis".to_string());
        }
        if instruction.contains("page text") {
            self.summarize_calls.fetch_add(1, Ordering::SeqCst);
            return Ok("- a generated tl;dr".to_string());
        }
        if instruction.contains("Classify") {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(r#"["Technology"]"#.to_string());
        }
        if instruction.contains("named entities") {
            self.entities_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(r#"{"people":["Ada Lovelace"],"orgs":[],"places":[]}"#.to_string());
        }
        if instruction.contains("thematic bundles") {
            self.cluster_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.cluster_response.lock().unwrap().clone());
        }
        if instruction.contains("actionable next steps") {
            self.tips_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.tips_response.lock().unwrap().clone());
        }
        if instruction.contains("Answer the user's question") {
            self.answer_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.answer_response.lock().unwrap().clone());
        }
        Err(CapabilityError::Failed(format!(
            "unscripted instruction: {instruction}"
        )))
    }
}

/// A page body comfortably above the enrichment threshold.
pub fn long_text() -> String {
    "This page has a meaningful amount of extracted article text, long enough \
     to clear the minimum content threshold used by the enrichment pipelines."
        .to_string()
}
