use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabfeed_model::{Bundle, SuggestedBundle, TabItem};

pub const STATE_SCHEMA_VERSION: u32 = 1;

/// The single document persisted at the gateway. Fully overwritten on
/// every broadcast; read once at process start to seed the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersistedState {
    pub schema_version: u32,
    #[serde(default)]
    pub items: Vec<TabItem>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub suggested_bundles: Vec<SuggestedBundle>,
}

impl PersistedState {
    #[must_use]
    pub fn new(
        items: Vec<TabItem>,
        bundles: Vec<Bundle>,
        suggested_bundles: Vec<SuggestedBundle>,
    ) -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            items,
            bundles,
            suggested_bundles,
        }
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}
