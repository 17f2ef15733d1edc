use serde::Deserialize;
use std::time::Duration;

/// Engine configuration consumed by the wiring outside the core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Restricts which content types load from the catalog; `None` loads
    /// everything.
    pub content_ids: Option<Vec<i64>>,
    /// Enables the background reload timer.
    pub schema_auto_reload: bool,
    pub schema_reload_interval_seconds: u64,
    /// Enables the far-side page-info probe query.
    pub calculate_paging_data: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            content_ids: None,
            schema_auto_reload: false,
            schema_reload_interval_seconds: 600,
            calculate_paging_data: false,
        }
    }
}

impl EngineSettings {
    pub fn schema_reload_interval(&self) -> Duration {
        Duration::from_secs(self.schema_reload_interval_seconds)
    }
}
