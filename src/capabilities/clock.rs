//! System-time capability.

use async_trait::async_trait;
use chrono::Local;

use crate::models::entry::{CapabilityRequest, Entry};
use crate::models::state::StatePatch;
use crate::Result;

use super::{Capability, ScratchContext};

/// Scratch slot holding the most recent time reading.
pub const RESULT_SLOT: &str = "check_system_time_result";

/// Reports the current wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckSystemTime;

#[async_trait]
impl Capability for CheckSystemTime {
    fn name(&self) -> &str {
        "check_system_time"
    }

    fn description(&self) -> &str {
        "Use this capability to check the system time. Arguments: none. Output: the current system time."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn invoke(
        &self,
        request: &CapabilityRequest,
        _context: &ScratchContext,
    ) -> Result<StatePatch> {
        let content = Local::now().format("%H:%M").to_string();

        Ok(StatePatch::message(Entry::tool(content.as_str(), request.call_id.as_str()))
            .with_scratch(RESULT_SLOT, serde_json::Value::String(content))
            .with_tool_used(self.name()))
    }
}
