//! Scan capability seam

use async_trait::async_trait;
use serde_json::Value;

use crate::error::E2eResult;
use crate::spec::PageTarget;

/// Loads a page and returns the scan engine's raw result payload.
///
/// The payload is left loosely typed; [`accesslens_common::normalize`] is the
/// only consumer allowed to look inside it.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, target: &PageTarget) -> E2eResult<Value>;
}
