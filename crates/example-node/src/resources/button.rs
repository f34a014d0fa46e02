//! `sensors/button`: how often the local button has been pressed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rd_node_sdk::{
    ContentFormat, Method, Request, Resource, ResourceContext, ResourceError, ResourceResult,
    Response, ResponseCode,
};

/// Press counter shared between the trigger sources and the resource.
#[derive(Clone, Default)]
pub struct PressCounter(Arc<AtomicU64>);

impl PressCounter {
    /// Record one press; returns the new total.
    pub fn record(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct ButtonCount {
    presses: PressCounter,
}

impl ButtonCount {
    pub fn new(presses: PressCounter) -> Self {
        Self { presses }
    }
}

#[async_trait::async_trait]
impl Resource for ButtonCount {
    async fn handle(&self, _ctx: ResourceContext, request: Request) -> ResourceResult {
        if request.method != Method::Get {
            return Err(ResourceError::MethodNotAllowed);
        }
        Ok(Response::new(ResponseCode::CONTENT)
            .with_payload(ContentFormat::TextPlain, self.presses.get().to_string()))
    }
}
