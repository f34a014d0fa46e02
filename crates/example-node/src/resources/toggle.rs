//! `actuators/toggle`: flips the (simulated) red LED on every POST.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rd_node_sdk::{
    Method, Request, Resource, ResourceContext, ResourceError, ResourceResult, Response,
    ResponseCode,
};

/// Shared LED state.
#[derive(Clone, Default)]
pub struct Led(Arc<AtomicBool>);

impl Led {
    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Flip the LED and return the new state.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}

pub struct Toggle {
    led: Led,
}

impl Toggle {
    pub fn new(led: Led) -> Self {
        Self { led }
    }
}

#[async_trait::async_trait]
impl Resource for Toggle {
    async fn handle(&self, _ctx: ResourceContext, request: Request) -> ResourceResult {
        if request.method != Method::Post {
            return Err(ResourceError::MethodNotAllowed);
        }
        let on = self.led.toggle();
        tracing::info!(led = if on { "on" } else { "off" }, "red LED toggled");
        Ok(Response::new(ResponseCode::CHANGED))
    }
}
