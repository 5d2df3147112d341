//! Cooperative cancellation. The Directive Engine checks this at least
//! once per element visited and once per `v-for` iteration (§5); there is
//! no preemption, only these checkpoints.

use crate::error::{ErrorContext, RenderError, RenderResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self, ctx: ErrorContext) -> RenderResult<()> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled(ctx))
        } else {
            Ok(())
        }
    }
}
