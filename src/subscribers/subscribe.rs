//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! supervisor.
//!
//! ## Contract
//! - Handlers run **synchronously on the faulting thread**, usually from inside
//!   the panic hook. They must be quick and must not panic: a panic raised while
//!   the hook is running aborts the process.
//! - Handlers must not block on work owned by the primary context; that context
//!   may be the one that is faulting.

use crate::events::Event;

/// Contract for event subscribers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
