//! # Inline event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] delivers each [`Event`] to the built-in [`LogWriter`], then
//! to every registered subscriber in registration order, then publishes it on
//! the [`Bus`]. The log writer is not part of the replaceable list, so a fault
//! is logged whatever subscribers the host configures.
//!
//! ## Rules
//! - **Inline**: `emit()` runs every subscriber on the caller's thread before
//!   returning, so "logged" always happens-before the next step of fault handling.
//! - **Global order**: all subscribers observe events in `emit` order.
//! - **Isolation**: outside the panic hook a panicking subscriber is caught and
//!   reported through `tracing`; the remaining subscribers still run. Inside the
//!   hook the runtime aborts on a nested panic, see [`Subscribe`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::{Bus, Event};
use crate::fault::payload_message;

use super::{LogWriter, Subscribe};

/// Ordered fan-out over subscribers plus the broadcast bus.
pub struct SubscriberSet {
    log: LogWriter,
    subs: Vec<Arc<dyn Subscribe>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set over `subs`, republishing every event on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        Self {
            log: LogWriter::new(),
            subs,
            bus,
        }
    }

    /// Delivers `event` to the log writer and all subscribers, then to the bus.
    pub fn emit(&self, event: Event) {
        deliver(&self.log, &event);
        for sub in &self.subs {
            deliver(&**sub, &event);
        }
        self.bus.publish(event);
    }

    /// Broadcast bus behind this set.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Registered subscribers, in delivery order (the built-in log writer excluded).
    pub fn subscribers(&self) -> &[Arc<dyn Subscribe>] {
        &self.subs
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Whether no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

fn deliver(sub: &dyn Subscribe, event: &Event) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(event)));
    if let Err(payload) = delivered {
        tracing::error!(
            target: "faultvisor",
            subscriber = sub.name(),
            info = %payload_message(payload.as_ref()),
            "subscriber panicked"
        );
    }
}
