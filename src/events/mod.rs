//! Fault-handling events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish runtime events emitted by the fault interceptor, the report writer
//! and the recovery loop.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `core::interceptor` (panic hook), `ReportWriter::persist`,
//!   `RecoveryLoop`, `SupervisorBuilder::install`.
//! - **Consumers**: every [`Subscribe`](crate::Subscribe) in the
//!   [`SubscriberSet`](crate::SubscriberSet) (inline, on the faulting thread),
//!   plus any receiver obtained from [`Supervisor::subscribe`](crate::Supervisor::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
