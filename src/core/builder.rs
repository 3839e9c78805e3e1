use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};
use crate::policies::ResumePolicy;
use crate::report::{FsStorage, ReportWriter, Storage};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::{config::SupervisorConfig, context::ContextId, interceptor, supervisor::Supervisor};

/// Builder for configuring and installing a [`Supervisor`].
///
/// Every setting is fixed once [`install`](Self::install) runs; to change the
/// configuration later, call [`Supervisor::reconfigure`] and install again.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    storage: Option<Arc<dyn Storage>>,
    primary: Option<ContextId>,
    bus: Option<Bus>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    ///
    /// Storage defaults to [`FsStorage::platform_default`]. The primary context
    /// defaults to the primary of the active supervisor, so re-installing from
    /// a worker thread keeps it; with nothing installed it is the thread that
    /// calls [`build`](Self::build) / [`install`](Self::install).
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            storage: None,
            primary: None,
            bus: None,
        }
    }

    /// Enables or disables report persistence.
    pub fn persist_faults(mut self, enabled: bool) -> Self {
        self.cfg.persist_faults = enabled;
        self
    }

    /// Enables or disables recovery of the primary context.
    pub fn recover_primary_context(mut self, enabled: bool) -> Self {
        self.cfg.recover_primary_context = enabled;
        self
    }

    /// Enables or disables forced backtrace capture.
    pub fn capture_backtrace(mut self, enabled: bool) -> Self {
        self.cfg.capture_backtrace = enabled;
        self
    }

    /// Sets the artifact name prefix.
    pub fn report_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cfg.report_prefix = prefix.into();
        self
    }

    /// Sets the pause policy between primary faults and re-entry.
    pub fn resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.cfg.resume = policy;
        self
    }

    /// Sets additional event subscribers.
    ///
    /// The built-in [`LogWriter`](crate::LogWriter) always runs first and cannot be removed.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the storage reports are written to.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the primary execution context explicitly instead of inheriting it.
    pub fn with_primary(mut self, primary: ContextId) -> Self {
        self.primary = Some(primary);
        self
    }

    pub(crate) fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the supervisor without activating it.
    ///
    /// A supervisor that is not installed can still run
    /// [`run_primary`](Supervisor::run_primary); faults are then recorded by
    /// the recovery loop after they are caught.
    pub fn build(self) -> Supervisor {
        let bus = self
            .bus
            .unwrap_or_else(|| Bus::new(self.cfg.bus_capacity_clamped()));
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(FsStorage::platform_default()) as Arc<dyn Storage>);
        let writer = ReportWriter::new(Arc::clone(&storage), self.cfg.report_prefix());

        Supervisor {
            primary: self
                .primary
                .or_else(|| interceptor::active().map(|sup| sup.primary()))
                .unwrap_or_else(ContextId::current),
            writer,
            storage,
            subs: SubscriberSet::new(self.subscribers, bus),
            cfg: self.cfg,
        }
    }

    /// Builds the supervisor and makes it the process-wide fault handler.
    ///
    /// Calling `install` again (from any builder) replaces the active
    /// supervisor: last writer wins, the panic hook is never stacked.
    pub fn install(self) -> Arc<Supervisor> {
        let sup = Arc::new(self.build());
        interceptor::register(Arc::clone(&sup));
        sup.emit(Event::new(EventKind::Installed).with_context(sup.primary()));
        sup
    }
}
