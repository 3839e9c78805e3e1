//! Supervisor core: installation, fault interception and primary recovery.
//!
//! The public API from this module is [`Supervisor`], its builder, its
//! configuration and [`ContextId`].
//!
//! Internal modules:
//! - [`interceptor`]: the process-wide panic hook and per-fault protocol;
//! - [`recovery`]: the restart loop around the primary dispatch mechanism;
//! - [`supervisor`]: the installed snapshot and its public operations;
//! - [`builder`]: configuration chaining and `install()`.

mod builder;
mod config;
mod context;
mod interceptor;
mod recovery;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::{DEFAULT_REPORT_PREFIX, SupervisorConfig};
pub use context::ContextId;
pub use supervisor::Supervisor;

pub(crate) use interceptor::clear_verdict;
