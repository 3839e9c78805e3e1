//! Diagnostic reports: rendering and durable persistence of faults.
//!
//! ## Contents
//! - [`ReportWriter`] names, renders and writes one report per fault
//! - [`Storage`] the storage collaborator (directory, availability, bytes)
//! - [`FsStorage`] the default filesystem-backed storage
//!
//! ## Artifact format
//! ```text
//! <dir>/crashErrorInfo2026-10-19-10-22-01.txt
//!        └─ prefix ──┘└─ yyyy-MM-dd-HH-mm-ss ┘
//! ```
//! Content is [`Fault::render`](crate::Fault::render). Two faults in the same
//! second share a name; the later write overwrites the earlier one.

mod storage;
mod writer;

pub use storage::{FsStorage, Storage};
pub use writer::{ReportOutcome, ReportWriter};
