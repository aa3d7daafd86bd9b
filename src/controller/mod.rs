//! Controllers for mcsync
//!
//! The stale resource controller is the only one in this crate; the import
//! and export controllers it backs up live with the connectivity layer.

mod stale;

pub use stale::{
    stale_exports, stale_objects, CleanupReport, SkipReason, StaleController,
    StaleControllerConfig, StaleKind, DEFAULT_CALL_TIMEOUT, DEFAULT_LEADER_POLL_INTERVAL,
    DEFAULT_RESYNC_INTERVAL,
};
