//! Background Tasks Module
//!
//! Contains the adaptive reclamation task that evicts idle cache entries
//! based on system memory pressure.

mod reclaim;

pub use reclaim::{spawn_reclaim_task, Reclaimer};
