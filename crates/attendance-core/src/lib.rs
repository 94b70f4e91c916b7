//! Attendance point accumulation, corrective-action recommendations and the
//! roster/backup plumbing around them.

pub mod backup;
pub mod config;
pub mod export;
pub mod policy;
pub mod report;
pub mod roster;
pub mod store;
