//! Client-side controllers for the scan-schedule dashboard.
//!
//! Two independent pieces talk to the remote service: [`ScheduleBoard`] keeps
//! a rendered schedule table synchronized with server state across
//! create/delete/list, and [`ExplanationPanels`] drives per-finding AI
//! explanation requests with an in-flight guard. Neither shares state with
//! the other.

pub mod error;
pub mod explain;
pub mod schedules;

pub use explain::{ExplanationPanels, IssueCard, Panel};
pub use schedules::{ScheduleBoard, ScheduleRow, ScheduleView, SyncNotice, TableState};
