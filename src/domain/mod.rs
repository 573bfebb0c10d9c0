//! Domain types for autodeliver
//!
//! This module contains all core domain types:
//! - SignupRecord: an inbound request awaiting processing
//! - Judgment: the classifier's structured output for one record
//! - SolutionRecord: metadata of the generated artifact, one per sign-up
//! - NotificationEvent / OutboundMessage: lines of the queue and outbound logs

pub mod judgment;
pub mod notification;
pub mod signup;
pub mod solution;

pub use judgment::{Category, Effort, Judgment};
pub use notification::{EventKind, NotificationEvent, OutboundMessage, OutboundStatus};
pub use signup::{SignupRecord, SignupStatus};
pub use solution::{SolutionRecord, SolutionStatus};
