//! autodeliver - turns early-access sign-ups into delivered automation stubs
//!
//! A periodic processor classifies pending sign-ups, writes a code artifact for
//! each, and appends a delivery notification to a JSONL queue. A separate relay
//! republishes those notifications to an outbound file and serves a small
//! status route.

pub mod classifier;
pub mod domain;
pub mod error;
pub mod generator;
pub mod id;
pub mod notify;
pub mod processor;
pub mod storage;

pub use error::{DeliveryError, Result};
