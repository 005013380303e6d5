//! # birdbuddy-core
//!
//! Core types, traits, and sighting resolution logic for the Bird Buddy
//! client.
//!
//! This crate parses server payloads into value types and decides how each
//! sighting of a postcard should be finished. It performs no I/O; remote
//! calls go through the [`GraphqlExecutor`] trait.

#[macro_use]
mod server_enum;

pub mod confidence;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod report_token;
pub mod strategy;
pub mod traits;

// Re-export commonly used types at crate root
pub use confidence::{highest_confidence_matches, ConfidenceMatch, ConfidenceMatches};
pub use error::{Error, GraphqlError, Result, AUTH_TOKEN_EXPIRED_ERROR};
pub use models::*;
pub use report_token::{decode_report_token, DecodedReport, TokenDecodeError};
pub use strategy::{select_strategies, FinishPlan, FinishStrategy, PlannedSighting, SightingFinish};
pub use traits::*;
