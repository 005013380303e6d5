//! # birdbuddy-client
//!
//! Async client for the Bird Buddy smart feeder GraphQL API.
//!
//! [`BirdBuddy`] handles authentication and caches account data. Postcard
//! collection goes through [`PostcardFinisher`], which works against any
//! [`birdbuddy_core::GraphqlExecutor`].
//!
//! ```rust,ignore
//! let bb = BirdBuddy::new(ClientConfig::with_login(email, password))?;
//! for postcard in bb.new_postcards().await? {
//!     let sighting = bb.sighting_from_postcard(&postcard.id).await?;
//!     bb.finish_postcard(&postcard.id, &sighting, FinishOptions::default()).await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod finish;
pub mod queries;
pub mod transport;

#[cfg(test)]
pub mod mock;

pub use client::BirdBuddy;
pub use config::{normalize_language_tag, ClientConfig, ConfigError};
pub use finish::{FinishOptions, PostcardFinisher};
pub use transport::GraphqlTransport;
