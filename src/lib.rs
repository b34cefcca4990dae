//! PluralKit API Client Library
//!
//! An async Rust client for the [PluralKit](https://pluralkit.me) API with
//! adaptive client-side rate limiting.
//!
//! # Features
//!
//! - **Adaptive rate limiting**: tracks recent `429` answers, widens or
//!   narrows a bounded wait time and honours the `x-ratelimit-*` headers
//! - **Opt-out**: a no-op limiter for applications that throttle themselves
//! - **Typed records**: systems and per-server settings with local validation
//!   that keeps "unset" and "null" apart
//! - **Observability**: `tracing` spans and events, optional subscriber setup
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pluralkit_client::{PluralKitClient, System};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PluralKitClient::builder()
//!         .token("your-system-token")
//!         .build()?;
//!
//!     let mut system = client.systems().get("@me").await?;
//!     system.color = "#ff00aa".to_string().into();
//!     let updated = client.systems().patch(&system).await?;
//!     println!("{:?}", updated.color);
//!     Ok(())
//! }
//! ```
//!
//! # Rate limiting
//!
//! Every request waits on the client's [`RateLimiter`] before it is sent. A
//! `429 Too Many Requests` answer is absorbed by the limiter and the request
//! is retried, up to `max_retries` times, once the limiter's pause elapses.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use pluralkit_client::{PluralKitClient, RateLimiterConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PluralKitClient::builder()
//!     .rate_limiter_config(
//!         RateLimiterConfig::default()
//!             .min_wait(Duration::from_millis(500))
//!             .max_wait(Duration::from_secs(5)),
//!     )
//!     .build()?;
//!
//! let unthrottled = PluralKitClient::builder().rate_limit(false).build()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod mocks;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{PluralKitClient, PluralKitClientBuilder};
pub use config::PluralKitConfig;
pub use errors::{PluralKitError, PluralKitResult};
pub use resilience::{
    AdaptiveRateLimiter, NullRateLimiter, RateLimitable, RateLimiter, RateLimiterConfig,
};
pub use services::SystemsService;
pub use types::{
    format_date, validate_privacy, Field, Privacy, System, SystemGuildSettings, SystemPrivacy,
};
