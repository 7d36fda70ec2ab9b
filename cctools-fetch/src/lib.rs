// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # cctools Fetch
//!
//! Session transport and export fetching for the `cctools` suite.
//!
//! This crate talks to the back office's admin UI. It includes:
//!
//! ## Transport
//!
//! - [`session::Session`] - Cookie-holding HTTP session, created by logging in
//! - [`settings::SiteConfig`] - Host, site, and admin credentials
//! - [`settings::FetchSettings`] - Timeout, login marker, debug dumping
//!
//! ## Exports
//!
//! - [`export::ExportFetcher`] - Runs the three-step export flow for one type
//! - [`source::ExportSource`] - Trait the browser facade fetches through
//! - [`source::SiteSource`] - Live source that logs in on first use
//!
//! ## Example
//!
//! ```ignore
//! use cctools_core::ObjectType;
//! use cctools_fetch::{ExportSource, FetchSettings, SiteConfig, SiteSource};
//!
//! let site = SiteConfig::new("www.example.com", "acme", "clerk", "secret");
//! let source = SiteSource::new(site, FetchSettings::default());
//!
//! // Logs in, then runs the export flow
//! let csv = source.export(ObjectType::Product).await?;
//! ```

pub mod error;
pub mod export;
pub mod session;
pub mod settings;
pub mod source;

#[cfg(test)]
mod test_server;

// Errors
pub use error::{AuthenticationError, FetchError, TransportError};

// Transport
pub use session::Session;
pub use settings::{FetchSettings, SiteConfig};

// Exports
pub use export::{ExportFetcher, export_instance};
pub use source::{ExportSource, SiteSource};
