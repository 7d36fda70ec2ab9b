// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # cctools Store
//!
//! Local state for the `cctools` suite.
//!
//! This crate provides:
//!
//! - **RecordCache**: TTL cache of exported records, one async lock per
//!   object type, mirrored to JSON files per site
//! - **Config**: The TOML configuration file
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use cctools_core::ObjectType;
//! use cctools_store::{Config, RecordCache};
//!
//! let config = Config::load()?;
//! let cache = RecordCache::new(Some(config.cache_dir()), config.site_id());
//!
//! let products = cache
//!     .get(ObjectType::Product, config.ttl(), || async { fetch_products().await })
//!     .await?;
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod persistence;

pub use cache::{CacheLocation, CacheStatus, DEFAULT_TTL, RecordCache, is_fresh};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, Config, PASSWORD_ENV, WebsiteConfig};
pub use error::{CacheError, StoreError};
pub use persistence::{
    default_cache_dir, default_config_dir, default_config_path, ensure_dir, load_json, save_json,
};
