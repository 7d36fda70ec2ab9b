// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # cctools Browser
//!
//! The query surface every `cctools` report is built on.
//!
//! [`CcBrowser`] ties the pieces together: it exports tables through an
//! [`cctools_fetch::ExportSource`], normalizes them with
//! [`cctools_core::normalize`], caches them in a
//! [`cctools_store::RecordCache`], and answers:
//!
//! - `get_*` per object type (products carry `_n_answers`, option sets carry
//!   resolved group and option names)
//! - [`CcBrowser::find_unique`] - unique-prefix lookup over key fields
//! - sort keys per type and the category ranking for products
//! - [`CcBrowser::inventory`] - stock rows joined from products and variants
//!
//! ## Example
//!
//! ```ignore
//! use cctools_browser::CcBrowser;
//! use cctools_fetch::FetchSettings;
//! use cctools_store::Config;
//!
//! let config = Config::load()?;
//! let browser = CcBrowser::connect(&config, FetchSettings::default())?;
//!
//! let mut products = browser.get_products().await?;
//! products.sort_by_key(CcBrowser::product_key_by_sku);
//! ```

pub mod browser;
pub mod error;
pub mod inventory;

pub use browser::CcBrowser;
pub use error::BrowserError;
pub use inventory::{InventoryItem, InventorySort, build_inventory};
