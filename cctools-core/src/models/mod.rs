//! Domain models for cctools.
//!
//! ## Submodules
//!
//! - [`record`] - The flat, ordered record every export row becomes
//! - [`object_type`] - Object type enum and the static schema table

mod object_type;
mod record;

pub use object_type::{ObjectType, Schema};
pub use record::Record;
