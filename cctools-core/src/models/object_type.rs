//! Object types and their static schemas.
//!
//! This module contains:
//! - [`ObjectType`] - Enum of every table the back office can export
//! - [`Schema`] - Field tables used by the normalizer, lookups, and sorting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Record;
use crate::sort::SortKey;

// ============================================================================
// Object Type
// ============================================================================

/// Every object type the back office can export as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// Product categories
    Category,
    /// Products
    Product,
    /// Product to option-set assignments
    ProductOption,
    /// Option sets
    OptionSet,
    /// Option groups
    OptionGroup,
    /// Individual options
    #[serde(rename = "option")]
    OptionItem,
    /// Personalization questions
    Question,
    /// Personalization answers attached to products
    Personalization,
    /// Product variants
    Variant,
}

impl ObjectType {
    /// Returns all object types, in dependency-friendly order.
    pub fn all() -> &'static [ObjectType] {
        &[
            Self::Category,
            Self::Product,
            Self::ProductOption,
            Self::OptionSet,
            Self::OptionGroup,
            Self::OptionItem,
            Self::Question,
            Self::Personalization,
            Self::Variant,
        ]
    }

    /// Returns the stable lowercase name (used for CLI arguments and cache files).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Product => "product",
            Self::ProductOption => "product_option",
            Self::OptionSet => "option_set",
            Self::OptionGroup => "option_group",
            Self::OptionItem => "option",
            Self::Question => "question",
            Self::Personalization => "personalization",
            Self::Variant => "variant",
        }
    }

    /// Returns a plural display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Category => "Categories",
            Self::Product => "Products",
            Self::ProductOption => "Product Options",
            Self::OptionSet => "Option Sets",
            Self::OptionGroup => "Option Groups",
            Self::OptionItem => "Options",
            Self::Question => "Questions",
            Self::Personalization => "Personalizations",
            Self::Variant => "Variants",
        }
    }

    /// Looks up an object type by name. Accepts plurals and dashes.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        let singular = match normalized.as_str() {
            "categories" => "category",
            other => other.strip_suffix('s').unwrap_or(other),
        };
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == singular || kind.name() == normalized)
    }

    /// Returns the static schema for this type.
    pub fn schema(&self) -> &'static Schema {
        match self {
            Self::Category => &CATEGORY,
            Self::Product => &PRODUCT,
            Self::ProductOption => &PRODUCT_OPTION,
            Self::OptionSet => &OPTION_SET,
            Self::OptionGroup => &OPTION_GROUP,
            Self::OptionItem => &OPTION,
            Self::Question => &QUESTION,
            Self::Personalization => &PERSONALIZATION,
            Self::Variant => &VARIANT,
        }
    }

    /// Returns the canonical display-order key of `record` for this type.
    pub fn sort_key(&self, record: &Record) -> SortKey {
        SortKey::from_fields(record, self.schema().sort_fields)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let valid: Vec<_> = Self::all().iter().map(ObjectType::name).collect();
            format!("unknown object type '{s}' (valid: {})", valid.join(", "))
        })
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Static description of one object type's export table.
#[derive(Debug)]
pub struct Schema {
    /// Fields the export is expected to carry.
    pub fields: &'static [&'static str],
    /// Fields every row must carry.
    pub required: &'static [&'static str],
    /// Fields holding `Y`/`N` flags.
    pub booleans: &'static [&'static str],
    /// Natural keys searched by prefix lookups.
    pub key_fields: &'static [&'static str],
    /// Fields forming the canonical sort key, most significant first.
    pub sort_fields: &'static [&'static str],
}

impl Schema {
    /// Returns true if `field` is a boolean flag for this type.
    pub fn is_boolean(&self, field: &str) -> bool {
        self.booleans.contains(&field)
    }
}

static CATEGORY: Schema = Schema {
    fields: &[
        "Category Id",
        "Category Name",
        "Category Parent",
        "Sort Order",
        "Hidden",
        "Category Description",
    ],
    required: &["Category Id", "Category Name"],
    booleans: &["Hidden"],
    key_fields: &["Category Id", "Category Name"],
    sort_fields: &["Sort Order", "Category Name"],
};

static PRODUCT: Schema = Schema {
    fields: &[
        "Product Id",
        "SKU",
        "Product Name",
        "Category",
        "Teaser",
        "Price",
        "Cost",
        "Wholesale Price",
        "Inventory Level",
        "Track Inventory",
        "Available",
        "Discontinued Item",
        "MPN",
        "UPC",
        "HTSUS No",
    ],
    required: &["SKU", "Product Name"],
    booleans: &["Available", "Discontinued Item"],
    key_fields: &["SKU", "Product Name"],
    sort_fields: &["Category", "Product Name"],
};

static PRODUCT_OPTION: Schema = Schema {
    fields: &[
        "Product Id",
        "Product SKU",
        "Option Set Id",
        "Option Set SKU",
        "Option Set Name",
        "Sort Order",
        "Required",
    ],
    required: &["Product SKU"],
    booleans: &["Required"],
    key_fields: &["Product SKU", "Option Set SKU"],
    sort_fields: &["Product SKU", "Option Set SKU"],
};

static OPTION_SET: Schema = Schema {
    fields: &[
        "Option Set Id",
        "Option Set SKU",
        "Option Set Name",
        "Option Group Id",
        "Option Id",
        "Sort Order",
        "Enabled",
    ],
    required: &["Option Set SKU"],
    booleans: &["Enabled"],
    key_fields: &["Option Set SKU", "Option Set Name"],
    sort_fields: &["Option Set SKU", "Sort Order"],
};

static OPTION_GROUP: Schema = Schema {
    fields: &["Option Group Id", "Option Group Name", "Sort Order"],
    required: &["Option Group Id"],
    booleans: &[],
    key_fields: &["Option Group Id", "Option Group Name"],
    sort_fields: &["Sort Order", "Option Group Name"],
};

static OPTION: Schema = Schema {
    fields: &[
        "Option Id",
        "Option Group Id",
        "Option Name",
        "Option SKU",
        "Price",
        "Sort Order",
        "Enabled",
    ],
    required: &["Option Id"],
    booleans: &["Enabled"],
    key_fields: &["Option SKU", "Option Name"],
    sort_fields: &["Option Group Id", "Sort Order"],
};

static QUESTION: Schema = Schema {
    fields: &["Question Id", "Question", "Sort Order", "Required"],
    required: &["Question Id"],
    booleans: &["Required"],
    key_fields: &["Question"],
    sort_fields: &["Sort Order", "Question"],
};

static PERSONALIZATION: Schema = Schema {
    fields: &[
        "Product Id",
        "Product SKU",
        "SKU",
        "Question|Answer",
        "Answer Sort Order",
        "Answer Enabled",
        "Inventory Level",
        "Price",
    ],
    required: &["Product SKU"],
    booleans: &["Answer Enabled"],
    key_fields: &["Product SKU", "SKU"],
    sort_fields: &["Product SKU", "Answer Sort Order"],
};

static VARIANT: Schema = Schema {
    fields: &[
        "Product Id",
        "Product SKU",
        "Variant SKU",
        "Variant Name",
        "Variant Enabled",
        "Variant Default",
        "Variant Inventory Level",
        "Variant Sort Order",
        "Variant Price",
    ],
    required: &["Product SKU"],
    booleans: &["Variant Enabled", "Variant Default"],
    key_fields: &["Product SKU", "Variant SKU"],
    sort_fields: &["Product SKU", "Variant Sort Order"],
};

// ============================================================================
// Tests
// ============================================================================
