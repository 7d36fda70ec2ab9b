//! Inventory rows joined from products and variants.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use cctools_core::Record;
use serde::Serialize;

/// `Track Inventory` value for products stocked as a single item.
pub const TRACK_BY_PRODUCT: &str = "By Product";

/// Order of inventory rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InventorySort {
    /// By product SKU.
    #[default]
    Sku,
    /// By category rank, then product name.
    Category,
}

impl FromStr for InventorySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sku" => Ok(Self::Sku),
            "category" => Ok(Self::Category),
            other => Err(format!("unknown inventory sort '{other}' (valid: sku, category)")),
        }
    }
}

impl fmt::Display for InventorySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sku => "sku",
            Self::Category => "category",
        })
    }
}

/// One stockable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    /// Stock-keeping unit.
    pub sku: String,
    /// Inventory level as exported.
    pub level: String,
    /// Display name.
    pub name: String,
    /// `Y` if the item can be ordered.
    pub enabled: String,
}

/// Joins available products with their variants, in product order.
///
/// Products tracked by product yield one row. Other products yield one row
/// per variant, in variant order, with SKU `{product}-{variant}` (just the
/// product SKU when the variant has none) and name `{product} ({variant})`.
pub fn build_inventory(products: &[Record], variants: &[Record]) -> Vec<InventoryItem> {
    let mut by_product: HashMap<&str, Vec<&Record>> = HashMap::new();
    for variant in variants {
        by_product
            .entry(variant.value("Product SKU"))
            .or_default()
            .push(variant);
    }

    let mut items = Vec::new();
    for product in products.iter().filter(|p| p.value("Available") != "N") {
        let product_sku = product.value("SKU");
        let product_name = product.value("Product Name");

        if product.value("Track Inventory") == TRACK_BY_PRODUCT {
            items.push(InventoryItem {
                sku: product_sku.to_string(),
                level: product.value("Inventory Level").to_string(),
                name: product_name.to_string(),
                enabled: product.value("Available").to_string(),
            });
            continue;
        }

        for variant in by_product.get(product_sku).into_iter().flatten() {
            let variant_sku = variant.value("Variant SKU");
            let sku = if variant_sku.is_empty() {
                product_sku.to_string()
            } else {
                format!("{product_sku}-{variant_sku}")
            };
            items.push(InventoryItem {
                sku,
                level: variant.value("Variant Inventory Level").to_string(),
                name: format!("{product_name} ({})", variant.value("Variant Name")),
                enabled: variant.value("Variant Enabled").to_string(),
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_build_inventory() {
        let products = vec![
            record(&[
                ("SKU", "100"),
                ("Product Name", "Necklace"),
                ("Available", "Y"),
                ("Track Inventory", "By Product"),
                ("Inventory Level", "4"),
            ]),
            record(&[
                ("SKU", "200"),
                ("Product Name", "Bracelet"),
                ("Available", "Y"),
                ("Track Inventory", "By Option"),
            ]),
            record(&[
                ("SKU", "300"),
                ("Product Name", "Retired"),
                ("Available", "N"),
                ("Track Inventory", "By Product"),
            ]),
        ];
        let variants = vec![
            record(&[
                ("Product SKU", "200"),
                ("Variant SKU", "S"),
                ("Variant Name", "Small"),
                ("Variant Inventory Level", "2"),
                ("Variant Enabled", "Y"),
            ]),
            record(&[
                ("Product SKU", "200"),
                ("Variant SKU", ""),
                ("Variant Name", "Standard"),
                ("Variant Inventory Level", "0"),
                ("Variant Enabled", "N"),
            ]),
        ];

        let items = build_inventory(&products, &variants);

        let rows: Vec<_> = items
            .iter()
            .map(|i| (i.sku.as_str(), i.level.as_str(), i.name.as_str(), i.enabled.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("100", "4", "Necklace", "Y"),
                ("200-S", "2", "Bracelet (Small)", "Y"),
                ("200", "0", "Bracelet (Standard)", "N"),
            ]
        );
    }

    #[test]
    fn test_inventory_sort_from_str() {
        assert_eq!("SKU".parse::<InventorySort>(), Ok(InventorySort::Sku));
        assert_eq!("category".parse::<InventorySort>(), Ok(InventorySort::Category));
        assert!("price".parse::<InventorySort>().is_err());
    }
}
