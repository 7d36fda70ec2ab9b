//! Sort keys for presenting records in a stable order.
//!
//! Keys compare numerically where the underlying value looks like an
//! integer (sort orders, ids) and lexically otherwise, so `"10"` sorts after
//! `"9"` in a `Sort Order` column.

use crate::models::{ObjectType, Record};

// ============================================================================
// Sort Key
// ============================================================================

/// One component of a [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    /// An integer value.
    Number(i64),
    /// Any other value, compared lexically.
    Text(String),
}

impl KeyPart {
    /// Classifies a raw field value.
    pub fn from_value(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(value.to_string()),
        }
    }
}

/// A comparable tuple derived from a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SortKey(Vec<KeyPart>);

impl SortKey {
    /// Builds a key from `fields` of `record`; absent fields count as `""`.
    pub fn from_fields(record: &Record, fields: &[&str]) -> Self {
        Self(
            fields
                .iter()
                .map(|field| KeyPart::from_value(record.value(field)))
                .collect(),
        )
    }

    /// Appends a component.
    #[must_use]
    pub fn then(mut self, part: KeyPart) -> Self {
        self.0.push(part);
        self
    }

    /// Returns the key components.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

// ============================================================================
// Category Order
// ============================================================================

/// Ranking of category names used by the product sort keys.
///
/// Categories not in the order sort after all listed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryOrder {
    names: Vec<String>,
}

impl CategoryOrder {
    /// Creates an order from an explicit list of category names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Derives the order from category records, using their canonical sort key.
    pub fn from_categories(categories: &[Record]) -> Self {
        let mut sorted: Vec<&Record> = categories.iter().collect();
        sorted.sort_by_key(|record| ObjectType::Category.sort_key(record));
        Self::from_names(sorted.iter().map(|record| record.value("Category Name")))
    }

    /// Returns the rank of `category`; unknown categories rank last.
    pub fn index_of(&self, category: &str) -> usize {
        self.names
            .iter()
            .position(|name| name == category)
            .unwrap_or(self.names.len())
    }

    /// Returns the ordered names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if no categories are ranked.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Product Keys
// ============================================================================

fn rank(order: &CategoryOrder, product: &Record) -> KeyPart {
    let index = order.index_of(product.value("Category"));
    KeyPart::Number(i64::try_from(index).unwrap_or(i64::MAX))
}

/// Sorts products by SKU.
pub fn product_key_by_sku(product: &Record) -> SortKey {
    SortKey::from_fields(product, &["SKU"])
}

/// Sorts products by category rank only (used to group by category).
pub fn product_key_by_category(order: &CategoryOrder, product: &Record) -> SortKey {
    SortKey::default().then(rank(order, product))
}

/// Sorts products by category rank, then product name.
pub fn product_key_by_cat_and_name(order: &CategoryOrder, product: &Record) -> SortKey {
    product_key_by_category(order, product)
        .then(KeyPart::Text(product.value("Product Name").to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_numeric_parts_compare_numerically() {
        assert!(KeyPart::from_value("9") < KeyPart::from_value("10"));
        assert!(KeyPart::from_value("abc") > KeyPart::from_value("10"));
        assert_eq!(KeyPart::from_value(" 7 "), KeyPart::Number(7));
    }

    #[test]
    fn test_variant_key_orders_by_product_then_sort_order() {
        let a = record(&[("Product SKU", "100"), ("Variant Sort Order", "10")]);
        let b = record(&[("Product SKU", "100"), ("Variant Sort Order", "9")]);
        let c = record(&[("Product SKU", "99"), ("Variant Sort Order", "1")]);

        let mut variants = vec![a.clone(), b.clone(), c.clone()];
        variants.sort_by_key(|v| ObjectType::Variant.sort_key(v));

        assert_eq!(variants, vec![c, b, a]);
    }

    #[test]
    fn test_category_order_unknown_sorts_last() {
        let order = CategoryOrder::from_names(["Necklaces", "Bracelets"]);
        assert_eq!(order.index_of("Necklaces"), 0);
        assert_eq!(order.index_of("Bracelets"), 1);
        assert_eq!(order.index_of("Miscellaneous"), 2);
    }

    #[test]
    fn test_category_order_from_categories() {
        let categories = vec![
            record(&[("Category Id", "1"), ("Category Name", "Bags"), ("Sort Order", "20")]),
            record(&[("Category Id", "2"), ("Category Name", "Necklaces"), ("Sort Order", "5")]),
        ];
        let order = CategoryOrder::from_categories(&categories);
        assert_eq!(order.names(), &["Necklaces".to_string(), "Bags".to_string()]);
    }

    #[test]
    fn test_product_key_by_cat_and_name() {
        let order = CategoryOrder::from_names(["Necklaces", "Bracelets"]);
        let mut products = vec![
            record(&[("SKU", "3"), ("Category", "Other"), ("Product Name", "Alpha")]),
            record(&[("SKU", "2"), ("Category", "Bracelets"), ("Product Name", "Beta")]),
            record(&[("SKU", "1"), ("Category", "Bracelets"), ("Product Name", "Alpha")]),
            record(&[("SKU", "4"), ("Category", "Necklaces"), ("Product Name", "Zeta")]),
        ];
        products.sort_by_key(|p| product_key_by_cat_and_name(&order, p));

        let skus: Vec<_> = products.iter().map(|p| p.value("SKU")).collect();
        assert_eq!(skus, vec!["4", "1", "2", "3"]);
    }
}
