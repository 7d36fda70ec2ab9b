//! The browser facade.
//!
//! [`CcBrowser`] is the one entry point report tools use. Every `get_*`
//! method goes through the record cache: a valid cached entry is returned
//! without touching the network, otherwise the type is exported, normalized
//! and cached.
//!
//! The cache holds each type exactly as exported. Derived fields (product
//! `_n_answers`, option set names) are stitched on every read from the
//! current entries of the types they depend on, so refreshing or clearing
//! a dependency shows up in the next read of its dependents. No cache lock
//! is held while another type is looked up.

use std::sync::Arc;
use std::time::Duration;

use cctools_core::normalize::{self, N_ANSWERS};
use cctools_core::sort::{product_key_by_cat_and_name, product_key_by_category, product_key_by_sku};
use cctools_core::{CategoryOrder, ObjectType, Record, SortKey};
use cctools_fetch::{ExportSource, FetchSettings, SiteConfig, SiteSource};
use cctools_store::{Config, RecordCache};
use tracing::{debug, instrument};

use crate::error::BrowserError;
use crate::inventory::{InventoryItem, InventorySort, build_inventory};

// ============================================================================
// CcBrowser
// ============================================================================

/// Cached, normalized access to one site's back-office data.
pub struct CcBrowser {
    source: Arc<dyn ExportSource>,
    cache: RecordCache,
    ttl: Duration,
    category_order: Option<CategoryOrder>,
}

impl CcBrowser {
    /// Creates a browser over an arbitrary export source.
    pub fn with_source(source: Arc<dyn ExportSource>, cache: RecordCache, ttl: Duration) -> Self {
        Self {
            source,
            cache,
            ttl,
            category_order: None,
        }
    }

    /// Creates a browser for the site described by `config`.
    ///
    /// Nothing is fetched and no login happens until the first cache miss.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Config`] if the site or credentials are missing.
    pub fn connect(config: &Config, settings: FetchSettings) -> Result<Self, BrowserError> {
        config.validate()?;

        let website = &config.website;
        let site = SiteConfig::new(
            website.host.clone(),
            website.site.clone(),
            website.username.clone(),
            website.password.clone(),
        );
        let settings = match &website.login_marker {
            Some(marker) => settings.with_login_marker(marker.clone()),
            None => settings,
        };
        let cache = RecordCache::new(Some(config.cache_dir()), config.site_id());
        debug!(site = %config.site_id(), cache_dir = ?cache.dir(), "Browser configured");

        Ok(Self::with_source(
            Arc::new(SiteSource::new(site, settings)),
            cache,
            config.ttl(),
        ))
    }

    /// Overrides the cache time-to-live. Zero forces every type to refresh.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Keeps records in memory only, ignoring and never writing cache files.
    #[must_use]
    pub fn without_disk_cache(mut self) -> Self {
        self.cache = RecordCache::in_memory(self.cache.site().to_string());
        self
    }

    /// Returns the cache time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the record cache.
    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    // ========================================================================
    // Record Access
    // ========================================================================

    /// Returns all records of `object_type`.
    pub async fn get(&self, object_type: ObjectType) -> Result<Vec<Record>, BrowserError> {
        match object_type {
            ObjectType::Product => self.get_products().await,
            ObjectType::OptionSet => self.get_option_sets().await,
            other => self.get_plain(other).await,
        }
    }

    /// Returns all categories.
    pub async fn get_categories(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::Category).await
    }

    /// Returns all products, each with `_n_answers` from its personalizations.
    pub async fn get_products(&self) -> Result<Vec<Record>, BrowserError> {
        let mut products = self.get_plain(ObjectType::Product).await?;
        let personalizations = self.get_plain(ObjectType::Personalization).await?;
        normalize::count_children(
            &mut products,
            "SKU",
            &personalizations,
            "Product SKU",
            N_ANSWERS,
        );
        Ok(products)
    }

    /// Returns all product to option-set assignments.
    pub async fn get_product_options(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::ProductOption).await
    }

    /// Returns all option sets, with option group and option names resolved.
    pub async fn get_option_sets(&self) -> Result<Vec<Record>, BrowserError> {
        let mut option_sets = self.get_plain(ObjectType::OptionSet).await?;
        let option_groups = self.get_plain(ObjectType::OptionGroup).await?;
        let options = self.get_plain(ObjectType::OptionItem).await?;
        normalize::stitch_option_sets(&mut option_sets, &option_groups, &options);
        Ok(option_sets)
    }

    /// Returns all option groups.
    pub async fn get_option_groups(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::OptionGroup).await
    }

    /// Returns all options.
    pub async fn get_options(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::OptionItem).await
    }

    /// Returns all personalization questions.
    pub async fn get_questions(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::Question).await
    }

    /// Returns all personalization answers.
    pub async fn get_personalizations(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::Personalization).await
    }

    /// Returns all product variants.
    pub async fn get_variants(&self) -> Result<Vec<Record>, BrowserError> {
        self.get_plain(ObjectType::Variant).await
    }

    /// Cached access for types that need no stitching.
    async fn get_plain(&self, object_type: ObjectType) -> Result<Vec<Record>, BrowserError> {
        self.cache
            .get(object_type, self.ttl, || self.export(object_type))
            .await
    }

    /// Exports and normalizes one type, bypassing the cache.
    #[instrument(skip(self))]
    async fn export(&self, object_type: ObjectType) -> Result<Vec<Record>, BrowserError> {
        let raw = self.source.export(object_type).await?;
        let records = normalize::parse(&raw, object_type)
            .map_err(|source| BrowserError::Parse {
                object_type,
                source,
            })?;
        debug!(count = records.len(), "Normalized export");
        Ok(records)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the single record of `object_type` where one of `key_fields`
    /// starts with `prefix`.
    ///
    /// An empty `key_fields` searches the type's natural keys.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Lookup`] unless exactly one record matches,
    /// or any error from loading the records.
    pub async fn find_unique(
        &self,
        object_type: ObjectType,
        prefix: &str,
        key_fields: &[&str],
    ) -> Result<Record, BrowserError> {
        let key_fields = if key_fields.is_empty() {
            object_type.schema().key_fields
        } else {
            key_fields
        };
        let records = self.get(object_type).await?;
        let found = cctools_core::find_unique(&records, prefix, key_fields)?;
        Ok(found.clone())
    }

    // ========================================================================
    // Sort Keys
    // ========================================================================

    /// Sort key for categories.
    pub fn category_key(category: &Record) -> SortKey {
        ObjectType::Category.sort_key(category)
    }

    /// Sort key for product to option-set assignments.
    pub fn product_option_key(product_option: &Record) -> SortKey {
        ObjectType::ProductOption.sort_key(product_option)
    }

    /// Sort key for option sets.
    pub fn option_set_key(option_set: &Record) -> SortKey {
        ObjectType::OptionSet.sort_key(option_set)
    }

    /// Sort key for option groups.
    pub fn option_group_key(option_group: &Record) -> SortKey {
        ObjectType::OptionGroup.sort_key(option_group)
    }

    /// Sort key for options.
    pub fn option_key(option: &Record) -> SortKey {
        ObjectType::OptionItem.sort_key(option)
    }

    /// Sort key for questions.
    pub fn question_key(question: &Record) -> SortKey {
        ObjectType::Question.sort_key(question)
    }

    /// Sort key for personalizations.
    pub fn personalization_key(personalization: &Record) -> SortKey {
        ObjectType::Personalization.sort_key(personalization)
    }

    /// Sort key for variants.
    pub fn variant_key(variant: &Record) -> SortKey {
        ObjectType::Variant.sort_key(variant)
    }

    /// Sort key for products by SKU.
    pub fn product_key_by_sku(product: &Record) -> SortKey {
        product_key_by_sku(product)
    }

    /// Sort key for products by category rank.
    pub fn product_key_by_category(order: &CategoryOrder, product: &Record) -> SortKey {
        product_key_by_category(order, product)
    }

    /// Sort key for products by category rank, then name.
    pub fn product_key_by_cat_and_name(order: &CategoryOrder, product: &Record) -> SortKey {
        product_key_by_cat_and_name(order, product)
    }

    /// Fixes the category ranking used by the product sort keys.
    pub fn set_category_sort_order(&mut self, order: CategoryOrder) {
        self.category_order = Some(order);
    }

    /// Returns the category ranking: the one set explicitly, or else the
    /// categories' own sort order.
    pub async fn category_order(&self) -> Result<CategoryOrder, BrowserError> {
        if let Some(order) = &self.category_order {
            return Ok(order.clone());
        }
        let categories = self.get_categories().await?;
        Ok(CategoryOrder::from_categories(&categories))
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Returns one inventory row per stockable item of every available product.
    ///
    /// Products and variants are loaded concurrently.
    pub async fn inventory(&self, sort: InventorySort) -> Result<Vec<InventoryItem>, BrowserError> {
        let (mut products, mut variants) =
            tokio::try_join!(self.get_products(), self.get_variants())?;

        match sort {
            InventorySort::Sku => products.sort_by_key(product_key_by_sku),
            InventorySort::Category => {
                let order = self.category_order().await?;
                products.sort_by_key(|p| product_key_by_cat_and_name(&order, p));
            }
        }
        variants.sort_by_key(Self::variant_key);

        Ok(build_inventory(&products, &variants))
    }
}

impl std::fmt::Debug for CcBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CcBrowser")
            .field("site", &self.cache.site())
            .field("ttl", &self.ttl)
            .field("category_order", &self.category_order)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
