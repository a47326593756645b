use lorahub_core::RepositoryError;

use crate::types::{Brand, DeviceTemplate, Model, VersionIdentifiers};

/// Brand listing request.
///
/// `limit == 0` means unlimited for the on-demand resolver; the index
/// store treats it as "count only" (no hits returned). `page` is 1-based
/// and defaults to 1 when 0.
#[derive(Debug, Clone, Default)]
pub struct GetBrandsRequest {
    /// Exact brand filter.
    pub brand_id: Option<String>,
    pub limit: u32,
    pub page: u32,
    /// Sort order. Recognized: `brand_id`, `-brand_id`, `name`, `-name`.
    /// Unrecognized tokens are ignored. Only the index store sorts.
    pub order_by: Option<String>,
    /// Free-text query. Only the index store searches.
    pub search: Option<String>,
    /// Field mask. Empty selects every field.
    pub paths: Vec<String>,
}

/// Model listing request. Same paging/mask contract as
/// [`GetBrandsRequest`]; additionally recognizes `model_id`/`-model_id`
/// ordering.
#[derive(Debug, Clone, Default)]
pub struct GetModelsRequest {
    pub brand_id: Option<String>,
    /// Exact model filter.
    pub model_id: Option<String>,
    pub limit: u32,
    pub page: u32,
    pub order_by: Option<String>,
    pub search: Option<String>,
    pub paths: Vec<String>,
}

/// One page of brands.
#[derive(Debug, Clone, Default)]
pub struct BrandsPage {
    pub brands: Vec<Brand>,
    /// Number of brands in this page.
    pub count: u32,
    /// Total number of matching brands.
    pub total: u32,
    /// Offset of this page within the matching set.
    pub offset: u32,
}

/// One page of models.
#[derive(Debug, Clone, Default)]
pub struct ModelsPage {
    pub models: Vec<Model>,
    pub count: u32,
    pub total: u32,
    pub offset: u32,
}

/// CatalogStore answers catalog queries.
///
/// Implemented by the on-demand [`crate::Resolver`] (reads the raw YAML
/// tree, no search or sort) and by the serving index store (reads the
/// packaged search indices).
pub trait CatalogStore: Send + Sync {
    /// List brands. Draft brands are never returned.
    fn get_brands(&self, req: &GetBrandsRequest) -> Result<BrandsPage, RepositoryError>;

    /// List models, optionally scoped to a brand. A scoped brand without
    /// a device listing is NotFound; unscoped listings skip such brands.
    fn get_models(&self, req: &GetModelsRequest) -> Result<ModelsPage, RepositoryError>;

    /// Resolve the provisioning template for an exact
    /// (brand, model, firmware, hardware, band) key. All five components
    /// are required; partial keys never match.
    fn get_template(&self, ids: &VersionIdentifiers) -> Result<DeviceTemplate, RepositoryError>;

    /// Raw uplink decoder script for the codec referenced by the matched
    /// firmware-version/band entry.
    fn get_uplink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError>;

    /// Raw downlink decoder script.
    fn get_downlink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError>;

    /// Raw downlink encoder script.
    fn get_downlink_encoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError>;
}
