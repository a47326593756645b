//! On-demand catalog resolver.
//!
//! Reads the raw YAML tree through a [`Fetcher`] on every call: no
//! caching, no indices. Listing order is catalog order. The serving path
//! wraps this with packaged search indices; build tooling and tests use
//! it directly.

use std::sync::Arc;

use lorahub_core::RepositoryError;
use lorahub_fetch::{FetchError, Fetcher};

use crate::bands::band_id;
use crate::mask::Project;
use crate::schema::{
    CodecDocument, CodecScript, DeviceDescriptor, ProfileDocument, ProfileRef, VendorDevicesIndex,
    VendorEntry, VendorIndex, parse_yaml,
};
use crate::traits::{BrandsPage, CatalogStore, GetBrandsRequest, GetModelsRequest, ModelsPage};
use crate::types::{DeviceTemplate, Model, VersionIdentifiers};

const VENDOR_INDEX_PATH: &str = "vendor/index.yaml";

/// Compute the half-open page range `[start, end)` over `total` items.
/// `page` is 1-based and defaults to 1; `limit == 0` means unlimited.
pub(crate) fn paginate(total: usize, limit: u32, page: u32) -> (usize, usize) {
    let page = if page == 0 { 1 } else { page };
    let start = ((page - 1) as usize)
        .saturating_mul(limit as usize)
        .min(total);
    let end = if limit == 0 {
        total
    } else {
        start.saturating_add(limit as usize).min(total)
    };
    (start, end)
}

/// Resolver reads the hierarchical device catalog on demand.
pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch and strictly parse one catalog file.
    fn fetch_yaml<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RepositoryError> {
        let bytes = self.fetcher.file(path)?;
        parse_yaml(path, &bytes)
    }

    fn vendor_index(&self) -> Result<VendorIndex, RepositoryError> {
        self.fetch_yaml(VENDOR_INDEX_PATH)
    }

    /// Look up a non-draft vendor entry by brand ID.
    fn vendor_entry(&self, brand_id: &str) -> Result<VendorEntry, RepositoryError> {
        let index = self.vendor_index()?;
        index
            .vendors
            .into_iter()
            .find(|v| v.id == brand_id && !v.draft)
            .ok_or_else(|| RepositoryError::NotFound(format!("brand '{brand_id}' not found")))
    }

    /// Fetch a vendor's device listing. A missing listing is NotFound.
    fn vendor_devices(&self, brand_id: &str) -> Result<VendorDevicesIndex, RepositoryError> {
        let path = format!("vendor/{brand_id}/index.yaml");
        let bytes = self.fetcher.file(&path).map_err(|e| match e {
            FetchError::NotFound(_) => {
                RepositoryError::NotFound(format!("brand '{brand_id}' has no device listing"))
            }
            other => other.into(),
        })?;
        parse_yaml(&path, &bytes)
    }

    /// Fetch and parse one device descriptor.
    fn device(&self, brand_id: &str, model_id: &str) -> Result<DeviceDescriptor, RepositoryError> {
        let path = format!("vendor/{brand_id}/{model_id}.yaml");
        let bytes = self.fetcher.file(&path).map_err(|e| match e {
            FetchError::NotFound(_) => {
                RepositoryError::NotFound(format!("model '{brand_id}/{model_id}' not found"))
            }
            other => other.into(),
        })?;
        parse_yaml(&path, &bytes)
    }

    /// Resolve the profile reference for a version-identifiers key.
    ///
    /// Brand, model, firmware version and band are always required. The
    /// hardware version is required when `require_hardware_version` is
    /// set, and validated against the firmware version's supported list
    /// whenever it is present.
    fn find_profile(
        &self,
        ids: &VersionIdentifiers,
        require_hardware_version: bool,
    ) -> Result<ProfileRef, RepositoryError> {
        for (field, value) in [
            ("brand_id", &ids.brand_id),
            ("model_id", &ids.model_id),
            ("firmware_version", &ids.firmware_version),
            ("band_id", &ids.band_id),
        ] {
            if value.is_empty() {
                return Err(RepositoryError::NotFound(format!(
                    "no device found: missing {field}"
                )));
            }
        }
        if require_hardware_version && ids.hardware_version.is_empty() {
            return Err(RepositoryError::NotFound(
                "no device found: missing hardware_version".into(),
            ));
        }

        let device = self.device(&ids.brand_id, &ids.model_id)?;
        let firmware = device
            .firmware_versions
            .into_iter()
            .find(|fw| fw.version == ids.firmware_version)
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "firmware version '{}' not found for model '{}/{}'",
                    ids.firmware_version, ids.brand_id, ids.model_id
                ))
            })?;

        if !ids.hardware_version.is_empty()
            && !firmware
                .hardware_versions
                .iter()
                .any(|hw| *hw == ids.hardware_version)
        {
            return Err(RepositoryError::NotFound(format!(
                "hardware version '{}' not supported by firmware version '{}'",
                ids.hardware_version, ids.firmware_version
            )));
        }

        firmware
            .profiles
            .into_iter()
            .find(|(region, _)| band_id(region) == Some(ids.band_id.as_str()))
            .map(|(_, profile)| profile)
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "band '{}' not supported by firmware version '{}'",
                    ids.band_id, ids.firmware_version
                ))
            })
    }

    /// Resolve a codec script: version key → profile → codec document →
    /// referenced script file, returned as raw text.
    fn codec_script(
        &self,
        ids: &VersionIdentifiers,
        direction: &str,
        select: fn(&CodecDocument) -> Option<&CodecScript>,
    ) -> Result<String, RepositoryError> {
        let profile = self.find_profile(ids, false)?;
        let codec_id = profile.codec.filter(|c| !c.is_empty()).ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "no codec defined for model '{}/{}'",
                ids.brand_id, ids.model_id
            ))
        })?;

        let path = format!("vendor/{}/{codec_id}.yaml", ids.brand_id);
        let bytes = self.fetcher.file(&path).map_err(|e| match e {
            FetchError::NotFound(_) => {
                RepositoryError::NotFound(format!("codec '{codec_id}' not found"))
            }
            other => other.into(),
        })?;
        let codec: CodecDocument = parse_yaml(&path, &bytes)?;

        let script = select(&codec).ok_or_else(|| {
            RepositoryError::NotFound(format!("codec '{codec_id}' defines no {direction}"))
        })?;

        let script_path = format!("vendor/{}/{}", ids.brand_id, script.file_name);
        let bytes = self.fetcher.file(&script_path).map_err(|e| match e {
            FetchError::NotFound(_) => {
                RepositoryError::NotFound(format!("codec script '{script_path}' not found"))
            }
            other => other.into(),
        })?;
        String::from_utf8(bytes)
            .map_err(|_| RepositoryError::Corruption(format!("codec script '{script_path}' is not UTF-8")))
    }

    /// Whether a models request needs the device descriptors at all, or
    /// can be answered from the listing alone.
    fn needs_descriptor(paths: &[String]) -> bool {
        paths.is_empty()
            || paths.iter().any(|p| {
                let head = p.split('.').next().unwrap_or(p);
                head != "brand_id" && head != "model_id"
            })
    }
}

impl CatalogStore for Resolver {
    fn get_brands(&self, req: &GetBrandsRequest) -> Result<BrandsPage, RepositoryError> {
        let index = self.vendor_index()?;
        let mut vendors: Vec<&VendorEntry> = index.vendors.iter().filter(|v| !v.draft).collect();
        if let Some(id) = req.brand_id.as_deref().filter(|s| !s.is_empty()) {
            vendors.retain(|v| v.id == id);
        }

        let total = vendors.len();
        let (start, end) = paginate(total, req.limit, req.page);

        let mut brands = Vec::with_capacity(end - start);
        for entry in &vendors[start..end] {
            brands.push(entry.to_brand().project(&req.paths)?);
        }

        Ok(BrandsPage {
            count: brands.len() as u32,
            total: total as u32,
            offset: start as u32,
            brands,
        })
    }

    fn get_models(&self, req: &GetModelsRequest) -> Result<ModelsPage, RepositoryError> {
        // Build the (brand, model) listing first; only the requested page
        // gets its descriptor files fetched.
        let mut listing: Vec<(String, String)> = Vec::new();
        match req.brand_id.as_deref().filter(|s| !s.is_empty()) {
            Some(brand_id) => {
                self.vendor_entry(brand_id)?;
                let devices = self.vendor_devices(brand_id)?;
                for model_id in devices.end_devices {
                    listing.push((brand_id.to_string(), model_id));
                }
            }
            None => {
                let index = self.vendor_index()?;
                for vendor in index.vendors.iter().filter(|v| !v.draft) {
                    match self.vendor_devices(&vendor.id) {
                        Ok(devices) => {
                            for model_id in devices.end_devices {
                                listing.push((vendor.id.clone(), model_id));
                            }
                        }
                        Err(e) if e.is_not_found() => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        if let Some(model_id) = req.model_id.as_deref().filter(|s| !s.is_empty()) {
            listing.retain(|(_, m)| m == model_id);
        }

        let total = listing.len();
        let (start, end) = paginate(total, req.limit, req.page);

        let needs_descriptor = Self::needs_descriptor(&req.paths);
        let mut models = Vec::with_capacity(end - start);
        for (brand_id, model_id) in &listing[start..end] {
            let model = if needs_descriptor {
                self.device(brand_id, model_id)?.to_model(brand_id, model_id)
            } else {
                Model {
                    brand_id: brand_id.clone(),
                    model_id: model_id.clone(),
                    ..Default::default()
                }
            };
            models.push(model.project(&req.paths)?);
        }

        Ok(ModelsPage {
            count: models.len() as u32,
            total: total as u32,
            offset: start as u32,
            models,
        })
    }

    fn get_template(&self, ids: &VersionIdentifiers) -> Result<DeviceTemplate, RepositoryError> {
        let profile_ref = self.find_profile(ids, true)?;

        let path = format!("vendor/{}/{}.yaml", ids.brand_id, profile_ref.id);
        let bytes = self.fetcher.file(&path).map_err(|e| match e {
            FetchError::NotFound(_) => {
                RepositoryError::NotFound(format!("profile '{}' not found", profile_ref.id))
            }
            other => other.into(),
        })?;
        let profile: ProfileDocument = parse_yaml(&path, &bytes)?;

        Ok(DeviceTemplate {
            version_ids: ids.clone(),
            supports_class_b: profile.supports_class_b,
            supports_class_c: profile.supports_class_c,
            mac_version: profile.mac_version,
            regional_parameters_version: profile.regional_parameters_version,
            supports_join: profile.supports_join,
            max_eirp: profile.max_eirp,
            supports_32_bit_f_cnt: profile.supports_32_bit_f_cnt,
        })
    }

    fn get_uplink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        self.codec_script(ids, "uplink decoder", |c| c.uplink_decoder.as_ref())
    }

    fn get_downlink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        self.codec_script(ids, "downlink decoder", |c| c.downlink_decoder.as_ref())
    }

    fn get_downlink_encoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        self.codec_script(ids, "downlink encoder", |c| c.downlink_encoder.as_ref())
    }
}
