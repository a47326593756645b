//! Raw catalog document schemas.
//!
//! One struct per YAML file shape:
//!
//! ```text
//! vendor/index.yaml                → VendorIndex
//! vendor/{brand}/index.yaml        → VendorDevicesIndex
//! vendor/{brand}/{model}.yaml      → DeviceDescriptor
//! vendor/{brand}/{profile}.yaml    → ProfileDocument
//! vendor/{brand}/{codec}.yaml      → CodecDocument
//! ```
//!
//! Decoding is strict: unknown or structurally malformed content is a
//! corruption error, never silently zero-filled.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use lorahub_core::RepositoryError;

use crate::bands::band_id;
use crate::types::{
    Battery, Brand, Compliances, Dimensions, FirmwareProfile, FirmwareVersion, HardwareVersion,
    KeyProvisioning, KeySecurity, Model, OperatingConditions, Photos, Videos,
};

/// Strictly decode a YAML document, reporting parse failures as
/// corruption of the named catalog file.
pub(crate) fn parse_yaml<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, RepositoryError> {
    serde_yml::from_slice(bytes)
        .map_err(|e| RepositoryError::Corruption(format!("malformed catalog file {path}: {e}")))
}

/// `vendor/index.yaml` — the top-level vendor listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct VendorIndex {
    #[serde(default)]
    pub vendors: Vec<VendorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct VendorEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "vendorID", default)]
    pub vendor_id: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub pen: Option<u32>,
    #[serde(default)]
    pub ouis: Vec<String>,
    #[serde(default)]
    pub logo: Option<String>,
    /// Draft vendors are excluded from every listing and from packages.
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl VendorEntry {
    pub fn to_brand(&self) -> Brand {
        Brand {
            brand_id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            website: self.website.clone(),
            logo: self.logo.clone(),
            organization_unique_identifiers: self.ouis.clone(),
            private_enterprise_number: self.pen,
            lora_alliance_vendor_id: self.vendor_id,
        }
    }
}

/// `vendor/{brand}/index.yaml` — the per-vendor device listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct VendorDevicesIndex {
    #[serde(default)]
    pub end_devices: Vec<String>,
}

/// `vendor/{brand}/{model}.yaml` — a device descriptor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct DeviceDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hardware_versions: Vec<HardwareVersion>,
    #[serde(default)]
    pub firmware_versions: Vec<FirmwareVersionEntry>,
    #[serde(default)]
    pub sensors: Vec<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub battery: Option<Battery>,
    #[serde(default)]
    pub operating_conditions: Option<OperatingConditions>,
    #[serde(default)]
    pub ip_code: Option<String>,
    #[serde(default)]
    pub key_provisioning: Vec<KeyProvisioning>,
    #[serde(default)]
    pub key_security: Option<KeySecurity>,
    #[serde(default)]
    pub photos: Option<Photos>,
    #[serde(default)]
    pub videos: Option<Videos>,
    #[serde(rename = "productURL", default)]
    pub product_url: Option<String>,
    #[serde(rename = "datasheetURL", default)]
    pub datasheet_url: Option<String>,
    #[serde(default)]
    pub compliances: Option<Compliances>,
    #[serde(default)]
    pub additional_radios: Vec<String>,
}

/// A firmware version as written in the catalog: the profile table is
/// keyed by regional band name, not canonical band identifier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct FirmwareVersionEntry {
    #[serde(deserialize_with = "crate::de::string_scalar")]
    pub version: String,
    #[serde(default, deserialize_with = "crate::de::string_scalar_vec")]
    pub hardware_versions: Vec<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ProfileRef {
    pub id: String,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub lorawan_certified: bool,
}

impl DeviceDescriptor {
    pub fn to_model(&self, brand_id: &str, model_id: &str) -> Model {
        Model {
            brand_id: brand_id.to_string(),
            model_id: model_id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            hardware_versions: self.hardware_versions.clone(),
            firmware_versions: self
                .firmware_versions
                .iter()
                .map(|fw| fw.to_firmware_version(brand_id, model_id))
                .collect(),
            sensors: self.sensors.clone(),
            dimensions: self.dimensions.clone(),
            weight: self.weight,
            battery: self.battery.clone(),
            operating_conditions: self.operating_conditions.clone(),
            ip_code: self.ip_code.clone(),
            key_provisioning: self.key_provisioning.clone(),
            key_security: self.key_security,
            photos: self.photos.clone(),
            videos: self.videos.clone(),
            product_url: self.product_url.clone(),
            datasheet_url: self.datasheet_url.clone(),
            compliances: self.compliances.clone(),
            additional_radios: self.additional_radios.clone(),
        }
    }
}

impl FirmwareVersionEntry {
    fn to_firmware_version(&self, brand_id: &str, model_id: &str) -> FirmwareVersion {
        let mut profiles = BTreeMap::new();
        for (region, profile) in &self.profiles {
            let Some(band) = band_id(region) else {
                warn!("unknown band {region} in {brand_id}/{model_id} firmware {}", self.version);
                continue;
            };
            profiles.insert(
                band.to_string(),
                FirmwareProfile {
                    profile_id: profile.id.clone(),
                    codec_id: profile.codec.clone().filter(|c| !c.is_empty()),
                    lorawan_certified: profile.lorawan_certified,
                },
            );
        }
        FirmwareVersion {
            version: self.version.clone(),
            supported_hardware_versions: self.hardware_versions.clone(),
            profiles,
        }
    }
}

/// `vendor/{brand}/{profile}.yaml` — a regional MAC capability profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ProfileDocument {
    #[serde(default)]
    pub supports_class_b: bool,
    #[serde(default)]
    pub supports_class_c: bool,
    #[serde(default, deserialize_with = "crate::de::string_scalar")]
    pub mac_version: String,
    #[serde(default, deserialize_with = "crate::de::string_scalar")]
    pub regional_parameters_version: String,
    #[serde(default)]
    pub supports_join: bool,
    #[serde(rename = "maxEIRP", default)]
    pub max_eirp: Option<f32>,
    #[serde(rename = "supports32bitFCnt", default)]
    pub supports_32_bit_f_cnt: bool,
}

/// `vendor/{brand}/{codec}.yaml` — a payload codec bundle referencing the
/// script files for each direction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CodecDocument {
    #[serde(default)]
    pub uplink_decoder: Option<CodecScript>,
    #[serde(default)]
    pub downlink_decoder: Option<CodecScript>,
    #[serde(default)]
    pub downlink_encoder: Option<CodecScript>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CodecScript {
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_index_parses() {
        let yaml = br#"
vendors:
- id: acme
  name: Acme Corp
  vendorID: 42
- id: sketchy
  name: Sketchy
  draft: true
"#;
        let index: VendorIndex = parse_yaml("vendor/index.yaml", yaml).unwrap();
        assert_eq!(index.vendors.len(), 2);
        assert_eq!(index.vendors[0].vendor_id, Some(42));
        assert!(!index.vendors[0].draft);
        assert!(index.vendors[1].draft);
    }

    #[test]
    fn unknown_field_is_corruption() {
        let yaml = br#"
vendors:
- id: acme
  totallyUnknownField: 1
"#;
        let err = parse_yaml::<VendorIndex>("vendor/index.yaml", yaml).unwrap_err();
        assert_eq!(err.error_code(), "CORRUPTION");
    }

    #[test]
    fn malformed_yaml_is_corruption() {
        let err = parse_yaml::<VendorIndex>("vendor/index.yaml", b"vendors: [").unwrap_err();
        assert_eq!(err.error_code(), "CORRUPTION");
    }

    #[test]
    fn device_descriptor_band_normalization() {
        let yaml = br#"
name: Sensor
firmwareVersions:
- version: "1.0"
  hardwareVersions: ["1.0"]
  profiles:
    EU433: {id: profile1, codec: codec1, lorawanCertified: true}
    NOT-A-BAND: {id: profile2}
"#;
        let descriptor: DeviceDescriptor = parse_yaml("vendor/acme/sensor.yaml", yaml).unwrap();
        let model = descriptor.to_model("acme", "sensor");
        let fw = &model.firmware_versions[0];
        assert_eq!(fw.profiles.len(), 1);
        let profile = &fw.profiles["EU_433"];
        assert_eq!(profile.profile_id, "profile1");
        assert_eq!(profile.codec_id.as_deref(), Some("codec1"));
        assert!(profile.lorawan_certified);
    }

    #[test]
    fn profile_document_parses() {
        let yaml = br#"
supportsClassB: false
supportsClassC: true
macVersion: 1.0.3
regionalParametersVersion: RP001-1.0.3-RevA
supportsJoin: true
maxEIRP: 27
supports32bitFCnt: true
"#;
        let profile: ProfileDocument = parse_yaml("vendor/acme/profile1.yaml", yaml).unwrap();
        assert!(!profile.supports_class_b);
        assert!(profile.supports_class_c);
        assert_eq!(profile.mac_version, "1.0.3");
        assert_eq!(profile.max_eirp, Some(27.0));
        assert!(profile.supports_32_bit_f_cnt);
    }

    #[test]
    fn codec_document_parses() {
        let yaml = br#"
uplinkDecoder: {fileName: a.js}
downlinkDecoder: {fileName: b.js}
downlinkEncoder: {fileName: c.js}
"#;
        let codec: CodecDocument = parse_yaml("vendor/acme/codec.yaml", yaml).unwrap();
        assert_eq!(codec.uplink_decoder.unwrap().file_name, "a.js");
        assert_eq!(codec.downlink_decoder.unwrap().file_name, "b.js");
        assert_eq!(codec.downlink_encoder.unwrap().file_name, "c.js");
    }
}
