//! Public catalog record types.
//!
//! These are the objects returned by every query surface. They serialize
//! to the canonical JSON interchange form used by the package indices, so
//! the field names here are stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Brand — a device manufacturer listed in the catalog vendor index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    /// Brand identifier — unique key.
    pub brand_id: String,

    /// Human-readable vendor name.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// Logo file name, relative to the vendor directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// IEEE OUIs assigned to this vendor (hex strings).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organization_unique_identifiers: Vec<String>,

    /// IANA Private Enterprise Number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_enterprise_number: Option<u32>,

    /// Vendor identifier assigned by the LoRa Alliance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lora_alliance_vendor_id: Option<u32>,
}

/// Model — a device product line under a Brand.
/// Key = (brand_id, model_id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub brand_id: String,
    pub model_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hardware_versions: Vec<HardwareVersion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firmware_versions: Vec<FirmwareVersion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    /// Weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<Battery>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_conditions: Option<OperatingConditions>,

    /// IP rating code, e.g. "IP67".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_provisioning: Vec<KeyProvisioning>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_security: Option<KeySecurity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Photos>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Videos>,

    #[serde(rename = "productURL", default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,

    #[serde(rename = "datasheetURL", default, skip_serializing_if = "Option::is_none")]
    pub datasheet_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliances: Option<Compliances>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_radios: Vec<String>,
}

/// A hardware revision of a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HardwareVersion {
    #[serde(deserialize_with = "crate::de::string_scalar")]
    pub version: String,
    #[serde(default)]
    pub numeric: u32,
    #[serde(default, deserialize_with = "crate::de::string_scalar")]
    pub part_number: String,
}

/// A firmware revision of a model, with its per-band profile table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareVersion {
    pub version: String,

    /// Hardware versions this firmware runs on. References versions
    /// declared on the same model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_hardware_versions: Vec<String>,

    /// Profile table keyed by canonical band identifier (`EU_868_870` form).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, FirmwareProfile>,
}

/// A band entry of a firmware version: the regional profile it uses and,
/// optionally, the payload codec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareProfile {
    pub profile_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,

    #[serde(default)]
    pub lorawan_certified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Battery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaceable: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub battery_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperatingConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Limits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<Limits>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Limits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Photos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Videos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Compliances {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety: Vec<Compliance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub radio_equipment: Vec<Compliance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Compliance {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub norm: String,
    #[serde(default)]
    pub standard: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// How device root keys are provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyProvisioning {
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "join server")]
    JoinServer,
    #[serde(rename = "manifest")]
    Manifest,
}

/// How device root keys are protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySecurity {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "read protected")]
    ReadProtected,
    #[serde(rename = "secure element")]
    SecureElement,
}

/// The exact-match key for template and codec lookups. Empty components
/// are treated as unset; partial keys never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionIdentifiers {
    pub brand_id: String,
    pub model_id: String,
    pub firmware_version: String,
    pub hardware_version: String,
    /// Canonical band identifier (`EU_433` form).
    pub band_id: String,
}

/// Provisioning template for a (brand, model, firmware, hardware, band)
/// combination: the echoed identifiers plus the MAC capabilities of the
/// regional profile that combination references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemplate {
    pub version_ids: VersionIdentifiers,

    pub supports_class_b: bool,
    pub supports_class_c: bool,

    /// LoRaWAN MAC version, e.g. "1.0.3".
    pub mac_version: String,

    /// Regional parameters version, e.g. "RP001-1.0.3-RevA".
    pub regional_parameters_version: String,

    /// Whether the device joins over the air (OTAA).
    pub supports_join: bool,

    /// Maximum EIRP in dBm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_eirp: Option<f32>,

    pub supports_32_bit_f_cnt: bool,
}
