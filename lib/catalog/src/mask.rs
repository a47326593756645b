//! Field-mask projection.
//!
//! A mask is a list of dotted field paths (`name`, `photos.main`). The
//! projection builds a zero-valued instance and copies only the requested
//! paths in. An empty mask selects every field. Unknown paths are
//! rejected so that callers notice typos instead of silently receiving
//! empty fields.

use lorahub_core::RepositoryError;

use crate::types::{Brand, Model};

/// Projection of a record under a field mask.
pub trait Project: Sized {
    /// Return a copy of `self` with only the fields named by `paths`
    /// populated. An empty `paths` returns the full record.
    fn project(&self, paths: &[String]) -> Result<Self, RepositoryError>;
}

fn unknown_path(path: &str) -> RepositoryError {
    RepositoryError::InvalidArgument(format!("unknown field mask path: {path}"))
}

/// Split a dotted path into its head field and optional sub-path.
fn split(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, sub)) => (head, Some(sub)),
        None => (path, None),
    }
}

impl Project for Brand {
    fn project(&self, paths: &[String]) -> Result<Self, RepositoryError> {
        if paths.is_empty() {
            return Ok(self.clone());
        }
        let mut out = Brand::default();
        for path in paths {
            match path.as_str() {
                "brand_id" => out.brand_id = self.brand_id.clone(),
                "name" => out.name = self.name.clone(),
                "email" => out.email = self.email.clone(),
                "website" => out.website = self.website.clone(),
                "logo" => out.logo = self.logo.clone(),
                "organization_unique_identifiers" => {
                    out.organization_unique_identifiers =
                        self.organization_unique_identifiers.clone();
                }
                "private_enterprise_number" => {
                    out.private_enterprise_number = self.private_enterprise_number;
                }
                "lora_alliance_vendor_id" => {
                    out.lora_alliance_vendor_id = self.lora_alliance_vendor_id;
                }
                other => return Err(unknown_path(other)),
            }
        }
        Ok(out)
    }
}

impl Project for Model {
    fn project(&self, paths: &[String]) -> Result<Self, RepositoryError> {
        if paths.is_empty() {
            return Ok(self.clone());
        }
        let mut out = Model::default();
        for path in paths {
            match split(path) {
                ("brand_id", None) => out.brand_id = self.brand_id.clone(),
                ("model_id", None) => out.model_id = self.model_id.clone(),
                ("name", None) => out.name = self.name.clone(),
                ("description", None) => out.description = self.description.clone(),
                ("hardware_versions", None) => {
                    out.hardware_versions = self.hardware_versions.clone();
                }
                ("firmware_versions", None) => {
                    out.firmware_versions = self.firmware_versions.clone();
                }
                ("sensors", None) => out.sensors = self.sensors.clone(),
                ("weight", None) => out.weight = self.weight,
                ("ip_code", None) => out.ip_code = self.ip_code.clone(),
                ("key_provisioning", None) => {
                    out.key_provisioning = self.key_provisioning.clone();
                }
                ("key_security", None) => out.key_security = self.key_security,
                ("product_url", None) => out.product_url = self.product_url.clone(),
                ("datasheet_url", None) => out.datasheet_url = self.datasheet_url.clone(),
                ("additional_radios", None) => {
                    out.additional_radios = self.additional_radios.clone();
                }

                ("dimensions", None) => out.dimensions = self.dimensions.clone(),
                ("dimensions", Some(sub)) => {
                    if let Some(src) = &self.dimensions {
                        let dst = out.dimensions.get_or_insert_with(Default::default);
                        match sub {
                            "width" => dst.width = src.width,
                            "height" => dst.height = src.height,
                            "diameter" => dst.diameter = src.diameter,
                            "length" => dst.length = src.length,
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "width" | "height" | "diameter" | "length") {
                        return Err(unknown_path(path));
                    }
                }

                ("battery", None) => out.battery = self.battery.clone(),
                ("battery", Some(sub)) => {
                    if let Some(src) = &self.battery {
                        let dst = out.battery.get_or_insert_with(Default::default);
                        match sub {
                            "replaceable" => dst.replaceable = src.replaceable,
                            "type" => dst.battery_type = src.battery_type.clone(),
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "replaceable" | "type") {
                        return Err(unknown_path(path));
                    }
                }

                ("operating_conditions", None) => {
                    out.operating_conditions = self.operating_conditions.clone();
                }
                ("operating_conditions", Some(sub)) => {
                    if let Some(src) = &self.operating_conditions {
                        let dst = out.operating_conditions.get_or_insert_with(Default::default);
                        match sub {
                            "temperature" => dst.temperature = src.temperature.clone(),
                            "relative_humidity" => {
                                dst.relative_humidity = src.relative_humidity.clone();
                            }
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "temperature" | "relative_humidity") {
                        return Err(unknown_path(path));
                    }
                }

                ("photos", None) => out.photos = self.photos.clone(),
                ("photos", Some(sub)) => {
                    if let Some(src) = &self.photos {
                        let dst = out.photos.get_or_insert_with(Default::default);
                        match sub {
                            "main" => dst.main = src.main.clone(),
                            "other" => dst.other = src.other.clone(),
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "main" | "other") {
                        return Err(unknown_path(path));
                    }
                }

                ("videos", None) => out.videos = self.videos.clone(),
                ("videos", Some(sub)) => {
                    if let Some(src) = &self.videos {
                        let dst = out.videos.get_or_insert_with(Default::default);
                        match sub {
                            "main" => dst.main = src.main.clone(),
                            "other" => dst.other = src.other.clone(),
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "main" | "other") {
                        return Err(unknown_path(path));
                    }
                }

                ("compliances", None) => out.compliances = self.compliances.clone(),
                ("compliances", Some(sub)) => {
                    if let Some(src) = &self.compliances {
                        let dst = out.compliances.get_or_insert_with(Default::default);
                        match sub {
                            "safety" => dst.safety = src.safety.clone(),
                            "radio_equipment" => dst.radio_equipment = src.radio_equipment.clone(),
                            _ => return Err(unknown_path(path)),
                        }
                    } else if !matches!(sub, "safety" | "radio_equipment") {
                        return Err(unknown_path(path));
                    }
                }

                _ => return Err(unknown_path(path)),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimensions, Photos};

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample_model() -> Model {
        Model {
            brand_id: "acme".into(),
            model_id: "sensor-1".into(),
            name: "Sensor One".into(),
            description: Some("A sensor".into()),
            sensors: vec!["temperature".into()],
            dimensions: Some(Dimensions {
                width: Some(1.0),
                height: Some(2.0),
                ..Default::default()
            }),
            photos: Some(Photos {
                main: Some("a.jpg".into()),
                other: vec!["b.jpg".into()],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn brand_selected_fields_only() {
        let brand = Brand {
            brand_id: "acme".into(),
            name: "Acme Corp".into(),
            email: Some("mail@example.com".into()),
            ..Default::default()
        };
        let projected = brand.project(&paths(&["brand_id", "name"])).unwrap();
        assert_eq!(
            projected,
            Brand {
                brand_id: "acme".into(),
                name: "Acme Corp".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn empty_mask_is_full_record() {
        let brand = Brand {
            brand_id: "acme".into(),
            name: "Acme Corp".into(),
            website: Some("example.org".into()),
            ..Default::default()
        };
        assert_eq!(brand.project(&[]).unwrap(), brand);
    }

    #[test]
    fn unknown_path_is_invalid_argument() {
        let brand = Brand::default();
        let err = brand.project(&paths(&["nope"])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");

        let model = sample_model();
        let err = model.project(&paths(&["photos.nope"])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn model_nested_subpath() {
        let model = sample_model();
        let projected = model
            .project(&paths(&["model_id", "photos.main", "dimensions.width"]))
            .unwrap();
        assert_eq!(
            projected,
            Model {
                model_id: "sensor-1".into(),
                photos: Some(Photos {
                    main: Some("a.jpg".into()),
                    other: vec![],
                }),
                dimensions: Some(Dimensions {
                    width: Some(1.0),
                    ..Default::default()
                }),
                ..Default::default()
            }
        );
    }

    #[test]
    fn model_whole_subtree() {
        let model = sample_model();
        let projected = model.project(&paths(&["photos"])).unwrap();
        assert_eq!(projected.photos, model.photos);
        assert_eq!(projected.brand_id, "");
    }

    #[test]
    fn absent_nested_field_stays_absent() {
        let model = Model::default();
        let projected = model.project(&paths(&["battery.type"])).unwrap();
        assert_eq!(projected.battery, None);
    }
}
