//! Package index layout.
//!
//! A package holds two tantivy indices plus the raw catalog assets:
//!
//! ```text
//! package.zip
//! ├── brands-index/          one document per brand
//! ├── models-index/          one document per model
//! └── vendor/**/*.{yaml,js}  catalog tree served by the embedded resolver
//! ```
//!
//! Each index document stores the full record as canonical JSON
//! (`*_pb` fields) plus denormalized scalars for exact matching and
//! sorting: ids are untokenized (`STRING`), names are full-text
//! searchable (`TEXT`).

use lorahub_core::RepositoryError;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT};

/// Package file name, fetched by convention.
pub const PACKAGE_FILE: &str = "package.zip";

/// Brands index directory inside the working directory and the package.
pub(crate) const BRANDS_INDEX_PATH: &str = "brands-index";

/// Models index directory inside the working directory and the package.
pub(crate) const MODELS_INDEX_PATH: &str = "models-index";

fn field(schema: &Schema, name: &str) -> Result<Field, RepositoryError> {
    schema
        .get_field(name)
        .map_err(|_| RepositoryError::Corruption(format!("index is missing the '{name}' field")))
}

/// Field handles of the brands index.
#[derive(Clone, Copy)]
pub(crate) struct BrandFields {
    /// Canonical JSON of the full Brand record.
    pub brand_pb: Field,
    /// Canonical JSON of the brand's full model list.
    pub models_pb: Field,
    pub brand_id: Field,
    pub brand_name: Field,
}

pub(crate) fn brands_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field("brand_pb", STORED);
    builder.add_text_field("models_pb", STORED);
    builder.add_text_field("brand_id", STRING | STORED);
    builder.add_text_field("brand_name", TEXT | STORED);
    builder.build()
}

impl BrandFields {
    pub fn from_schema(schema: &Schema) -> Result<Self, RepositoryError> {
        Ok(Self {
            brand_pb: field(schema, "brand_pb")?,
            models_pb: field(schema, "models_pb")?,
            brand_id: field(schema, "brand_id")?,
            brand_name: field(schema, "brand_name")?,
        })
    }
}

/// Field handles of the models index.
#[derive(Clone, Copy)]
pub(crate) struct ModelFields {
    /// Canonical JSON of the full Model record.
    pub model_pb: Field,
    /// Canonical JSON of the owning Brand record.
    pub brand_pb: Field,
    pub brand_id: Field,
    pub model_id: Field,
    pub brand_name: Field,
    pub model_name: Field,
}

pub(crate) fn models_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field("model_pb", STORED);
    builder.add_text_field("brand_pb", STORED);
    builder.add_text_field("brand_id", STRING | STORED);
    builder.add_text_field("model_id", STRING | STORED);
    builder.add_text_field("brand_name", TEXT | STORED);
    builder.add_text_field("model_name", TEXT | STORED);
    builder.build()
}

impl ModelFields {
    pub fn from_schema(schema: &Schema) -> Result<Self, RepositoryError> {
        Ok(Self {
            model_pb: field(schema, "model_pb")?,
            brand_pb: field(schema, "brand_pb")?,
            brand_id: field(schema, "brand_id")?,
            model_id: field(schema, "model_id")?,
            brand_name: field(schema, "brand_name")?,
            model_name: field(schema, "model_name")?,
        })
    }
}
