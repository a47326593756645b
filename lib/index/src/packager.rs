//! Offline package build.
//!
//! Flattens a raw catalog into the two search indices and zips them
//! together with the catalog assets into a distributable package. The
//! build is single-threaded and aborts on the first error; it is not
//! transactional, so point it at a staging directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tantivy::{Index, doc};
use tracing::debug;

use lorahub_catalog::{CatalogStore, GetBrandsRequest, GetModelsRequest, Resolver};
use lorahub_core::RepositoryError;
use lorahub_fetch::Fetcher;

use crate::document::{
    BRANDS_INDEX_PATH, BrandFields, MODELS_INDEX_PATH, ModelFields, brands_schema, models_schema,
};

const WRITER_HEAP_BYTES: usize = 50_000_000;

fn storage(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn new_index(dir: &Path, schema: tantivy::schema::Schema, overwrite: bool) -> Result<Index, RepositoryError> {
    if dir.is_dir() && overwrite {
        fs::remove_dir_all(dir).map_err(storage)?;
    }
    fs::create_dir_all(dir).map_err(storage)?;
    Index::create_in_dir(dir, schema)
        .map_err(|e| RepositoryError::Storage(format!("failed to create index at {}: {e}", dir.display())))
}

/// Build a package from the catalog served by `fetcher`.
///
/// The two indices are created under `working_directory`; the result is
/// zipped into `destination_file`, keeping only the index directories and
/// `vendor/**/*.{yaml,js}`. Brands without any models are left out of the
/// package entirely: a brand document is only written once its model
/// listing resolves to at least one model.
pub fn create_package(
    fetcher: Arc<dyn Fetcher>,
    working_directory: &Path,
    destination_file: &Path,
    overwrite: bool,
) -> Result<(), RepositoryError> {
    let resolver = Resolver::new(fetcher);
    fs::create_dir_all(working_directory).map_err(storage)?;

    let brands_index = new_index(
        &working_directory.join(BRANDS_INDEX_PATH),
        brands_schema(),
        overwrite,
    )?;
    let models_index = new_index(
        &working_directory.join(MODELS_INDEX_PATH),
        models_schema(),
        overwrite,
    )?;
    let brand_fields = BrandFields::from_schema(&brands_index.schema())?;
    let model_fields = ModelFields::from_schema(&models_index.schema())?;

    let mut brands_writer = brands_index.writer(WRITER_HEAP_BYTES).map_err(storage)?;
    let mut models_writer = models_index.writer(WRITER_HEAP_BYTES).map_err(storage)?;

    let brands = resolver.get_brands(&GetBrandsRequest::default())?;
    for brand in &brands.brands {
        debug!("indexing brand {}", brand.brand_id);
        let models = match resolver.get_models(&GetModelsRequest {
            brand_id: Some(brand.brand_id.clone()),
            ..Default::default()
        }) {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                debug!("skipping brand {} without a device listing", brand.brand_id);
                continue;
            }
            Err(e) => return Err(e),
        };
        if models.models.is_empty() {
            debug!("skipping brand {} without models", brand.brand_id);
            continue;
        }

        let brand_pb = serde_json::to_string(brand)
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;
        let models_pb = serde_json::to_string(&models.models)
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        brands_writer
            .add_document(doc!(
                brand_fields.brand_pb => brand_pb.clone(),
                brand_fields.models_pb => models_pb,
                brand_fields.brand_id => brand.brand_id.clone(),
                brand_fields.brand_name => brand.name.clone(),
            ))
            .map_err(storage)?;

        for model in &models.models {
            let model_pb = serde_json::to_string(model)
                .map_err(|e| RepositoryError::Internal(e.to_string()))?;
            models_writer
                .add_document(doc!(
                    model_fields.model_pb => model_pb,
                    model_fields.brand_pb => brand_pb.clone(),
                    model_fields.brand_id => brand.brand_id.clone(),
                    model_fields.model_id => model.model_id.clone(),
                    model_fields.brand_name => brand.name.clone(),
                    model_fields.model_name => model.name.clone(),
                ))
                .map_err(storage)?;
        }
    }

    // One bulk commit per index, then settle merges before zipping the
    // directories.
    brands_writer.commit().map_err(storage)?;
    models_writer.commit().map_err(storage)?;
    brands_writer.wait_merging_threads().map_err(storage)?;
    models_writer.wait_merging_threads().map_err(storage)?;

    let root = working_directory.to_path_buf();
    lorahub_archive::archive(working_directory, destination_file, &move |path| {
        let rel = path.strip_prefix(&root).ok()?;
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let keep = name.starts_with(BRANDS_INDEX_PATH)
            || name.starts_with(MODELS_INDEX_PATH)
            || (name.starts_with("vendor/")
                && (name.ends_with(".yaml") || name.ends_with(".js")));
        keep.then_some(name)
    })?;
    Ok(())
}
