//! Serving store backed by packaged search indices.
//!
//! The store owns one "generation" of catalog data: the unpacked package
//! in its working directory, plus an open handle per index. Queries run
//! under a per-index read lock; [`IndexStore::refresh`] swaps in the next
//! generation under the write lock, so a query never observes a torn
//! swap, and the two indices may briefly serve different generations.
//! Template and codec lookups bypass the indices and delegate to an
//! embedded resolver rooted at the working directory.
//!
//! Dropping the store closes both indices and releases their file locks.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value as TantivyValue};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};

use lorahub_catalog::{
    Brand, BrandsPage, CatalogStore, DeviceTemplate, GetBrandsRequest, GetModelsRequest, Model,
    ModelsPage, Project, Resolver, VersionIdentifiers,
};
use lorahub_core::RepositoryError;
use lorahub_fetch::{Fetcher, FsFetcher};

use crate::document::{
    BRANDS_INDEX_PATH, BrandFields, MODELS_INDEX_PATH, ModelFields, PACKAGE_FILE,
};
use crate::open::open_with_timeout;

/// Index store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory the package is unpacked into. Required.
    pub working_directory: PathBuf,

    /// Fetch and unpack the package before the first open.
    pub auto_init: bool,

    /// Deadline for each index open (see [`crate::worker`] for the
    /// refresh cadence).
    pub open_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            working_directory: PathBuf::new(),
            auto_init: false,
            open_timeout: Duration::from_secs(5),
        }
    }
}

/// One open index generation.
struct OpenIndex<F> {
    index: Index,
    reader: IndexReader,
    fields: F,
}

fn storage(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn open_index<F, L>(path: PathBuf, what: &str, timeout: Duration, lookup: L) -> Result<OpenIndex<F>, RepositoryError>
where
    F: Send + 'static,
    L: FnOnce(&tantivy::schema::Schema) -> Result<F, RepositoryError> + Send + 'static,
{
    open_with_timeout(what, timeout, move || {
        let index = Index::open_in_dir(&path).map_err(|e| {
            RepositoryError::Corruption(format!(
                "failed to open index at {}: {e}",
                path.display()
            ))
        })?;
        // Generations are swapped wholesale; the open handle never sees
        // new commits, so there is nothing to watch for.
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| storage(e))?;
        let fields = lookup(&index.schema())?;
        Ok(OpenIndex { index, reader, fields })
    })
}

fn stored_str(doc: &TantivyDocument, field: Field, name: &str) -> Result<String, RepositoryError> {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            RepositoryError::Corruption(format!("stored document is missing the '{name}' field"))
        })
}

/// Map an `order_by` token for the brands index. Unrecognized tokens
/// are ignored: no sort is applied, and no error is raised.
fn brand_sort(f: &BrandFields, order_by: Option<&str>) -> Option<(Field, &'static str, bool)> {
    match order_by? {
        "brand_id" => Some((f.brand_id, "brand_id", false)),
        "-brand_id" => Some((f.brand_id, "brand_id", true)),
        "name" => Some((f.brand_name, "brand_name", false)),
        "-name" => Some((f.brand_name, "brand_name", true)),
        _ => None,
    }
}

/// Map an `order_by` token for the models index. Same ignore policy.
fn model_sort(f: &ModelFields, order_by: Option<&str>) -> Option<(Field, &'static str, bool)> {
    match order_by? {
        "brand_id" => Some((f.brand_id, "brand_id", false)),
        "-brand_id" => Some((f.brand_id, "brand_id", true)),
        "model_id" => Some((f.model_id, "model_id", false)),
        "-model_id" => Some((f.model_id, "model_id", true)),
        "name" => Some((f.model_name, "model_name", false)),
        "-name" => Some((f.model_name, "model_name", true)),
        _ => None,
    }
}

/// Run a query and return the requested page of stored documents, along
/// with the total match count and the raw page offset.
///
/// Sorting happens on the denormalized stored scalar after collection;
/// pagination applies to the sorted order.
fn collect_page(
    searcher: &tantivy::Searcher,
    query: &dyn Query,
    limit: u32,
    page: u32,
    sort: Option<(Field, &'static str, bool)>,
) -> Result<(Vec<TantivyDocument>, usize, usize), RepositoryError> {
    let total = searcher.search(query, &Count).map_err(storage)?;

    let page = if page == 0 { 1 } else { page };
    let offset = ((page - 1) as usize).saturating_mul(limit as usize);
    let start = offset.min(total);
    let end = offset.saturating_add(limit as usize).min(total);
    if start >= end {
        return Ok((Vec::new(), total, offset));
    }

    let fetch = if sort.is_some() { total } else { end };
    let top = searcher
        .search(query, &TopDocs::with_limit(fetch))
        .map_err(storage)?;
    let mut docs = Vec::with_capacity(top.len());
    for (_score, addr) in top {
        let doc: TantivyDocument = searcher.doc(addr).map_err(storage)?;
        docs.push(doc);
    }

    if let Some((field, name, descending)) = sort {
        let mut keyed = Vec::with_capacity(docs.len());
        for doc in docs {
            let key = stored_str(&doc, field, name)?;
            keyed.push((key, doc));
        }
        keyed.sort_by(|a, b| if descending { b.0.cmp(&a.0) } else { a.0.cmp(&b.0) });
        docs = keyed.into_iter().map(|(_, doc)| doc).collect();
    }

    let page_docs = docs.into_iter().skip(start).take(end - start).collect();
    Ok((page_docs, total, offset))
}

/// IndexStore serves catalog queries from a fetched package.
pub struct IndexStore {
    working_directory: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    open_timeout: Duration,

    /// Embedded resolver over the unpacked catalog tree. The lock guards
    /// the backing directory: refresh holds the write side while
    /// unarchiving.
    catalog: RwLock<Resolver>,

    brands: RwLock<OpenIndex<BrandFields>>,
    models: RwLock<OpenIndex<ModelFields>>,
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("working_directory", &self.working_directory)
            .field("open_timeout", &self.open_timeout)
            .finish_non_exhaustive()
    }
}

impl IndexStore {
    /// Open a store over `config.working_directory`, optionally fetching
    /// and unpacking the package first (`config.auto_init`). Failure to
    /// open either index is fatal.
    pub fn open(config: StoreConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, RepositoryError> {
        if config.working_directory.as_os_str().is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "no working directory specified".into(),
            ));
        }
        fs::create_dir_all(&config.working_directory).map_err(storage)?;

        if config.auto_init {
            let package = fetcher.file(PACKAGE_FILE)?;
            lorahub_archive::unarchive(&package, &config.working_directory)?;
        }

        let brands = Self::open_brands(&config.working_directory, config.open_timeout)?;
        let models = Self::open_models(&config.working_directory, config.open_timeout)?;
        let catalog = Resolver::new(Arc::new(FsFetcher::new(config.working_directory.clone())));

        Ok(Self {
            working_directory: config.working_directory,
            fetcher,
            open_timeout: config.open_timeout,
            catalog: RwLock::new(catalog),
            brands: RwLock::new(brands),
            models: RwLock::new(models),
        })
    }

    fn open_brands(dir: &Path, timeout: Duration) -> Result<OpenIndex<BrandFields>, RepositoryError> {
        open_index(dir.join(BRANDS_INDEX_PATH), "brands index", timeout, |schema| {
            BrandFields::from_schema(schema)
        })
    }

    fn open_models(dir: &Path, timeout: Duration) -> Result<OpenIndex<ModelFields>, RepositoryError> {
        open_index(dir.join(MODELS_INDEX_PATH), "models index", timeout, |schema| {
            ModelFields::from_schema(schema)
        })
    }

    /// Fetch the package again and swap both indices to the new
    /// generation.
    ///
    /// The unarchive step runs outside the index locks: concurrent
    /// readers keep serving while the bytes land on disk. Each index is
    /// then reopened first and swapped under its write lock; the old
    /// handle is dropped after the lock is released. If a reopen fails,
    /// the store keeps serving the previous generation of that index.
    pub fn refresh(&self) -> Result<(), RepositoryError> {
        let package = self.fetcher.file(PACKAGE_FILE)?;
        {
            let _catalog = self.catalog.write().unwrap();
            lorahub_archive::unarchive(&package, &self.working_directory)?;
        }

        let next = Self::open_brands(&self.working_directory, self.open_timeout)?;
        let old = {
            let mut guard = self.brands.write().unwrap();
            mem::replace(&mut *guard, next)
        };
        drop(old);

        let next = Self::open_models(&self.working_directory, self.open_timeout)?;
        let old = {
            let mut guard = self.models.write().unwrap();
            mem::replace(&mut *guard, next)
        };
        drop(old);

        Ok(())
    }
}

impl CatalogStore for IndexStore {
    fn get_brands(&self, req: &GetBrandsRequest) -> Result<BrandsPage, RepositoryError> {
        let guard = self.brands.read().unwrap();
        let f = guard.fields;
        let searcher = guard.reader.searcher();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, Box::new(AllQuery))];
        if let Some(q) = req.search.as_deref().filter(|s| !s.is_empty()) {
            let parser = QueryParser::for_index(&guard.index, vec![f.brand_id, f.brand_name]);
            let parsed = parser.parse_query(q).map_err(|e| {
                RepositoryError::InvalidArgument(format!("invalid search query: {e}"))
            })?;
            clauses.push((Occur::Must, parsed));
        }
        if let Some(id) = req.brand_id.as_deref().filter(|s| !s.is_empty()) {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(f.brand_id, id),
                    IndexRecordOption::Basic,
                )),
            ));
        }
        let query = BooleanQuery::new(clauses);

        let sort = brand_sort(&f, req.order_by.as_deref());
        let (docs, total, offset) = collect_page(&searcher, &query, req.limit, req.page, sort)?;

        let mut brands = Vec::with_capacity(docs.len());
        for doc in &docs {
            let raw = stored_str(doc, f.brand_pb, "brand_pb")?;
            let brand: Brand = serde_json::from_str(&raw).map_err(|e| {
                RepositoryError::Corruption(format!("stored brand document is invalid: {e}"))
            })?;
            brands.push(brand.project(&req.paths)?);
        }

        Ok(BrandsPage {
            count: brands.len() as u32,
            total: total as u32,
            offset: offset as u32,
            brands,
        })
    }

    fn get_models(&self, req: &GetModelsRequest) -> Result<ModelsPage, RepositoryError> {
        let guard = self.models.read().unwrap();
        let f = guard.fields;
        let searcher = guard.reader.searcher();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, Box::new(AllQuery))];
        if let Some(q) = req.search.as_deref().filter(|s| !s.is_empty()) {
            let parser = QueryParser::for_index(
                &guard.index,
                vec![f.brand_id, f.model_id, f.brand_name, f.model_name],
            );
            let parsed = parser.parse_query(q).map_err(|e| {
                RepositoryError::InvalidArgument(format!("invalid search query: {e}"))
            })?;
            clauses.push((Occur::Must, parsed));
        }
        if let Some(id) = req.brand_id.as_deref().filter(|s| !s.is_empty()) {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(f.brand_id, id),
                    IndexRecordOption::Basic,
                )),
            ));
        }
        if let Some(id) = req.model_id.as_deref().filter(|s| !s.is_empty()) {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(f.model_id, id),
                    IndexRecordOption::Basic,
                )),
            ));
        }
        let query = BooleanQuery::new(clauses);

        let sort = model_sort(&f, req.order_by.as_deref());
        let (docs, total, offset) = collect_page(&searcher, &query, req.limit, req.page, sort)?;

        let mut models = Vec::with_capacity(docs.len());
        for doc in &docs {
            let raw = stored_str(doc, f.model_pb, "model_pb")?;
            let model: Model = serde_json::from_str(&raw).map_err(|e| {
                RepositoryError::Corruption(format!("stored model document is invalid: {e}"))
            })?;
            models.push(model.project(&req.paths)?);
        }

        Ok(ModelsPage {
            count: models.len() as u32,
            total: total as u32,
            offset: offset as u32,
            models,
        })
    }

    fn get_template(&self, ids: &VersionIdentifiers) -> Result<DeviceTemplate, RepositoryError> {
        let catalog = self.catalog.read().unwrap();
        catalog.get_template(ids)
    }

    fn get_uplink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        let catalog = self.catalog.read().unwrap();
        catalog.get_uplink_decoder(ids)
    }

    fn get_downlink_decoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        let catalog = self.catalog.read().unwrap();
        catalog.get_downlink_decoder(ids)
    }

    fn get_downlink_encoder(&self, ids: &VersionIdentifiers) -> Result<String, RepositoryError> {
        let catalog = self.catalog.read().unwrap();
        catalog.get_downlink_encoder(ids)
    }
}
