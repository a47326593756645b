use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use lorahub_catalog::{CatalogStore, GetBrandsRequest, GetModelsRequest, VersionIdentifiers};
use lorahub_fetch::FsFetcher;
use lorahub_index::{IndexStore, StoreConfig, create_package, worker};

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Write a small catalog. `suffix` marks the generation in every name so
/// tests can tell which generation a query hit.
fn write_catalog(root: &Path, suffix: &str) {
    write_file(
        root,
        "vendor/index.yaml",
        &format!(
            r#"
vendors:
- id: foo-vendor
  name: Foo Vendor{suffix}
  vendorID: 42
- id: full-vendor
  name: Full Vendor{suffix}
  vendorID: 44
  email: mail@example.com
- id: lonely-vendor
  name: Lonely Vendor
- id: empty-vendor
  name: Empty Vendor
- id: draft-vendor
  name: Draft
  draft: true
"#
        ),
    );
    write_file(root, "vendor/foo-vendor/index.yaml", "endDevices: [dev1, dev2]");
    write_file(
        root,
        "vendor/foo-vendor/dev1.yaml",
        &format!(
            r#"
name: Device 1{suffix}
description: My Description
hardwareVersions:
- version: 1.0
  numeric: 1
firmwareVersions:
- version: 1.0
  hardwareVersions: [1.0]
  profiles:
    EU863-870: {{id: profile1, lorawanCertified: true}}
"#
        ),
    );
    write_file(
        root,
        "vendor/foo-vendor/dev2.yaml",
        &format!(
            r#"
name: Device 2{suffix}
hardwareVersions:
- version: 2.0
  numeric: 2
firmwareVersions:
- version: 1.1
  hardwareVersions: [2.0]
  profiles:
    EU433: {{codec: foo-codec, id: profile2, lorawanCertified: true}}
"#
        ),
    );
    write_file(
        root,
        "vendor/foo-vendor/profile1.yaml",
        r#"
supportsClassB: false
supportsClassC: false
macVersion: 1.0.3
regionalParametersVersion: RP001-1.0.3-RevA
supportsJoin: true
maxEIRP: 27
supports32bitFCnt: true
"#,
    );
    write_file(
        root,
        "vendor/foo-vendor/profile2.yaml",
        r#"
supportsClassB: false
supportsClassC: true
macVersion: 1.0.2
regionalParametersVersion: RP001-1.0.2-RevB
supportsJoin: true
maxEIRP: 16
supports32bitFCnt: true
"#,
    );
    write_file(
        root,
        "vendor/foo-vendor/foo-codec.yaml",
        r#"
uplinkDecoder: {fileName: a.js}
downlinkDecoder: {fileName: b.js}
downlinkEncoder: {fileName: c.js}
"#,
    );
    write_file(root, "vendor/foo-vendor/a.js", "uplink decoder");
    write_file(root, "vendor/foo-vendor/b.js", "downlink decoder");
    write_file(root, "vendor/foo-vendor/c.js", "downlink encoder");
    write_file(root, "vendor/full-vendor/index.yaml", "endDevices: [full-device]");
    write_file(
        root,
        "vendor/full-vendor/full-device.yaml",
        &format!("name: Full Device{suffix}\ndescription: A description"),
    );
    // Listed but without any models: excluded from the package.
    write_file(root, "vendor/empty-vendor/index.yaml", "endDevices: []");
    // Files that must not end up in the package.
    write_file(root, "README.md", "not packaged");
    write_file(root, "vendor/foo-vendor/notes.txt", "not packaged");
}

fn build_package(src: &Path, dest: &Path) {
    create_package(Arc::new(FsFetcher::new(src)), src, dest, true).unwrap();
}

struct Fixture {
    src: TempDir,
    pkg: TempDir,
    work: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            src: TempDir::new().unwrap(),
            pkg: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
        };
        write_catalog(fixture.src.path(), "");
        build_package(fixture.src.path(), &fixture.package_file());
        fixture
    }

    fn package_file(&self) -> std::path::PathBuf {
        self.pkg.path().join("package.zip")
    }

    fn open_store(&self) -> IndexStore {
        IndexStore::open(
            StoreConfig {
                working_directory: self.work.path().join("store"),
                auto_init: true,
                ..Default::default()
            },
            Arc::new(FsFetcher::new(self.pkg.path())),
        )
        .unwrap()
    }

    /// Rebuild the package with a new generation marker.
    fn rebuild(&self, suffix: &str) {
        write_catalog(self.src.path(), suffix);
        build_package(self.src.path(), &self.package_file());
    }
}

fn paths(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn brand_ids(store: &IndexStore, req: &GetBrandsRequest) -> Vec<String> {
    store
        .get_brands(req)
        .unwrap()
        .brands
        .into_iter()
        .map(|b| b.brand_id)
        .collect()
}

#[test]
fn missing_working_directory_is_invalid_argument() {
    let fixture = Fixture::new();
    let err = IndexStore::open(
        StoreConfig::default(),
        Arc::new(FsFetcher::new(fixture.pkg.path())),
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_ARGUMENT");
}

#[test]
fn brands_exclude_vendors_without_models() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            order_by: Some("brand_id".into()),
            paths: paths(&["brand_id", "name"]),
            ..Default::default()
        })
        .unwrap();

    // lonely-vendor (no listing), empty-vendor (zero models) and the
    // draft vendor are all absent from the package.
    let ids: Vec<_> = page.brands.iter().map(|b| b.brand_id.as_str()).collect();
    assert_eq!(ids, vec!["foo-vendor", "full-vendor"]);
    assert_eq!(page.total, 2);
    assert_eq!(page.brands[0].name, "Foo Vendor");
}

#[test]
fn brands_sorting() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let req = |order: &str| GetBrandsRequest {
        limit: 10,
        order_by: Some(order.into()),
        paths: paths(&["brand_id"]),
        ..Default::default()
    };

    assert_eq!(brand_ids(&store, &req("brand_id")), vec!["foo-vendor", "full-vendor"]);
    assert_eq!(brand_ids(&store, &req("-brand_id")), vec!["full-vendor", "foo-vendor"]);
    assert_eq!(brand_ids(&store, &req("name")), vec!["foo-vendor", "full-vendor"]);
    assert_eq!(brand_ids(&store, &req("-name")), vec!["full-vendor", "foo-vendor"]);
}

#[test]
fn unrecognized_order_by_is_ignored() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let unsorted = GetBrandsRequest {
        limit: 10,
        paths: paths(&["brand_id"]),
        ..Default::default()
    };
    let bogus = GetBrandsRequest {
        order_by: Some("bogus-field".into()),
        ..unsorted.clone()
    };
    // Not an error, and exactly the unsorted behavior.
    assert_eq!(brand_ids(&store, &bogus), brand_ids(&store, &unsorted));
}

#[test]
fn brands_pagination_after_sort() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 1,
            page: 2,
            order_by: Some("-brand_id".into()),
            paths: paths(&["brand_id"]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.brands[0].brand_id, "foo-vendor");
    assert_eq!(page.count, 1);
    assert_eq!(page.total, 2);
    assert_eq!(page.offset, 1);
}

#[test]
fn brands_zero_limit_counts_without_hits() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store.get_brands(&GetBrandsRequest::default()).unwrap();
    assert_eq!(page.count, 0);
    assert!(page.brands.is_empty());
    assert_eq!(page.total, 2);
}

#[test]
fn brands_search_and_exact_filter() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            search: Some("Full".into()),
            paths: paths(&["brand_id"]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.brands[0].brand_id, "full-vendor");
    assert_eq!(page.total, 1);

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            brand_id: Some("foo-vendor".into()),
            paths: paths(&["brand_id", "name"]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.brands[0].brand_id, "foo-vendor");
    assert_eq!(page.total, 1);

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            brand_id: Some("unknown".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(page.brands.is_empty());
    assert_eq!(page.total, 0);
}

#[test]
fn brands_field_mask() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            brand_id: Some("full-vendor".into()),
            paths: paths(&["brand_id"]),
            ..Default::default()
        })
        .unwrap();
    let brand = &page.brands[0];
    assert_eq!(brand.brand_id, "full-vendor");
    assert_eq!(brand.name, "");
    assert_eq!(brand.email, None);
}

#[test]
fn models_query_surface() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let page = store
        .get_models(&GetModelsRequest {
            limit: 10,
            order_by: Some("model_id".into()),
            paths: paths(&["brand_id", "model_id", "name"]),
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<_> = page.models.iter().map(|m| m.model_id.as_str()).collect();
    assert_eq!(ids, vec!["dev1", "dev2", "full-device"]);
    assert_eq!(page.total, 3);

    let page = store
        .get_models(&GetModelsRequest {
            limit: 10,
            order_by: Some("-model_id".into()),
            brand_id: Some("foo-vendor".into()),
            paths: paths(&["model_id"]),
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<_> = page.models.iter().map(|m| m.model_id.as_str()).collect();
    assert_eq!(ids, vec!["dev2", "dev1"]);

    let page = store
        .get_models(&GetModelsRequest {
            limit: 10,
            model_id: Some("full-device".into()),
            paths: paths(&["brand_id", "model_id", "description"]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.models[0].brand_id, "full-vendor");
    assert_eq!(page.models[0].description.as_deref(), Some("A description"));
    assert_eq!(page.models[0].name, "");

    let page = store
        .get_models(&GetModelsRequest {
            limit: 10,
            search: Some("full".into()),
            paths: paths(&["model_id"]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.models[0].model_id, "full-device");
    assert_eq!(page.total, 1);
}

#[test]
fn template_and_codec_delegate_to_unpacked_catalog() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    let ids = VersionIdentifiers {
        brand_id: "foo-vendor".into(),
        model_id: "dev2".into(),
        firmware_version: "1.1".into(),
        hardware_version: "2.0".into(),
        band_id: "EU_433".into(),
    };
    let template = store.get_template(&ids).unwrap();
    assert_eq!(template.mac_version, "1.0.2");
    assert!(template.supports_class_c);

    assert_eq!(store.get_uplink_decoder(&ids).unwrap(), "uplink decoder");
    assert_eq!(store.get_downlink_decoder(&ids).unwrap(), "downlink decoder");
    assert_eq!(store.get_downlink_encoder(&ids).unwrap(), "downlink encoder");

    let missing = VersionIdentifiers {
        band_id: "US_902_928".into(),
        ..ids
    };
    assert_eq!(
        store.get_template(&missing).unwrap_err().error_code(),
        "NOT_FOUND"
    );
}

#[test]
fn package_contains_only_indices_and_catalog_assets() {
    let fixture = Fixture::new();

    let unpacked = TempDir::new().unwrap();
    lorahub_archive::unarchive(&fs::read(fixture.package_file()).unwrap(), unpacked.path())
        .unwrap();

    assert!(unpacked.path().join("brands-index/meta.json").is_file());
    assert!(unpacked.path().join("models-index/meta.json").is_file());
    assert!(unpacked.path().join("vendor/index.yaml").is_file());
    assert!(unpacked.path().join("vendor/foo-vendor/a.js").is_file());
    assert!(!unpacked.path().join("README.md").exists());
    assert!(!unpacked.path().join("vendor/foo-vendor/notes.txt").exists());
    assert!(!unpacked.path().join("package.zip").exists());
}

#[test]
fn refresh_swaps_to_new_generation() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    assert_eq!(
        store
            .get_brands(&GetBrandsRequest {
                limit: 10,
                brand_id: Some("foo-vendor".into()),
                ..Default::default()
            })
            .unwrap()
            .brands[0]
            .name,
        "Foo Vendor"
    );

    fixture.rebuild(" II");
    store.refresh().unwrap();

    let page = store
        .get_brands(&GetBrandsRequest {
            limit: 10,
            order_by: Some("brand_id".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.brands[0].name, "Foo Vendor II");
    assert_eq!(page.brands[1].name, "Full Vendor II");

    let models = store
        .get_models(&GetModelsRequest {
            limit: 10,
            model_id: Some("dev1".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(models.models[0].name, "Device 1 II");
}

#[test]
fn failed_refresh_keeps_serving_last_good_generation() {
    let fixture = Fixture::new();
    let store = fixture.open_store();

    // Unfetchable/corrupt package: refresh fails before touching indices.
    fs::write(fixture.package_file(), b"not a zip").unwrap();
    let err = store.refresh().unwrap_err();
    assert_eq!(err.error_code(), "CORRUPTION");
    assert_eq!(brand_ids(&store, &GetBrandsRequest { limit: 10, ..Default::default() }).len(), 2);

    // A package whose brands index is damaged: the unarchive succeeds
    // but the reopen fails, and the already-open generation keeps
    // serving both indices.
    let bad = TempDir::new().unwrap();
    write_file(bad.path(), "brands-index/meta.json", "garbage");
    lorahub_archive::archive(bad.path(), &fixture.package_file(), &|path| {
        path.file_name().map(|_| "brands-index/meta.json".to_string())
    })
    .unwrap();

    let err = store.refresh().unwrap_err();
    assert_eq!(err.error_code(), "CORRUPTION");

    let brands = store
        .get_brands(&GetBrandsRequest { limit: 10, paths: paths(&["brand_id", "name"]), ..Default::default() })
        .unwrap();
    assert_eq!(brands.total, 2);
    let models = store
        .get_models(&GetModelsRequest { limit: 10, ..Default::default() })
        .unwrap();
    assert_eq!(models.total, 3);
}

#[test]
fn queries_never_observe_a_mixed_generation() {
    let fixture = Fixture::new();
    let store = Arc::new(fixture.open_store());

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..50 {
                        let page = store
                            .get_brands(&GetBrandsRequest {
                                limit: 10,
                                order_by: Some("brand_id".into()),
                                paths: paths(&["brand_id", "name"]),
                                ..Default::default()
                            })
                            .unwrap();
                        assert_eq!(page.brands.len(), 2);
                        // Every brand in one response must come from the
                        // same generation of the brands index.
                        let gen2 = page.brands[0].name.ends_with(" II");
                        for brand in &page.brands {
                            assert_eq!(brand.name.ends_with(" II"), gen2, "mixed generations");
                        }
                    }
                })
            })
            .collect();

        fixture.rebuild(" II");
        store.refresh().unwrap();

        for reader in readers {
            reader.join().unwrap();
        }
    });
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_refreshes_periodically() {
    let fixture = Fixture::new();
    let store = Arc::new(fixture.open_store());

    let handle = worker::start(
        Arc::clone(&store),
        worker::RefreshConfig {
            interval: Duration::from_millis(50),
        },
    );

    fixture.rebuild(" II");
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let name = store
            .get_brands(&GetBrandsRequest {
                limit: 10,
                brand_id: Some("foo-vendor".into()),
                ..Default::default()
            })
            .unwrap()
            .brands[0]
            .name
            .clone();
        if name == "Foo Vendor II" {
            break;
        }
        assert!(Instant::now() < deadline, "worker never refreshed the store");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    handle.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_stop_is_synchronous() {
    let fixture = Fixture::new();
    let store = Arc::new(fixture.open_store());

    let handle = worker::start(
        Arc::clone(&store),
        worker::RefreshConfig {
            interval: Duration::from_secs(3600),
        },
    );
    let started = Instant::now();
    handle.stop().await;
    assert!(started.elapsed() < Duration::from_secs(1));
}
