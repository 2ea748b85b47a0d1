// Integration tests for vismatch
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vismatch::prelude::*;
use vismatch::{
    backfill_features, inspect, ErrorKind, ErrorResponse, FeatureOrigin, SearchRequest,
    FEATURE_DIM,
};

fn encode(img: RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn solid(rgb: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(40, 40, image::Rgb(rgb)))
}

fn stripes() -> Vec<u8> {
    encode(RgbImage::from_fn(48, 40, |x, _| {
        if (x / 6) % 2 == 0 {
            image::Rgb([230, 220, 30])
        } else {
            image::Rgb([20, 20, 120])
        }
    }))
}

/// Writes the images and a five-item catalog; item 4 points at a missing file
fn write_fixture(dir: &Path) -> std::path::PathBuf {
    std::fs::write(dir.join("red.png"), solid([220, 30, 30])).unwrap();
    std::fs::write(dir.join("red_copy.png"), solid([220, 30, 30])).unwrap();
    std::fs::write(dir.join("blue.png"), solid([30, 40, 210])).unwrap();
    std::fs::write(dir.join("stripes.png"), stripes()).unwrap();

    let items = vec![
        CatalogItem::new(1, "Red Shirt", "Shirts", 25.0, "red.png"),
        CatalogItem::new(2, "Blue Shirt", "Shirts", 27.5, "blue.png")
            .with_description("Cotton, navy"),
        CatalogItem::new(3, "Red Sneaker", "Shoes", 60.0, "red_copy.png"),
        CatalogItem::new(4, "Lost Boot", "Shoes", 90.0, "missing.png"),
        CatalogItem::new(5, "Striped Scarf", "Accessories", 15.0, "stripes.png"),
    ];
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&items).unwrap()).unwrap();
    path
}

fn engine_for(catalog: Arc<dyn CatalogAccess>, root: &Path) -> SearchEngine {
    let config = EngineConfig::default();
    let pipeline = FeaturePipeline::new(
        Arc::new(StatisticalExtractor::new()),
        Arc::new(FileImageSource::with_root(root)),
        config.fetch_timeout,
    );
    SearchEngine::new(catalog, Arc::new(FeatureCache::new(pipeline)), config).unwrap()
}

#[test]
fn test_extraction_is_deterministic() {
    let bytes = stripes();
    let extractor = StatisticalExtractor::new();

    let first = extractor.extract(&bytes, "stripes.png");
    let second = extractor.extract(&bytes, "stripes.png");
    assert_eq!(first.origin, FeatureOrigin::Measured);
    assert_eq!(first.features.dim(), FEATURE_DIM);
    assert_eq!(first, second);
    assert!(first.features.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn test_invalid_bytes_yield_fallback_of_full_length() {
    let extractor = StatisticalExtractor::new();
    let extraction = extractor.extract(b"definitely not an image", "broken.jpg");

    assert_eq!(extraction.origin, FeatureOrigin::Fallback);
    assert_eq!(extraction.features.dim(), FEATURE_DIM);
    assert_eq!(extraction.features, vismatch::fallback_features("broken.jpg", FEATURE_DIM));
}

#[test]
fn test_inspect_png() {
    let info = inspect(&stripes()).unwrap();
    assert_eq!(info.format, "Png");
    assert_eq!((info.width, info.height), (48, 40));
    assert_eq!(info.channels, 3);
}

#[tokio::test]
async fn test_search_ranks_identical_images_first() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_fixture(dir.path());
    let catalog = Arc::new(JsonCatalog::open(&catalog_path).unwrap());
    let engine = engine_for(catalog, dir.path());

    let query = engine.query_features("red.png").await;
    assert_eq!(query.origin, FeatureOrigin::Measured);

    let results = engine
        .find_similar(&query.features, &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 5);

    // Items 1 and 3 share the same bytes, so the tie resolves by id
    assert_eq!(results[0].id, ItemId::from(1));
    assert_eq!(results[1].id, ItemId::from(3));
    assert_eq!(results[0].similarity, results[1].similarity);
    assert!(results[0].similarity > 0.999);
    assert_eq!(results[0].match_score, 100);
    assert!(results
        .windows(2)
        .all(|pair| pair[0].similarity >= pair[1].similarity));

    let stats = engine.cache().stats();
    assert_eq!(stats.size, 5);
    assert_eq!(stats.fallbacks, 1);
}

#[tokio::test]
async fn test_search_request_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_fixture(dir.path());
    let catalog = Arc::new(JsonCatalog::open(&catalog_path).unwrap());
    let engine = engine_for(catalog, dir.path());

    let features = engine.query_features("blue.png").await.features;
    let body = serde_json::json!({
        "features": features.as_slice(),
        "categoryFilter": "shirts",
        "maxResults": 1,
        "method": "euclidean",
    });
    let request: SearchRequest = serde_json::from_value(body).unwrap();

    let response = engine.search(request).await.unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.results[0].name, "Blue Shirt");
    assert_eq!(response.results[0].description.as_deref(), Some("Cotton, navy"));

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("searchTimeMs").is_some());
    assert_eq!(json["results"][0]["matchScore"], 100);
    assert_eq!(json["stats"]["categories"]["Shirts"], 1);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_fixture(dir.path());
    let catalog = Arc::new(JsonCatalog::open(&catalog_path).unwrap());
    let engine = engine_for(catalog, dir.path());

    let err = engine.search(SearchRequest::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyQuery);

    let response = ErrorResponse::from(&err);
    assert_eq!(response.kind, ErrorKind::EmptyQuery);
}

#[tokio::test]
async fn test_backfill_then_search_uses_persisted_features() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_fixture(dir.path());

    let config = EngineConfig {
        batch_size: 2,
        batch_pause: Duration::from_millis(5),
        ..EngineConfig::default()
    };
    let pipeline = FeaturePipeline::new(
        Arc::new(StatisticalExtractor::new()),
        Arc::new(FileImageSource::with_root(dir.path())),
        config.fetch_timeout,
    );

    let catalog = JsonCatalog::open(&catalog_path).unwrap();
    let report = backfill_features(&catalog, &pipeline, &config).await.unwrap();
    assert_eq!(report.processed, 5);
    assert_eq!(report.persisted, 4);
    assert_eq!(report.fallbacks, 1);
    assert_eq!(report.failed, 0);

    let reopened = Arc::new(JsonCatalog::open(&catalog_path).unwrap());
    let items = reopened.list_items(None).await.unwrap();
    let persisted = items.iter().filter(|i| i.features.is_some()).count();
    assert_eq!(persisted, 4);
    assert_eq!(
        reopened.categories().await.unwrap(),
        vec!["Accessories", "Shirts", "Shoes"]
    );

    let engine = engine_for(reopened, dir.path());
    let query = engine.query_features("stripes.png").await.features;
    let results = engine
        .find_similar(&query, &SearchOptions::default().with_category("Accessories"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, ItemId::from(5));

    // Only the item without persisted features went through the cache
    assert_eq!(engine.cache().stats().total_known_items, 0);
    let all = engine
        .find_similar(&query, &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(engine.cache().stats().total_known_items, 1);
}
