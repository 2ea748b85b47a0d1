use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vismatch::{
    backfill_features, inspect, CatalogAccess, DefaultImageSource, EngineConfig, FeatureCache,
    FeatureOrigin, FeaturePipeline, FileImageSource, HttpImageSource, ImageSource, JsonCatalog,
    Metric, SearchEngine, SearchRequest, StatisticalExtractor,
};

/// Visual product search over an image catalog
#[derive(Parser, Debug)]
#[command(name = "vismatch")]
#[command(about = "Image feature extraction and visual similarity search", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Image fetch timeout in seconds
    #[arg(long, default_value_t = 15, global = true)]
    fetch_timeout_secs: u64,

    /// Catalog items resolved concurrently per search
    #[arg(long, default_value_t = 5, global = true)]
    concurrency: usize,

    /// Items per backfill batch
    #[arg(long, default_value_t = 5, global = true)]
    batch_size: usize,

    /// Pause between backfill batches in milliseconds
    #[arg(long, default_value_t = 100, global = true)]
    batch_pause_ms: u64,

    /// Root directory for relative image paths
    #[arg(long, global = true)]
    image_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the feature vector of an image
    Extract {
        /// Image path or http(s) URL
        image: String,
    },
    /// Print format, color type and dimensions of an image
    Inspect {
        /// Image path or http(s) URL
        image: String,
    },
    /// Rank catalog items by visual similarity to an image
    Search(SearchArgs),
    /// Compute and persist features for catalog items that have none
    Backfill {
        /// Path to the JSON catalog
        #[arg(short, long)]
        catalog: PathBuf,
    },
    /// List distinct catalog categories
    Categories {
        /// Path to the JSON catalog
        #[arg(short, long)]
        catalog: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    /// Path to the JSON catalog
    #[arg(short, long)]
    catalog: PathBuf,

    /// Query image path or http(s) URL
    #[arg(short, long)]
    image: String,

    /// Only rank items of this category
    #[arg(long)]
    category: Option<String>,

    /// Drop results below this similarity
    #[arg(long, default_value_t = 0.0)]
    min_similarity: f32,

    /// Maximum number of results (capped at 100)
    #[arg(long, default_value_t = 50)]
    max_results: usize,

    /// Similarity method: cosine or euclidean
    #[arg(long, default_value = "cosine")]
    method: Metric,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractOutput<'a> {
    image: &'a str,
    origin: FeatureOrigin,
    dimension: usize,
    features: &'a [f32],
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn engine_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let config = EngineConfig {
        fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
        max_concurrency: args.concurrency,
        batch_size: args.batch_size,
        batch_pause: Duration::from_millis(args.batch_pause_ms),
        ..EngineConfig::default()
    };
    config.validate()?;
    Ok(config)
}

fn image_source(args: &Args, config: &EngineConfig) -> anyhow::Result<Arc<DefaultImageSource>> {
    let files = match &args.image_root {
        Some(root) => FileImageSource::with_root(root),
        None => FileImageSource::new(),
    };
    let http = HttpImageSource::new(config.fetch_timeout)?;
    Ok(Arc::new(DefaultImageSource::new(files, http)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = engine_config(&args)?;
    let source = image_source(&args, &config)?;
    let pipeline = FeaturePipeline::new(
        Arc::new(StatisticalExtractor::with_dimension(config.dimension)),
        source.clone(),
        config.fetch_timeout,
    );

    match &args.command {
        Command::Extract { image } => {
            let extraction = pipeline.extract(image).await;
            print_json(&ExtractOutput {
                image,
                origin: extraction.origin,
                dimension: extraction.features.dim(),
                features: extraction.features.as_slice(),
            })?;
        }
        Command::Inspect { image } => {
            let bytes = source
                .fetch(image)
                .await
                .map_err(vismatch::Error::from)
                .with_context(|| format!("failed to fetch {}", image))?;
            let info = inspect(&bytes).map_err(vismatch::Error::from)?;
            print_json(&info)?;
        }
        Command::Search(search) => {
            let catalog = Arc::new(JsonCatalog::open(&search.catalog).with_context(|| {
                format!("failed to open catalog {}", search.catalog.display())
            })?);
            let engine = SearchEngine::new(catalog, Arc::new(FeatureCache::new(pipeline)), config)?;

            let query = engine.query_features(&search.image).await;
            if query.origin == FeatureOrigin::Fallback {
                info!(image = %search.image, "query image could not be measured, using fallback features");
            }

            let request = SearchRequest {
                features: query.features.into_inner(),
                category_filter: search.category.clone(),
                min_similarity: Some(search.min_similarity),
                max_results: Some(search.max_results),
                method: Some(search.method),
            };
            let response = engine.search(request).await?;
            print_json(&response)?;
        }
        Command::Backfill { catalog } => {
            let catalog = JsonCatalog::open(catalog)
                .with_context(|| format!("failed to open catalog {}", catalog.display()))?;
            let report = backfill_features(&catalog, &pipeline, &config).await?;
            info!(path = %catalog.path().display(), persisted = report.persisted, "catalog updated");
            print_json(&report)?;
        }
        Command::Categories { catalog } => {
            let catalog = JsonCatalog::open(catalog)
                .with_context(|| format!("failed to open catalog {}", catalog.display()))?;
            print_json(&catalog.categories().await?)?;
        }
    }

    Ok(())
}
