//! Nutrition rule check binary.
//!
//! Usage: `nutrirule-check <request.json>`. The response is written to
//! stdout as JSON; logs go to stderr.

use std::fs::File;
use std::io::{BufReader, Write};

use nutrirule_engine::{EngineConfig, NutritionEngine, DEFAULT_CACHE_CAPACITY};
use nutrirule_loader::{discover_rule_files, LoaderConfig, RuleStore};
use nutrirule_service::{CheckRequest, Checker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATA_PATH: &str = "data/rules";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let request_path = std::env::args()
        .nth(1)
        .ok_or("usage: nutrirule-check <request.json>")?;

    // Get data path from env or use default
    let data_path = std::env::var("NUTRIRULE_DATA_PATH")
        .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

    let cache_capacity = match std::env::var("NUTRIRULE_CACHE_CAPACITY") {
        Ok(raw) => raw.parse::<usize>()?,
        Err(_) => DEFAULT_CACHE_CAPACITY,
    };

    tracing::info!("Loading condition rules from: {}", data_path);

    let files = discover_rule_files(&data_path)?;
    tracing::info!("Discovered rule files: {:?}", files.release_date);

    let mut store = RuleStore::new();
    #[cfg(feature = "parallel")]
    let stats = store.load_all_parallel(&files, &LoaderConfig::default())?;
    #[cfg(not(feature = "parallel"))]
    let stats = store.load_all(&files, &LoaderConfig::default())?;

    tracing::info!(
        "Loaded {} conditions ({} bounds, {} foods, {} guidance notes) in {}ms",
        stats.conditions,
        stats.bounds,
        stats.foods,
        stats.guidance,
        stats.load_time_ms
    );

    let request: CheckRequest = serde_json::from_reader(BufReader::new(File::open(&request_path)?))?;
    tracing::info!("Evaluating request from: {}", request_path);

    let engine = NutritionEngine::new(EngineConfig {
        cache_capacity,
        ..EngineConfig::default()
    });
    let mut checker = Checker::new(store, engine);
    let response = checker.check(request)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &response)?;
    writeln!(stdout)?;

    Ok(())
}
