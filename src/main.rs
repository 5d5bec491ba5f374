use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use shootings_scraper::app::ports::GeocoderPort;
use shootings_scraper::config::AppConfig;
use shootings_scraper::infra::{DstkGeocoder, OfflineGeocoder};
use shootings_scraper::logging;
use shootings_scraper::observability;
use shootings_scraper::pipeline::processing::enrich::{GeocodeCache, GeocodeEnricher};
use shootings_scraper::{ProcessFrameUseCase, TemplateRegistry};

#[derive(Parser)]
#[command(name = "shootings_scraper")]
#[command(about = "Normalize incident tables extracted from wikipedia shooting lists")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to shootings_scraper.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available templates
    Templates,
    /// Print the extraction frame for a template
    Frame {
        #[arg(long)]
        template: String,
    },
    /// Post-process an extractor result
    Process {
        #[arg(long)]
        template: String,
        /// Extractor result as JSON; `-` or no value reads stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Skip geocoding; every row gets empty geocode results
        #[arg(long)]
        offline: bool,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Print a Prometheus metrics snapshot to stderr after the run
        #[arg(long)]
        metrics: bool,
    },
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file '{}'", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read input from stdin")?;
            Ok(buffer)
        }
    }
}

fn build_registry(config: &AppConfig, offline: bool) -> anyhow::Result<TemplateRegistry> {
    let geocoder: Arc<dyn GeocoderPort> = if offline || !config.geocoder.enabled {
        debug!("Geocoding disabled");
        Arc::new(OfflineGeocoder)
    } else {
        Arc::new(DstkGeocoder::new(&config.geocoder)?)
    };
    let enricher = GeocodeEnricher::new(geocoder, Arc::new(GeocodeCache::new()));
    Ok(TemplateRegistry::new(Arc::new(enricher))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _guard = logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Templates => {
            let registry = build_registry(&config, true)?;
            for template in registry.templates() {
                println!("{}\t{}\t{}", template.id, template.root_key(), template.source_url);
            }
        }
        Commands::Frame { template } => {
            let registry = build_registry(&config, true)?;
            let template = registry.require(&template)?;
            let document = serde_json::json!({
                "url": template.source_url,
                "container": template.extraction.container_selector,
                "frame": template.extraction.to_frame(),
                "scrape_options": template.extraction.scrape_options,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Process { template, input, offline, pretty, metrics } => {
            let handle = if metrics { Some(observability::init()?) } else { None };

            let registry = build_registry(&config, offline)?;
            let use_case = ProcessFrameUseCase::new(Arc::new(registry));

            let raw = read_input(input.as_ref())?;
            info!(template = %template, bytes = raw.len(), "Processing extractor result");
            let processed = use_case.run_from_str(&template, &raw).await?;

            let output = if pretty {
                serde_json::to_string_pretty(&processed)?
            } else {
                serde_json::to_string(&processed)?
            };
            println!("{}", output);

            if let Some(handle) = handle {
                eprintln!("{}", handle.render());
            }
        }
    }

    Ok(())
}
