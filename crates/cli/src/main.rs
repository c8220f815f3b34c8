use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wimsnap_core::{
    load_config, naming::random_location_code, read_records, validate_config, Config, Harvester,
    HttpTransport, ImageStore, NetGovernor, NetworkLevel, PathDirector, StdinPrompter,
};

/// Downloads vehicle snapshot images from a monitoring station API.
#[derive(Parser, Debug)]
#[command(name = "wimsnap", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base url of the station API (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Directory images are saved under (overrides config)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Input file with the vehicle records (overrides config)
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Seconds to wait between requests (overrides config)
    #[arg(short, long)]
    download_delay: Option<f64>,

    /// Network restraint level, 0 (ask every time) to 3 (no limits)
    #[arg(short, long)]
    net_level: Option<u8>,

    /// Megabytes allowed before downloads need confirmation, level 1 only
    #[arg(long)]
    data_limit: Option<f64>,

    /// File extension for saved images (overrides config)
    #[arg(long)]
    file_extension: Option<String>,

    /// Verify the station's TLS certificate
    #[arg(long)]
    verify_tls: bool,

    /// Build detail links without the api version segment
    #[arg(long)]
    no_link_version: bool,

    /// Location code used when the API carries no lane description
    #[arg(long)]
    location_code: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    validate_config(&config).context("Configuration validation failed")?;

    let level = NetworkLevel::from_ordinal(config.net.level)
        .context("net.level out of range after validation")?;
    info!("Net level: {}", level);

    let records = read_records(&config.harvest.input_file).with_context(|| {
        format!(
            "Failed to read records from {}",
            config.harvest.input_file.display()
        )
    })?;
    info!(
        "Read {} records from {}",
        records.len(),
        config.harvest.input_file.display()
    );

    let transport = HttpTransport::new(&config.api.base_url, config.api.verify_tls)
        .context("Failed to build HTTP transport")?;
    let governor = NetGovernor::new(
        transport,
        StdinPrompter,
        level,
        config.net.request_delay(),
        config.net.data_limit_bytes(),
    );

    let location_code = match &config.harvest.location_code {
        Some(code) => code.clone(),
        None => {
            let code = random_location_code();
            info!("No location code configured, using random code {:?}", code);
            code
        }
    };

    let harvester = Harvester::new(
        governor,
        ImageStore::new(&config.harvest.save_dir),
        PathDirector::new(&config.harvest.file_extension, location_code),
        config.api.link_has_version,
        config.harvest.tag_preference.clone(),
    );

    let summary = harvester.run(records).await;
    for failure in &summary.failures {
        info!(
            "Vehicle {} failed at {}: {}",
            failure.vehicle_id,
            failure.stage.as_str(),
            failure.message
        );
    }

    Ok(())
}

/// Loads the configuration and layers command line overrides on top.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            let default_path = PathBuf::from("wimsnap.toml");
            if default_path.exists() {
                info!("Loading configuration from {:?}", default_path);
                load_config(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(save_dir) = &args.save_dir {
        config.harvest.save_dir = save_dir.clone();
    }
    if let Some(input_file) = &args.input_file {
        config.harvest.input_file = input_file.clone();
    }
    if let Some(delay) = args.download_delay {
        config.net.request_delay_secs = delay;
    }
    if let Some(level) = args.net_level {
        config.net.level = level;
    }
    if let Some(data_limit) = args.data_limit {
        config.net.data_limit_mb = data_limit;
    }
    if let Some(extension) = &args.file_extension {
        config.harvest.file_extension = extension.clone();
    }
    if args.verify_tls {
        config.api.verify_tls = true;
    }
    if args.no_link_version {
        config.api.link_has_version = false;
    }
    if let Some(code) = &args.location_code {
        config.harvest.location_code = Some(code.clone());
    }

    Ok(config)
}
