use clap::{Parser, ValueEnum};
use pkg_api::server::{ServerConfig, start_server};
use pkg_constants::network::DEFAULT_API_PORT;
use pkg_constants::paths::{DEFAULT_SERVER_CONFIG, DEFAULT_SERVER_DATA_DIR};
use pkg_types::config::{ServerConfigFile, load_config_file};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rbac-server", about = "RBAC authorization server")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// Keep all state in memory (for local testing)
    #[arg(long)]
    ephemeral: bool,

    /// Skip creating the built-in roles and bindings
    #[arg(long)]
    no_seed: bool,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config is read before logging is up so the file can pick the format.
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;

    let log_format = match cli.log_format {
        Some(format) => format,
        None => match file_cfg.log_format.as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        },
    };
    init_tracing(log_format);
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(DEFAULT_API_PORT);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| DEFAULT_SERVER_DATA_DIR.to_string());
    let seed_defaults = !cli.no_seed && file_cfg.seed_defaults.unwrap_or(true);

    info!("Starting rbac-server");
    info!("  Port:      {}", port);
    if cli.ephemeral {
        info!("  Data dir:  (in-memory)");
    } else {
        info!("  Data dir:  {}", data_dir);
    }
    info!("  Seeding:   {}", seed_defaults);

    let config = ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        data_dir,
        ephemeral: cli.ephemeral,
        seed_defaults,
    };

    start_server(config).await?;

    Ok(())
}
