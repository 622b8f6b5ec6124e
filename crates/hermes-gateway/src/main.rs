//! Hermes Gateway - Entry point

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use hermes_gateway::{GatewayConfig, GatewayServer};

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("hermes-gateway {}", hermes_gateway::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Hermes Gateway - GraphQL gateway for the Hermes messaging backend

USAGE:
    hermes-gateway [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    PORT, HERMES_LISTEN_PORT   Listen port (default: 4000)
    HERMES_LISTEN_ADDR         Listen address (default: 0.0.0.0)
    REST_API_BASE_URL          Messaging REST API (default: http://localhost:8080)
    REST_API_TIMEOUT           Backend timeout in milliseconds (default: 30000)
    GRAPHQL_INTROSPECTION      Allow schema introspection (true/false)
    GRAPHQL_PLAYGROUND         Serve the GraphQL playground (true/false)
    NODE_ENV, HERMES_ENV       'production' masks internal error messages
    LOG_LEVEL                  Log level or filter directive (default: info)
    LOG_FORMAT                 json or pretty (default: json)
    HERMES_METRICS_ENABLED     Serve Prometheus metrics on /metrics (default: true)

EXAMPLES:
    hermes-gateway --config /etc/hermes/gateway.toml
    REST_API_BASE_URL=http://messaging:8080 hermes-gateway
"
    );
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<GatewayConfig> {
    let config = match path {
        Some(path) => GatewayConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    let config = config.with_env_overrides();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The subscriber depends on the configuration, so failures before this
    // point go to stderr through the returned error.
    let config = load_config(args.config)?;
    let telemetry = config
        .to_telemetry_config()
        .context("invalid telemetry configuration")?;
    let metrics = hermes_telemetry::init_telemetry(&telemetry)
        .context("failed to initialize telemetry")?;

    info!(
        version = hermes_gateway::VERSION,
        listen = %config.listen_address(),
        backend = %config.backend.base_url,
        production = config.server.production,
        "Starting Hermes gateway"
    );

    let server = GatewayServer::new(config, metrics).context("failed to create server")?;
    server.run().await.context("server error")?;

    Ok(())
}
