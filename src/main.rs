use clap::Parser;
use startflow_api::RestApi;
use startflow_models::Services;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Startup ecosystem prediction services
#[derive(Parser, Debug)]
#[command(name = "startflow")]
#[command(about = "Company recommendations, startup success and profit predictions over HTTP", long_about = None)]
struct Args {
    /// Directory holding trained model artifacts
    #[arg(short, long, env = "STARTFLOW_MODEL_DIR", default_value = "./models")]
    model_dir: PathBuf,

    /// Address to bind the HTTP API to
    #[arg(long, env = "STARTFLOW_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "STARTFLOW_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Log level
    #[arg(long, env = "STARTFLOW_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Train or load models on first request instead of at start-up
    #[arg(long, env = "STARTFLOW_LAZY_INIT")]
    lazy_init: bool,
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
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting StartFlow v{}", env!("CARGO_PKG_VERSION"));
    info!("Model directory: {:?}", args.model_dir);
    info!("HTTP API: {}:{}", args.host, args.http_port);

    let services = Arc::new(Services::new(&args.model_dir)?);
    if args.lazy_init {
        info!("Lazy initialization: models load on first request");
    } else {
        let model_dir = args.model_dir.clone();
        let warm = services.clone();
        tokio::task::spawn_blocking(move || warm.warm_up())
            .await?
            .map_err(|e| anyhow::anyhow!("failed to prepare models in {:?}: {}", model_dir, e))?;
        info!("Models ready");
    }

    let services_http = services.clone();
    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(services_http, host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("StartFlow started successfully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
