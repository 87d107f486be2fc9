// ABOUTME: Entry point for the signer gateway
// ABOUTME: Wires collaborators into shared state and serves the axum router

use dotenv::dotenv;
use gateway_api::api::http::routes;
use gateway_api::settings::Settings;
use gateway_api::state::GatewayState;
use gateway_core::config::SecretKeysFile;
use gateway_core::daemon::DaemonClient;
use gateway_core::device::UsbDeviceWatcher;
use gateway_core::probe::{GpioPin, IcmpProber, NodeExporter};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n\n================================================");
    println!("🔏 Signer Gateway Starting...");

    // Load environment variables
    dotenv().ok();

    // Initialize tracing with JSON format for production
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production = env::var("RUST_ENV").unwrap_or_default() == "production";

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
        eprintln!("✔︎ Structured JSON logging enabled (production mode)");
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        println!("✔︎ Human-readable logging enabled (development mode)");
    }

    // Setup shutdown signal handler
    tokio::spawn(async {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n\n================================================");
                println!("🫡 Shutdown signal received");
                println!("✔︎ Gateway shutdown complete");
                println!("================================================");
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
    });

    let settings = Settings::from_env();
    println!("✔︎ Settings loaded (daemon at {})", settings.daemon_url);

    // Create shared state with explicitly constructed collaborators
    let state = Arc::new(GatewayState {
        daemon: DaemonClient::new(&settings.daemon_url, settings.daemon_timeout),
        config: Arc::new(SecretKeysFile::new(
            &settings.secret_keys_path,
            &settings.device_url_entry,
        )),
        device: Arc::new(UsbDeviceWatcher::new(&settings.signer_usb_id)),
        prober: Arc::new(IcmpProber::new(
            &settings.probe_target_ip,
            settings.probe_timeout,
        )),
        power: Arc::new(GpioPin::new(settings.power_pin)),
        metrics: Arc::new(NodeExporter::new(
            &settings.metrics_url,
            settings.probe_timeout,
        )),
        health: settings.health.clone(),
        signer_lock: tokio::sync::Mutex::new(()),
    });
    println!("✔︎ Collaborators initialized");

    // Permissive CORS: the gateway sits behind its own TLS/auth layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    println!("✔︎ Gateway listening on {}", listener.local_addr()?);
    println!("================================================");

    axum::serve(listener, app).await?;

    Ok(())
}
