use anyhow::Context as _;
use report_polish_service::{DeepSeekConfig, create_app};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; `LOG_FORMAT=pretty` for development, JSON otherwise
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "report_polish_service=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DeepSeekConfig::from_env()?;
    if config.api_key.is_none() {
        // Still serve: validation errors are reported before the missing key.
        warn!("DEEPSEEK_API_KEY is not set; polish requests will fail with 500");
    }

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    info!(
        base_url = %config.base_url,
        model = %config.model,
        timeout_secs = config.timeout.map(|t| t.as_secs()),
        "Upstream completion API configured"
    );

    let app = create_app(config).context("failed to build HTTP client")?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    let addr = listener.local_addr()?;

    info!("Report polish service starting on {}", addr);
    info!("Polish endpoint: POST http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
