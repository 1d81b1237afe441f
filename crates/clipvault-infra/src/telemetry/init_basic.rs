use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "clipvault=debug,tower_http=debug";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set. `json` switches the formatter to
/// one JSON object per line.
pub fn init_telemetry(
    service_name: &str,
    environment: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_current_span(true)))
        .with((!json).then(fmt::layer))
        .try_init()?;

    tracing::info!(
        service.name = %service_name,
        environment = %environment,
        json,
        "Tracing initialized"
    );
    Ok(())
}
