use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with file and line numbers.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

fn default_filter(service_name: &str) -> EnvFilter {
    // crate targets use underscores even when the binary name has dashes
    let target = service_name.replace('-', "_");
    EnvFilter::new(format!("info,{target}=debug,incollege_shared=debug,tower_http=debug"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(service_name: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(service_name));

    let output: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
    };

    tracing_subscriber::registry().with(output).with(filter).init();

    tracing::info!(service = service_name, ?format, "tracing initialized");
}
