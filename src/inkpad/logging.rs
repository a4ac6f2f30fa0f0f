use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "INKPAD_LOG";

/// Installs the stderr subscriber. `INKPAD_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "inkpad=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return;
    }

    tracing::debug!(verbose, "tracing initialized");
}
