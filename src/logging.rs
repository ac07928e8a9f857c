//! Diagnostic logging on stderr.
//!
//! Progress lines meant for the user are printed on stdout by the executor;
//! this subscriber only carries `tracing` events, filtered by `RUST_LOG`.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Default level when `RUST_LOG` is not set.
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let level = default_level(verbose);
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("pylaunch={level}")));

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::{default_level, init_logging};
    use tracing::Level;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::DEBUG);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(false);
        init_logging(true);
    }
}
