use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str =
    "info,wgpu_core=warn,wgpu_hal=warn,naga=warn,cosmic_text=warn,iced_wgpu=warn";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default filter. Safe to call more than once.
pub fn init_logging() {
    LOGGING_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = fmt().with_env_filter(env_filter).try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_suppresses_renderer_noise() {
        assert!(DEFAULT_LOG_FILTER.starts_with("info"));
        assert!(DEFAULT_LOG_FILTER.contains("wgpu_core=warn"));
    }

    #[test]
    fn test_init_logging_can_be_called_multiple_times() {
        init_logging();
        init_logging();
    }
}
