//! Structured logging setup for the key rotation job

use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// AWS SDK internals only log warnings and above unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: &[&str] = &[
    "aws_config=warn",
    "aws_smithy_runtime=warn",
    "aws_smithy_runtime_api=warn",
    "hyper=warn",
    "rustls=warn",
];

/// Build the filter: `RUST_LOG` wins, otherwise `default_level` plus the
/// SDK directives above.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = std::iter::once(default_level)
            .chain(QUIET_DEPENDENCIES.iter().copied())
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    })
}

/// Initialize structured logging
///
/// This sets up:
/// - JSON formatted logs (for production)
/// - Environment-based log level filtering
/// - Service name tagging
pub fn init_logging(service_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    tracing::info!(
        service = service_name,
        "Logging initialized"
    );
}

/// Initialize simple console logging (for development)
pub fn init_console_logging(service_name: &str, default_level: &str) {
    console_subscriber(default_level, std::io::stdout).init();

    tracing::info!(
        service = service_name,
        "Console logging initialized"
    );
}

fn console_subscriber<W>(
    default_level: &str,
    writer: W,
) -> fmt::Subscriber<fmt::format::DefaultFields, fmt::format::Format, EnvFilter, W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_filter_includes_default_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_filter("debug").to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("aws_smithy_runtime=warn"));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_lines_carry_source_location() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = console_subscriber("info", move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("located");
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("located"));
        assert!(output.contains("src/lib.rs"));
    }
}
