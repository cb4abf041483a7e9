use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Both formats write to
/// stderr so stdout stays free for command output. Fails if a global
/// subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    build_subscriber(config, std::io::stderr).try_init()?;

    tracing::debug!(level = %config.level, "logging initialized");
    Ok(())
}

fn build_subscriber<W>(config: &LoggingConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => Box::new(
            tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Pretty => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(writer)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(buffer: &SharedBuffer) -> String {
        String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_json_format_uses_given_writer() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Json,
        };
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();

        let subscriber = build_subscriber(&config, move || sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("remember token rotated");
        });

        let output = captured(&buffer);
        assert!(output.contains("\"level\":\"WARN\""), "{output}");
        assert!(output.contains("remember token rotated"), "{output}");
    }

    #[test]
    fn test_pretty_format_uses_given_writer() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        };
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();

        let subscriber = build_subscriber(&config, move || sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("remember token rotated");
        });

        assert!(captured(&buffer).contains("remember token rotated"));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        };

        // Another test may have installed a subscriber first; either way the
        // second attempt must be rejected rather than panic.
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
