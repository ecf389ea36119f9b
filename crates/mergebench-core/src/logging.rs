use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging on stderr, plus a log file when `log_dir` is given.
///
/// Stdout is left alone so reports can be piped. `RUST_LOG` overrides the
/// default filter; `debug` turns on the per-scenario routing trace.
/// The returned guard must be held for the lifetime of the process so the
/// file writer flushes.
pub fn init_logging(log_dir: Option<&Path>, debug: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = if debug {
        "info,mergebench=debug,mergebench_core=debug"
    } else {
        "info"
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = rolling::never(dir, "mergebench.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(guard)
}
