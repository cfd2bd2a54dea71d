use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

/// Installs the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG` directives are honoured on top of the crate's `info` default. Call through
/// [`crate::init`]; a second install is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
        .add_directive(
            "spendlog=info"
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        );

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
