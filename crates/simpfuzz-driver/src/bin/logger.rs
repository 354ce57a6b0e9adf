use std::{fs, io, sync::Arc};

use simpfuzz_config as config;
use tracing::{Dispatch, Level};
use tracing_subscriber::{Registry, filter::Targets, fmt::writer::BoxMakeWriter, prelude::*};

const CAMPAIGN_FILE: &str = "campaign";

/// Installs the global subscriber: a JSON trace of every generated case in the log directory when
/// `dump_trace` is set, and a progress layer on stderr when `verbose` is set. Stdout is left for
/// the report.
pub fn install() -> io::Result<()> {
    let trace_layer = if config::dump_trace() {
        let log_dir = config::log_dir();
        fs::create_dir_all(log_dir)?;
        let file = fs::File::create(log_dir.join(CAMPAIGN_FILE))?;
        let writer = BoxMakeWriter::new(Arc::new(file));
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .json()
            .with_filter(Targets::new().with_target("simpfuzz_fuzz", Level::DEBUG));
        Some(layer)
    } else {
        None
    };

    let progress_layer = config::verbose().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_filter(Targets::new().with_target("simpfuzz_fuzz", Level::INFO))
    });

    if trace_layer.is_some() || progress_layer.is_some() {
        let dispatch = Dispatch::new(Registry::default().with(trace_layer).with(progress_layer));
        dispatch.init();
    }
    Ok(())
}
