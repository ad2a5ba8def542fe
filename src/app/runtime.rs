use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use segstitch_core::{
    HttpClient, PipelineConfig, PipelineError, SegmentPipeline, human_bytes, parse_playlist,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app::progress_bar::RunProgress;
use crate::app::source::PlaylistSource;
use crate::app::{config, exit_handler, output, terminal};
use crate::cli::Args;

pub(crate) async fn run_segstitch() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let default_level = terminal::resolve_default_log_level(args.quiet, args.verbose);
    let no_color = terminal::is_no_color_requested(&args);
    let log_writer = terminal::init_tracing(default_level, no_color);
    debug!(?args, "CLI arguments parsed");

    let loaded = config::load_default_file_config()?;
    if let (Some(path), Some(_)) = (&loaded.path, &loaded.config) {
        debug!(path = %path.display(), "loaded config file");
    }
    let settings = config::resolve_settings(&args, loaded.config.as_ref())?;
    debug!(?settings, "resolved run settings");

    let client = HttpClient::new_with_timeouts(
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    );

    let source = PlaylistSource::classify(&args.source);
    let base_url = source.base_url(args.base_url.as_deref())?;
    let document = source.load(&client).await?;
    let playlist = parse_playlist(&document);
    info!(
        segments = playlist.len(),
        base_url = %base_url,
        output = %settings.output.display(),
        "Playlist loaded"
    );
    if playlist.is_empty() {
        warn!("Playlist lists no segments; the output will be empty");
    }

    output::ensure_output_absent(&settings.output)?;
    output::prepare_output_dir(&settings.output)?;

    let interrupt = CancellationToken::new();
    let ctrl_c = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let pipeline_config = PipelineConfig::new(settings.lanes, settings.chunk_size)?;
    let pipeline = SegmentPipeline::new(Arc::new(client), pipeline_config)
        .with_interrupt(interrupt);

    let use_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress = RunProgress::select(use_bar, args.quiet, playlist.len(), &log_writer);

    let outcome = pipeline
        .run(&base_url, playlist.segments(), &settings.output, &progress)
        .await;
    progress.finish();

    match outcome {
        Ok(stats) => {
            info!(
                segments = stats.segments_committed(),
                bytes = stats.bytes_written(),
                size = %human_bytes(stats.bytes_written()),
                elapsed_ms = stats.elapsed().as_millis(),
                output = %settings.output.display(),
                "Recording complete"
            );
            Ok(exit_handler::determine_exit_outcome(&stats, false))
        }
        Err(aborted) => {
            if matches!(aborted.error, PipelineError::Interrupted { .. }) {
                warn!(
                    committed = aborted.stats.segments_committed(),
                    total = aborted.stats.total_segments(),
                    "Interrupted"
                );
            } else {
                error!(error = %aborted, "Recording aborted");
            }

            if output::run_created_output(&aborted.error) {
                match output::dispose_partial_output(&settings.output, settings.keep_partial) {
                    Ok(Some(kept)) => info!(path = %kept.display(), "Partial output kept"),
                    Ok(None) => debug!("Partial output removed"),
                    Err(e) => {
                        warn!(error = %format!("{e:#}"), "Could not clean up partial output");
                    }
                }
            }

            Ok(exit_handler::determine_exit_outcome(&aborted.stats, true))
        }
    }
}
