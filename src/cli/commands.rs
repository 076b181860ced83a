//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{AppContainer, DefaultAppContainer, HighlightReport, HighlightSession};
use crate::cli::args::{HighlightArgs, MomentsArgs, ProbeArgs};
use crate::config_initialization::ResolvedConfig;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{SourceVideo, TimeSpec};
use crate::engine::{progress_channel, ProgressEvent};
use crate::utils::Utils;

/// Execute the highlight command
pub async fn highlight(args: HighlightArgs, resolved: &ResolvedConfig) -> Result<()> {
    let settings = resolved.settings().context("Invalid configuration")?;
    info!(
        input = %args.input.display(),
        sensitivity = settings.sensitivity.value(),
        segment_length = settings.segment_length.seconds(),
        "Starting highlight operation"
    );

    let container = DefaultAppContainer::new().context("Failed to initialize media backend")?;
    let interactor = container.highlight_interactor();
    let source = interactor
        .probe(&args.input)
        .await
        .context("Failed to probe input file")?;
    display_source(&source);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling");
                cancel.cancel();
            }
        })
    };

    let (emitter, mut events) = progress_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            display_progress(&event);
        }
    });

    let mut session = HighlightSession::new(container.registry());
    session.begin_run();
    let result = interactor.run(&source, &settings, emitter, cancel).await;
    interrupt.abort();
    let _ = printer.await;

    let Some(report) = accept_outcome(result)? else {
        println!("Cancelled, nothing was written");
        return Ok(());
    };
    session.complete(report);

    if let Some(report) = session.current() {
        write_clip(report, &args.output_dir)?;
        display_report(report);
    }
    session.dismiss();

    info!("Highlight operation completed successfully");
    Ok(())
}

/// Execute the moments command
pub async fn moments(args: MomentsArgs, resolved: &ResolvedConfig) -> Result<()> {
    let settings = resolved.settings().context("Invalid configuration")?;
    let container = DefaultAppContainer::new().context("Failed to initialize media backend")?;
    let interactor = container.highlight_interactor();

    let source = interactor
        .probe(&args.input)
        .await
        .context("Failed to probe input file")?;
    display_source(&source);

    let moments = interactor
        .preview_moments(&source, settings.sensitivity)
        .context("Failed to sample key moments")?;
    let length = settings.segment_length.as_secs_f64().min(source.duration);

    println!(
        "Key moments ({} at sensitivity {}):",
        moments.len(),
        settings.sensitivity.value()
    );
    for moment in &moments {
        let (start, duration) = moment.centred_window(length, source.duration);
        println!(
            "  {:>2}. {}  window {} - {}",
            moment.index + 1,
            TimeSpec::from_seconds(moment.timestamp),
            TimeSpec::from_seconds(start),
            TimeSpec::from_seconds(start + duration)
        );
    }
    Ok(())
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs) -> Result<()> {
    let container = DefaultAppContainer::new().context("Failed to initialize media backend")?;
    let source = container
        .highlight_interactor()
        .probe(&args.input)
        .await
        .context("Failed to probe input file")?;

    if args.json {
        let json = serde_json::json!({
            "path": source.path.display().to_string(),
            "duration": source.duration,
            "mime_type": source.mime_type,
        });
        let text = serde_json::to_string_pretty(&json)
            .context("Failed to serialize source info to JSON")?;
        println!("{}", text);
    } else {
        display_source(&source);
    }
    Ok(())
}

/// A user cancel is a clean stop, not a failure
fn accept_outcome(result: DomainResult<HighlightReport>) -> Result<Option<HighlightReport>> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(e) if e.is_cancellation() => {
            info!("Highlight run cancelled by user");
            Ok(None)
        }
        Err(e) => Err(e).context("Highlight run failed"),
    }
}

fn write_clip(report: &HighlightReport, output_dir: &Path) -> Result<()> {
    if report.clip.is_empty() {
        warn!("Every segment failed, no clip written");
        println!("No segments could be recorded, nothing was written");
        return Ok(());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(&report.clip.file_name);
    std::fs::write(&path, &report.clip.blob.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Saved {} ({}, {})",
        path.display(),
        TimeSpec::from_seconds(report.clip.total_duration).format_hms(),
        Utils::format_file_size(report.clip.blob.len() as u64)
    );
    Ok(())
}

fn display_source(source: &SourceVideo) {
    println!("Input: {}", source.path.display());
    println!(
        "  Duration: {} ({:.2}s)",
        TimeSpec::from_seconds(source.duration).format_hms(),
        source.duration
    );
    println!("  Type: {}", source.mime_type);
}

fn display_progress(event: &ProgressEvent) {
    println!(
        "{} {:>5.1}% {:<12} {}",
        Utils::progress_bar(event.percent, 24),
        event.percent,
        event.phase.label(),
        event.message
    );
}

fn display_report(report: &HighlightReport) {
    println!("Segments:");
    for segment in &report.segments {
        println!("  {}. {}", segment.index + 1, segment.preview_label());
    }
    for index in &report.skipped {
        println!("  {}. skipped", index + 1);
    }
    println!(
        "Clip: {} segment copies, {} total, processed in {}",
        report.clip.sequence.len(),
        TimeSpec::from_seconds(report.clip.total_duration),
        Utils::format_duration(report.processing_time)
    );
}
