mod bootstrap;

use anyhow::Result;
use chrono::Datelike;
use wrapped_core::settings::Settings;
use wrapped_data::analysis::{analyze_transcript, GrowthOutcome};
use wrapped_data::growth::FitConfig;
use wrapped_data::reader::ReaderConfig;
use wrapped_report::export::{save_growth, save_summary};
use wrapped_report::growth_view::{render_growth, DEFAULT_OBSERVED_ROWS};
use wrapped_report::wrapped_view::render_wrapped;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Chat Wrapped v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Transcript: {}, cutoff: {}, growth: {}",
        settings.chat_file.display(),
        settings.cutoff,
        if settings.skip_growth { "skipped" } else { "enabled" }
    );

    let reader_config = ReaderConfig::from_settings(&settings)?;
    let fit_config = (!settings.skip_growth).then(|| FitConfig::from_settings(&settings));

    // Fails with "No messages found in ..." when the transcript has no messages.
    let result = analyze_transcript(&settings.chat_file, reader_config, fit_config.as_ref())?;

    print!("{}", render_wrapped(&result.summary, result.period.1.year()));

    save_summary(&result.summary, &settings.output)?;
    println!("\nAnalysis results saved to {}", settings.output.display());

    match &result.growth {
        GrowthOutcome::Forecast(report) => {
            println!();
            print!("{}", render_growth(report, DEFAULT_OBSERVED_ROWS));
            if let Some(path) = &settings.growth_output {
                save_growth(report, path)?;
                println!("\nGrowth forecast saved to {}", path.display());
            }
        }
        GrowthOutcome::NoJoinEvents => {
            println!("\nNo member join data found in the chat file.");
        }
        GrowthOutcome::Skipped => {}
    }

    tracing::info!(
        "Done: {} lines read in {:.3}s, fit in {:.3}s",
        result.metadata.read_stats.lines_read,
        result.metadata.load_time_seconds,
        result.metadata.fit_time_seconds
    );

    Ok(())
}
