//! Video Q&A command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Run the video command: build (or reuse) the index for a video, then
/// answer the question when one was given.
pub async fn run_video(
    url: &str,
    question: Option<&str>,
    force: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Video) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript and building index...");
    let indexed = match orchestrator.index_video(url, force).await {
        Ok(result) => {
            spinner.finish_and_clear();
            result
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if indexed.reused {
        Output::info(&format!(
            "Reusing existing index for {}",
            indexed.source_id
        ));
    } else {
        Output::success(&format!(
            "Indexed {} chunks for {}",
            indexed.chunks_indexed, indexed.source_id
        ));
    }

    let Some(question) = question else {
        return Ok(());
    };

    let spinner = Output::spinner("Thinking...");
    match orchestrator.ask_video(url, question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::source_chunk(
                        &source.source_id,
                        source.sequence_index,
                        source.score,
                        &source.content,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
