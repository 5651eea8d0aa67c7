//! PDF Q&A command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PdfSession};
use console::style;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Run the pdf command: load the document into an ephemeral index, then
/// answer one question or start an interactive session.
pub async fn run_pdf(
    file: &Path,
    question: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Pdf) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Extracting text and building index...");
    let session = match orchestrator.load_pdf_file(file).await {
        Ok(session) => {
            spinner.finish_and_clear();
            session
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Loaded {} ({} chunks)",
        session.source_id, session.chunks_indexed
    ));

    match question {
        Some(question) => ask_once(&session, question).await,
        None => question_loop(&session).await,
    }
}

async fn ask_once(session: &PdfSession, question: &str) -> anyhow::Result<()> {
    let spinner = Output::spinner("Thinking...");
    match session.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.answer);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}

/// Interactive question loop against the loaded document.
async fn question_loop(session: &PdfSession) -> anyhow::Result<()> {
    println!(
        "\n{}",
        style("Ask questions about the document. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("Question:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let spinner = Output::spinner("Thinking...");
        match session.ask(input).await {
            Ok(response) => {
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("Svar:").cyan().bold(), response.answer);
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("{}", e));
            }
        }
    }

    Ok(())
}
