//! Interactive menu: the session router over the three features.
//!
//! Navigation is an explicit screen state passed through one dispatch loop.
//! Errors inside a screen are rendered and leave the session running.

use crate::chat::ChatClient;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::orchestrator::Orchestrator;
use console::style;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// The screen currently presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Chat,
    Video,
    Pdf,
    Exit,
}

/// Run the interactive menu.
pub async fn run_menu(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let prompts = Prompts::load(Some(&settings.prompts.variables))?;
    let chat_client = ChatClient::new(&settings.chat.model).with_prompts(prompts);

    println!("\n{}", style("Svar").bold().cyan());
    println!("{}\n", style("Chat with an LLM, a video, or a document.").dim());

    let mut screen = Screen::Home;
    loop {
        screen = match screen {
            Screen::Home => home_screen()?,
            Screen::Chat => chat_screen(&chat_client).await?,
            Screen::Video => video_screen(&orchestrator).await?,
            Screen::Pdf => pdf_screen(&orchestrator).await?,
            Screen::Exit => break,
        };
    }

    Output::info("Goodbye!");
    Ok(())
}

fn home_screen() -> anyhow::Result<Screen> {
    println!("{}", style("Choose a feature:").bold());
    println!("  {} Chatbot", style("1.").cyan());
    println!("  {} YouTube chat", style("2.").cyan());
    println!("  {} PDF chat", style("3.").cyan());
    println!("  {} Exit", style("q.").cyan());

    loop {
        let choice = read_line("> ")?;
        match choice.as_str() {
            "1" => return Ok(Screen::Chat),
            "2" => return Ok(Screen::Video),
            "3" => return Ok(Screen::Pdf),
            "q" | "quit" | "exit" | "back" => return Ok(Screen::Exit),
            _ => Output::warning("Enter 1, 2, 3 or q."),
        }
    }
}

/// Direct chat screen. Each prompt is an independent single-turn exchange.
async fn chat_screen(client: &ChatClient) -> anyhow::Result<Screen> {
    Output::header("Chatbot");
    println!("{}\n", style("Type a prompt, or 'back' to return to the menu.").dim());

    loop {
        let input = read_line(&format!("{} ", style("You:").green().bold()))?;

        if input.is_empty() {
            Output::warning("Please enter a prompt.");
            continue;
        }
        if is_back(&input) {
            return Ok(Screen::Home);
        }

        let spinner = Output::spinner("Thinking...");
        match client.complete(&input).await {
            Ok(answer) => {
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("Svar:").cyan().bold(), answer);
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("{}", e));
            }
        }
    }
}

/// Video Q&A screen: take a link, build or reuse the index, answer
/// questions about it until the user goes back.
async fn video_screen(orchestrator: &Orchestrator) -> anyhow::Result<Screen> {
    Output::header("YouTube Video Q&A");
    println!("{}\n", style("Type 'back' at any prompt to return to the menu.").dim());

    let url = read_line("Enter full YouTube link: ")?;
    if url.is_empty() || is_back(&url) {
        return Ok(Screen::Home);
    }

    let spinner = Output::spinner("Fetching transcript and building index...");
    let indexed = match orchestrator.index_video(&url, false).await {
        Ok(result) => {
            spinner.finish_and_clear();
            result
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Ok(Screen::Home);
        }
    };

    if indexed.reused {
        Output::info(&format!("Reusing existing index for {}", indexed.source_id));
    } else {
        Output::success(&format!(
            "Indexed {} chunks for {}",
            indexed.chunks_indexed, indexed.source_id
        ));
    }

    loop {
        let question = read_line(&format!("{} ", style("Question:").green().bold()))?;
        if question.is_empty() {
            continue;
        }
        if is_back(&question) {
            return Ok(Screen::Home);
        }

        let spinner = Output::spinner("Thinking...");
        match orchestrator.ask_video(&url, &question).await {
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
}

/// PDF Q&A screen: load a file into an ephemeral index, answer questions
/// until the user goes back. The index is dropped with the screen.
async fn pdf_screen(orchestrator: &Orchestrator) -> anyhow::Result<Screen> {
    Output::header("Chat with your PDF");
    println!("{}\n", style("Type 'back' at any prompt to return to the menu.").dim());

    let path = read_line("Path to PDF file: ")?;
    if path.is_empty() || is_back(&path) {
        return Ok(Screen::Home);
    }

    let spinner = Output::spinner("Extracting text and building index...");
    let session = match orchestrator.load_pdf_file(&PathBuf::from(&path)).await {
        Ok(session) => {
            spinner.finish_and_clear();
            session
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Ok(Screen::Home);
        }
    };

    Output::success(&format!(
        "Loaded {} ({} chunks)",
        session.source_id, session.chunks_indexed
    ));

    loop {
        let question = read_line(&format!("{} ", style("Question:").green().bold()))?;
        if question.is_empty() {
            continue;
        }
        if is_back(&question) {
            return Ok(Screen::Home);
        }

        let spinner = Output::spinner("Thinking...");
        match session.ask(&question).await {
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
}

fn is_back(input: &str) -> bool {
    input.eq_ignore_ascii_case("back")
        || input.eq_ignore_ascii_case("exit")
        || input.eq_ignore_ascii_case("quit")
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        // EOF behaves like going back
        return Ok("back".to_string());
    }
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_back() {
        assert!(is_back("back"));
        assert!(is_back("BACK"));
        assert!(is_back("exit"));
        assert!(!is_back("what is this video about?"));
    }
}
