//! Direct chat command.

use crate::chat::ChatClient;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use console::style;
use std::io::{self, BufRead, Write};

/// Run the chat command.
///
/// With a prompt argument this is a one-shot exchange; without one it loops,
/// sending each line as an independent single-turn prompt.
pub async fn run_chat(
    prompt: Option<&str>,
    model: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.chat.model.clone());
    let prompts = Prompts::load(Some(&settings.prompts.variables))?;
    let client = ChatClient::new(&model).with_prompts(prompts);

    match prompt {
        Some(prompt) => {
            let spinner = Output::spinner("Thinking...");
            match client.complete(prompt).await {
                Ok(answer) => {
                    spinner.finish_and_clear();
                    println!("\n{}\n", answer);
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    Output::error(&format!("{}", e));
                    return Err(e.into());
                }
            }
        }
        None => {
            interactive_loop(&client).await?;
        }
    }

    Ok(())
}

/// Interactive prompt loop. Every prompt is answered independently; there is
/// no conversation history.
async fn interactive_loop(client: &ChatClient) -> anyhow::Result<()> {
    println!("\n{}", style("Svar Chat").bold().cyan());
    println!(
        "{}\n",
        style("Each prompt is answered independently. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            Output::warning("Please enter a prompt.");
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        match client.complete(input).await {
            Ok(answer) => {
                println!("\n{} {}\n", style("Svar:").cyan().bold(), answer);
            }
            Err(e) => {
                Output::error(&format!("{}", e));
            }
        }
    }

    Ok(())
}
