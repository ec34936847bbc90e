use anyhow::{Context, Result};
use colored::*;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use values_finder::client_from_config;
use values_finder::config::Config;
use values_finder::models::Choice;
use values_finder::session::SessionManager;

const QUESTION: &str = "Which feels more important to you right now:";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't interleave with the dialogue
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let client = client_from_config(&config).context("Failed to create values client")?;
    let mut session = SessionManager::new(&config.transcript.directory)
        .context("Failed to create session transcript")?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    for round in 1..=config.rounds {
        println!("{}", format!("Round {} of {}", round, config.rounds).bold());

        let options = client
            .generate_options(session.history())
            .await
            .context("Failed to generate options")?;
        if options.len() != config.options_per_question as usize {
            tracing::warn!(
                "Expected {} options, model returned {}",
                config.options_per_question,
                options.len()
            );
        }

        println!("{QUESTION}");
        for (i, option) in options.iter().enumerate() {
            println!("{}) {}", (i + 1).to_string().cyan(), option);
        }

        let selected = read_selection(&mut input, options.len()).await?;
        let choice = Choice::new(QUESTION, options, selected);
        session
            .add_choice(choice)
            .context("Failed to record choice")?;

        println!();
    }

    println!("{}", "Generating your values...".dimmed());
    let values = client
        .generate_final_values(session.history())
        .await
        .context("Failed to generate final values")?;

    println!("\n{}", "Here's what seems most important to you:".green().bold());
    for (i, value) in values.iter().enumerate() {
        println!("{}. {}", i + 1, value.name.bold());
        println!("   {}\n", value.description);
    }

    if let Err(e) = session.log_final_values(&values) {
        tracing::error!("Failed to log final values: {}", e);
    }
    tracing::info!("Transcript written to {}", session.path().display());
    Ok(())
}

/// Read a 1-based selection, falling back to the first option on bad input
async fn read_selection(input: &mut Lines<BufReader<Stdin>>, count: usize) -> Result<usize> {
    print!("Enter your choice (1-{count}): ");
    std::io::stdout().flush()?;

    let line = input.next_line().await?.unwrap_or_default();
    Ok(parse_selection(&line, count))
}

fn parse_selection(line: &str, count: usize) -> usize {
    match line.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => n - 1,
        Ok(n) => {
            tracing::warn!("Choice {} out of range, defaulting to option 1", n);
            0
        }
        Err(_) => {
            tracing::warn!("Invalid input, defaulting to option 1");
            0
        }
    }
}
