//! `scriptorium essay`: run the essay flow from the terminal.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use scriptorium_core::essay::writer::model_calls;
use scriptorium_types::essay::EssayRequest;

use crate::state::AppState;

pub async fn write_essay(state: &AppState, topic: String, revisions: Option<u32>, json: bool) -> Result<()> {
    let request = EssayRequest {
        topic,
        max_revisions: revisions,
    };
    // Reject bad input before showing a spinner.
    let rounds = state.essay_writer.validate(&request)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Writing essay ({} model calls)...", model_calls(rounds)));
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = state.essay_writer.write(&request).await;
    spinner.finish_and_clear();
    let session = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    for (heading, body) in [
        ("Essay Plan", &session.plan),
        ("Essay Draft", &session.draft),
        ("Essay Critique", &session.critique),
    ] {
        println!();
        println!("  {}", style(heading).bold().underlined());
        println!();
        println!("{body}");
    }
    println!();
    if session.revision_number > 0 {
        println!(
            "  {} revised {} time(s)",
            style("i").blue().bold(),
            session.revision_number
        );
    }
    println!("  {}", style(format!("Session {}", session.id)).dim());
    println!();

    Ok(())
}
