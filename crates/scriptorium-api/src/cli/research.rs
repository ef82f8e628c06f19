//! `scriptorium analysts`: generate a research team from the terminal.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use scriptorium_core::research::assistant::ResearchAssistant;

use crate::state::AppState;

pub async fn list_analysts(
    state: &AppState,
    topic: String,
    max_analysts: Option<u32>,
    json: bool,
) -> Result<()> {
    let count = max_analysts.unwrap_or_else(|| state.config.research.analyst_count_default());
    ResearchAssistant::validate_team_request(&topic, count)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Assembling analysts...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = state
        .research
        .generate_analysts(Uuid::now_v7(), topic.trim(), count)
        .await;
    spinner.finish_and_clear();
    let analysts = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysts)?);
        return Ok(());
    }

    if analysts.is_empty() {
        println!();
        println!("  {} The model returned no analysts.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Affiliation").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for analyst in &analysts {
        table.add_row(vec![
            Cell::new(&analyst.name).fg(Color::Cyan),
            Cell::new(&analyst.role),
            Cell::new(&analyst.affiliation).fg(Color::DarkGrey),
            Cell::new(&analyst.description),
        ]);
    }

    println!();
    println!("{table}");
    if analysts.len() as u32 != count {
        println!(
            "  {} requested {count}, the model returned {}",
            style("i").blue().bold(),
            analysts.len()
        );
    }
    println!();

    Ok(())
}
