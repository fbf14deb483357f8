use anyhow::{Context, Result};
use colored::Colorize;
use navlink_router::{compile, LinkingConfig, RouteKind};

pub fn execute(config: &LinkingConfig) -> Result<()> {
    let routes = compile(config, &[]).context("Failed to compile linking configuration")?;

    println!("{}", "Routes (in match order)".green().bold());
    println!();

    if routes.records().is_empty() {
        println!("  {} No screens declare a path", "ℹ".cyan());
        return Ok(());
    }

    let width = routes
        .records()
        .iter()
        .map(|r| display_pattern(&r.pattern).len())
        .max()
        .unwrap_or(0);

    for record in routes.records() {
        let pattern = format!("{:<width$}", display_pattern(&record.pattern), width = width);
        let kind = format!("{:<8}", record.kind.to_string());
        let kind = match record.kind {
            RouteKind::Static => kind.normal(),
            RouteKind::Dynamic => kind.yellow(),
            RouteKind::Layout => kind.blue(),
        };
        let initial = if record.is_initial { " (initial)".dimmed().to_string() } else { String::new() };

        println!("  {}  {}  {}{}", pattern.cyan(), kind, record.screens.join(" > "), initial);
    }

    Ok(())
}

fn display_pattern(pattern: &str) -> String {
    format!("/{}", pattern)
}
