//! Terminal output formatting.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use text2sql_client::{CollectionHits, ErDiagram, QaHit, SearchResults, TableDescription, VectorHit};
use text2sql_router::{RouteMatch, RouteTable};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Chooses between raw JSON and human-readable output.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as JSON, or hand it to `human` for formatted output.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Spinner for long-running backend calls. Drawn on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Ask before a destructive operation. `assume_yes` skips the prompt.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

pub fn print_message(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a list of names under a heading.
pub fn print_names(heading: &str, names: &[String]) {
    if names.is_empty() {
        println!("{}", format!("No {} found.", heading.to_lowercase()).dimmed());
        return;
    }

    println!("{}", heading.bold());
    for name in names {
        println!("  {} {}", "•".dimmed(), name);
    }
    println!();
    println!("{} total", names.len());
}

pub fn print_schemas(schemas: &BTreeMap<String, String>) {
    if schemas.is_empty() {
        println!("{}", "No tables found.".dimmed());
        return;
    }

    for (table, ddl) in schemas {
        println!("{}", format!("-- {}", table).cyan().bold());
        println!("{}", ddl.trim_end());
        println!();
    }
}

pub fn print_er(er: &ErDiagram) {
    for table in &er.tables {
        println!("{}", table.name.cyan().bold());
        for column in &table.columns {
            let key = match column.key.as_str() {
                "PRI" => "PK".yellow(),
                "MUL" => "FK".blue(),
                "UNI" => "UQ".magenta(),
                _ => "  ".normal(),
            };
            let nullable = if column.nullable { "null" } else { "not null" };
            println!(
                "  {} {} {} {}",
                key,
                pad_right(&column.name, 28),
                pad_right(&column.data_type, 14).dimmed(),
                nullable.dimmed()
            );
        }
        println!();
    }

    if !er.relationships.is_empty() {
        println!("{}", "Relationships".bold());
        for rel in &er.relationships {
            println!("  {}", rel);
        }
    }
}

pub fn print_descriptions(descriptions: &[TableDescription]) {
    if descriptions.is_empty() {
        println!("{}", "No descriptions generated.".dimmed());
        return;
    }

    for desc in descriptions {
        let info = &desc.table_info;
        println!(
            "{} {}",
            info.table_name.cyan().bold(),
            format!("({})", info.chinese_name).dimmed()
        );
        if !info.description.is_empty() {
            println!("  {}", info.description);
        }
        if !info.purpose.is_empty() {
            println!("  {}: {}", "Purpose".bold(), info.purpose);
        }

        if !desc.fields.is_empty() {
            println!("  {}", "Fields".bold());
            for field in &desc.fields {
                println!(
                    "    {} {} {}",
                    pad_right(&field.field_name, 24),
                    pad_right(&field.data_type, 12).dimmed(),
                    truncate_visual(&field.description, 60)
                );
            }
        }

        if !desc.metrics.is_empty() {
            println!("  {}", "Metrics".bold());
            for metric in &desc.metrics {
                println!(
                    "    {} = {}",
                    metric.metric_name.yellow(),
                    metric.expression
                );
            }
        }
        println!();
    }
}

pub fn print_vector_hits(results: &SearchResults<VectorHit>) {
    print_hits(results, |hit| {
        format!(
            "{} {} {}",
            pad_right(hit.kind.as_deref().unwrap_or("-"), 8).dimmed(),
            hit.name.as_deref().unwrap_or("-").cyan(),
            truncate_visual(hit.description.as_deref().unwrap_or_default(), 60)
        )
    });
}

pub fn print_qa_hits(results: &SearchResults<QaHit>) {
    print_hits(results, |hit| {
        format!(
            "{}\n           {} {}",
            hit.question.as_deref().unwrap_or("-").cyan(),
            "→".dimmed(),
            truncate_visual(hit.answer.as_deref().unwrap_or_default(), 70)
        )
    });
}

fn print_hits<H: HitDistance>(results: &SearchResults<H>, describe: impl Fn(&H) -> String) {
    println!("{} {}", "Query:".bold(), results.query);

    for (collection, hits) in &results.results {
        println!();
        println!("{}", collection.bold());
        match hits {
            CollectionHits::Hits(hits) if hits.is_empty() => {
                println!("  {}", "No matches.".dimmed());
            }
            CollectionHits::Hits(hits) => {
                for hit in hits {
                    println!("  {} {}", format!("{:>8.4}", hit.distance()).yellow(), describe(hit));
                }
            }
            CollectionHits::Failed { error } => {
                println!("  {} {}", "error:".red(), error);
            }
        }
    }
}

trait HitDistance {
    fn distance(&self) -> f32;
}

impl HitDistance for VectorHit {
    fn distance(&self) -> f32 {
        self.distance
    }
}

impl HitDistance for QaHit {
    fn distance(&self) -> f32 {
        self.distance
    }
}

pub fn print_routes(table: &RouteTable) {
    println!(
        "{:<32} {:<18} {:<20} {}",
        "PATH".bold(),
        "NAME".bold(),
        "VIEW".bold(),
        "PROPS".bold()
    );
    println!("{}", "─".repeat(78));

    for route in table.routes() {
        let indent = "  ".repeat(route.depth);
        println!(
            "{:<32} {:<18} {:<20} {}",
            format!("{}{}", indent, route.path),
            route.name,
            route.view.to_string().cyan(),
            if route.props { "yes".green() } else { "".normal() }
        );
    }
}

pub fn print_route_match(route: &RouteMatch) {
    println!("{}: {}", "Route".bold(), route.name.cyan());
    println!("{}: {}", "Pattern".bold(), route.path);
    let chain: Vec<String> = route.matched.iter().map(|v| v.to_string()).collect();
    println!("{}: {}", "Views".bold(), chain.join(" > "));

    if !route.params.is_empty() {
        println!("{}", "Params".bold());
        for (key, value) in &route.params {
            println!("  {} = {}", key, value.yellow());
        }
    }
    if !route.props.is_empty() {
        println!("{}", "Props".bold());
        for (key, value) in &route.props {
            println!("  {} = {}", key, value.green());
        }
    }
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
