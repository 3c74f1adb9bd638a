//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Style};
use tabled::{Table, Tabled, settings::Style as TableStyle};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Colors resource states in table cells.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: &ColorMode) -> Self {
        Self {
            enabled: should_color(mode),
        }
    }

    /// Paint a server or storage state by how healthy it is.
    pub fn state(self, state: &str) -> String {
        if !self.enabled {
            return state.to_owned();
        }
        let style = match state {
            "started" | "online" => Style::new().green(),
            "stopped" => Style::new().dimmed(),
            "maintenance" | "cloning" | "backuping" | "syncing" => Style::new().yellow(),
            "error" => Style::new().red().bold(),
            _ => Style::new(),
        };
        state.style(style).to_string()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, a pre-formatted key/value block,
/// since single-item views don't use the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) -> Result<(), CliError> {
    if quiet || output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

/// Render `lines` of `(label, value)` as an aligned detail block.
pub fn detail_block(lines: &[(&str, String)]) -> String {
    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    lines
        .iter()
        .map(|(label, value)| {
            let value = if value.is_empty() { "-" } else { value };
            format!("{:<width$} {value}", format!("{label}:"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(TableStyle::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Item {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Size")]
        size: u64,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "a".into(),
                size: 10,
            },
            Item {
                id: "b".into(),
                size: 20,
            },
        ]
    }

    fn row(item: &Item) -> Item {
        Item {
            id: item.id.clone(),
            size: item.size,
        }
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(&OutputFormat::Plain, &items(), row, |i| i.id.clone()).unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn compact_json_keeps_source_fields() {
        let out =
            render_list(&OutputFormat::JsonCompact, &items(), row, |i| i.id.clone()).unwrap();
        assert_eq!(out, r#"[{"id":"a","size":10},{"id":"b","size":20}]"#);
    }

    #[test]
    fn table_uses_renamed_headers() {
        let out = render_list(&OutputFormat::Table, &items(), row, |i| i.id.clone()).unwrap();
        assert!(out.contains("ID"));
        assert!(out.contains("Size"));
        assert!(out.contains("20"));
    }

    #[test]
    fn detail_block_aligns_and_fills_blanks() {
        let out = detail_block(&[("UUID", "abc".into()), ("Hostname", String::new())]);
        assert_eq!(out, "UUID:     abc\nHostname: -");
    }

    #[test]
    fn painter_without_color_is_identity() {
        let painter = Painter::new(&ColorMode::Never);
        assert_eq!(painter.state("started"), "started");
    }
}
