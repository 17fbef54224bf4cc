use chrono::Local;

use crate::api::{Agent, Feature, Node};
use crate::constants::{BLUE, BOLD, DIM, RESET};

const MIN_TITLE_WIDTH: usize = 16;
const FALLBACK_TERMINAL_WIDTH: usize = 120;

/// Folders first, then files; each group ordered by title bytewise, so
/// uppercase sorts before lowercase. The input slice is left untouched.
pub fn sort_nodes(nodes: &[Node]) -> Vec<&Node> {
    let (mut folders, mut files): (Vec<&Node>, Vec<&Node>) =
        nodes.iter().partition(|node| node.is_folder());
    folders.sort_by(|a, b| a.title.cmp(&b.title));
    files.sort_by(|a, b| a.title.cmp(&b.title));
    folders.extend(files);
    folders
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    pub fn paint(&self, text: &str, style: &str) -> String {
        if self.color && !style.is_empty() {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

struct Cell {
    text: String,
    style: &'static str,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: "",
        }
    }

    fn styled(text: impl Into<String>, style: &'static str) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
    /// Column that absorbs truncation when the terminal is narrow.
    flexible: usize,
}

impl Table {
    fn new(headers: &[&'static str], flexible: usize) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
            flexible,
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn render(&self, palette: Palette, max_width: usize) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.text.chars().count());
            }
        }

        let fixed: usize = widths
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.flexible)
            .map(|(_, w)| w + 2)
            .sum();
        let budget = max_width.saturating_sub(fixed).max(MIN_TITLE_WIDTH);
        widths[self.flexible] = widths[self.flexible].min(budget);

        let mut out = String::new();
        let header: Vec<Cell> = self
            .headers
            .iter()
            .map(|h| Cell::styled(*h, BOLD))
            .collect();
        render_row(&mut out, &header, &widths, palette);
        for row in &self.rows {
            render_row(&mut out, row, &widths, palette);
        }
        out
    }
}

fn render_row(out: &mut String, row: &[Cell], widths: &[usize], palette: Palette) {
    let last = row.len().saturating_sub(1);
    for (idx, cell) in row.iter().enumerate() {
        let text = truncate(&cell.text, widths[idx]);
        let padded = if idx == last {
            text
        } else {
            format!("{text:<width$}", width = widths[idx])
        };
        out.push_str(&palette.paint(&padded, cell.style));
        if idx != last {
            out.push_str("  ");
        }
    }
    out.push('\n');
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(FALLBACK_TERMINAL_WIDTH)
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn format_modified(node: &Node, date_format: &str) -> String {
    node.modified()
        .map(|ts| ts.with_timezone(&Local).format(date_format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_nodes(nodes: &[Node], palette: Palette, date_format: &str) -> String {
    render_nodes_with_width(nodes, palette, date_format, terminal_width())
}

fn render_nodes_with_width(
    nodes: &[Node],
    palette: Palette,
    date_format: &str,
    max_width: usize,
) -> String {
    let mut table = Table::new(&["UUID", "TITLE", "SIZE", "MODIFIED"], 1);
    for node in sort_nodes(nodes) {
        let (title, size) = if node.is_folder() {
            (Cell::styled(format!("{}/", node.title), BLUE), "-".to_string())
        } else {
            (
                Cell::plain(node.title.clone()),
                node.size.map(human_size).unwrap_or_else(|| "-".to_string()),
            )
        };
        table.push(vec![
            Cell::styled(node.uuid.clone(), DIM),
            title,
            Cell::plain(size),
            Cell::plain(format_modified(node, date_format)),
        ]);
    }
    table.render(palette, max_width)
}

pub fn render_features(features: &[Feature], palette: Palette) -> String {
    let mut table = Table::new(&["UUID", "TITLE", "DESCRIPTION"], 2);
    for feature in features {
        table.push(vec![
            Cell::styled(feature.uuid.clone(), DIM),
            Cell::plain(feature.title.clone()),
            Cell::plain(feature.description.clone().unwrap_or_default()),
        ]);
    }
    table.render(palette, terminal_width())
}

pub fn render_agents(agents: &[Agent], palette: Palette) -> String {
    let mut table = Table::new(&["UUID", "TITLE", "MODEL", "DESCRIPTION"], 3);
    for agent in agents {
        table.push(vec![
            Cell::styled(agent.uuid.clone(), DIM),
            Cell::plain(agent.title.clone()),
            Cell::plain(agent.model.clone().unwrap_or_else(|| "-".to_string())),
            Cell::plain(agent.description.clone().unwrap_or_default()),
        ]);
    }
    table.render(palette, terminal_width())
}
