//! Text output formatting: aligned tables and field listings.

use cctools_browser::InventoryItem;
use cctools_core::{ObjectType, Record, html_to_plain_text};
use cctools_store::{CacheLocation, CacheStatus};
use chrono::{DateTime, Duration, Utc};

use super::columns;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

const ELLIPSIS: char = '…';
const RULE: char = '─';
const COLUMN_GAP: &str = "  ";

// ============================================================================
// Table Options
// ============================================================================

/// Short column titles for long export field names.
pub const HEADER_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Answer Enabled", "Enabled"),
    ("Answer Sort Order", "Sort"),
    ("Category Description", "Description"),
    ("Discontinued Item", "Disc"),
    ("Inventory Level", "Inv"),
    ("Option Group Name", "Group Name"),
    ("Option Set Name", "Set Name"),
    ("Sort Order", "Sort"),
    ("Track Inventory", "Track"),
    ("Variant Inventory Level", "Inv"),
    ("Variant Sort Order", "Sort"),
    ("Wholesale Price", "Wholesale"),
];

/// How record values are rendered in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Render HTML values as plain text.
    pub strip_html: bool,
    /// Longest cell in characters; zero disables truncation.
    pub max_width: usize,
    /// `(field, title)` pairs used to shorten column headers.
    pub abbreviations: &'static [(&'static str, &'static str)],
}

impl TableOptions {
    /// Returns the column title for `field`.
    pub fn header<'a>(&self, field: &'a str) -> &'a str {
        self.abbreviations
            .iter()
            .find(|(long, _)| *long == field)
            .map_or(field, |&(_, short)| short)
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            strip_html: true,
            max_width: 40,
            abbreviations: HEADER_ABBREVIATIONS,
        }
    }
}

// ============================================================================
// Text Formatter
// ============================================================================

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    options: TableOptions,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            options: TableOptions::default(),
        }
    }

    /// Sets the table options.
    #[must_use]
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Formats records of one type as a table followed by a count.
    pub fn format_records(&self, object_type: ObjectType, records: &[Record]) -> String {
        if records.is_empty() {
            return self.dim(&format!("No {}.", object_type.display_name().to_lowercase()));
        }

        let headers = columns(records);
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| headers.iter().map(|h| self.cell(record.value(h))).collect())
            .collect();

        let titles: Vec<&str> = headers.iter().map(|h| self.options.header(h)).collect();
        let mut lines = self.table(&titles, &rows);
        lines.push(self.dim(&format!(
            "{} {}",
            records.len(),
            object_type.display_name().to_lowercase()
        )));
        lines.join("\n")
    }

    /// Formats a single record as `field  value` lines.
    pub fn format_record(&self, record: &Record) -> String {
        let width = record.field_names().map(|f| f.chars().count()).max().unwrap_or(0);
        record
            .iter()
            .map(|(field, value)| {
                let value = if self.options.strip_html {
                    html_to_plain_text(value)
                } else {
                    value.to_string()
                };
                format!("{}{COLUMN_GAP}{value}", self.bold(&pad(field, width)))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats inventory rows.
    pub fn format_inventory(&self, items: &[InventoryItem]) -> String {
        if items.is_empty() {
            return self.dim("No stocked items.");
        }

        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|item| {
                vec![
                    item.sku.clone(),
                    item.level.clone(),
                    truncate(&item.name, self.options.max_width),
                    item.enabled.clone(),
                ]
            })
            .collect();

        let mut lines = self.table(&INVENTORY_HEADERS, &rows);
        lines.push(self.dim(&format!("{} items", items.len())));
        lines.join("\n")
    }

    /// Formats the cache state of every object type.
    pub fn format_cache_status(
        &self,
        site: &str,
        statuses: &[CacheStatus],
        now: DateTime<Utc>,
    ) -> String {
        let rows: Vec<Vec<String>> = statuses
            .iter()
            .map(|status| {
                vec![
                    status.object_type.name().to_string(),
                    location_label(status.location).to_string(),
                    status
                        .record_count
                        .map_or_else(|| "-".to_string(), |n| n.to_string()),
                    status.age(now).map_or_else(|| "-".to_string(), format_age),
                    freshness_label(status).to_string(),
                ]
            })
            .collect();

        let mut lines = vec![format!("Cache for {}", self.bold(site)), RULE.to_string().repeat(40)];
        lines.extend(self.table(&CACHE_HEADERS, &rows).into_iter().map(|line| {
            if line.ends_with("fresh") {
                self.green(&line)
            } else if line.ends_with("stale") {
                self.yellow(&line)
            } else {
                line
            }
        }));
        lines.join("\n")
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn cell(&self, value: &str) -> String {
        let value = if self.options.strip_html {
            html_to_plain_text(value)
        } else {
            value.replace(['\r', '\n'], " ")
        };
        truncate(&value, self.options.max_width)
    }

    /// Lays out a header row, a rule and the data rows with aligned columns.
    fn table(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let render = |cells: Vec<String>| -> String {
            cells.join(COLUMN_GAP).trim_end().to_string()
        };

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(self.bold(&render(
            headers
                .iter()
                .zip(&widths)
                .map(|(h, w)| pad(h, *w))
                .collect(),
        )));
        lines.push(self.dim(&render(
            widths.iter().map(|w| RULE.to_string().repeat(*w)).collect(),
        )));
        for row in rows {
            lines.push(render(
                row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect(),
            ));
        }
        lines
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.use_colors {
            format!("{GREEN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn yellow(&self, text: &str) -> String {
        if self.use_colors {
            format!("{YELLOW}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Column headers of the inventory report.
pub const INVENTORY_HEADERS: [&str; 4] = ["SKU", "Level", "Product Name", "Enabled"];

/// Column headers of the cache status report.
pub const CACHE_HEADERS: [&str; 5] = ["Type", "Location", "Records", "Age", "Status"];

// ============================================================================
// Free Helpers
// ============================================================================

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

/// Shortens `text` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push(ELLIPSIS);
    short
}

/// Formats an age as its two most significant units.
pub fn format_age(age: Duration) -> String {
    if age < Duration::zero() {
        return "future".to_string();
    }
    let secs = age.num_seconds();
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m {}s", secs / 60, secs % 60),
        3600..86_400 => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
        _ => format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3600),
    }
}

/// Returns the status column label for a cache entry.
pub fn freshness_label(status: &CacheStatus) -> &'static str {
    match (status.location, status.fresh) {
        (CacheLocation::Missing, _) => "-",
        (_, true) => "fresh",
        (_, false) => "stale",
    }
}

/// Returns the location column label for a cache entry.
pub fn location_label(location: CacheLocation) -> &'static str {
    match location {
        CacheLocation::Memory => "memory",
        CacheLocation::Disk => "disk",
        CacheLocation::Missing => "missing",
    }
}
