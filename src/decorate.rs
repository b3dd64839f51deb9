//! Display-oriented response decoration
//!
//! Rewrites well-known fields of an extracted response tree into
//! human-readable forms: numeric status codes to labels, epoch seconds to
//! formatted timestamps, byte counts to unit-suffixed strings. The tree's
//! shape never changes; only matching leaf values are replaced.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

/// Torrent lifecycle states reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentStatus {
    /// Torrent is stopped
    Stopped,
    /// Queued to check files
    QueuedToCheck,
    /// Checking files
    Checking,
    /// Queued to download
    QueuedToDownload,
    /// Downloading
    Downloading,
    /// Queued to seed
    QueuedToSeed,
    /// Seeding
    Seeding,
}

impl TorrentStatus {
    /// Decode the daemon's numeric status code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Stopped),
            1 => Some(Self::QueuedToCheck),
            2 => Some(Self::Checking),
            3 => Some(Self::QueuedToDownload),
            4 => Some(Self::Downloading),
            5 => Some(Self::QueuedToSeed),
            6 => Some(Self::Seeding),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::QueuedToCheck => "Queued to check",
            Self::Checking => "Checking files",
            Self::QueuedToDownload => "Queued to download",
            Self::Downloading => "Downloading",
            Self::QueuedToSeed => "Queued to seed",
            Self::Seeding => "Seeding",
        }
    }
}

/// Decoration categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `status` codes to labels
    Status,
    /// `*Date` epoch seconds to formatted timestamps
    Date,
    /// Byte-count fields to unit-suffixed strings
    Size,
}

/// Which response fields get rewritten into display form.
///
/// Held by the client and applied uniformly to every response while
/// active; changed only through explicit configuration calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decorate {
    /// Rewrite every known field
    All,
    /// Rewrite only the listed categories; an empty list disables
    /// decoration entirely
    Categories(Vec<Category>),
}

impl Decorate {
    /// Policy that leaves every response untouched.
    pub fn none() -> Self {
        Self::Categories(Vec::new())
    }

    fn wants(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Categories(list) => list.contains(&category),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::All => true,
            Self::Categories(list) => !list.is_empty(),
        }
    }
}

impl Default for Decorate {
    /// Status labels only, as the stock client configures itself.
    fn default() -> Self {
        Self::Categories(vec![Category::Status])
    }
}

/// Time zone and format used for the date category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStyle {
    /// UTC offset timestamps are rendered in
    pub offset: FixedOffset,
    /// strftime format string
    pub format: String,
}

impl Default for DateStyle {
    /// UTC+3 and `%d.%m.%Y @ %H:%M:%S`.
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(3 * 3600).expect("static offset is in range"),
            format: "%d.%m.%Y @ %H:%M:%S".to_string(),
        }
    }
}

/// Rewrite matching fields throughout the tree, depth-first.
pub fn decorate(tree: &mut Value, policy: &Decorate, dates: &DateStyle) {
    if !policy.is_active() {
        return;
    }
    walk(tree, policy, dates);
}

fn walk(node: &mut Value, policy: &Decorate, dates: &DateStyle) {
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, policy, dates);
            }
        }
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                match value {
                    Value::Array(_) | Value::Object(_) => walk(value, policy, dates),
                    _ => rewrite_field(key, value, policy, dates),
                }
            }
        }
        _ => {}
    }
}

fn rewrite_field(key: &str, value: &mut Value, policy: &Decorate, dates: &DateStyle) {
    match key {
        "status" if policy.wants(Category::Status) => {
            if let Some(code) = value.as_i64() {
                *value = Value::String(status_label(code).to_string());
            }
        }
        "doneDate" | "startDate" | "activityDate" | "addedDate"
            if policy.wants(Category::Date) =>
        {
            match value.as_i64() {
                Some(0) => *value = Value::Null,
                Some(ts) => {
                    if let Some(formatted) = format_date(ts, dates) {
                        *value = Value::String(formatted);
                    }
                }
                None => {}
            }
        }
        "totalSize" | "haveValid" | "length" | "sizeWhenDone"
            if policy.wants(Category::Size) =>
        {
            if let Some(bytes) = value.as_u64() {
                *value = Value::String(human_size(bytes));
            }
        }
        _ => {}
    }
}

fn status_label(code: i64) -> &'static str {
    TorrentStatus::from_code(code)
        .map(TorrentStatus::label)
        .unwrap_or("Unknown")
}

/// Base-1000 size string with two decimals, e.g. `1.50 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    let digits = if bytes == 0 { 1 } else { bytes.ilog10() + 1 };
    let factor = (((digits - 1) / 3) as usize).min(UNITS.len() - 1);
    format!(
        "{:.2} {}",
        bytes as f64 / 1000f64.powi(factor as i32),
        UNITS[factor]
    )
}

fn format_date(ts: i64, dates: &DateStyle) -> Option<String> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&dates.offset).format(&dates.format).to_string())
}
