//! Key convention of the examples bucket.
//!
//! ```text
//! {lang}/{dashboard}/dashboard.json
//! {lang}/{dashboard}/widgets/{name}.json
//! {lang}/{dashboard}/datasets/{name}.json
//! {lang}/{dashboard}/data/{file}.json|csv
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

pub const DASHBOARD_FILE: &str = "dashboard.json";
pub const WIDGETS_DIR: &str = "widgets";
pub const DATASETS_DIR: &str = "datasets";
pub const DATA_DIR: &str = "data";

static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleKeyKind {
    Dashboard,
    Widget,
    Dataset,
    Data,
    Unknown,
}

/// One classified key from the examples bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleKey {
    pub key: String,
    pub language: String,
    /// Dashboard directory name. Empty for keys with fewer than 3 segments.
    pub dashboard_dir: String,
    pub kind: ExampleKeyKind,
}

impl ExampleKey {
    pub fn parse(key: &str) -> Self {
        let segments: Vec<&str> = key.split('/').collect();
        let language = segments.first().copied().unwrap_or_default().to_string();

        if segments.len() < 3 || segments.iter().any(|segment| segment.is_empty()) {
            return Self {
                key: key.to_string(),
                language,
                dashboard_dir: String::new(),
                kind: ExampleKeyKind::Unknown,
            };
        }

        let kind = match &segments[2..] {
            [DASHBOARD_FILE] => ExampleKeyKind::Dashboard,
            [WIDGETS_DIR, file] if is_json(file) => ExampleKeyKind::Widget,
            [DATASETS_DIR, file] if is_json(file) => ExampleKeyKind::Dataset,
            [DATA_DIR, rest @ ..] if !rest.is_empty() && is_data_file(rest[rest.len() - 1]) => {
                ExampleKeyKind::Data
            }
            _ => ExampleKeyKind::Unknown,
        };

        Self {
            key: key.to_string(),
            language,
            dashboard_dir: segments[1].to_string(),
            kind,
        }
    }

    /// Last path segment of the key.
    pub fn file_name(&self) -> &str {
        file_name(&self.key)
    }
}

/// Last `/`-separated segment of a key.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// File name without its final extension.
pub fn file_stem(key: &str) -> &str {
    let name = file_name(key);
    match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    }
}

/// Final extension without the dot, lowercased.
pub fn file_extension(key: &str) -> Option<String> {
    let name = file_name(key);
    match name.rfind('.') {
        Some(index) if index > 0 && index + 1 < name.len() => {
            Some(name[index + 1..].to_ascii_lowercase())
        }
        _ => None,
    }
}

fn is_json(file: &str) -> bool {
    file_extension(file).as_deref() == Some("json")
}

fn is_data_file(file: &str) -> bool {
    matches!(file_extension(file).as_deref(), Some("json" | "csv"))
}

/// Whether `key` ends with the file name part of `reference`.
///
/// Directory parts are ignored on both sides, so `data/cases.csv` matches a
/// stored reference of `uploads/2020/cases.csv`.
pub fn matches_file_suffix(key: &str, reference: &str) -> bool {
    let wanted = file_name(reference);
    !wanted.is_empty() && file_name(key) == wanted
}

pub fn language_prefix(language: &str) -> String {
    format!("{language}/")
}

pub fn dashboard_prefix(language: &str, dashboard_dir: &str) -> String {
    format!("{language}/{dashboard_dir}/")
}

pub fn dashboard_key(language: &str, dashboard_dir: &str) -> String {
    format!("{language}/{dashboard_dir}/{DASHBOARD_FILE}")
}

pub fn widget_key(language: &str, dashboard_dir: &str, name: &str) -> String {
    format!("{language}/{dashboard_dir}/{WIDGETS_DIR}/{name}.json")
}

pub fn dataset_key(language: &str, dashboard_dir: &str, name: &str) -> String {
    format!("{language}/{dashboard_dir}/{DATASETS_DIR}/{name}.json")
}

pub fn data_key(language: &str, dashboard_dir: &str, file: &str) -> String {
    format!("{language}/{dashboard_dir}/{DATA_DIR}/{}", file_name(file))
}

/// Directory name for a dashboard: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let slug = SLUG_SEPARATOR_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "dashboard".to_string()
    } else {
        slug.to_string()
    }
}
