//! Legacy soak database layout.

use serde::{Deserialize, Serialize};

fn default_main_table() -> String {
    "mainTable".to_string()
}

const fn default_visit_segment() -> usize {
    5
}

fn default_report_segments() -> Vec<usize> {
    vec![3, 4, 5]
}

const fn default_mark_tableless_processed() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyConfig {
    /// Table holding one row per crystal in every legacy file.
    #[serde(default = "default_main_table")]
    pub main_table: String,

    /// Index of the `/`-separated path segment naming the visit
    /// (e.g. `lb18145-112`). The leading empty segment counts.
    #[serde(default = "default_visit_segment")]
    pub visit_segment: usize,

    /// Path segments joined with `_` to prefix report file names.
    #[serde(default = "default_report_segments")]
    pub report_segments: Vec<usize>,

    /// Whether a file without a main table still completes its cycle
    /// (status `unchanged`). When false it stays pending.
    #[serde(default = "default_mark_tableless_processed")]
    pub mark_tableless_processed: bool,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            main_table: default_main_table(),
            visit_segment: default_visit_segment(),
            report_segments: default_report_segments(),
            mark_tableless_processed: default_mark_tableless_processed(),
        }
    }
}
