//! Language accounting for the scanned tree.

use std::collections::BTreeMap;
use std::path::Path;

use tokei::{Config, LanguageType};

use crate::domain::LanguageDistribution;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::scanner::ScanConfig;

/// Compute the percentage of lines per language under the root.
///
/// Honors the scan exclusions so dependency caches and build output do not
/// skew the distribution. Unreadable files contribute nothing.
pub fn language_distribution<F: FileSystem>(
    fs: &F,
    root: &Path,
    scan: &ScanConfig,
) -> Result<LanguageDistribution> {
    let tokei_config = Config::default();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;

    for path in fs.list_files(root)? {
        if scan.is_excluded(&path) {
            continue;
        }
        let Some(language) = LanguageType::from_path(&path, &tokei_config) else {
            continue;
        };
        let lines = fs
            .read_to_string(&path)
            .map(|contents| contents.lines().count())
            .unwrap_or(0);
        if lines == 0 {
            continue;
        }
        total += lines;
        *counts.entry(language.to_string()).or_insert(0) += lines;
    }

    if total == 0 {
        return Ok(BTreeMap::new());
    }

    let mut distribution = BTreeMap::new();
    for (language, count) in counts {
        let percentage = (count as f64 / total as f64) * 100.0;
        distribution.insert(language, percentage);
    }

    Ok(distribution)
}

/// Format language stats sorted by percentage, largest first.
pub fn format_language_stats(stats: &LanguageDistribution) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> = stats.iter().map(|(k, v)| (k.clone(), *v)).collect();
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    items
}
