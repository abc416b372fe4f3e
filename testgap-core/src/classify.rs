//! Coverage classification heuristics.
//!
//! Classification is a pure function of a file's line count, filename, and
//! path string. The substring dictionaries are policy values, not module
//! state, so callers can test against arbitrary conventions.

use std::path::Path;

use crate::domain::{Classification, Complexity, Priority};

/// Naming and path conventions that drive priority classification.
///
/// First matching rule wins: a critical filename pattern beats a business
/// path segment, which beats a medium filename pattern. All matching is
/// case-insensitive substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityPolicy {
    /// Filename patterns that mark a file Critical.
    pub critical_patterns: Vec<String>,
    /// Path segments that mark a file High.
    pub business_paths: Vec<String>,
    /// Filename patterns that mark a file Medium.
    pub medium_patterns: Vec<String>,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            critical_patterns: to_strings(&[
                "Client", "Page", "Form", "Modal", "Dialog", "Auth", "Payment", "Checkout",
                "Dashboard", "Service", "Provider", "Hook",
            ]),
            business_paths: to_strings(&["dashboard", "admin", "billing", "auth", "plan"]),
            medium_patterns: to_strings(&[
                "Settings", "Profile", "Management", "Editor", "Table", "List", "Panel", "Section",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Complexity tier for a line count: High above 300 lines, Medium above 150.
pub fn complexity_for_lines(lines: usize) -> Complexity {
    if lines > 300 {
        Complexity::High
    } else if lines > 150 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Priority tier for a file, evaluated in strict first-match-wins order.
pub fn priority_for_path(path: &Path, policy: &PriorityPolicy) -> Priority {
    let stem = path
        .file_stem()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase())
        .unwrap_or_default();
    let full_path = path.to_string_lossy().to_lowercase();

    if contains_any(&stem, &policy.critical_patterns) {
        return Priority::Critical;
    }
    if contains_any(&full_path, &policy.business_paths) {
        return Priority::High;
    }
    if contains_any(&stem, &policy.medium_patterns) {
        return Priority::Medium;
    }
    Priority::Low
}

/// Classify one source file from its line count and path.
pub fn classify(lines: usize, path: &Path, policy: &PriorityPolicy) -> Classification {
    Classification {
        complexity: complexity_for_lines(lines),
        priority: priority_for_path(path, policy),
    }
}

fn contains_any(haystack: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| haystack.contains(&pattern.to_lowercase()))
}
