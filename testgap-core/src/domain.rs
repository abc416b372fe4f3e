//! Domain entities for TestGap.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A mapping of language names to their percentage of total lines.
pub type LanguageDistribution = BTreeMap<String, f64>;

/// Size tier derived from a file's line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    /// 150 lines or fewer.
    Low,
    /// More than 150 lines, up to 300.
    Medium,
    /// More than 300 lines.
    High,
}

impl Complexity {
    /// Sort rank: larger files surface first in the report.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Human-readable tier name.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Urgency tier derived from filename and path heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// No heuristic matched.
    Low,
    /// Filename matched a medium-value naming convention.
    Medium,
    /// Path crossed a business-domain segment.
    High,
    /// Filename matched a critical naming convention.
    Critical,
}

impl Priority {
    /// Sort rank: more urgent tiers surface first in the report.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Human-readable tier name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Marker glyph used in the Markdown report tables.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::High => "🟠",
            Self::Medium => "🟡",
            Self::Low => "🟢",
        }
    }
}

/// Complexity and priority tiers derived for one source file.
///
/// A pure function of (line count, path, filename), recomputed each run and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Size tier from line count thresholds.
    pub complexity: Complexity,
    /// Urgency tier from naming/path heuristics.
    pub priority: Priority,
}

/// A source file lacking a conventionally named sibling test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEntry {
    /// Path relative to the scanned root.
    pub path: PathBuf,
    /// Category label assigned by the scan plan.
    pub category: String,
    /// Line count of the source file (0 when unreadable).
    pub lines: usize,
    /// Derived classification.
    pub classification: Classification,
}

/// File counts for one scan group or the whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Source files found (test files excluded).
    pub total_files: usize,
    /// Conventional test files found in reserved test directories.
    pub test_files: usize,
}

impl CoverageStats {
    /// File test coverage percentage; 0 when no files were found.
    pub fn coverage_pct(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        (self.test_files as f64 / self.total_files as f64) * 100.0
    }

    /// Number of source files without a test file.
    pub fn untested(&self) -> usize {
        self.total_files.saturating_sub(self.test_files)
    }

    /// Fold another group's counts into this one.
    pub fn absorb(&mut self, other: CoverageStats) {
        self.total_files += other.total_files;
        self.test_files += other.test_files;
    }
}
