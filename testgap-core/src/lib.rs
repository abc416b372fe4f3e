#![deny(missing_docs)]
//! TestGap core library.
//!
//! This crate contains the classification, scanning, reporting, and
//! scaffolding primitives behind the `testgap` batch tool.

pub mod classify;
pub mod domain;
pub mod error;
pub mod fs;
pub mod inspector;
pub mod report;
pub mod scanner;
pub mod skeleton;

pub use classify::{PriorityPolicy, classify, complexity_for_lines, priority_for_path};
pub use domain::{
    Classification, Complexity, CoverageStats, GapEntry, LanguageDistribution, Priority,
};
pub use error::{Result, TestGapError};
pub use fs::{FileSystem, StdFileSystem};
pub use inspector::{format_language_stats, language_distribution};
pub use report::{
    GapReport, GroupSummary, PriorityCounts, ReasonRule, ReportOptions, TopEntry, render_json,
    render_markdown, render_text, sort_entries,
};
pub use scanner::{GroupScan, ScanConfig, ScanGroup, ScanPlan, scan_group};
pub use skeleton::{InspectConfig, ScaffoldOutcome, SkeletonSpec, render_skeleton, scaffold};
