//! Coverage gap report assembly and rendering.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{CoverageStats, GapEntry, LanguageDistribution, Priority};
use crate::inspector::format_language_stats;
use crate::scanner::GroupScan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A path-substring rule that annotates a top-ranked entry with a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonRule {
    /// Substring matched against the entry path (case-sensitive).
    pub pattern: String,
    /// Annotation emitted when the pattern matches.
    pub reason: String,
}

impl ReasonRule {
    fn new(pattern: &str, reason: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Knobs for report assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// How many entries the global excerpt holds.
    pub top_n: usize,
    /// Reason annotation rules, first match wins.
    pub reason_rules: Vec<ReasonRule>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: 20,
            reason_rules: vec![
                ReasonRule::new("Client", "Client component with state"),
                ReasonRule::new("Service", "Service layer with business logic"),
                ReasonRule::new("Form", "Form with validation"),
                ReasonRule::new("Modal", "Interactive component"),
                ReasonRule::new("Dialog", "Interactive component"),
            ],
        }
    }
}

/// Per-group line of the coverage breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Category label.
    pub label: String,
    /// File counts for the group.
    pub stats: CoverageStats,
}

/// One row of the top-N excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    /// The ranked gap entry.
    pub entry: GapEntry,
    /// Heuristic annotation for the ranking table.
    pub reason: String,
}

/// Gap counts per priority tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    /// Entries classified Critical.
    pub critical: usize,
    /// Entries classified High.
    pub high: usize,
    /// Entries classified Medium.
    pub medium: usize,
    /// Entries classified Low.
    pub low: usize,
}

/// A complete coverage gap report, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    /// Scanned root directory.
    pub root: PathBuf,
    /// When the report was generated.
    pub generated_at: DateTime<Local>,
    /// Aggregate counts over every group.
    pub overall: CoverageStats,
    /// Per-group counts in scan order.
    pub groups: Vec<GroupSummary>,
    /// Every gap entry in ranked order.
    pub entries: Vec<GapEntry>,
    /// Top-N excerpt with reason annotations.
    pub top: Vec<TopEntry>,
    /// Language share of the scanned tree.
    pub languages: LanguageDistribution,
    /// Gap counts per priority tier.
    pub priority_counts: PriorityCounts,
}

impl GapReport {
    /// Assemble a report from per-group scan results.
    ///
    /// The caller supplies the timestamp so rendering stays deterministic.
    pub fn build(
        root: PathBuf,
        scans: Vec<GroupScan>,
        languages: LanguageDistribution,
        generated_at: DateTime<Local>,
        options: &ReportOptions,
    ) -> Self {
        let mut overall = CoverageStats::default();
        let mut groups = Vec::with_capacity(scans.len());
        let mut entries = Vec::new();

        for scan in scans {
            overall.absorb(scan.stats);
            groups.push(GroupSummary {
                label: scan.label,
                stats: scan.stats,
            });
            entries.extend(scan.gaps);
        }

        sort_entries(&mut entries);

        let top = entries
            .iter()
            .take(options.top_n)
            .map(|entry| TopEntry {
                entry: entry.clone(),
                reason: reason_for(entry, &options.reason_rules),
            })
            .collect();

        let priority_counts = count_priorities(&entries);

        Self {
            root,
            generated_at,
            overall,
            groups,
            entries,
            top,
            languages,
            priority_counts,
        }
    }
}

/// Sort entries into the report's total order.
///
/// Priority rank first (Critical before High before Medium before Low), then
/// complexity rank (High before Medium before Low), then line count
/// descending. The sort is stable, so equal keys keep their scan order.
pub fn sort_entries(entries: &mut [GapEntry]) {
    entries.sort_by_key(|entry| {
        (
            entry.classification.priority.rank(),
            entry.classification.complexity.rank(),
            Reverse(entry.lines),
        )
    });
}

/// Reason annotation for a top-ranked entry, first matching rule wins.
pub fn reason_for(entry: &GapEntry, rules: &[ReasonRule]) -> String {
    let path = entry.path.to_string_lossy();
    if let Some(rule) = rules.iter().find(|rule| path.contains(&rule.pattern)) {
        return rule.reason.clone();
    }
    match entry.classification.priority {
        Priority::Critical | Priority::High => "Business logic".to_string(),
        Priority::Medium | Priority::Low => "User interaction".to_string(),
    }
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Render the report as a Markdown document.
pub fn render_markdown(report: &GapReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Component Test Coverage Gap Analysis\n");
    let _ = writeln!(
        output,
        "**Generated:** {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(output, "**Root:** `{}`\n", report.root.display());

    append_summary(&mut output, report);
    append_breakdown(&mut output, &report.groups);
    append_languages(&mut output, &report.languages);
    append_category_tables(&mut output, &report.entries);
    append_top_excerpt(&mut output, &report.top);
    append_plan(&mut output, &report.top);
    append_footer(&mut output, report);

    output
}

/// Render the report as a plain-text console summary.
pub fn render_text(report: &GapReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Root: {}", report.root.display());
    let _ = writeln!(output, "Total source files: {}", report.overall.total_files);
    let _ = writeln!(output, "Test files: {}", report.overall.test_files);
    let _ = writeln!(output, "Coverage: {:.2}%", report.overall.coverage_pct());
    let _ = writeln!(output, "Untested: {}", report.entries.len());
    let counts = &report.priority_counts;
    let _ = writeln!(
        output,
        "Priority distribution: Critical: {}, High: {}, Medium: {}, Low: {}",
        counts.critical, counts.high, counts.medium, counts.low
    );
    output
}

fn append_summary(output: &mut String, report: &GapReport) {
    let _ = writeln!(output, "## Executive Summary\n");
    let _ = writeln!(
        output,
        "- **Total Source Files:** {}",
        report.overall.total_files
    );
    let _ = writeln!(
        output,
        "- **Total Test Files:** {}",
        report.overall.test_files
    );
    let _ = writeln!(
        output,
        "- **File Test Coverage:** {:.2}%",
        report.overall.coverage_pct()
    );
    let _ = writeln!(
        output,
        "- **Gap:** {} files without tests\n",
        report.entries.len()
    );
}

fn append_breakdown(output: &mut String, groups: &[GroupSummary]) {
    let _ = writeln!(output, "## Coverage Breakdown\n");
    if groups.is_empty() {
        let _ = writeln!(output, "No source groups scanned.\n");
        return;
    }
    for group in groups {
        let _ = writeln!(output, "### {}\n", group.label);
        let _ = writeln!(output, "- Total Files: {}", group.stats.total_files);
        let _ = writeln!(output, "- Test Files: {}", group.stats.test_files);
        let _ = writeln!(output, "- Coverage: {:.2}%\n", group.stats.coverage_pct());
    }
}

fn append_languages(output: &mut String, languages: &LanguageDistribution) {
    let _ = writeln!(output, "## Languages\n");
    if languages.is_empty() {
        let _ = writeln!(output, "No languages detected.\n");
        return;
    }
    for (language, percent) in format_language_stats(languages) {
        let _ = writeln!(output, "- {language}: {percent:.2}%");
    }
    let _ = writeln!(output);
}

fn append_category_tables(output: &mut String, entries: &[GapEntry]) {
    let _ = writeln!(output, "## Untested Components by Priority\n");
    if entries.is_empty() {
        let _ = writeln!(output, "No coverage gaps found.\n");
        return;
    }

    let categories: BTreeSet<&str> = entries.iter().map(|e| e.category.as_str()).collect();
    for category in categories {
        let _ = writeln!(output, "### {category}\n");
        let _ = writeln!(output, "| Component | Priority | Complexity | Lines |");
        let _ = writeln!(output, "|-----------|----------|------------|-------|");
        for entry in entries.iter().filter(|e| e.category == category) {
            let priority = entry.classification.priority;
            let _ = writeln!(
                output,
                "| {} | {} {} | {} | {} |",
                entry.path.display(),
                priority.marker(),
                priority.label(),
                entry.classification.complexity.label(),
                entry.lines
            );
        }
        let _ = writeln!(output);
    }
}

fn append_top_excerpt(output: &mut String, top: &[TopEntry]) {
    let _ = writeln!(output, "## Top {} Components Needing Tests\n", top.len());
    if top.is_empty() {
        let _ = writeln!(output, "Nothing to prioritize.\n");
        return;
    }
    let _ = writeln!(output, "Prioritized by:\n");
    let _ = writeln!(output, "1. Business logic complexity");
    let _ = writeln!(output, "2. User-facing importance");
    let _ = writeln!(
        output,
        "3. Critical functionality (auth, payments, data mutations)"
    );
    let _ = writeln!(output, "4. Lines of code (complexity proxy)\n");
    let _ = writeln!(
        output,
        "| # | Component | Priority | Complexity | Lines | Reason |"
    );
    let _ = writeln!(
        output,
        "|---|-----------|----------|------------|-------|--------|"
    );
    for (index, item) in top.iter().enumerate() {
        let entry = &item.entry;
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            index + 1,
            entry.path.display(),
            entry.classification.priority.label(),
            entry.classification.complexity.label(),
            entry.lines,
            item.reason
        );
    }
    let _ = writeln!(output);
}

fn append_plan(output: &mut String, top: &[TopEntry]) {
    let _ = writeln!(output, "## Priority Test Implementation Plan\n");
    let _ = writeln!(
        output,
        "### Phase 1: Critical Components (Week 1) - Top {}\n",
        top.len()
    );
    let _ = writeln!(
        output,
        "**Focus:** Business logic, authentication, payments, data mutations\n"
    );
    if !top.is_empty() {
        let _ = writeln!(output, "**Components to test:**\n");
        for (index, item) in top.iter().enumerate() {
            let _ = writeln!(output, "{}. `{}`", index + 1, item.entry.path.display());
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output, "### Phase 2: High Priority Components (Week 2)\n");
    let _ = writeln!(
        output,
        "**Focus:** Dashboard components, settings, user management\n"
    );
    let _ = writeln!(output, "### Phase 3: Medium Priority Components (Week 3)\n");
    let _ = writeln!(output, "**Focus:** Feature components, forms, navigation\n");
    let _ = writeln!(output, "### Phase 4: Low Priority Components (Week 4)\n");
    let _ = writeln!(
        output,
        "**Focus:** UI components, simple wrappers, presentational components\n"
    );
}

fn append_footer(output: &mut String, report: &GapReport) {
    let counts = &report.priority_counts;
    let _ = writeln!(output, "---\n");
    let _ = writeln!(
        output,
        "**Total Untested Files:** {}",
        report.entries.len()
    );
    let _ = writeln!(
        output,
        "**Priority Distribution:** Critical: {}, High: {}, Medium: {}, Low: {}",
        counts.critical, counts.high, counts.medium, counts.low
    );
}

fn count_priorities(entries: &[GapEntry]) -> PriorityCounts {
    let mut counts = PriorityCounts::default();
    for entry in entries {
        match entry.classification.priority {
            Priority::Critical => counts.critical += 1,
            Priority::High => counts.high += 1,
            Priority::Medium => counts.medium += 1,
            Priority::Low => counts.low += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{
        GapReport, ReasonRule, ReportOptions, reason_for, render_json, render_markdown,
        render_text, sort_entries,
    };
    use crate::domain::{Classification, Complexity, CoverageStats, GapEntry, Priority};
    use crate::scanner::GroupScan;
    use chrono::{Local, TimeZone};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn entry(path: &str, category: &str, priority: Priority, complexity: Complexity, lines: usize) -> GapEntry {
        GapEntry {
            path: PathBuf::from(path),
            category: category.to_string(),
            lines,
            classification: Classification {
                complexity,
                priority,
            },
        }
    }

    fn sample_report() -> GapReport {
        let scans = vec![
            GroupScan {
                label: "UI Components".to_string(),
                stats: CoverageStats {
                    total_files: 3,
                    test_files: 1,
                },
                gaps: vec![
                    entry(
                        "components/ui/Button.tsx",
                        "UI Components",
                        Priority::Low,
                        Complexity::Medium,
                        200,
                    ),
                    entry(
                        "components/ui/PaymentForm.tsx",
                        "UI Components",
                        Priority::Critical,
                        Complexity::High,
                        400,
                    ),
                ],
            },
            GroupScan {
                label: "App: dashboard".to_string(),
                stats: CoverageStats {
                    total_files: 1,
                    test_files: 0,
                },
                gaps: vec![entry(
                    "app/dashboard/Widget.tsx",
                    "App: dashboard",
                    Priority::High,
                    Complexity::Low,
                    50,
                )],
            },
        ];
        let mut languages = BTreeMap::new();
        languages.insert("TypeScript".to_string(), 100.0);
        let generated_at = Local.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        GapReport::build(
            PathBuf::from("/repo"),
            scans,
            languages,
            generated_at,
            &ReportOptions::default(),
        )
    }

    #[test]
    fn sorting_is_a_stable_total_order() {
        let mut entries = vec![
            entry("a.tsx", "X", Priority::Critical, Complexity::Low, 500),
            entry("b.tsx", "X", Priority::Critical, Complexity::Low, 100),
            entry("c.tsx", "X", Priority::High, Complexity::High, 50),
        ];
        // Shuffle the expected order before sorting.
        entries.swap(0, 2);

        sort_entries(&mut entries);

        let paths: Vec<&str> = entries
            .iter()
            .map(|e| e.path.to_str().unwrap_or_default())
            .collect();
        assert_eq!(paths, vec!["a.tsx", "b.tsx", "c.tsx"]);
    }

    #[test]
    fn build_ranks_entries_across_groups() {
        let report = sample_report();

        assert_eq!(report.overall.total_files, 4);
        assert_eq!(report.overall.test_files, 1);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(
            report.entries[0].path,
            PathBuf::from("components/ui/PaymentForm.tsx")
        );
        assert_eq!(
            report.entries[1].path,
            PathBuf::from("app/dashboard/Widget.tsx")
        );
        assert_eq!(report.priority_counts.critical, 1);
        assert_eq!(report.priority_counts.high, 1);
        assert_eq!(report.priority_counts.low, 1);
    }

    #[test]
    fn reason_rules_match_in_declared_order() {
        let rules = ReportOptions::default().reason_rules;

        let client = entry(
            "app/ai-kit/AIKitClient.tsx",
            "App: ai-kit",
            Priority::Critical,
            Complexity::High,
            400,
        );
        assert_eq!(reason_for(&client, &rules), "Client component with state");

        // "Service" outranks "Form" when both could match.
        let service_form = entry(
            "services/FormService.ts",
            "Services",
            Priority::Critical,
            Complexity::Low,
            80,
        );
        assert_eq!(
            reason_for(&service_form, &rules),
            "Service layer with business logic"
        );

        let fallback_high = entry(
            "app/dashboard/widget.tsx",
            "App: dashboard",
            Priority::High,
            Complexity::Low,
            10,
        );
        assert_eq!(reason_for(&fallback_high, &rules), "Business logic");

        let fallback_low = entry(
            "components/ui/badge.tsx",
            "UI Components",
            Priority::Low,
            Complexity::Low,
            10,
        );
        assert_eq!(reason_for(&fallback_low, &rules), "User interaction");
    }

    #[test]
    fn markdown_contains_every_section() {
        let report = sample_report();
        let output = render_markdown(&report);

        assert!(output.contains("# Component Test Coverage Gap Analysis"));
        assert!(output.contains("**Generated:** 2026-08-07 09:30:00"));
        assert!(output.contains("- **File Test Coverage:** 25.00%"));
        assert!(output.contains("### UI Components"));
        assert!(output.contains("### App: dashboard"));
        assert!(output.contains("- TypeScript: 100.00%"));
        assert!(output.contains("| components/ui/PaymentForm.tsx | 🔴 Critical | High | 400 |"));
        assert!(output.contains("## Top 3 Components Needing Tests"));
        assert!(output.contains("| 1 | components/ui/PaymentForm.tsx | Critical | High | 400 | Form with validation |"));
        assert!(output.contains("1. `components/ui/PaymentForm.tsx`"));
        assert!(output.contains("**Priority Distribution:** Critical: 1, High: 1, Medium: 0, Low: 1"));
    }

    #[test]
    fn markdown_category_tables_preserve_rank_order() {
        let report = sample_report();
        let output = render_markdown(&report);

        let payment = output
            .find("| components/ui/PaymentForm.tsx |")
            .expect("payment row");
        let button = output.find("| components/ui/Button.tsx |").expect("button row");
        assert!(payment < button);
    }

    #[test]
    fn empty_report_renders_without_percent_faults() {
        let generated_at = Local.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        let report = GapReport::build(
            PathBuf::from("/repo"),
            Vec::new(),
            BTreeMap::new(),
            generated_at,
            &ReportOptions::default(),
        );

        assert_eq!(report.overall.coverage_pct(), 0.0);
        let output = render_markdown(&report);
        assert!(output.contains("- **File Test Coverage:** 0.00%"));
        assert!(output.contains("No source groups scanned."));
        assert!(output.contains("No coverage gaps found."));
        assert!(output.contains("No languages detected."));
    }

    #[test]
    fn text_summary_reports_counts() {
        let report = sample_report();
        let output = render_text(&report);

        assert!(output.contains("Total source files: 4"));
        assert!(output.contains("Coverage: 25.00%"));
        assert!(output.contains("Untested: 3"));
        assert!(output.contains("Critical: 1, High: 1, Medium: 0, Low: 1"));
    }

    #[test]
    fn json_rendering_round_trips() {
        let report = sample_report();
        let json = render_json(&report).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(parsed["overall"]["total_files"], 4);
        assert_eq!(parsed["entries"][0]["path"], "components/ui/PaymentForm.tsx");
        assert_eq!(parsed["top"][0]["reason"], "Form with validation");
    }

    #[test]
    fn top_excerpt_honors_the_limit() {
        let scans = vec![GroupScan {
            label: "Services".to_string(),
            stats: CoverageStats {
                total_files: 5,
                test_files: 0,
            },
            gaps: (0..5)
                .map(|i| {
                    entry(
                        &format!("services/svc{i}.ts"),
                        "Services",
                        Priority::Low,
                        Complexity::Low,
                        10,
                    )
                })
                .collect(),
        }];
        let generated_at = Local.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        let options = ReportOptions {
            top_n: 2,
            ..ReportOptions::default()
        };
        let report = GapReport::build(
            PathBuf::from("/repo"),
            scans,
            BTreeMap::new(),
            generated_at,
            &options,
        );

        assert_eq!(report.top.len(), 2);
        assert_eq!(report.entries.len(), 5);
    }
}
