//! Directory scanning for coverage gaps.

use std::path::{Path, PathBuf};

use crate::classify::{PriorityPolicy, classify};
use crate::domain::{CoverageStats, GapEntry};
use crate::error::Result;
use crate::fs::FileSystem;

/// File conventions for the scanned tree.
///
/// Defaults describe a Next.js-style layout: `.tsx`/`.ts` sources, tests in
/// a sibling `__tests__` directory named `<stem>.test.<ext>`, dependency
/// caches and build output ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Allowed source file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Reserved test directory name.
    pub test_dir: String,
    /// Suffix inserted before the extension of a test file.
    pub test_suffix: String,
    /// Directory names excluded from scanning wherever they appear.
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["tsx".to_string(), "ts".to_string()],
            test_dir: "__tests__".to_string(),
            test_suffix: ".test".to_string(),
            excluded_dirs: vec!["node_modules".to_string(), ".next".to_string()],
        }
    }
}

impl ScanConfig {
    /// Whether the path's extension is in the allowed set.
    pub fn allows_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }

    /// Whether any path component is an excluded directory name.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path_components_match(path, &self.excluded_dirs)
    }

    /// Whether the path sits inside a reserved test directory.
    pub fn in_test_dir(&self, path: &Path) -> bool {
        path.components().any(|component| {
            component.as_os_str().to_string_lossy() == self.test_dir.as_str()
        })
    }

    /// Whether the filename follows the `<stem>.test.<ext>` convention.
    pub fn is_test_file_name(&self, path: &Path) -> bool {
        self.allows_extension(path)
            && path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.ends_with(&self.test_suffix))
                .unwrap_or(false)
    }

    /// Conventional location of the test file paired with a source file.
    pub fn expected_test_path(&self, source: &Path) -> Option<PathBuf> {
        let parent = source.parent()?;
        let stem = source.file_stem()?.to_str()?;
        let ext = source.extension()?.to_str()?;
        Some(
            parent
                .join(&self.test_dir)
                .join(format!("{stem}{}.{ext}", self.test_suffix)),
        )
    }
}

/// One directory to scan, with the category label its gaps are filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanGroup {
    /// Directory to walk.
    pub dir: PathBuf,
    /// Category label for the report.
    pub label: String,
}

/// The set of directories one report run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Groups in scan order.
    pub groups: Vec<ScanGroup>,
}

impl ScanPlan {
    /// Build the conventional plan for a web-application tree.
    ///
    /// Covers each `components/<sub>` directory, each `app/<sub>` directory
    /// except `api` and the reserved test directory, plus `services` and
    /// `lib`. Only directories that exist are included.
    pub fn conventional<F: FileSystem>(fs: &F, root: &Path, config: &ScanConfig) -> Result<Self> {
        let top: Vec<String> = fs
            .list_dirs(root)?
            .into_iter()
            .filter_map(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();

        let mut groups = Vec::new();

        if top.iter().any(|name| name == "components") {
            for sub in fs.list_dirs(&root.join("components"))? {
                let Some(name) = sub.file_name().and_then(|n| n.to_str()).map(str::to_string)
                else {
                    continue;
                };
                if name == config.test_dir {
                    continue;
                }
                groups.push(ScanGroup {
                    dir: sub,
                    label: format!("{} Components", title_label(&name)),
                });
            }
        }

        if top.iter().any(|name| name == "app") {
            for sub in fs.list_dirs(&root.join("app"))? {
                let Some(name) = sub.file_name().and_then(|n| n.to_str()).map(str::to_string)
                else {
                    continue;
                };
                if name == "api" || name == config.test_dir {
                    continue;
                }
                groups.push(ScanGroup {
                    dir: sub,
                    label: format!("App: {name}"),
                });
            }
        }

        if top.iter().any(|name| name == "services") {
            groups.push(ScanGroup {
                dir: root.join("services"),
                label: "Services".to_string(),
            });
        }
        if top.iter().any(|name| name == "lib") {
            groups.push(ScanGroup {
                dir: root.join("lib"),
                label: "Library".to_string(),
            });
        }

        Ok(Self { groups })
    }
}

/// Scan results for one group: its gap entries and file counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupScan {
    /// Category label from the plan.
    pub label: String,
    /// Source and test file counts for the group.
    pub stats: CoverageStats,
    /// Source files lacking a conventional test file, in walk order.
    pub gaps: Vec<GapEntry>,
}

/// Scan one group for coverage gaps.
///
/// Unreadable source files are classified with a zero line count rather than
/// failing the scan. Output order within the group is the walk order; the
/// report generator establishes the total ordering.
pub fn scan_group<F: FileSystem>(
    fs: &F,
    root: &Path,
    group: &ScanGroup,
    config: &ScanConfig,
    policy: &PriorityPolicy,
) -> Result<GroupScan> {
    let mut stats = CoverageStats::default();
    let mut gaps = Vec::new();

    for path in fs.list_files(&group.dir)? {
        if config.is_excluded(&path) || !config.allows_extension(&path) {
            continue;
        }
        if config.in_test_dir(&path) {
            if config.is_test_file_name(&path) {
                stats.test_files += 1;
            }
            continue;
        }

        stats.total_files += 1;

        let Some(test_path) = config.expected_test_path(&path) else {
            continue;
        };
        if fs.file_exists(&test_path) {
            continue;
        }

        let lines = fs
            .read_to_string(&path)
            .map(|contents| contents.lines().count())
            .unwrap_or(0);
        let classification = classify(lines, &path, policy);
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());

        gaps.push(GapEntry {
            path: relative,
            category: group.label.clone(),
            lines,
            classification,
        });
    }

    Ok(GroupScan {
        label: group.label.clone(),
        stats,
        gaps,
    })
}

/// Report heading for a `components/<sub>` directory name.
///
/// Hyphenated segments become separate words; short segments are treated as
/// initialisms ("ui" becomes "UI", "agent-swarm" becomes "Agent Swarm").
fn title_label(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            if segment.len() <= 2 {
                segment.to_uppercase()
            } else {
                let mut chars = segment.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn path_components_match(path: &Path, segments: &[String]) -> bool {
    path.components().any(|component| {
        let segment = component.as_os_str().to_string_lossy();
        segments.iter().any(|target| target.as_str() == segment)
    })
}

#[cfg(test)]
mod tests {
    use super::{ScanConfig, ScanGroup, ScanPlan, scan_group, title_label};
    use crate::classify::PriorityPolicy;
    use crate::domain::{Complexity, Priority};
    use crate::error::TestGapError;
    use crate::fs::{MockFileSystem, StdFileSystem};
    use std::path::{Path, PathBuf};

    #[test]
    fn expected_test_path_follows_convention() {
        let config = ScanConfig::default();
        let test_path = config
            .expected_test_path(Path::new("components/ui/Button.tsx"))
            .expect("test path");
        assert_eq!(
            test_path,
            PathBuf::from("components/ui/__tests__/Button.test.tsx")
        );
    }

    #[test]
    fn test_file_names_are_recognized() {
        let config = ScanConfig::default();
        assert!(config.is_test_file_name(Path::new("__tests__/Button.test.tsx")));
        assert!(config.is_test_file_name(Path::new("__tests__/api.test.ts")));
        assert!(!config.is_test_file_name(Path::new("__tests__/helpers.tsx")));
        assert!(!config.is_test_file_name(Path::new("__tests__/notes.test.md")));
    }

    #[test]
    fn excluded_dirs_match_any_component() {
        let config = ScanConfig::default();
        assert!(config.is_excluded(Path::new("components/node_modules/pkg/index.ts")));
        assert!(config.is_excluded(Path::new(".next/static/chunk.ts")));
        assert!(!config.is_excluded(Path::new("components/ui/Button.tsx")));
    }

    #[test]
    fn scan_finds_untested_files_and_counts_tested_ones() {
        let root = temp_root();
        write_file(&root, "components/ui/Button.tsx", &source_of_lines(200));
        write_file(&root, "components/ui/Badge.tsx", &source_of_lines(10));
        write_file(
            &root,
            "components/ui/__tests__/Badge.test.tsx",
            "describe('Badge', () => {});",
        );
        // Not a source extension; ignored entirely.
        write_file(&root, "components/ui/styles.css", ".button {}");

        let fs = StdFileSystem::new();
        let group = ScanGroup {
            dir: root.join("components/ui"),
            label: "UI Components".to_string(),
        };
        let scan = scan_group(
            &fs,
            &root,
            &group,
            &ScanConfig::default(),
            &PriorityPolicy::default(),
        )
        .expect("scan");

        assert_eq!(scan.stats.total_files, 2);
        assert_eq!(scan.stats.test_files, 1);
        assert_eq!(scan.gaps.len(), 1);

        let gap = &scan.gaps[0];
        assert_eq!(gap.path, PathBuf::from("components/ui/Button.tsx"));
        assert_eq!(gap.category, "UI Components");
        assert_eq!(gap.lines, 200);
        assert_eq!(gap.classification.complexity, Complexity::Medium);
        assert_eq!(gap.classification.priority, Priority::Low);

        cleanup(&root);
    }

    #[test]
    fn scan_skips_dependency_caches() {
        let root = temp_root();
        write_file(&root, "services/api.ts", &source_of_lines(20));
        write_file(&root, "services/node_modules/lib/index.ts", "export {};");

        let fs = StdFileSystem::new();
        let group = ScanGroup {
            dir: root.join("services"),
            label: "Services".to_string(),
        };
        let scan = scan_group(
            &fs,
            &root,
            &group,
            &ScanConfig::default(),
            &PriorityPolicy::default(),
        )
        .expect("scan");

        assert_eq!(scan.stats.total_files, 1);
        assert_eq!(scan.gaps.len(), 1);

        cleanup(&root);
    }

    #[test]
    fn unreadable_file_degrades_to_zero_lines() {
        let mut fs = MockFileSystem::new();
        fs.expect_list_files()
            .returning(|_| Ok(vec![PathBuf::from("/repo/services/QNNApiClient.ts")]));
        fs.expect_file_exists().return_const(false);
        fs.expect_read_to_string()
            .returning(|_| Err(TestGapError::Other("permission denied".to_string())));

        let group = ScanGroup {
            dir: PathBuf::from("/repo/services"),
            label: "Services".to_string(),
        };
        let scan = scan_group(
            &fs,
            Path::new("/repo"),
            &group,
            &ScanConfig::default(),
            &PriorityPolicy::default(),
        )
        .expect("scan");

        assert_eq!(scan.gaps.len(), 1);
        assert_eq!(scan.gaps[0].lines, 0);
        assert_eq!(scan.gaps[0].classification.complexity, Complexity::Low);
        // "Client" in the filename still classifies Critical.
        assert_eq!(scan.gaps[0].classification.priority, Priority::Critical);
    }

    #[test]
    fn conventional_plan_covers_existing_directories() {
        let root = temp_root();
        write_file(&root, "components/ui/Button.tsx", "export {};");
        write_file(&root, "components/agent-swarm/Swarm.tsx", "export {};");
        write_file(&root, "app/dashboard/page.tsx", "export {};");
        write_file(&root, "app/api/route.ts", "export {};");
        write_file(&root, "services/api.ts", "export {};");
        write_file(&root, "lib/utils.ts", "export {};");

        let fs = StdFileSystem::new();
        let plan =
            ScanPlan::conventional(&fs, &root, &ScanConfig::default()).expect("plan");
        let labels: Vec<&str> = plan.groups.iter().map(|g| g.label.as_str()).collect();

        assert_eq!(
            labels,
            vec![
                "Agent Swarm Components",
                "UI Components",
                "App: dashboard",
                "Services",
                "Library",
            ]
        );

        cleanup(&root);
    }

    #[test]
    fn conventional_plan_handles_sparse_trees() {
        let root = temp_root();
        write_file(&root, "lib/utils.ts", "export {};");

        let fs = StdFileSystem::new();
        let plan =
            ScanPlan::conventional(&fs, &root, &ScanConfig::default()).expect("plan");

        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].label, "Library");

        cleanup(&root);
    }

    #[test]
    fn title_label_handles_initialisms_and_hyphens() {
        assert_eq!(title_label("ui"), "UI");
        assert_eq!(title_label("layout"), "Layout");
        assert_eq!(title_label("agent-swarm"), "Agent Swarm");
    }

    fn source_of_lines(lines: usize) -> String {
        "const x = 1;\n".repeat(lines)
    }

    fn write_file(root: &Path, rel_path: &str, contents: &str) {
        let path = root.join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dir");
        }
        std::fs::write(&path, contents).expect("write file");
    }

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn temp_root() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!("testgap_scanner_test_{nanos}_{counter}"));
        std::fs::create_dir_all(&root).expect("create temp root");
        root
    }

    fn cleanup(root: &Path) {
        std::fs::remove_dir_all(root).expect("cleanup temp dir");
    }
}
