use crate::dependency_graph::domain::{GraphStatistics, WalkResult};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Number of entries listed for extension and licence counts
const TOP_ENTRIES: usize = 10;

/// Prints a short, human readable digest of a walk to stderr
pub struct SummaryPrinter;

impl SummaryPrinter {
    pub fn print(result: &WalkResult) {
        eprint!("{}", Self::render(result, true));
    }

    /// Renders the summary; `colored` adds ANSI styling
    pub fn render(result: &WalkResult, colored: bool) -> String {
        let stats = &result.statistics;
        let mut out = String::new();

        let title = format!("📦 {}", result.root);
        let _ = writeln!(out);
        if colored {
            let _ = writeln!(out, "{}", title.bold());
        } else {
            let _ = writeln!(out, "{}", title);
        }

        let rows = [
            ("Total packages", stats.total_packages.to_string()),
            ("Total size", Self::human_size(stats.total_size)),
            (
                "With indirect dependencies",
                stats.packages_with_indirect_dependencies.to_string(),
            ),
            ("Missing manifests", stats.missing_manifests.to_string()),
            ("Scan failures", stats.scan_failures.to_string()),
        ];
        for (label, value) in rows {
            if colored {
                let _ = writeln!(out, "   {:<28} {}", label, value.cyan());
            } else {
                let _ = writeln!(out, "   {:<28} {}", label, value);
            }
        }

        Self::render_counts(&mut out, "Extensions", &stats.extensions);
        Self::render_counts(&mut out, "Licenses", &stats.licenses);
        Self::render_warnings(&mut out, result, stats, colored);
        out
    }

    fn render_counts(out: &mut String, title: &str, counts: &BTreeMap<String, usize>) {
        if counts.is_empty() {
            return;
        }

        let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let listed: Vec<String> = sorted
            .iter()
            .take(TOP_ENTRIES)
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();
        let _ = writeln!(out, "   {:<28} {}", title, listed.join(", "));
    }

    fn render_warnings(
        out: &mut String,
        result: &WalkResult,
        stats: &GraphStatistics,
        colored: bool,
    ) {
        let flagged = result
            .records()
            .filter(|record| record.flags.has_suspect_import)
            .count();
        if flagged == 0 && stats.missing_manifests == 0 {
            return;
        }

        let line = format!(
            "⚠️  {} package(s) with suspect imports, {} without manifest",
            flagged, stats.missing_manifests
        );
        if colored {
            let _ = writeln!(out, "   {}", line.yellow());
        } else {
            let _ = writeln!(out, "   {}", line);
        }
    }

    fn human_size(bytes: u64) -> String {
        const UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1000.0 && unit < UNITS.len() - 1 {
            size /= 1000.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", bytes, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}
