use crate::dependency_graph::domain::{Severity, SourceLocation, WarningKind};
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Node.js core modules, `node:` prefix stripped
const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// One finding inside a single source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: WarningKind,
    pub severity: Severity,
    pub location: SourceLocation,
}

/// What one JavaScript source file imports and which findings it raises
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceAnalysis {
    pub required: BTreeSet<String>,
    pub required_builtin: BTreeSet<String>,
    pub findings: Vec<Finding>,
}

struct Patterns {
    require: Regex,
    static_import: Regex,
    dynamic_import: Regex,
    computed_require: Regex,
    unsafe_statement: Regex,
    encoded_literal: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("analyzer pattern is valid");
        Patterns {
            require: compile(r#"\brequire\s*\(\s*(?:'([^'\n]*)'|"([^"\n]*)"|`([^`$\n]*)`)\s*\)"#),
            static_import: compile(
                r#"\b(?:import|export)\s+(?:[\w*{}\s,$]+?\s+from\s*)?(?:'([^'\n]*)'|"([^"\n]*)")"#,
            ),
            dynamic_import: compile(r#"\bimport\s*\(\s*(?:'([^'\n]*)'|"([^"\n]*)")\s*\)"#),
            computed_require: compile(r#"\brequire\s*\(\s*[^'"`\s)]"#),
            unsafe_statement: compile(r"\beval\s*\(|\bnew\s+Function\s*\("),
            encoded_literal: compile(
                r#"['"](?:[A-Za-z0-9+/]{64,}={0,2}|(?:\\x[0-9a-fA-F]{2}){8,})['"]"#,
            ),
        }
    })
}

/// Lightweight static analysis of JavaScript sources.
///
/// Pattern based rather than a full parser: it recognises `require`, static
/// and dynamic `import`, and a handful of constructs worth a warning.
pub struct JavaScriptAnalyzer;

impl JavaScriptAnalyzer {
    pub fn analyze(source: &str) -> SourceAnalysis {
        let patterns = patterns();
        let mut analysis = SourceAnalysis::default();

        for regex in [
            &patterns.require,
            &patterns.static_import,
            &patterns.dynamic_import,
        ] {
            for captures in regex.captures_iter(source) {
                Self::record_specifier(source, &captures, &mut analysis);
            }
        }

        for found in patterns.computed_require.find_iter(source) {
            analysis.push(WarningKind::UnsafeImport, Severity::Warning, source, found.start());
        }
        for found in patterns.unsafe_statement.find_iter(source) {
            analysis.push(WarningKind::UnsafeStatement, Severity::Warning, source, found.start());
        }
        for found in patterns.encoded_literal.find_iter(source) {
            analysis.push(WarningKind::EncodedLiteral, Severity::Information, source, found.start());
        }

        analysis.findings.sort_by_key(|finding| finding.location);
        analysis
    }

    fn record_specifier(source: &str, captures: &Captures<'_>, analysis: &mut SourceAnalysis) {
        let Some(specifier) = captures.iter().skip(1).flatten().next() else {
            return;
        };

        if specifier.as_str().contains("\\x") || specifier.as_str().contains("\\u") {
            analysis.push(
                WarningKind::SuspiciousImport,
                Severity::Critical,
                source,
                specifier.start(),
            );
            return;
        }

        match Self::classify(specifier.as_str()) {
            Some(Import::Builtin(name)) => {
                analysis.required_builtin.insert(name);
            }
            Some(Import::Package(name)) => {
                analysis.required.insert(name);
            }
            None => {}
        }
    }

    /// Sorts a specifier into builtin or package; relative paths are ignored
    fn classify(specifier: &str) -> Option<Import> {
        let specifier = specifier.trim();
        if specifier.is_empty()
            || specifier.starts_with('.')
            || specifier.starts_with('/')
            || specifier.contains(':') && !specifier.starts_with("node:")
        {
            return None;
        }

        let bare = specifier.strip_prefix("node:").unwrap_or(specifier);
        let module = bare.split('/').next().unwrap_or(bare);
        if NODE_BUILTINS.contains(&module) {
            return Some(Import::Builtin(module.to_string()));
        }
        if specifier.starts_with("node:") {
            return None;
        }

        let package = if bare.starts_with('@') {
            bare.splitn(3, '/').take(2).collect::<Vec<_>>().join("/")
        } else {
            module.to_string()
        };
        Some(Import::Package(package))
    }

    /// Files named `*.min.js`, or whose lines average more than 200 characters
    pub fn is_minified(file_name: &str, source: &str) -> bool {
        if file_name.ends_with(".min.js") {
            return true;
        }

        let lines = source.lines().filter(|line| !line.trim().is_empty()).count();
        lines > 0 && source.len() / lines > 200
    }
}

enum Import {
    Builtin(String),
    Package(String),
}

impl SourceAnalysis {
    fn push(&mut self, kind: WarningKind, severity: Severity, source: &str, offset: usize) {
        self.findings.push(Finding {
            kind,
            severity,
            location: location_of(source, offset),
        });
    }
}

/// 1-based line and column of a byte offset
fn location_of(source: &str, offset: usize) -> SourceLocation {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |newline| {
            before[newline + 1..].chars().count()
        })
        + 1;
    SourceLocation { line, column }
}
