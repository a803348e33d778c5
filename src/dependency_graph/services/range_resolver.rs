use regex::Regex;
use semver::{Version, VersionReq};
use std::collections::HashMap;
use std::sync::OnceLock;

/// RangeResolver picks the concrete version an npm range resolves to.
///
/// npm ranges are translated into `semver` requirements: comparator sets
/// separated by whitespace become comma-separated, hyphen ranges become a
/// `>=`/`<=` pair, `||` alternatives are tried one by one. Dist-tags such as
/// `latest` are looked up before any range parsing.
pub struct RangeResolver;

impl RangeResolver {
    /// Returns the highest published version satisfying `range`
    pub fn resolve<'a, I>(range: &str, versions: I, dist_tags: &HashMap<String, String>) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let range = range.trim();
        let range = range.strip_prefix("npm:").map_or(range, |alias| {
            alias.get(1..).and_then(|rest| rest.rfind('@')).map_or("latest", |i| &alias[i + 2..])
        });

        let published: Vec<(Version, &str)> = versions
            .into_iter()
            .filter_map(|raw| Version::parse(raw).ok().map(|parsed| (parsed, raw)))
            .collect();

        if let Some(tagged) = dist_tags.get(range) {
            return published
                .iter()
                .find(|(_, raw)| *raw == tagged)
                .map(|(_, raw)| raw.to_string());
        }

        let requirements = Self::parse_range(range)?;

        published
            .iter()
            .filter(|(version, _)| requirements.iter().any(|req| req.matches(version)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, raw)| raw.to_string())
    }

    /// Translates an npm range into one requirement per `||` alternative.
    ///
    /// Returns `None` when no alternative can be understood.
    pub fn parse_range(range: &str) -> Option<Vec<VersionReq>> {
        let requirements: Vec<VersionReq> = range
            .split("||")
            .filter_map(|alternative| Self::translate(alternative.trim()))
            .filter_map(|translated| VersionReq::parse(&translated).ok())
            .collect();

        if requirements.is_empty() {
            None
        } else {
            Some(requirements)
        }
    }

    fn translate(alternative: &str) -> Option<String> {
        if alternative.is_empty() || alternative == "*" || alternative.eq_ignore_ascii_case("x") {
            return Some("*".to_string());
        }

        if let Some(captures) = hyphen_range().captures(alternative) {
            return Some(format!(
                ">={}, <={}",
                Self::strip_version_prefix(&captures[1]),
                Self::strip_version_prefix(&captures[2])
            ));
        }

        let mut comparators = Vec::new();
        let mut pending_operator: Option<&str> = None;

        for token in alternative.split_whitespace() {
            if Self::is_operator(token) {
                pending_operator = Some(token);
                continue;
            }

            let token = match pending_operator.take() {
                Some(operator) => format!("{}{}", operator, token),
                None => token.to_string(),
            };
            comparators.push(Self::normalize_comparator(&token));
        }

        if comparators.is_empty() {
            return None;
        }
        Some(comparators.join(", "))
    }

    fn is_operator(token: &str) -> bool {
        matches!(token, "<" | "<=" | ">" | ">=" | "=" | "^" | "~")
    }

    /// Bare npm versions are exact matches, while bare `semver` requirements are carets
    fn normalize_comparator(token: &str) -> String {
        let operator_len = token
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~'))
            .unwrap_or(token.len());
        let (operator, version) = token.split_at(operator_len);
        let version = Self::strip_version_prefix(version);

        let is_wildcard = version
            .split('.')
            .any(|part| matches!(part, "x" | "X" | "*"));

        match operator {
            "" if is_wildcard => version.to_string(),
            "" | "=" => format!("={}", version),
            "~>" => format!("~{}", version),
            _ => format!("{}{}", operator, version),
        }
    }

    fn strip_version_prefix(version: &str) -> &str {
        version
            .trim()
            .trim_start_matches('=')
            .trim_start_matches('v')
    }
}

fn hyphen_range() -> &'static Regex {
    static HYPHEN_RANGE: OnceLock<Regex> = OnceLock::new();
    HYPHEN_RANGE.get_or_init(|| {
        Regex::new(r"^\s*(\S+)\s+-\s+(\S+)\s*$").expect("hyphen range pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSIONS: [&str; 8] = [
        "1.0.0", "1.2.0", "1.2.5", "1.9.1", "2.0.0-beta.1", "2.0.0", "2.3.0", "3.0.0",
    ];

    fn resolve(range: &str) -> Option<String> {
        let mut tags = HashMap::new();
        tags.insert("latest".to_string(), "2.3.0".to_string());
        tags.insert("next".to_string(), "3.0.0".to_string());
        RangeResolver::resolve(range, VERSIONS.iter().copied(), &tags)
    }

    #[test]
    fn test_exact_version() {
        assert_eq!(resolve("1.2.0").as_deref(), Some("1.2.0"));
        assert_eq!(resolve("=1.2.0").as_deref(), Some("1.2.0"));
        assert_eq!(resolve("v1.2.0").as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_caret_and_tilde() {
        assert_eq!(resolve("^1.0.0").as_deref(), Some("1.9.1"));
        assert_eq!(resolve("~1.2.0").as_deref(), Some("1.2.5"));
        assert_eq!(resolve("^2.0.0").as_deref(), Some("2.3.0"));
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(resolve("*").as_deref(), Some("3.0.0"));
        assert_eq!(resolve("").as_deref(), Some("3.0.0"));
        assert_eq!(resolve("1.x").as_deref(), Some("1.9.1"));
        assert_eq!(resolve("1.2.x").as_deref(), Some("1.2.5"));
        assert_eq!(resolve("1").as_deref(), Some("1.9.1"));
    }

    #[test]
    fn test_comparator_sets() {
        assert_eq!(resolve(">=1.2.0 <2.0.0").as_deref(), Some("1.9.1"));
        assert_eq!(resolve(">= 1.2.0 < 1.9.0").as_deref(), Some("1.2.5"));
    }

    #[test]
    fn test_hyphen_range() {
        assert_eq!(resolve("1.0.0 - 1.2.5").as_deref(), Some("1.2.5"));
    }

    #[test]
    fn test_alternatives() {
        assert_eq!(resolve("^1.0.0 || ^2.0.0").as_deref(), Some("2.3.0"));
        assert_eq!(resolve("~1.2.0 || >=3.0.0").as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_dist_tags() {
        assert_eq!(resolve("latest").as_deref(), Some("2.3.0"));
        assert_eq!(resolve("next").as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_prerelease_only_when_named() {
        assert_eq!(resolve(">=2.0.0-beta.1 <2.0.0").as_deref(), Some("2.0.0-beta.1"));
        assert_eq!(resolve("^1.9.1 <2.0.0").as_deref(), Some("1.9.1"));
    }

    #[test]
    fn test_npm_alias() {
        assert_eq!(resolve("npm:other@^1.0.0").as_deref(), Some("1.9.1"));
    }

    #[test]
    fn test_unsatisfiable_and_invalid() {
        assert_eq!(resolve("^4.0.0"), None);
        assert_eq!(resolve("not a range"), None);
        assert_eq!(resolve("beta"), None);
    }
}
