use crate::adapters::outbound::package_json::{PackageJson, Person};
use crate::dependency_graph::domain::{Manifest, PackageLocation, Publisher, RegistryMetadata};
use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Registry document listing every published version of one package name
#[derive(Debug, Clone, Deserialize)]
pub struct Packument {
    pub name: String,
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    #[serde(default, deserialize_with = "lenient_versions")]
    pub versions: BTreeMap<String, PackageJson>,
    /// Publish times; unpublished packages also carry an `unpublished` object here
    #[serde(default)]
    pub time: HashMap<String, Value>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub author: Option<Person>,
}

/// Keeps every version entry that parses; a single malformed entry only
/// removes that version from the candidates.
fn lenient_versions<'de, D>(deserializer: D) -> Result<BTreeMap<String, PackageJson>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(version, document)| match serde_json::from_value(document) {
            Ok(document) => Some((version, document)),
            Err(error) => {
                debug!(version = %version, error = %error, "skipping unreadable version entry");
                None
            }
        })
        .collect())
}

impl Packument {
    /// Builds the manifest of one published `version`
    pub fn manifest(&self, version: &str) -> Option<Manifest> {
        let document = self.versions.get(version)?.clone();
        let tarball = document.dist.as_ref().and_then(|dist| dist.tarball.clone());

        let mut manifest = document.into_manifest(&self.name, version);
        manifest.location = tarball.map(PackageLocation::Tarball);
        manifest.registry_metadata = Some(self.metadata());
        Some(manifest)
    }

    /// Registry-level facts shared by every version of this name
    pub fn metadata(&self) -> RegistryMetadata {
        let mut publishers: Vec<Publisher> = Vec::new();
        let mut seen_publishers = HashSet::new();
        let mut authors: Vec<String> = Vec::new();

        for (version, document) in self.versions_by_release() {
            if let Some(name) = document.npm_user.as_ref().and_then(Person::name) {
                if seen_publishers.insert(name.clone()) {
                    publishers.push(Publisher {
                        name,
                        version: version.to_string(),
                        at: self.published_at(version),
                    });
                }
            }

            if let Some(author) = document.author.as_ref().and_then(Person::name) {
                if !authors.contains(&author) {
                    authors.push(author);
                }
            }
        }

        let latest = self
            .dist_tags
            .get("latest")
            .and_then(|version| self.versions.get(version));

        RegistryMetadata {
            published_count: self.versions.len(),
            last_update_at: self.published_at("modified"),
            last_version: self.dist_tags.get("latest").cloned(),
            has_changed_author: authors.len() > 1,
            has_many_publishers: publishers.len() > 1,
            homepage: self
                .homepage
                .clone()
                .or_else(|| latest.and_then(|document| document.homepage.clone()))
                .unwrap_or_default(),
            author: self
                .author
                .as_ref()
                .and_then(Person::name)
                .or_else(|| latest.and_then(|document| document.author.as_ref()?.name()))
                .unwrap_or_else(|| "N/A".to_string()),
            publishers,
            authors,
        }
    }

    /// Versions in release order: semver order, unparsable versions last
    fn versions_by_release(&self) -> Vec<(&str, &PackageJson)> {
        let mut versions: Vec<(&str, &PackageJson)> = self
            .versions
            .iter()
            .map(|(version, document)| (version.as_str(), document))
            .collect();
        versions.sort_by(|(a, _), (b, _)| match (Version::parse(a), Version::parse(b)) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        versions
    }

    fn published_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.time
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}
