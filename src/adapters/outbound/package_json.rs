//! Serde model of `package.json` documents.
//!
//! Registry packuments embed one such document per published version, so the
//! registry client and the local reader share these types.

use crate::dependency_graph::domain::Manifest;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A `package.json` (or one version entry of a registry packument)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_dependencies")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub license: Option<LicenseField>,
    #[serde(default)]
    pub author: Option<Person>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub dist: Option<Dist>,
    #[serde(default, rename = "_npmUser")]
    pub npm_user: Option<Person>,
}

/// Name to range map; old documents sometimes carry `[]` or non-string ranges,
/// which are dropped instead of failing the whole document.
fn lenient_dependencies<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, range)| match range {
            Value::String(range) => Some((name, range)),
            _ => None,
        })
        .collect())
}

/// `deprecated` is a message on the registry, sometimes a bare boolean in the wild
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Deprecation {
    Flag(bool),
    Message(String),
}

impl Deprecation {
    pub fn is_deprecated(&self) -> bool {
        match self {
            Deprecation::Flag(flag) => *flag,
            Deprecation::Message(message) => !message.trim().is_empty(),
        }
    }
}

/// SPDX string, legacy `{ "type": ... }` object, or legacy array of those
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    Expression(String),
    Object {
        #[serde(rename = "type")]
        kind: String,
    },
    List(Vec<LicenseField>),
}

impl LicenseField {
    pub fn to_expression(&self) -> String {
        match self {
            LicenseField::Expression(expression) => expression.clone(),
            LicenseField::Object { kind } => kind.clone(),
            LicenseField::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(LicenseField::to_expression)
                    .filter(|part| !part.is_empty())
                    .collect();
                match parts.len() {
                    0 => String::new(),
                    1 => parts[0].clone(),
                    _ => format!("({})", parts.join(" OR ")),
                }
            }
        }
    }
}

/// `"Name <mail> (url)"` or `{ "name": ..., "email": ... }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Text(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
}

impl Person {
    pub fn name(&self) -> Option<String> {
        let name = match self {
            Person::Text(text) => text.split(&['<', '('][..]).next().unwrap_or_default(),
            Person::Object { name } => name.as_deref().unwrap_or_default(),
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dist {
    #[serde(default)]
    pub tarball: Option<String>,
    #[serde(default)]
    pub unpacked_size: Option<u64>,
}

impl PackageJson {
    /// Converts the document into a domain manifest.
    ///
    /// `fallback_name`/`fallback_version` fill in documents that omit them,
    /// which private local projects often do.
    pub fn into_manifest(self, fallback_name: &str, fallback_version: &str) -> Manifest {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        let version = self
            .version
            .filter(|version| !version.trim().is_empty())
            .unwrap_or_else(|| fallback_version.to_string());

        let mut manifest = Manifest::new(name, version);
        for (dependency, range) in &self.dependencies {
            manifest = manifest.with_dependency(dependency, range);
        }
        manifest.deprecated = self
            .deprecated
            .as_ref()
            .is_some_and(Deprecation::is_deprecated);
        manifest.description = self.description.unwrap_or_default();
        manifest.license = self
            .license
            .as_ref()
            .map(LicenseField::to_expression)
            .filter(|license| !license.is_empty());
        manifest.author = self.author.as_ref().and_then(Person::name);
        manifest.unpacked_size = self.dist.as_ref().and_then(|dist| dist.unpacked_size);
        manifest
    }
}
