use async_trait::async_trait;
use depwalk::dependency_graph::domain::{Composition, PackageLocation};
use depwalk::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// PackageScanner returning canned reports and counting scans per location
#[derive(Default)]
pub struct MockPackageScanner {
    reports: HashMap<String, ScanReport>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    scans: Mutex<HashMap<String, usize>>,
}

impl MockPackageScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, url: String, report: ScanReport) -> Self {
        self.reports.insert(url, report);
        self
    }

    pub fn with_failure(mut self, url: String) -> Self {
        self.failing.insert(url);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn scans(&self, url: &str) -> usize {
        self.scans.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_scans(&self) -> usize {
        self.scans.lock().unwrap().values().sum()
    }

    /// A small report with one JavaScript file and a manifest
    pub fn default_report() -> ScanReport {
        ScanReport {
            composition: Composition {
                extensions: [".js".to_string(), ".json".to_string()].into_iter().collect(),
                files: vec!["index.js".to_string(), "package.json".to_string()],
                ..Composition::default()
            },
            size: 100,
            warnings: Vec::new(),
        }
    }
}

#[async_trait]
impl PackageScanner for MockPackageScanner {
    async fn scan_package(&self, location: &PackageLocation) -> Result<ScanReport> {
        let key = match location {
            PackageLocation::Tarball(url) => url.clone(),
            PackageLocation::Directory(path) => path.display().to_string(),
        };
        *self.scans.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&key) {
            anyhow::bail!("corrupt archive: {}", key);
        }

        Ok(self
            .reports
            .get(&key)
            .cloned()
            .unwrap_or_else(Self::default_report))
    }
}
