//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dialect::Dialect;
use crate::discrepancy::Discrepancy;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of discrepancies
    pub total: usize,

    /// Number of tables reconciled against a model
    pub tables_checked: usize,

    /// Number of tables skipped by the exclusion list
    pub tables_excluded: usize,

    /// Discrepancy count per stable code
    pub by_kind: BTreeMap<String, usize>,
}

/// Validation report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Dialect the run was performed with
    pub dialect: Dialect,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All discrepancies, in table order
    pub discrepancies: Vec<Discrepancy>,
}

impl Report {
    /// Create a new empty report
    pub fn new(dialect: Dialect) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            dialect,
            summary: ReportSummary::default(),
            discrepancies: Vec::new(),
        }
    }

    /// Create a report from the outcome of a run
    pub fn from_discrepancies(
        dialect: Dialect,
        discrepancies: Vec<Discrepancy>,
        tables_checked: usize,
        tables_excluded: usize,
    ) -> Self {
        let mut report = Self::new(dialect);
        report.summary.tables_checked = tables_checked;
        report.summary.tables_excluded = tables_excluded;
        for discrepancy in discrepancies {
            report.add_discrepancy(discrepancy);
        }
        report
    }

    /// Add a discrepancy to the report
    pub fn add_discrepancy(&mut self, discrepancy: Discrepancy) {
        *self
            .summary
            .by_kind
            .entry(discrepancy.kind.as_str().to_string())
            .or_insert(0) += 1;
        self.summary.total += 1;
        self.discrepancies.push(discrepancy);
    }

    /// Whether any drift was found
    pub fn has_discrepancies(&self) -> bool {
        self.summary.total > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
