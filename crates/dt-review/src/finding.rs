//! Review findings and the ordered report

use dt_core::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    MissingPk,
    SelfReferencing,
    Circular,
    LongChain,
    PromoteToFk,
    ManyToMany,
    Undersharded,
    Oversharded,
    HighSkew,
    LargeUnsharded,
    SamplerUnavailable,
}

impl FindingCategory {
    /// Kebab-case label, as serialized
    pub fn label(&self) -> &'static str {
        match self {
            FindingCategory::MissingPk => "missing-pk",
            FindingCategory::SelfReferencing => "self-referencing",
            FindingCategory::Circular => "circular",
            FindingCategory::LongChain => "long-chain",
            FindingCategory::PromoteToFk => "promote-to-fk",
            FindingCategory::ManyToMany => "many-to-many",
            FindingCategory::Undersharded => "undersharded",
            FindingCategory::Oversharded => "oversharded",
            FindingCategory::HighSkew => "high-skew",
            FindingCategory::LargeUnsharded => "large-unsharded",
            FindingCategory::SamplerUnavailable => "sampler-unavailable",
        }
    }

    /// Severity a finding of this category carries unless overridden
    pub fn default_severity(&self) -> Severity {
        match self {
            FindingCategory::SelfReferencing
            | FindingCategory::LongChain
            | FindingCategory::PromoteToFk
            | FindingCategory::LargeUnsharded => Severity::Info,
            FindingCategory::MissingPk
            | FindingCategory::Circular
            | FindingCategory::ManyToMany
            | FindingCategory::Undersharded
            | FindingCategory::Oversharded
            | FindingCategory::HighSkew
            | FindingCategory::SamplerUnavailable => Severity::Warning,
        }
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One review result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the check that produced this finding
    pub check: String,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Tables involved, most relevant first
    pub tables: Vec<String>,
    /// Human-readable message
    pub message: String,
    /// Numbers and names backing the finding
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub evidence: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(
        check: &str,
        category: FindingCategory,
        tables: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.to_string(),
            category,
            severity: category.default_severity(),
            tables,
            message: message.into(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: &str, value: impl ToString) -> Self {
        self.evidence.insert(key.to_string(), value.to_string());
        self
    }

    /// Degraded finding for a data check that could not reach its sampler
    pub fn unverified(check: &str, tables: Vec<String>, reason: impl ToString) -> Self {
        Finding::new(
            check,
            FindingCategory::SamplerUnavailable,
            tables,
            "could not verify: sampler unavailable",
        )
        .with_evidence("reason", reason)
    }

    /// First table, used for ordering
    pub fn primary_table(&self) -> &str {
        self.tables.first().map(String::as_str).unwrap_or("")
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [{}]: {}",
            self.severity,
            self.category,
            self.tables.join(", "),
            self.message
        )
    }
}

/// Findings ordered by check registration order, then table name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub findings: Vec<Finding>,
    /// Checks that ran, in order
    pub checks: Vec<String>,
}

impl ReviewReport {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Number of findings at `severity`
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Findings in one category
    pub fn by_category(&self, category: FindingCategory) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }
}

#[cfg(test)]
#[path = "finding_test.rs"]
mod tests;
