use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One negotiable issue: a name plus its finite, unordered set of legal values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueSpec {
    pub name: String,
    pub values: Vec<String>,
}

impl IssueSpec {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// The issue/value catalogue for one negotiation session. Immutable once built.
///
/// Values are addressed by index into their issue's value list; a `Bid` stores
/// one value index per issue. Index interning keeps the per-bid frequency
/// snapshots plain integer rows instead of maps keyed by value name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Domain {
    issues: Vec<IssueSpec>,
}

impl Domain {
    pub fn new(issues: Vec<IssueSpec>) -> Result<Self, ModelError> {
        if issues.is_empty() || issues.iter().any(|i| i.values.is_empty()) {
            return Err(ModelError::EmptyDomain);
        }
        Ok(Self { issues })
    }

    #[inline]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> impl Iterator<Item = &IssueSpec> {
        self.issues.iter()
    }

    pub fn issue(&self, idx: usize) -> Result<&IssueSpec, ModelError> {
        self.issues.get(idx).ok_or(ModelError::IssueOutOfRange(idx))
    }

    #[inline]
    pub fn value_count(&self, issue: usize) -> usize {
        self.issues[issue].values.len()
    }

    /// Total number of distinct bids in this domain (cartesian product size).
    pub fn bid_space_size(&self) -> usize {
        self.issues
            .iter()
            .fold(1usize, |acc, i| acc.saturating_mul(i.values.len()))
    }
}

/// One fully-specified proposal: exactly one value index per issue, validated
/// against the domain at construction. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bid {
    values: Vec<u32>,
}

impl Bid {
    pub fn new(domain: &Domain, values: Vec<u32>) -> Result<Self, ModelError> {
        if values.len() != domain.issue_count() {
            return Err(ModelError::ArityMismatch {
                expected: domain.issue_count(),
                got: values.len(),
            });
        }
        for (issue, &v) in values.iter().enumerate() {
            if (v as usize) >= domain.value_count(issue) {
                return Err(ModelError::ValueOutOfRange {
                    issue,
                    value: v as usize,
                });
            }
        }
        Ok(Self { values })
    }

    /// Value index chosen for `issue`.
    #[inline]
    pub fn value(&self, issue: usize) -> usize {
        self.values[issue] as usize
    }

    #[inline]
    pub fn issue_count(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Number of issues on which both bids picked the same value.
    pub fn matching_values(&self, other: &Bid) -> usize {
        self.values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a == b)
            .count()
    }
}
