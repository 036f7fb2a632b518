use serde::{Deserialize, Serialize};

use super::enums::{AbnormalFlag, Severity};

/// Reference interval printed next to a result. Only ever stored as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Same range with the bounds swapped when printed high-first.
    pub fn ordered(self) -> Self {
        if self.low > self.high {
            Self::new(self.high, self.low)
        } else {
            self
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// One extracted lab result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestResult {
    pub name: String,
    pub value: f64,
    /// May be empty when the report prints no unit.
    pub unit: String,
    pub reference: Option<ReferenceRange>,
    pub category: Option<String>,
}

impl LabTestResult {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            reference: None,
            category: None,
        }
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.reference = Some(ReferenceRange::new(low, high));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Classification of a single result plus its patient-facing sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEvaluation {
    pub test: LabTestResult,
    pub flag: AbnormalFlag,
    pub severity: Severity,
    pub summary_text: String,
    pub recommend_doctor: bool,
    pub recommend_urgent: bool,
}

/// Whole-report view: per-test evaluations and the three aggregate texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEvaluation {
    pub evaluations: Vec<TestEvaluation>,
    pub overall_summary: String,
    /// Empty when no categorised test is out of range.
    pub category_summary: String,
    pub safety_notice: String,
}

impl ReportEvaluation {
    pub fn needs_urgent_care(&self) -> bool {
        self.evaluations.iter().any(|e| e.recommend_urgent)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.evaluations
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_range_as_pair() {
        let test = LabTestResult::new("Hemoglobin", 9.4, "g/dL").with_range(12.0, 15.0);
        assert_eq!(test.reference, Some(ReferenceRange::new(12.0, 15.0)));
        assert!(test.category.is_none());
    }

    #[test]
    fn missing_range_has_no_bounds() {
        let test = LabTestResult::new("Ferritin", 120.0, "ug/L");
        assert_eq!(test.reference, None);
    }

    #[test]
    fn ordered_swaps_reversed_bounds() {
        let range = ReferenceRange::new(15.0, 12.0).ordered();
        assert_eq!(range, ReferenceRange::new(12.0, 15.0));
        assert!(range.contains(12.0));
        assert!(range.contains(15.0));
        assert!(!range.contains(15.1));
    }
}
