use serde::{Deserialize, Serialize};

use crate::models::{
    AbnormalFlag, LabTestResult, ReferenceRange, ReportEvaluation, Severity, TestEvaluation,
};

use super::messages::summarize;
use super::reference::ReferenceTables;
use super::report::{category_summary, overall_summary, safety_notice};

/// Ratio cut-offs between severity tiers.
///
/// Below range the ratio is `value / low`, above range it is `value / high`.
/// These are heuristics, not a clinical standard; labs may tune them per test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    /// Below this ratio a low value is critical.
    pub critical_low_ratio: f64,
    /// Below this ratio (and above critical) a low value is abnormal, else borderline.
    pub low_abnormal_ratio: f64,
    /// At or above this ratio a high value is abnormal, else borderline.
    pub high_abnormal_ratio: f64,
    /// At or above this ratio a high value is critical.
    pub critical_high_ratio: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            critical_low_ratio: 0.5,
            low_abnormal_ratio: 0.9,
            high_abnormal_ratio: 1.2,
            critical_high_ratio: 2.0,
        }
    }
}

/// Outcome of comparing one value to its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub flag: AbnormalFlag,
    pub severity: Severity,
    pub recommend_doctor: bool,
    pub recommend_urgent: bool,
}

impl Classification {
    const fn new(
        flag: AbnormalFlag,
        severity: Severity,
        recommend_doctor: bool,
        recommend_urgent: bool,
    ) -> Self {
        Self {
            flag,
            severity,
            recommend_doctor,
            recommend_urgent,
        }
    }
}

/// Classify a value against an optional reference range.
///
/// Without a range the result is `unknown` with a conservative doctor
/// recommendation. Bounds are used as printed; callers order them first.
pub fn classify(
    value: f64,
    range: Option<ReferenceRange>,
    thresholds: &ClassificationThresholds,
) -> Classification {
    let Some(range) = range else {
        return Classification::new(AbnormalFlag::Unknown, Severity::Unknown, true, false);
    };
    let ReferenceRange { low, high } = range;

    if range.contains(value) {
        return Classification::new(AbnormalFlag::Normal, Severity::Normal, false, false);
    }

    if value < low {
        let ratio = if low > 0.0 { value / low } else { 0.0 };
        return if ratio < thresholds.critical_low_ratio {
            Classification::new(AbnormalFlag::CriticalLow, Severity::Critical, true, true)
        } else if ratio < thresholds.low_abnormal_ratio {
            Classification::new(AbnormalFlag::Low, Severity::Abnormal, true, false)
        } else {
            Classification::new(AbnormalFlag::Low, Severity::Borderline, true, false)
        };
    }

    if value > high {
        let ratio = if high > 0.0 { value / high } else { 0.0 };
        return if ratio >= thresholds.critical_high_ratio {
            Classification::new(AbnormalFlag::CriticalHigh, Severity::Critical, true, true)
        } else if ratio >= thresholds.high_abnormal_ratio {
            Classification::new(AbnormalFlag::High, Severity::Abnormal, true, false)
        } else {
            Classification::new(AbnormalFlag::High, Severity::Borderline, true, false)
        };
    }

    // NaN value or bounds: nothing above compared true.
    Classification::new(AbnormalFlag::Unknown, Severity::Unknown, true, false)
}

/// Rule-based explanation engine: classification, per-test text, report texts.
pub struct ExplanationEngine<'a> {
    reference: &'a ReferenceTables,
    thresholds: ClassificationThresholds,
}

impl<'a> ExplanationEngine<'a> {
    pub fn new(reference: &'a ReferenceTables) -> Self {
        Self {
            reference,
            thresholds: ClassificationThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ClassificationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Evaluate one result, filling in its category if the caller left it empty.
    pub fn evaluate_test(&self, mut test: LabTestResult) -> TestEvaluation {
        if test.category.is_none() {
            test.category = self.reference.category_for(&test.name).map(str::to_string);
        }

        let c = classify(test.value, test.reference, &self.thresholds);
        let summary_text = summarize(&test, c.flag, c.severity);

        tracing::debug!(
            test = %test.name,
            flag = c.flag.as_str(),
            severity = c.severity.as_str(),
            "Evaluated lab result"
        );

        TestEvaluation {
            test,
            flag: c.flag,
            severity: c.severity,
            summary_text,
            recommend_doctor: c.recommend_doctor,
            recommend_urgent: c.recommend_urgent,
        }
    }

    /// Evaluate every result and build the three report-level texts.
    pub fn evaluate_report(&self, tests: Vec<LabTestResult>) -> ReportEvaluation {
        let evaluations: Vec<TestEvaluation> =
            tests.into_iter().map(|t| self.evaluate_test(t)).collect();

        let report = ReportEvaluation {
            overall_summary: overall_summary(&evaluations),
            category_summary: category_summary(&evaluations),
            safety_notice: safety_notice(&evaluations),
            evaluations,
        };

        tracing::info!(
            tests = report.evaluations.len(),
            normal = report.count_by_severity(Severity::Normal),
            borderline = report.count_by_severity(Severity::Borderline),
            abnormal = report.count_by_severity(Severity::Abnormal),
            critical = report.count_by_severity(Severity::Critical),
            unknown = report.count_by_severity(Severity::Unknown),
            "Report evaluation complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(low: f64, high: f64) -> Option<ReferenceRange> {
        Some(ReferenceRange::new(low, high))
    }

    fn classify_default(value: f64, r: Option<ReferenceRange>) -> Classification {
        classify(value, r, &ClassificationThresholds::default())
    }

    #[test]
    fn missing_range_is_unknown_with_doctor() {
        let c = classify_default(5.0, None);
        assert_eq!(c.flag, AbnormalFlag::Unknown);
        assert_eq!(c.severity, Severity::Unknown);
        assert!(c.recommend_doctor);
        assert!(!c.recommend_urgent);
    }

    #[test]
    fn inside_range_is_normal_including_bounds() {
        for v in [70.0, 90.0, 110.0] {
            let c = classify_default(v, range(70.0, 110.0));
            assert_eq!(c.flag, AbnormalFlag::Normal);
            assert_eq!(c.severity, Severity::Normal);
            assert!(!c.recommend_doctor);
            assert!(!c.recommend_urgent);
        }
    }

    #[test]
    fn far_below_is_critical_low() {
        // 40 / 100 = 0.4
        let c = classify_default(40.0, range(100.0, 200.0));
        assert_eq!(c.flag, AbnormalFlag::CriticalLow);
        assert_eq!(c.severity, Severity::Critical);
        assert!(c.recommend_urgent);
    }

    #[test]
    fn below_tiers() {
        let c = classify_default(50.0, range(100.0, 200.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::Low, Severity::Abnormal));
        let c = classify_default(89.0, range(100.0, 200.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::Low, Severity::Abnormal));
        let c = classify_default(90.0, range(100.0, 200.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::Low, Severity::Borderline));
        assert!(c.recommend_doctor);
        assert!(!c.recommend_urgent);
    }

    #[test]
    fn above_tiers() {
        // 134 / 110 ≈ 1.218
        let c = classify_default(134.0, range(70.0, 110.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::High, Severity::Abnormal));
        let c = classify_default(120.0, range(70.0, 110.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::High, Severity::Borderline));
        let c = classify_default(220.0, range(70.0, 110.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::CriticalHigh, Severity::Critical));
        assert!(c.recommend_urgent);
    }

    #[test]
    fn zero_lower_bound_cannot_divide() {
        let c = classify_default(-1.0, range(0.0, 5.0));
        assert_eq!(c.flag, AbnormalFlag::CriticalLow);
    }

    #[test]
    fn zero_upper_bound_reads_as_borderline_high() {
        let c = classify_default(3.0, range(-5.0, 0.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::High, Severity::Borderline));
    }

    #[test]
    fn cholesterol_just_above_is_borderline() {
        // 210 / 200 = 1.05
        let c = classify_default(210.0, range(0.0, 200.0));
        assert_eq!((c.flag, c.severity), (AbnormalFlag::High, Severity::Borderline));
    }

    #[test]
    fn nan_value_is_unknown() {
        let c = classify_default(f64::NAN, range(1.0, 2.0));
        assert_eq!(c.severity, Severity::Unknown);
    }

    #[test]
    fn custom_thresholds_shift_tiers() {
        let strict = ClassificationThresholds {
            high_abnormal_ratio: 1.05,
            ..ClassificationThresholds::default()
        };
        let c = classify(120.0, range(70.0, 110.0), &strict);
        assert_eq!(c.severity, Severity::Abnormal);
    }

    #[test]
    fn fasting_sugar_end_to_end() {
        let tables = ReferenceTables::builtin();
        let engine = ExplanationEngine::new(&tables);
        let test = LabTestResult::new("fasting blood sugar", 134.0, "mg/dL").with_range(70.0, 110.0);

        let eval = engine.evaluate_test(test);
        assert_eq!(eval.flag, AbnormalFlag::High);
        assert_eq!(eval.severity, Severity::Abnormal);
        assert!(eval.recommend_doctor);
        assert_eq!(eval.test.category.as_deref(), Some("blood sugar"));
        assert_eq!(
            eval.summary_text,
            "Your fasting blood sugar is 134 mg/dL, which is higher than the usual healthy range (70-110 mg/dL)."
        );
    }

    #[test]
    fn existing_category_is_kept() {
        let tables = ReferenceTables::builtin();
        let engine = ExplanationEngine::new(&tables);
        let test = LabTestResult::new("LDL", 90.0, "mg/dL")
            .with_range(0.0, 100.0)
            .with_category("lipids");
        let eval = engine.evaluate_test(test);
        assert_eq!(eval.test.category.as_deref(), Some("lipids"));
    }

    #[test]
    fn unmatched_name_gets_no_category() {
        let tables = ReferenceTables::builtin();
        let engine = ExplanationEngine::new(&tables);
        let eval = engine.evaluate_test(LabTestResult::new("Vitamin D", 25.0, "ng/mL").with_range(30.0, 100.0));
        assert!(eval.test.category.is_none());
    }

    #[test]
    fn report_with_urgent_value() {
        let tables = ReferenceTables::builtin();
        let engine = ExplanationEngine::new(&tables);
        let report = engine.evaluate_report(vec![
            LabTestResult::new("fasting blood sugar", 134.0, "mg/dL").with_range(70.0, 110.0),
            LabTestResult::new("total cholesterol", 210.0, "mg/dL").with_range(0.0, 200.0),
            LabTestResult::new("creatinine", 4.0, "mg/dL").with_range(0.6, 1.2),
        ]);

        assert_eq!(report.evaluations.len(), 3);
        assert!(report.needs_urgent_care());
        assert!(report.overall_summary.starts_with("3 out of 3 test values"));
        assert!(report.overall_summary.contains("1 value(s) are much higher or lower"));
        assert!(report.safety_notice.contains("seek urgent medical care"));
        assert_eq!(
            report.category_summary,
            "There are some changes related to blood sugar. \
             There are some changes related to cholesterol. \
             There are some changes related to kidney."
        );
    }
}
