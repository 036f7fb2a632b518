use crate::models::{AbnormalFlag, LabTestResult, ReferenceRange, Severity};

/// Message template builder for patient-facing lab explanations.
/// Plain words, no diagnosis, every sentence names the test and the printed range.
pub struct MessageTemplates;

impl MessageTemplates {
    /// NORMAL: value inside the printed range.
    pub fn normal(name: &str, value: &str, range: &str) -> String {
        format!(
            "Your {} is {}. This is within the usual healthy range ({}).",
            name, value, range,
        )
    }

    /// BORDERLINE: just outside the range.
    pub fn borderline(name: &str, value: &str, range: &str, below: bool) -> String {
        let direction = if below { "slightly below" } else { "slightly above" };
        format!(
            "Your {} is {}, which is {} the usual healthy range ({}).",
            name, value, direction, range,
        )
    }

    /// ABNORMAL: clearly outside the range.
    pub fn abnormal(name: &str, value: &str, range: &str, below: bool) -> String {
        let direction = if below { "lower" } else { "higher" };
        format!(
            "Your {} is {}, which is {} than the usual healthy range ({}).",
            name, value, direction, range,
        )
    }

    /// CRITICAL: far outside the range.
    pub fn critical(name: &str, value: &str, range: &str, below: bool) -> String {
        let direction = if below { "much lower" } else { "much higher" };
        format!(
            "Your {} is {}, which is {} than the usual healthy range ({}). \
             This can be serious.",
            name, value, direction, range,
        )
    }

    /// Fallback when the report prints no reference range.
    pub fn no_range(name: &str, value: &str) -> String {
        format!(
            "Your {} result is {}. The report does not show a usual healthy range \
             for this test, so please ask your doctor what it means for you.",
            name, value,
        )
    }

    /// Overall line when nothing is out of range.
    pub fn all_within_range() -> String {
        "Most of your test results are within the usual healthy range. \
         This is generally a good sign, but always follow up with your doctor \
         for complete interpretation."
            .to_string()
    }

    /// Overall line with a count of out-of-range values.
    pub fn out_of_range_count(out_of_range: usize, total: usize) -> String {
        format!(
            "{} out of {} test values are outside the usual healthy range.",
            out_of_range, total,
        )
    }

    pub fn critical_count(critical: usize) -> String {
        format!(
            "{} value(s) are much higher or lower than normal and may need urgent attention.",
            critical,
        )
    }

    pub fn not_an_emergency() -> String {
        "These results are usually not an emergency but should be discussed with your doctor."
            .to_string()
    }

    /// One line per body-system category with changes.
    pub fn category_changes(category: &str) -> String {
        format!("There are some changes related to {}.", category)
    }

    /// Safety notice when any result needs urgent care.
    pub fn urgent_safety_notice() -> String {
        "This explanation is for information only and is not a diagnosis. \
         Some values look very abnormal. If you feel unwell, have chest pain, \
         severe breathlessness, confusion, or any worrying symptoms, \
         please seek urgent medical care or contact your doctor immediately."
            .to_string()
    }

    /// Safety notice for every other report.
    pub fn standard_safety_notice() -> String {
        "This explanation is for information only and is not a diagnosis. \
         Do not start, stop, or change any medicines based on this report alone. \
         Please discuss your results with your doctor."
            .to_string()
    }
}

/// Render a number the way a lab slip prints it: `16.0` → `16`, `7.45` → `7.5`.
pub fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        format!("{:.1}", x)
    }
}

/// `"134 mg/dL"`, or just `"134"` when the unit is empty.
pub fn format_value(test: &LabTestResult) -> String {
    with_unit(format_number(test.value), test.unit.trim())
}

/// `"70-110 mg/dL"`, or `"70-110"` when the unit is empty.
pub fn format_range(range: &ReferenceRange, unit: &str) -> String {
    with_unit(
        format!("{}-{}", format_number(range.low), format_number(range.high)),
        unit.trim(),
    )
}

fn with_unit(number: String, unit: &str) -> String {
    if unit.is_empty() {
        number
    } else {
        format!("{} {}", number, unit)
    }
}

/// Pick the sentence for a classified result. Severity picks the template,
/// the flag picks the direction.
pub fn summarize(test: &LabTestResult, flag: AbnormalFlag, severity: Severity) -> String {
    let value = format_value(test);
    let range = match test.reference {
        Some(range) if severity != Severity::Unknown => format_range(&range, &test.unit),
        _ => return MessageTemplates::no_range(&test.name, &value),
    };
    let below = flag.is_below();

    match severity {
        Severity::Normal => MessageTemplates::normal(&test.name, &value, &range),
        Severity::Borderline => MessageTemplates::borderline(&test.name, &value, &range, below),
        Severity::Abnormal => MessageTemplates::abnormal(&test.name, &value, &range, below),
        Severity::Critical => MessageTemplates::critical(&test.name, &value, &range, below),
        Severity::Unknown => MessageTemplates::no_range(&test.name, &value),
    }
}
