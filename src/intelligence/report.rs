//! Report-level texts built from per-test evaluations.
//!
//! Every function here is a pure function of the evaluations and is recomputed
//! from scratch on each call.

use crate::models::{ReportEvaluation, Severity, TestEvaluation};

use super::messages::MessageTemplates;

/// Category label that never gets its own sentence.
const UNCATEGORISED: &str = "other";

/// Count-based overall message with an urgency clause.
pub fn overall_summary(evaluations: &[TestEvaluation]) -> String {
    let total = evaluations.len();
    let out_of_range = evaluations
        .iter()
        .filter(|e| e.severity.is_out_of_range())
        .count();
    let critical = evaluations
        .iter()
        .filter(|e| e.severity == Severity::Critical)
        .count();

    if out_of_range == 0 {
        return MessageTemplates::all_within_range();
    }

    let urgency = if critical > 0 {
        MessageTemplates::critical_count(critical)
    } else {
        MessageTemplates::not_an_emergency()
    };

    format!(
        "{} {}",
        MessageTemplates::out_of_range_count(out_of_range, total),
        urgency
    )
}

/// One sentence per category holding at least one non-normal result,
/// in the order categories first appear.
pub fn category_summary(evaluations: &[TestEvaluation]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut flagged: Vec<&str> = Vec::new();

    for e in evaluations {
        let Some(category) = e.test.category.as_deref() else {
            continue;
        };
        if category == UNCATEGORISED {
            continue;
        }
        if !order.contains(&category) {
            order.push(category);
        }
        if e.severity != Severity::Normal && !flagged.contains(&category) {
            flagged.push(category);
        }
    }

    order
        .into_iter()
        .filter(|c| flagged.contains(c))
        .map(MessageTemplates::category_changes)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Urgent variant if any result recommends urgent care, disclaimer otherwise.
pub fn safety_notice(evaluations: &[TestEvaluation]) -> String {
    if evaluations.iter().any(|e| e.recommend_urgent) {
        MessageTemplates::urgent_safety_notice()
    } else {
        MessageTemplates::standard_safety_notice()
    }
}

/// English text handed to translation: per-test sentences, overall summary,
/// category summary (when present), safety notice.
pub fn compose_explanation(report: &ReportEvaluation) -> String {
    report
        .evaluations
        .iter()
        .map(|e| e.summary_text.as_str())
        .chain([
            report.overall_summary.as_str(),
            report.category_summary.as_str(),
            report.safety_notice.as_str(),
        ])
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
