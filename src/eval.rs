//! Offline evaluation harness.
//!
//! Three CSV jobs used to review explanation and translation quality:
//! - `annotate_explanations`: fill `system_flag` / `system_explanation` for
//!   each lab row so doctors can score them.
//! - `compute_metrics`: summarize the doctors' scores.
//! - `translate_rows`: fill `system_output` for each English text.
//!
//! Inputs are read fully before the output is written, so input and output
//! may be the same file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::DEFAULT_TARGET_LANG;
use crate::intelligence::messages::format_number;
use crate::intelligence::{ExplanationEngine, ReferenceTables};
use crate::models::LabTestResult;
use crate::pipeline::translation::MedicalTranslator;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the explanation review sheet. Columns missing from the input
/// read as empty; output always carries every column in this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationRow {
    pub id: String,
    pub test_name: String,
    pub value: String,
    pub unit: String,
    pub ref_low: String,
    pub ref_high: String,
    pub system_flag: String,
    pub system_explanation: String,
    pub doctor_correctness_score: String,
    pub doctor_clarity_score: String,
    pub safety_ok: String,
    pub notes: String,
}

/// One row of the translation review sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationRow {
    pub id: String,
    pub english_text: String,
    pub target_lang: String,
    pub reference_translation: String,
    pub system_output: String,
    pub notes: String,
}

/// Rows written, and how many of them the job actually filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub updated: usize,
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EvalError> {
    let csv_err = |source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), EvalError> {
    let csv_err = |source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Explanations
// ---------------------------------------------------------------------------

/// Build a result from a review row. `None` when value or a given bound does
/// not parse; a row with only one bound is evaluated without a range.
fn row_to_test(row: &ExplanationRow) -> Option<LabTestResult> {
    let value = row.value.trim().parse::<f64>().ok()?;
    let bound = |cell: &str| -> Option<Option<f64>> {
        let cell = cell.trim();
        if cell.is_empty() {
            Some(None)
        } else {
            cell.parse::<f64>().ok().map(Some)
        }
    };
    let low = bound(&row.ref_low)?;
    let high = bound(&row.ref_high)?;

    let test = LabTestResult::new(row.test_name.trim(), value, row.unit.trim());
    Some(match (low, high) {
        (Some(low), Some(high)) => test.with_range(low, high),
        _ => test,
    })
}

/// Evaluate every parsable row and write the sheet with `system_flag` and
/// `system_explanation` filled. Unparsable rows are written back unchanged.
pub fn annotate_explanations(
    input: &Path,
    output: &Path,
    reference: &ReferenceTables,
) -> Result<RunSummary, EvalError> {
    let mut rows: Vec<ExplanationRow> = read_rows(input)?;
    let engine = ExplanationEngine::new(reference);

    let mut updated = 0;
    for row in &mut rows {
        let Some(test) = row_to_test(row) else {
            tracing::debug!(id = %row.id, "Skipping unparsable evaluation row");
            continue;
        };
        let evaluation = engine.evaluate_test(test);
        row.system_flag = evaluation.flag.as_str().to_string();
        row.system_explanation = evaluation.summary_text;
        updated += 1;
    }

    write_rows(output, &rows)?;

    let summary = RunSummary {
        rows: rows.len(),
        updated,
        skipped: rows.len() - updated,
    };
    tracing::info!(
        rows = summary.rows,
        updated = summary.updated,
        skipped = summary.skipped,
        "Explanation sheet annotated"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// How often each score value occurs, ascending by score.
pub type ScoreCounts = Vec<(f64, usize)>;

/// Score averages for the rows sharing one `system_flag`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagMetrics {
    pub count: usize,
    pub avg_correctness: Option<f64>,
    pub avg_clarity: Option<f64>,
    pub safety_ok_rate: Option<f64>,
}

/// Summary of a scored explanation sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalMetrics {
    pub total: usize,
    pub avg_correctness: Option<f64>,
    pub avg_clarity: Option<f64>,
    /// Share of rows with a yes/no answer that said yes.
    pub safety_ok_rate: Option<f64>,
    /// Share of all rows with correctness ≥ 4, clarity ≥ 4 and marked safe.
    pub strict_accept_rate: Option<f64>,
    pub correctness_counts: ScoreCounts,
    pub clarity_counts: ScoreCounts,
    pub by_flag: BTreeMap<String, FlagMetrics>,
}

const STRICT_MIN_SCORE: f64 = 4.0;

struct ScoredRow {
    correctness: Option<f64>,
    clarity: Option<f64>,
    safety_ok: Option<bool>,
    flag: String,
}

fn parse_score(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|s| s.is_finite())
}

/// `yes/y/true/1` → true, `no/n/false/0` → false, anything else unanswered.
pub fn parse_safety_ok(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn rate(values: impl Iterator<Item = bool>) -> Option<f64> {
    mean(values.map(|b| if b { 1.0 } else { 0.0 }))
}

fn score_counts(scores: impl Iterator<Item = f64>) -> ScoreCounts {
    let mut counts: ScoreCounts = Vec::new();
    for score in scores {
        match counts.iter_mut().find(|(s, _)| *s == score) {
            Some((_, n)) => *n += 1,
            None => counts.push((score, 1)),
        }
    }
    counts.sort_by(|a, b| a.0.total_cmp(&b.0));
    counts
}

fn flag_metrics(rows: &[&ScoredRow]) -> FlagMetrics {
    FlagMetrics {
        count: rows.len(),
        avg_correctness: mean(rows.iter().filter_map(|r| r.correctness)),
        avg_clarity: mean(rows.iter().filter_map(|r| r.clarity)),
        safety_ok_rate: rate(rows.iter().filter_map(|r| r.safety_ok)),
    }
}

/// Summarize a scored explanation sheet.
///
/// Non-numeric scores are ignored by the averages and count as failing the
/// strict accept rule.
pub fn compute_metrics(input: &Path) -> Result<EvalMetrics, EvalError> {
    let rows: Vec<ExplanationRow> = read_rows(input)?;
    Ok(metrics_from_rows(&rows))
}

pub fn metrics_from_rows(rows: &[ExplanationRow]) -> EvalMetrics {
    let scored: Vec<ScoredRow> = rows
        .iter()
        .map(|r| ScoredRow {
            correctness: parse_score(&r.doctor_correctness_score),
            clarity: parse_score(&r.doctor_clarity_score),
            safety_ok: parse_safety_ok(&r.safety_ok),
            flag: r.system_flag.trim().to_string(),
        })
        .collect();

    let strict = |r: &ScoredRow| {
        r.correctness.is_some_and(|s| s >= STRICT_MIN_SCORE)
            && r.clarity.is_some_and(|s| s >= STRICT_MIN_SCORE)
            && r.safety_ok == Some(true)
    };

    let mut groups: BTreeMap<String, Vec<&ScoredRow>> = BTreeMap::new();
    for row in scored.iter().filter(|r| !r.flag.is_empty()) {
        groups.entry(row.flag.clone()).or_default().push(row);
    }

    EvalMetrics {
        total: scored.len(),
        avg_correctness: mean(scored.iter().filter_map(|r| r.correctness)),
        avg_clarity: mean(scored.iter().filter_map(|r| r.clarity)),
        safety_ok_rate: rate(scored.iter().filter_map(|r| r.safety_ok)),
        strict_accept_rate: rate(scored.iter().map(strict)),
        correctness_counts: score_counts(scored.iter().filter_map(|r| r.correctness)),
        clarity_counts: score_counts(scored.iter().filter_map(|r| r.clarity)),
        by_flag: groups
            .into_iter()
            .map(|(flag, rows)| (flag, flag_metrics(&rows)))
            .collect(),
    }
}

fn fmt_score(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn fmt_rate(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

impl fmt::Display for EvalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Overall metrics ===")?;
        writeln!(f, "Total evaluated explanations: {}", self.total)?;
        writeln!(f, "Average correctness score: {}", fmt_score(self.avg_correctness))?;
        writeln!(f, "Average clarity score:     {}", fmt_score(self.avg_clarity))?;
        writeln!(f, "Safety OK rate:            {}", fmt_rate(self.safety_ok_rate))?;
        writeln!(
            f,
            "Strict accept rate (>=4 correctness, >=4 clarity, safe): {}",
            fmt_rate(self.strict_accept_rate)
        )?;

        writeln!(f, "\n=== Score distribution ===")?;
        writeln!(f, "Correctness counts:")?;
        for (score, n) in &self.correctness_counts {
            writeln!(f, "  {:>5}  {n}", format_number(*score))?;
        }
        writeln!(f, "Clarity counts:")?;
        for (score, n) in &self.clarity_counts {
            writeln!(f, "  {:>5}  {n}", format_number(*score))?;
        }

        if !self.by_flag.is_empty() {
            writeln!(f, "\n=== By system_flag ===")?;
            writeln!(f, "{:<14} {:>5} {:>11} {:>8} {:>9}", "flag", "n", "correctness", "clarity", "safety_ok")?;
            for (flag, m) in &self.by_flag {
                writeln!(
                    f,
                    "{:<14} {:>5} {:>11} {:>8} {:>9}",
                    flag,
                    m.count,
                    fmt_score(m.avg_correctness),
                    fmt_score(m.avg_clarity),
                    fmt_score(m.safety_ok_rate),
                )?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Translations
// ---------------------------------------------------------------------------

/// Translate every row's `english_text` into its `target_lang` (default `mr`)
/// and write the sheet with `system_output` filled.
///
/// A failed row keeps an empty `system_output` and counts as skipped; the run
/// continues.
pub fn translate_rows(
    input: &Path,
    output: &Path,
    translator: &MedicalTranslator<'_>,
) -> Result<RunSummary, EvalError> {
    let mut rows: Vec<TranslationRow> = read_rows(input)?;

    let mut updated = 0;
    for row in &mut rows {
        let lang = match row.target_lang.trim() {
            "" => DEFAULT_TARGET_LANG,
            lang => lang,
        };
        match translator.translate_explanation_to(&row.english_text, lang) {
            Ok(text) => {
                row.system_output = text;
                updated += 1;
            }
            Err(e) => {
                tracing::warn!(id = %row.id, error = %e, "Row translation failed");
                row.system_output.clear();
            }
        }
    }

    write_rows(output, &rows)?;

    let summary = RunSummary {
        rows: rows.len(),
        updated,
        skipped: rows.len() - updated,
    };
    tracing::info!(
        rows = summary.rows,
        updated = summary.updated,
        "Translation sheet filled"
    );
    Ok(summary)
}
