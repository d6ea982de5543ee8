//! Classification metrics
//!
//! Per-class precision/recall/F1 plus the macro average over every label
//! seen in either the truth or the predictions, and a plain-text report in
//! the usual tabular form.

use std::collections::BTreeMap;

/// Metrics for a single class
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    /// Occurrences in the truth labels
    pub support: usize,
}

/// Evaluation over a held-out partition
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f32,
    pub f1_macro: f32,
    pub total: usize,
}

/// Score predictions against truth labels
pub fn evaluate(truth: &[String], predicted: &[String]) -> Evaluation {
    assert_eq!(truth.len(), predicted.len());

    // BTreeMap keeps the class order stable and sorted
    let mut true_positives: BTreeMap<&str, usize> = BTreeMap::new();
    let mut predicted_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut truth_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for (t, p) in truth.iter().zip(predicted) {
        *truth_counts.entry(t.as_str()).or_default() += 1;
        *predicted_counts.entry(p.as_str()).or_default() += 1;
        true_positives.entry(t.as_str()).or_default();
        true_positives.entry(p.as_str()).or_default();
        if t == p {
            *true_positives.entry(t.as_str()).or_default() += 1;
        }
    }

    let mut per_class = Vec::new();
    let mut correct = 0usize;
    for (label, &tp) in &true_positives {
        let predicted_total = predicted_counts.get(label).copied().unwrap_or(0);
        let support = truth_counts.get(label).copied().unwrap_or(0);

        let precision = if predicted_total > 0 {
            tp as f32 / predicted_total as f32
        } else {
            0.0
        };
        let recall = if support > 0 {
            tp as f32 / support as f32
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        correct += tp;
        per_class.push(ClassMetrics {
            label: label.to_string(),
            precision,
            recall,
            f1,
            support,
        });
    }

    let total = truth.len();
    let accuracy = if total > 0 {
        correct as f32 / total as f32
    } else {
        0.0
    };
    let f1_macro = if per_class.is_empty() {
        0.0
    } else {
        per_class.iter().map(|c| c.f1).sum::<f32>() / per_class.len() as f32
    };

    Evaluation {
        per_class,
        accuracy,
        f1_macro,
        total,
    }
}

/// Render the evaluation as a plain-text classification report
pub fn classification_report(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>14}  {:>9}  {:>9}  {:>9}  {:>8}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    for class in &evaluation.per_class {
        out.push_str(&format!(
            "{:>14}  {:>9.2}  {:>9.2}  {:>9.2}  {:>8}\n",
            class.label, class.precision, class.recall, class.f1, class.support
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:>14}  {:>9}  {:>9}  {:>9.2}  {:>8}\n",
        "accuracy", "", "", evaluation.accuracy, evaluation.total
    ));
    out.push_str(&format!(
        "{:>14}  {:>9.2}  {:>9}  {:>9.2}  {:>8}\n",
        "macro avg",
        evaluation.per_class.iter().map(|c| c.precision).sum::<f32>()
            / evaluation.per_class.len().max(1) as f32,
        "",
        evaluation.f1_macro,
        evaluation.total
    ));
    out
}
