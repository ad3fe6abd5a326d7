//! Quality Metrics module
//!
//! Scores extracted triples against a labeled corpus: precision, recall and
//! F1 overall, plus per-pattern hit counts for tuning the path policy.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use oer_core::{ExtractionResult, KnowledgeTriple};

// ============================================================================
// Triple Metrics
// ============================================================================

/// Confusion counts for triple extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleMetrics {
    /// Extracted triples found in the gold standard
    pub true_positives: usize,
    /// Extracted triples not in the gold standard
    pub false_positives: usize,
    /// Gold triples that were not extracted
    pub false_negatives: usize,
}

impl TripleMetrics {
    /// Compare one sentence's triples with its gold triples.
    ///
    /// Triples are compared as distinct (subject, predicate, object) facts,
    /// so the same fact from two patterns counts once.
    pub fn compare(predicted: &[KnowledgeTriple], gold: &[KnowledgeTriple]) -> Self {
        let predicted: HashSet<_> = predicted.iter().map(KnowledgeTriple::key).collect();
        let gold: HashSet<_> = gold.iter().map(KnowledgeTriple::key).collect();

        let true_positives = predicted.intersection(&gold).count();
        Self {
            true_positives,
            false_positives: predicted.len() - true_positives,
            false_negatives: gold.len() - true_positives,
        }
    }

    pub fn add(&mut self, other: &TripleMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

// ============================================================================
// Corpus Evaluation
// ============================================================================

/// Hits and misses of a single pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub correct: usize,
    pub incorrect: usize,
}

/// Aggregate over a labeled corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub sentences: usize,
    pub overall: TripleMetrics,
    /// Keyed by pattern name; needs triples that kept their provenance
    pub by_pattern: BTreeMap<String, PatternCounts>,
}

impl EvaluationReport {
    /// Add one sentence's extraction and its gold triples
    pub fn add(&mut self, result: &ExtractionResult, gold: &[KnowledgeTriple]) {
        self.sentences += 1;
        self.overall
            .add(&TripleMetrics::compare(&result.knowledge, gold));

        let gold: HashSet<_> = gold.iter().map(KnowledgeTriple::key).collect();
        for triple in &result.knowledge {
            let Some(pattern) = triple.pattern else {
                continue;
            };
            let counts = self.by_pattern.entry(pattern.to_string()).or_default();
            if gold.contains(&triple.key()) {
                counts.correct += 1;
            } else {
                counts.incorrect += 1;
            }
        }
    }

    /// Human-readable summary
    pub fn report(&self) -> String {
        let mut out = format!(
            "=== Extraction Quality Report ===\n\n\
             Sentences evaluated: {}\n\n\
             Triples:\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               TP: {} | FP: {} | FN: {}\n",
            self.sentences,
            self.overall.precision() * 100.0,
            self.overall.recall() * 100.0,
            self.overall.f1_score() * 100.0,
            self.overall.true_positives,
            self.overall.false_positives,
            self.overall.false_negatives,
        );

        if !self.by_pattern.is_empty() {
            out.push_str("\nBy pattern:\n");
            for (pattern, counts) in &self.by_pattern {
                out.push_str(&format!(
                    "  {:<22} correct: {} | incorrect: {}\n",
                    pattern, counts.correct, counts.incorrect
                ));
            }
        }
        out
    }
}

/// Score a corpus of (extraction, gold triples) items
pub fn evaluate_corpus<'a, I>(items: I) -> EvaluationReport
where
    I: IntoIterator<Item = (&'a ExtractionResult, &'a [KnowledgeTriple])>,
{
    let mut report = EvaluationReport::default();
    for (result, gold) in items {
        report.add(result, gold);
    }
    report
}

// ============================================================================
// Tests
// ============================================================================
