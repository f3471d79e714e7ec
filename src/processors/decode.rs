//! Confidence vector decoding.

use crate::core::errors::ClassifyError;
use crate::domain::{ClassificationResult, LabelTable};

/// Decodes raw per-class scores into labeled results.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceDecoder;

impl ConfidenceDecoder {
    /// Creates a decoder.
    pub fn new() -> Self {
        Self
    }

    fn check_lengths(confidence: &[f32], labels: &LabelTable) -> Result<(), ClassifyError> {
        if confidence.len() != labels.len() {
            return Err(ClassifyError::label_mapping(labels.len(), confidence.len()));
        }
        Ok(())
    }

    /// Arg-max decode: the winning class is the first index whose score no
    /// later entry strictly exceeds.
    ///
    /// The running maximum starts at `f32::NEG_INFINITY`, so a vector of raw
    /// logits that are all zero or negative still elects its true maximum
    /// instead of defaulting to index 0. Ties keep the earlier index; the
    /// tie-break is part of the contract and must not change, or repeated runs
    /// stop being reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::LabelMapping`] when the vector and table
    /// lengths disagree.
    pub fn decode(
        &self,
        confidence: &[f32],
        labels: &LabelTable,
    ) -> Result<ClassificationResult, ClassifyError> {
        Self::check_lengths(confidence, labels)?;

        let mut best_index = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (index, &score) in confidence.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_index = index;
            }
        }

        let label = labels
            .get(best_index)
            .ok_or_else(|| ClassifyError::label_mapping(labels.len(), confidence.len()))?
            .to_string();

        Ok(ClassificationResult {
            class_index: best_index,
            label,
            confidence: best_score,
        })
    }

    /// The `k` best-scoring classes in descending score order, earlier index
    /// first on ties. `k` is clamped to the number of classes.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] for `k == 0` and
    /// [`ClassifyError::LabelMapping`] on a length disagreement.
    pub fn top_k(
        &self,
        confidence: &[f32],
        labels: &LabelTable,
        k: usize,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        if k == 0 {
            return Err(ClassifyError::config_error("k must be greater than 0"));
        }
        Self::check_lengths(confidence, labels)?;

        let mut indexed: Vec<(usize, f32)> = confidence.iter().copied().enumerate().collect();
        // Stable sort: equal scores keep ascending index order.
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        indexed
            .into_iter()
            .take(k.min(confidence.len()))
            .map(|(index, score)| {
                let label = labels
                    .get(index)
                    .ok_or_else(|| ClassifyError::label_mapping(labels.len(), confidence.len()))?
                    .to_string();
                Ok(ClassificationResult {
                    class_index: index,
                    label,
                    confidence: score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str]) -> LabelTable {
        LabelTable::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn finds_unique_maximum_at_any_position() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b", "c"]);

        for (scores, expected) in [
            (vec![0.9, 0.1, 0.2], 0usize),
            (vec![0.1, 0.9, 0.2], 1),
            (vec![0.1, 0.2, 0.9], 2),
        ] {
            let result = decoder.decode(&scores, &labels).unwrap();
            assert_eq!(result.class_index, expected);
            assert_eq!(result.confidence, 0.9);
            assert!(result.class_index < labels.len());
        }
    }

    #[test]
    fn ties_keep_the_lower_index() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b", "c", "d"]);
        let result = decoder.decode(&[0.2, 0.7, 0.7, 0.1], &labels).unwrap();
        assert_eq!(result.class_index, 1);
        assert_eq!(result.label, "b");
    }

    #[test]
    fn all_negative_logits_still_elect_a_class() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b", "c"]);
        let result = decoder.decode(&[-4.0, -0.5, -3.0], &labels).unwrap();
        assert_eq!(result.class_index, 1);
        assert_eq!(result.confidence, -0.5);
    }

    #[test]
    fn length_mismatch_never_returns_a_result() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b"]);
        assert!(matches!(
            decoder.decode(&[0.1, 0.2, 0.7], &labels),
            Err(ClassifyError::LabelMapping {
                labels: 2,
                scores: 3
            })
        ));
    }

    #[test]
    fn top_k_orders_by_score_then_index() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b", "c", "d"]);
        let results = decoder.top_k(&[0.3, 0.9, 0.3, 0.1], &labels, 3).unwrap();

        let indices: Vec<usize> = results.iter().map(|r| r.class_index).collect();
        assert_eq!(indices, vec![1, 0, 2]);
        assert_eq!(results[0].label, "b");
    }

    #[test]
    fn top_k_clamps_to_class_count() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b"]);
        let results = decoder.top_k(&[0.4, 0.6], &labels, 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn top_k_rejects_zero() {
        let decoder = ConfidenceDecoder::new();
        let labels = table(&["a", "b"]);
        assert!(matches!(
            decoder.top_k(&[0.4, 0.6], &labels, 0),
            Err(ClassifyError::Config { .. })
        ));
    }
}
