//! Class label tables for classification models.

use crate::core::errors::ClassifyError;

/// Class order of the bundled PlantVillage leaf disease model: 38 disease and
/// healthy states across 14 plant species. Position i is the canonical label
/// for model output index i.
const PLANT_VILLAGE_LABELS: [&str; 38] = [
    "Apple: apple scab",
    "Apple: black rot",
    "Apple: cedar apple rust",
    "Apple: healthy",
    "Blueberry: healthy",
    "Cherry (including sour): powdery mildew",
    "Cherry (including sour): healthy",
    "Corn (maize): Cercospora leaf spot / gray leaf spot",
    "Corn (maize): common rust",
    "Corn (maize): northern leaf blight",
    "Corn (maize): healthy",
    "Grape: black rot",
    "Grape: esca (black measles)",
    "Grape: leaf blight (Isariopsis leaf spot)",
    "Grape: healthy",
    "Orange: huanglongbing (citrus greening)",
    "Peach: bacterial spot",
    "Peach: healthy",
    "Pepper, bell: bacterial spot",
    "Pepper, bell: healthy",
    "Potato: early blight",
    "Potato: late blight",
    "Potato: healthy",
    "Raspberry: healthy",
    "Soybean: healthy",
    "Squash: powdery mildew",
    "Strawberry: leaf scorch",
    "Strawberry: healthy",
    "Tomato: bacterial spot",
    "Tomato: early blight",
    "Tomato: late blight",
    "Tomato: leaf mold",
    "Tomato: Septoria leaf spot",
    "Tomato: spider mites / two-spotted spider mite",
    "Tomato: target spot",
    "Tomato: tomato yellow leaf curl virus",
    "Tomato: tomato mosaic virus",
    "Tomato: healthy",
];

/// Ordered, immutable mapping from class index to label text.
///
/// A table is paired one-to-one with a specific model artifact: swapping or
/// retraining the model requires updating the table in the same change. The
/// pipeline treats a length disagreement between table and model output as a
/// fatal configuration error, never a recoverable condition.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Creates a table from an ordered list of labels.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] for an empty list.
    pub fn new(labels: Vec<String>) -> Result<Self, ClassifyError> {
        if labels.is_empty() {
            return Err(ClassifyError::config_error(
                "label table must not be empty",
            ));
        }
        Ok(Self { labels })
    }

    /// The table paired with the bundled PlantVillage disease model.
    pub fn plant_village() -> Self {
        Self {
            labels: PLANT_VILLAGE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of classes.
    #[allow(clippy::len_without_is_empty)] // construction rejects empty tables
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// The label for a class index, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// All labels in class order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            LabelTable::new(vec![]),
            Err(ClassifyError::Config { .. })
        ));
    }

    #[test]
    fn plant_village_has_38_classes() {
        let table = LabelTable::plant_village();
        assert_eq!(table.len(), 38);
        assert_eq!(table.get(0), Some("Apple: apple scab"));
        assert_eq!(table.get(8), Some("Corn (maize): common rust"));
        assert_eq!(table.get(36), Some("Tomato: tomato mosaic virus"));
        assert_eq!(table.get(37), Some("Tomato: healthy"));
        assert_eq!(table.get(38), None);
    }

    #[test]
    fn plant_village_spans_14_species() {
        let table = LabelTable::plant_village();
        let mut species: Vec<&str> = table
            .labels()
            .iter()
            .filter_map(|label| label.split(':').next())
            .collect();
        species.sort_unstable();
        species.dedup();
        assert_eq!(species.len(), 14);
    }

    #[test]
    fn plant_village_has_healthy_variants() {
        let healthy = LabelTable::plant_village()
            .labels()
            .iter()
            .filter(|label| label.ends_with("healthy"))
            .count();
        assert_eq!(healthy, 12);
    }
}
