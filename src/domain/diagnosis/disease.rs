//! Disease labels recognised by the lesion classifier

use serde::{Deserialize, Serialize};

/// Skin lesion classes from the HAM10000 label set.
///
/// Declaration order is the classifier's output order: index `i` of every
/// probability vector refers to `DiseaseClass::ALL[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseClass {
    #[serde(rename = "Melanoma")]
    Melanoma,
    #[serde(rename = "Basal Cell Carcinoma")]
    BasalCellCarcinoma,
    #[serde(rename = "Benign Keratosis")]
    BenignKeratosis,
    #[serde(rename = "Dermatofibroma")]
    Dermatofibroma,
    #[serde(rename = "Melanocytic Nevus")]
    MelanocyticNevus,
    #[serde(rename = "Vascular Lesion")]
    VascularLesion,
    #[serde(rename = "Actinic Keratosis")]
    ActinicKeratosis,
}

impl DiseaseClass {
    /// Number of classes the classifier distinguishes
    pub const COUNT: usize = 7;

    /// All classes in classifier output order
    pub const ALL: [DiseaseClass; Self::COUNT] = [
        Self::Melanoma,
        Self::BasalCellCarcinoma,
        Self::BenignKeratosis,
        Self::Dermatofibroma,
        Self::MelanocyticNevus,
        Self::VascularLesion,
        Self::ActinicKeratosis,
    ];

    /// Class at the given output index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Output index of this class
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Human-readable label, as stored and returned by the API
    pub fn label(&self) -> &'static str {
        match self {
            Self::Melanoma => "Melanoma",
            Self::BasalCellCarcinoma => "Basal Cell Carcinoma",
            Self::BenignKeratosis => "Benign Keratosis",
            Self::Dermatofibroma => "Dermatofibroma",
            Self::MelanocyticNevus => "Melanocytic Nevus",
            Self::VascularLesion => "Vascular Lesion",
            Self::ActinicKeratosis => "Actinic Keratosis",
        }
    }

    /// Parse a stored label back into a class
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
