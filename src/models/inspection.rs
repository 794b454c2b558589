use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A two-class classifier head label.
pub trait Label: Copy + fmt::Debug + PartialEq + Sized {
    /// Labels in the order the classifier head emits them.
    const CLASSES: [Self; 2];

    fn as_str(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cleanliness {
    Clean,
    Dirty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Damage {
    Intact,
    Damaged,
}

impl Label for Cleanliness {
    const CLASSES: [Self; 2] = [Cleanliness::Clean, Cleanliness::Dirty];

    fn as_str(&self) -> &'static str {
        match self {
            Cleanliness::Clean => "clean",
            Cleanliness::Dirty => "dirty",
        }
    }
}

impl Label for Damage {
    const CLASSES: [Self; 2] = [Damage::Intact, Damage::Damaged];

    fn as_str(&self) -> &'static str {
        match self {
            Damage::Intact => "intact",
            Damage::Damaged => "damaged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label: {}", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

fn parse_label<L: Label>(raw: &str) -> Result<L, UnknownLabel> {
    L::CLASSES
        .into_iter()
        .find(|label| label.as_str() == raw)
        .ok_or_else(|| UnknownLabel(raw.to_string()))
}

impl FromStr for Cleanliness {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_label(raw)
    }
}

impl FromStr for Damage {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_label(raw)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Verdict<L> {
    pub label: L,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Inspection {
    pub cleanliness: Verdict<Cleanliness>,
    pub damage: Verdict<Damage>,
}

impl Inspection {
    /// True when the car needs attention: dirty, damaged, or both.
    pub fn flags_car(&self) -> bool {
        self.cleanliness.label == Cleanliness::Dirty || self.damage.label == Damage::Damaged
    }
}
