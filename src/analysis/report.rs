use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DENSITY_RANGE: RangeInclusive<u8> = 6..=10;
pub const DAMAGE_RANGE: RangeInclusive<u8> = 1..=5;
pub const HEALTH_SCORE_RANGE: RangeInclusive<u8> = 7..=10;
pub const MOISTURE_LEVEL_RANGE: RangeInclusive<u8> = 6..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HairType {
    Straight,
    Wavy,
    Curly,
    Coily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Texture {
    Fine,
    Medium,
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thickness {
    Thin,
    Medium,
    Thick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Porosity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalpCondition {
    Dry,
    Normal,
    Oily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProteinBalance {
    Low,
    Balanced,
    High,
}

/// Concern labels, declared in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Concern {
    #[serde(rename = "Split ends")]
    SplitEnds,
    Frizz,
    Breakage,
    Dryness,
    #[serde(rename = "Color damage")]
    ColorDamage,
}

impl HairType {
    pub const ALL: [HairType; 4] = [
        HairType::Straight,
        HairType::Wavy,
        HairType::Curly,
        HairType::Coily,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HairType::Straight => "Straight",
            HairType::Wavy => "Wavy",
            HairType::Curly => "Curly",
            HairType::Coily => "Coily",
        }
    }
}

impl Texture {
    pub const ALL: [Texture; 3] = [Texture::Fine, Texture::Medium, Texture::Coarse];

    pub fn label(&self) -> &'static str {
        match self {
            Texture::Fine => "Fine",
            Texture::Medium => "Medium",
            Texture::Coarse => "Coarse",
        }
    }
}

impl Thickness {
    pub const ALL: [Thickness; 3] = [Thickness::Thin, Thickness::Medium, Thickness::Thick];

    pub fn label(&self) -> &'static str {
        match self {
            Thickness::Thin => "Thin",
            Thickness::Medium => "Medium",
            Thickness::Thick => "Thick",
        }
    }
}

impl Porosity {
    pub const ALL: [Porosity; 3] = [Porosity::Low, Porosity::Medium, Porosity::High];

    pub fn label(&self) -> &'static str {
        match self {
            Porosity::Low => "Low",
            Porosity::Medium => "Medium",
            Porosity::High => "High",
        }
    }
}

impl ScalpCondition {
    pub const ALL: [ScalpCondition; 3] = [
        ScalpCondition::Dry,
        ScalpCondition::Normal,
        ScalpCondition::Oily,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScalpCondition::Dry => "Dry",
            ScalpCondition::Normal => "Normal",
            ScalpCondition::Oily => "Oily",
        }
    }
}

impl ProteinBalance {
    pub const ALL: [ProteinBalance; 3] = [
        ProteinBalance::Low,
        ProteinBalance::Balanced,
        ProteinBalance::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProteinBalance::Low => "Low",
            ProteinBalance::Balanced => "Balanced",
            ProteinBalance::High => "High",
        }
    }
}

impl Concern {
    pub const ALL: [Concern; 5] = [
        Concern::SplitEnds,
        Concern::Frizz,
        Concern::Breakage,
        Concern::Dryness,
        Concern::ColorDamage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Concern::SplitEnds => "Split ends",
            Concern::Frizz => "Frizz",
            Concern::Breakage => "Breakage",
            Concern::Dryness => "Dryness",
            Concern::ColorDamage => "Color damage",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(HairType, Texture, Thickness, Porosity, ScalpCondition, ProteinBalance, Concern);

/// Result of analyzing one image. Categorical fields are closed enums, the
/// numeric scores are checked by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(rename = "type")]
    pub hair_type: HairType,
    pub texture: Texture,
    pub density: u8,
    pub thickness: Thickness,
    pub porosity: Porosity,
    pub scalp_condition: ScalpCondition,
    pub damage: u8,
    pub health_score: u8,
    pub moisture_level: u8,
    pub protein_balance: ProteinBalance,
    pub concerns: Vec<Concern>,
}

impl AnalysisReport {
    pub fn validate(&self) -> Result<(), AppError> {
        check_range("density", self.density, &DENSITY_RANGE)?;
        check_range("damage", self.damage, &DAMAGE_RANGE)?;
        check_range("healthScore", self.health_score, &HEALTH_SCORE_RANGE)?;
        check_range("moistureLevel", self.moisture_level, &MOISTURE_LEVEL_RANGE)?;

        if self.concerns.len() > Concern::ALL.len() {
            return Err(AppError::AnalysisFailed(format!(
                "report lists {} concerns, at most {} are known",
                self.concerns.len(),
                Concern::ALL.len()
            )));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: u8, range: &RangeInclusive<u8>) -> Result<(), AppError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AppError::AnalysisFailed(format!(
            "{} {} is outside {}..={}",
            field,
            value,
            range.start(),
            range.end()
        )))
    }
}

#[cfg(test)]
pub(crate) fn sample_report() -> AnalysisReport {
    AnalysisReport {
        hair_type: HairType::Curly,
        texture: Texture::Medium,
        density: 8,
        thickness: Thickness::Thick,
        porosity: Porosity::High,
        scalp_condition: ScalpCondition::Normal,
        damage: 2,
        health_score: 9,
        moisture_level: 7,
        protein_balance: ProteinBalance::Balanced,
        concerns: vec![Concern::SplitEnds, Concern::Frizz],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_report_is_valid() {
        assert!(sample_report().validate().is_ok());
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        let mut report = sample_report();
        report.health_score = 6;
        assert!(matches!(report.validate(), Err(AppError::AnalysisFailed(_))));

        let mut report = sample_report();
        report.damage = 0;
        assert!(report.validate().is_err());

        let mut report = sample_report();
        report.density = 11;
        assert!(report.validate().is_err());
    }

    #[test]
    fn too_many_concerns_are_rejected() {
        let mut report = sample_report();
        report.concerns = vec![Concern::Frizz; 6];
        assert!(report.validate().is_err());
    }

    #[test]
    fn serializes_with_original_field_names_and_labels() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["type"], "Curly");
        assert_eq!(json["healthScore"], 9);
        assert_eq!(json["scalpCondition"], "Normal");
        assert_eq!(json["concerns"][0], "Split ends");
    }

    #[test]
    fn labels_match_serialized_names() {
        for concern in Concern::ALL {
            let json = serde_json::to_value(concern).unwrap();
            assert_eq!(json, concern.label());
        }
    }
}
