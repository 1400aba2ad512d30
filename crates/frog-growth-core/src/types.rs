// crates/frog-growth-core/src/types.rs

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One capture event as returned by the capture-lineage query.
#[derive(Debug, Clone, FromRow)]
pub struct CaptureRow {
    pub site_id: Option<i32>,
    pub visit_date: Option<NaiveDate>,
    pub pit_tag_ref: Option<String>,
    pub tag_new: Option<bool>,
    pub capture_animal_state: Option<String>,
    pub sex: Option<String>,
    pub length: Option<f64>,
    pub weight: Option<f64>,
}

/// One (relocation event, frog) pairing from the relocation-lineage query.
#[derive(Debug, Clone, FromRow)]
pub struct RelocationRow {
    pub collect_siteid: Option<String>,
    pub release_siteid1: Option<i32>,
    pub release_siteid2: Option<i32>,
    pub release_date: Option<NaiveDate>,
    #[sqlx(rename = "type")]
    pub relocation_type: Option<String>,
    pub pit_tag_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationType {
    Translocation,
    Reintroduction,
}

impl RelocationType {
    pub const NA: &'static str = "NA";

    pub fn as_str(self) -> &'static str {
        match self {
            RelocationType::Translocation => "translocation",
            RelocationType::Reintroduction => "reintroduction",
        }
    }

    /// Parses a relocation label; `None` for anything that is not one of the
    /// two recognised movement types (including the literal `"NA"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "translocation" => Some(RelocationType::Translocation),
            "reintroduction" => Some(RelocationType::Reintroduction),
            _ => None,
        }
    }
}

impl fmt::Display for RelocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationType {
    BdNaive,
    Translocated,
    Reintroduced,
    TranslocatedReintroduced,
    TranslocatedNaive,
    PostEpizooticDeclining,
    BdTreatment,
    ReintroducedNaiveDeclining,
    NaturalRecovery,
}

impl PopulationType {
    pub const ALL: [PopulationType; 9] = [
        PopulationType::BdNaive,
        PopulationType::Translocated,
        PopulationType::Reintroduced,
        PopulationType::TranslocatedReintroduced,
        PopulationType::TranslocatedNaive,
        PopulationType::PostEpizooticDeclining,
        PopulationType::BdTreatment,
        PopulationType::ReintroducedNaiveDeclining,
        PopulationType::NaturalRecovery,
    ];

    pub fn code(self) -> i32 {
        match self {
            PopulationType::BdNaive => 0,
            PopulationType::Translocated => 1,
            PopulationType::Reintroduced => 2,
            PopulationType::TranslocatedReintroduced => 3,
            PopulationType::TranslocatedNaive => 4,
            PopulationType::PostEpizooticDeclining => 5,
            PopulationType::BdTreatment => 6,
            PopulationType::ReintroducedNaiveDeclining => 7,
            PopulationType::NaturalRecovery => 8,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            PopulationType::BdNaive => "bd_naive",
            PopulationType::Translocated => "translocated",
            PopulationType::Reintroduced => "reintroduced",
            PopulationType::TranslocatedReintroduced => "translocated_reintroduced",
            PopulationType::TranslocatedNaive => "translocated_naive",
            PopulationType::PostEpizooticDeclining => "post_epizootic_declining",
            PopulationType::BdTreatment => "bd_treatment",
            PopulationType::ReintroducedNaiveDeclining => "reintroduced_naive_declining",
            PopulationType::NaturalRecovery => "natural_recovery",
        }
    }

    /// Population types whose untyped individuals are all treated as residents.
    pub fn defaults_to_resident(self) -> bool {
        matches!(
            self,
            PopulationType::BdNaive
                | PopulationType::PostEpizooticDeclining
                | PopulationType::BdTreatment
                | PopulationType::NaturalRecovery
        )
    }
}

impl fmt::Display for PopulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrogType {
    Translocated,
    Reintroduced,
    TranslocatedOrReintroduced,
    Resident,
}

impl FrogType {
    pub fn code(self) -> i32 {
        match self {
            FrogType::Translocated => 1,
            FrogType::Reintroduced => 2,
            FrogType::TranslocatedOrReintroduced => 3,
            FrogType::Resident => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(FrogType::Translocated),
            2 => Some(FrogType::Reintroduced),
            3 => Some(FrogType::TranslocatedOrReintroduced),
            4 => Some(FrogType::Resident),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FrogType::Translocated => "translocated",
            FrogType::Reintroduced => "reintroduced",
            FrogType::TranslocatedOrReintroduced => "translocated_or_reintroduced",
            FrogType::Resident => "resident",
        }
    }
}

impl From<RelocationType> for FrogType {
    fn from(value: RelocationType) -> Self {
        match value {
            RelocationType::Translocation => FrogType::Translocated,
            RelocationType::Reintroduction => FrogType::Reintroduced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_codes_are_stable() {
        for kind in PopulationType::ALL {
            assert_eq!(PopulationType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(PopulationType::from_code(9), None);
        assert_eq!(PopulationType::NaturalRecovery.code(), 8);
    }

    #[test]
    fn na_is_not_a_relocation_type() {
        assert_eq!(RelocationType::parse(RelocationType::NA), None);
        assert_eq!(
            RelocationType::parse("reintroduction"),
            Some(RelocationType::Reintroduction)
        );
    }
}
