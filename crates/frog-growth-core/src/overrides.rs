use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::types::{FrogType, PopulationType};

const BUILTIN_OVERRIDES: &str = include_str!("../data/overrides.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideFile {
    #[serde(default)]
    relocation_exclusion: Vec<RelocationExclusion>,
    #[serde(default)]
    type_corrections: TypeCorrections,
    #[serde(default)]
    prerelease: PrereleaseSites,
    #[serde(default)]
    population: PopulationSection,
    #[serde(default)]
    frog_type: FrogTypeSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RelocationExclusion {
    pub collect_siteid: String,
    pub pit_tag_ref: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeCorrections {
    #[serde(default)]
    null_type_pit_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrereleaseSites {
    #[serde(default)]
    site_ranges: Vec<(i32, i32)>,
    #[serde(default)]
    site_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PopulationSection {
    #[serde(default)]
    forced_reintroduction_sites: Vec<i32>,
    #[serde(default)]
    overrides: PopulationOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct PopulationOverrides {
    bd_naive: Vec<i32>,
    translocated: Vec<i32>,
    translocated_reintroduced: Vec<i32>,
    translocated_naive: Vec<i32>,
    post_epizootic_declining: Vec<i32>,
    bd_treatment: Vec<i32>,
    reintroduced_naive_declining: Vec<i32>,
    natural_recovery: Vec<i32>,
}

impl PopulationOverrides {
    fn lists(&self) -> [(PopulationType, &[i32]); 8] {
        [
            (PopulationType::BdNaive, self.bd_naive.as_slice()),
            (PopulationType::Translocated, self.translocated.as_slice()),
            (
                PopulationType::TranslocatedReintroduced,
                self.translocated_reintroduced.as_slice(),
            ),
            (PopulationType::TranslocatedNaive, self.translocated_naive.as_slice()),
            (
                PopulationType::PostEpizooticDeclining,
                self.post_epizootic_declining.as_slice(),
            ),
            (PopulationType::BdTreatment, self.bd_treatment.as_slice()),
            (
                PopulationType::ReintroducedNaiveDeclining,
                self.reintroduced_naive_declining.as_slice(),
            ),
            (PopulationType::NaturalRecovery, self.natural_recovery.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrogTypeSection {
    #[serde(default)]
    reintroduced: Vec<i32>,
    #[serde(default)]
    translocated_or_reintroduced: Vec<i32>,
    #[serde(default)]
    resident: Vec<i32>,
    #[serde(default)]
    translocation_override: Vec<CaptureOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CaptureOverride {
    pub site_id: i32,
    pub pit_tag_ref: String,
}

/// Validated override tables with lookups keyed the way the stages query them.
#[derive(Debug, Clone)]
pub struct Overrides {
    relocation_exclusions: HashSet<RelocationExclusion>,
    null_type_pit_tags: HashSet<String>,
    prerelease_ranges: Vec<(i32, i32)>,
    prerelease_sites: HashSet<i32>,
    forced_reintroduction_sites: HashSet<i32>,
    population: HashMap<i32, PopulationType>,
    frog_type_sites: Vec<(FrogType, HashSet<i32>)>,
    translocation_overrides: HashSet<CaptureOverride>,
}

/// Counts reported by `check-overrides`.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideSummary {
    pub relocation_exclusions: usize,
    pub null_type_pit_tags: usize,
    pub prerelease_ranges: Vec<(i32, i32)>,
    pub prerelease_sites: usize,
    pub forced_reintroduction_sites: usize,
    pub population_sites: BTreeMap<String, usize>,
    pub frog_type_sites: BTreeMap<String, usize>,
    pub translocation_overrides: usize,
}

impl Overrides {
    /// The table compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_OVERRIDES)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let overrides = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded override table");
        Ok(overrides)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: OverrideFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: OverrideFile) -> Result<Self> {
        let mut population: HashMap<i32, PopulationType> = HashMap::new();
        let mut memberships: BTreeMap<i32, Vec<PopulationType>> = BTreeMap::new();

        for (kind, sites) in file.population.overrides.lists() {
            for &site_id in sites {
                let lists = memberships.entry(site_id).or_default();
                if !lists.contains(&kind) {
                    lists.push(kind);
                }
                population.insert(site_id, kind);
            }
        }

        if let Some((site_id, lists)) = memberships.into_iter().find(|(_, lists)| lists.len() > 1) {
            return Err(PipelineError::AmbiguousClassification {
                site_id,
                lists: lists.iter().map(|kind| kind.label().to_string()).collect(),
            });
        }

        let frog_type_sites = vec![
            (
                FrogType::Reintroduced,
                file.frog_type.reintroduced.into_iter().collect(),
            ),
            (
                FrogType::TranslocatedOrReintroduced,
                file.frog_type.translocated_or_reintroduced.into_iter().collect(),
            ),
            (FrogType::Resident, file.frog_type.resident.into_iter().collect()),
        ];

        Ok(Self {
            relocation_exclusions: file.relocation_exclusion.into_iter().collect(),
            null_type_pit_tags: file.type_corrections.null_type_pit_tags.into_iter().collect(),
            prerelease_ranges: file.prerelease.site_ranges,
            prerelease_sites: file.prerelease.site_ids.into_iter().collect(),
            forced_reintroduction_sites: file
                .population
                .forced_reintroduction_sites
                .into_iter()
                .collect(),
            population,
            frog_type_sites,
            translocation_overrides: file.frog_type.translocation_override.into_iter().collect(),
        })
    }

    pub fn is_excluded_relocation(&self, collect_siteid: &str, pit_tag_ref: &str) -> bool {
        self.relocation_exclusions.iter().any(|exclusion| {
            exclusion.collect_siteid == collect_siteid && exclusion.pit_tag_ref == pit_tag_ref
        })
    }

    pub fn nulls_type_for(&self, pit_tag_ref: &str) -> bool {
        self.null_type_pit_tags.contains(pit_tag_ref)
    }

    pub fn is_prerelease_site(&self, site_id: i32) -> bool {
        self.prerelease_sites.contains(&site_id)
            || self
                .prerelease_ranges
                .iter()
                .any(|&(low, high)| (low..=high).contains(&site_id))
    }

    pub fn forces_reintroduction(&self, site_id: i32) -> bool {
        self.forced_reintroduction_sites.contains(&site_id)
    }

    /// The override list wins wherever the site appears in one; otherwise the
    /// computed code stands.
    pub fn resolve_population(
        &self,
        site_id: i32,
        computed: Option<PopulationType>,
    ) -> Option<PopulationType> {
        self.population.get(&site_id).copied().or(computed)
    }

    /// Site-list fallback for captures without a relocation type, checked in
    /// reintroduced, translocated-or-reintroduced, resident order.
    pub fn frog_type_for_site(&self, site_id: i32) -> Option<FrogType> {
        self.frog_type_sites
            .iter()
            .find(|(_, sites)| sites.contains(&site_id))
            .map(|(kind, _)| *kind)
    }

    pub fn forces_translocation(&self, site_id: i32, pit_tag_ref: &str) -> bool {
        self.translocation_overrides
            .iter()
            .any(|entry| entry.site_id == site_id && entry.pit_tag_ref == pit_tag_ref)
    }

    pub fn summary(&self) -> OverrideSummary {
        let mut population_sites: BTreeMap<String, usize> = BTreeMap::new();
        for kind in self.population.values() {
            *population_sites.entry(kind.label().to_string()).or_default() += 1;
        }

        let frog_type_sites = self
            .frog_type_sites
            .iter()
            .map(|(kind, sites)| (kind.label().to_string(), sites.len()))
            .collect();

        OverrideSummary {
            relocation_exclusions: self.relocation_exclusions.len(),
            null_type_pit_tags: self.null_type_pit_tags.len(),
            prerelease_ranges: self.prerelease_ranges.clone(),
            prerelease_sites: self.prerelease_sites.len(),
            forced_reintroduction_sites: self.forced_reintroduction_sites.len(),
            population_sites,
            frog_type_sites,
            translocation_overrides: self.translocation_overrides.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        assert!(overrides.is_excluded_relocation("72996", "900067000117396"));
        assert!(overrides.is_excluded_relocation("10055", "900043000217381"));
        assert!(!overrides.is_excluded_relocation("72996", "900043000217381"));
        assert!(overrides.is_prerelease_site(10476));
        assert!(overrides.is_prerelease_site(70567));
        assert!(!overrides.is_prerelease_site(10478));
        assert_eq!(
            overrides.resolve_population(11008, Some(PopulationType::Translocated)),
            Some(PopulationType::BdNaive)
        );
    }

    #[test]
    fn site_in_two_population_lists_is_rejected() {
        let content = r#"
            [population.overrides]
            bd_naive = [1, 2]
            natural_recovery = [2]
        "#;
        match Overrides::from_toml_str(content) {
            Err(PipelineError::AmbiguousClassification { site_id, lists }) => {
                assert_eq!(site_id, 2);
                assert_eq!(lists, vec!["bd_naive", "natural_recovery"]);
            }
            other => panic!("expected ambiguous classification, got {other:?}"),
        }
    }

    #[test]
    fn frog_type_lists_apply_in_order() {
        let content = r#"
            [frog_type]
            reintroduced = [5]
            translocated_or_reintroduced = [5, 6]
            resident = [7]
        "#;
        let overrides = Overrides::from_toml_str(content).unwrap();
        assert_eq!(overrides.frog_type_for_site(5), Some(FrogType::Reintroduced));
        assert_eq!(
            overrides.frog_type_for_site(6),
            Some(FrogType::TranslocatedOrReintroduced)
        );
        assert_eq!(overrides.frog_type_for_site(7), Some(FrogType::Resident));
        assert_eq!(overrides.frog_type_for_site(8), None);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Overrides::from_toml_str("[populations]\nbd_naive = [1]\n").is_err());
    }
}
