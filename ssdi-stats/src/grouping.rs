//! Species Grouping
//!
//! Partitions validated records into per-species groups of male and female sizes.
//! Groups keep the order in which species were first encountered, and sizes keep
//! input order within each sex.

use crate::record::{Record, Sex};
use fxhash::FxHashMap;
use serde::Serialize;

/// Male and female sizes for one species
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesGroup {
    /// Species name
    pub species: String,
    /// Male sizes in input order
    pub male_sizes: Vec<f64>,
    /// Female sizes in input order
    pub female_sizes: Vec<f64>,
}

impl SpeciesGroup {
    /// Create an empty group
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            male_sizes: Vec::new(),
            female_sizes: Vec::new(),
        }
    }

    /// Create a group from explicit size lists
    pub fn with_sizes(species: impl Into<String>, male_sizes: Vec<f64>, female_sizes: Vec<f64>) -> Self {
        Self {
            species: species.into(),
            male_sizes,
            female_sizes,
        }
    }

    /// Add one measurement
    pub fn push(&mut self, sex: Sex, size: f64) {
        match sex {
            Sex::Male => self.male_sizes.push(size),
            Sex::Female => self.female_sizes.push(size),
        }
    }

    /// Number of male measurements
    pub fn n_male(&self) -> usize {
        self.male_sizes.len()
    }

    /// Number of female measurements
    pub fn n_female(&self) -> usize {
        self.female_sizes.len()
    }

    /// Both sexes have at least one measurement
    pub fn has_both_sexes(&self) -> bool {
        self.n_male() > 0 && self.n_female() > 0
    }

    /// Exactly one measurement per sex
    pub fn is_single_pair(&self) -> bool {
        self.n_male() == 1 && self.n_female() == 1
    }

    /// Pairwise estimates and the permutation test can run on this group
    pub fn supports_pairwise(&self) -> bool {
        self.has_both_sexes() && !self.is_single_pair()
    }
}

/// Species groups in first-encounter order with lookup by name
#[derive(Debug, Clone, Default)]
pub struct SpeciesGroups {
    groups: Vec<SpeciesGroup>,
    index: FxHashMap<String, usize>,
}

impl SpeciesGroups {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record, creating its species group on first sight
    pub fn insert(&mut self, record: &Record) {
        let idx = match self.index.get(&record.species) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.groups.push(SpeciesGroup::new(record.species.clone()));
                self.index.insert(record.species.clone(), idx);
                idx
            }
        };
        self.groups[idx].push(record.sex, record.size);
    }

    /// Look up a group by exact species name
    pub fn get(&self, species: &str) -> Option<&SpeciesGroup> {
        self.index.get(species).map(|&idx| &self.groups[idx])
    }

    /// Number of species
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// No species were recorded
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate groups in first-encounter order
    pub fn iter(&self) -> std::slice::Iter<'_, SpeciesGroup> {
        self.groups.iter()
    }

    /// Groups in first-encounter order
    pub fn as_slice(&self) -> &[SpeciesGroup] {
        &self.groups
    }

    /// Keep only groups matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&SpeciesGroup) -> bool) {
        self.groups.retain(|g| keep(g));
        self.index = self
            .groups
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.species.clone(), idx))
            .collect();
    }

    /// Consume into the ordered groups
    pub fn into_vec(self) -> Vec<SpeciesGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a SpeciesGroups {
    type Item = &'a SpeciesGroup;
    type IntoIter = std::slice::Iter<'a, SpeciesGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<'a> FromIterator<&'a Record> for SpeciesGroups {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        let mut groups = SpeciesGroups::new();
        for record in iter {
            groups.insert(record);
        }
        groups
    }
}

/// Partition records by exact species name
pub fn group_by_species(records: &[Record]) -> SpeciesGroups {
    records.iter().collect()
}

/// Number of species with more than 1, 2 and 3 measurements of each sex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SampleSizeTally {
    /// Species with > 1 male and > 1 female
    pub over_one: usize,
    /// Species with > 2 males and > 2 females
    pub over_two: usize,
    /// Species with > 3 males and > 3 females
    pub over_three: usize,
}

impl SampleSizeTally {
    /// Tally sample sizes over all groups
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a SpeciesGroup>) -> Self {
        let mut tally = Self::default();
        for group in groups {
            let smallest = group.n_male().min(group.n_female());
            if smallest > 1 {
                tally.over_one += 1;
            }
            if smallest > 2 {
                tally.over_two += 1;
            }
            if smallest > 3 {
                tally.over_three += 1;
            }
        }
        tally
    }
}
