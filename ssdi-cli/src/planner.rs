//! Analysis Planner
//!
//! Selects which species groups to analyse.
//!
//! Filtering options:
//! - Regex pattern matching on species name
//!
//! Ordering: groups keep first-encounter order; output order is decided by the writer.

use ssdi_stats::{SampleSizeTally, SpeciesGroup, SpeciesGroups};

/// Species selected for analysis
pub struct AnalysisPlan {
    /// Groups to analyse, in first-encounter order
    pub groups: Vec<SpeciesGroup>,
    /// Species removed by the filter
    pub filtered_out: usize,
    /// Sample size tally over the selected groups
    pub tally: SampleSizeTally,
}

/// Build the analysis plan from grouped records
pub fn build_plan(groups: SpeciesGroups, filter: Option<&regex::Regex>) -> AnalysisPlan {
    let mut groups = groups;
    let before = groups.len();

    if let Some(re) = filter {
        groups.retain(|g| re.is_match(&g.species));
    }

    let filtered_out = before - groups.len();
    let tally = SampleSizeTally::from_groups(&groups);

    AnalysisPlan {
        groups: groups.into_vec(),
        filtered_out,
        tally,
    }
}
