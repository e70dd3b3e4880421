//! Species Analysis
//!
//! Drives [`ssdi_stats::analyze_groups_with`] over the planned groups with an
//! `indicatif` progress bar, then forwards each species' diagnostics to `tracing`
//! in group order so log output is never interleaved between species.

use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;
use ssdi_stats::{
    AnalysisConfig, AnalysisError, Diagnostic, DiagnosticLevel, SpeciesAnalysis, SpeciesGroup,
    analyze_groups_with,
};

/// Analyse all groups, showing progress unless `show_progress` is false
pub fn run_analysis<R: RngCore + ?Sized>(
    groups: &[SpeciesGroup],
    config: &AnalysisConfig,
    rng: &mut R,
    show_progress: bool,
) -> Result<Vec<SpeciesAnalysis>, AnalysisError> {
    let pb = if show_progress {
        let pb = ProgressBar::new(groups.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let analyses = analyze_groups_with(groups, config, rng, |analysis| {
        pb.set_message(analysis.result.species.clone());
        pb.inc(1);
    });

    match &analyses {
        Ok(_) => pb.finish_with_message("Analysis complete"),
        Err(_) => pb.abandon(),
    }

    analyses
}

/// Log every species' diagnostics at their own level
pub fn emit_diagnostics(analyses: &[SpeciesAnalysis]) {
    for analysis in analyses {
        for diagnostic in &analysis.diagnostics {
            emit(diagnostic);
        }
    }
}

fn emit(diagnostic: &Diagnostic) {
    match diagnostic.level {
        DiagnosticLevel::Debug => tracing::debug!("{}", diagnostic.message),
        DiagnosticLevel::Info => tracing::info!("{}", diagnostic.message),
        DiagnosticLevel::Warn => tracing::warn!("{}", diagnostic.message),
    }
}
