//! Integration tests for SSDi
//!
//! These tests verify the end-to-end behavior of ingestion, analysis and result writing.

use clap::Parser;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use ssdi::{
    AnalysisConfig, Classification, Cli, InputFormat, PermutationConfig, Record, Sex,
    SpeciesGroup, analyze_groups, group_by_species, permutation_test, read_records,
    run_with_cli,
};
use std::path::Path;

fn config(replicates: usize) -> AnalysisConfig {
    AnalysisConfig {
        permutation: PermutationConfig {
            replicates,
            parallel: true,
        },
        ..Default::default()
    }
}

fn approx(actual: Option<f64>, expected: f64, tol: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < tol)
}

const TURTLES: &str = "Species,Sex,SCL\n\
Emys orbicularis,M,33.1\n\
Emys orbicularis,M,33.5\n\
Emys orbicularis,F,33.7\n\
Emys orbicularis,F,34.5\n\
Chelydra serpentina,m,35.1\n\
Chelydra serpentina,f,35.5\n\
Apalone spinifera,F,30.2\n\
Apalone spinifera,F,31.0\n\
Apalone spinifera,X,31.0\n\
Apalone spinifera,F,abc\n";

/// Ingest, group and analyse the reference 2x2 species
#[test]
fn test_two_by_two_pipeline() {
    let ingested = read_records(TURTLES.as_bytes(), InputFormat::Csv).unwrap();
    assert_eq!(ingested.records.len(), 8);
    assert_eq!(ingested.diagnostics.len(), 2);

    let groups = group_by_species(&ingested.records);
    let analyses = analyze_groups(groups.as_slice(), &config(10_000), &mut StdRng::seed_from_u64(1)).unwrap();
    let emys = &analyses[0].result;

    assert_eq!(emys.species, "Emys orbicularis");
    assert!(approx(emys.avg_male, 33.3, 1e-9));
    assert!(approx(emys.avg_female, 34.1, 1e-9));
    assert!(approx(emys.standard_ssdi, 0.024024, 1e-5));
    assert!(approx(emys.avg_pairwise_ssdi, 0.024061, 1e-5));
    assert!(approx(emys.abs_difference, 0.0, 1e-4));

    // Only 6 distinct relabelings exist for 2 + 2 values
    let p = emys.p_value.unwrap();
    assert!(p.value() > 0.2 && p.value() < 0.5, "p = {}", p);
    let (lower, upper) = (emys.lower_2_5.unwrap(), emys.upper_97_5.unwrap());
    assert!(lower < 0.0 && upper > 0.0);
    assert_eq!(emys.classification(0.05), Classification::NotDistinguishable);
}

/// Exactly one measurement per sex: standard SSDi only
#[test]
fn test_single_pair_species() {
    let records = vec![
        Record::new("Chelydra serpentina", Sex::Male, 35.1),
        Record::new("Chelydra serpentina", Sex::Female, 35.5),
    ];
    let groups = group_by_species(&records);
    let analyses = analyze_groups(groups.as_slice(), &config(1_000), &mut StdRng::seed_from_u64(1)).unwrap();
    let result = &analyses[0].result;

    assert!(approx(result.standard_ssdi, 35.5 / 35.1 - 1.0, 1e-12));
    assert!(approx(result.standard_ssdi, 0.011, 5e-4));
    assert_eq!(result.avg_pairwise_ssdi, None);
    assert_eq!(result.abs_difference, None);
    assert_eq!(result.p_value, None);
    assert_eq!(result.lower_2_5, None);
    assert_eq!(result.upper_97_5, None);
}

/// One sex missing: every SSDi-dependent field is absent
#[test]
fn test_missing_sex_species() {
    let records = vec![
        Record::new("Apalone spinifera", Sex::Female, 30.2),
        Record::new("Apalone spinifera", Sex::Female, 31.0),
    ];
    let groups = group_by_species(&records);
    let analyses = analyze_groups(groups.as_slice(), &config(1_000), &mut StdRng::seed_from_u64(1)).unwrap();
    let result = &analyses[0].result;

    assert_eq!((result.n_male, result.n_female), (0, 2));
    assert_eq!(result.avg_male, None);
    assert!(approx(result.avg_female, 30.6, 1e-9));
    assert_eq!(result.standard_ssdi, None);
    assert_eq!(result.avg_pairwise_ssdi, None);
    assert_eq!(result.p_value, None);
    assert_eq!(result.classification(0.05), Classification::InsufficientData);
    assert!(!analyses[0].diagnostics.is_empty());
}

/// The same seed reproduces the permutation fields exactly
#[test]
fn test_seeded_runs_are_reproducible() {
    let groups = vec![
        SpeciesGroup::with_sizes("a", vec![10.0, 11.0, 12.5, 9.8], vec![11.2, 12.0, 13.1]),
        SpeciesGroup::with_sizes("b", vec![5.0, 5.5, 6.0], vec![4.0, 4.2, 4.1, 3.9]),
    ];

    let first = analyze_groups(&groups, &config(2_000), &mut StdRng::seed_from_u64(77)).unwrap();
    let second = analyze_groups(&groups, &config(2_000), &mut StdRng::seed_from_u64(77)).unwrap();
    let serial = AnalysisConfig {
        permutation: PermutationConfig {
            replicates: 2_000,
            parallel: false,
        },
        parallel_species: false,
        ..Default::default()
    };
    let third = analyze_groups(&groups, &serial, &mut StdRng::seed_from_u64(77)).unwrap();

    for ((a, b), c) in first.iter().zip(&second).zip(&third) {
        assert_eq!(a.result, b.result);
        assert_eq!(a.result, c.result);
    }
}

/// Clearly separated sexes reject the null with a floored p-value
#[test]
fn test_separated_distributions_are_dimorphic() {
    let males: Vec<f64> = (0..15).map(|i| 10.0 + i as f64 * 0.1).collect();
    let females: Vec<f64> = (0..15).map(|i| 20.0 + i as f64 * 0.1).collect();
    let groups = vec![SpeciesGroup::with_sizes("separated", males, females)];

    let analyses = analyze_groups(&groups, &config(10_000), &mut StdRng::seed_from_u64(5)).unwrap();
    let result = &analyses[0].result;
    let p = result.p_value.unwrap();

    assert_eq!(p.extreme_count(), 0);
    assert_eq!(p.to_string(), "<0.001");
    assert!(result.upper_97_5.unwrap() < result.standard_ssdi.unwrap());
    assert_eq!(result.classification(0.05), Classification::Dimorphic);
}

/// Interleaved sizes fail to reject
#[test]
fn test_interleaved_distributions_are_not_dimorphic() {
    let groups = vec![SpeciesGroup::with_sizes(
        "interleaved",
        vec![1.0, 3.0, 5.0, 7.0, 9.0, 11.0],
        vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0],
    )];

    let analyses = analyze_groups(&groups, &config(10_000), &mut StdRng::seed_from_u64(5)).unwrap();
    let result = &analyses[0].result;

    assert!(result.p_value.unwrap().value() > 0.3);
    assert!(result.lower_2_5.unwrap() < result.standard_ssdi.unwrap());
    assert!(result.upper_97_5.unwrap() > result.standard_ssdi.unwrap());
}

/// Without real dimorphism the test rejects at about alpha
#[test]
fn test_false_positive_rate_under_no_dimorphism() {
    let mut data_rng = StdRng::seed_from_u64(2024);
    let mut test_rng = StdRng::seed_from_u64(7);
    let perm = PermutationConfig {
        replicates: 1_000,
        parallel: true,
    };
    let trials = 300;

    let mut rejections = 0;
    for _ in 0..trials {
        let males: Vec<f64> = (0..6).map(|_| data_rng.gen_range(10.0..20.0)).collect();
        let females: Vec<f64> = (0..6).map(|_| data_rng.gen_range(10.0..20.0)).collect();
        let result = permutation_test(&males, &females, &perm, &mut test_rng).unwrap();
        if result.p_value.value() < 0.05 {
            rejections += 1;
        }
    }

    let rate = rejections as f64 / trials as f64;
    assert!(rate < 0.10, "rejection rate {rate} with {rejections} of {trials} trials");
}

fn write_input(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn cli(input: &Path, outdir: &Path, extra: &[&str]) -> Cli {
    let mut args = vec![
        "ssdi-calculator".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-o".to_string(),
        outdir.display().to_string(),
        "--quiet".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(args).unwrap()
}

/// Full CLI run writes sorted tab-delimited and CSV results plus the run log
#[test]
fn test_cli_writes_result_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "turtles.csv", TURTLES);

    run_with_cli(cli(&input, dir.path(), &["-f", "csv", "--seed", "42", "--replicates", "1000"]))
        .unwrap();

    let txt = std::fs::read_to_string(dir.path().join("SSDi-Results.txt")).unwrap();
    let lines: Vec<_> = txt.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Species\tNumber_Males\tNumber_Females\tAvg_Male"));
    assert_eq!(lines[1], "Apalone spinifera\t0\t2\tNA\t30.600\tNA\tNA\tNA\tNA\tNA\tNA");
    assert_eq!(lines[2], "Chelydra serpentina\t1\t1\t35.100\t35.500\t0.011\tNA\tNA\tNA\tNA\tNA");
    assert!(lines[3].starts_with("Emys orbicularis\t2\t2\t33.300\t34.100\t0.024\t0.024\t0.000\t"));

    let csv = std::fs::read_to_string(dir.path().join("SSDi-Results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(3).unwrap().starts_with("Emys orbicularis,2,2,"));

    assert!(dir.path().join("SSDi-Calculator-Run.log").exists());
    assert!(!dir.path().join("SSDi-Results.json").exists());
}

/// Seeded CLI runs produce identical files; JSON is written when requested
#[test]
fn test_cli_seeded_runs_match() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "turtles.tsv",
        &TURTLES.replace(',', "\t"),
    );
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    std::fs::create_dir(&first).unwrap();
    std::fs::create_dir(&second).unwrap();

    let args = ["-f", "tab", "--seed", "7", "--replicates", "500", "--output-formats", "tsv,json"];
    run_with_cli(cli(&input, &first, &args)).unwrap();
    run_with_cli(cli(&input, &second, &args)).unwrap();

    let a = std::fs::read_to_string(first.join("SSDi-Results.txt")).unwrap();
    let b = std::fs::read_to_string(second.join("SSDi-Results.txt")).unwrap();
    assert_eq!(a, b);
    assert!(!first.join("SSDi-Results.csv").exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(first.join("SSDi-Results.json")).unwrap())
            .unwrap();
    assert_eq!(json["meta"]["settings"]["seed"], 7);
    assert_eq!(json["meta"]["settings"]["replicates"], 500);
    assert_eq!(json["summary"]["total_species"], 3);
    assert_eq!(json["summary"]["skipped_rows"], 2);
}

/// No valid records is an error and writes no result files
#[test]
fn test_cli_nothing_to_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "empty.csv", "Species,Sex,SCL\nEmys,U,33.0\n\n");

    let err = run_with_cli(cli(&input, dir.path(), &["-f", "csv"])).unwrap_err();

    assert!(err.to_string().contains("Nothing to analyze"));
    assert!(!dir.path().join("SSDi-Results.txt").exists());
    assert!(!dir.path().join("SSDi-Results.csv").exists());
}

/// Input must be an existing file and outdir an existing directory
#[test]
fn test_cli_validates_paths() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "turtles.csv", TURTLES);

    let missing_input = dir.path().join("missing.csv");
    assert!(run_with_cli(cli(&missing_input, dir.path(), &["-f", "csv"])).is_err());

    let missing_dir = dir.path().join("missing");
    assert!(run_with_cli(cli(&input, &missing_dir, &["-f", "csv"])).is_err());
    assert!(run_with_cli(cli(&input, &input, &["-f", "csv"])).is_err());
}

/// Species filter limits which species are written
#[test]
fn test_cli_species_filter() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "turtles.csv", TURTLES);

    run_with_cli(cli(
        &input,
        dir.path(),
        &["-f", "csv", "--seed", "1", "--replicates", "200", "--species", "^Emys"],
    ))
    .unwrap();

    let txt = std::fs::read_to_string(dir.path().join("SSDi-Results.txt")).unwrap();
    assert_eq!(txt.lines().count(), 2);
    assert!(txt.lines().nth(1).unwrap().starts_with("Emys orbicularis\t"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Absent fields follow the sample sizes for any group shape
    #[test]
    fn prop_absent_fields_follow_sample_sizes(
        males in prop::collection::vec(1.0f64..100.0, 0..5),
        females in prop::collection::vec(1.0f64..100.0, 0..5),
        seed in any::<u64>(),
    ) {
        let n_male = males.len();
        let n_female = females.len();
        let groups = vec![SpeciesGroup::with_sizes("s", males, females)];
        let analyses = analyze_groups(&groups, &config(50), &mut StdRng::seed_from_u64(seed)).unwrap();
        let result = &analyses[0].result;

        let both = n_male > 0 && n_female > 0;
        let pairwise = both && !(n_male == 1 && n_female == 1);

        prop_assert_eq!(result.n_male, n_male);
        prop_assert_eq!(result.n_female, n_female);
        prop_assert_eq!(result.standard_ssdi.is_some(), both);
        prop_assert_eq!(result.avg_pairwise_ssdi.is_some(), pairwise);
        prop_assert_eq!(result.p_value.is_some(), pairwise);
        prop_assert_eq!(result.lower_2_5.is_some(), pairwise);
        prop_assert_eq!(result.upper_97_5.is_some(), pairwise);
        if let (Some(lower), Some(upper)) = (result.lower_2_5, result.upper_97_5) {
            prop_assert!(lower <= upper);
        }
    }
}
