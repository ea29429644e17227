//! End-to-end metadata production over a CSV fixture tree.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

use jetmeta_core::{MetadataProducer, load_descriptor};
use jetmeta_ingest::{CsvEventSource, SampleSet};
use jetmeta_model::{CmpOp, MetadataConfig, Selection, VarGroup};

struct Row {
    fj_pt: f64,
    label_b: u8,
    label_q: u8,
    cand_lengths: usize,
}

fn write_sample(dir: &Path, rel: &str, rows: &[Row]) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    let mut text = String::from("# tree: events\nfj_pt,fj_eta,label_b,label_q,pfcand_pt\n");
    for row in rows {
        let cands: Vec<String> = (0..row.cand_lengths)
            .map(|i| format!("{:.1}", 1.0 + i as f64))
            .collect();
        writeln!(
            text,
            "{},0.5,{},{},[{}]",
            row.fj_pt,
            row.label_b,
            row.label_q,
            cands.join(";")
        )
        .expect("format row");
    }
    fs::write(path, text).expect("write sample");
}

fn rows(label_b: bool, low: usize, high: usize) -> Vec<Row> {
    let (b, q) = if label_b { (1, 0) } else { (0, 1) };
    let mut out = Vec::new();
    for i in 0..low {
        out.push(Row {
            fj_pt: 50.0,
            label_b: b,
            label_q: q,
            cand_lengths: 1 + i % 3,
        });
    }
    for i in 0..high {
        out.push(Row {
            fj_pt: 150.0,
            label_b: b,
            label_q: q,
            cand_lengths: 2 + i % 2,
        });
    }
    out
}

fn config() -> MetadataConfig {
    MetadataConfig {
        tree_name: "events".to_string(),
        file_extension: "csv".to_string(),
        var_groups: vec![
            VarGroup {
                name: "pfcand".to_string(),
                patterns: vec!["pfcand_.*".to_string()],
                size: None,
            },
            VarGroup {
                name: "fat_jet".to_string(),
                patterns: vec!["fj_.*".to_string()],
                size: None,
            },
        ],
        var_blacklist: vec!["fj_eta".to_string()],
        label_fields: vec!["label_b".to_string(), "label_q".to_string()],
        reweight_var: "fj_pt".to_string(),
        reweight_bins: vec![0.0, 100.0, 200.0],
        reweight_events: 0,
        metadata_events: 0,
        ..MetadataConfig::default()
    }
}

#[test]
fn produce_builds_a_complete_descriptor() {
    let dir = TempDir::new().expect("temp dir");
    write_sample(dir.path(), "bjets/part0.csv", &rows(true, 12, 11));
    write_sample(dir.path(), "qcd/part0.csv", &rows(false, 20, 15));

    let config = config();
    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    let mut rng = StdRng::seed_from_u64(1);
    let out_path = dir.path().join("metadata.json");

    let desc = producer
        .produce(dir.path(), &out_path, SampleSet::TrainVal, &mut rng)
        .expect("produce metadata");

    // File list and counts stay parallel; total is their sum.
    assert_eq!(desc.input_files.len(), desc.event_counts.len());
    assert_eq!(desc.total_events, desc.event_counts.iter().sum::<u64>());
    assert_eq!(desc.total_events, 58);

    // Selection: pfcand_pt and fj_pt survive; fj_eta is blacklisted and
    // labels are never training variables.
    assert_eq!(desc.var_fields, vec!["fj_pt", "pfcand_pt"]);
    assert!(!desc.var_fields.iter().any(|v| v == "fj_eta"));

    // Reweighting: label_b counts [12, 11] (ref 11), label_q [20, 15]
    // (ref 15); the rarer reference class gets weight 1.0.
    let b = &desc.reweight_info["label_b"];
    assert_eq!(b.raw_hist, vec![12.0, 11.0]);
    assert!((b.bin_weights[0] - 11.0 / 12.0).abs() < 1e-12);
    assert_eq!(b.bin_weights[1], 1.0);
    assert_eq!(b.class_weight, 1.0);
    let q = &desc.reweight_info["label_q"];
    assert_eq!(q.raw_hist, vec![20.0, 15.0]);
    assert!((q.class_weight - 11.0 / 15.0).abs() < 1e-12);
    assert_eq!(b.bin_edges.len(), b.raw_hist.len() + 1);

    // Every label carries a class weight.
    for label in &desc.label_fields {
        assert!(desc.reweight_info.contains_key(label));
    }

    // Statistics: fj_pt is 32 x 50.0 and 26 x 150.0.
    let fj = &desc.var_stats["fj_pt"];
    assert_eq!(fj.size, None);
    assert_eq!(fj.min, 50.0);
    assert_eq!(fj.max, 150.0);
    assert!((fj.mean - 5500.0 / 58.0).abs() < 1e-9);

    // Ragged variable gets an inferred size and flattened statistics.
    let cand = &desc.var_stats["pfcand_pt"];
    assert!(cand.size.is_some());
    assert!(cand.size.unwrap() >= 1);
    assert!(cand.min >= 1.0);
}

#[test]
fn descriptor_round_trips_without_write_only_fields() {
    let dir = TempDir::new().expect("temp dir");
    write_sample(dir.path(), "bjets/part0.csv", &rows(true, 12, 11));
    write_sample(dir.path(), "qcd/part0.csv", &rows(false, 20, 15));

    let config = config();
    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    let mut rng = StdRng::seed_from_u64(1);
    let out_path = dir.path().join("metadata.json");

    let produced = producer
        .produce(dir.path(), &out_path, SampleSet::TrainVal, &mut rng)
        .expect("produce metadata");
    let loaded = load_descriptor(&out_path).expect("load metadata");

    // Write-only fields come back empty...
    assert_eq!(loaded.input_dir, PathBuf::new());
    assert_eq!(loaded.total_events, 0);
    assert!(loaded.reweight_bins.is_empty());
    assert!(loaded.all_fields.is_empty());

    // ...and everything else reproduces the produced descriptor exactly.
    let mut expected = produced.clone();
    expected.input_dir = PathBuf::new();
    expected.total_events = 0;
    expected.reweight_bins = Vec::new();
    expected.all_fields = Vec::new();
    assert_eq!(loaded, expected);

    // The document itself is sorted-key, 2-space-indented JSON.
    let text = fs::read_to_string(&out_path).expect("read document");
    assert!(text.starts_with("{\n  \""));
    let keys: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("  \""))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn selection_filters_the_reweight_sample() {
    let dir = TempDir::new().expect("temp dir");
    let mut all = rows(true, 12, 11);
    // One outlier that the selection removes; without it the clipped
    // histogram would count it in the high bin.
    all.push(Row {
        fj_pt: 5000.0,
        label_b: 1,
        label_q: 0,
        cand_lengths: 2,
    });
    write_sample(dir.path(), "bjets/part0.csv", &all);
    write_sample(dir.path(), "qcd/part0.csv", &rows(false, 20, 15));

    let mut config = config();
    config.selection = Some(Selection {
        field: "fj_pt".to_string(),
        op: CmpOp::Lt,
        value: 1000.0,
    });
    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    let mut rng = StdRng::seed_from_u64(1);

    let desc = producer
        .build(dir.path(), SampleSet::TrainVal, &mut rng)
        .expect("build metadata");
    assert_eq!(desc.reweight_info["label_b"].raw_hist, vec![12.0, 11.0]);
}

#[test]
fn missing_reweight_var_is_a_configuration_error() {
    let dir = TempDir::new().expect("temp dir");
    write_sample(dir.path(), "bjets/part0.csv", &rows(true, 12, 11));

    let mut config = config();
    config.reweight_var = "nonexistent".to_string();
    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    let mut rng = StdRng::seed_from_u64(1);

    let err = producer
        .build(dir.path(), SampleSet::TrainVal, &mut rng)
        .expect_err("missing reweight var");
    assert!(matches!(err, jetmeta_core::MetaError::Configuration(_)));
}

#[test]
fn empty_input_directory_is_a_configuration_error() {
    let dir = TempDir::new().expect("temp dir");
    let config = config();
    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    let mut rng = StdRng::seed_from_u64(1);

    let err = producer
        .build(dir.path(), SampleSet::TrainVal, &mut rng)
        .expect_err("no files");
    assert!(matches!(err, jetmeta_core::MetaError::Configuration(_)));
}
