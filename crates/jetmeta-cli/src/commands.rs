//! Subcommand implementations.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use jetmeta_core::{MetadataProducer, load_descriptor};
use jetmeta_ingest::{CsvEventSource, SampleSet};
use jetmeta_model::{MetadataConfig, MetadataDescriptor};

use crate::cli::{InspectArgs, ProduceArgs};

pub fn run_produce(args: &ProduceArgs) -> Result<MetadataDescriptor> {
    let config = match &args.config {
        Some(path) => MetadataConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MetadataConfig::default(),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input_dir.join("metadata.json"));
    let sample_set = if args.test_sample {
        SampleSet::Test
    } else {
        SampleSet::TrainVal
    };
    let mut rng = match args.seed {
        Some(seed) => {
            info!(seed, "using fixed sampling seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let source = CsvEventSource::new();
    let producer = MetadataProducer::new(&config, &source);
    producer
        .produce(&args.input_dir, &output, sample_set, &mut rng)
        .with_context(|| format!("producing metadata for {}", args.input_dir.display()))
}

pub fn run_inspect(args: &InspectArgs) -> Result<MetadataDescriptor> {
    load_descriptor(&args.metadata)
        .with_context(|| format!("loading metadata {}", args.metadata.display()))
}
