pub mod error;
pub mod producer;
pub mod reweight;
pub mod selector;
pub mod stats;

pub use error::{MetaError, Result};
pub use producer::{MetadataProducer, load_descriptor, write_descriptor};
pub use reweight::{compute_reweight_info, histogram};
pub use selector::{SelectedVars, select_variables};
pub use stats::{SamplePlan, compute_stats, percentile, plan_sample};
