pub mod config;
pub mod descriptor;
pub mod error;
pub mod selection;

pub use config::MetadataConfig;
pub use descriptor::{
    FieldKind, FieldSchema, LabelReweight, MetadataDescriptor, VarGroup, VariableStats,
};
pub use error::{ModelError, Result};
pub use selection::{CmpOp, Selection};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_serializes_and_round_trips_public_fields() {
        let mut desc = MetadataDescriptor {
            tree_name: "events".to_string(),
            reweight_var: "fj_pt".to_string(),
            label_fields: vec!["label_b".to_string()],
            ..MetadataDescriptor::default()
        };
        desc.reweight_info.insert(
            "label_b".to_string(),
            LabelReweight {
                bin_edges: vec![0.0, 1.0, 2.0],
                raw_hist: vec![10.0, 5.0],
                bin_weights: vec![0.5, 1.0],
                class_weight: 1.0,
            },
        );
        let json = serde_json::to_string(&desc).expect("serialize");
        let round: MetadataDescriptor = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round.reweight_info, desc.reweight_info);
        assert_eq!(round.reweight_var, "fj_pt");
    }
}
