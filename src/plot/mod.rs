//! Plot data preparation.

pub mod prep;

pub use prep::{
    condition_means, feature_boxplot, features_per_parent, histogram, log2_fold_changes,
    log2_plus_one, replicate_concordance, BoxGroup, BoxplotData, Histogram, ScatterData,
};
