//! Walk-forward labeling.
//!
//! First stage of the importance explanation: each historical row is
//! labelled by re-running the regime classifier on the rows up to it.
//! The second stage (`crate::explain`) fits a model to these labels.

pub mod labels;

pub use labels::{label_distribution, walk_forward_labels};
