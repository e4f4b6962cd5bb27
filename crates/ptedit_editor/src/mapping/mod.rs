//! Conversions between document terms and engine terms.

pub mod patches;
pub mod range;
pub mod value;

pub use patches::diff_documents;
pub use range::{
    minimal_path, normalize_selection, selection_at_path, to_engine_point, to_engine_range,
    to_external_point, to_external_selection,
};
pub use value::{from_engine_nodes, reconcile, to_engine_nodes, ReconcileOutcome};
