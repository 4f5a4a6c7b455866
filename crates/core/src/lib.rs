//! Core types for membership-inference attack audits.
//!
//! This crate provides the pieces every other audit crate shares: the
//! error taxonomy, score and label containers, the typed configuration
//! schema, and dataset loading.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod scores;

pub use config::{
    AttackModel, AttackModelConfig, AttackParams, AuditConfig, DatasetConfig, DirList,
    GeneratorConfig,
};
pub use dataset::{
    escape_field, read_table, save_arrays, split_record, write_table, DataTable, DatasetProvider,
    MembershipDataLoader, TableFormat,
};
pub use error::{MiaError, Result};
pub use scores::{AttackScores, LabelVector, ScoreSet, ScoreVector};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{
        AttackModel, AttackModelConfig, AttackParams, AttackScores, AuditConfig, DataTable,
        DatasetProvider, LabelVector, MembershipDataLoader, MiaError, Result, ScoreSet,
        ScoreVector,
    };
}
