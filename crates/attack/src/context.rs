//! Run identity and output location.

use std::path::{Path, PathBuf};

use mia_audit_core::{AuditConfig, MiaError, Result};

/// Identifies one evaluation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackRunContext {
    /// Dataset name.
    pub dataset: String,
    /// Attack model identifier.
    pub attack_model: String,
    /// Generator model name.
    pub generator: String,
    /// Generator experiment name.
    pub experiment: String,
    /// Attack-level sub-experiment name.
    pub sub_experiment: String,
}

impl AttackRunContext {
    /// Context for `sub_experiment` under the configured dataset, model and generator.
    pub fn from_config(config: &AuditConfig, sub_experiment: &str) -> Self {
        Self {
            dataset: config.dataset_config.name.clone(),
            attack_model: config.attack_model.as_str().to_string(),
            generator: config.generator_config.model_name.clone(),
            experiment: config.generator_config.experiment_name.clone(),
            sub_experiment: sub_experiment.to_string(),
        }
    }

    /// `root/dataset/attack_model/generator/experiment/sub_experiment`.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.dataset)
            .join(&self.attack_model)
            .join(&self.generator)
            .join(&self.experiment)
            .join(&self.sub_experiment)
    }
}

/// Create `dir` and its parents if absent.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| MiaError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_nests_run_identity() {
        let ctx = AttackRunContext {
            dataset: "adult".into(),
            attack_model: "dcr".into(),
            generator: "ctgan".into(),
            experiment: "run1".into(),
            sub_experiment: "seed0".into(),
        };
        assert_eq!(
            ctx.output_dir(Path::new("/r")),
            PathBuf::from("/r/adult/dcr/ctgan/run1/seed0")
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
