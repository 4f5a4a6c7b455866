//! The attack contract.
//!
//! Concrete attacks implement [`MembershipInferenceAttack`]; the shared
//! run state (configuration, input files, output location) lives in an
//! [`AttackSession`] that each attack owns.

use std::path::{Path, PathBuf};

use mia_audit_core::{
    AttackModelConfig, AttackScores, AuditConfig, LabelVector, MembershipDataLoader, Result,
    ScoreSet,
};
use tracing::info;

use crate::context::{ensure_dir, AttackRunContext};
use crate::evaluation::{EvaluationPipeline, EvaluationResultTable};
use crate::predictions;

/// Input files for one attack run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackInputs {
    /// Synthetic dataset.
    pub synthetic_file: PathBuf,
    /// Membership-test dataset.
    pub membership_test_file: PathBuf,
    /// Membership labels, if available.
    pub membership_lbl_file: Option<PathBuf>,
    /// Reference dataset, if the attack uses one.
    pub reference_file: Option<PathBuf>,
}

/// Configuration, inputs and output location of one attack run.
#[derive(Clone, Debug)]
pub struct AttackSession {
    config: AuditConfig,
    inputs: AttackInputs,
    attack_config: AttackModelConfig,
    context: AttackRunContext,
    results_dir: PathBuf,
}

impl AttackSession {
    /// Resolve the attack sub-configuration and create the output location.
    ///
    /// Fails with a configuration error when the section for the selected
    /// attack model is absent.
    pub fn new(config: AuditConfig, inputs: AttackInputs, mia_experiment_name: &str) -> Result<Self> {
        let attack_config = config.attack_config()?;
        let context = AttackRunContext::from_config(&config, mia_experiment_name);
        let results_dir = context.output_dir(&config.results_root());
        ensure_dir(&results_dir)?;
        info!(
            attack_model = %config.attack_model,
            dir = %results_dir.display(),
            "attack session ready"
        );
        Ok(Self {
            config,
            inputs,
            attack_config,
            context,
            results_dir,
        })
    }

    /// Full configuration.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Sub-configuration of the selected attack model.
    pub fn attack_config(&self) -> &AttackModelConfig {
        &self.attack_config
    }

    /// Input files.
    pub fn inputs(&self) -> &AttackInputs {
        &self.inputs
    }

    /// Run identity.
    pub fn context(&self) -> &AttackRunContext {
        &self.context
    }

    /// Directory all outputs of this run are written to.
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Name used for a bare score vector.
    pub fn default_method(&self) -> &str {
        self.config.attack_model.as_str()
    }

    /// Dataset provider over this run's input files.
    pub fn data_loader(&self) -> MembershipDataLoader {
        MembershipDataLoader {
            synthetic_file: self.inputs.synthetic_file.clone(),
            membership_test_file: self.inputs.membership_test_file.clone(),
            membership_lbl_file: self.inputs.membership_lbl_file.clone(),
            membership_label_col: self.config.dataset_config.membership_label_col.clone(),
            generator_model: self.config.generator_config.model_name.clone(),
            reference_file: self.inputs.reference_file.clone(),
        }
    }

    /// Evaluate with the default collaborators.
    pub fn evaluate_attack(
        &self,
        scores: impl Into<AttackScores>,
        labels: &LabelVector,
        report_name: &str,
    ) -> Result<EvaluationResultTable> {
        self.evaluate_attack_with(&EvaluationPipeline::default(), scores, labels, report_name)
    }

    /// Evaluate with a caller-supplied pipeline.
    ///
    /// A bare score vector is evaluated under the attack model's name.
    pub fn evaluate_attack_with(
        &self,
        pipeline: &EvaluationPipeline,
        scores: impl Into<AttackScores>,
        labels: &LabelVector,
        report_name: &str,
    ) -> Result<EvaluationResultTable> {
        let scores = scores.into().into_score_set(self.default_method());
        pipeline.run(&scores, labels, &self.results_dir, report_name)
    }

    /// Persist raw scores as `{method}_predictions.csv`.
    pub fn save_predictions(&self, scores: &ScoreSet) -> Result<Vec<PathBuf>> {
        predictions::save_predictions(
            &self.results_dir,
            scores,
            &self.config.dataset_config.membership_label_col,
        )
    }

    /// Recover scores saved by [`AttackSession::save_predictions`].
    pub fn load_predictions(&self) -> Result<ScoreSet> {
        predictions::load_predictions(&self.results_dir)
    }
}

/// A membership-inference attack variant.
pub trait MembershipInferenceAttack {
    /// Shared run state.
    fn session(&self) -> &AttackSession;

    /// Score every membership-test record, once per method.
    fn run_attack(&mut self) -> Result<ScoreSet>;

    /// Run the attack, persist its scores and evaluate them.
    fn run_and_evaluate(
        &mut self,
        labels: &LabelVector,
        report_name: &str,
    ) -> Result<EvaluationResultTable> {
        let scores = self.run_attack()?;
        self.session().save_predictions(&scores)?;
        self.session().evaluate_attack(scores, labels, report_name)
    }
}
