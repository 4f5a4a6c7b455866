use mia_audit::{synthetic_scores, EvaluationPipeline, ScoreSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

fn main() -> mia_audit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let (strong, labels) = synthetic_scores(&mut rng, 2.0, 200, 200)?;
    let (weak, _) = synthetic_scores(&mut rng, 0.3, 200, 200)?;
    let scores = ScoreSet::single("strong", strong).with("weak", weak)?;

    let out = tempfile::tempdir().map_err(|e| mia_audit::MiaError::io(".", e))?;
    let table = EvaluationPipeline::default().run(&scores, &labels, out.path(), "eval.csv")?;
    for result in &table {
        let r = &result.record;
        tracing::info!(
            method = %result.method,
            aucroc = r.aucroc,
            tpr_at_fpr_01 = r.tpr_at_fpr_01,
            f1_best = r.f1_best,
            "evaluated"
        );
    }
    println!("{}", std::fs::read_to_string(out.path().join("eval.csv")).unwrap_or_default());
    Ok(())
}
