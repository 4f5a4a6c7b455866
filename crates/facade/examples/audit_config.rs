use mia_audit::AuditConfig;

const CONFIG: &str = r#"
dir_list:
  home: /tmp/mia_demo
  mia_files: results
dataset_config:
  name: adult
  membership_label_col: is_member
generator_config:
  model_name: ctgan
  experiment_name: baseline
attack_model: mc
mc_config:
  epsilon_quantile: 0.02
"#;

fn main() -> mia_audit::Result<()> {
    let config = AuditConfig::from_yaml_str(CONFIG)?;
    let section = config.attack_config()?;
    let quantile: Option<f64> = section.params.get_as("epsilon_quantile")?;
    println!(
        "{}: {} parameter(s), epsilon_quantile={quantile:?}",
        section.model,
        section.params.len()
    );
    println!("results under {}", config.results_root().display());
    print!("{}", config.to_yaml_string()?);
    Ok(())
}
