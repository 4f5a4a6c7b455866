//! Typed audit configuration.
//!
//! The configuration names the directory roots, the dataset and generator
//! under audit, and the selected attack model. Each known attack model has
//! its own sub-section (`<model>_config`) whose parameters belong to the
//! attack variant; the section matching the selected model must be
//! present, which [`AuditConfig::validate`] checks at load time.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{MiaError, Result};

/// Directory roots used to derive output locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirList {
    /// Home directory all other roots are relative to.
    pub home: PathBuf,
    /// Results root for attack outputs, relative to `home`.
    pub mia_files: PathBuf,
}

/// Dataset metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name.
    pub name: String,
    /// Column holding membership labels in the label file.
    pub membership_label_col: String,
}

/// Metadata of the generator that produced the synthetic data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generator model name.
    pub model_name: String,
    /// Generator experiment name.
    pub experiment_name: String,
}

/// Known attack models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackModel {
    /// Density-based attack contrasting synthetic and reference densities.
    Domias,
    /// Discriminator-based attack against generative models.
    Logan,
    /// Distance to the closest synthetic record.
    Dcr,
    /// Monte-Carlo neighbourhood counting.
    Mc,
}

impl AttackModel {
    /// Identifier as written in configuration files and output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domias => "domias",
            Self::Logan => "logan",
            Self::Dcr => "dcr",
            Self::Mc => "mc",
        }
    }

    /// Name of the configuration section this model reads.
    pub fn section_name(&self) -> String {
        format!("{}_config", self.as_str())
    }
}

impl fmt::Display for AttackModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one attack-model section, passed through to the attack
/// variant without interpretation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackParams(Mapping);

impl AttackParams {
    /// Empty parameter section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the section for chaining.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.0.insert(Value::String(key.into()), value.into());
        self
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserialize the value under `key`, if present.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|v| {
                serde_yaml::from_value(v.clone())
                    .map_err(|e| MiaError::config(format!("invalid value for '{key}': {e}")))
            })
            .transpose()
    }

    /// Deserialize the whole section into an attack's own parameter type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(Value::Mapping(self.0.clone()))
            .map_err(|e| MiaError::config(format!("invalid attack parameters: {e}")))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the section has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying YAML mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for AttackParams {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Section resolved for the selected attack model.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackModelConfig {
    /// Attack model the section belongs to.
    pub model: AttackModel,
    /// Its parameters.
    pub params: AttackParams,
}

/// Full audit configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Directory roots.
    pub dir_list: DirList,
    /// Dataset metadata.
    pub dataset_config: DatasetConfig,
    /// Generator metadata.
    pub generator_config: GeneratorConfig,
    /// Selected attack model.
    pub attack_model: AttackModel,
    /// Density-based attack section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domias_config: Option<AttackParams>,
    /// Discriminator-based attack section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logan_config: Option<AttackParams>,
    /// Closest-record attack section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcr_config: Option<AttackParams>,
    /// Monte-Carlo attack section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc_config: Option<AttackParams>,
}

impl AuditConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| MiaError::config(format!("failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MiaError::missing(path));
        }
        let text = std::fs::read_to_string(path).map_err(|e| MiaError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    /// Serialize back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MiaError::config(format!("failed to serialize configuration: {e}")))
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_config.name.is_empty() {
            return Err(MiaError::config("dataset_config.name must be non-empty"));
        }
        if self.dataset_config.membership_label_col.is_empty() {
            return Err(MiaError::config(
                "dataset_config.membership_label_col must be non-empty",
            ));
        }
        self.attack_config().map(|_| ())
    }

    /// Sub-configuration of the selected attack model.
    pub fn attack_config(&self) -> Result<AttackModelConfig> {
        let section = match self.attack_model {
            AttackModel::Domias => &self.domias_config,
            AttackModel::Logan => &self.logan_config,
            AttackModel::Dcr => &self.dcr_config,
            AttackModel::Mc => &self.mc_config,
        };
        let params = section.clone().ok_or_else(|| {
            MiaError::config(format!(
                "no config found for attack model '{}' (expected section '{}')",
                self.attack_model,
                self.attack_model.section_name()
            ))
        })?;
        Ok(AttackModelConfig {
            model: self.attack_model,
            params,
        })
    }

    /// Root all attack outputs are nested under (`home/mia_files`).
    pub fn results_root(&self) -> PathBuf {
        self.dir_list.home.join(&self.dir_list.mia_files)
    }
}
