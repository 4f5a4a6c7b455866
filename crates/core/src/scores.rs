//! Score and label containers shared by attacks and the metric engine.

use crate::error::{MiaError, Result};

/// Per-record attacker confidence scores for one attack method.
pub type ScoreVector = Vec<f64>;

/// Ground-truth membership indicators, aligned positionally with scores.
///
/// Every entry is 0 (non-member) or 1 (member); the vector is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelVector {
    values: Vec<u8>,
}

impl LabelVector {
    /// Validate and wrap raw 0/1 indicators.
    pub fn new(values: Vec<u8>) -> Result<Self> {
        if values.is_empty() {
            return Err(MiaError::invalid("label vector must be non-empty"));
        }
        if let Some((idx, v)) = values.iter().enumerate().find(|(_, &v)| v > 1) {
            return Err(MiaError::invalid(format!(
                "label at index {idx} is {v}; labels must be 0 or 1"
            )));
        }
        Ok(Self { values })
    }

    /// Build from boolean membership flags.
    pub fn from_bools(flags: &[bool]) -> Result<Self> {
        Self::new(flags.iter().map(|&b| u8::from(b)).collect())
    }

    /// Build from real-valued labels as they appear in tabular files.
    ///
    /// Only exact `0.0` and `1.0` are accepted.
    pub fn from_reals(values: &[f64]) -> Result<Self> {
        let mut out = Vec::with_capacity(values.len());
        for (idx, &v) in values.iter().enumerate() {
            if v == 0.0 {
                out.push(0);
            } else if v == 1.0 {
                out.push(1);
            } else {
                return Err(MiaError::invalid(format!(
                    "label at index {idx} is {v}; labels must be 0 or 1"
                )));
            }
        }
        Self::new(out)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed vector.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw indicators.
    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    /// Membership of record `idx`.
    pub fn is_member(&self, idx: usize) -> bool {
        self.values[idx] == 1
    }

    /// Iterate membership flags in record order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.values.iter().map(|&v| v == 1)
    }

    /// Number of members (label 1).
    pub fn num_members(&self) -> usize {
        self.values.iter().filter(|&&v| v == 1).count()
    }

    /// True when only one class is present.
    pub fn is_single_class(&self) -> bool {
        let members = self.num_members();
        members == 0 || members == self.values.len()
    }
}

impl TryFrom<Vec<u8>> for LabelVector {
    type Error = MiaError;

    fn try_from(values: Vec<u8>) -> Result<Self> {
        Self::new(values)
    }
}

/// Insertion-ordered mapping from method name to score vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreSet {
    entries: Vec<(String, ScoreVector)>,
}

impl ScoreSet {
    /// Empty score set.
    pub fn new() -> Self {
        Self::default()
    }

    /// One-entry score set.
    pub fn single<S: Into<String>>(method: S, scores: ScoreVector) -> Self {
        Self {
            entries: vec![(method.into(), scores)],
        }
    }

    /// Add a method; method names must be unique.
    pub fn insert<S: Into<String>>(&mut self, method: S, scores: ScoreVector) -> Result<()> {
        let method = method.into();
        if self.contains(&method) {
            return Err(MiaError::invalid(format!(
                "duplicate method name '{method}' in score set"
            )));
        }
        self.entries.push((method, scores));
        Ok(())
    }

    /// Builder-style [`ScoreSet::insert`].
    pub fn with<S: Into<String>>(mut self, method: S, scores: ScoreVector) -> Result<Self> {
        self.insert(method, scores)?;
        Ok(self)
    }

    /// True if `method` is present.
    pub fn contains(&self, method: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == method)
    }

    /// Scores for `method`.
    pub fn get(&self, method: &str) -> Option<&ScoreVector> {
        self.entries
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, scores)| scores)
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no method is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Method names in insertion order.
    pub fn methods(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(method, scores)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.entries
            .iter()
            .map(|(name, scores)| (name.as_str(), scores.as_slice()))
    }
}

impl IntoIterator for ScoreSet {
    type Item = (String, ScoreVector);
    type IntoIter = std::vec::IntoIter<(String, ScoreVector)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Scores handed to an evaluation: a bare vector or a named set.
#[derive(Clone, Debug, PartialEq)]
pub enum AttackScores {
    /// One unnamed score vector.
    Single(ScoreVector),
    /// Named score vectors.
    Set(ScoreSet),
}

impl AttackScores {
    /// Normalize into a score set, naming a bare vector `default_method`.
    pub fn into_score_set(self, default_method: &str) -> ScoreSet {
        match self {
            Self::Single(scores) => ScoreSet::single(default_method, scores),
            Self::Set(set) => set,
        }
    }
}

impl From<ScoreVector> for AttackScores {
    fn from(scores: ScoreVector) -> Self {
        Self::Single(scores)
    }
}

impl From<ScoreSet> for AttackScores {
    fn from(set: ScoreSet) -> Self {
        Self::Set(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn labels_reject_values_outside_zero_one() {
        assert!(LabelVector::new(vec![0, 1, 2]).is_err());
        assert!(LabelVector::new(Vec::new()).is_err());
        assert!(LabelVector::from_reals(&[1.0, 0.5]).is_err());
    }

    #[test]
    fn labels_from_reals_and_bools_agree() {
        let a = LabelVector::from_reals(&[1.0, 0.0, 1.0]).unwrap();
        let b = LabelVector::from_bools(&[true, false, true]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_members(), 2);
        assert!(!a.is_single_class());
    }

    #[test]
    fn score_set_preserves_insertion_order() {
        let set = ScoreSet::new()
            .with("zeta", vec![0.1])
            .and_then(|s| s.with("alpha", vec![0.2]))
            .unwrap();
        let names: Vec<&str> = set.methods().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn score_set_rejects_duplicates() {
        let mut set = ScoreSet::single("m", vec![0.5]);
        let err = set.insert("m", vec![0.6]).unwrap_err();
        assert!(matches!(err, MiaError::InvalidInput { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bare_vector_normalizes_under_default_name() {
        let scores: AttackScores = vec![0.3, 0.7].into();
        let set = scores.into_score_set("domias");
        assert_eq!(set.get("domias"), Some(&vec![0.3, 0.7]));
    }

    proptest! {
        #[test]
        fn bool_labels_count_members(flags in prop::collection::vec(any::<bool>(), 1..64)) {
            let labels = LabelVector::from_bools(&flags).unwrap();
            let expected = flags.iter().filter(|&&f| f).count();
            prop_assert_eq!(labels.num_members(), expected);
            prop_assert_eq!(labels.iter().collect::<Vec<_>>(), flags);
        }
    }
}
