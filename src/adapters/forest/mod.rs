//! Random-forest adapter: Implementation of ChargeModel over a JSON artifact.
//!
//! The training pipeline exports the fitted forest as `model.json`:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "Medical Insurance RF Model",
//!   "features": ["age", "bmi", "children", "sex_male", "smoker_yes", "region_southeast"],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 4, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": 8400.0 },
//!         { "value": 32050.0 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Feature columns are the encoded form of the raw profile: numeric columns by
//! name and one-hot columns as `<field>_<value>`. A split sends a row left when
//! `x[feature] <= threshold`. The forest prediction is the mean over trees.
//!
//! # Integrity
//!
//! When a `manifest.json` sits next to the model (written by the `seal_model`
//! binary), the SHA-256 digest of `model.json` must match the manifest entry.
//! Set `MEDCHARGE_REQUIRE_MODEL_MANIFEST=true` to refuse unsealed models.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{PatientProfile, Region, Sex, Smoker};
use crate::ports::{ChargeModel, ModelError};

pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Only artifact layout this loader understands.
const FORMAT_VERSION: u32 = 1;

/// Sanity cap on encoded columns (3 numeric + 8 one-hot fit comfortably).
const MAX_FEATURES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub features: Vec<String>,
    pub trees: Vec<ExportedTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// SHA-256 digests of sealed files, keyed by file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    pub files: BTreeMap<String, String>,
}

/// An encoded feature column resolved against the profile fields.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    Age,
    Bmi,
    Children,
    Sex(Sex),
    Smoker(Smoker),
    Region(Region),
}

impl Column {
    fn parse(name: &str) -> Result<Self, ModelError> {
        let unsupported = || ModelError::UnsupportedFeature(name.to_string());
        match name {
            "age" => return Ok(Self::Age),
            "bmi" => return Ok(Self::Bmi),
            "children" => return Ok(Self::Children),
            _ => {}
        }

        let (field, value) = name.split_once('_').ok_or_else(unsupported)?;
        match field {
            "sex" => value.parse().map(Self::Sex).map_err(|_| unsupported()),
            "smoker" => value.parse().map(Self::Smoker).map_err(|_| unsupported()),
            "region" => value.parse().map(Self::Region).map_err(|_| unsupported()),
            _ => Err(unsupported()),
        }
    }

    fn value(&self, profile: &PatientProfile) -> f64 {
        let one_hot = |hit: bool| if hit { 1.0 } else { 0.0 };
        match *self {
            Self::Age => f64::from(profile.age),
            Self::Bmi => profile.bmi,
            Self::Children => f64::from(profile.children),
            Self::Sex(sex) => one_hot(profile.sex == sex),
            Self::Smoker(smoker) => one_hot(profile.smoker == smoker),
            Self::Region(region) => one_hot(profile.region == region),
        }
    }
}

/// Random-forest regressor loaded from a JSON artifact.
#[derive(Debug)]
pub struct ForestModel {
    name: String,
    columns: Vec<Column>,
    trees: Vec<ExportedTree>,
    source: PathBuf,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl ForestModel {
    /// Load `model.json` from a directory, or a model file given directly.
    ///
    /// # Errors
    /// Returns error if the artifact is missing, malformed, references unknown
    /// feature columns, or fails the manifest digest check.
    pub fn load(model_path: &Path, require_manifest: bool) -> Result<Self, ModelError> {
        let (base_dir, model_file) = if model_path.is_dir() {
            (model_path.to_path_buf(), model_path.join(MODEL_FILE))
        } else {
            let parent = model_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            (parent, model_path.to_path_buf())
        };

        if !model_file.exists() {
            return Err(ModelError::NotFound(format!("{}", model_file.display())));
        }

        let bytes = std::fs::read(&model_file)
            .map_err(|e| ModelError::InvalidArtifact(format!("Failed to read model: {e}")))?;

        Self::verify_manifest(&base_dir, &model_file, &bytes, require_manifest)?;

        let exported: ExportedForest = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;
        let model = Self::from_exported(exported, model_file)?;

        tracing::info!(
            "Loaded model {:?} from {:?} (trees={}, n_features={})",
            model.name,
            model.source,
            model.tree_count(),
            model.columns.len()
        );

        Ok(model)
    }

    /// Build a model from an already-parsed artifact.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidArtifact` for structural problems and
    /// `ModelError::UnsupportedFeature` for unknown columns.
    pub fn from_exported(exported: ExportedForest, source: PathBuf) -> Result<Self, ModelError> {
        if exported.format_version != FORMAT_VERSION {
            return Err(ModelError::InvalidArtifact(format!(
                "Unsupported format_version {} (expected {FORMAT_VERSION})",
                exported.format_version
            )));
        }

        let n = exported.features.len();
        if n == 0 || n > MAX_FEATURES {
            return Err(ModelError::InvalidArtifact(format!(
                "Invalid feature count in model: got {n}, max {MAX_FEATURES}"
            )));
        }
        let columns = exported
            .features
            .iter()
            .map(|name| Column::parse(name))
            .collect::<Result<Vec<_>, _>>()?;

        if exported.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("Model contains no trees".into()));
        }
        for (t, tree) in exported.trees.iter().enumerate() {
            Self::validate_tree(t, tree, n)?;
        }

        Ok(Self {
            name: exported
                .name
                .unwrap_or_else(|| "random forest".to_string()),
            columns,
            trees: exported.trees,
            source,
        })
    }

    /// Children must point forward inside the tree, so every walk terminates.
    fn validate_tree(t: usize, tree: &ExportedTree, n_features: usize) -> Result<(), ModelError> {
        let len = tree.nodes.len();
        if len == 0 {
            return Err(ModelError::InvalidArtifact(format!("Tree {t} has no nodes")));
        }

        for (i, node) in tree.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(ModelError::InvalidArtifact(format!(
                            "Tree {t} node {i}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "Tree {t} node {i}: threshold is not finite"
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= len {
                            return Err(ModelError::InvalidArtifact(format!(
                                "Tree {t} node {i}: child index {child} must be in ({i}, {len})"
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "Tree {t} node {i}: leaf value is not finite"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn verify_manifest(
        base_dir: &Path,
        model_file: &Path,
        model_bytes: &[u8],
        require_manifest: bool,
    ) -> Result<(), ModelError> {
        let manifest_path = base_dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            if require_manifest {
                return Err(ModelError::Integrity(format!(
                    "{MANIFEST_FILE} missing in {} and unsealed models are not allowed",
                    base_dir.display()
                )));
            }
            tracing::warn!("No {} next to model, skipping digest check", MANIFEST_FILE);
            return Ok(());
        }

        let content = std::fs::read(&manifest_path)
            .map_err(|e| ModelError::Integrity(format!("Failed to read manifest: {e}")))?;
        let manifest: ModelManifest = serde_json::from_slice(&content)
            .map_err(|e| ModelError::Integrity(format!("Invalid manifest format: {e}")))?;

        let file_name = model_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(MODEL_FILE);
        let expected = manifest.files.get(file_name).ok_or_else(|| {
            ModelError::Integrity(format!("{MANIFEST_FILE} does not list {file_name}"))
        })?;

        let actual = sha256_hex(model_bytes);
        if !constant_time_eq_str(&actual, &expected.to_ascii_lowercase()) {
            return Err(ModelError::Integrity(format!(
                "SHA-256 mismatch for {file_name}"
            )));
        }

        tracing::debug!("Model digest verified against {}", MANIFEST_FILE);
        Ok(())
    }

    fn predict_tree(&self, tree: &ExportedTree, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match tree.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Encode a profile into the model's column order.
    fn encode(&self, profile: &PatientProfile) -> Vec<f64> {
        self.columns.iter().map(|c| c.value(profile)).collect()
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl ChargeModel for ForestModel {
    fn predict(&self, profile: &PatientProfile) -> Result<f64, ModelError> {
        let row = self.encode(profile);
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| self.predict_tree(tree, &row))
            .sum();
        let prediction = total / self.trees.len() as f64;

        if !prediction.is_finite() {
            return Err(ModelError::Prediction(format!(
                "Non-finite prediction from {}",
                self.name
            )));
        }
        Ok(prediction)
    }

    fn describe(&self) -> String {
        format!("{} ({} trees)", self.name, self.tree_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn profile(smoker: Smoker, age: u8) -> PatientProfile {
        PatientProfile {
            age,
            sex: Sex::Male,
            bmi: 27.5,
            children: 1,
            smoker,
            region: Region::Southeast,
        }
    }

    fn sample_forest() -> ExportedForest {
        ExportedForest {
            format_version: 1,
            name: Some("test forest".into()),
            features: vec!["age".into(), "smoker_yes".into(), "region_southeast".into()],
            trees: vec![
                ExportedTree {
                    nodes: vec![
                        Node::Split {
                            feature: 1,
                            threshold: 0.5,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: 10_000.0 },
                        Node::Leaf { value: 30_000.0 },
                    ],
                },
                ExportedTree {
                    nodes: vec![
                        Node::Split {
                            feature: 0,
                            threshold: 40.0,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: 6_000.0 },
                        Node::Leaf { value: 14_000.0 },
                    ],
                },
            ],
        }
    }

    fn write_model(dir: &Path, forest: &ExportedForest) -> Vec<u8> {
        let bytes = serde_json::to_vec(forest).expect("serialize forest");
        std::fs::write(dir.join(MODEL_FILE), &bytes).expect("write model");
        bytes
    }

    fn write_manifest(dir: &Path, digest: String) {
        let manifest = ModelManifest {
            version: 1,
            created_at: None,
            files: BTreeMap::from([(MODEL_FILE.to_string(), digest)]),
        };
        let bytes = serde_json::to_vec(&manifest).expect("serialize manifest");
        std::fs::write(dir.join(MANIFEST_FILE), bytes).expect("write manifest");
    }

    #[test]
    fn test_prediction_is_mean_of_trees() {
        let model = ForestModel::from_exported(sample_forest(), PathBuf::from("mem"))
            .expect("valid forest");

        let smoker = model.predict(&profile(Smoker::Yes, 50)).expect("predict");
        assert!((smoker - 22_000.0).abs() < f64::EPSILON);

        let non_smoker = model.predict(&profile(Smoker::No, 30)).expect("predict");
        assert!((non_smoker - 8_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_split_sends_equal_values_left() {
        let model = ForestModel::from_exported(sample_forest(), PathBuf::from("mem"))
            .expect("valid forest");
        // age == threshold goes left in the second tree.
        let at_threshold = model.predict(&profile(Smoker::No, 40)).expect("predict");
        assert!((at_threshold - 8_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!(Column::parse("bmi").unwrap(), Column::Bmi);
        assert_eq!(Column::parse("sex_female").unwrap(), Column::Sex(Sex::Female));
        assert_eq!(
            Column::parse("region_northwest").unwrap(),
            Column::Region(Region::Northwest)
        );
        assert!(matches!(
            Column::parse("income"),
            Err(ModelError::UnsupportedFeature(_))
        ));
        assert!(Column::parse("region_midwest").is_err());
    }

    #[test]
    fn test_rejects_backward_child_index() {
        let mut forest = sample_forest();
        forest.trees[0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        let err = ForestModel::from_exported(forest, PathBuf::from("mem")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_rejects_empty_forest_and_bad_feature_index() {
        let mut empty = sample_forest();
        empty.trees.clear();
        assert!(ForestModel::from_exported(empty, PathBuf::from("mem")).is_err());

        let mut bad_feature = sample_forest();
        bad_feature.trees[1].nodes[0] = Node::Split {
            feature: 9,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(ForestModel::from_exported(bad_feature, PathBuf::from("mem")).is_err());
    }

    #[test]
    fn test_load_unsealed_model_from_dir() {
        let temp = tempdir().expect("tempdir");
        write_model(temp.path(), &sample_forest());

        let model = ForestModel::load(temp.path(), false).expect("load model");
        assert_eq!(model.tree_count(), 2);
        assert_eq!(model.describe(), "test forest (2 trees)");

        let err = ForestModel::load(temp.path(), true).unwrap_err();
        assert!(matches!(err, ModelError::Integrity(_)));
    }

    #[test]
    fn test_load_model_file_directly() {
        let temp = tempdir().expect("tempdir");
        write_model(temp.path(), &sample_forest());
        let model = ForestModel::load(&temp.path().join(MODEL_FILE), false).expect("load model");
        assert_eq!(model.tree_count(), 2);
    }

    #[test]
    fn test_load_sealed_model_checks_digest() {
        let temp = tempdir().expect("tempdir");
        let bytes = write_model(temp.path(), &sample_forest());

        write_manifest(temp.path(), sha256_hex(&bytes));
        assert!(ForestModel::load(temp.path(), true).is_ok());

        write_manifest(temp.path(), sha256_hex(b"something else"));
        let err = ForestModel::load(temp.path(), false).unwrap_err();
        assert!(matches!(err, ModelError::Integrity(_)));
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let err = ForestModel::load(temp.path(), false).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_untagged_node_json() {
        let json = r#"{"format_version":1,"features":["bmi"],
            "trees":[{"nodes":[{"feature":0,"threshold":30.0,"left":1,"right":2},
                               {"value":5000.0},{"value":9000.0}]}]}"#;
        let exported: ExportedForest = serde_json::from_str(json).expect("parse");
        let model = ForestModel::from_exported(exported, PathBuf::from("mem")).expect("valid");
        assert_eq!(model.describe(), "random forest (1 trees)");
    }
}
