//! Gradient-Boosted Tree Ensemble
//! Reads a regression booster serialized as JSON and evaluates it on one record.
//!
//! Two layouts are understood: the native model file (`save_model("model.json")`)
//! and the JSON tree dump (`dump_model(..., dump_format="json")`).

use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("No model file found (tried {0})")]
    NotFound(String),
    #[error("Failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unrecognized model format. As a model file: {native}. As a tree dump: {dump}")]
    Parse { native: String, dump: String },
    #[error("Invalid model: {0}")]
    Invalid(String),
    #[error("Model expects feature '{0}', which is not among the inputs")]
    FeatureMismatch(String),
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// Which serialized layout a booster came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Native,
    TreeDump,
}

impl std::fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelFormat::Native => write!(f, "XGBoost model JSON"),
            ModelFormat::TreeDump => write!(f, "XGBoost tree dump"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        missing_left: bool,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid("empty tree".into()));
        }
        for node in &self.nodes {
            if let Node::Split { left, right, .. } = node {
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(ModelError::Invalid(format!(
                        "child index out of range in a tree of {} nodes",
                        self.nodes.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. `row` is indexed by model feature.
    fn leaf_value(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0;
        // A path never visits more nodes than the tree has.
        for _ in 0..=self.nodes.len() {
            match &self.nodes[idx] {
                Node::Leaf(value) => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x.is_nan() {
                        if *missing_left {
                            *left
                        } else {
                            *right
                        }
                    } else if (x as f32) < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(ModelError::Invalid("cycle in tree".into()))
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf(_) => None,
            })
            .max()
    }
}

// ---------------------------------------------------------------------------
// Native model layout
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NativeModel {
    learner: NativeLearner,
}

#[derive(Deserialize)]
struct NativeLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    learner_model_param: LearnerModelParam,
    gradient_booster: GradientBooster,
    #[serde(default)]
    objective: Option<Objective>,
}

#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Deserialize)]
struct Objective {
    name: String,
}

#[derive(Deserialize)]
struct GradientBooster {
    model: TreeModel,
}

#[derive(Deserialize)]
struct TreeModel {
    trees: Vec<NativeTree>,
}

/// Older files store flags as 0/1, newer ones as booleans.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Deserialize)]
struct NativeTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
}

impl NativeTree {
    fn into_tree(self) -> Result<Tree, ModelError> {
        let n = self.left_children.len();
        if self.right_children.len() != n
            || self.split_indices.len() != n
            || self.split_conditions.len() != n
            || self.default_left.len() != n
        {
            return Err(ModelError::Invalid("tree arrays differ in length".into()));
        }

        let nodes = (0..n)
            .map(|i| {
                if self.left_children[i] < 0 {
                    return Ok(Node::Leaf(self.split_conditions[i]));
                }
                let to_index = |v: i64| {
                    usize::try_from(v)
                        .map_err(|_| ModelError::Invalid(format!("negative index {} at node {}", v, i)))
                };
                Ok(Node::Split {
                    feature: to_index(self.split_indices[i])?,
                    threshold: self.split_conditions[i] as f32,
                    left: to_index(self.left_children[i])?,
                    right: to_index(self.right_children[i])?,
                    missing_left: self.default_left[i].is_set(),
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(Tree { nodes })
    }
}

/// `base_score` is a decimal string, bracketed as a vector in recent releases.
fn parse_base_score(raw: &str) -> Result<f64, ModelError> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = inner.split(',').next().unwrap_or("").trim();
    first
        .parse::<f64>()
        .map_err(|_| ModelError::Invalid(format!("unreadable base_score '{}'", raw)))
}

// ---------------------------------------------------------------------------
// Tree dump layout
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum SplitRef {
    Index(usize),
    Name(String),
}

#[derive(Deserialize)]
struct DumpNode {
    nodeid: usize,
    #[serde(default)]
    leaf: Option<f64>,
    #[serde(default)]
    split: Option<SplitRef>,
    #[serde(default)]
    split_condition: Option<f64>,
    #[serde(default)]
    yes: Option<usize>,
    #[serde(default)]
    no: Option<usize>,
    #[serde(default)]
    missing: Option<usize>,
    #[serde(default)]
    children: Vec<DumpNode>,
}

/// `f12` style reference used when the dump has no feature map.
fn anonymous_index(name: &str) -> Option<usize> {
    name.strip_prefix('f').and_then(|rest| rest.parse().ok())
}

/// Resolves split references to feature indices across all dumped trees.
#[derive(Default)]
struct DumpFeatures {
    named: bool,
    names: Vec<String>,
}

impl DumpFeatures {
    fn collect(roots: &[DumpNode]) -> Self {
        fn visit(node: &DumpNode, named: &mut bool) {
            if let Some(SplitRef::Name(name)) = &node.split {
                if anonymous_index(name).is_none() {
                    *named = true;
                }
            }
            for child in &node.children {
                visit(child, named);
            }
        }

        let mut named = false;
        for root in roots {
            visit(root, &mut named);
        }
        Self {
            named,
            names: Vec::new(),
        }
    }

    fn resolve(&mut self, split: &SplitRef) -> Result<usize, ModelError> {
        match split {
            SplitRef::Index(i) if !self.named => Ok(*i),
            SplitRef::Name(name) if !self.named => anonymous_index(name)
                .ok_or_else(|| ModelError::Invalid(format!("bad split reference '{}'", name))),
            SplitRef::Index(i) => Err(ModelError::Invalid(format!(
                "numeric split {} mixed with named splits",
                i
            ))),
            SplitRef::Name(name) => match self.names.iter().position(|n| n == name) {
                Some(i) => Ok(i),
                None => {
                    self.names.push(name.clone());
                    Ok(self.names.len() - 1)
                }
            },
        }
    }
}

fn flatten_dump(root: &DumpNode, features: &mut DumpFeatures) -> Result<Tree, ModelError> {
    let mut order: Vec<&DumpNode> = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(node.children.iter().rev());
    }

    let positions: HashMap<usize, usize> = order
        .iter()
        .enumerate()
        .map(|(pos, node)| (node.nodeid, pos))
        .collect();
    let lookup = |id: usize| {
        positions
            .get(&id)
            .copied()
            .ok_or_else(|| ModelError::Invalid(format!("unknown node id {}", id)))
    };

    let nodes = order
        .iter()
        .map(|node| {
            if let Some(value) = node.leaf {
                return Ok(Node::Leaf(value));
            }
            match (&node.split, node.split_condition, node.yes, node.no) {
                (Some(split), Some(threshold), Some(yes), Some(no)) => Ok(Node::Split {
                    feature: features.resolve(split)?,
                    threshold: threshold as f32,
                    left: lookup(yes)?,
                    right: lookup(no)?,
                    missing_left: node.missing.map_or(true, |m| m == yes),
                }),
                _ => Err(ModelError::Invalid(format!(
                    "node {} is neither a leaf nor a complete split",
                    node.nodeid
                ))),
            }
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    Ok(Tree { nodes })
}

// ---------------------------------------------------------------------------
// Booster
// ---------------------------------------------------------------------------

/// A loaded tree ensemble. Immutable and shared read-only once built.
#[derive(Debug, Clone)]
pub struct Booster {
    base_score: f64,
    trees: Vec<Tree>,
    feature_names: Option<Vec<String>>,
    declared_features: Option<usize>,
    format: ModelFormat,
    source: Option<PathBuf>,
}

impl Booster {
    /// Read and parse a model file.
    pub fn load(path: &Path, dump_base_score: f64) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut booster = Self::from_json_str(&text, dump_base_score)?;
        booster.source = Some(path.to_path_buf());

        info!(
            "Loaded {} from {}: {} trees, base score {}",
            booster.format,
            path.display(),
            booster.tree_count(),
            booster.base_score
        );
        Ok(booster)
    }

    /// Parse the native layout, falling back to the tree dump.
    pub fn from_json_str(text: &str, dump_base_score: f64) -> Result<Self, ModelError> {
        let native = match Self::from_native(text) {
            Ok(booster) => return Ok(booster),
            Err(e) => e.to_string(),
        };
        match Self::from_dump(text, dump_base_score) {
            Ok(booster) => Ok(booster),
            Err(e) => Err(ModelError::Parse {
                native,
                dump: e.to_string(),
            }),
        }
    }

    fn from_native(text: &str) -> Result<Self, ModelError> {
        let model: NativeModel = serde_json::from_str(text)
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        let learner = model.learner;

        if let Some(objective) = &learner.objective {
            if !objective.name.starts_with("reg:squarederror") && objective.name != "reg:linear" {
                warn!(
                    "Objective '{}' is evaluated as a raw margin",
                    objective.name
                );
            }
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;
        let declared_features = learner
            .learner_model_param
            .num_feature
            .as_deref()
            .and_then(|n| n.trim().parse::<usize>().ok());

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .map(NativeTree::into_tree)
            .collect::<Result<Vec<_>, _>>()?;

        let feature_names = if learner.feature_names.is_empty() {
            None
        } else {
            Some(learner.feature_names)
        };

        Self::build(
            base_score,
            trees,
            feature_names,
            declared_features,
            ModelFormat::Native,
        )
    }

    fn from_dump(text: &str, base_score: f64) -> Result<Self, ModelError> {
        let roots: Vec<DumpNode> = serde_json::from_str(text)
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        if roots.is_empty() {
            return Err(ModelError::Invalid("dump contains no trees".into()));
        }

        let mut features = DumpFeatures::collect(&roots);
        let trees = roots
            .iter()
            .map(|root| flatten_dump(root, &mut features))
            .collect::<Result<Vec<_>, _>>()?;

        let feature_names = features.named.then_some(features.names);
        Self::build(base_score, trees, feature_names, None, ModelFormat::TreeDump)
    }

    fn build(
        base_score: f64,
        trees: Vec<Tree>,
        feature_names: Option<Vec<String>>,
        declared_features: Option<usize>,
        format: ModelFormat,
    ) -> Result<Self, ModelError> {
        for tree in &trees {
            tree.validate()?;
        }

        let booster = Self {
            base_score,
            trees,
            feature_names,
            declared_features,
            format,
            source: None,
        };

        if let Some(max) = booster.max_feature() {
            let known = booster
                .feature_names
                .as_ref()
                .map(|n| n.len())
                .or(booster.declared_features);
            if let Some(known) = known {
                if max >= known {
                    return Err(ModelError::Invalid(format!(
                        "split on feature {} but only {} features are declared",
                        max, known
                    )));
                }
            }
        }
        Ok(booster)
    }

    fn max_feature(&self) -> Option<usize> {
        self.trees.iter().filter_map(Tree::max_feature).max()
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn format(&self) -> ModelFormat {
        self.format
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// For each model feature, the position of the matching input.
    /// Named models bind by name; anonymous ones by position.
    pub fn bind(&self, inputs: &[&str]) -> Result<Vec<usize>, ModelError> {
        if let Some(names) = &self.feature_names {
            return names
                .iter()
                .map(|name| {
                    inputs
                        .iter()
                        .position(|input| input == name)
                        .ok_or_else(|| ModelError::FeatureMismatch(name.clone()))
                })
                .collect();
        }

        match self.declared_features {
            Some(expected) if expected != inputs.len() => Err(ModelError::FeatureCount {
                expected,
                actual: inputs.len(),
            }),
            _ => {
                let needed = self.max_feature().map_or(0, |m| m + 1);
                if needed > inputs.len() {
                    return Err(ModelError::FeatureCount {
                        expected: needed,
                        actual: inputs.len(),
                    });
                }
                Ok((0..inputs.len()).collect())
            }
        }
    }

    /// Raw margin: base score plus the leaf value of every tree.
    /// `row` is in model feature order (see [`Booster::bind`]).
    pub fn predict_margin(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.leaf_value(row)?;
        }
        Ok(margin)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two trees: a stump on LotArea at 1000 (0.1 / 0.3, missing left) and a constant 0.05.
    pub(crate) const NATIVE_MODEL: &str = r#"{
        "learner": {
            "feature_names": ["LotArea", "OverallQual", "YearRemodAdd", "TotalBsmtSF",
                "1stFlrSF", "GrLivArea", "FullBath", "TotRmsAbvGrd", "GarageYrBlt",
                "GarageCars", "GarageArea", "YrSold"],
            "learner_model_param": {"base_score": "1.1E1", "num_feature": "12"},
            "objective": {"name": "reg:squarederror"},
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "trees": [
                        {
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [0, 0, 0],
                            "split_conditions": [1000.0, 0.1, 0.3],
                            "default_left": [1, 0, 0]
                        },
                        {
                            "left_children": [-1],
                            "right_children": [-1],
                            "split_indices": [0],
                            "split_conditions": [0.05],
                            "default_left": [false]
                        }
                    ]
                }
            }
        },
        "version": [2, 0, 3]
    }"#;

    const DUMP_MODEL: &str = r#"[
        {"nodeid": 0, "depth": 0, "split": "GrLivArea", "split_condition": 2000,
         "yes": 1, "no": 2, "missing": 2,
         "children": [{"nodeid": 1, "leaf": -0.2}, {"nodeid": 2, "leaf": 0.4}]}
    ]"#;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn native_model_sums_leaves_over_base_score() {
        let booster = Booster::from_json_str(NATIVE_MODEL, 0.5).unwrap();
        assert_eq!(booster.format(), ModelFormat::Native);
        assert_eq!(booster.tree_count(), 2);
        assert_eq!(booster.base_score(), 11.0);

        let mut row = vec![0.0; 12];
        row[0] = 300.0;
        assert!(close(booster.predict_margin(&row).unwrap(), 11.15));

        row[0] = 1000.0;
        assert!(close(booster.predict_margin(&row).unwrap(), 11.35));

        row[0] = f64::NAN;
        assert!(close(booster.predict_margin(&row).unwrap(), 11.15));
    }

    #[test]
    fn bracketed_base_score() {
        assert_eq!(parse_base_score("[1.2016E1]").unwrap(), 12.016);
        assert_eq!(parse_base_score("5E-1").unwrap(), 0.5);
        assert!(parse_base_score("abc").is_err());
    }

    #[test]
    fn named_model_binds_by_name() {
        let booster = Booster::from_json_str(NATIVE_MODEL, 0.5).unwrap();
        let mut inputs = crate::model::features::FEATURE_NAMES.to_vec();
        inputs.swap(0, 1);
        let binding = booster.bind(&inputs).unwrap();
        assert_eq!(binding[0], 1);
        assert_eq!(binding[1], 0);

        let err = booster.bind(&["OverallQual"]).unwrap_err();
        assert!(matches!(err, ModelError::FeatureMismatch(name) if name == "LotArea"));
    }

    #[test]
    fn anonymous_model_checks_feature_count() {
        let mut value: serde_json::Value = serde_json::from_str(NATIVE_MODEL).unwrap();
        value["learner"]
            .as_object_mut()
            .unwrap()
            .remove("feature_names");
        let text = value.to_string();
        let booster = Booster::from_json_str(&text, 0.5).unwrap();
        assert!(booster.feature_names().is_none());
        assert_eq!(booster.bind(&crate::model::features::FEATURE_NAMES).unwrap().len(), 12);
        assert!(matches!(
            booster.bind(&["LotArea"]),
            Err(ModelError::FeatureCount { expected: 12, actual: 1 })
        ));
    }

    #[test]
    fn tree_dump_fallback() {
        let booster = Booster::from_json_str(DUMP_MODEL, 0.5).unwrap();
        assert_eq!(booster.format(), ModelFormat::TreeDump);
        assert_eq!(booster.feature_names().unwrap(), ["GrLivArea".to_string()]);

        assert!(close(booster.predict_margin(&[1500.0]).unwrap(), 0.3));
        assert!(close(booster.predict_margin(&[2500.0]).unwrap(), 0.9));
        assert!(close(booster.predict_margin(&[f64::NAN]).unwrap(), 0.9));
    }

    #[test]
    fn anonymous_dump_uses_indices() {
        let text = DUMP_MODEL.replace("GrLivArea", "f5");
        let booster = Booster::from_json_str(&text, 0.0).unwrap();
        assert!(booster.feature_names().is_none());

        let mut row = vec![0.0; 12];
        row[5] = 1500.0;
        assert!(close(booster.predict_margin(&row).unwrap(), -0.2));
        assert!(booster.bind(&["a", "b"]).is_err());
    }

    #[test]
    fn unreadable_input_reports_both_attempts() {
        match Booster::from_json_str("not json at all", 0.5) {
            Err(ModelError::Parse { native, dump }) => {
                assert!(!native.is_empty());
                assert!(!dump.is_empty());
            }
            other => panic!("expected parse error, got {:?}", other.map(|b| b.tree_count())),
        }
    }

    #[test]
    fn out_of_range_child_is_rejected() {
        let text = NATIVE_MODEL.replace("[1, -1, -1]", "[7, -1, -1]");
        assert!(Booster::from_json_str(&text, 0.5).is_err());
    }
}
