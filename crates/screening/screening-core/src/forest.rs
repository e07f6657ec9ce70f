//! Isolation forest inference over an exported tree ensemble.
//!
//! The forest is never fitted here. Trees arrive as the per-node arrays of
//! the exporting library and are only evaluated.

use screening_spi::{Result, ScreeningError, TransactionModel, TransactionRecord, COLUMNS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Child index marking a leaf in the exported arrays.
const LEAF: i64 = -1;

/// Average path length of an unsuccessful binary-search-tree lookup over
/// `n` samples, used to normalise isolation depths.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// Artifact layout
// ============================================================================

/// Exported forest, as stored on disk or in the tracking server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Column labels the forest was trained on.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Sub-sample size used for each tree.
    pub max_samples: usize,
    /// Decision offset; scores below it are anomalous.
    pub offset: f64,
    pub trees: Vec<TreeArtifact>,
}

/// One exported isolation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    /// Maps tree-local feature indices to record columns.
    #[serde(default)]
    pub features: Option<Vec<usize>>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub n_node_samples: Vec<usize>,
}

// ============================================================================
// Validated trees
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        column: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        samples: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn from_artifact(index: usize, tree: TreeArtifact) -> Result<Self> {
        let invalid = |reason: String| {
            ScreeningError::InvalidArtifact(format!("tree {index}: {reason}"))
        };

        let n = tree.children_left.len();
        if n == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.n_node_samples.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(invalid("node arrays differ in length".to_string()));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let (left, right) = (tree.children_left[id], tree.children_right[id]);
            if left == LEAF && right == LEAF {
                nodes.push(Node::Leaf {
                    samples: tree.n_node_samples[id],
                });
                continue;
            }

            // Children always come after their parent, which also rules out cycles.
            let child = |c: i64| -> Result<usize> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > id && c < n)
                    .ok_or_else(|| invalid(format!("node {id} has invalid child {c}")))
            };
            let (left, right) = (child(left)?, child(right)?);

            let local = usize::try_from(tree.feature[id])
                .map_err(|_| invalid(format!("node {id} has invalid feature {}", tree.feature[id])))?;
            let column = match &tree.features {
                Some(map) => *map.get(local).ok_or_else(|| {
                    invalid(format!("node {id} feature {local} is not in the feature map"))
                })?,
                None => local,
            };
            if column >= COLUMNS.len() {
                return Err(invalid(format!("node {id} splits on unknown column {column}")));
            }

            nodes.push(Node::Split {
                column,
                threshold: tree.threshold[id],
                left,
                right,
            });
        }

        Ok(Self { nodes })
    }

    /// Edges walked from the root to the leaf plus the leaf's expected
    /// remaining depth.
    fn path_length(&self, row: &[f64; 10]) -> f64 {
        let mut id = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[id] {
                Node::Leaf { samples } => return depth as f64 + average_path_length(*samples),
                Node::Split {
                    column,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row[*column] as f32 as f64;
                    id = if value <= *threshold { *left } else { *right };
                    depth += 1;
                }
            }
        }
    }
}

// ============================================================================
// Isolation Forest Model
// ============================================================================

/// Isolation forest evaluated against transaction records.
///
/// Emits `1` for inliers and `-1` for outliers.
#[derive(Debug, Clone)]
pub struct IsolationForestModel {
    trees: Vec<IsolationTree>,
    max_samples: usize,
    offset: f64,
}

impl IsolationForestModel {
    /// Validate an exported forest.
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self> {
        if let Some(names) = &artifact.feature_names {
            if names.iter().map(String::as_str).ne(COLUMNS.iter().copied()) {
                return Err(ScreeningError::FeatureMismatch {
                    expected: COLUMNS.iter().map(|c| c.to_string()).collect(),
                    got: names.clone(),
                });
            }
        }
        if artifact.trees.is_empty() {
            return Err(ScreeningError::InvalidArtifact(
                "forest has no trees".to_string(),
            ));
        }
        if artifact.max_samples < 2 {
            return Err(ScreeningError::InvalidArtifact(format!(
                "max_samples must be at least 2, got {}",
                artifact.max_samples
            )));
        }
        if !artifact.offset.is_finite() {
            return Err(ScreeningError::InvalidArtifact(
                "offset must be finite".to_string(),
            ));
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| IsolationTree::from_artifact(i, tree))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            trees,
            max_samples: artifact.max_samples,
            offset: artifact.offset,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)
            .map_err(|e| ScreeningError::InvalidArtifact(format!("forest: {e}")))?;
        Self::from_artifact(artifact)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Load a forest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ScreeningError::artifact(path, e))?;
        Self::from_slice(&bytes).map_err(|e| match e {
            ScreeningError::FeatureMismatch { .. } => e,
            other => ScreeningError::artifact(path, other),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Mean isolation depth across trees.
    pub fn mean_path_length(&self, record: &TransactionRecord) -> f64 {
        let row = record.to_row();
        let total: f64 = self.trees.iter().map(|t| t.path_length(&row)).sum();
        total / self.trees.len() as f64
    }

    /// Negated anomaly score in `[-1, 0]`; lower is more anomalous.
    pub fn score_samples(&self, record: &TransactionRecord) -> f64 {
        let normaliser = average_path_length(self.max_samples);
        -(2f64).powf(-self.mean_path_length(record) / normaliser)
    }

    /// Score shifted by the offset; negative means outlier.
    pub fn decision_function(&self, record: &TransactionRecord) -> f64 {
        self.score_samples(record) - self.offset
    }
}

impl TransactionModel for IsolationForestModel {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn predict(&self, record: &TransactionRecord) -> Result<i64> {
        let row = record.to_row();
        if let Some(i) = row
            .iter()
            .position(|v| !v.is_finite() || v.abs() > f32::MAX as f64)
        {
            return Err(ScreeningError::Prediction(format!(
                "{} is not representable as float32: {}",
                COLUMNS[i], row[i]
            )));
        }
        let decision = self.decision_function(record);
        if decision.is_nan() {
            return Err(ScreeningError::Prediction(
                "decision function is not a number".to_string(),
            ));
        }
        Ok(if decision < 0.0 { -1 } else { 1 })
    }
}
