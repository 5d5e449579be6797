use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::{PredictErr, Result};

/// A node of a binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go to `left`, the rest to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: Vec<f64> },
}

/// A decision tree stored as a flat, pre-ordered node array rooted at index 0.
///
/// Children always come after their parent, which makes every walk terminate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Node>", into = "Vec<Node>")]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a new `Tree`.
    ///
    /// # Arguments
    /// * `nodes` - The nodes in pre-order, the root first.
    ///
    /// # Returns
    /// The tree, or `InvalidArtifact` if it's empty or a child index does not point
    /// forward into the array.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(PredictErr::InvalidArtifact("a tree has no nodes".into()));
        }

        for (i, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                for child in [left, right] {
                    if child <= i || child >= nodes.len() {
                        return Err(PredictErr::InvalidArtifact(format!(
                            "node {i} points to child {child}, expected an index in {}..{}",
                            i + 1,
                            nodes.len()
                        )));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Checks the tree against the model that owns it.
    ///
    /// # Arguments
    /// * `n_features` - Width of the rows the tree will see.
    /// * `leaf_width` - Number of values every leaf must hold.
    pub fn check(&self, n_features: usize, leaf_width: usize) -> Result<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature, threshold, ..
                } => {
                    if *feature >= n_features {
                        return Err(PredictErr::InvalidArtifact(format!(
                            "node {i} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(PredictErr::InvalidArtifact(format!(
                            "node {i} has a NaN threshold"
                        )));
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != leaf_width {
                        return Err(PredictErr::ShapeMismatch {
                            what: "leaf value",
                            got: value.len(),
                            expected: leaf_width,
                        });
                    }
                    if value.iter().any(|v| !v.is_finite()) {
                        return Err(PredictErr::InvalidArtifact(format!(
                            "leaf {i} holds a non finite value"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks the tree for one row and returns the leaf it lands on.
    pub fn leaf(&self, x: ArrayView1<'_, f64>) -> &[f64] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if x[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { value } => return value,
            }
        }
    }
}

impl TryFrom<Vec<Node>> for Tree {
    type Error = PredictErr;

    fn try_from(value: Vec<Node>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Tree> for Vec<Node> {
    fn from(value: Tree) -> Self {
        value.nodes
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn stump() -> Tree {
        Tree::new(vec![
            Node::Split {
                feature: 1,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: vec![1.0] },
            Node::Leaf { value: vec![2.0] },
        ])
        .unwrap()
    }

    #[test]
    fn test_walk() {
        let tree = stump();
        assert_eq!(tree.leaf(array![9.0, 0.2].view()), &[1.0]);
        assert_eq!(tree.leaf(array![9.0, 0.5].view()), &[1.0]);
        assert_eq!(tree.leaf(array![9.0, 0.7].view()), &[2.0]);
    }

    #[test]
    fn test_rejects_backward_children() {
        let nodes = vec![
            Node::Leaf { value: vec![1.0] },
            Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 2,
            },
            Node::Leaf { value: vec![1.0] },
        ];
        assert!(matches!(Tree::new(nodes), Err(PredictErr::InvalidArtifact(_))));
        assert!(Tree::new(vec![]).is_err());
    }

    #[test]
    fn test_check() {
        let tree = stump();
        assert!(tree.check(2, 1).is_ok());
        assert!(tree.check(1, 1).is_err());
        assert!(matches!(
            tree.check(2, 3),
            Err(PredictErr::ShapeMismatch { got: 1, expected: 3, .. })
        ));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"[
            {"type": "split", "feature": 0, "threshold": 2.45, "left": 1, "right": 2},
            {"type": "leaf", "value": [50.0, 0.0]},
            {"type": "leaf", "value": [0.0, 50.0]}
        ]"#;
        let tree: Tree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.nodes().len(), 3);

        let bad = r#"[{"type": "split", "feature": 0, "threshold": 1.0, "left": 5, "right": 6}]"#;
        assert!(serde_json::from_str::<Tree>(bad).is_err());
    }
}
