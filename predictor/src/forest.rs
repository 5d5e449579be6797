use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::{
    PredictErr, Result,
    model::{Classifier, Output, Predictor, check_width},
    tree::{Node, Tree},
};

#[derive(Deserialize)]
struct ClassifierParts {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

/// An ensemble of classification trees whose leaves hold per-class weights.
///
/// The probability of a class is the mean over trees of the leaf's normalized weight
/// for it, and the predicted label is the most probable class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ClassifierParts")]
pub struct ForestClassifier {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

impl ForestClassifier {
    /// Creates a new `ForestClassifier`.
    ///
    /// # Arguments
    /// * `n_features` - Width of the input rows.
    /// * `classes` - The labels, one per leaf weight.
    /// * `trees` - The ensemble members.
    ///
    /// # Returns
    /// The forest, or an error if any tree does not fit the other arguments.
    pub fn new(n_features: usize, classes: Vec<i64>, trees: Vec<Tree>) -> Result<Self> {
        if classes.is_empty() {
            return Err(PredictErr::InvalidArtifact("a classifier has no classes".into()));
        }
        for (i, class) in classes.iter().enumerate() {
            if classes[..i].contains(class) {
                return Err(PredictErr::InvalidArtifact(format!(
                    "class {class} is listed more than once"
                )));
            }
        }
        check_trees(&trees, n_features, classes.len())?;

        let leaves = trees.iter().flat_map(|t| t.nodes()).filter_map(|node| match node {
            Node::Leaf { value } => Some(value),
            Node::Split { .. } => None,
        });
        for value in leaves {
            if value.iter().any(|w| *w < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                return Err(PredictErr::InvalidArtifact(
                    "class weights must be non negative with a positive sum".into(),
                ));
            }
        }

        Ok(Self {
            n_features,
            classes,
            trees,
        })
    }
}

impl TryFrom<ClassifierParts> for ForestClassifier {
    type Error = PredictErr;

    fn try_from(value: ClassifierParts) -> Result<Self> {
        Self::new(value.n_features, value.classes, value.trees)
    }
}

impl Predictor for ForestClassifier {
    fn kind(&self) -> &'static str {
        "forest_classifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Output> {
        let proba = self.predict_proba(x)?;

        let labels = proba
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = 0;
                for (i, p) in row.iter().enumerate() {
                    if *p > row[best] {
                        best = i;
                    }
                }
                self.classes[best]
            })
            .collect();

        Ok(Output::Labels(labels))
    }

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        Some(self)
    }
}

impl Classifier for ForestClassifier {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        check_width(&x, self.n_features)?;

        let ntrees = self.trees.len() as f64;
        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));

        for (row, mut out) in x.axis_iter(Axis(0)).zip(proba.axis_iter_mut(Axis(0))) {
            for tree in &self.trees {
                let weights = tree.leaf(row);
                let total: f64 = weights.iter().sum();
                for (o, w) in out.iter_mut().zip(weights) {
                    *o += w / total;
                }
            }
            out.mapv_inplace(|p| p / ntrees);
        }

        Ok(proba)
    }
}

#[derive(Deserialize)]
struct RegressorParts {
    n_features: usize,
    trees: Vec<Tree>,
}

/// An ensemble of regression trees, predicting the mean of the leaves reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RegressorParts")]
pub struct ForestRegressor {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestRegressor {
    /// Creates a new `ForestRegressor` whose leaves each hold a single value.
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Result<Self> {
        check_trees(&trees, n_features, 1)?;
        Ok(Self { n_features, trees })
    }
}

impl TryFrom<RegressorParts> for ForestRegressor {
    type Error = PredictErr;

    fn try_from(value: RegressorParts) -> Result<Self> {
        Self::new(value.n_features, value.trees)
    }
}

impl Predictor for ForestRegressor {
    fn kind(&self) -> &'static str {
        "forest_regressor"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Output> {
        check_width(&x, self.n_features)?;

        let ntrees = self.trees.len() as f64;
        let values = x
            .axis_iter(Axis(0))
            .map(|row| self.trees.iter().map(|t| t.leaf(row)[0]).sum::<f64>() / ntrees)
            .collect();

        Ok(Output::Values(values))
    }
}

fn check_trees(trees: &[Tree], n_features: usize, leaf_width: usize) -> Result<()> {
    if n_features == 0 {
        return Err(PredictErr::InvalidArtifact("a model needs at least one feature".into()));
    }
    if trees.is_empty() {
        return Err(PredictErr::InvalidArtifact("a forest has no trees".into()));
    }
    trees.iter().try_for_each(|t| t.check(n_features, leaf_width))
}
