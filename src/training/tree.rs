//! Depth-bounded decision-tree classifier
//!
//! A small CART-style tree over the five drive scalars, split on gini
//! impurity with deterministic tie-breaking (first feature, then lowest
//! threshold). Determinism matters: fitting the same dataset twice must
//! produce the identical tree, so nothing here consults an RNG.

use serde::{Deserialize, Serialize};

/// Number of input features (hunger, energy, health, stimulation, fear_level)
pub const NUM_FEATURES: usize = 5;

/// Minimum gini improvement required to keep a split
const MIN_GAIN: f32 = 1e-7;

/// One node of the fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        label: String,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f32,
        samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A fitted classifier, immutable once trained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    pub max_depth: usize,
    /// Class labels, sorted; ties in majority votes resolve to the first
    pub classes: Vec<String>,
    /// Normalized impurity decrease per feature
    pub feature_importances: Vec<f32>,
}

impl DecisionTree {
    /// Fit a tree of at most `max_depth` levels of splits.
    ///
    /// `features` and `labels` must be the same length and non-empty.
    pub fn fit(features: &[[f32; NUM_FEATURES]], labels: &[String], max_depth: usize) -> Self {
        assert_eq!(features.len(), labels.len());
        assert!(!features.is_empty(), "cannot fit a tree on an empty dataset");

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();

        let class_of: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap())
            .collect();

        let indices: Vec<usize> = (0..features.len()).collect();
        let mut importances = vec![0.0f32; NUM_FEATURES];
        let total = features.len();
        let root = build_node(
            features,
            &class_of,
            &classes,
            &indices,
            max_depth,
            total,
            &mut importances,
        );

        let sum: f32 = importances.iter().sum();
        if sum > 0.0 {
            for value in &mut importances {
                *value /= sum;
            }
        }

        Self {
            root,
            max_depth,
            classes,
            feature_importances: importances,
        }
    }

    /// Predict the label for one feature vector
    pub fn predict(&self, features: &[f32; NUM_FEATURES]) -> &str {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { label, .. } => return label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Number of split levels on the deepest path
    pub fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}

fn gini(counts: &[usize], total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let mut impurity = 1.0;
    for &count in counts {
        let p = count as f32 / total as f32;
        impurity -= p * p;
    }
    impurity
}

fn class_counts(class_of: &[usize], indices: &[usize], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_classes];
    for &index in indices {
        counts[class_of[index]] += 1;
    }
    counts
}

fn majority_label(counts: &[usize], classes: &[String]) -> String {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    classes[best].clone()
}

struct SplitChoice {
    feature: usize,
    threshold: f32,
    weighted_gini: f32,
}

fn best_split(
    features: &[[f32; NUM_FEATURES]],
    class_of: &[usize],
    indices: &[usize],
    num_classes: usize,
) -> Option<SplitChoice> {
    let total = indices.len();
    let mut best: Option<SplitChoice> = None;

    for feature in 0..NUM_FEATURES {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut right_counts = class_counts(class_of, indices, num_classes);
        let mut left_counts = vec![0usize; num_classes];

        for cut in 0..total - 1 {
            let index = order[cut];
            left_counts[class_of[index]] += 1;
            right_counts[class_of[index]] -= 1;

            let value = features[index][feature];
            let next_value = features[order[cut + 1]][feature];
            if value == next_value {
                continue;
            }

            let left_total = cut + 1;
            let right_total = total - left_total;
            let weighted = (left_total as f32 * gini(&left_counts, left_total)
                + right_total as f32 * gini(&right_counts, right_total))
                / total as f32;

            let better = match &best {
                Some(current) => weighted < current.weighted_gini,
                None => true,
            };
            if better {
                best = Some(SplitChoice {
                    feature,
                    threshold: (value + next_value) * 0.5,
                    weighted_gini: weighted,
                });
            }
        }
    }

    best
}

fn build_node(
    features: &[[f32; NUM_FEATURES]],
    class_of: &[usize],
    classes: &[String],
    indices: &[usize],
    depth_left: usize,
    total_samples: usize,
    importances: &mut [f32],
) -> TreeNode {
    let counts = class_counts(class_of, indices, classes.len());
    let node_gini = gini(&counts, indices.len());

    let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
    if depth_left == 0 || is_pure || indices.len() < 2 {
        return TreeNode::Leaf {
            label: majority_label(&counts, classes),
            samples: indices.len(),
        };
    }

    let choice = match best_split(features, class_of, indices, classes.len()) {
        Some(choice) if node_gini - choice.weighted_gini > MIN_GAIN => choice,
        _ => {
            return TreeNode::Leaf {
                label: majority_label(&counts, classes),
                samples: indices.len(),
            }
        }
    };

    importances[choice.feature] +=
        indices.len() as f32 / total_samples as f32 * (node_gini - choice.weighted_gini);

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&index| features[index][choice.feature] <= choice.threshold);

    let left = build_node(
        features,
        class_of,
        classes,
        &left_indices,
        depth_left - 1,
        total_samples,
        importances,
    );
    let right = build_node(
        features,
        class_of,
        classes,
        &right_indices,
        depth_left - 1,
        total_samples,
        importances,
    );

    TreeNode::Split {
        feature: choice.feature,
        threshold: choice.threshold,
        samples: indices.len(),
        left: Box::new(left),
        right: Box::new(right),
    }
}
