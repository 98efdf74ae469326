pub mod classifier;

pub use classifier::{
    Classifier, DecisionTree, LogisticRegression, ModelArtifact, ModelError, RandomForest,
    TreeNode,
};
