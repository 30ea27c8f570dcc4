pub mod artifact;
pub mod lifecycle;

pub use artifact::{ArtifactDescription, ArtifactPart, ArtifactStore, FittedPair, ARTIFACT_FORMAT_VERSION};
pub use lifecycle::{train_or_load, ArtifactOrigin, ModelSlot, Trainable};
