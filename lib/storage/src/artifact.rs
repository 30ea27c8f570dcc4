// On-disk model artifacts: one estimator file and one scaler file per component
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use startflow_core::{Error, Result, StandardScaler};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bumped whenever the envelope or a persisted estimator changes shape
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A fitted estimator together with the scaler fitted in the same
/// training pass. The two are only ever stored and restored together.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPair<E> {
    pub estimator: E,
    pub scaler: StandardScaler,
}

impl<E> FittedPair<E> {
    pub fn new(estimator: E, scaler: StandardScaler) -> Self {
        Self { estimator, scaler }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactPart {
    Estimator,
    Scaler,
}

impl ArtifactPart {
    fn suffix(self) -> &'static str {
        match self {
            ArtifactPart::Estimator => "model",
            ArtifactPart::Scaler => "scaler",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,
    component: String,
    part: ArtifactPart,
    /// Shared by the estimator and scaler files of one training pass
    pair_tag: String,
    trained_at: DateTime<Utc>,
    /// SHA-256 of `payload`
    checksum: String,
    payload: Vec<u8>,
}

/// Artifact metadata for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescription {
    pub component: String,
    pub trained_at: String,
    pub size: u64,
    pub pair_tag: String,
}

/// Directory holding the persisted artifacts of every trained component
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, component: &str, part: ArtifactPart) -> PathBuf {
        self.dir.join(format!("{}_{}.bin", component, part.suffix()))
    }

    /// True when both files of the pair are present
    pub fn contains(&self, component: &str) -> bool {
        self.path_for(component, ArtifactPart::Estimator).exists()
            && self.path_for(component, ArtifactPart::Scaler).exists()
    }

    /// Persist `pair` for `component`, replacing any previous artifact.
    /// Each file is written atomically (temp file + rename).
    pub fn save_pair<E: Serialize>(&self, component: &str, pair: &FittedPair<E>) -> Result<()> {
        let estimator_bytes = bincode::serialize(&pair.estimator)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let scaler_bytes = bincode::serialize(&pair.scaler)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&estimator_bytes);
        hasher.update(&scaler_bytes);
        let pair_tag = format!("{:x}", hasher.finalize());
        let trained_at = Utc::now();

        for (part, payload) in [
            (ArtifactPart::Estimator, estimator_bytes),
            (ArtifactPart::Scaler, scaler_bytes),
        ] {
            let envelope = ArtifactEnvelope {
                format_version: ARTIFACT_FORMAT_VERSION,
                component: component.to_string(),
                part,
                pair_tag: pair_tag.clone(),
                trained_at,
                checksum: format!("{:x}", Sha256::digest(&payload)),
                payload,
            };
            let data = bincode::serialize(&envelope)
                .map_err(|e| Error::Serialization(e.to_string()))?;

            let path = self.path_for(component, part);
            AtomicFile::new(&path, AllowOverwrite)
                .write(|f| f.write_all(&data))
                .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;
        }

        Ok(())
    }

    /// Restore the pair for `component`.
    ///
    /// `Ok(None)` when either file is missing. Any unreadable, corrupt or
    /// mismatched file is reported as [`Error::Persistence`].
    pub fn load_pair<E: DeserializeOwned>(&self, component: &str) -> Result<Option<FittedPair<E>>> {
        if !self.contains(component) {
            return Ok(None);
        }

        let estimator_env = self.read_envelope(component, ArtifactPart::Estimator)?;
        let scaler_env = self.read_envelope(component, ArtifactPart::Scaler)?;

        if estimator_env.pair_tag != scaler_env.pair_tag {
            return Err(Error::Persistence(format!(
                "{component}: estimator and scaler come from different training runs"
            )));
        }

        let estimator: E = bincode::deserialize(&estimator_env.payload)
            .map_err(|e| Error::Persistence(format!("{component} estimator: {e}")))?;
        let scaler: StandardScaler = bincode::deserialize(&scaler_env.payload)
            .map_err(|e| Error::Persistence(format!("{component} scaler: {e}")))?;

        if !scaler.is_fitted() {
            return Err(Error::Persistence(format!("{component}: stored scaler is not fitted")));
        }

        Ok(Some(FittedPair::new(estimator, scaler)))
    }

    /// Describe the stored artifact, if a readable one exists
    pub fn describe(&self, component: &str) -> Option<ArtifactDescription> {
        if !self.contains(component) {
            return None;
        }
        let estimator = self.read_envelope(component, ArtifactPart::Estimator).ok()?;
        let size = [ArtifactPart::Estimator, ArtifactPart::Scaler]
            .iter()
            .filter_map(|part| fs::metadata(self.path_for(component, *part)).ok())
            .map(|m| m.len())
            .sum();

        Some(ArtifactDescription {
            component: component.to_string(),
            trained_at: estimator.trained_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            size,
            pair_tag: estimator.pair_tag,
        })
    }

    fn read_envelope(&self, component: &str, part: ArtifactPart) -> Result<ArtifactEnvelope> {
        let path = self.path_for(component, part);
        let data = fs::read(&path)
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;
        let envelope: ArtifactEnvelope = bincode::deserialize(&data)
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;

        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "{}: format version {} is not supported (expected {})",
                path.display(),
                envelope.format_version,
                ARTIFACT_FORMAT_VERSION
            )));
        }
        if envelope.component != component || envelope.part != part {
            return Err(Error::Persistence(format!(
                "{}: holds {:?} of '{}'",
                path.display(),
                envelope.part,
                envelope.component
            )));
        }
        let actual = format!("{:x}", Sha256::digest(&envelope.payload));
        if actual != envelope.checksum {
            return Err(Error::Persistence(format!(
                "{}: checksum mismatch",
                path.display()
            )));
        }

        Ok(envelope)
    }
}
