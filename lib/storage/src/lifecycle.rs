// Two-phase train-or-load and guarded deferred initialization
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use startflow_core::{Error, Result};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::artifact::{ArtifactStore, FittedPair};

/// Where a live model's parameters came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactOrigin {
    Restored,
    Trained,
}

/// A component whose fitted state is an estimator plus scaler pair that can
/// be regenerated from scratch.
pub trait Trainable: Sized {
    type Estimator: Serialize + DeserializeOwned;

    /// Artifact file prefix
    const COMPONENT: &'static str;

    /// Run the full training pipeline
    fn train() -> Result<FittedPair<Self::Estimator>>;

    /// Build the live component. Restored pairs that fail validation here
    /// are discarded and retrained.
    fn from_pair(pair: FittedPair<Self::Estimator>, origin: ArtifactOrigin) -> Result<Self>;
}

/// Restore `T` from `store`, or train and persist it.
///
/// Any restore failure falls through to training. Only a failure to train
/// or to write the new artifact is returned.
pub fn train_or_load<T: Trainable>(store: &ArtifactStore) -> Result<T> {
    match store.load_pair::<T::Estimator>(T::COMPONENT) {
        Ok(Some(pair)) => match T::from_pair(pair, ArtifactOrigin::Restored) {
            Ok(model) => {
                info!("Restored {} from {:?}", T::COMPONENT, store.dir());
                return Ok(model);
            }
            Err(e) => warn!("Discarding stored {} artifact: {}", T::COMPONENT, e),
        },
        Ok(None) => info!("No stored artifact for {}, training", T::COMPONENT),
        Err(e) => warn!("Could not restore {}: {}; retraining", T::COMPONENT, e),
    }

    let pair = T::train()?;
    store.save_pair(T::COMPONENT, &pair)?;
    info!("Saved {} artifact to {:?}", T::COMPONENT, store.dir());
    T::from_pair(pair, ArtifactOrigin::Trained)
}

/// Cell for a component that may be initialized on first use.
///
/// Initialization runs at most once; concurrent callers wait for the first
/// one. A failed initialization leaves the slot empty.
pub struct ModelSlot<T> {
    name: &'static str,
    cell: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> ModelSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<&T> {
        self.cell
            .get()
            .ok_or_else(|| Error::Uninitialized(self.name.to_string()))
    }

    pub fn get_or_try_init<F>(&self, init: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let _guard = self.init_lock.lock();
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let value = init()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ModelSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSlot")
            .field("name", &self.name)
            .field("value", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactPart;
    use startflow_core::{LinearRegression, StandardScaler};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TRAIN_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Doubler {
        pair: FittedPair<LinearRegression>,
        origin: ArtifactOrigin,
    }

    impl Trainable for Doubler {
        type Estimator = LinearRegression;
        const COMPONENT: &'static str = "doubler";

        fn train() -> Result<FittedPair<LinearRegression>> {
            TRAIN_CALLS.fetch_add(1, Ordering::SeqCst);
            let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
            let y: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();
            let mut scaler = StandardScaler::new();
            let scaled = scaler.fit_transform(&x)?;
            let mut model = LinearRegression::new();
            model.fit(&scaled, &y)?;
            Ok(FittedPair::new(model, scaler))
        }

        fn from_pair(pair: FittedPair<LinearRegression>, origin: ArtifactOrigin) -> Result<Self> {
            Ok(Self { pair, origin })
        }
    }

    impl Doubler {
        fn predict(&self, x: f64) -> f64 {
            let row = self.pair.scaler.transform_one(&[x]).unwrap();
            self.pair.estimator.predict_one(&row).unwrap()
        }
    }

    // Shares TRAIN_CALLS, so everything touching it lives in one test
    #[test]
    fn test_train_then_restore() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();
        let before = TRAIN_CALLS.load(Ordering::SeqCst);

        let trained: Doubler = train_or_load(&store).unwrap();
        assert_eq!(trained.origin, ArtifactOrigin::Trained);
        assert_eq!(TRAIN_CALLS.load(Ordering::SeqCst), before + 1);

        let restored: Doubler = train_or_load(&store).unwrap();
        assert_eq!(restored.origin, ArtifactOrigin::Restored);
        assert_eq!(TRAIN_CALLS.load(Ordering::SeqCst), before + 1);
        assert_eq!(trained.predict(7.5), restored.predict(7.5));

        // a corrupt artifact is replaced, not fatal
        fs::write(store.path_for("doubler", ArtifactPart::Scaler), b"\0\0\0").unwrap();
        let retrained: Doubler = train_or_load(&store).unwrap();
        assert_eq!(retrained.origin, ArtifactOrigin::Trained);
        assert_eq!(TRAIN_CALLS.load(Ordering::SeqCst), before + 2);
        assert!((retrained.predict(4.0) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_slot_uninitialized() {
        let slot: ModelSlot<u32> = ModelSlot::new("answer");
        assert!(!slot.is_initialized());
        assert!(matches!(slot.get(), Err(Error::Uninitialized(name)) if name == "answer"));
    }

    #[test]
    fn test_slot_retries_after_failure() {
        let slot: ModelSlot<u32> = ModelSlot::new("answer");
        let failed = slot.get_or_try_init(|| Err(Error::Training("boom".to_string())));
        assert!(failed.is_err());
        assert!(!slot.is_initialized());

        assert_eq!(*slot.get_or_try_init(|| Ok(42)).unwrap(), 42);
        assert_eq!(*slot.get_or_try_init(|| Ok(7)).unwrap(), 42);
        assert_eq!(*slot.get().unwrap(), 42);
    }

    #[test]
    fn test_slot_initializes_once_under_contention() {
        let slot: ModelSlot<usize> = ModelSlot::new("contended");
        let calls = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let value = slot
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(99)
                        })
                        .unwrap();
                    assert_eq!(*value, 99);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
