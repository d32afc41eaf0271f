// ============================================================
// Layer 2 — ClassifyUseCase
// ============================================================
// The serving-side workflow: hold a ClassifierHandle and answer
// single-complaint classification requests against whichever
// model version is current.
//
// Input validation happens here, before the model is touched:
// a missing or blank complaint is a caller error, not a model
// failure, and is reported as such. Anything that goes wrong
// past that point (checkpoint unreadable, inference failure)
// propagates as an internal error with its full context chain.

use anyhow::{Context, Result};

use crate::domain::labels::Prediction;
use crate::ml::inferencer::ClassifierHandle;

pub struct ClassifyUseCase {
    handle: ClassifierHandle,
}

impl ClassifyUseCase {
    /// Load the classifier eagerly — the use case is only
    /// constructed once a model is ready to serve.
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let handle = ClassifierHandle::load(checkpoint_dir)
            .context("Classifier is not ready")?;
        Ok(Self { handle })
    }

    /// Classify one complaint narrative.
    pub fn classify(&self, complaint: &str) -> Result<Prediction> {
        if complaint.trim().is_empty() {
            anyhow::bail!("The 'complaint' field must be a non-empty string");
        }

        // Keep this version for the whole request; a concurrent
        // reload only affects later requests.
        let classifier = self.handle.current();
        classifier.predict(complaint)
    }

    /// Swap in a newly trained checkpoint without restarting.
    pub fn reload(&self) -> Result<()> {
        self.handle.reload()
    }
}
