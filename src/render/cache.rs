//! Per-step cache of composited images
//!
//! Preview panels ask for a step's flattened image on every redraw. The
//! cache keys each entry on the image digest and the annotation list, so
//! edits to unrelated fields (title, description) never trigger a re-render.

use std::collections::{HashMap, HashSet};

use futures::stream::{FuturesUnordered, StreamExt};

use super::compositor::{composite, composite_async};
use crate::domain::{Annotation, ImageData, Step, StepId};

#[derive(Clone, Debug)]
struct Entry {
    digest: u64,
    annotations: Vec<Annotation>,
    output: ImageData,
}

impl Entry {
    fn matches(&self, step: &Step) -> bool {
        self.digest == step.image.digest() && self.annotations == step.annotations
    }
}

#[derive(Debug, Default)]
pub struct CompositeCache {
    entries: HashMap<StepId, Entry>,
    renders: u64,
}

impl CompositeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `step` if it is still current
    pub fn get(&self, step: &Step) -> Option<&ImageData> {
        self.entries
            .get(&step.id)
            .filter(|entry| entry.matches(step))
            .map(|entry| &entry.output)
    }

    /// Flattened image for `step`, rendering only when its image or
    /// annotations changed since the last call.
    pub fn get_or_render(&mut self, step: &Step) -> ImageData {
        if let Some(output) = self.get(step) {
            return output.clone();
        }

        let output = composite(&step.image, &step.annotations);
        self.store(step, output.clone());
        output
    }

    /// Re-render every stale step concurrently on the blocking pool
    pub async fn refresh_all(&mut self, steps: &[Step]) {
        let stale: Vec<&Step> = steps.iter().filter(|s| self.get(s).is_none()).collect();
        if stale.is_empty() {
            return;
        }
        log::debug!("Re-compositing {} stale step(s)", stale.len());

        let results = stale
            .into_iter()
            .map(|step| async move {
                let output = composite_async(step.image.clone(), step.annotations.clone()).await;
                (step, output)
            })
            .collect::<FuturesUnordered<_>>()
            .collect::<Vec<_>>()
            .await;

        for (step, output) in results {
            self.store(step, output);
        }
    }

    fn store(&mut self, step: &Step, output: ImageData) {
        self.renders += 1;
        self.entries.insert(
            step.id.clone(),
            Entry {
                digest: step.image.digest(),
                annotations: step.annotations.clone(),
                output,
            },
        );
    }

    /// Drop the entry of a deleted step
    pub fn forget(&mut self, id: &StepId) {
        self.entries.remove(id);
    }

    /// Keep only entries for the given steps
    pub fn retain<'a>(&mut self, ids: impl IntoIterator<Item = &'a StepId>) {
        let keep: HashSet<&StepId> = ids.into_iter().collect();
        self.entries.retain(|id, _| keep.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of renders performed, for diagnostics
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
