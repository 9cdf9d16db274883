//! Fragment store: accumulates one invocation's fragments and enforces origin uniqueness.

use super::{ConfigFragment, Origin};
use crate::error::PipelineError;
use tracing::debug;

/// Raw fragments for a single build invocation.
#[derive(Debug, Default)]
pub struct FragmentStore {
    fragments: Vec<ConfigFragment>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment.
    ///
    /// Fails with `DuplicateOrigin` when a singular origin (framework-default,
    /// user, environment) is added twice, or when two module-default fragments
    /// share a scope. Module-default fragments must carry a scope.
    pub fn add(&mut self, fragment: ConfigFragment) -> Result<(), PipelineError> {
        let origin = fragment.origin();

        if origin == Origin::ModuleDefault && fragment.scope().is_none() {
            return Err(PipelineError::DuplicateOrigin {
                origin,
                scope: None,
            });
        }

        let clash = self.fragments.iter().any(|existing| {
            existing.origin() == origin
                && (origin.is_singular() || existing.scope() == fragment.scope())
        });
        if clash {
            return Err(PipelineError::DuplicateOrigin {
                origin,
                scope: fragment.scope().map(str::to_string),
            });
        }

        debug!(
            origin = %origin,
            scope = fragment.scope().unwrap_or("-"),
            keys = fragment.tree().len(),
            "Fragment added"
        );
        self.fragments.push(fragment);
        Ok(())
    }

    /// All fragments in ascending priority; insertion order breaks ties within a tier.
    pub fn all_fragments(&self) -> Vec<&ConfigFragment> {
        let mut ordered: Vec<&ConfigFragment> = self.fragments.iter().collect();
        ordered.sort_by_key(|f| f.priority());
        ordered
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
