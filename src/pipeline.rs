//! Pipeline Driver
//!
//! Runs one build invocation through
//! `Empty → FragmentsLoaded → Merged → Resolved → Validated → Emitted`.
//! Each stage is a pure function of the previous stage's output. A failing
//! stage moves the pipeline to `Failed`; there is no retry, the host builds a
//! new pipeline after fixing its input.

use crate::emit::{emit, ActivationPlan};
use crate::error::PipelineError;
use crate::fragment::{ConfigFragment, FragmentStore};
use crate::merge::{EffectiveConfig, MergeEngine, MergePolicy};
use crate::module::{ModuleRegistry, ModuleResolver};
use crate::options::{OptionValidator, ValidatedModule};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    Empty,
    FragmentsLoaded,
    Merged,
    Resolved,
    Validated,
    Emitted,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Empty => "empty",
            PipelineState::FragmentsLoaded => "fragments-loaded",
            PipelineState::Merged => "merged",
            PipelineState::Resolved => "resolved",
            PipelineState::Validated => "validated",
            PipelineState::Emitted => "emitted",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration pipeline for a single build invocation.
pub struct Pipeline<'r> {
    state: PipelineState,
    registry: &'r ModuleRegistry,
    engine: MergeEngine,
    store: FragmentStore,
    effective: Option<EffectiveConfig>,
    order: Vec<String>,
    validated: Vec<ValidatedModule>,
}

impl<'r> Pipeline<'r> {
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self::with_policy(registry, MergePolicy::default())
    }

    pub fn with_policy(registry: &'r ModuleRegistry, policy: MergePolicy) -> Self {
        Self {
            state: PipelineState::Empty,
            registry,
            engine: MergeEngine::new(policy),
            store: FragmentStore::new(),
            effective: None,
            order: Vec::new(),
            validated: Vec::new(),
        }
    }

    /// Run every stage over `fragments` and return the activation plan.
    pub fn run<I>(
        registry: &'r ModuleRegistry,
        policy: MergePolicy,
        fragments: I,
    ) -> Result<ActivationPlan, PipelineError>
    where
        I: IntoIterator<Item = ConfigFragment>,
    {
        let mut pipeline = Self::with_policy(registry, policy);
        for fragment in fragments {
            pipeline.load(fragment)?;
        }
        pipeline.load_module_defaults()?;
        pipeline.merge()?;
        pipeline.resolve()?;
        pipeline.validate()?;
        pipeline.emit()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Effective configuration, available once merged.
    pub fn effective(&self) -> Option<&EffectiveConfig> {
        self.effective.as_ref()
    }

    /// Activation order, available once resolved.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Add a fragment to the store.
    pub fn load(&mut self, fragment: ConfigFragment) -> Result<(), PipelineError> {
        self.require_state(&[PipelineState::Empty, PipelineState::FragmentsLoaded], "load a fragment")?;
        let result = self.store.add(fragment);
        self.settle(result)?;
        self.state = PipelineState::FragmentsLoaded;
        Ok(())
    }

    /// Add module-default fragments for every enabled module with registered defaults.
    ///
    /// The module list comes from a preliminary merge of the fragments loaded so far;
    /// defaults are added in module-declaration order.
    pub fn load_module_defaults(&mut self) -> Result<usize, PipelineError> {
        self.require_state(
            &[PipelineState::Empty, PipelineState::FragmentsLoaded],
            "load module defaults",
        )?;
        let modules = self
            .engine
            .merge(self.store.all_fragments())
            .and_then(|preliminary| preliminary.modules());
        let modules = self.settle(modules)?;

        let mut added = 0;
        for fragment in self.registry.default_fragments(&modules) {
            let result = self.store.add(fragment);
            self.settle(result)?;
            added += 1;
        }
        debug!(added, "Loaded module defaults");
        Ok(added)
    }

    /// Merge all loaded fragments into the effective configuration.
    ///
    /// No fragments at all merge to an empty configuration.
    pub fn merge(&mut self) -> Result<&EffectiveConfig, PipelineError> {
        self.require_state(&[PipelineState::Empty, PipelineState::FragmentsLoaded], "merge")?;
        let result = self.engine.merge(self.store.all_fragments());
        let effective = self.settle(result)?;
        self.state = PipelineState::Merged;
        Ok(self.effective.insert(effective))
    }

    /// Order the enabled modules.
    pub fn resolve(&mut self) -> Result<&[String], PipelineError> {
        self.require_state(&[PipelineState::Merged], "resolve modules")?;
        let result = match &self.effective {
            Some(effective) => effective
                .modules()
                .and_then(|modules| ModuleResolver::new(self.registry).resolve(&modules)),
            None => Err(PipelineError::InvalidTransition {
                from: self.state,
                operation: "resolve modules",
            }),
        };
        self.order = self.settle(result)?;
        self.state = PipelineState::Resolved;
        Ok(&self.order)
    }

    /// Validate each module's options in resolution order. Stops at the first failure.
    pub fn validate(&mut self) -> Result<(), PipelineError> {
        self.require_state(&[PipelineState::Resolved], "validate options")?;
        let result = self.validate_all();
        self.validated = self.settle(result)?;
        self.state = PipelineState::Validated;
        Ok(())
    }

    fn validate_all(&self) -> Result<Vec<ValidatedModule>, PipelineError> {
        let effective = self
            .effective
            .as_ref()
            .ok_or(PipelineError::InvalidTransition {
                from: self.state,
                operation: "validate options",
            })?;
        let validator = OptionValidator::new();
        self.order
            .iter()
            .map(|name| {
                let descriptor = self
                    .registry
                    .get(name)
                    .ok_or_else(|| PipelineError::UnknownModule { name: name.clone() })?;
                validator.validate_module(descriptor, effective)
            })
            .collect()
    }

    /// Hand off the activation plan. Records are moved out; a pipeline emits once.
    pub fn emit(&mut self) -> Result<ActivationPlan, PipelineError> {
        self.require_state(&[PipelineState::Validated], "emit")?;
        let fingerprint = self
            .effective
            .as_ref()
            .map(EffectiveConfig::fingerprint)
            .unwrap_or_default();
        let plan = emit(fingerprint, std::mem::take(&mut self.validated));
        self.state = PipelineState::Emitted;
        info!(
            modules = plan.len(),
            fingerprint = %plan.fingerprint(),
            "Activation plan emitted"
        );
        Ok(plan)
    }

    fn require_state(&self, allowed: &[PipelineState], operation: &'static str) -> Result<(), PipelineError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PipelineError::InvalidTransition {
                from: self.state,
                operation,
            })
        }
    }

    /// Pass a stage result through, moving to `Failed` on error.
    fn settle<T>(&mut self, result: Result<T, PipelineError>) -> Result<T, PipelineError> {
        if let Err(err) = &result {
            warn!(state = %self.state, error = %err, "Pipeline stage failed");
            self.state = PipelineState::Failed;
        }
        result
    }
}
