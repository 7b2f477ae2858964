//! Composed pipeline of processing stages.

use std::sync::Arc;

use crate::mode::Mode;
use crate::transform::TransformManager;

use super::{ProcessFn, StageError};

/// One processing step bound to its mode.
#[derive(Clone, Copy)]
pub struct Stage {
    pub mode: Mode,
    pub process: ProcessFn,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("mode", &self.mode).finish()
    }
}

/// Every active processing capability, in registration order.
///
/// Read-only once built; shared between all per-file tasks.
pub struct ComposedPipeline {
    manager: Arc<dyn TransformManager>,
    stages: Vec<Stage>,
}

impl ComposedPipeline {
    pub(super) fn new(manager: Arc<dyn TransformManager>, stages: Vec<Stage>) -> Self {
        Self { manager, stages }
    }

    /// Run all stages against `file_name`, stopping at the first failure.
    pub fn run(&self, file_name: &str) -> Result<(), StageError> {
        for stage in &self.stages {
            crate::debug_event!(stage.mode, "processing", "{file_name}");
            (stage.process)(self.manager.as_ref(), file_name).map_err(|source| StageError {
                mode: stage.mode,
                file_name: file_name.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn modes(&self) -> Vec<Mode> {
        self.stages.iter().map(|stage| stage.mode).collect()
    }
}

impl std::fmt::Debug for ComposedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedPipeline")
            .field("stages", &self.stages)
            .finish()
    }
}
