//! Operation registry: maps each mode to its setup and processing capability.
//!
//! # Architecture
//!
//! ```text
//! OperationRegistry
//!   - one Arc<dyn TransformManager> per service run
//!   - Mode -> Capability { setup, process }
//!         |
//!      wire(ModeConfig)
//!         |  setup(param) once per mode, in config order
//!         v
//! ComposedPipeline [process, process, ...]
//! ```

mod error;
mod pipeline;

use std::collections::HashMap;
use std::sync::Arc;

pub use error::{RegistryError, StageError};
pub use pipeline::{ComposedPipeline, Stage};

use crate::mode::{Mode, ModeConfig};
use crate::transform::{TransformError, TransformManager};

/// Naming step run once at wiring time with the mode's parameter.
pub type SetupFn = fn(&dyn TransformManager, &str) -> Result<(), TransformError>;

/// Processing step run once per observed file.
pub type ProcessFn = fn(&dyn TransformManager, &str) -> Result<(), TransformError>;

/// The pair of capabilities a mode contributes.
#[derive(Clone, Copy)]
pub struct Capability {
    pub setup: SetupFn,
    pub process: ProcessFn,
}

impl Capability {
    pub fn new(setup: SetupFn, process: ProcessFn) -> Self {
        Self { setup, process }
    }

    /// Standard binding of `mode` onto the [`TransformManager`] methods.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Compress => Self::new(|m, p| m.set_archive_name(p), |m, f| m.compress(f)),
            Mode::Decompress => {
                Self::new(|m, p| m.set_dearchive_name(p), |m, f| m.decompress(f))
            }
            Mode::Encrypt => Self::new(|m, p| m.set_encrypt_name(p), |m, f| m.encrypt(f)),
            Mode::Decrypt => Self::new(|m, p| m.set_decrypt_name(p), |m, f| m.decrypt(f)),
            Mode::CompressAndEncrypt => Self::new(
                |m, p| m.set_compress_and_encrypt_name(p),
                |m, f| m.compress_and_encrypt(f),
            ),
        }
    }
}

/// Capability table built around a single shared manager.
pub struct OperationRegistry {
    manager: Arc<dyn TransformManager>,
    table: HashMap<Mode, Capability>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new(manager: Arc<dyn TransformManager>) -> Self {
        Self {
            manager,
            table: HashMap::new(),
        }
    }

    /// Create a registry with every mode bound to the manager's methods.
    pub fn standard(manager: Arc<dyn TransformManager>) -> Self {
        Mode::ALL
            .into_iter()
            .fold(Self::new(manager), |registry, mode| {
                registry.register(mode, Capability::for_mode(mode))
            })
    }

    pub fn register(mut self, mode: Mode, capability: Capability) -> Self {
        self.table.insert(mode, capability);
        self
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.table.contains_key(&mode)
    }

    pub fn manager(&self) -> &Arc<dyn TransformManager> {
        &self.manager
    }

    /// Run each mode's setup once and compose the processing steps.
    ///
    /// All requested modes are checked before any setup runs, so a missing
    /// capability never leaves the manager half configured.
    pub fn wire(&self, modes: &ModeConfig) -> Result<ComposedPipeline, RegistryError> {
        if modes.is_empty() {
            return Err(RegistryError::NoModes);
        }

        if let Some(missing) = modes.modes().find(|mode| !self.contains(*mode)) {
            return Err(RegistryError::MissingCapability(missing));
        }

        let mut stages = Vec::with_capacity(modes.len());
        for (mode, param) in modes.iter() {
            let capability = self.table[&mode];
            (capability.setup)(self.manager.as_ref(), param)
                .map_err(|source| RegistryError::Setup { mode, source })?;
            crate::debug_event!("registry", "wired", "{mode} ({param})");

            stages.push(Stage {
                mode,
                process: capability.process,
            });
        }

        Ok(ComposedPipeline::new(self.manager.clone(), stages))
    }
}
