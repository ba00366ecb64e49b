//! Packaging orchestration.
//!
//! The dispatcher moves one request through a linear sequence of stages:
//!
//! ```text
//! Received -> Validated -> FormatResolved -> Running -> {Succeeded, Failed}
//! ```
//!
//! Validation never aborts. A missing packer fails the operation before
//! anything is written. Packer errors are wrapped once as
//! `Failed to pack: <cause>`. There is no retry.

use crate::error::DispatchError;
use crate::pack::{
    FormatValidator, PackContext, PackRequest, PackedArtifact, PackerRegistry, ValidationWarning,
};
use std::fmt;

/// Stage of a dispatched request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchStage {
    /// Request accepted, nothing checked yet.
    Received,
    /// Format compatibility warnings collected.
    Validated,
    /// A packer was found for the format.
    FormatResolved,
    /// The packer is building the artifact.
    Running,
    /// The artifact exists.
    Succeeded,
    /// The operation stopped with an error.
    Failed,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchStage::Received => "received",
            DispatchStage::Validated => "validated",
            DispatchStage::FormatResolved => "format-resolved",
            DispatchStage::Running => "running",
            DispatchStage::Succeeded => "succeeded",
            DispatchStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Warnings produced during validation.
    pub warnings: Vec<ValidationWarning>,
    /// The produced artifact.
    pub artifact: PackedArtifact,
}

/// A failed dispatch, with the warnings collected before the failure.
#[derive(Debug)]
pub struct DispatchFailure {
    /// Warnings produced during validation.
    pub warnings: Vec<ValidationWarning>,
    /// Stage that was active when the failure occurred.
    pub failed_at: DispatchStage,
    /// The failure itself.
    pub error: DispatchError,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for DispatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Drives validate, resolve and run for one request.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    validator: FormatValidator,
    registry: PackerRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    pub fn new(registry: PackerRegistry) -> Self {
        Self {
            validator: FormatValidator::new(),
            registry,
        }
    }

    /// Packs `request` in environment `ctx`.
    ///
    /// Warnings are logged as they are found and returned with the outcome.
    pub fn dispatch(
        &self,
        ctx: &PackContext,
        request: &PackRequest,
    ) -> Result<DispatchOutcome, DispatchFailure> {
        let mut stage = DispatchStage::Received;
        log::debug!("Pack request {} for '{}'", stage, request.name);

        let warnings = self.validator.validate(request);
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        stage = advance(stage, DispatchStage::Validated);

        let packer = match self.registry.resolve(request.format) {
            Ok(packer) => packer,
            Err(e) => {
                log::error!("{}", e);
                return Err(DispatchFailure {
                    warnings,
                    failed_at: stage,
                    error: DispatchError::UnsupportedFormat(e),
                });
            }
        };
        stage = advance(stage, DispatchStage::FormatResolved);

        stage = advance(stage, DispatchStage::Running);
        let result = packer
            .run(ctx, request)
            .and_then(|path| {
                PackedArtifact::inspect(packer.format(), path.clone()).inspect_err(|_| {
                    // An artifact that cannot be read back is not reported as produced.
                    let _ = std::fs::remove_file(&path);
                })
            });

        match result {
            Ok(artifact) => {
                advance(stage, DispatchStage::Succeeded);
                Ok(DispatchOutcome { warnings, artifact })
            }
            Err(e) => {
                let error = DispatchError::Pack(e);
                log::error!("{}", error);
                advance(stage, DispatchStage::Failed);
                Err(DispatchFailure {
                    warnings,
                    failed_at: stage,
                    error,
                })
            }
        }
    }
}

fn advance(from: DispatchStage, to: DispatchStage) -> DispatchStage {
    log::debug!("Dispatch stage {} -> {}", from, to);
    to
}
