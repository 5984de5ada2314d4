// ============================================================================
// reframe-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Everything that launches a process lives under this module. The pipeline
// talks to the outside world only through the `CommandRunner` trait, which
// keeps probing, encoding and dependency checks testable without real
// binaries.
//
// KEY COMPONENTS:
// - runner: CommandRunner trait, SystemCommandRunner, CancelFlag
// - ffprobe_executor: media probing into MediaProfile
// - ffmpeg / ffmpeg_builder: argument synthesis and filter chains
// - mocks: MockCommandRunner (unit tests only)
// - Dependency checking for both tools

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};

use std::path::Path;
use std::time::Duration;

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg argument synthesis
pub mod ffmpeg;

/// Video filter chain builder
pub mod ffmpeg_builder;

/// ffprobe execution and output parsing
pub mod ffprobe_executor;

/// Process execution seam
pub mod runner;

#[cfg(test)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{EncodeOptions, build_ffmpeg_args};
pub use ffmpeg_builder::VideoFilterChain;
pub use ffprobe_executor::{probe, probe_dimensions};
pub use runner::{CancelFlag, CommandOutput, CommandRunner, RunOptions, SystemCommandRunner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Upper bound on a `-version` query.
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks that `program` launches and answers `-version`.
///
/// Any failure (missing binary, permission problem, non-zero exit, hang) is
/// reported as `CoreError::DependencyNotFound` naming the path that was tried.
pub fn check_dependency(runner: &dyn CommandRunner, program: &Path) -> CoreResult<()> {
    let args = ["-version".to_string()];
    match runner.run(program, &args, &RunOptions::with_timeout(VERSION_CHECK_TIMEOUT)) {
        Ok(output) if output.success() => {
            let version = output.stdout.lines().next().unwrap_or_default();
            log::debug!("Found {}: {}", program.display(), version);
            Ok(())
        }
        Ok(output) => {
            log::warn!("{} -version failed with {}", program.display(), output.status_description());
            Err(CoreError::DependencyNotFound(format!(
                "{} ({})",
                program.display(),
                output.status_description()
            )))
        }
        Err(CoreError::DependencyNotFound(_)) => {
            log::warn!("Dependency '{}' not found.", program.display());
            Err(CoreError::DependencyNotFound(program.display().to_string()))
        }
        Err(e) => {
            log::error!("Failed to run dependency check for '{}': {}", program.display(), e);
            Err(CoreError::DependencyNotFound(format!("{} ({})", program.display(), e)))
        }
    }
}

/// Checks ffprobe and ffmpeg, in that order.
pub fn check_dependencies(runner: &dyn CommandRunner, tools: &ToolPaths) -> CoreResult<()> {
    check_dependency(runner, &tools.ffprobe)?;
    check_dependency(runner, &tools.ffmpeg)
}

/// True when both tools are usable.
pub fn probe_capability(runner: &dyn CommandRunner, tools: &ToolPaths) -> bool {
    check_dependencies(runner, tools).is_ok()
}
