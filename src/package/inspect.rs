//! Image inspection through a container engine CLI.
//!
//! This module provides the [`ImageInspector`] trait and an implementation
//! backed by `docker image inspect` (or any CLI compatible with it), enabling
//! testability through dependency injection.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// What: Image metadata relevant to package configuration.
///
/// Inputs: Returned by an [`ImageInspector`].
///
/// Output: Labels feed [`super::package_from_labels`]; the entrypoint is used for linting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// All labels declared on the image.
    pub labels: HashMap<String, String>,
    /// Image entrypoint, empty when none is declared.
    pub entrypoint: Vec<String>,
}

/// What: Abstract image inspection interface.
///
/// Inputs:
/// - `image`: Image reference to inspect.
///
/// Output:
/// - `Ok(ImageMetadata)` on success.
///
/// # Errors
/// - Returns `Err(InspectError)` when the engine cannot be run or its output cannot be decoded
///
/// Details:
/// - Implementations may return canned metadata for deterministic tests.
/// - Production code relies on [`EngineInspector`].
pub trait ImageInspector {
    /// # Errors
    /// - Returns `Err(InspectError)` when the image cannot be inspected
    fn inspect(&self, image: &str) -> Result<ImageMetadata, InspectError>;
}

/// Subset of the engine's `.Config` object that we read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EngineConfig {
    #[serde(default)]
    labels: Option<HashMap<String, String>>,
    #[serde(default)]
    entrypoint: Option<Vec<String>>,
}

/// What: Real inspector that shells out to a container engine binary.
///
/// Inputs: Engine program path resolved at construction.
///
/// Output:
/// - Runs `<engine> image inspect --format '{{json .Config}}' <image>` and decodes the JSON.
///
/// Details:
/// - Errors from spawning the process surface as [`InspectError::Io`].
#[derive(Debug, Clone)]
pub struct EngineInspector {
    program: PathBuf,
}

impl EngineInspector {
    /// What: Locate the container engine on `PATH`.
    ///
    /// Inputs:
    /// - `engine`: Binary name such as `docker` or `podman`.
    ///
    /// Output:
    /// - Inspector bound to the resolved binary.
    ///
    /// # Errors
    /// - Returns `Err(InspectError::EngineNotFound)` when the binary is not on `PATH`
    pub fn locate(engine: &str) -> Result<Self, InspectError> {
        let program = which::which(engine).map_err(|_| InspectError::EngineNotFound {
            engine: engine.to_string(),
        })?;
        tracing::debug!(engine, path = %program.display(), "resolved container engine");
        Ok(Self { program })
    }
}

impl ImageInspector for EngineInspector {
    fn inspect(&self, image: &str) -> Result<ImageMetadata, InspectError> {
        let args = ["image", "inspect", "--format", "{{json .Config}}", image];
        let output = std::process::Command::new(&self.program)
            .args(args)
            .output()?;
        if !output.status.success() {
            return Err(InspectError::Failed {
                program: self.program.display().to_string(),
                args: args.iter().map(ToString::to_string).collect(),
                status: output.status,
            });
        }
        let stdout = String::from_utf8(output.stdout)?;
        parse_engine_config(&stdout)
    }
}

/// What: Decode the JSON printed by `image inspect --format '{{json .Config}}'`.
///
/// Inputs:
/// - `raw`: Engine stdout.
///
/// Output:
/// - Parsed metadata; `null` labels or entrypoint become empty collections.
///
/// # Errors
/// - Returns `Err(InspectError::Json)` when the output is not the expected JSON object
pub fn parse_engine_config(raw: &str) -> Result<ImageMetadata, InspectError> {
    let trimmed = raw.trim();
    let config: EngineConfig = if trimmed == "null" || trimmed.is_empty() {
        EngineConfig::default()
    } else {
        serde_json::from_str(trimmed)?
    };
    Ok(ImageMetadata {
        labels: config.labels.unwrap_or_default(),
        entrypoint: config.entrypoint.unwrap_or_default(),
    })
}

/// What: Error type capturing engine lookup, execution and decoding failures.
///
/// Inputs: Generated internally by [`EngineInspector`].
///
/// Output: Implements `Display`/`Error` for ergonomic propagation.
#[derive(Debug)]
pub enum InspectError {
    /// I/O error occurred.
    Io(std::io::Error),
    /// UTF-8 decoding error occurred.
    Utf8(std::string::FromUtf8Error),
    /// Engine output was not the expected JSON.
    Json(serde_json::Error),
    /// Engine binary was not found on `PATH`.
    EngineNotFound {
        /// Engine name that was searched for.
        engine: String,
    },
    /// Engine exited with a failure status.
    Failed {
        /// Program that failed.
        program: String,
        /// Command arguments.
        args: Vec<String>,
        /// Exit status of the failed command.
        status: std::process::ExitStatus,
    },
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Utf8(err) => write!(f, "UTF-8 decoding error: {err}"),
            Self::Json(err) => write!(f, "unexpected image metadata: {err}"),
            Self::EngineNotFound { engine } => {
                write!(f, "container engine {engine:?} not found in PATH")
            }
            Self::Failed {
                program,
                args,
                status,
            } => write!(f, "{program:?} {args:?} exited with status {status}"),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::EngineNotFound { .. } | Self::Failed { .. } => None,
        }
    }
}

impl From<std::io::Error> for InspectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<std::string::FromUtf8Error> for InspectError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

impl From<serde_json::Error> for InspectError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
