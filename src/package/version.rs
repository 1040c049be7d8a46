//! Compatibility between a package's `required_version` and this build.

use semver::{Version, VersionReq};

use super::PackageError;

/// Version of the running tool.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What: Parse a version range written as space-separated comparators.
///
/// Inputs:
/// - `range`: Range such as `>=0.4.0 <1.0.0`, alternatives joined by `||`.
///
/// Output:
/// - One requirement per alternative.
///
/// Details:
/// - Comparators separated by whitespace must all hold, as with commas.
fn parse_range(range: &str) -> Result<Vec<VersionReq>, semver::Error> {
    range
        .split("||")
        .map(|alternative| {
            let comparators: Vec<&str> = alternative.split_whitespace().collect();
            VersionReq::parse(&comparators.join(", "))
        })
        .collect()
}

/// Map a parse failure of `value` into a package error.
fn invalid(value: &str) -> impl FnOnce(semver::Error) -> PackageError {
    let value = value.to_string();
    move |source| PackageError::InvalidVersion { value, source }
}

/// What: Check `range` against a specific version.
///
/// Inputs:
/// - `range`: Required version range.
/// - `current`: Version to test.
///
/// Output:
/// - `Ok(())` when any alternative of the range matches.
///
/// # Errors
/// - Returns `Err(PackageError::InvalidVersion)` when the range or version cannot be parsed
/// - Returns `Err(PackageError::IncompatibleVersion)` when no alternative matches
pub fn check_compatible_with(range: &str, current: &str) -> Result<(), PackageError> {
    let version = Version::parse(current).map_err(invalid(current))?;
    let alternatives = parse_range(range).map_err(invalid(range))?;
    if alternatives.iter().any(|req| req.matches(&version)) {
        return Ok(());
    }
    Err(PackageError::IncompatibleVersion {
        required: range.to_string(),
        current: current.to_string(),
    })
}

/// What: Check that this build satisfies a package's required version.
///
/// Inputs:
/// - `range`: `required_version` of a package; empty means any version.
///
/// # Errors
/// - Same as [`check_compatible_with`]
pub fn check_compatible(range: &str) -> Result<(), PackageError> {
    if range.trim().is_empty() {
        return Ok(());
    }
    check_compatible_with(range, CURRENT_VERSION)
}
