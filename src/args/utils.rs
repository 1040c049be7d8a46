//! Shared utilities for argument processing.

/// Filter directive enabling the per-field diff walk on top of the default level.
pub const DIFF_TRACE_FILTER: &str = "info,hoist::diff=trace";

/// What: Determine the log filter based on command-line arguments and environment variables.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - `EnvFilter` directive string, e.g. `info` or `info,hoist::diff=trace`.
///
/// Details:
/// - Verbose flag overrides log_level argument.
/// - HOIST_DIFF_TRACE=1 traces only the `hoist::diff` target.
#[must_use]
pub fn determine_log_level(args: &crate::args::Args) -> String {
    let diff_trace = std::env::var("HOIST_DIFF_TRACE").ok().as_deref() == Some("1");
    select_log_filter(args.verbose, diff_trace, &args.log_level)
}

/// Pick the filter from already-read inputs.
fn select_log_filter(verbose: bool, diff_trace: bool, log_level: &str) -> String {
    if verbose {
        "debug".to_string()
    } else if diff_trace {
        DIFF_TRACE_FILTER.to_string()
    } else {
        log_level.to_string()
    }
}

/// What: Resolve a package argument to a file path.
///
/// Inputs:
/// - `install_path`: Directory holding installed packages.
/// - `package`: Package name or path.
///
/// Output:
/// - `package` itself when it contains a path separator or names an existing file,
///   otherwise `install_path/package`.
#[must_use]
pub fn resolve_package_path(install_path: &std::path::Path, package: &str) -> std::path::PathBuf {
    let as_path = std::path::Path::new(package);
    if package.contains(std::path::MAIN_SEPARATOR) || as_path.is_file() {
        as_path.to_path_buf()
    } else {
        install_path.join(package)
    }
}
