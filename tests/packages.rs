//! Package file, diff and permission report tests through the public API.

#[path = "packages/file_reports.rs"]
mod file_reports;
#[path = "packages/image_checks.rs"]
mod image_checks;
