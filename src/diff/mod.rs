//! Change diffing between two package configurations.
//!
//! Two reports are built on the same field walk:
//! - [`DiffReport`] lists every changed field with raw values.
//! - [`PermissionChangeReport`] explains, in plain sentences, which host
//!   access a fresh install or an update grants or revokes.
//!
//! Everything here is pure: no I/O, no shared state.

pub mod change;
pub mod fields;
pub mod format;
pub mod permissions;
pub mod report;

pub use change::{ChangeValue, StructChange};
pub use fields::{FIELDS, FieldKind, FieldSpec};
pub use format::{Formatter, FormatterRegistry, Rewrite};
pub use permissions::{InstallMode, PermissionChangeReport};
pub use report::{ChangeSet, DiffReport};
