//! Go modules and packages
//!
//! [`GoMod`] reads `go.mod`, [`PackageLoader`] maps import paths to
//! directories and groups the files matching its [`BuildTarget`] into
//! [`Package`]s.

pub mod gomod;
pub mod loader;
pub mod package;
pub mod target;

pub use gomod::{GoMod, Replacement, Requirement, is_standard_library, is_within_module};
pub use loader::{PackageLoader, ResolvedImport};
pub use package::{Package, PackageError, PackageErrorKind, PackageOrigin, Symbol};
pub use target::BuildTarget;
