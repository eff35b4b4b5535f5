#![deny(unsafe_code)]

pub mod csv_utils;
pub mod ct_loader;
pub mod error;
pub mod loaders;
pub mod registry;

pub use crate::csv_utils::{STANDARDS_ENV_VAR, default_standards_root};
pub use crate::ct_loader::{load_ct_catalog, load_ct_registry};
pub use crate::error::StandardsError;
pub use crate::loaders::load_domains;
pub use crate::registry::StandardsRegistry;
