//! plc-link: controller variable access for the verticality checker
//!
//! The controller is seen as a hierarchical key-value store
//! ([`VariableStore`]). Only five logical variables matter; their paths are
//! resolved once from a [`PlcLayout`] into an immutable [`VariableMap`] and
//! accessed through the typed [`ControllerLink`]. The default build enables
//! a scripted `mock` store; [`JsonFileStore`] backs bench runs.

mod types;
pub use types::{NodePath, PlcLayout, PlcVariable, Value, VariableMap, VariableNames};

mod error;
pub use error::{Result, StoreError};

mod traits;
pub use traits::VariableStore;

mod link;
pub use link::ControllerLink;

mod file_store;
pub use file_store::JsonFileStore;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockStore;
