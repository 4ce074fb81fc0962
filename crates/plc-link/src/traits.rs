use crate::{NodePath, Result, Value};

/// A hierarchical key-value store on the controller side.
///
/// Implementations say nothing about transport; they only map a node path to
/// a scalar.
pub trait VariableStore {
    /// Read the current value of one node.
    fn get(&mut self, path: &NodePath) -> Result<Value>;

    /// Write one node.
    fn set(&mut self, path: &NodePath, value: Value) -> Result<()>;
}

impl<T: VariableStore + ?Sized> VariableStore for Box<T> {
    fn get(&mut self, path: &NodePath) -> Result<Value> {
        (**self).get(path)
    }

    fn set(&mut self, path: &NodePath, value: Value) -> Result<()> {
        (**self).set(path, value)
    }
}
