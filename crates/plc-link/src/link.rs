use crate::{PlcVariable, Result, StoreError, Value, VariableMap, VariableStore};

/// Typed view of a [`VariableStore`] restricted to the five known variables.
pub struct ControllerLink<S> {
    store: S,
    map: VariableMap,
}

impl<S: VariableStore> ControllerLink<S> {
    pub fn new(store: S, map: VariableMap) -> Self {
        Self { store, map }
    }

    pub fn map(&self) -> &VariableMap {
        &self.map
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn read(&mut self, var: PlcVariable) -> Result<Value> {
        self.store.get(self.map.path(var))
    }

    pub fn read_flag(&mut self, var: PlcVariable) -> Result<bool> {
        let value = self.read(var)?;
        value.as_bool().ok_or_else(|| StoreError::TypeMismatch {
            path: self.map.path(var).to_string(),
            expected: "bool",
            found: value.to_string(),
        })
    }

    pub fn read_session(&mut self) -> Result<i64> {
        let value = self.read(PlcVariable::Session)?;
        value.as_int().ok_or_else(|| StoreError::TypeMismatch {
            path: self.map.path(PlcVariable::Session).to_string(),
            expected: "int",
            found: value.to_string(),
        })
    }

    pub fn write_flag(&mut self, var: PlcVariable, on: bool) -> Result<()> {
        self.store.set(self.map.path(var), Value::Bool(on))
    }

    /// Raise exactly one of the two result outputs and lower the other.
    ///
    /// The other output is lowered first, so a failed write never leaves both
    /// outputs raised.
    pub fn report_verdict(&mut self, vertical: bool) -> Result<()> {
        let (raise, lower) = if vertical {
            (PlcVariable::Vertical, PlcVariable::NonVertical)
        } else {
            (PlcVariable::NonVertical, PlcVariable::Vertical)
        };
        self.write_flag(lower, false)?;
        self.write_flag(raise, true)?;
        tracing::info!("Reported {} to controller", raise);
        Ok(())
    }
}
