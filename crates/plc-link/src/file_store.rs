use crate::{NodePath, Result, StoreError, Value, VariableStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Controller variables kept in a JSON object on disk, keyed by the
/// `/`-joined node path.
///
/// The file is re-read on every access so another process (or an operator
/// with an editor) can play the controller.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Attach to an existing file; a missing file means the controller is
    /// unreachable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = Self { path };
        store.load()?;
        tracing::info!("Attached to variable file {}", store.path.display());
        Ok(store)
    }

    /// Create (or overwrite) the file with the given initial values.
    pub fn create<'a, I>(path: impl Into<PathBuf>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a NodePath, Value)>,
    {
        let store = Self { path: path.into() };
        let map = values
            .into_iter()
            .map(|(p, v)| (p.to_string(), v))
            .collect::<BTreeMap<_, _>>();
        store.save(&map)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, map: &BTreeMap<String, Value>) -> Result<()> {
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;
        fs::write(&self.path, raw)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))
    }
}

impl VariableStore for JsonFileStore {
    fn get(&mut self, path: &NodePath) -> Result<Value> {
        let key = path.to_string();
        let map = self.load().map_err(|e| StoreError::ReadFailed {
            path: key.clone(),
            reason: e.to_string(),
        })?;
        map.get(&key).copied().ok_or(StoreError::ReadFailed {
            path: key,
            reason: "no such node".to_string(),
        })
    }

    fn set(&mut self, path: &NodePath, value: Value) -> Result<()> {
        let key = path.to_string();
        let write_failed = |e: StoreError| StoreError::WriteFailed {
            path: key.clone(),
            reason: e.to_string(),
        };
        let mut map = self.load().map_err(write_failed)?;
        map.insert(key.clone(), value);
        self.save(&map).map_err(write_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonFileStore::open(dir.path().join("plc.json")),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn values_persist_across_handles() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("plc.json");
        let run = NodePath::new(["0:Objects", "4:run_program"]);
        let session = NodePath::new(["0:Objects", "4:sessionNumber"]);
        JsonFileStore::create(&file, [(&run, Value::Bool(false))])?;

        let mut a = JsonFileStore::open(&file)?;
        a.set(&run, Value::Bool(true))?;
        a.set(&session, Value::Int(2))?;

        let mut b = JsonFileStore::open(&file)?;
        assert_eq!(b.get(&run)?, Value::Bool(true));
        assert_eq!(b.get(&session)?, Value::Int(2));
        assert!(matches!(
            b.get(&NodePath::new(["nope"])),
            Err(StoreError::ReadFailed { .. })
        ));
        Ok(())
    }
}
