use crate::{NodePath, Result, StoreError, Value, VariableStore};
use std::collections::{HashMap, HashSet, VecDeque};

/// In-process controller with scripted reads and injectable failures.
///
/// A scripted read (`Some(v)` or a failure) is served before the stored
/// value; reading a node that was never written fails.
#[derive(Default, Debug)]
pub struct MockStore {
    values: HashMap<NodePath, Value>,
    scripted: HashMap<NodePath, VecDeque<Option<Value>>>,
    failing_writes: HashSet<NodePath>,
    reads: Vec<NodePath>,
    writes: Vec<(NodePath, Value)>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &NodePath, value: Value) {
        self.values.insert(path.clone(), value);
    }

    /// Queue read outcomes for `path`; `None` makes that read fail.
    pub fn script_reads<I>(&mut self, path: &NodePath, outcomes: I)
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        self.scripted
            .entry(path.clone())
            .or_default()
            .extend(outcomes);
    }

    /// Make the next `n` reads of `path` fail.
    pub fn fail_reads(&mut self, path: &NodePath, n: usize) {
        self.script_reads(path, std::iter::repeat(None).take(n));
    }

    pub fn fail_writes(&mut self, path: &NodePath) {
        self.failing_writes.insert(path.clone());
    }

    pub fn value(&self, path: &NodePath) -> Option<Value> {
        self.values.get(path).copied()
    }

    pub fn read_count(&self, path: &NodePath) -> usize {
        self.reads.iter().filter(|p| *p == path).count()
    }

    pub fn writes(&self) -> &[(NodePath, Value)] {
        &self.writes
    }
}

impl VariableStore for MockStore {
    fn get(&mut self, path: &NodePath) -> Result<Value> {
        self.reads.push(path.clone());
        if let Some(next) = self.scripted.get_mut(path).and_then(|q| q.pop_front()) {
            return next.ok_or_else(|| StoreError::ReadFailed {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.values
            .get(path)
            .copied()
            .ok_or_else(|| StoreError::ReadFailed {
                path: path.to_string(),
                reason: "no such node".to_string(),
            })
    }

    fn set(&mut self, path: &NodePath, value: Value) -> Result<()> {
        if self.failing_writes.contains(path) {
            return Err(StoreError::WriteFailed {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.writes.push((path.clone(), value));
        self.values.insert(path.clone(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_reads_precede_stored_value() {
        let p = NodePath::new(["a", "b"]);
        let mut s = MockStore::new();
        s.insert(&p, Value::Int(1));
        s.script_reads(&p, [Some(Value::Int(7)), None]);
        assert_eq!(s.get(&p).unwrap(), Value::Int(7));
        assert!(matches!(s.get(&p), Err(StoreError::ReadFailed { .. })));
        assert_eq!(s.get(&p).unwrap(), Value::Int(1));
        assert_eq!(s.read_count(&p), 3);
    }

    #[test]
    fn unknown_node_fails_and_writes_can_fail() {
        let p = NodePath::new(["x"]);
        let mut s = MockStore::new();
        assert!(s.get(&p).is_err());
        s.fail_writes(&p);
        assert!(matches!(
            s.set(&p, Value::Bool(true)),
            Err(StoreError::WriteFailed { .. })
        ));
        assert!(s.writes().is_empty());
    }
}
