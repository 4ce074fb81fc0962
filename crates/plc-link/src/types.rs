use core::fmt;
use serde::{Deserialize, Serialize};

/// The five controller variables the checker depends on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlcVariable {
    /// Planting cycle is active.
    Run,
    /// Operator asked the checker to shut down.
    Exit,
    /// Counter identifying the current planting cycle.
    Session,
    /// Output: object stands vertically.
    Vertical,
    /// Output: object does not stand vertically.
    NonVertical,
}

impl PlcVariable {
    pub const ALL: [PlcVariable; 5] = [
        PlcVariable::Run,
        PlcVariable::Exit,
        PlcVariable::Session,
        PlcVariable::Vertical,
        PlcVariable::NonVertical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlcVariable::Run => "run flag",
            PlcVariable::Exit => "exit flag",
            PlcVariable::Session => "session number",
            PlcVariable::Vertical => "vertical-result flag",
            PlcVariable::NonVertical => "non-vertical-result flag",
        }
    }

    fn index(self) -> usize {
        match self {
            PlcVariable::Run => 0,
            PlcVariable::Exit => 1,
            PlcVariable::Session => 2,
            PlcVariable::Vertical => 3,
            PlcVariable::NonVertical => 4,
        }
    }
}

impl fmt::Display for PlcVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scalar held by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "bool {b}"),
            Value::Int(i) => write!(f, "int {i}"),
        }
    }
}

/// Address of a node in the controller's hierarchy, root first.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Parse the `/`-joined form produced by `Display`.
    pub fn parse(s: &str) -> Self {
        Self::new(s.split('/').filter(|seg| !seg.is_empty()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Names of the controller variables inside the program node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    pub run: String,
    pub exit: String,
    pub session: String,
    pub vertical: String,
    pub non_vertical: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            run: "run_program".to_string(),
            exit: "exit_script".to_string(),
            session: "sessionNumber".to_string(),
            vertical: "tree_vertical".to_string(),
            non_vertical: "tree_non_vertical".to_string(),
        }
    }
}

/// Where the variables live: a base path plus a namespace-qualified leaf.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlcLayout {
    pub namespace: u16,
    pub base_path: Vec<String>,
    pub variables: VariableNames,
}

impl Default for PlcLayout {
    fn default() -> Self {
        Self {
            namespace: 4,
            base_path: [
                "0:Objects",
                "2:DeviceSet",
                "4:CODESYS Control Win V3 x64",
                "3:Resources",
                "4:Application",
                "3:Programs",
                "4:PLC_PRG",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            variables: VariableNames::default(),
        }
    }
}

impl PlcLayout {
    fn name_of(&self, var: PlcVariable) -> &str {
        match var {
            PlcVariable::Run => &self.variables.run,
            PlcVariable::Exit => &self.variables.exit,
            PlcVariable::Session => &self.variables.session,
            PlcVariable::Vertical => &self.variables.vertical,
            PlcVariable::NonVertical => &self.variables.non_vertical,
        }
    }

    /// Resolve every variable to its full path once.
    pub fn resolve(&self) -> VariableMap {
        let paths = PlcVariable::ALL.map(|var| {
            let mut segments = self.base_path.clone();
            segments.push(format!("{}:{}", self.namespace, self.name_of(var)));
            NodePath(segments)
        });
        VariableMap { paths }
    }
}

/// Fully resolved, immutable paths of the five variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableMap {
    paths: [NodePath; 5],
}

impl VariableMap {
    pub fn path(&self, var: PlcVariable) -> &NodePath {
        &self.paths[var.index()]
    }
}

impl Default for VariableMap {
    fn default() -> Self {
        PlcLayout::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_resolves_codesys_paths() {
        let map = VariableMap::default();
        let session = map.path(PlcVariable::Session);
        assert_eq!(session.segments().len(), 8);
        assert_eq!(session.segments()[0], "0:Objects");
        assert_eq!(session.segments()[7], "4:sessionNumber");
        assert_eq!(
            map.path(PlcVariable::NonVertical).segments()[7],
            "4:tree_non_vertical"
        );
    }

    #[test]
    fn resolved_paths_are_distinct() {
        let map = VariableMap::default();
        for a in PlcVariable::ALL {
            for b in PlcVariable::ALL {
                if a != b {
                    assert_ne!(map.path(a), map.path(b));
                }
            }
        }
    }

    #[test]
    fn custom_names_and_namespace() {
        let layout = PlcLayout {
            namespace: 6,
            base_path: vec!["Root".into()],
            variables: VariableNames {
                run: "go".into(),
                ..VariableNames::default()
            },
        };
        let map = layout.resolve();
        assert_eq!(map.path(PlcVariable::Run).to_string(), "Root/6:go");
    }

    #[test]
    fn node_path_display_parses_back() {
        let p = NodePath::new(["0:Objects", "4:PLC_PRG", "4:exit_script"]);
        assert_eq!(NodePath::parse(&p.to_string()), p);
    }

    #[test]
    fn value_json_is_untagged() {
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::from_str::<Value>("3").unwrap(), Value::Int(3));
    }
}
