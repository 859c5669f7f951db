use std::collections::HashMap;

/// A fully resolved value. Nothing in here refers back to the constant table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
}

impl Value {
    /// Short human name for the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Text(_) => "a string",
            Value::Array(_) => "an array",
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(_) | Value::Array(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Array(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// One `name = value;` statement after evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Value,
}

/// The parser's output: every assignment, in source order, duplicates included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub assignments: Vec<Assignment>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            assignments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }
}

/// Names assigned so far in one parse, mapped to their resolved values.
///
/// Iteration follows first-assignment order. Reassigning a name keeps its
/// slot and replaces the value.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert or overwrite `name`, returning the previous value if any.
    pub fn insert(&mut self, name: String, value: Value) -> Option<Value> {
        match self.index.get(&name) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
