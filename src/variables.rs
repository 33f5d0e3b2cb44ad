//! Persisted scenario variables.
//!
//! Variables live in a [`Config`] tree and are addressed by paths such as
//! `stored_units`, `party.members[2]` or `party.members[2].id`.

use crate::config::{AttributeValue, Config};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariableError {
    #[error("invalid variable name `{0}`")]
    InvalidName(String),
    #[error("variable `{0}` not found")]
    NotFound(String),
    #[error("variable `{0}` is a scalar, not a container")]
    NotAContainer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    name: &'a str,
    index: Option<usize>,
}

fn parse_path(path: &str) -> Result<Vec<Segment<'_>>, VariableError> {
    let invalid = || VariableError::InvalidName(path.to_string());
    if path.trim().is_empty() {
        return Err(invalid());
    }
    path.split('.')
        .map(|raw| {
            let (name, index) = match raw.split_once('[') {
                Some((name, rest)) => {
                    let digits = rest.strip_suffix(']').ok_or_else(invalid)?;
                    let index = digits.parse::<usize>().map_err(|_| invalid())?;
                    (name, Some(index))
                }
                None => (raw, None),
            };
            let valid = !name.is_empty()
                && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if valid {
                Ok(Segment { name, index })
            } else {
                Err(invalid())
            }
        })
        .collect()
}

/// The variable store.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    variables: Config,
}

impl GameData {
    pub fn new(variables: Config) -> Self {
        Self { variables }
    }

    pub fn variables(&self) -> &Config {
        &self.variables
    }

    /// Append `items` as an array variable named `name`.
    pub fn with_array(mut self, name: &str, items: Vec<Config>) -> Self {
        for item in items {
            self.variables.add_child(name, item);
        }
        self
    }

    pub fn with_scalar(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.variables.set(name, value);
        self
    }

    /// Walk every segment but the last, returning the container and the last
    /// segment.
    fn container<'a, 'p>(
        &'a self,
        path: &'p str,
    ) -> Result<(&'a Config, Segment<'p>), VariableError> {
        let mut segments = parse_path(path)?;
        let last = segments
            .pop()
            .ok_or_else(|| VariableError::InvalidName(path.to_string()))?;
        let mut node = &self.variables;
        for segment in segments {
            node = node
                .child_range(segment.name)
                .nth(segment.index.unwrap_or(0))
                .ok_or_else(|| VariableError::NotFound(path.to_string()))?;
        }
        Ok((node, last))
    }

    /// Resolve `path` to an array of containers. An indexed last segment
    /// yields a single-element array.
    pub fn get_variable_array(&self, path: &str) -> Result<Vec<&Config>, VariableError> {
        let (node, last) = self.container(path)?;
        let items: Vec<&Config> = match last.index {
            Some(index) => node.child_range(last.name).nth(index).into_iter().collect(),
            None => node.child_range(last.name).collect(),
        };
        if !items.is_empty() {
            return Ok(items);
        }
        if last.index.is_none() && node.has_attribute(last.name) {
            Err(VariableError::NotAContainer(path.to_string()))
        } else {
            Err(VariableError::NotFound(path.to_string()))
        }
    }

    pub fn get_variable_scalar(&self, path: &str) -> Result<&AttributeValue, VariableError> {
        let (node, last) = self.container(path)?;
        if last.index.is_some() || !node.has_attribute(last.name) {
            return Err(VariableError::NotFound(path.to_string()));
        }
        Ok(node.get(last.name))
    }
}
