use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    /// `None` for `@name`, `Some("")` for `@name ` with nothing after the space.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    pub target_tag: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueNode {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub character_id: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub commands: Vec<Command>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub choices: Vec<Choice>,
}

/// Compiled nodes in the order they were closed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DialogueGraph {
    pub nodes: Vec<DialogueNode>,
}

impl DialogueGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Command {
    pub fn new(name: impl Into<String>, parameter: Option<&str>) -> Self {
        Command {
            name: name.into(),
            parameter: parameter.map(str::to_string),
        }
    }
}

impl Choice {
    pub fn new(text: impl Into<String>, target_tag: impl Into<String>) -> Self {
        Choice {
            text: text.into(),
            target_tag: target_tag.into(),
        }
    }
}
