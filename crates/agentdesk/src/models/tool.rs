use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A callable capability registered on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Stable identifier, also the name the agent calls it by
    pub id: String,
    /// Human-friendly form of `id`
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

impl Tool {
    /// Build a tool from one entry of the server's `id -> metadata` mapping.
    ///
    /// Metadata is read leniently: a missing description becomes empty and a
    /// `parameters` value that is not an array of strings yields no parameters.
    pub fn from_metadata(id: &str, metadata: &Value) -> Self {
        let description = metadata
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parameters = metadata
            .get("parameters")
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Tool {
            id: id.to_string(),
            name: display_name(id),
            description,
            parameters,
        }
    }
}

/// Convert the server's tool mapping into a list ordered by id.
pub fn tools_from_map(map: &Map<String, Value>) -> Vec<Tool> {
    let mut tools: Vec<Tool> = map
        .iter()
        .map(|(id, metadata)| Tool::from_metadata(id, metadata))
        .collect();
    tools.sort_by(|a, b| a.id.cmp(&b.id));
    tools
}

/// Turn a tool id into a display name: separators become spaces and the first
/// letter of every word is upper-cased. `web_search` becomes `Web Search`.
pub fn display_name(id: &str) -> String {
    let mut name = String::with_capacity(id.len());
    let mut in_word = false;
    for c in id.chars() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if c.is_alphanumeric() {
            if in_word {
                name.push(c);
            } else {
                name.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            name.push(c);
            in_word = false;
        }
    }
    name
}
