//! Client-side checks that mirror the server's own constraints, so obviously
//! bad submissions fail before a round trip.
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::errors::{ClientError, ClientResult};
use crate::models::agent::{AgentDraft, AgentPatch};

lazy_static! {
    static ref TOOL_NAME: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{2,30}$").unwrap();
}

pub const TOOL_DESCRIPTION_MIN: usize = 5;
pub const TOOL_DESCRIPTION_MAX: usize = 120;
pub const TOOL_CODE_MIN: usize = 10;
pub const TOOL_CODE_MAX: usize = 2000;
pub const TOOL_CODE_MAX_NEWLINES: usize = 120;

const BANNED_IMPORTS: &[&str] = &[
    "import os",
    "import sys",
    "import subprocess",
    "from os ",
    "from sys ",
    "from subprocess ",
];

fn invalid(message: impl Into<String>) -> ClientError {
    ClientError::Validation(message.into())
}

pub fn validate_agent_draft(draft: &AgentDraft) -> ClientResult<()> {
    require_non_empty("name", &draft.name)?;
    require_non_empty("description", &draft.description)?;
    validate_tool_selection(&draft.tools)
}

pub fn validate_agent_patch(patch: &AgentPatch) -> ClientResult<()> {
    if let Some(name) = &patch.name {
        require_non_empty("name", name)?;
    }
    if let Some(description) = &patch.description {
        require_non_empty("description", description)?;
    }
    if let Some(tools) = &patch.tools {
        validate_tool_selection(tools)?;
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_tool_selection(tools: &[String]) -> ClientResult<()> {
    let mut seen = HashSet::new();
    for tool in tools {
        if tool.trim().is_empty() {
            return Err(invalid("tool identifiers must not be empty"));
        }
        if !seen.insert(tool.as_str()) {
            return Err(invalid(format!("tool '{}' is selected more than once", tool)));
        }
    }
    Ok(())
}

/// Tool names must start with a letter or underscore, continue with letters,
/// digits or underscores, and be 3 to 31 characters long.
pub fn validate_tool_name(name: &str) -> ClientResult<()> {
    if !TOOL_NAME.is_match(name) {
        return Err(invalid(format!(
            "tool name '{}' must match {}",
            name,
            TOOL_NAME.as_str()
        )));
    }
    Ok(())
}

pub fn validate_tool_description(description: &str) -> ClientResult<()> {
    let len = description.chars().count();
    if !(TOOL_DESCRIPTION_MIN..=TOOL_DESCRIPTION_MAX).contains(&len) {
        return Err(invalid(format!(
            "description must be {}-{} characters, got {}",
            TOOL_DESCRIPTION_MIN, TOOL_DESCRIPTION_MAX, len
        )));
    }
    Ok(())
}

pub fn validate_tool_code(code: &str) -> ClientResult<()> {
    let len = code.chars().count();
    if !(TOOL_CODE_MIN..=TOOL_CODE_MAX).contains(&len) {
        return Err(invalid(format!(
            "code must be {}-{} characters, got {}",
            TOOL_CODE_MIN, TOOL_CODE_MAX, len
        )));
    }
    if code.matches('\n').count() > TOOL_CODE_MAX_NEWLINES {
        return Err(invalid(format!(
            "code is limited to about {} lines",
            TOOL_CODE_MAX_NEWLINES
        )));
    }
    if !code.contains("async def") {
        return Err(invalid("code must define an async function"));
    }
    if let Some(banned) = BANNED_IMPORTS.iter().find(|b| code.contains(**b)) {
        return Err(invalid(format!(
            "disallowed import detected ({})",
            banned.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_pattern() {
        for ok in ["abc", "_private", "web_search", "Tool_2", "a".repeat(31).as_str()] {
            assert!(validate_tool_name(ok).is_ok(), "{} should pass", ok);
        }
        for bad in ["ab", "2fast", "has space", "dash-name", "", "a".repeat(32).as_str()] {
            assert!(validate_tool_name(bad).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_tool_description_bounds() {
        assert!(validate_tool_description("tiny").is_err());
        assert!(validate_tool_description("Reverse a string").is_ok());
        assert!(validate_tool_description(&"x".repeat(121)).is_err());
        assert!(validate_tool_description(&"x".repeat(120)).is_ok());
    }

    #[test]
    fn test_tool_code_rules() {
        let good = "async def reverse_string(text: str) -> str:\n    return text[::-1]";
        assert!(validate_tool_code(good).is_ok());

        assert!(validate_tool_code("def f(): 1").is_err());
        assert!(validate_tool_code("short").is_err());

        let banned = "import os\nasync def f(x: str) -> str:\n    return os.getcwd()";
        let err = validate_tool_code(banned).unwrap_err();
        assert!(err.to_string().contains("import os"));

        let long = format!("async def f(x):\n{}", "    pass\n".repeat(121));
        assert!(long.len() < TOOL_CODE_MAX);
        assert!(validate_tool_code(&long).is_err());
    }

    #[test]
    fn test_agent_draft_rules() {
        assert!(validate_agent_draft(&AgentDraft::new("T", "D").with_tool("web_search")).is_ok());
        assert!(validate_agent_draft(&AgentDraft::new("  ", "D")).is_err());
        assert!(validate_agent_draft(&AgentDraft::new("T", "")).is_err());

        let mut dup = AgentDraft::new("T", "D");
        dup.tools = vec!["calculator".to_string(), "calculator".to_string()];
        assert!(validate_agent_draft(&dup).is_err());
    }

    #[test]
    fn test_agent_patch_rules() {
        assert!(validate_agent_patch(&AgentPatch::default()).is_ok());
        assert!(validate_agent_patch(&AgentPatch::default().name("Updated Agent")).is_ok());
        assert!(validate_agent_patch(&AgentPatch::default().description("")).is_err());
        assert!(validate_agent_patch(&AgentPatch::default().tools(["a", "a"])).is_err());
    }
}
