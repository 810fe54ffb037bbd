//! Tool Registry
//!
//! Name-keyed store of tools. Listing order is registration order so
//! `tools/list` output is stable.

use super::{Tool, ToolDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool registry
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => {
                warn!(tool = %name, "Replacing registered tool");
                self.tools[slot] = tool;
            }
            None => {
                self.index.insert(name.clone(), self.tools.len());
                self.tools.push(tool);
                debug!(tool = %name, "Registered tool");
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.tools[slot]))
    }

    /// Check if a tool exists
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Definitions for every tool, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::from_tool(t.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
