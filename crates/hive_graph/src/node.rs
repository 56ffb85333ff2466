//! Node data passed to hooks and handlers.
//!
//! A node is described by a [`NodeSpec`], receives [`NodeInputs`], and
//! produces a [`NodeResult`]. Inputs and outputs are JSON object maps so
//! that hooks can inspect them without knowing the node's concrete types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inputs handed to a node, keyed by input name.
pub type NodeInputs = Map<String, Value>;

/// Outputs produced by a node, keyed by output name.
pub type NodeOutput = Map<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// NodeSpec
// ─────────────────────────────────────────────────────────────────────────────

/// Static description of a node in a graph.
///
/// # Example
///
/// ```
/// use hive_graph::node::NodeSpec;
///
/// let spec = NodeSpec::new("summarize")
///     .with_name("Summarize document")
///     .with_node_type("llm_generate")
///     .with_input_keys(["document"])
///     .with_output_keys(["summary"]);
///
/// assert_eq!(spec.id, "summarize");
/// assert_eq!(spec.input_keys, vec!["document".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique identifier of the node within its graph.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Informal kind of node (e.g. `"function"`, `"llm_generate"`).
    pub node_type: String,
    /// Input keys the node reads.
    #[serde(default)]
    pub input_keys: Vec<String>,
    /// Output keys the node writes.
    #[serde(default)]
    pub output_keys: Vec<String>,
}

impl NodeSpec {
    /// Node type used when none is given.
    pub const DEFAULT_NODE_TYPE: &'static str = "function";

    /// Creates a spec whose name defaults to its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            node_type: Self::DEFAULT_NODE_TYPE.to_owned(),
            input_keys: Vec::new(),
            output_keys: Vec::new(),
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the node type.
    #[must_use]
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Sets the input keys.
    #[must_use]
    pub fn with_input_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output keys.
    #[must_use]
    pub fn with_output_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeResult
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of executing a node.
///
/// Usage counters default to zero; the executor fills in `latency_ms` for
/// nodes it actually runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    /// Whether the node completed successfully.
    pub success: bool,
    /// Values produced by the node.
    #[serde(default)]
    pub output: NodeOutput,
    /// Error message for failed nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Tokens consumed while executing the node.
    #[serde(default)]
    pub tokens_used: u64,
    /// Wall-clock execution time in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

impl NodeResult {
    /// Creates a successful result with the given output.
    #[must_use]
    pub fn success(output: NodeOutput) -> Self {
        Self {
            success: true,
            output,
            ..Self::default()
        }
    }

    /// Creates a failed result carrying an error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Sets the number of tokens used.
    #[must_use]
    pub fn with_tokens_used(mut self, tokens_used: u64) -> Self {
        self.tokens_used = tokens_used;
        self
    }

    /// Sets the latency in milliseconds.
    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Adds a single output value.
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.output.insert(key.into(), value.into());
        self
    }
}
