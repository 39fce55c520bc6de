//! Pluggable tool system.
//!
//! A tool is a named, described unit of external capability with a
//! declarative parameter list. Tools are registered by value into a
//! [`ToolRegistry`], which derives each tool's serialized function name,
//! publishes OpenAI function schemas, validates call arguments, and resolves
//! model tool calls back to tools.

pub mod documents;
pub mod history;
pub mod search;
pub mod weather;
pub mod webpage;
pub mod writer;

use crate::error::{ConfigError, ToolError};
use crate::types::{FunctionDefinition, ToolDefinition};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// Argument key injected into every schema to capture the model's rationale.
pub const REASONING_KEY: &str = "reasoning";
const REASONING_DESCRIPTION: &str =
    "Why did you decide to take this action? Explain your thoughts.";

/// Substituted for an empty result list so rendered results are never blank.
pub const NO_RESULT: &str = "This tool run did not yield a result.";

/// Upper bound on serialized function names accepted by the API.
const MAX_SERIALIZED_NAME_LEN: usize = 64;

/// Call arguments as decoded from the model's JSON payload.
pub type Arguments = Map<String, Value>;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// JSON Schema primitive type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Object,
    Array,
    Boolean,
    Null,
}

/// One named input accepted by a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParam {
    name: String,
    param_type: ParamType,
    description: String,
    required: bool,
    enum_values: Option<Vec<String>>,
}

impl ToolParam {
    /// A parameter the model must always supply.
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            enum_values: None,
        }
    }

    /// A parameter the model may omit.
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// Restrict the parameter to a closed set of string values.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.param_type,
            "description": self.description,
        });
        if let Some(values) = &self.enum_values {
            schema["enum"] = json!(values);
        }
        schema
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Binary payload returned by tools that produce images instead of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Normalized output of one tool run.
///
/// Constructors guarantee the result body is never empty: a run without text
/// results and without an image carries [`NO_RESULT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    source: String,
    results: Vec<String>,
    image: Option<ImagePayload>,
    is_final: bool,
}

impl ToolResult {
    /// Wrap textual results from `source`.
    pub fn new(source: impl Into<String>, results: Vec<String>) -> Self {
        let results = if results.is_empty() {
            vec![NO_RESULT.to_string()]
        } else {
            results
        };
        Self {
            source: source.into(),
            results,
            image: None,
            is_final: false,
        }
    }

    /// Result for a run that produced nothing.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, Vec::new())
    }

    /// Wrap a binary image payload from `source`.
    pub fn image(source: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            source: source.into(),
            results: Vec::new(),
            image: Some(image),
            is_final: false,
        }
    }

    /// Mark this result as the conversation's final answer.
    pub fn into_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn image_payload(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Prompt rendering: `Source: {source}\n\nResults:\n{results}`.
    pub fn render(&self) -> String {
        let body = match (&self.image, self.results.is_empty()) {
            (Some(image), true) => format!(
                "[{} image, {} bytes]",
                image.mime_type,
                image.data.len()
            ),
            _ => self.results.join("\n\n"),
        };
        format!("Source: {}\n\nResults:\n{}", self.source, body)
    }
}

// ---------------------------------------------------------------------------
// Tool trait
// ---------------------------------------------------------------------------

/// A capability the model can invoke.
///
/// Implementations only see arguments that already passed required-parameter
/// validation. Build results with [`ToolResult::new`] using the tool's
/// display name as source.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// Declared parameters, in schema order.
    fn params(&self) -> &[ToolParam];

    /// Run tool-specific logic with validated arguments.
    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError>;
}

/// Derive the API function name for a display name.
///
/// Lowercases, maps spaces to underscores, drops every character outside
/// `[a-z0-9_-]` and truncates to 64 characters.
pub fn serialize_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .take(MAX_SERIALIZED_NAME_LEN)
        .collect()
}

/// Check that every required parameter is present in `arguments`.
///
/// Extra keys are ignored.
pub fn validate_arguments(params: &[ToolParam], arguments: &Arguments) -> Result<(), ToolError> {
    let missing: Vec<String> = params
        .iter()
        .filter(|p| p.required && !arguments.contains_key(&p.name))
        .map(|p| p.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let received = arguments.keys().cloned().collect::<BTreeSet<_>>();
    Err(ToolError::MissingParameters {
        missing,
        received: received.into_iter().collect(),
    })
}

/// Read a required string argument.
pub fn string_arg<'a>(arguments: &'a Arguments, key: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("`{key}` must be a string")))
}

/// Read a required non-negative integer argument.
///
/// Models sometimes quote numbers, so numeric strings are accepted as well.
pub fn count_arg(arguments: &Arguments, key: &str) -> Result<usize, ToolError> {
    let value = arguments.get(key);
    value
        .and_then(Value::as_u64)
        .or_else(|| value.and_then(Value::as_str).and_then(|s| s.trim().parse().ok()))
        .map(|n| n as usize)
        .ok_or_else(|| {
            ToolError::InvalidArguments(format!("`{key}` must be a non-negative integer"))
        })
}

// ---------------------------------------------------------------------------
// Tool registry
// ---------------------------------------------------------------------------

/// A registered tool together with its derived serialized name.
pub struct Capability {
    serialized_name: String,
    tool: Box<dyn Tool>,
}

impl Capability {
    pub fn name(&self) -> &str {
        self.tool.name()
    }

    pub fn serialized_name(&self) -> &str {
        &self.serialized_name
    }

    pub fn description(&self) -> &str {
        self.tool.description()
    }

    pub fn params(&self) -> &[ToolParam] {
        self.tool.params()
    }

    /// Validate arguments, then run the tool.
    pub async fn run(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        validate_arguments(self.tool.params(), arguments)?;
        self.tool.execute(arguments).await
    }

    /// OpenAI function schema, optionally with the synthetic reasoning argument.
    pub fn definition(&self, require_reasoning: bool) -> ToolDefinition {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in self.tool.params() {
            properties.insert(param.name.clone(), param.schema());
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        if require_reasoning {
            properties.insert(
                REASONING_KEY.to_string(),
                json!({ "type": "string", "description": REASONING_DESCRIPTION }),
            );
            required.push(Value::String(REASONING_KEY.to_string()));
        }

        ToolDefinition {
            tool_type: "function".into(),
            function: FunctionDefinition {
                name: self.serialized_name.clone(),
                description: self.tool.description().to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }),
            },
        }
    }
}

/// Ordered, name-unique collection of tools available to one agent.
///
/// Uniqueness of serialized names is enforced eagerly on registration, so a
/// registry that exists is always dispatchable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Capability>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|c| c.serialized_name()))
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build a registry from an ordered tool list.
    pub fn from_tools(tools: Vec<Box<dyn Tool>>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register_boxed(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), ConfigError> {
        self.register_boxed(Box::new(tool))
    }

    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) -> Result<(), ConfigError> {
        check_params(tool.as_ref())?;
        let serialized_name = serialize_name(tool.name());
        if serialized_name.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "tool name `{}` has no characters usable in a function name",
                tool.name()
            )));
        }
        if let Some(existing) = self
            .tools
            .iter()
            .find(|c| c.serialized_name == serialized_name)
        {
            return Err(ConfigError::DuplicateToolName {
                serialized_name,
                first: existing.name().to_string(),
                second: tool.name().to_string(),
            });
        }
        self.tools.push(Capability {
            serialized_name,
            tool,
        });
        Ok(())
    }

    /// First tool whose display name or serialized name equals `name`.
    pub fn resolve(&self, name: &str) -> Option<&Capability> {
        self.tools
            .iter()
            .find(|c| c.name() == name || c.serialized_name == name)
    }

    /// Function schemas for every registered tool, in registration order.
    pub fn definitions(&self, require_reasoning: bool) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|c| c.definition(require_reasoning))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn check_params(tool: &dyn Tool) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidToolParameter {
        tool: tool.name().to_string(),
        reason,
    };
    let mut seen = BTreeSet::new();
    for param in tool.params() {
        if param.name.trim().is_empty() {
            return Err(invalid("parameter name must not be empty".into()));
        }
        if param.name == REASONING_KEY {
            return Err(invalid(format!("`{REASONING_KEY}` is a reserved parameter name")));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(invalid(format!("parameter `{}` declared twice", param.name)));
        }
        if let Some(values) = &param.enum_values {
            if param.param_type != ParamType::String {
                return Err(invalid(format!(
                    "parameter `{}` declares enum values but is not a string",
                    param.name
                )));
            }
            if values.is_empty() {
                return Err(invalid(format!("parameter `{}` has an empty enum", param.name)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::EchoTool;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn serialize_name_examples() {
        assert_eq!(serialize_name("Document Search"), "document_search");
        assert_eq!(
            serialize_name("Retrieve Conversation History"),
            "retrieve_conversation_history"
        );
        assert_eq!(serialize_name("Weather (API) v2!"), "weather_api_v2");
        assert_eq!(serialize_name("dash-ok_Under"), "dash-ok_under");
        assert_eq!(serialize_name("Wetter für München"), "wetter_fr_mnchen");
        assert_eq!(serialize_name(&"x".repeat(100)).len(), 64);
        assert_eq!(serialize_name(""), "");
    }

    #[test]
    fn new_registry_is_empty() {
        assert!(ToolRegistry::new().is_empty());
        assert!(ToolRegistry::default().is_empty());
    }

    #[test]
    fn registry_rejects_names_that_serialize_identically() {
        let mut r = ToolRegistry::new();
        r.register(EchoTool::named("Echo Tool")).unwrap();
        let err = r.register(EchoTool::named("echo tool!")).unwrap_err();
        match err {
            ConfigError::DuplicateToolName {
                serialized_name,
                first,
                second,
            } => {
                assert_eq!(serialized_name, "echo_tool");
                assert_eq!(first, "Echo Tool");
                assert_eq!(second, "echo tool!");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn from_tools_fails_eagerly_on_duplicates() {
        let result = ToolRegistry::from_tools(vec![
            Box::new(EchoTool::named("Search")),
            Box::new(EchoTool::named("search")),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateToolName { .. })));
    }

    #[test]
    fn registry_rejects_unusable_name() {
        let mut r = ToolRegistry::new();
        assert!(matches!(
            r.register(EchoTool::named("???")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn registry_rejects_malformed_params() {
        let mut r = ToolRegistry::new();
        let dup = EchoTool::with_params(
            "Dup",
            vec![
                ToolParam::required("a", ParamType::String, "a"),
                ToolParam::required("a", ParamType::String, "a"),
            ],
        );
        assert!(matches!(
            r.register(dup),
            Err(ConfigError::InvalidToolParameter { .. })
        ));

        let reserved = EchoTool::with_params(
            "Reserved",
            vec![ToolParam::required(REASONING_KEY, ParamType::String, "r")],
        );
        assert!(r.register(reserved).is_err());

        let bad_enum = EchoTool::with_params(
            "Bad Enum",
            vec![ToolParam::required("n", ParamType::Integer, "n").with_enum(["1"])],
        );
        assert!(r.register(bad_enum).is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn resolve_matches_display_or_serialized_name() {
        let mut r = ToolRegistry::new();
        r.register(EchoTool::named("Echo Tool")).unwrap();
        assert_eq!(r.resolve("echo_tool").unwrap().name(), "Echo Tool");
        assert_eq!(r.resolve("Echo Tool").unwrap().serialized_name(), "echo_tool");
        assert!(r.resolve("echo").is_none());
    }

    #[test]
    fn definition_wire_shape_with_reasoning() {
        let mut r = ToolRegistry::new();
        r.register(EchoTool::with_params(
            "Unit Converter",
            vec![
                ToolParam::required("value", ParamType::Number, "Value to convert."),
                ToolParam::optional("unit", ParamType::String, "Target unit.")
                    .with_enum(["km", "mi"]),
            ],
        ))
        .unwrap();

        let defs = r.definitions(true);
        assert_eq!(defs.len(), 1);
        let value = serde_json::to_value(&defs[0]).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "unit_converter");
        let params = &value["function"]["parameters"];
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["value"]["type"], "number");
        assert_eq!(params["properties"]["unit"]["enum"], json!(["km", "mi"]));
        assert!(params["properties"]["value"].get("enum").is_none());
        assert_eq!(params["properties"]["reasoning"]["type"], "string");
        assert_eq!(params["required"], json!(["value", "reasoning"]));
    }

    #[test]
    fn definition_without_reasoning() {
        let mut r = ToolRegistry::new();
        r.register(EchoTool::named("Echo")).unwrap();
        let value = serde_json::to_value(&r.definitions(false)[0]).unwrap();
        let params = &value["function"]["parameters"];
        assert!(params["properties"].get("reasoning").is_none());
        assert_eq!(params["required"], json!(["text"]));
    }

    #[test]
    fn validate_reports_exactly_the_missing_names() {
        let params = vec![
            ToolParam::required("query", ParamType::String, "q"),
            ToolParam::required("n", ParamType::Integer, "n"),
            ToolParam::optional("lang", ParamType::String, "l"),
        ];
        let err = validate_arguments(&params, &args(json!({"unknown": 1, "other": true})))
            .unwrap_err();
        match err {
            ToolError::MissingParameters { missing, received } => {
                assert_eq!(missing, vec!["n", "query"]);
                assert_eq!(received, vec!["other", "unknown"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_arguments(&params, &args(json!({"query": "x", "n": 1}))).is_ok());
    }

    #[tokio::test]
    async fn run_rejects_missing_parameters_without_executing() {
        let tool = EchoTool::named("Echo");
        let calls = tool.calls();
        let mut r = ToolRegistry::new();
        r.register(tool).unwrap();

        let err = r.resolve("echo").unwrap().run(&Arguments::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingParameters { .. }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let ok = r
            .resolve("echo")
            .unwrap()
            .run(&args(json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(ok.results(), ["hi"]);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_results_are_substituted() {
        let result = ToolResult::new("Echo", Vec::new());
        assert_eq!(result.results(), [NO_RESULT]);
        assert_eq!(result.render(), format!("Source: Echo\n\nResults:\n{NO_RESULT}"));
        assert!(!result.render().ends_with("Results:\n"));
        assert_eq!(ToolResult::empty("x").results(), [NO_RESULT]);
    }

    #[test]
    fn render_joins_results_with_blank_lines() {
        let result = ToolResult::new("Search", vec!["a".into(), "b".into()]);
        assert_eq!(result.render(), "Source: Search\n\nResults:\na\n\nb");
        assert!(!result.is_final());
        assert!(result.into_final().is_final());
    }

    #[test]
    fn image_results_render_a_placeholder() {
        let result = ToolResult::image(
            "Painter",
            ImagePayload {
                mime_type: "image/png".into(),
                data: vec![0; 12],
            },
        );
        assert!(result.results().is_empty());
        assert_eq!(result.render(), "Source: Painter\n\nResults:\n[image/png image, 12 bytes]");
    }

    #[test]
    fn argument_helpers() {
        let a = args(json!({"n": 3, "m": "4", "q": "text", "bad": -1}));
        assert_eq!(count_arg(&a, "n").unwrap(), 3);
        assert_eq!(count_arg(&a, "m").unwrap(), 4);
        assert!(count_arg(&a, "bad").is_err());
        assert_eq!(string_arg(&a, "q").unwrap(), "text");
        assert!(string_arg(&a, "n").is_err());
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serialize_name_is_pure_and_bounded(name in any::<String>()) {
                let first = serialize_name(&name);
                prop_assert_eq!(&first, &serialize_name(&name));
                prop_assert!(first.len() <= MAX_SERIALIZED_NAME_LEN);
                prop_assert!(first
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
            }

            #[test]
            fn serialize_name_is_idempotent(name in "[ -~]{0,80}") {
                let once = serialize_name(&name);
                prop_assert_eq!(serialize_name(&once), once);
            }
        }
    }
}
