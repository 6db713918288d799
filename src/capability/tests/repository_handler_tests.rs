//! Unit tests for action and template request handling.

use crate::capability::{
    domain::{
        ActionCapability, ActionDefinition, BehaviourError, CapabilityErrorKind, DocumentSchema,
        NamePrefix, TemplateCapability, TemplateDefinition, TemplateMessage,
    },
    ports::ProtocolFault,
    services::{Registry, RegistryConfig},
};
use rstest::{fixture, rstest};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize, JsonSchema)]
struct Greeting {
    name: String,
}

#[fixture]
fn registry() -> Registry {
    let registry = Registry::new(RegistryConfig::new(NamePrefix::from("mcp")));

    let greet = ActionDefinition::<Greeting, String>::new("greet", "Greets by name")
        .expect("valid definition");
    registry
        .register_action(ActionCapability::new(greet, |input: Greeting| async move {
            Ok::<_, BehaviourError>(format!("hello {}", input.name))
        }))
        .expect("greet registers");

    let fail = ActionDefinition::<Greeting, String>::new("fail", "Always fails")
        .expect("valid definition");
    registry
        .register_action(ActionCapability::new(fail, |_input: Greeting| async move {
            Err::<String, BehaviourError>("upstream timed out".into())
        }))
        .expect("fail registers");

    let document = ActionDefinition::with_schemas(
        "inspect",
        "Returns its raw arguments",
        DocumentSchema::new(json!({"type": "object"})).expect("schema compiles"),
        DocumentSchema::new(json!({"type": "object"})).expect("schema compiles"),
    )
    .expect("valid definition");
    registry
        .register_action(ActionCapability::new(document, |raw: Value| async move {
            Ok::<_, BehaviourError>(raw)
        }))
        .expect("inspect registers");

    let outline = TemplateDefinition::<Greeting>::new("outline", "Outlines a letter")
        .expect("valid definition");
    registry
        .register_template(TemplateCapability::new(outline, |args: Greeting| async move {
            Ok::<_, BehaviourError>(vec![TemplateMessage::user(format!("Dear {}", args.name))])
        }))
        .expect("outline registers");

    let broken = TemplateDefinition::<Greeting>::new("broken", "Never renders")
        .expect("valid definition");
    registry
        .register_template(TemplateCapability::new(broken, |_args: Greeting| async move {
            Err::<Vec<TemplateMessage>, BehaviourError>("renderer offline".into())
        }))
        .expect("broken registers");

    registry
}

#[rstest]
#[tokio::test]
async fn string_results_are_returned_verbatim(registry: Registry) {
    let payload = registry
        .actions()
        .call("mcp_greet", json!({"name": "Ada"}))
        .await
        .expect("call succeeds");

    assert_eq!(payload, "hello Ada");
}

#[rstest]
#[tokio::test]
async fn structured_results_are_compact_json(registry: Registry) {
    let payload = registry
        .actions()
        .call("mcp_inspect", json!({"nested": {"n": 1}}))
        .await
        .expect("call succeeds");

    assert_eq!(payload, r#"{"nested":{"n":1}}"#);
}

#[rstest]
#[tokio::test]
async fn failing_actions_yield_error_envelopes(registry: Registry) {
    let response = registry
        .actions()
        .handle_call(json!({"name": "mcp_fail", "arguments": {"name": "Ada"}}))
        .await
        .expect("handler never faults for a known action");

    assert!(response.is_error);
    assert!(response.payload().starts_with("Error executing action mcp_fail:"));
    assert!(response.payload().contains("upstream timed out"));
}

#[rstest]
#[tokio::test]
async fn unknown_actions_yield_error_envelopes(registry: Registry) {
    let error = registry
        .actions()
        .call("mcp_missing", json!({}))
        .await
        .expect_err("unknown action fails");
    let response = registry
        .actions()
        .handle_call(json!({"name": "mcp_missing"}))
        .await
        .expect("handler answers");

    assert_eq!(error.kind(), CapabilityErrorKind::NotFound);
    assert!(response.is_error);
    assert!(response.payload().contains("NOT_FOUND"));
}

#[rstest]
#[tokio::test]
async fn missing_arguments_are_validated_as_an_empty_object(registry: Registry) {
    let response = registry
        .actions()
        .handle_call(json!({"name": "mcp_greet"}))
        .await
        .expect("handler answers");

    assert!(response.is_error);
    assert!(response.payload().contains("INVALID_ARGS"));
}

#[rstest]
#[tokio::test]
async fn call_params_without_a_name_fault(registry: Registry) {
    let fault = registry
        .actions()
        .handle_call(json!({"arguments": {}}))
        .await
        .expect_err("malformed params fault");

    assert_eq!(fault.code(), ProtocolFault::INVALID_PARAMS);
}

#[rstest]
#[tokio::test]
async fn templates_render_messages(registry: Registry) {
    let response = registry
        .templates()
        .handle_get(json!({"name": "mcp_outline", "arguments": {"name": "Ada"}}))
        .await
        .expect("generation succeeds");

    assert_eq!(response.messages, vec![TemplateMessage::user("Dear Ada")]);
}

#[rstest]
#[case(json!({"name": "mcp_broken", "arguments": {"name": "Ada"}}), ProtocolFault::INTERNAL_ERROR, CapabilityErrorKind::ExecutionError)]
#[case(json!({"name": "mcp_missing", "arguments": {}}), ProtocolFault::INVALID_PARAMS, CapabilityErrorKind::NotFound)]
#[case(json!({"name": "mcp_outline", "arguments": {"name": 7}}), ProtocolFault::INVALID_PARAMS, CapabilityErrorKind::InvalidArgs)]
#[tokio::test]
async fn template_failures_are_protocol_faults(
    registry: Registry,
    #[case] params: Value,
    #[case] code: i64,
    #[case] kind: CapabilityErrorKind,
) {
    let fault = registry
        .templates()
        .handle_get(params)
        .await
        .expect_err("generation faults");

    assert_eq!(fault.code(), code);
    assert_eq!(fault.capability_error().map(|error| error.kind()), Some(kind));
}

#[rstest]
fn template_descriptors_use_the_single_argument_convention(registry: Registry) {
    let list = registry.templates().list();

    let names: Vec<&str> = list.prompts.iter().map(|prompt| prompt.name.as_str()).collect();
    assert_eq!(names, ["mcp_outline", "mcp_broken"]);
    let outline = &list.prompts[0];
    assert_eq!(outline.arguments.len(), 1);
    assert_eq!(outline.arguments[0].name, "args");
    assert_eq!(outline.arguments[0].schema, outline.args_schema);
}
