use std::io::Write as _;

use promptpack::tools::{Arguments, ToolResult};
use promptpack::{
    Error, FragmentError, HandlerRegistry, Inputs, Pack, RenderError, RenderOptions, Renderer,
    ToolError, Value,
};
use serde_json::json;

const SUPPORT_PACK: &str = r#"{
    "id": "customer-support",
    "name": "Customer Support Pack",
    "version": "1.0.0",
    "template_engine": { "version": "v1", "syntax": "{{variable}}" },
    "fragments": {
        "guidelines": "Be helpful.",
        "loop_a": "A then {{fragment:loop_b}}",
        "loop_b": "B then {{fragment:loop_a}}"
    },
    "tools": {
        "lookup_order": {
            "name": "lookup_order",
            "description": "Look up an order",
            "parameters": {
                "type": "object",
                "properties": { "order_id": { "type": "string" } },
                "required": ["order_id"]
            }
        },
        "issue_refund": { "description": "Refund an order" }
    },
    "prompts": {
        "support": {
            "id": "support",
            "name": "Support",
            "version": "1.0.0",
            "system_template": "You are a {{role}} for {{company}}.\n\n{{fragment:guidelines}}",
            "variables": [
                { "name": "role", "type": "string", "default": "support agent" },
                { "name": "company", "type": "string", "required": true }
            ],
            "tools": ["lookup_order", "issue_refund"],
            "tool_policy": { "tool_choice": "auto", "blocklist": ["issue_refund"] },
            "validators": [
                { "type": "banned_words", "fail_on_violation": true, "params": { "words": ["bad"] } },
                { "type": "max_length", "params": { "max_characters": 10 } }
            ]
        },
        "greeting": {
            "id": "greeting",
            "name": "Greeting",
            "version": "1.0.0",
            "system_template": "Hi {{name}}, ticket {{ticket}}",
            "variables": { "name": { "type": "string", "required": true } }
        },
        "looping": {
            "id": "looping",
            "name": "Looping",
            "version": "1.0.0",
            "system_template": "Start: {{fragment:loop_a}}"
        }
    }
}"#;

fn support_pack() -> Pack {
    promptpack::parse(SUPPORT_PACK).expect("support pack parses")
}

fn inputs<const N: usize>(pairs: [(&str, Value); N]) -> Inputs {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

#[test]
fn renders_defaults_and_fragments() {
    let pack = support_pack();
    let rendered = promptpack::render(&pack, "support", &inputs([("company", Value::from("Acme"))]))
        .unwrap();
    assert_eq!(rendered, "You are a support agent for Acme.\n\nBe helpful.");
}

#[test]
fn undeclared_placeholders_stay_verbatim_when_supplied() {
    let pack = support_pack();
    let rendered = promptpack::render(
        &pack,
        "greeting",
        &inputs([("name", Value::from("Ada")), ("ticket", Value::from("INJECTED"))]),
    )
    .unwrap();
    assert_eq!(rendered, "Hi Ada, ticket {{ticket}}");
}

#[test]
fn missing_required_variable_fails_render() {
    let pack = support_pack();
    let err = promptpack::render(&pack, "support", &Inputs::new()).expect_err("company missing");
    assert!(matches!(err, RenderError::MissingVariable { ref name } if name == "company"));

    let issues = promptpack::validate_inputs(pack.prompt("support").unwrap().variables(), &Inputs::new());
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("company"));
}

#[test]
fn supplied_inputs_pass_validation() {
    let pack = support_pack();
    let issues = promptpack::validate_inputs(
        pack.prompt("support").unwrap().variables(),
        &inputs([("company", Value::from("Acme")), ("ignored", Value::from(1))]),
    );
    assert!(issues.is_empty());
}

#[test]
fn fragment_cycles_surface_at_render_time() {
    let pack = support_pack();
    let err = promptpack::render(&pack, "looping", &Inputs::new()).expect_err("cycle");
    let RenderError::Cycle(cycle) = err else {
        panic!("expected a cycle error, got {err:?}");
    };
    assert_eq!(cycle.path(), ["loop_a", "loop_b", "loop_a"]);
    assert!(cycle.to_string().contains("loop_a"));
}

#[test]
fn cycle_error_is_reported_by_resolver_directly() {
    let pack = support_pack();
    let resolver = promptpack::prompts::FragmentResolver::for_pack(&pack);
    let err = resolver.resolve("{{fragment:loop_b}}").expect_err("cycle");
    let FragmentError::Cycle(cycle) = err else {
        panic!("expected a cycle error, got {err:?}");
    };
    assert_eq!(cycle.path(), ["loop_b", "loop_a", "loop_b"]);
}

#[test]
fn strict_rendering_rejects_unknown_placeholders() {
    let pack = support_pack();
    let renderer = Renderer::new(&pack).with_options(RenderOptions::default().strict());
    let err = renderer
        .render_template("Hi {{stranger}}", &Inputs::new())
        .expect_err("undeclared");
    assert!(matches!(err, RenderError::UndefinedPlaceholder { ref name } if name == "stranger"));
}

#[test]
fn tool_selection_honours_blocklist_and_handlers() {
    let pack = support_pack();
    let mut handlers = HandlerRegistry::new();
    handlers
        .register("lookup_order", |arguments: &Arguments| -> ToolResult<String> {
            let id = arguments.get("order_id").and_then(|v| v.as_str()).unwrap_or_default();
            Ok(format!("order {id}: shipped"))
        })
        .unwrap();

    let set = promptpack::select_tools(&pack, "support", &handlers).unwrap();
    assert_eq!(set.names(), vec!["lookup_order"]);

    let lookup = set.get("lookup_order").unwrap();
    let mut arguments = Arguments::new();
    arguments.insert("order_id".to_owned(), json!("A7"));
    assert_eq!(lookup.invoke(&arguments).unwrap(), "order A7: shipped");

    let err = lookup.invoke(&Arguments::new()).expect_err("order_id required");
    assert!(matches!(err, ToolError::InvalidArguments { .. }));

    let declared = lookup.function_schema();
    assert_eq!(declared["function"]["name"], "lookup_order");
}

#[test]
fn unknown_prompt_is_rejected_everywhere() {
    let pack = support_pack();
    assert!(matches!(
        promptpack::render(&pack, "nope", &Inputs::new()),
        Err(RenderError::UnknownPrompt { .. })
    ));
    assert!(matches!(
        promptpack::select_tools(&pack, "nope", &HandlerRegistry::new()),
        Err(ToolError::UnknownPrompt { .. })
    ));
}

#[test]
fn declared_validators_run_against_output() {
    let pack = support_pack();
    let validators = pack.prompt("support").unwrap().validators();
    let result = promptpack::run("This is bad but short", validators);

    assert!(!result.is_valid());
    assert!(result.has_blocking_violations());
    assert_eq!(
        result.messages(),
        vec![
            r#"Content contains banned words: ["bad"]"#,
            "Content exceeds max length: 21 > 10",
        ]
    );

    let clean = promptpack::run("Fine.", validators);
    assert!(clean.is_valid());
    assert!(clean.violations().is_empty());
}

#[test]
fn regex_validator_requires_match() {
    let validators = [promptpack::Validator::regex_match("^[A-Z]", true)
        .unwrap()
        .blocking(true)];
    assert!(!promptpack::run("ok", &validators).is_valid());
    assert!(promptpack::run("Ok", &validators).is_valid());
}

#[test]
fn validation_result_serializes_derived_flags() {
    let validators = [promptpack::Validator::min_length(10)];
    let result = promptpack::run("short", &validators);
    let encoded = serde_json::to_value(&result).unwrap();
    assert_eq!(encoded["is_valid"], json!(true));
    assert_eq!(encoded["has_blocking_violations"], json!(false));
    assert_eq!(encoded["violations"][0]["validator_type"], json!("min_length"));
}

#[test]
fn unknown_validator_type_is_configuration_error() {
    let source = SUPPORT_PACK.replace("\"max_length\"", "\"sentiment\"");
    let err = promptpack::parse(source.as_str()).expect_err("unsupported validator");
    assert!(matches!(err, Error::Configuration { .. }), "{err}");
}

#[test]
fn malformed_source_is_parse_error() {
    let err = promptpack::parse("{ \"id\": ").expect_err("truncated");
    assert!(matches!(err, Error::Parse { .. }), "{err}");
}

#[test]
fn missing_prompts_is_validation_error() {
    let err = promptpack::parse(r#"{ "id": "p", "name": "P", "version": "1.0.0" }"#)
        .expect_err("prompts missing");
    assert!(matches!(err, Error::Validation { .. }), "{err}");
}

#[test]
fn yaml_file_round_trip() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "id: greeter\nname: Greeter\nversion: 1.0.0\nfragments:\n  sign_off: Bye.\nprompts:\n  hello:\n    id: hello\n    name: Hello\n    version: 1.0.0\n    system_template: \"Hello {{{{name}}}}! {{{{fragment:sign_off}}}}\"\n    variables:\n      name:\n        type: string\n        required: true\n"
    )
    .unwrap();

    let pack = promptpack::parse(file.path()).unwrap();
    assert_eq!(pack.id(), "greeter");
    let rendered = promptpack::render(&pack, "hello", &inputs([("name", Value::from("Ada"))])).unwrap();
    assert_eq!(rendered, "Hello Ada! Bye.");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = promptpack::parse(dir.path().join("absent.json")).expect_err("no file");
    assert!(matches!(err, Error::Io { .. }), "{err}");
}

#[tokio::test]
async fn async_entry_points_match_sync() {
    let pack = support_pack();
    let renderer = Renderer::new(&pack);
    let values = inputs([("company", Value::from("Acme"))]);
    assert_eq!(
        renderer.render_async("support", &values).await.unwrap(),
        promptpack::render(&pack, "support", &values).unwrap()
    );

    let validators = pack.prompt("support").unwrap().validators();
    assert_eq!(
        promptpack::validators::run_async("bad", validators).await,
        promptpack::run("bad", validators)
    );
}
