use research_genie::conversation::{
    ConversationError, Message, ToolCall, TurnExecutor, TurnLimits,
};
use research_genie::provider::{LanguageModel, ModelError, ModelReply};
use research_genie::tools::{ArgSpec, ArgType, FnTool, ToolOutput, ToolRegistry, ToolSpec};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<ModelReply, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<Message>> {
        self.seen.lock().expect("seen").clone()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, history: &[Message], _tools: &[ToolSpec]) -> Result<ModelReply, ModelError> {
        self.seen.lock().expect("seen").push(history.to_vec());
        self.replies
            .lock()
            .expect("replies")
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Malformed("script exhausted".to_string())))
    }
}

fn text(content: &str) -> Result<ModelReply, ModelError> {
    Ok(ModelReply::new(Message::assistant(content)))
}

fn call(name: &str, args: Value) -> Result<ModelReply, ModelError> {
    let args: Map<String, Value> = args.as_object().cloned().expect("object args");
    Ok(ModelReply::new(Message::assistant_with_call(
        "",
        ToolCall::new(name, args),
    )))
}

fn search_tool() -> FnTool {
    FnTool::new(
        ToolSpec::new("arxiv_search", "search")
            .arg("topic", ArgSpec::required(ArgType::String, "topic")),
        |args| {
            let topic = args.get("topic").and_then(Value::as_str).unwrap_or_default();
            Ok(ToolOutput::payload(format!("# 📚 **Recent Papers on {topic}**")))
        },
    )
}

fn executor(model: Arc<ScriptedModel>, registry: ToolRegistry, limits: TurnLimits) -> TurnExecutor {
    TurnExecutor::new(model, Arc::new(registry), limits)
}

fn registry() -> ToolRegistry {
    ToolRegistry::new().with_tool(search_tool()).expect("registry")
}

#[test]
fn plain_answer_finishes_turn_without_tools() {
    let model = ScriptedModel::new(vec![text("Hello! What topic interests you?")]);
    let turn = executor(model.clone(), registry(), TurnLimits::default());

    let record = turn
        .run_turn(&[Message::system("sys")], "hello")
        .expect("turn");
    assert_eq!(record.user, Message::user("hello"));
    assert_eq!(
        record.outputs,
        vec![Message::assistant("Hello! What topic interests you?")]
    );
    assert_eq!(record.tool_rounds, 0);
    assert_eq!(
        model.calls(),
        vec![vec![Message::system("sys"), Message::user("hello")]]
    );
}

#[test]
fn tool_call_produces_call_result_and_follow_up() {
    let model = ScriptedModel::new(vec![
        call("arxiv_search", json!({"topic": "machine learning"})),
        text("Pick a paper."),
    ]);
    let turn = executor(model.clone(), registry(), TurnLimits::default());

    let record = turn.run_turn(&[], "interested in machine learning").expect("turn");
    assert_eq!(record.tool_rounds, 1);
    assert_eq!(record.outputs.len(), 3);
    assert_eq!(
        record.outputs[1],
        Message::tool_output(
            "arxiv_search",
            "# 📚 **Recent Papers on machine learning**",
            true
        )
    );

    let second_call = &model.calls()[1];
    assert_eq!(second_call.len(), 3);
    assert_eq!(second_call[2], record.outputs[1]);
}

#[test]
fn unknown_tool_and_bad_arguments_become_error_results() {
    let model = ScriptedModel::new(vec![
        call("summon_dragon", json!({})),
        text("Sorry, I cannot do that."),
    ]);
    let record = executor(model, registry(), TurnLimits::default())
        .run_turn(&[], "go")
        .expect("turn");
    match &record.outputs[1] {
        Message::ToolResult {
            tool,
            content,
            is_error,
            featured,
        } => {
            assert_eq!(tool, "summon_dragon");
            assert!(content.contains("unknown tool `summon_dragon`"));
            assert!(*is_error);
            assert!(!*featured);
        }
        other => panic!("unexpected output {other:?}"),
    }

    let model = ScriptedModel::new(vec![
        call("arxiv_search", json!({"topic": 7})),
        text("Let me retry."),
    ]);
    let record = executor(model, registry(), TurnLimits::default())
        .run_turn(&[], "go")
        .expect("turn");
    assert!(record.outputs[1].content().contains("argument `topic` must be string"));
}

#[test]
fn second_tool_round_exceeds_cap() {
    let model = ScriptedModel::new(vec![
        call("arxiv_search", json!({"topic": "a"})),
        call("arxiv_search", json!({"topic": "b"})),
    ]);
    let err = executor(model, registry(), TurnLimits::default())
        .run_turn(&[], "go")
        .expect_err("cap");
    assert!(matches!(
        err,
        ConversationError::ToolRoundsExceeded { max_tool_rounds: 1 }
    ));
}

#[test]
fn raised_cap_allows_chained_tools() {
    let model = ScriptedModel::new(vec![
        call("arxiv_search", json!({"topic": "a"})),
        call("arxiv_search", json!({"topic": "b"})),
        text("done"),
    ]);
    let limits = TurnLimits {
        max_tool_rounds: 2,
        ..TurnLimits::default()
    };
    let record = executor(model, registry(), limits)
        .run_turn(&[], "go")
        .expect("turn");
    assert_eq!(record.tool_rounds, 2);
    assert_eq!(record.outputs.len(), 5);
}

#[test]
fn slow_tool_times_out() {
    let slow = FnTool::new(ToolSpec::new("render_latex_pdf", "render"), |_| {
        thread::sleep(Duration::from_millis(500));
        Ok(ToolOutput::payload("late"))
    });
    let registry = ToolRegistry::new().with_tool(slow).expect("registry");
    let model = ScriptedModel::new(vec![call("render_latex_pdf", json!({})), text("never")]);
    let limits = TurnLimits {
        max_tool_rounds: 1,
        tool_timeout: Duration::from_millis(50),
    };

    let err = executor(model, registry, limits)
        .run_turn(&[], "render")
        .expect_err("timeout");
    assert!(matches!(
        err,
        ConversationError::ToolTimeout { ref tool, timeout_ms: 50 } if tool == "render_latex_pdf"
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn model_failure_aborts_turn() {
    let model = ScriptedModel::new(vec![Err(ModelError::Status {
        code: 503,
        body: "unavailable".to_string(),
    })]);
    let err = executor(model, registry(), TurnLimits::default())
        .run_turn(&[], "hello")
        .expect_err("model failure");
    assert!(matches!(err, ConversationError::ModelInvocation(_)));
}

#[test]
fn empty_model_text_is_not_recorded() {
    let model = ScriptedModel::new(vec![text("   ")]);
    let record = executor(model, registry(), TurnLimits::default())
        .run_turn(&[], "hello")
        .expect("turn");
    assert!(record.outputs.is_empty());
}

#[test]
fn panicking_tool_becomes_error_result() {
    let model = ScriptedModel::new(vec![
        call("read_pdf", json!({})),
        text("That paper could not be read."),
    ]);
    let registry = ToolRegistry::new()
        .with_tool(FnTool::new(ToolSpec::new("read_pdf", "read"), |_| {
            panic!("pdf worker crashed")
        }))
        .expect("registry");
    let turn = executor(model, registry, TurnLimits::default());

    let record = turn
        .run_turn(&[Message::system("sys")], "I am interested in paper 1")
        .expect("turn survives tool panic");
    match &record.outputs[1] {
        Message::ToolResult {
            tool,
            content,
            featured,
            is_error,
        } => {
            assert_eq!(tool, "read_pdf");
            assert!(content.starts_with("Error: "));
            assert!(content.contains("without a result"));
            assert!(!featured);
            assert!(is_error);
        }
        other => panic!("expected tool result, got {other:?}"),
    }
    assert_eq!(
        record.outputs.last(),
        Some(&Message::assistant("That paper could not be read."))
    );
}
