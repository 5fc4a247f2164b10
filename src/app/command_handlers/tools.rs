use crate::app::command_support::{build_registry, ensure_runtime_root, load_settings};
use crate::tools::{ToolRegistry, ToolSpec};

fn describe_args(spec: &ToolSpec) -> String {
    if spec.args.is_empty() {
        return "(no arguments)".to_string();
    }
    spec.args
        .iter()
        .map(|(name, arg)| {
            let marker = if arg.required { "" } else { "?" };
            format!("{name}{marker}: {}", arg.arg_type)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_tool_listing(registry: &ToolRegistry) -> String {
    registry
        .specs()
        .iter()
        .map(|spec| {
            format!(
                "{}({})\n    {}",
                spec.name,
                describe_args(spec),
                spec.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cmd_tools(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: tools".to_string());
    }
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    Ok(render_tool_listing(&build_registry(&settings, &paths)?))
}
