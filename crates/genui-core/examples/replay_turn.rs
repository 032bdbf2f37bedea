use std::sync::Arc;

use genui_core::prelude::*;
use serde_json::json;

fn recorded_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::new("on_chain_end", "invoke_model", "m1")
            .with_output(json!({"tool_calls": [{"type": "github-repo", "args": {"owner": "tokio-rs", "repo": "tokio"}}]})),
        StreamEvent::new("on_chain_end", "invoke_tools", "t1").with_output(json!({"tool_result": {
            "owner": "tokio-rs",
            "repo": "tokio",
            "description": "A runtime for writing reliable asynchronous applications with Rust.",
            "stars": 27000,
            "language": "Rust"
        }})),
    ]
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), GenUiError> {
    let agent = Agent::builder()
        .source(Arc::new(ReplaySource::new("recorded", recorded_events())))
        .build()?;

    let outcome = agent.submit(TurnInput::new("Tell me about tokio"))?.finish().await?;
    for fragment in outcome.ui.fragments() {
        match &fragment.fragment {
            Fragment::Tool(component) => println!("{component}"),
            Fragment::StreamingText(text) => println!("{text}"),
        }
    }
    println!("final value: {:?}", outcome.final_value);
    Ok(())
}
