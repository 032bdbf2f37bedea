use genui_core::prelude::*;
use genui_core::remote::RemoteConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), GenUiError> {
    let agent = Agent::remote(RemoteConfig::from_env()?)?;

    let mut turn = agent.submit(TurnInput::new("What's the weather like in San Francisco?"))?;
    while let Some(update) = turn.ui().next_update().await {
        match update {
            UiUpdate::TextDelta { text, .. } => print!("{text}"),
            UiUpdate::Appended { fragment: Fragment::Tool(component), .. }
            | UiUpdate::Replaced { fragment: Fragment::Tool(component), .. } => println!("{component}"),
            UiUpdate::Appended { .. } | UiUpdate::Replaced { .. } | UiUpdate::Closed { .. } => {}
        }
    }
    println!();

    let outcome = turn.finish().await?;
    println!("{:#?}", outcome.history);
    Ok(())
}
