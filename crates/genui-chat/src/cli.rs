//! CLI argument parsing via clap.

use std::path::PathBuf;

use clap::Parser;

/// Chat with a remote agent and watch its UI stream in the terminal.
#[derive(Debug, Parser)]
#[command(name = "genui-chat", version)]
pub struct Args {
    /// Prompt to send. If provided, runs one turn and exits.
    pub prompt: Option<String>,

    /// Agent runnable URL (default: GENUI_API_URL or http://localhost:8000/chat).
    #[arg(long = "url")]
    pub url: Option<String>,

    /// Per-turn HTTP timeout in seconds (default: GENUI_TIMEOUT_SECS or 120).
    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Replay recorded events from a JSON-lines file instead of calling the agent.
    #[arg(long = "replay", value_name = "JSONL", conflicts_with = "url")]
    pub replay: Option<PathBuf>,

    /// File to attach to the one-shot prompt.
    #[arg(short = 'f', long = "file", requires = "prompt")]
    pub file: Option<PathBuf>,

    /// Log filter used when GENUI_LOG_LEVEL and RUST_LOG are unset.
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn defaults_to_interactive_mode() {
        let args = Args::parse_from(["genui-chat"]);
        assert!(args.prompt.is_none());
        assert!(args.url.is_none());
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn one_shot_prompt_with_attachment() {
        let args = Args::parse_from(["genui-chat", "-f", "invoice.png", "parse this invoice"]);
        assert_eq!(args.prompt.as_deref(), Some("parse this invoice"));
        assert_eq!(args.file.as_deref(), Some(std::path::Path::new("invoice.png")));
    }

    #[test]
    fn file_requires_prompt() {
        assert!(Args::try_parse_from(["genui-chat", "--file", "a.png"]).is_err());
    }

    #[test]
    fn replay_conflicts_with_url() {
        let parsed = Args::try_parse_from([
            "genui-chat",
            "--replay",
            "turn.jsonl",
            "--url",
            "http://localhost:8000/chat",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn timeout_parses_as_seconds() {
        let args = Args::parse_from(["genui-chat", "--timeout-secs", "30"]);
        assert_eq!(args.timeout_secs, Some(30));
    }
}
