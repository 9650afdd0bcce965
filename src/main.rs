use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pocket_assist::ai::config::AssistConfig;
use pocket_assist::ai::{AiConfig, AiError, AiModel, AiService};
use pocket_assist::session::{ChatMessage, QuickAction, RequestKind, Session};
use pocket_assist::settings::{SettingsError, SettingsStore};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("stdin read failed: {0}")]
    Stdin(std::io::Error),
    #[error("request failed")]
    RequestFailed,
}

#[derive(Parser, Debug)]
#[command(name = "pocket-assist", about = "Context-aware Python coding assistant backed by Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the stored Gemini API key.
    Key(KeyCommand),
    /// Show or change model and feature flags.
    Config(ConfigCommand),
    /// Send one request and print the reply.
    Ask(AskCommand),
    /// Interactive conversation.
    Chat(ChatCommand),
}

#[derive(Args, Debug)]
struct KeyCommand {
    #[command(subcommand)]
    command: KeySubcommand,
}

#[derive(Subcommand, Debug)]
enum KeySubcommand {
    Set { key: String },
    Show,
    Clear,
}

#[derive(Args, Debug)]
struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommand {
    Show,
    Set {
        /// fast, quality, vision, or a model id.
        #[arg(long)]
        model: Option<AiModel>,
        #[arg(long)]
        context: Option<bool>,
        #[arg(long)]
        auto_complete: Option<bool>,
        #[arg(long)]
        code_review: Option<bool>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AskKind {
    Complete,
    Explain,
    Review,
    Fix,
    Optimize,
    Document,
    Query,
}

impl From<AskKind> for RequestKind {
    fn from(kind: AskKind) -> Self {
        match kind {
            AskKind::Complete => Self::CodeCompletion,
            AskKind::Explain => Self::CodeExplanation,
            AskKind::Review => Self::CodeReview,
            AskKind::Fix => Self::BugFix,
            AskKind::Optimize => Self::CodeOptimization,
            AskKind::Document => Self::GenerateDocstring,
            AskKind::Query => Self::CustomQuery,
        }
    }
}

#[derive(Args, Debug)]
struct AskCommand {
    #[arg(long, value_enum, default_value_t = AskKind::Query)]
    kind: AskKind,
    /// Python file to use as context.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Cursor line in `--file`, 1-based.
    #[arg(long, default_value_t = 1)]
    line: usize,
    /// Selected code. Code kinds fall back to TEXT when omitted.
    #[arg(long)]
    selection: Option<String>,
    text: String,
}

#[derive(Args, Debug)]
struct ChatCommand {
    /// Python file to load as context.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = AssistConfig::from_env()?;
    let settings = Arc::new(SettingsStore::open_in(config.config_dir.as_deref(), config.tuning)?);

    match cli.command {
        Command::Key(key) => run_key(&settings, key),
        Command::Config(cmd) => run_config(&settings, cmd),
        Command::Ask(ask) => {
            let service = Arc::new(AiService::with_gemini(settings, &config)?);
            run_ask(service, ask).await
        }
        Command::Chat(chat) => {
            let service = Arc::new(AiService::with_gemini(settings, &config)?);
            run_chat(service, chat).await
        }
    }
}

// =============================================================================
// key / config
// =============================================================================

fn run_key(settings: &SettingsStore, key: KeyCommand) -> Result<(), CliError> {
    match key.command {
        KeySubcommand::Set { key } => {
            settings.save_api_key(key.trim())?;
            println!("API key saved");
        }
        KeySubcommand::Show => match settings.api_key() {
            Some(key) => println!("{}", mask_key(&key)),
            None => println!("no API key set"),
        },
        KeySubcommand::Clear => {
            settings.clear_api_key()?;
            println!("API key cleared");
        }
    }
    Ok(())
}

/// First and last four characters; short keys are fully hidden.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

fn run_config(settings: &SettingsStore, cmd: ConfigCommand) -> Result<(), CliError> {
    match cmd.command {
        ConfigSubcommand::Show => print_config(&settings.config()),
        ConfigSubcommand::Set { model, context, auto_complete, code_review } => {
            let current = settings.config();
            let next = AiConfig {
                model: model.unwrap_or(current.model),
                context_enabled: context.unwrap_or(current.context_enabled),
                auto_complete_enabled: auto_complete.unwrap_or(current.auto_complete_enabled),
                code_review_enabled: code_review.unwrap_or(current.code_review_enabled),
                ..current
            };
            settings.save_config(&next)?;
            print_config(&next);
        }
    }
    Ok(())
}

fn print_config(config: &AiConfig) {
    println!("model:          {}", config.model);
    println!("context:        {}", config.context_enabled);
    println!("auto_complete:  {}", config.auto_complete_enabled);
    println!("code_review:    {}", config.code_review_enabled);
    println!("temperature:    {}", config.temperature);
    println!("max_tokens:     {}", config.max_tokens);
}

// =============================================================================
// ask
// =============================================================================

async fn run_ask(service: Arc<AiService>, ask: AskCommand) -> Result<(), CliError> {
    let kind = RequestKind::from(ask.kind);
    let code_kind = !matches!(kind, RequestKind::CustomQuery | RequestKind::BugFix);
    let selection = match ask.selection {
        Some(selection) => selection,
        None if code_kind => ask.text.clone(),
        None => String::new(),
    };

    let mut session = Session::new(service);
    let (code, file) = match &ask.file {
        Some(path) => (read_source(path).await?, path.display().to_string()),
        None => (String::new(), String::new()),
    };
    session.update_code_context(&code, &selection, &file, ask.line.saturating_sub(1));

    session.send_message(&ask.text, kind);
    let Some(reply) = session.next_completion().await else {
        return Err(CliError::RequestFailed);
    };
    print_message(reply);
    if reply.is_error { Err(CliError::RequestFailed) } else { Ok(()) }
}

async fn read_source(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
}

fn print_message(message: &ChatMessage) {
    if message.is_error {
        eprintln!("{}", message.content);
    } else {
        println!("{}", message.content);
    }
    if !message.suggestions.is_empty() {
        println!();
        for (i, suggestion) in message.suggestions.iter().enumerate() {
            println!("  [{}] {suggestion}", i + 1);
        }
    }
}

// =============================================================================
// chat
// =============================================================================

/// Loaded buffer plus the current line selection.
#[derive(Default)]
struct Buffer {
    file: String,
    code: String,
    selection: String,
}

const CHAT_HELP: &str = "commands: /select A-B, /explain, /fix, /review, /optimize, /document, \
                         /model <fast|quality|vision>, /clear, /quit";

async fn run_chat(service: Arc<AiService>, chat: ChatCommand) -> Result<(), CliError> {
    let mut session = Session::new(service);
    let mut buffer = Buffer::default();
    if let Some(path) = &chat.file {
        buffer.code = read_source(path).await?;
        buffer.file = path.display().to_string();
        session.update_code_context(&buffer.code, "", &buffer.file, 0);
    }

    let mut shown = print_new(&session, 0);
    eprintln!("{CHAT_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(CliError::Stdin)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/clear", _) => {
                session.clear();
                shown = 0;
            }
            ("/model", name) => match name.trim().parse::<AiModel>() {
                Ok(model) => {
                    session.set_selected_model(model)?;
                    eprintln!("model: {model}");
                }
                Err(e) => eprintln!("{e}"),
            },
            ("/select", range) => select_lines(&mut session, &mut buffer, range),
            (
                cmd @ ("/explain" | "/fix" | "/review" | "/optimize" | "/document"),
                _,
            ) => {
                let action = QuickAction::parse(cmd.trim_start_matches('/'));
                session.perform_quick_action(action, &buffer.selection);
            }
            (cmd, _) if cmd.starts_with('/') => {
                eprintln!("{CHAT_HELP}");
                continue;
            }
            _ => session.send_message(line, RequestKind::CustomQuery),
        }

        session.settle().await;
        shown = print_new(&session, shown);
    }
    Ok(())
}

/// Print assistant messages appended since `shown`; returns the new watermark.
fn print_new(session: &Session, shown: usize) -> usize {
    let messages = session.messages();
    for message in messages.iter().skip(shown).filter(|m| !m.is_user) {
        print_message(message);
        println!();
    }
    messages.len()
}

/// `/select A-B` with 1-based inclusive line numbers.
fn select_lines(session: &mut Session, buffer: &mut Buffer, range: &str) {
    let Some((start, end)) = parse_range(range) else {
        eprintln!("usage: /select A-B");
        return;
    };
    buffer.selection = line_slice(&buffer.code, start, end);
    session.update_code_context(&buffer.code, &buffer.selection, &buffer.file, start - 1);
    eprintln!("selected {} line(s)", buffer.selection.lines().count());
}

/// Lines `start..=end` of `code`, 1-based; `start >= 1` and `end >= start`.
fn line_slice(code: &str, start: usize, end: usize) -> String {
    code.lines()
        .skip(start - 1)
        .take((end - start).saturating_add(1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (start, end) = range.trim().split_once('-')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    (start >= 1 && end >= start).then_some((start, end))
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
