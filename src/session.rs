//! Session — conversation transcript and request lifecycle.
//!
//! ARCHITECTURE
//! ============
//! The session owns the transcript and is its only writer. Each send:
//! 1. appends the user message,
//! 2. bumps the pending count (loading = pending > 0),
//! 3. spawns the AI pipeline on the session's `JoinSet`,
//! 4. the task posts one `Completion` on an mpsc channel; the session
//!    drains the channel, appends one message per completion and drops the
//!    pending count.
//!
//! A `CompletionGuard` travels with every task. If the task ends without
//! reporting (panic, abort), the guard's `Drop` posts a failure completion,
//! so every send is answered by exactly one transcript entry.
//!
//! TRADE-OFFS
//! ==========
//! Overlapping sends are allowed. Completions are appended in arrival order,
//! which may differ from send order. Dropping the session aborts every
//! in-flight task; there is no per-request cancel.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::ai::{AiConfig, AiError, AiModel, AiRequest, AiResponse, AiService, DEFAULT_QUICK_SUGGESTIONS};
use crate::context::CodeContext;

/// Characters of the selection echoed back in a quick-action message.
const QUICK_ACTION_ECHO_CHARS: usize = 50;

// =============================================================================
// TYPES
// =============================================================================

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub content: String,
    pub is_user: bool,
    /// Milliseconds since Unix epoch; never decreases within a session.
    pub timestamp: i64,
    pub suggestions: Vec<String>,
    pub is_error: bool,
}

/// Which assistant task a typed message should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    CodeCompletion,
    CodeExplanation,
    CodeReview,
    BugFix,
    CodeOptimization,
    GenerateDocstring,
    #[default]
    CustomQuery,
}

/// One-tap actions on the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Explain,
    Fix,
    Optimize,
    Review,
    Document,
    /// Anything unrecognized; sent as a generic help query.
    Help,
}

impl QuickAction {
    /// Case-insensitive; unknown names map to [`QuickAction::Help`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "explain" => Self::Explain,
            "fix" => Self::Fix,
            "optimize" => Self::Optimize,
            "review" => Self::Review,
            "document" => Self::Document,
            _ => Self::Help,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Explain => "Explain",
            Self::Fix => "Fix",
            Self::Optimize => "Optimize",
            Self::Review => "Review",
            Self::Document => "Document",
            Self::Help => "Help",
        }
    }

    fn request(self, context: CodeContext, selected: &str) -> AiRequest {
        match self {
            Self::Explain => AiRequest::CodeExplanation { context, code: selected.to_string() },
            Self::Fix => AiRequest::BugFix {
                context,
                error_message: format!("Please analyze this code for potential issues: {selected}"),
            },
            Self::Optimize => AiRequest::CodeOptimization { context, code: selected.to_string() },
            Self::Review => AiRequest::CodeReview { context, code: selected.to_string() },
            Self::Document => AiRequest::GenerateDocstring { context, function: selected.to_string() },
            Self::Help => AiRequest::CustomQuery { context, query: format!("Please help with this code: {selected}") },
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// COMPLETION CHANNEL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Chat,
    QuickAction,
}

#[derive(Debug)]
enum Outcome {
    Response(AiResponse),
    Failed(String),
}

#[derive(Debug)]
struct Completion {
    origin: Origin,
    outcome: Outcome,
}

/// Posts exactly one completion: the real one via `complete`, or a failure on drop.
struct CompletionGuard {
    tx: Option<mpsc::UnboundedSender<Completion>>,
    origin: Origin,
}

impl CompletionGuard {
    fn complete(mut self, response: AiResponse) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Completion { origin: self.origin, outcome: Outcome::Response(response) });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let outcome = Outcome::Failed("request task terminated unexpectedly".into());
            let _ = tx.send(Completion { origin: self.origin, outcome });
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    service: Arc<AiService>,
    messages: Vec<ChatMessage>,
    code_context: CodeContext,
    pending: usize,
    last_timestamp: i64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    tasks: JoinSet<()>,
}

impl Session {
    /// New session whose transcript holds only the welcome message.
    #[must_use]
    pub fn new(service: Arc<AiService>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Self {
            service,
            messages: Vec::new(),
            code_context: CodeContext::default(),
            pending: 0,
            last_timestamp: 0,
            tx,
            rx,
            tasks: JoinSet::new(),
        };
        session.push_welcome();
        session
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while at least one request is awaiting its completion.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    #[must_use]
    pub fn code_context(&self) -> &CodeContext {
        &self.code_context
    }

    #[must_use]
    pub fn config(&self) -> AiConfig {
        self.service.settings().config()
    }

    // -------------------------------------------------------------------------
    // code context
    // -------------------------------------------------------------------------

    /// Rebuild the context snapshot from the editor buffer.
    pub fn update_code_context(&mut self, code: &str, selected_text: &str, current_file: &str, current_line: usize) {
        self.code_context = self
            .code_context
            .rebuild(code, selected_text, current_file, current_line);
        debug!(
            file = current_file,
            line = current_line,
            imports = self.code_context.imports.len(),
            functions = self.code_context.functions.len(),
            "session: code context updated"
        );
    }

    // -------------------------------------------------------------------------
    // sending
    // -------------------------------------------------------------------------

    /// Append `message` as the user's turn and start the matching request.
    ///
    /// Free-text kinds (`CustomQuery`, `BugFix`) send `message` as the payload;
    /// code kinds send the current selection.
    pub fn send_message(&mut self, message: &str, kind: RequestKind) {
        self.push_message(message.to_string(), true, Vec::new(), false);

        let context = self.code_context.clone();
        let selected = context.selected_text.clone();
        let request = match kind {
            RequestKind::CodeCompletion => AiRequest::CodeCompletion { context, partial_code: selected },
            RequestKind::CodeExplanation => AiRequest::CodeExplanation { context, code: selected },
            RequestKind::CodeReview => AiRequest::CodeReview { context, code: selected },
            RequestKind::BugFix => AiRequest::BugFix { context, error_message: message.to_string() },
            RequestKind::CodeOptimization => AiRequest::CodeOptimization { context, code: selected },
            RequestKind::GenerateDocstring => AiRequest::GenerateDocstring { context, function: selected },
            RequestKind::CustomQuery => AiRequest::CustomQuery { context, query: message.to_string() },
        };
        self.dispatch(request, Origin::Chat);
    }

    /// Run `action` on `selected`. A blank selection only appends a warning.
    pub fn perform_quick_action(&mut self, action: QuickAction, selected: &str) {
        if selected.trim().is_empty() {
            self.push_message(
                "⚠️ **No code selected**. Please select some code first to use quick actions.".into(),
                false,
                Vec::new(),
                false,
            );
            return;
        }

        let echo: String = selected.chars().take(QUICK_ACTION_ECHO_CHARS).collect();
        let ellipsis = if selected.chars().count() > QUICK_ACTION_ECHO_CHARS { "..." } else { "" };
        self.push_message(format!("🔧 **{action}**: `{echo}{ellipsis}`"), true, Vec::new(), false);

        let request = action.request(self.code_context.clone(), selected);
        self.dispatch(request, Origin::QuickAction);
    }

    fn dispatch(&mut self, request: AiRequest, origin: Origin) {
        self.pending += 1;
        info!(kind = request.kind(), pending = self.pending, "session: request dispatched");

        let guard = CompletionGuard { tx: Some(self.tx.clone()), origin };
        let service = Arc::clone(&self.service);
        self.tasks.spawn(async move {
            let response = service.process_request(&request).await;
            guard.complete(response);
        });
    }

    // -------------------------------------------------------------------------
    // completions
    // -------------------------------------------------------------------------

    /// Wait for the next request to settle and return the message it appended.
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_completion(&mut self) -> Option<&ChatMessage> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.apply(completion);
        self.messages.last()
    }

    /// Apply every completion that has already arrived without waiting.
    /// Returns how many were applied.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while self.pending > 0 {
            let Ok(completion) = self.rx.try_recv() else { break };
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Wait until every outstanding request has settled.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    fn apply(&mut self, completion: Completion) {
        let Completion { origin, outcome } = completion;
        match outcome {
            Outcome::Response(AiResponse::Success { content, suggestions }) => {
                self.push_message(content, false, suggestions, false);
            }
            Outcome::Response(AiResponse::Error { message, .. }) => {
                let content = match origin {
                    Origin::Chat => {
                        format!("❌ **Error**: {message}\n\nPlease check your API key in settings or try again.")
                    }
                    Origin::QuickAction => format!("❌ **Error**: {message}"),
                };
                self.push_message(content, false, Vec::new(), true);
            }
            Outcome::Response(AiResponse::Loading) => {
                self.push_message("❌ **Unexpected error occurred**. Please try again.".into(), false, Vec::new(), true);
            }
            Outcome::Failed(reason) => {
                let content = match origin {
                    Origin::Chat => format!(
                        "❌ **Network error**: {reason}\n\nPlease check your internet connection and try again."
                    ),
                    Origin::QuickAction => format!("❌ **Error**: {reason}"),
                };
                self.push_message(content, false, Vec::new(), true);
            }
        }

        self.pending = self.pending.saturating_sub(1);
        // Reap finished task handles so the set does not grow.
        while self.tasks.try_join_next().is_some() {}
        debug!(pending = self.pending, "session: completion applied");
    }

    // -------------------------------------------------------------------------
    // settings
    // -------------------------------------------------------------------------

    /// Persist `config` and confirm it in the transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written; nothing is appended then.
    pub fn update_config(&mut self, config: &AiConfig) -> Result<(), AiError> {
        self.service.settings().save_config(config)?;
        let on_off = |flag: bool| if flag { "Enabled" } else { "Disabled" };
        let content = format!(
            "✅ **Settings Updated**\n\n• Model: {}\n• Context Awareness: {}\n• Auto-completion: {}\n• Code Review: {}",
            config.model,
            on_off(config.context_enabled),
            on_off(config.auto_complete_enabled),
            on_off(config.code_review_enabled),
        );
        self.push_message(content, false, Vec::new(), false);
        info!(model = %config.model, "session: settings updated");
        Ok(())
    }

    /// Persist a new model choice, keeping the other flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub fn set_selected_model(&mut self, model: AiModel) -> Result<(), AiError> {
        let config = AiConfig { model, ..self.config() };
        self.service.settings().save_config(&config)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub fn save_api_key(&self, api_key: &str) -> Result<(), AiError> {
        self.service.settings().save_api_key(api_key)?;
        Ok(())
    }

    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.service.settings().api_key()
    }

    /// Inline completion suggestions for `partial_code`; never touches the transcript.
    pub async fn quick_completions(&self, partial_code: &str) -> Vec<String> {
        self.service
            .quick_completion(self.code_context.clone(), partial_code, DEFAULT_QUICK_SUGGESTIONS)
            .await
    }

    // -------------------------------------------------------------------------
    // transcript
    // -------------------------------------------------------------------------

    /// Reset the transcript to the welcome message. In-flight requests still
    /// append their result when they settle.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.push_welcome();
    }

    /// Empty the transcript entirely.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    fn push_welcome(&mut self) {
        let content = format!(
            "👋 **Welcome to AI Assistant!**\n\n\
             I'm here to help you with your Python code. I can:\n\n\
             • **Explain code** - Help you understand complex logic\n\
             • **Fix bugs** - Debug and suggest solutions\n\
             • **Optimize code** - Improve performance and readability\n\
             • **Generate docs** - Create comprehensive documentation\n\
             • **Review code** - Best practices and suggestions\n\
             • **Answer questions** - General Python and programming help\n\n\
             💡 **Quick Actions**: Select any code and use the quick actions for instant help!\n\n\
             🤖 **Current Model**: {}\n\n\
             Just ask me anything about your Python code!",
            self.config().model
        );
        self.push_message(content, false, Vec::new(), false);
    }

    fn push_message(&mut self, content: String, is_user: bool, suggestions: Vec<String>, is_error: bool) {
        let timestamp = now_ms().max(self.last_timestamp);
        self.last_timestamp = timestamp;
        self.messages
            .push(ChatMessage { content, is_user, timestamp, suggestions, is_error });
    }
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
