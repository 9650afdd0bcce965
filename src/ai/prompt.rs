//! Prompt builder — request + config → single prompt string.
//!
//! DESIGN
//! ======
//! The prompt is four blocks separated by blank lines:
//! `SYSTEM_PREAMBLE`, the context block (only when context awareness is on),
//! the task block for the request variant, and `TRAILING_INSTRUCTION`.
//! User code is substituted verbatim into fenced blocks; fence sequences in
//! that code are not escaped.

use std::fmt::Write;

use super::types::{AiConfig, AiRequest};
use crate::context::CodeContext;

pub const SYSTEM_PREAMBLE: &str = "\
You are an expert Python programming assistant for the Python Pocket IDE mobile application.

Context:
- This is a mobile Python IDE for educational use
- Target audience: MCA students and Python learners
- Focus on Python 3.11.5 compatibility
- Emphasize educational best practices
- Consider mobile device constraints (memory, processing)
- Support both beginners and advanced users

Expertise areas:
- Python programming (all levels)
- Mobile app development
- Educational programming concepts
- Code optimization for mobile devices
- Debugging and error resolution
- Best practices and clean code

Response style:
- Clear and educational explanations
- Include code examples when helpful
- Suggest multiple approaches when applicable
- Highlight potential issues or improvements
- Use markdown formatting for code blocks";

pub const TRAILING_INSTRUCTION: &str = "Please provide a helpful, accurate, and concise response focused on Python development for mobile/educational use.";

/// Assemble the full prompt for `request` under `config`.
#[must_use]
pub fn build_prompt(request: &AiRequest, config: &AiConfig) -> String {
    let mut blocks = vec![SYSTEM_PREAMBLE.to_string()];
    if config.context_enabled {
        blocks.push(build_context_block(request.context()));
    }
    blocks.push(build_task_block(request));
    blocks.push(TRAILING_INSTRUCTION.to_string());
    blocks.join("\n\n")
}

pub(crate) fn build_context_block(context: &CodeContext) -> String {
    let mut out = String::from("Current code context:\n");
    let _ = writeln!(out, "- File: {}", context.current_file);
    let _ = writeln!(out, "- Line: {}", context.current_line);
    let _ = writeln!(out, "- Project type: {}", context.project_type);
    let _ = writeln!(out, "- Available imports: {}", context.imports.join(", "));
    let _ = writeln!(out, "- Variables in scope: {}", context.variables.join(", "));
    let _ = writeln!(out, "- Functions in scope: {}", context.functions.join(", "));
    out.push('\n');
    out.push_str("Surrounding code:\n");
    push_fenced(&mut out, "python", &context.surrounding_code);
    out.push_str("\n\nSelected/Focus text:\n");
    push_fenced(&mut out, "python", &context.selected_text);
    out
}

pub(crate) fn build_task_block(request: &AiRequest) -> String {
    let mut out = String::new();
    match request {
        AiRequest::CodeCompletion { partial_code, .. } => {
            out.push_str("Task: Code Completion\n\n");
            out.push_str("The user is typing the following code and needs intelligent completion suggestions:\n");
            push_fenced(&mut out, "python", partial_code);
            push_checklist(
                &mut out,
                "Please provide:",
                &[
                    "Most likely completion(s) for the current line",
                    "Brief explanation of what the completion does",
                    "Alternative suggestions if applicable",
                ],
            );
            out.push_str("Focus on Python 3.11.5 compatible suggestions that work well on mobile devices.");
        }
        AiRequest::CodeExplanation { code, .. } => {
            out.push_str("Task: Code Explanation\n\n");
            out.push_str("Please explain the following Python code in educational terms:\n");
            push_fenced(&mut out, "python", code);
            push_checklist(
                &mut out,
                "Provide:",
                &[
                    "Line-by-line explanation for complex parts",
                    "Overall purpose and functionality",
                    "Key concepts or patterns used",
                    "Potential improvements or alternatives",
                ],
            );
            out.push_str("Tailor explanation for MCA students learning Python.");
        }
        AiRequest::CodeReview { code, .. } => {
            out.push_str("Task: Code Review\n\n");
            out.push_str(
                "Please review the following Python code for best practices, potential issues, and improvements:\n",
            );
            push_fenced(&mut out, "python", code);
            push_checklist(
                &mut out,
                "Focus on:",
                &[
                    "Code quality and readability",
                    "Performance considerations for mobile",
                    "Python best practices",
                    "Potential bugs or edge cases",
                    "Educational value and learning opportunities",
                ],
            );
            out.push_str("Provide specific suggestions with examples.");
        }
        AiRequest::BugFix { error_message, .. } => {
            out.push_str("Task: Bug Fix Assistance\n\n");
            out.push_str("The user encountered this error:\n");
            push_fenced(&mut out, "", error_message);
            push_checklist(
                &mut out,
                "In the context of their code. Please help by:",
                &[
                    "Explaining what likely caused this error",
                    "Providing specific fix suggestions",
                    "Showing corrected code examples",
                    "Suggesting ways to prevent similar errors",
                ],
            );
            out.push_str("Consider mobile Python environment limitations.");
        }
        AiRequest::CodeOptimization { code, .. } => {
            out.push_str("Task: Code Optimization\n\n");
            out.push_str(
                "Please optimize the following Python code for better performance, especially considering mobile device constraints:\n",
            );
            push_fenced(&mut out, "python", code);
            push_checklist(
                &mut out,
                "Focus on:",
                &[
                    "Memory efficiency",
                    "Processing speed",
                    "Battery usage considerations",
                    "Maintainability",
                    "Educational clarity",
                ],
            );
            out.push_str("Provide optimized version with explanations.");
        }
        AiRequest::GenerateDocstring { function, .. } => {
            out.push_str("Task: Generate Documentation\n\n");
            out.push_str("Please generate comprehensive docstring for this Python function:\n");
            push_fenced(&mut out, "python", function);
            push_checklist(
                &mut out,
                "Include:",
                &[
                    "Clear description of purpose",
                    "Parameter descriptions with types",
                    "Return value description",
                    "Usage examples",
                    "Any important notes or warnings",
                ],
            );
            out.push_str("Follow Google/NumPy docstring style.");
        }
        AiRequest::CustomQuery { query, .. } => {
            out.push_str("Task: Custom Query\n\n");
            let _ = write!(out, "User question: {query}");
            push_checklist(
                &mut out,
                "Please provide a helpful response considering:",
                &[
                    "The current code context",
                    "Python 3.11.5 compatibility",
                    "Mobile development constraints",
                    "Educational value for MCA students",
                ],
            );
            out.push_str("Be specific and provide code examples when relevant.");
        }
    }
    out
}

fn push_fenced(out: &mut String, lang: &str, body: &str) {
    let _ = write!(out, "```{lang}\n{body}\n```");
}

/// Blank line, heading, numbered items, blank line.
fn push_checklist(out: &mut String, heading: &str, items: &[&str]) {
    let _ = write!(out, "\n\n{heading}\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
    out.push('\n');
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
