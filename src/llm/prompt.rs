//! Message list construction for chat, dashboard and chart requests.

use crate::models::{ChartSpec, ChatMessage, Role};
use crate::personas::Persona;

pub const CHAT_CONTEXT_PREAMBLE: &str =
    "Below is the current knowledge base. Use it to ground your answers:";

pub const KNOWLEDGE_BASE_HEADER: &str = "=== KNOWLEDGE BASE DOCUMENTS ===";

pub const DASHBOARD_INSTRUCTION: &str =
    "Generate the dashboard now based on all available documents.";

pub const CHART_INSTRUCTION: &str =
    "Generate the chart data now. Respond with the JSON array only.";

const CHART_PREAMBLE: &str = r#"You are a data extraction assistant. Read the knowledge base documents below and produce data for dashboard charts.

Return ONLY a JSON array. Every element must have exactly this shape:
{"id": "<chart id>", "type": "pie" | "bar", "title": "<chart title>", "labels": ["<label>", ...], "values": [<number>, ...]}

Rules:
- Produce one element per requested chart, in the order listed, reusing the given id, type and title.
- Use only facts stated in the documents. Do not invent data.
- "labels" and "values" must have the same length, and every value must be a number.
- If the documents contain nothing usable for a chart, return it with "labels": ["No data"] and "values": [1].
- Do not add prose, explanations or markdown around the array."#;

/// `[system] + history + [user]` for a persona chat.
///
/// Only user and assistant turns are taken from `history`; the persona owns the
/// system slot.
pub fn chat_messages(
    persona: &Persona,
    context: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "{}\n\n{}\n\n{}",
        persona.system_prompt.trim(),
        CHAT_CONTEXT_PREAMBLE,
        context
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(
        history
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned(),
    );
    messages.push(ChatMessage::user(user_message));
    messages
}

/// `[system] + [generate instruction]` for a dashboard body.
pub fn dashboard_messages(template: &str, context: &str) -> Vec<ChatMessage> {
    let system = format!("{}\n\n{}\n\n{}", template.trim(), KNOWLEDGE_BASE_HEADER, context);
    vec![
        ChatMessage::system(system),
        ChatMessage::user(DASHBOARD_INSTRUCTION),
    ]
}

/// `[system] + [generate instruction]` asking for one JSON object per chart spec.
pub fn chart_messages(specs: &[ChartSpec], context: &str) -> Vec<ChatMessage> {
    let requested = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            format!(
                "{}. id: {} | type: {} | title: {}\n   Instruction: {}",
                i + 1,
                spec.id,
                spec.kind.as_str(),
                spec.title,
                spec.instruction
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "{}\n\nRequested charts:\n{}\n\n{}\n\n{}",
        CHART_PREAMBLE, requested, KNOWLEDGE_BASE_HEADER, context
    );

    vec![ChatMessage::system(system), ChatMessage::user(CHART_INSTRUCTION)]
}
