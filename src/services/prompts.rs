//! Prompt assembly and diff extraction for model proposal rounds.

use crate::domain::models::Language;
use crate::domain::ports::PatchRequest;

/// System prompt shared by every proposal round.
pub const SYSTEM_PROMPT: &str = "You are an automated program-repair assistant. \
You receive static analysis findings and source snippets from a project and \
propose minimal fixes. Reply with one or more unified diffs, each inside a \
```diff fenced block, ordered from most to least confident. Diffs must apply \
from the project root. Do not include commentary inside the fences.";

/// Render the user prompt for one proposal round.
///
/// The first round is conditioned on the analysis report and snippets; later
/// rounds additionally carry the test failure log from the round before.
pub fn build_user_prompt(request: &PatchRequest) -> String {
    let language = match request.language {
        Language::Python => "Python",
        Language::Cpp => "C++",
    };

    let mut prompt = format!(
        "Project language: {language}\n\n\
         ## Static analysis report\n\n{report}\n\n\
         ## Source snippets around findings\n\n{snippets}\n",
        report = section_or_placeholder(&request.report, "(no analyzer output)"),
        snippets = section_or_placeholder(&request.snippets, "(no snippets extracted)"),
    );

    if let Some(failures) = &request.failure_log {
        prompt.push_str(&format!(
            "\n## Test failures after the previous patch round\n\n{failures}\n\
             \nThe previous candidates did not make the tests pass. Propose \
             different fixes.\n"
        ));
    }

    prompt.push_str(
        "\nPropose fixes for the issues above as unified diffs in ```diff \
         blocks, best candidate first.",
    );
    prompt
}

fn section_or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

/// Extract the diff bodies from a model reply, in reply order.
///
/// Accepts ```diff and ```patch fences; a bare ``` fence is accepted too
/// when its body starts like a unified diff. Empty bodies are dropped.
pub fn extract_diffs(reply: &str) -> Vec<String> {
    let mut diffs = Vec::new();
    let mut in_fence = false;
    let mut fence_is_diff = false;
    let mut current = String::new();

    for line in reply.lines() {
        let trimmed = line.trim_start();
        if !in_fence && trimmed.starts_with("```") {
            let tag = trimmed.trim_start_matches('`').trim().to_lowercase();
            in_fence = true;
            fence_is_diff = tag == "diff" || tag == "patch" || tag.is_empty();
            current.clear();
            continue;
        }
        if in_fence && trimmed.starts_with("```") {
            in_fence = false;
            if fence_is_diff && looks_like_diff(&current) {
                diffs.push(current.trim_end().to_string());
            }
            current.clear();
            continue;
        }
        if in_fence {
            current.push_str(line);
            current.push('\n');
        }
    }

    diffs
}

fn looks_like_diff(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with("--- ") || head.starts_with("diff --git") || head.starts_with("Index:")
}
