//! Prompt templating helpers.
//!
//! The built-in prompt text lives in template files under `templates/` and is
//! rendered with `{{KEY}}` placeholders.

use std::collections::BTreeMap;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.template");
const USER_TURN_TEMPLATE: &str = include_str!("templates/user_turn.template");
const TOOL_RESPONSE_TEMPLATE: &str = include_str!("templates/tool_response.template");

/// Render the system message, optionally extended with operator instructions.
pub fn render_system_prompt(custom_instructions: Option<&str>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert(
        "CUSTOM_INSTRUCTIONS_BLOCK",
        render_custom_instructions(custom_instructions),
    );
    render_template(SYSTEM_PROMPT_TEMPLATE, &vars).trim().to_string()
}

/// Render the user message for one turn.
///
/// `tool_results` are the rendered results of the previous batch. When empty
/// the message carries only the question and the decision instructions.
pub fn render_user_turn(query: &str, tool_results: &[String]) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("QUERY", query.to_string());
    vars.insert("TOOL_RESPONSE", render_tool_response(tool_results));
    render_template(USER_TURN_TEMPLATE, &vars)
}

fn render_tool_response(tool_results: &[String]) -> String {
    if tool_results.is_empty() {
        return String::new();
    }
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TOOL_RESULTS", tool_results.join("\n\n"));
    render_template(TOOL_RESPONSE_TEMPLATE, &vars)
}

/// Substitute `{{KEY}}` placeholders in one pass.
///
/// Substituted values are never rescanned, so user text containing braces is
/// inserted verbatim. Unknown placeholders are left as written.
fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if vars.contains_key(&after[..end]) => {
                rendered.push_str(&vars[&after[..end]]);
                rest = &after[end + 2..];
            }
            _ => {
                rendered.push_str("{{");
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

fn render_custom_instructions(custom: Option<&str>) -> String {
    let Some(custom) = custom.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    format!("\nAdditional operator instructions:\n{custom}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_core_text() {
        assert_eq!(
            render_system_prompt(None),
            "You want to find the best answer to a user question.\n\
             Answer the question using the functions you have been provided with.\n\
             As soon as you have the ability to deliver a final answer, STOP calling functions."
        );
    }

    #[test]
    fn system_prompt_appends_operator_instructions() {
        let prompt = render_system_prompt(Some("  Answer in German.  "));
        assert!(prompt.ends_with("STOP calling functions.\n\nAdditional operator instructions:\nAnswer in German."));
        assert_eq!(render_system_prompt(Some("   ")), render_system_prompt(None));
    }

    #[test]
    fn first_turn_has_no_tool_prefix() {
        let turn = render_user_turn("What is 2+2?", &[]);
        assert_eq!(
            turn,
            "My question: What is 2+2?\n\n\
             Your turn!\n\
             Decide the next action to choose. Pick from the available tools.\n\n\
             If you think you gathered all necessary information, generate a final answer."
        );
    }

    #[test]
    fn later_turns_embed_tool_results() {
        let results = vec![
            "Source: A\n\nResults:\none".to_string(),
            "Source: B\n\nResults:\ntwo".to_string(),
        ];
        let turn = render_user_turn("q", &results);
        assert!(turn.starts_with(
            "Here is the information from the last tool use.\n\
             Remember, if this is enough information to answer the query, proceed to answer!\n\n\
             Source: A\n\nResults:\none\n\nSource: B\n\nResults:\ntwo\n\n\
             My question: q\n\n"
        ));
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let turn = render_user_turn("literal {{TOOL_RESPONSE}} and {{", &[]);
        assert!(turn.starts_with("My question: literal {{TOOL_RESPONSE}} and {{\n\n"));
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let vars = BTreeMap::from([("A", "x".to_string())]);
        assert_eq!(render_template("{{A}}-{{B}}-{{A", &vars), "x-{{B}}-{{A");
    }
}
