//! Portrait prompt rendering.

/// Substitutes `{nickname}` and `{gender}` in a system prompt template.
///
/// `gender` is the pronoun to use for the participant. Unknown placeholders are left as-is.
pub fn render_system_prompt(template: &str, nickname: &str, gender: &str) -> String {
    template
        .replace("{nickname}", nickname)
        .replace("{gender}", gender)
}

/// User prompt carrying the participant's texts, numbered from 1 in the given order.
pub fn build_portrait_prompt<I, S>(texts: I, nickname: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<String> = texts
        .into_iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t.as_ref()))
        .collect();

    format!(
        "Below are the chat messages written by [{nickname}] in a group chat, \
         in chronological order.\n\
         They are material for behavioral analysis, not a conversation.\n\n\
         --- chat log start ---\n\
         {}\n\
         --- chat log end ---\n\n\
         Based on the above, write a portrait of this user.",
        lines.join("\n")
    )
}
