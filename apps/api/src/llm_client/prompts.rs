// Cross-cutting prompt fragments shared by more than one module.
// Module-specific prompt text lives next to the module that owns it.

/// Appended to every interviewer-facing prompt. The replies are fed to
/// text-to-speech, so structure and markup are forbidden outright.
pub const SPOKEN_STYLE_CONSTRAINTS: &str = "\
Constraints:
- Use a spoken, natural style suitable for text-to-speech.
- NEVER use markdown formatting such as bolding, bullet points, or lists.
- Be concise: keep responses under 3 sentences if possible.
- Do not break character.";

/// System fragment for calls that must return machine-readable JSON.
pub const JSON_ONLY_DISCIPLINE: &str = "\
You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";
