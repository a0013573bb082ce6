//! Instruction text sent to the text and image models.

use crate::ports::GenerationSettings;

const PERSONA: &str = "You are an expert director and viral content creator, specialized in \
generating prompts for advanced text-to-video models like Sora 2 Pro and Veo 3.";

const TASK: &str = "Your task is to create a detailed, cinematic, and viral-optimized video \
prompt based on the user's input.";

const DIRECTIVES: &[&str] = &[
    "--- Core Directives ---",
    "1.  **Story Formula:** Strictly follow the 'Hook + Scene + Twist' storytelling formula to \
maximize engagement.",
    "2.  **Viral Drivers:** Incorporate psychological drivers for virality: strong emotion (joy, \
awe, surprise, nostalgia), absurdity to stop scrolling, and relatable or familiar concepts.",
    "3.  **Cinematic Language:** Use precise, professional directorial language. Specify camera \
shots (e.g., 'extreme close-up', 'dynamic orbiting shot'), movement (e.g., 'slow-motion', 'whip \
pan'), lighting (e.g., 'warm sunset light', 'neon glow', 'soft lens flare'), and sound design.",
    "4.  **Realism & Detail:** Embed principles of physical realism and hyper-detailed \
descriptions. Mention gravity, inertia, material properties (e.g., 'physics-accurate fur \
motion'), and synchronized audio cues. Be extremely descriptive.",
];

const KEYWORDS_DIRECTIVE: &str = "6.  **User Keywords:** Pay close attention to any specific \
keywords provided by the user in their topic, such as visual styles (e.g., 'Anime'), moods (e.g., \
'Suspenseful'), or camera techniques (e.g., 'Drone shots'), and incorporate them directly into \
your creative choices.";

const EXEMPLAR: &[&str] = &[
    "--- Exemplar of Excellence (for your reference) ---",
    "Topic: A Raccoon Chef",
    "Example Result JSON: { \"model\": \"veo-3\", \"duration\": 12, \"aspect_ratio\": \"9:16\", \
\"prompt\": \"Extreme macro probe lens push-IN through a miniature, hyper-detailed Michelin-star \
kitchen hidden within a mossy tree stump...\", \"sound\": \"A rich, 3D ASMR soundscape: the crisp \
'shing' of a sharp knife...\", \"style\": \"Vertical IMAX quality. The texture is 'Arcane' meets \
hyper-realistic CGI...\", \"twist\": \"The raccoon hurls a single strand of spaghetti at a wall \
of polished slate, where it arranges itself into a replica of Vermeer's 'Girl with a Pearl \
Earring.'\" }",
    "Now, generate a new JSON object for the user's request, applying this level of detail and \
creativity.",
];

/// How the output format is communicated to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputContract {
    /// The field list is spelled out in the instructions (JSON-object mode).
    Inline,
    /// A response schema travels alongside the request.
    Schema,
}

/// Build the system instruction for brief generation.
#[must_use]
pub fn system_instruction(settings: GenerationSettings, contract: OutputContract) -> String {
    let format_rule = match contract {
        OutputContract::Inline => format!(
            "The final output MUST be a single JSON object. Do not add any markdown formatting \
like ```json or any other text outside the JSON object. The JSON object must have the following \
structure: {{ \"model\": string, \"duration\": {duration}, \"aspect_ratio\": \"{ratio}\", \
\"prompt\": string, \"sound\": string, \"style\": string, \"twist\": string }}.",
            duration = settings.duration_seconds,
            ratio = settings.aspect_ratio,
        ),
        OutputContract::Schema => {
            "The final output MUST be a single JSON object that strictly follows the provided \
schema."
                .to_string()
        }
    };
    let parameters = format!(
        "5.  **Target Video Parameters:** The video will be {} seconds long with a {} aspect \
ratio. Tailor the prompt complexity to be achievable within this duration.",
        settings.duration_seconds, settings.aspect_ratio,
    );

    let mut lines = vec![PERSONA.to_string(), TASK.to_string(), format_rule];
    lines.extend(DIRECTIVES.iter().map(|s| (*s).to_string()));
    lines.push(parameters);
    lines.push(KEYWORDS_DIRECTIVE.to_string());
    lines.extend(EXEMPLAR.iter().map(|s| (*s).to_string()));
    lines.join("\n")
}

/// Build the user message for brief generation.
#[must_use]
pub fn user_prompt(topic: &str, with_image: bool) -> String {
    if with_image {
        format!(
            "Use the following image as the primary visual and thematic inspiration for the \
topic: \"{topic}\""
        )
    } else {
        format!("Generate a prompt for the topic: \"{topic}\"")
    }
}

/// Build the image-generation prompt for a narrative.
#[must_use]
pub fn thumbnail_prompt(narrative: &str) -> String {
    format!(
        "Create a visually stunning, ultra-realistic, cinematic thumbnail for a viral video. \
The scene is: {narrative}. Emphasize the hook of the story."
    )
}

/// Strip a surrounding Markdown code fence, if any.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if is_fence_tag(tag) => body,
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// An info string such as `json`, `jsonc` or `JSON5`.
fn is_fence_tag(line: &str) -> bool {
    line.trim().chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}
