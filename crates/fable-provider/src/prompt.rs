//! Prompt assembly for story generation and image analysis
//!
//! The model is instructed to put the story title alone on the first line
//! so the response can be split into title and body without a second call.

use indoc::{formatdoc, indoc};

use fable_core::{AgeBand, StoryRequest};

/// System instruction sent with every story generation request
pub const STORY_SYSTEM_INSTRUCTION: &str = indoc! {"
    You are a children's storyteller for a family storytelling app.
    Stories are warm, imaginative, and always appropriate for young
    children. Never include violence, fear, romance, or mature themes.
"};

/// Register guidance for a reader age bracket
const fn age_guidance(band: AgeBand) -> &'static str {
    match band {
        AgeBand::Preschool => "Use very short sentences and simple, familiar words.",
        AgeBand::EarlyReader => {
            "Use short sentences and everyday vocabulary with a few stretch words."
        }
        AgeBand::MiddleGrade => {
            "Use varied sentences and richer vocabulary with a clear narrative arc."
        }
    }
}

/// Assemble the full story prompt from a request
///
/// Optional sections (theme, goals, characters, image scenes) are only
/// emitted when the request carries them.
pub fn story_prompt(request: &StoryRequest) -> String {
    use std::fmt::Write;

    let mut prompt = formatdoc! {"
        Write a children's story for readers aged {age}.

        Story idea: {idea}
        ",
        age = request.age_band,
        idea = request.prompt.trim(),
    };

    if let Some(theme) = &request.theme {
        let _ = writeln!(prompt, "Theme: {theme}");
    }
    if !request.educational_goals.is_empty() {
        let _ = writeln!(
            prompt,
            "Weave in these learning goals: {}.",
            request.educational_goals.join(", ")
        );
    }
    if !request.character_packs.is_empty() {
        let _ = writeln!(
            prompt,
            "Feature these characters: {}.",
            request.character_packs.join(", ")
        );
    }
    if !request.image_descriptions.is_empty() {
        prompt.push_str("\nThe reader shared these pictures, set scenes around them:\n");
        for description in &request.image_descriptions {
            let _ = writeln!(prompt, "- {description}");
        }
    }

    let _ = write!(
        prompt,
        "\n{}\nPut the story title alone on the first line, then a blank line, then the story.",
        age_guidance(request.age_band),
    );

    prompt
}

/// Prompt for batched image analysis
///
/// The model is told to answer with bare JSON so the response parses
/// without scraping prose.
pub fn analysis_prompt(count: usize) -> String {
    formatdoc! {r#"
        Describe each of the {count} attached images for use in a children's story.

        Respond with a JSON array of exactly {count} objects, one per image in
        order, each shaped as:
        {{"description": "one or two sentences", "tags": ["keyword"], "child_friendly": true}}

        Respond with the JSON array only, no surrounding prose or code fences.
    "#}
}

/// Split generated text into title and story body
///
/// The first line becomes the title once markdown decoration is stripped;
/// when it is empty or implausibly long the whole text is kept as the body
/// and a title is derived from the request prompt instead.
pub fn split_title(raw: &str, request_prompt: &str) -> (String, String) {
    let trimmed = raw.trim();
    let (first, rest) = match trimmed.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };

    match clean_title(first) {
        Some(title) if !rest.trim().is_empty() => (title, rest.trim().to_owned()),
        _ => (fallback_title(request_prompt), trimmed.to_owned()),
    }
}

fn clean_title(line: &str) -> Option<String> {
    let line = line.trim();
    let line = line.strip_prefix("Title:").unwrap_or(line);
    let cleaned = line
        .trim_matches(|c: char| c == '#' || c == '*' || c == '"' || c.is_whitespace())
        .trim();

    if cleaned.is_empty() || cleaned.chars().count() > 100 {
        None
    } else {
        Some(cleaned.to_owned())
    }
}

/// Title derived from the first words of the request prompt
pub fn fallback_title(prompt: &str) -> String {
    let words: Vec<&str> = prompt.split_whitespace().take(5).collect();
    if words.is_empty() {
        "A New Story".to_owned()
    } else {
        format!("The {} Adventure", words.join(" "))
    }
}
