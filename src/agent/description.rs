// SYNOID Description Generator
// Copyright (c) 2026 Xing_The_Creator | SYNOID

/// Capitalize the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Publish-ready blurb for a finished story video.
pub fn auto_generate_description(caption: &str, emotion: &str, story: &str) -> String {
    let summary = story.trim().lines().next().unwrap_or_default().trim();

    format!(
        "\
✨ Dive into a magical tale born from a child's imagination!

🎨 Drawing inspired: \"{caption}\"
🎭 Emotion detected: {emotion}
📖 Story Summary: {summary}

🧒 Voice generated with AI narration.
🎬 Video created with SYNOID Canvas: storytelling from kids' art.",
        caption = caption,
        emotion = title_case(emotion),
        summary = summary,
    )
    .trim()
    .to_string()
}
