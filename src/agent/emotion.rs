// SYNOID Emotion Classifier
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::palette::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood inferred from an image's dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Emotion {
    ExcitingOrFiery,
    CalmOrDreamy,
    FreshOrJoyful,
    MysteriousOrAdventurous,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [
        Emotion::ExcitingOrFiery,
        Emotion::CalmOrDreamy,
        Emotion::FreshOrJoyful,
        Emotion::MysteriousOrAdventurous,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::ExcitingOrFiery => "exciting or fiery",
            Emotion::CalmOrDreamy => "calm or dreamy",
            Emotion::FreshOrJoyful => "fresh or joyful",
            Emotion::MysteriousOrAdventurous => "mysterious or adventurous",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Emotion> for String {
    fn from(e: Emotion) -> Self {
        e.label().to_string()
    }
}

impl TryFrom<String> for Emotion {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.label() == raw)
            .ok_or_else(|| format!("unknown emotion label '{}'", raw))
    }
}

/// Map a dominant color to an emotion. Rules are checked in order; first match wins.
pub fn infer_emotion(color: Rgb) -> Emotion {
    let [r, g, b] = color;
    if r > 200 && g < 100 && b < 100 {
        Emotion::ExcitingOrFiery
    } else if b > 180 {
        Emotion::CalmOrDreamy
    } else if g > 180 {
        Emotion::FreshOrJoyful
    } else {
        Emotion::MysteriousOrAdventurous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiery_region() {
        for r in [201u8, 230, 255] {
            for g in [0u8, 50, 99] {
                for b in [0u8, 42, 99] {
                    assert_eq!(infer_emotion([r, g, b]), Emotion::ExcitingOrFiery);
                }
            }
        }
        // just outside the thresholds
        assert_ne!(infer_emotion([200, 50, 50]), Emotion::ExcitingOrFiery);
        assert_ne!(infer_emotion([250, 100, 50]), Emotion::ExcitingOrFiery);
        assert_ne!(infer_emotion([250, 50, 100]), Emotion::ExcitingOrFiery);
    }

    #[test]
    fn test_reference_colors() {
        assert_eq!(infer_emotion([0, 0, 200]), Emotion::CalmOrDreamy);
        assert_eq!(infer_emotion([0, 200, 0]), Emotion::FreshOrJoyful);
        assert_eq!(infer_emotion([100, 100, 100]), Emotion::MysteriousOrAdventurous);
        assert_eq!(infer_emotion([210, 50, 40]), Emotion::ExcitingOrFiery);
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // blue and green both above threshold: blue rule is checked first
        assert_eq!(infer_emotion([0, 255, 255]), Emotion::CalmOrDreamy);
        // bright white satisfies the blue rule too
        assert_eq!(infer_emotion([255, 255, 255]), Emotion::CalmOrDreamy);
        // red with strong green is not fiery, falls to the green rule
        assert_eq!(infer_emotion([255, 200, 0]), Emotion::FreshOrJoyful);
    }

    #[test]
    fn test_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Emotion::CalmOrDreamy).unwrap();
        assert_eq!(json, "\"calm or dreamy\"");
        let back: Emotion = serde_json::from_str("\"fresh or joyful\"").unwrap();
        assert_eq!(back, Emotion::FreshOrJoyful);
        assert!(serde_json::from_str::<Emotion>("\"sad\"").is_err());
    }
}
