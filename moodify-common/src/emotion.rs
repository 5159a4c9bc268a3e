//! Emotion labels and the per-emotion lookup tables
//!
//! Every table here is an exhaustive `match` over [`Emotion`], so adding a
//! label fails to compile until each concern handles it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Facial-expression label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Neutral,
    Surprised,
    Fearful,
    Disgusted,
}

/// Descriptive copy shown next to the detected mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodProfile {
    pub description: &'static str,
    pub genres: &'static [&'static str],
}

impl Emotion {
    /// All labels, in classifier order
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Neutral,
        Emotion::Surprised,
        Emotion::Fearful,
        Emotion::Disgusted,
    ];

    /// Wire/label form (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Neutral => "neutral",
            Emotion::Surprised => "surprised",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
        }
    }

    /// Capitalized name for headings
    pub fn display_name(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Neutral => "Neutral",
            Emotion::Surprised => "Surprised",
            Emotion::Fearful => "Fearful",
            Emotion::Disgusted => "Disgusted",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Neutral => "😐",
            Emotion::Surprised => "😮",
            Emotion::Fearful => "😨",
            Emotion::Disgusted => "🤢",
        }
    }

    /// Accent color (hex) used for mood badges and borders
    pub fn accent_color(&self) -> &'static str {
        match self {
            Emotion::Happy => "#FFD700",
            Emotion::Sad => "#4B6CBF",
            Emotion::Angry => "#E54B4B",
            Emotion::Neutral | Emotion::Surprised | Emotion::Fearful | Emotion::Disgusted => {
                "#9B9B9B"
            }
        }
    }

    /// Short label printed on each recommended track card
    pub fn badge_label(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy Vibes",
            Emotion::Sad => "Melancholy",
            Emotion::Angry => "Intense",
            Emotion::Neutral => "Balanced",
            Emotion::Surprised | Emotion::Fearful | Emotion::Disgusted => "Mood Match",
        }
    }

    /// One-line tagline for the current-mood status bar
    pub fn tagline(&self) -> &'static str {
        match self {
            Emotion::Happy => "Upbeat music coming your way!",
            Emotion::Sad => "Comforting melodies for you",
            Emotion::Angry => "Release that energy with intense tracks",
            Emotion::Neutral => "Balanced tunes for your neutral mood",
            Emotion::Surprised => "Something unexpected to match the moment",
            Emotion::Fearful => "Calming sounds to help you settle",
            Emotion::Disgusted => "A fresh start for your ears",
        }
    }

    pub fn profile(&self) -> MoodProfile {
        match self {
            Emotion::Happy => MoodProfile {
                description: "You're feeling cheerful and optimistic! We'll suggest upbeat, energetic songs that complement your mood.",
                genres: &["Pop", "Dance", "Summer hits"],
            },
            Emotion::Sad => MoodProfile {
                description: "You seem a bit down today. We'll find some melodic, comforting tunes that might help lift your spirits.",
                genres: &["Ballads", "Acoustic", "Indie"],
            },
            Emotion::Angry => MoodProfile {
                description: "You're feeling intense! We'll suggest tracks with powerful beats and energy to help you express yourself.",
                genres: &["Rock", "Metal", "Punk"],
            },
            Emotion::Neutral => MoodProfile {
                description: "You're in a balanced state of mind. We'll recommend a mix of relaxing and moderately upbeat tracks.",
                genres: &["Alternative", "Ambient", "Indie Pop"],
            },
            Emotion::Surprised => MoodProfile {
                description: "You look surprised! We'll find some unexpected and exciting tracks to match your mood.",
                genres: &["Electronic", "Experimental", "Future Bass"],
            },
            Emotion::Fearful => MoodProfile {
                description: "You seem a bit anxious. We'll recommend some calming and reassuring music to help you relax.",
                genres: &["Ambient", "Classical", "Lo-fi"],
            },
            Emotion::Disgusted => MoodProfile {
                description: "You're not impressed! We'll find some refreshing and cleansing tracks to reset your mood.",
                genres: &["Jazz", "Classical", "Instrumental"],
            },
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown emotion label: {:?}", s)))
    }
}
