//! Session script composition.
//!
//! Builds the text that the speech orchestrator reads aloud: a greeting,
//! a mood introduction, up to two trigger lines, a background line and a
//! closing. Line choice within a trigger or the closing list is random, so
//! the composer takes the RNG as a parameter.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::preferences::Preferences;

/// Number of leading triggers that contribute a line.
const MAX_TRIGGER_LINES: usize = 2;

const DEFAULT_MOOD: &str = "relaxed";

/// Composes session scripts from listener preferences.
pub struct ScriptComposer;

impl ScriptComposer {
    /// Compose a full script.
    pub fn compose<R: Rng + ?Sized>(prefs: &Preferences, rng: &mut R) -> String {
        let name = prefs
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut parts: Vec<String> = Vec::with_capacity(6);

        parts.push(name.map_or_else(
            || "Welcome to your personal ASMR session.".to_string(),
            |n| format!("Hello {n}, welcome to your personal ASMR session."),
        ));

        let intro = mood_intro(&prefs.mood)
            .or_else(|| mood_intro(DEFAULT_MOOD))
            .unwrap_or_default();
        parts.push(intro.to_string());

        for trigger in prefs.triggers.iter().take(MAX_TRIGGER_LINES) {
            if let Some(line) = trigger_lines(trigger).and_then(|lines| lines.choose(rng)) {
                parts.push((*line).to_string());
            }
        }

        if let Some(line) = background_line(&prefs.background) {
            parts.push(line.to_string());
        }

        if let Some(closing) = CLOSINGS.choose(rng) {
            parts.push((*closing).to_string());
        }

        let mut script = parts.join(" ");
        if let Some(n) = name {
            script.push_str(&format!(" Sweet dreams, {n}."));
        }

        tracing::debug!(
            mood = %prefs.mood,
            triggers = prefs.triggers.len(),
            len = script.len(),
            "Composed session script"
        );

        script
    }

    /// Apply a quick variation to an existing script.
    #[must_use]
    pub fn vary(script: &str, variation: QuickVariation) -> String {
        match variation {
            QuickVariation::FasterBrushing => {
                script.replace("gentle", "rhythmic").replace("slow", "steady")
            }
            QuickVariation::MoreRain => format!(
                "{script} Listen as the rain grows a little stronger, each drop creating perfect harmony."
            ),
            QuickVariation::Affirmations => format!(
                "{script} You are worthy of peace. You are deserving of rest. You are exactly where you need to be."
            ),
            QuickVariation::SofterWhispers => script
                .replace("Listen", "Softly listen")
                .replace("Can you hear", "Can you gently hear"),
            QuickVariation::DifferentTriggers => script
                .replace("tapping", "gentle scratching")
                .replace("brushing", "soft fabric sounds"),
        }
    }
}

/// One-tap script tweaks offered after a session has been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickVariation {
    FasterBrushing,
    MoreRain,
    Affirmations,
    SofterWhispers,
    DifferentTriggers,
}

impl QuickVariation {
    pub const ALL: [Self; 5] = [
        Self::FasterBrushing,
        Self::MoreRain,
        Self::Affirmations,
        Self::SofterWhispers,
        Self::DifferentTriggers,
    ];

    /// Label shown to the listener.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FasterBrushing => "Faster brushing",
            Self::MoreRain => "More rain sounds",
            Self::Affirmations => "Add affirmations",
            Self::SofterWhispers => "Softer whispers",
            Self::DifferentTriggers => "Different triggers",
        }
    }

    /// Look a variation up by its label (case-insensitive).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(label.trim()))
    }
}

// ── Content tables ─────────────────────────────────────────────────

fn mood_intro(mood: &str) -> Option<&'static str> {
    let line = match mood {
        "relaxed" => "Let's take some time to unwind and let go of any tension.",
        "sleepy" => "It's time to prepare your mind and body for peaceful sleep.",
        "stressed" => "Let's slow down and find some calm in this moment.",
        "anxious" => "Take a deep breath with me, and let's ease that anxiety away.",
        "focused" => "Let's clear your mind and help you find your center.",
        "lonely" => "You're not alone. I'm here with you, and we'll spend this time together.",
        "sad" => "It's okay to feel what you're feeling. Let's find some comfort together.",
        _ => return None,
    };
    Some(line)
}

fn trigger_lines(trigger: &str) -> Option<&'static [&'static str]> {
    let lines: &'static [&'static str] = match trigger.to_ascii_lowercase().as_str() {
        "whispering" => &[
            "Listen to the gentle sound of my voice, soft and soothing.",
            "Each whisper is meant just for you, carrying away your worries.",
            "Let these soft sounds wash over you like a gentle breeze.",
        ],
        "tapping" => &[
            "Can you hear these gentle taps? Each one is rhythmic and calming.",
            "The soft tapping creates a peaceful pattern, like raindrops on a window.",
            "Focus on each tap, letting it guide you deeper into relaxation.",
        ],
        "brushing" => &[
            "Imagine soft bristles gently brushing away all your stress.",
            "The rhythmic brushing sounds help your mind drift and wander.",
            "Each brush stroke is like a gentle caress, soothing and comforting.",
        ],
        "page turning" => &[
            "Listen to the delicate sound of pages turning slowly.",
            "Each page carries away a worry, leaving space for peace.",
            "The gentle rustling of paper creates a cocoon of calm around you.",
        ],
        "rain" => &[
            "Let the gentle patter of rain wash away your concerns.",
            "Each drop brings renewal and freshness to your spirit.",
            "The steady rhythm of rainfall creates perfect harmony for rest.",
        ],
        "personal attention" => &[
            "You deserve this moment of care and attention.",
            "I'm here to take care of you, to help you feel valued and peaceful.",
            "This time is just for you, to feel heard and understood.",
        ],
        _ => return None,
    };
    Some(lines)
}

fn background_line(background: &str) -> Option<&'static str> {
    let line = match background {
        "rain" => "The gentle rain outside creates the perfect atmosphere for our time together.",
        "forest" => "Imagine you're in a peaceful forest, surrounded by nature's gentle sounds.",
        "ocean" => "Let the distant sound of waves carry you to a place of complete tranquility.",
        "silence" => {
            "In this quiet space, we can focus entirely on these gentle sounds and your breathing."
        }
        "fireplace" => "The warm, crackling sounds create a cozy sanctuary just for you.",
        _ => return None,
    };
    Some(line)
}

const CLOSINGS: [&str; 4] = [
    "Take your time, breathe deeply, and let yourself fully relax.",
    "You're safe here, and you can stay as long as you need.",
    "Feel the peace settling over you like a warm, gentle blanket.",
    "Let go of everything else and just be present in this moment.",
];
