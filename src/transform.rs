use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Vowels recognized by the edge-swap transform: plain Latin plus the
/// accented vowels that occur in the Italian word banks.
const VOWELS: [char; 11] = ['a', 'e', 'i', 'o', 'u', 'à', 'è', 'é', 'ì', 'ò', 'ù'];

/// Recall order of the word list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[strum(serialize = "Diretto")]
    Direct,
    #[strum(serialize = "Inverso")]
    Inverse,
}

/// Per-word letter manipulation applied before recall.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "kebab-case")]
pub enum LetterTransform {
    #[strum(serialize = "Recupero")]
    Identity,
    #[strum(serialize = "Parole Contrarie")]
    ReverseLetters,
    #[strum(serialize = "Inversione Vocali")]
    SwapEdgeVowels,
}

/// One of the six activity variants, expressed as two independent axes
/// rather than a flat six-way enum so each axis can be tested on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMode {
    pub direction: Direction,
    pub letters: LetterTransform,
}

impl ActivityMode {
    pub fn new(direction: Direction, letters: LetterTransform) -> Self {
        Self { direction, letters }
    }

    /// Short Italian label shown in the leaderboard and summary screens.
    pub fn label(&self) -> String {
        match self.letters {
            LetterTransform::Identity => format!("Recupero {}", self.direction),
            other => format!("{} {}", self.direction, other),
        }
    }
}

impl Direction {
    /// Stable tag used in the config file and the score store.
    pub fn tag(&self) -> &'static str {
        match self {
            Direction::Direct => "direct",
            Direction::Inverse => "inverse",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "direct" => Some(Direction::Direct),
            "inverse" => Some(Direction::Inverse),
            _ => None,
        }
    }
}

impl LetterTransform {
    /// Stable tag used in the config file and the score store.
    pub fn tag(&self) -> &'static str {
        match self {
            LetterTransform::Identity => "identity",
            LetterTransform::ReverseLetters => "reverse-letters",
            LetterTransform::SwapEdgeVowels => "swap-edge-vowels",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "identity" => Some(LetterTransform::Identity),
            "reverse-letters" => Some(LetterTransform::ReverseLetters),
            "swap-edge-vowels" => Some(LetterTransform::SwapEdgeVowels),
            _ => None,
        }
    }

    /// Apply this transform to a single word.
    pub fn apply(&self, word: &str) -> String {
        match self {
            LetterTransform::Identity => word.to_string(),
            LetterTransform::ReverseLetters => reverse_letters(word),
            LetterTransform::SwapEdgeVowels => swap_edge_vowels(word),
        }
    }
}

fn is_vowel(c: char) -> bool {
    let lower = c.to_lowercase().next().unwrap_or(c);
    VOWELS.contains(&lower)
}

/// Reverse the character sequence of a word. Grapheme-naive on purpose: the
/// word banks use ASCII plus precomposed accented Latin, one char per letter.
pub fn reverse_letters(word: &str) -> String {
    word.chars().rev().collect()
}

/// Swap the first and last vowel occurrences of a word in place.
///
/// Words with fewer than two vowel occurrences come back unchanged; that is
/// the defined degenerate case, not an error. Interior vowels stay put, and
/// the swapped characters keep whatever case they had.
pub fn swap_edge_vowels(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    let vowel_positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| is_vowel(**c))
        .map(|(i, _)| i)
        .collect();

    if vowel_positions.len() < 2 {
        return word.to_string();
    }

    let first = vowel_positions[0];
    let last = vowel_positions[vowel_positions.len() - 1];
    chars.swap(first, last);
    chars.into_iter().collect()
}

/// Compute the canonical expected answer for a stimulus list under a mode:
/// letter transform per word, then the direction step over the sequence.
pub fn expected_sequence(stimulus: &[String], mode: ActivityMode) -> Vec<String> {
    let mut words: Vec<String> = stimulus.iter().map(|w| mode.letters.apply(w)).collect();

    if mode.direction == Direction::Inverse {
        words.reverse();
    }

    words
}
