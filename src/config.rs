use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::lexicon::{Lexicon, LexiconError, WordCategory};
use crate::transform::{ActivityMode, Direction, LetterTransform};

pub const WORD_COUNT_RANGE: RangeInclusive<usize> = 1..=10;
pub const LIST_REPETITIONS_RANGE: RangeInclusive<usize> = 1..=20;
pub const MIN_PRESENTATION_MS: u64 = 500;
pub const MIN_WRITING_MS: u64 = 1000;

/// How the stimulus list reaches the learner: on screen or spoken.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    Scritta,
    Uditiva,
}

impl PresentationMode {
    /// Stable tag used in the config file and the score store.
    pub fn tag(&self) -> &'static str {
        match self {
            PresentationMode::Scritta => "scritta",
            PresentationMode::Uditiva => "uditiva",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "scritta" => Some(PresentationMode::Scritta),
            "uditiva" => Some(PresentationMode::Uditiva),
            _ => None,
        }
    }

    pub fn is_auditory(&self) -> bool {
        matches!(self, PresentationMode::Uditiva)
    }
}

/// Everything one session is parameterized by. Saved between runs so the
/// next invocation starts from the last used settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Options {
    pub player_name: String,
    pub direction: Direction,
    pub letters: LetterTransform,
    pub presentation: PresentationMode,
    pub word_count: usize,
    pub category: WordCategory,
    pub list_repetitions: usize,
    pub presentation_ms: u64,
    pub writing_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            direction: Direction::Direct,
            letters: LetterTransform::Identity,
            presentation: PresentationMode::Scritta,
            word_count: 5,
            category: WordCategory::Bisillabi,
            list_repetitions: 3,
            presentation_ms: 2000,
            writing_ms: 5000,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("player name must not be empty")]
    MissingName,
    #[error("word count must be between 1 and 10, got {0}")]
    WordCount(usize),
    #[error("list repetitions must be between 1 and 20, got {0}")]
    ListRepetitions(usize),
    #[error("presentation time must be at least 500 ms, got {0}")]
    PresentationTime(u64),
    #[error("writing time must be at least 1000 ms, got {0}")]
    WritingTime(u64),
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

impl Options {
    pub fn mode(&self) -> ActivityMode {
        ActivityMode::new(self.direction, self.letters)
    }

    /// Catch bad settings before a session starts; nothing here may fail
    /// mid-trial.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.player_name.trim().is_empty() {
            return Err(OptionsError::MissingName);
        }
        if !WORD_COUNT_RANGE.contains(&self.word_count) {
            return Err(OptionsError::WordCount(self.word_count));
        }
        if !LIST_REPETITIONS_RANGE.contains(&self.list_repetitions) {
            return Err(OptionsError::ListRepetitions(self.list_repetitions));
        }
        if self.presentation_ms < MIN_PRESENTATION_MS {
            return Err(OptionsError::PresentationTime(self.presentation_ms));
        }
        if self.writing_ms < MIN_WRITING_MS {
            return Err(OptionsError::WritingTime(self.writing_ms));
        }

        let available = Lexicon::load(self.category).len();
        if self.word_count > available {
            return Err(OptionsError::Lexicon(LexiconError::NotEnoughWords {
                category: self.category,
                requested: self.word_count,
                available,
            }));
        }

        Ok(())
    }
}

pub trait OptionsStore {
    fn load(&self) -> Options;
    fn save(&self, options: &Options) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileOptionsStore {
    path: PathBuf,
}

impl FileOptionsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "fonema") {
            pd.config_dir().join("options.json")
        } else {
            PathBuf::from("fonema_options.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileOptionsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsStore for FileOptionsStore {
    fn load(&self) -> Options {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(options) = serde_json::from_slice::<Options>(&bytes) {
                return options;
            }
        }
        Options::default()
    }

    fn save(&self, options: &Options) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(options).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
