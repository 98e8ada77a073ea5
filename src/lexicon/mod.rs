pub mod core;

pub use core::Bank;

use clap::ValueEnum;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of material a session draws its stimulus lists from.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum WordCategory {
    Bisillabi,
    Trisillabi,
    Quadrisillabi,
    Pentasillabi,
    Frasi,
    Mista,
}

impl WordCategory {
    /// Sentence material is typed with `;` between items instead of spaces.
    pub fn is_sentences(&self) -> bool {
        matches!(self, WordCategory::Frasi)
    }

    /// Stable tag used in the config file and the score store.
    pub fn tag(&self) -> &'static str {
        match self {
            WordCategory::Bisillabi => "bisillabi",
            WordCategory::Trisillabi => "trisillabi",
            WordCategory::Quadrisillabi => "quadrisillabi",
            WordCategory::Pentasillabi => "pentasillabi",
            WordCategory::Frasi => "frasi",
            WordCategory::Mista => "mista",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bisillabi" => Some(WordCategory::Bisillabi),
            "trisillabi" => Some(WordCategory::Trisillabi),
            "quadrisillabi" => Some(WordCategory::Quadrisillabi),
            "pentasillabi" => Some(WordCategory::Pentasillabi),
            "frasi" => Some(WordCategory::Frasi),
            "mista" => Some(WordCategory::Mista),
            _ => None,
        }
    }

    fn bank_files(&self) -> &'static [&'static str] {
        match self {
            WordCategory::Bisillabi => &["bisillabi.json"],
            WordCategory::Trisillabi => &["trisillabi.json"],
            WordCategory::Quadrisillabi => &["quadrisillabi.json"],
            WordCategory::Pentasillabi => &["pentasillabi.json"],
            WordCategory::Frasi => &["frasi.json"],
            // Mixed material pools every word bank; sentences stay out
            // because the response format differs.
            WordCategory::Mista => &[
                "bisillabi.json",
                "trisillabi.json",
                "quadrisillabi.json",
                "pentasillabi.json",
            ],
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("the {category} bank holds {available} entries, {requested} requested")]
    NotEnoughWords {
        category: WordCategory,
        requested: usize,
        available: usize,
    },
}

/// The pool of candidate words (or sentences) for one category, loaded from
/// the embedded banks.
#[derive(Clone, Debug)]
pub struct Lexicon {
    category: WordCategory,
    words: Vec<String>,
}

impl Lexicon {
    pub fn load(category: WordCategory) -> Self {
        let words = category
            .bank_files()
            .iter()
            .flat_map(|file| core::read_bank(file).words)
            .collect();

        Self { category, words }
    }

    pub fn category(&self) -> WordCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Draw `count` distinct entries uniformly at random; the order of draw
    /// is the list order. Over-asking is a configuration error surfaced
    /// here, not a panic.
    pub fn sample(&self, count: usize) -> Result<Vec<String>, LexiconError> {
        if count > self.words.len() {
            return Err(LexiconError::NotEnoughWords {
                category: self.category,
                requested: count,
                available: self.words.len(),
            });
        }

        let mut rng = rand::thread_rng();
        let picked = index::sample(&mut rng, self.words.len(), count);

        Ok(picked.iter().map(|i| self.words[i].clone()).collect())
    }
}
