use std::time::SystemTime;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::config::{Options, PresentationMode};
use crate::lexicon::WordCategory;
use crate::narrator::Narrator;
use crate::runtime::SpeechId;
use crate::session::TrialResult;
use crate::transform::expected_sequence;
use crate::verify::{verify, Verdict};
use crate::TICK_RATE_MS;

/// Pause between spoken words in the auditory presentation mode.
const SPEECH_GAP_MS: u64 = 500;

const REINFORCEMENTS: [&str; 9] = [
    "Eccellente!",
    "Fantastico!",
    "Ottimo lavoro!",
    "Perfetto!",
    "Continua così!",
    "Grande!",
    "Molto bene!",
    "Incredibile!",
    "Sei un campione!",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialPhase {
    Presenting,
    Writing,
    Feedback,
}

/// One stimulus list worked from presentation to feedback.
///
/// The trial is driven from outside: the runner feeds it ticks, key input
/// and narration completions, and collects the `TrialResult` that `submit`
/// (or a writing timeout) hands back. A trial resolves at most once; after
/// that it only serves the feedback screen.
pub struct Trial {
    stimulus: Vec<String>,
    expected: Vec<String>,
    category: WordCategory,
    presentation: PresentationMode,
    presentation_ms: u64,
    writing_ms: u64,

    phase: TrialPhase,

    // written presentation
    shown: Option<usize>,
    slot_elapsed_ms: u64,

    // auditory presentation
    next_to_speak: usize,
    awaiting_speech: Option<SpeechId>,
    gap_remaining_ms: Option<u64>,

    pub input: String,
    writing_elapsed_ms: u64,
    writing_started_at: Option<SystemTime>,

    verdict: Option<Verdict>,
    feedback: Option<String>,
}

impl Trial {
    pub fn new(stimulus: Vec<String>, options: &Options) -> Self {
        let expected = expected_sequence(&stimulus, options.mode());
        let mut trial = Self {
            stimulus,
            expected,
            category: options.category,
            presentation: options.presentation,
            presentation_ms: options.presentation_ms,
            writing_ms: options.writing_ms,
            phase: TrialPhase::Presenting,
            shown: None,
            slot_elapsed_ms: 0,
            next_to_speak: 0,
            awaiting_speech: None,
            gap_remaining_ms: None,
            input: String::new(),
            writing_elapsed_ms: 0,
            writing_started_at: None,
            verdict: None,
            feedback: None,
        };
        // An empty list has nothing to present in either mode.
        if trial.stimulus.is_empty() {
            trial.start_writing();
        }
        trial
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn category(&self) -> WordCategory {
        self.category
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Word currently flashed on screen, already uppercased. `None` while
    /// the blank gap before the first word runs, and always `None` in the
    /// auditory mode.
    pub fn displayed_word(&self) -> Option<String> {
        if self.phase != TrialPhase::Presenting || self.presentation.is_auditory() {
            return None;
        }
        self.shown.map(|idx| self.stimulus[idx].to_uppercase())
    }

    /// Whole seconds left on the writing countdown, rounded up.
    pub fn seconds_remaining(&self) -> u64 {
        let left = self.writing_ms.saturating_sub(self.writing_elapsed_ms);
        (left + 999) / 1000
    }

    pub fn feedback_message(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn was_correct(&self) -> Option<bool> {
        self.verdict.as_ref().map(|verdict| verdict.is_correct)
    }

    /// Advances the clock by one tick. Returns a result exactly when this
    /// tick ran the writing countdown out and the trial auto-resolved.
    pub fn on_tick(&mut self) -> Option<TrialResult> {
        match self.phase {
            TrialPhase::Presenting => {
                self.tick_presentation();
                None
            }
            TrialPhase::Writing => {
                self.writing_elapsed_ms += TICK_RATE_MS;
                if self.writing_elapsed_ms >= self.writing_ms {
                    self.submit()
                } else {
                    None
                }
            }
            TrialPhase::Feedback => None,
        }
    }

    fn tick_presentation(&mut self) {
        match self.presentation {
            PresentationMode::Scritta => {
                self.slot_elapsed_ms += TICK_RATE_MS;
                if self.slot_elapsed_ms >= self.presentation_ms {
                    self.slot_elapsed_ms = 0;
                    match self.shown {
                        None => self.shown = Some(0),
                        Some(idx) if idx + 1 < self.stimulus.len() => self.shown = Some(idx + 1),
                        Some(_) => {
                            self.shown = None;
                            self.start_writing();
                        }
                    }
                }
            }
            PresentationMode::Uditiva => {
                if let Some(gap) = self.gap_remaining_ms {
                    let remaining = gap.saturating_sub(TICK_RATE_MS);
                    if remaining == 0 {
                        self.gap_remaining_ms = None;
                        if self.next_to_speak >= self.stimulus.len() {
                            self.start_writing();
                        }
                    } else {
                        self.gap_remaining_ms = Some(remaining);
                    }
                }
            }
        }
    }

    /// Queues the next word on the narrator when one is due. Call after
    /// every handled event; it does nothing outside the auditory
    /// presentation phase or while a word is still being spoken.
    pub fn drive_narration(&mut self, narrator: &dyn Narrator) {
        if self.phase != TrialPhase::Presenting || !self.presentation.is_auditory() {
            return;
        }
        if self.awaiting_speech.is_some() || self.gap_remaining_ms.is_some() {
            return;
        }
        if self.next_to_speak < self.stimulus.len() {
            let id = narrator.speak(&self.stimulus[self.next_to_speak]);
            self.awaiting_speech = Some(id);
        }
    }

    /// Completion ids from older utterances (for example the previous
    /// trial's feedback) do not match and are ignored.
    pub fn on_speech_done(&mut self, id: SpeechId) {
        if self.awaiting_speech == Some(id) {
            self.awaiting_speech = None;
            self.next_to_speak += 1;
            self.gap_remaining_ms = Some(SPEECH_GAP_MS);
        }
    }

    pub fn write(&mut self, c: char) {
        if self.phase == TrialPhase::Writing {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.phase == TrialPhase::Writing {
            self.input.pop();
        }
    }

    /// Scores the response and moves to feedback. Returns `None` when the
    /// trial is not in the writing phase, so a result can never be recorded
    /// twice.
    pub fn submit(&mut self) -> Option<TrialResult> {
        if self.phase != TrialPhase::Writing {
            return None;
        }
        let verdict = verify(&self.expected, &self.input, self.category);
        let time_used_secs = self
            .writing_started_at
            .and_then(|started| started.elapsed().ok())
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();
        let result = TrialResult {
            stimulus: self.stimulus.join(" "),
            response: self.input.clone(),
            correct: verdict.is_correct,
            time_used_secs,
        };
        self.feedback = Some(if verdict.is_correct {
            positive_reinforcement()
        } else {
            format!(
                "Sbagliato! La sequenza corretta era: {}",
                self.expected.join(" ")
            )
        });
        self.verdict = Some(verdict);
        self.phase = TrialPhase::Feedback;
        Some(result)
    }

    /// Lines to voice on the feedback screen in the auditory mode. A wrong
    /// answer is corrected out loud, word by word.
    pub fn feedback_narration(&self) -> Vec<String> {
        match (&self.verdict, &self.feedback) {
            (Some(verdict), Some(message)) if verdict.is_correct => vec![message.clone()],
            (Some(_), Some(_)) => vec![
                "Non esattamente. La risposta corretta era...".to_string(),
                self.expected.join(", "),
            ],
            _ => Vec::new(),
        }
    }

    fn start_writing(&mut self) {
        self.phase = TrialPhase::Writing;
        self.writing_started_at = Some(SystemTime::now());
    }
}

fn positive_reinforcement() -> String {
    REINFORCEMENTS
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("Molto bene!")
        .to_string()
}
