use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use fonema::config::{Options, PresentationMode};
use fonema::lexicon::Lexicon;
use fonema::narrator::{Narrator, NullNarrator};
use fonema::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use fonema::session::Session;
use fonema::trial::{Trial, TrialPhase};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn enter() -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

// Headless run of a whole written session via Runner/TestEventSource,
// without a TTY. Ticks come from the runner timeout, keys from the channel.
#[test]
fn headless_written_session_completes() {
    let options = Options {
        player_name: "Mario".to_string(),
        word_count: 2,
        list_repetitions: 2,
        presentation_ms: 500,
        writing_ms: 2000,
        ..Options::default()
    };
    let lexicon = Lexicon::load(options.category);
    let mut session = Session::new(options.clone());

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    while !session.is_complete() {
        let stimulus = lexicon.sample(options.word_count).unwrap();
        let mut trial = Trial::new(stimulus, &options);

        for _ in 0..1000u32 {
            if trial.phase() == TrialPhase::Writing {
                break;
            }
            if let AppEvent::Tick = runner.step() {
                trial.on_tick();
            }
        }
        assert_eq!(trial.phase(), TrialPhase::Writing);

        let answer = trial.expected().join(" ");
        for c in answer.chars() {
            tx.send(key(c)).unwrap();
        }
        tx.send(enter()).unwrap();

        for _ in 0..1000u32 {
            if trial.phase() == TrialPhase::Feedback {
                break;
            }
            match runner.step() {
                AppEvent::Key(key) => match key.code {
                    KeyCode::Char(c) => trial.write(c),
                    KeyCode::Enter => {
                        if let Some(result) = trial.submit() {
                            session.record_trial(result);
                        }
                    }
                    _ => {}
                },
                AppEvent::Tick => {
                    if let Some(result) = trial.on_tick() {
                        session.record_trial(result);
                    }
                }
                _ => {}
            }
        }
        assert_eq!(trial.phase(), TrialPhase::Feedback);
        assert_eq!(trial.was_correct(), Some(true));
    }

    assert_eq!(session.trials_done(), 2);
    assert_eq!(session.score(), 2);
    assert_eq!(session.percentage(), 100);
}

// Auditory variant: the narrator's completion events drive the
// presentation through the same channel the runner reads from.
#[test]
fn headless_auditory_session_completes() {
    let options = Options {
        player_name: "Mario".to_string(),
        presentation: PresentationMode::Uditiva,
        word_count: 2,
        list_repetitions: 1,
        writing_ms: 2000,
        ..Options::default()
    };
    let lexicon = Lexicon::load(options.category);
    let mut session = Session::new(options.clone());

    let (tx, rx) = mpsc::channel();
    let narrator = NullNarrator::new(tx.clone());
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    let stimulus = lexicon.sample(options.word_count).unwrap();
    let mut trial = Trial::new(stimulus, &options);
    trial.drive_narration(&narrator);

    for _ in 0..1000u32 {
        if trial.phase() == TrialPhase::Writing {
            break;
        }
        match runner.step() {
            AppEvent::Tick => {
                trial.on_tick();
            }
            AppEvent::SpeechDone(id) => trial.on_speech_done(id),
            _ => {}
        }
        trial.drive_narration(&narrator);
    }
    assert_eq!(trial.phase(), TrialPhase::Writing);

    let answer = trial.expected().join(" ");
    for c in answer.chars() {
        trial.write(c);
    }
    let result = trial.submit().expect("submission should resolve");
    assert!(result.correct);
    session.record_trial(result);

    // Spoken feedback: a correct answer is one reinforcement line, and its
    // completion id follows the two stimulus words.
    let lines = trial.feedback_narration();
    assert_eq!(lines.len(), 1);
    for line in &lines {
        narrator.speak(line);
    }
    match runner.step() {
        AppEvent::SpeechDone(id) => assert_eq!(id, 2),
        other => panic!("expected a narration completion, got {other:?}"),
    }

    assert!(session.is_complete());
    assert_eq!(session.percentage(), 100);
}

// Letting the countdown run out resolves the trial with whatever was typed.
#[test]
fn headless_timeout_scores_partial_input() {
    let options = Options {
        player_name: "Mario".to_string(),
        word_count: 1,
        list_repetitions: 1,
        presentation_ms: 500,
        writing_ms: 1000,
        ..Options::default()
    };
    let lexicon = Lexicon::load(options.category);
    let mut session = Session::new(options.clone());

    let stimulus = lexicon.sample(options.word_count).unwrap();
    let mut trial = Trial::new(stimulus, &options);

    for _ in 0..1000u32 {
        if trial.phase() == TrialPhase::Writing {
            break;
        }
        trial.on_tick();
    }
    trial.write('x');

    let mut resolved = None;
    for _ in 0..1000u32 {
        if let Some(result) = trial.on_tick() {
            resolved = Some(result);
            break;
        }
    }

    let result = resolved.expect("countdown should resolve the trial");
    assert!(!result.correct);
    assert_eq!(result.response, "x");
    session.record_trial(result);

    assert!(session.is_complete());
    assert_eq!(session.percentage(), 0);
}
