use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use crate::runtime::{AppEvent, SpeechId};

/// Command line used to voice Italian text. `espeak-ng` ships with most
/// distributions and exits quickly when a word has been spoken.
const TTS_PROGRAM: &str = "espeak-ng";
const TTS_ARGS: [&str; 4] = ["-v", "it", "-s", "155"];

/// Speaks text out loud for the auditory presentation mode.
///
/// `speak` only enqueues; texts are voiced strictly in the order they were
/// queued. Every queued text is answered with exactly one
/// `AppEvent::SpeechDone` carrying the returned id, whether or not narration
/// actually worked.
pub trait Narrator: Send {
    fn speak(&self, text: &str) -> SpeechId;
}

/// Narrator backed by an external text-to-speech command.
pub struct CommandNarrator {
    queue: Sender<(SpeechId, String)>,
    next_id: Arc<AtomicU64>,
}

impl CommandNarrator {
    pub fn spawn(events: Sender<AppEvent>) -> Self {
        Self::with_program(events, TTS_PROGRAM)
    }

    pub fn with_program(events: Sender<AppEvent>, program: &str) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel::<(SpeechId, String)>();
        let program = program.to_string();
        thread::spawn(move || {
            for (id, text) in queue_rx {
                // A missing or failing TTS binary must never hold up the
                // drill, so the exit status is ignored.
                let _ = Command::new(&program)
                    .args(TTS_ARGS)
                    .arg(&text)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
                if events.send(AppEvent::SpeechDone(id)).is_err() {
                    break;
                }
            }
        });
        Self {
            queue: queue_tx,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Narrator for CommandNarrator {
    fn speak(&self, text: &str) -> SpeechId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.queue.send((id, text.to_string()));
        id
    }
}

/// Narrator that voices nothing and completes immediately. Used for the
/// written presentation mode and in tests.
pub struct NullNarrator {
    events: Sender<AppEvent>,
    next_id: AtomicU64,
}

impl NullNarrator {
    pub fn new(events: Sender<AppEvent>) -> Self {
        Self {
            events,
            next_id: AtomicU64::new(0),
        }
    }
}

impl Narrator for NullNarrator {
    fn speak(&self, _text: &str) -> SpeechId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.events.send(AppEvent::SpeechDone(id));
        id
    }
}
