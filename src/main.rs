mod ui;

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::Path,
    time::Duration,
};

use fonema::{
    config::{FileOptionsStore, Options, OptionsStore, PresentationMode},
    leaderboard::{
        ScoreRecord, ScoreSettings, ScoreStore, SqliteScoreStore, StoreError, TOP_SCORES_LIMIT,
    },
    lexicon::{Lexicon, LexiconError, WordCategory},
    narrator::{CommandNarrator, Narrator, NullNarrator},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{Session, TrialResult},
    transform::{Direction, LetterTransform},
    trial::{Trial, TrialPhase},
    TICK_RATE_MS,
};

/// interactive metaphonological training drill in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An interactive metaphonological training drill: word lists are flashed on screen or spoken aloud, mentally transformed and typed back from memory. Flags override the options saved by the previous run; scores go to a local leaderboard."
)]
pub struct Cli {
    /// player name shown in results and on the leaderboard
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// recall order of each list
    #[clap(short = 'd', long, value_enum)]
    direction: Option<Direction>,

    /// letter transform applied to every word before recall
    #[clap(short = 't', long, value_enum)]
    transform: Option<LetterTransform>,

    /// how the stimulus list is presented
    #[clap(short = 'p', long, value_enum)]
    presentation: Option<PresentationMode>,

    /// number of words per list
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// word category to draw lists from
    #[clap(short = 'c', long, value_enum)]
    category: Option<WordCategory>,

    /// number of lists in one session
    #[clap(short = 'r', long)]
    repetitions: Option<usize>,

    /// milliseconds each word stays on screen
    #[clap(long)]
    presentation_time: Option<u64>,

    /// milliseconds allowed for writing the response
    #[clap(long)]
    writing_time: Option<u64>,

    /// show the leaderboard instead of starting a session
    #[clap(short = 'l', long)]
    leaderboard: bool,
}

impl Cli {
    /// Overlay the given flags on the saved options.
    fn apply_to(&self, mut options: Options) -> Options {
        if let Some(name) = &self.name {
            options.player_name = name.clone();
        }
        if let Some(direction) = self.direction {
            options.direction = direction;
        }
        if let Some(transform) = self.transform {
            options.letters = transform;
        }
        if let Some(presentation) = self.presentation {
            options.presentation = presentation;
        }
        if let Some(words) = self.words {
            options.word_count = words;
        }
        if let Some(category) = self.category {
            options.category = category;
        }
        if let Some(repetitions) = self.repetitions {
            options.list_repetitions = repetitions;
        }
        if let Some(ms) = self.presentation_time {
            options.presentation_ms = ms;
        }
        if let Some(ms) = self.writing_time {
            options.writing_ms = ms;
        }
        options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Task,
    Summary,
    Leaderboard,
}

pub struct App {
    pub options: Options,
    pub lexicon: Lexicon,
    pub session: Session,
    pub trial: Trial,
    pub screen: Screen,
    /// Loaded when the leaderboard screen opens; errors arrive pre-rendered.
    pub leaderboard: Option<Result<Vec<ScoreRecord>, String>>,
    /// One-line status shown on the summary screen.
    pub note: Option<String>,
    pub store: Result<Box<dyn ScoreStore>, StoreError>,
    /// Unset in tests so completed sessions do not touch the user's files.
    pub persist: bool,
    pub standalone_leaderboard: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        options: Options,
        store: Result<Box<dyn ScoreStore>, StoreError>,
    ) -> Result<Self, LexiconError> {
        let lexicon = Lexicon::load(options.category);
        let stimulus = lexicon.sample(options.word_count)?;
        Ok(Self::assemble(options, store, lexicon, stimulus))
    }

    /// Opens straight onto the leaderboard. No list is sampled, so the
    /// saved drill options do not have to be playable.
    pub fn leaderboard_only(
        options: Options,
        store: Result<Box<dyn ScoreStore>, StoreError>,
    ) -> Self {
        let lexicon = Lexicon::load(options.category);
        let mut app = Self::assemble(options, store, lexicon, Vec::new());
        app.standalone_leaderboard = true;
        app.open_leaderboard();
        app
    }

    fn assemble(
        options: Options,
        store: Result<Box<dyn ScoreStore>, StoreError>,
        lexicon: Lexicon,
        stimulus: Vec<String>,
    ) -> Self {
        let trial = Trial::new(stimulus, &options);
        Self {
            session: Session::new(options.clone()),
            options,
            lexicon,
            trial,
            screen: Screen::Task,
            leaderboard: None,
            note: None,
            store,
            persist: true,
            standalone_leaderboard: false,
            should_quit: false,
        }
    }

    /// Number of the list currently on screen, starting at 1.
    pub fn list_number(&self) -> usize {
        match self.trial.phase() {
            TrialPhase::Feedback => self.session.trials_done().max(1),
            _ => self.session.trials_done() + 1,
        }
    }

    pub fn on_tick(&mut self, narrator: &dyn Narrator) {
        if self.screen == Screen::Task {
            if let Some(result) = self.trial.on_tick() {
                self.finish_trial(result, narrator);
            }
            self.trial.drive_narration(narrator);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, narrator: &dyn Narrator) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Task => self.on_task_key(key, narrator),
            Screen::Summary => self.on_summary_key(key),
            Screen::Leaderboard => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    if self.standalone_leaderboard {
                        self.should_quit = true;
                    } else {
                        self.screen = Screen::Summary;
                    }
                }
            }
        }
    }

    fn on_task_key(&mut self, key: KeyEvent, narrator: &dyn Narrator) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => match self.trial.phase() {
                TrialPhase::Writing => {
                    if let Some(result) = self.trial.submit() {
                        self.finish_trial(result, narrator);
                    }
                }
                TrialPhase::Feedback => self.advance(),
                TrialPhase::Presenting => {}
            },
            KeyCode::Backspace => self.trial.backspace(),
            KeyCode::Char(c) => self.trial.write(c),
            _ => {}
        }
    }

    fn on_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('c') => self.open_leaderboard(),
            KeyCode::Char('s') => self.export_csv(),
            _ => {}
        }
    }

    fn finish_trial(&mut self, result: TrialResult, narrator: &dyn Narrator) {
        self.session.record_trial(result);
        if self.options.presentation.is_auditory() {
            for line in self.trial.feedback_narration() {
                narrator.speak(&line);
            }
        }
    }

    fn advance(&mut self) {
        if self.session.is_complete() {
            self.enter_summary();
        } else {
            self.next_trial();
        }
    }

    // word_count is validated against the bank before a session starts
    fn next_trial(&mut self) {
        match self.lexicon.sample(self.options.word_count) {
            Ok(stimulus) => self.trial = Trial::new(stimulus, &self.options),
            Err(err) => {
                self.note = Some(err.to_string());
                self.should_quit = true;
            }
        }
    }

    fn restart(&mut self) {
        self.session = Session::new(self.options.clone());
        self.note = None;
        self.next_trial();
        if !self.should_quit {
            self.screen = Screen::Task;
        }
    }

    fn enter_summary(&mut self) {
        if self.persist {
            let _ = self.session.save_results();
        }

        let record = ScoreRecord {
            name: self.options.player_name.clone(),
            score: self.session.percentage(),
            date: Local::now(),
            settings: ScoreSettings::from(&self.options),
        };
        // A missing store and a failing one read differently on screen.
        let failure = match &self.store {
            Ok(store) => store.append(&record).err().map(|err| save_error_message(&err)),
            Err(err) => Some(save_error_message(err)),
        };
        if let Some(message) = failure {
            self.note = Some(message);
        }

        self.screen = Screen::Summary;
    }

    fn open_leaderboard(&mut self) {
        let rows = match &self.store {
            Ok(store) => store
                .top_scores(TOP_SCORES_LIMIT)
                .map_err(|err| load_error_message(&err)),
            Err(err) => Err(load_error_message(err)),
        };
        self.leaderboard = Some(rows);
        self.screen = Screen::Leaderboard;
    }

    fn export_csv(&mut self) {
        match self.session.export_results(Path::new(".")) {
            Ok(path) => self.note = Some(format!("CSV salvato: {}", path.display())),
            Err(err) => self.note = Some(format!("Esportazione fallita: {err}")),
        }
    }
}

fn load_error_message(err: &StoreError) -> String {
    match err {
        StoreError::NotConfigured => {
            "La classifica globale non è configurata per questa versione dell'app.".to_string()
        }
        StoreError::Sqlite(_) => "Impossibile caricare la classifica. Riprova più tardi.".to_string(),
    }
}

fn save_error_message(err: &StoreError) -> String {
    match err {
        StoreError::NotConfigured => {
            "Impossibile salvare il punteggio: classifica non configurata.".to_string()
        }
        StoreError::Sqlite(_) => "Impossibile salvare il punteggio. Riprova più tardi.".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let options_store = FileOptionsStore::new();
    let options = cli.apply_to(options_store.load());
    let store = SqliteScoreStore::open_default().map(|s| Box::new(s) as Box<dyn ScoreStore>);

    let mut app = if cli.leaderboard {
        App::leaderboard_only(options, store)
    } else {
        if let Err(err) = options.validate() {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err.to_string()).exit();
        }
        let _ = options_store.save(&options);
        App::new(options, store)?
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_source = CrosstermEventSource::new();
    let narrator: Box<dyn Narrator> = if app.options.presentation.is_auditory() {
        Box::new(CommandNarrator::spawn(event_source.sender()))
    } else {
        Box::new(NullNarrator::new(event_source.sender()))
    };
    let runner = Runner::new(
        event_source,
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let result = start_tui(&mut terminal, &mut app, &runner, narrator.as_ref());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
    narrator: &dyn Narrator,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(narrator),
            AppEvent::Key(key) => app.on_key(key, narrator),
            AppEvent::Resize => {}
            AppEvent::SpeechDone(id) => app.trial.on_speech_done(id),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
