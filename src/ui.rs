use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use fonema::leaderboard::ScoreRecord;
use fonema::trial::TrialPhase;

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const NAME_COLUMN_WIDTH: usize = 18;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let dim_italic_style = Style::default()
            .patch(dim_style)
            .add_modifier(Modifier::ITALIC);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Length(1), Constraint::Min(1)].as_ref())
            .split(area);

        match self.screen {
            Screen::Task => {
                let header = Line::from(vec![
                    Span::styled(
                        format!(
                            "Lista {} / {}",
                            self.list_number(),
                            self.options.list_repetitions
                        ),
                        bold_style,
                    ),
                    Span::styled("   (esc) Indietro", dim_italic_style),
                ]);
                Paragraph::new(header).render(chunks[0], buf);

                let lines: Vec<Line> = match self.trial.phase() {
                    TrialPhase::Presenting => {
                        if self.options.presentation.is_auditory() {
                            vec![Line::from(Span::styled("Ascolta...", italic_style))]
                        } else {
                            match self.trial.displayed_word() {
                                Some(word) => {
                                    vec![Line::from(Span::styled(word, bold_style))]
                                }
                                None => vec![],
                            }
                        }
                    }
                    TrialPhase::Writing => {
                        let mut lines = vec![
                            Line::from(Span::styled("Riscrivi la sequenza:", bold_style)),
                            Line::from(""),
                            Line::from(vec![
                                Span::styled(self.trial.input.as_str(), bold_style),
                                Span::styled("█", dim_style),
                            ]),
                        ];
                        if self.trial.category().is_sentences() {
                            lines.push(Line::from(Span::styled(
                                "Per le frasi, separare con punto e virgola (;)",
                                dim_style,
                            )));
                        }
                        lines.push(Line::from(""));
                        lines.push(Line::from(Span::styled(
                            format!("Tempo rimanente: {}s", self.trial.seconds_remaining()),
                            dim_style,
                        )));
                        lines
                    }
                    TrialPhase::Feedback => {
                        let message_style = if self.trial.was_correct() == Some(true) {
                            green_bold_style
                        } else {
                            red_bold_style
                        };
                        let legend = if self.session.is_complete() {
                            "(invio) Vai ai Risultati"
                        } else {
                            "(invio) Prossima Lista"
                        };
                        vec![
                            Line::from(Span::styled(
                                self.trial.feedback_message().unwrap_or_default().to_string(),
                                message_style,
                            )),
                            Line::from(""),
                            Line::from(Span::styled(legend, italic_style)),
                        ]
                    }
                };

                render_centered(lines, chunks[1], buf);
            }
            Screen::Summary => {
                let mut lines = vec![
                    Line::from(Span::styled("Risultato Finale", bold_style)),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("Bravo, {}!", self.options.player_name),
                        magenta_style,
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!(
                            "{} / {}",
                            self.session.score(),
                            self.options.list_repetitions
                        ),
                        bold_style,
                    )),
                    Line::from(Span::styled(
                        format!("Punteggio: {}%", self.session.percentage()),
                        green_bold_style,
                    )),
                ];
                if let Some(note) = &self.note {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(note.clone(), dim_italic_style)));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "(r) Gioca Ancora  (s) Scarica CSV  (c) Classifica  (esc) Esci",
                    italic_style,
                )));

                render_centered(lines, chunks[1], buf);
            }
            Screen::Leaderboard => {
                let title = Paragraph::new(Span::styled("Classifica Globale", bold_style))
                    .alignment(Alignment::Center);
                title.render(chunks[0], buf);

                let body = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
                    .split(chunks[1]);

                match &self.leaderboard {
                    Some(Ok(rows)) if rows.is_empty() => {
                        let empty = Paragraph::new(Span::styled(
                            "Nessun punteggio ancora. Gioca per entrare in classifica!",
                            italic_style,
                        ))
                        .alignment(Alignment::Center)
                        .wrap(Wrap { trim: true });
                        empty.render(body[1], buf);
                    }
                    Some(Ok(rows)) => {
                        let lines: Vec<Line> = rows
                            .iter()
                            .enumerate()
                            .map(|(idx, record)| {
                                score_line(idx, record, bold_style, green_bold_style, dim_style)
                            })
                            .collect();
                        Paragraph::new(lines).render(body[1], buf);
                    }
                    Some(Err(message)) => {
                        let error = Paragraph::new(Span::styled(message.clone(), dim_italic_style))
                            .alignment(Alignment::Center)
                            .wrap(Wrap { trim: true });
                        error.render(body[1], buf);
                    }
                    None => {}
                }

                let legend = Paragraph::new(Span::styled("(esc) Indietro", italic_style));
                legend.render(body[2], buf);
            }
        }
    }
}

/// Renders the lines centered on both axes of the area.
fn render_centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = (lines.len() as u16).min(area.height);
    let pad = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn score_line<'a>(
    idx: usize,
    record: &'a ScoreRecord,
    bold_style: Style,
    green_bold_style: Style,
    dim_style: Style,
) -> Line<'a> {
    let settings = &record.settings;
    let details = format!(
        "{} · {} · {} parole",
        settings.activity_label(),
        settings.category,
        settings.word_count
    );

    Line::from(vec![
        Span::styled(format!("{:>2}. ", idx + 1), bold_style),
        Span::styled(pad_name(&record.name), bold_style),
        Span::styled(format!("{:>4}%", record.score), green_bold_style),
        Span::styled(format!("   {}", details), dim_style),
        Span::styled(format!("   {}", relative_date(&record.date)), dim_style),
    ])
}

/// Pads the name to a fixed column, counting display width rather than
/// bytes so accented names line up.
fn pad_name(name: &str) -> String {
    let width = name.width();
    if width >= NAME_COLUMN_WIDTH {
        return name.to_string();
    }
    format!("{}{}", name, " ".repeat(NAME_COLUMN_WIDTH - width))
}

fn relative_date(date: &DateTime<Local>) -> String {
    let secs = date.signed_duration_since(Local::now()).num_seconds();
    format!("{}", HumanTime::from(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fonema::config::{Options, PresentationMode};
    use fonema::leaderboard::{ScoreSettings, StoreError};
    use fonema::lexicon::WordCategory;
    use fonema::trial::Trial;

    fn test_options() -> Options {
        Options {
            player_name: "Mario".to_string(),
            word_count: 1,
            list_repetitions: 2,
            presentation_ms: 500,
            writing_ms: 5000,
            ..Options::default()
        }
    }

    fn create_test_app(options: Options) -> App {
        let mut app = App::new(options, Err(StoreError::NotConfigured)).unwrap();
        app.persist = false;
        app
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn task_screen_shows_list_header_and_presented_word() {
        let mut app = create_test_app(test_options());
        app.trial = Trial::new(vec!["casa".to_string()], &app.options);
        for _ in 0..5 {
            app.trial.on_tick();
        }

        let output = rendered(&app, 80, 24);
        assert!(output.contains("Lista 1 / 2"));
        assert!(output.contains("CASA"));
        assert!(output.contains("Indietro"));
    }

    #[test]
    fn auditory_presentation_shows_listening_prompt() {
        let mut options = test_options();
        options.presentation = PresentationMode::Uditiva;
        let app = create_test_app(options);

        let output = rendered(&app, 80, 24);
        assert!(output.contains("Ascolta..."));
    }

    #[test]
    fn writing_screen_shows_prompt_input_and_countdown() {
        let mut app = create_test_app(test_options());
        app.trial = Trial::new(vec!["casa".to_string()], &app.options);
        for _ in 0..10 {
            app.trial.on_tick();
        }
        assert_eq!(app.trial.phase(), TrialPhase::Writing);
        for c in "cas".chars() {
            app.trial.write(c);
        }

        let output = rendered(&app, 80, 24);
        assert!(output.contains("Riscrivi la sequenza:"));
        assert!(output.contains("cas"));
        assert!(output.contains("Tempo rimanente: 5s"));
        assert!(!output.contains("punto e virgola"));
    }

    #[test]
    fn sentence_writing_screen_shows_separator_hint() {
        let mut options = test_options();
        options.category = WordCategory::Frasi;
        let mut app = create_test_app(options);
        for _ in 0..10 {
            app.trial.on_tick();
        }
        assert_eq!(app.trial.phase(), TrialPhase::Writing);

        let output = rendered(&app, 100, 24);
        assert!(output.contains("Per le frasi, separare con punto e virgola (;)"));
    }

    #[test]
    fn feedback_screen_shows_message_and_advance_hint() {
        let mut app = create_test_app(test_options());
        app.trial = Trial::new(vec!["casa".to_string()], &app.options);
        for _ in 0..10 {
            app.trial.on_tick();
        }
        for c in "casa".chars() {
            app.trial.write(c);
        }
        let result = app.trial.submit().unwrap();
        app.session.record_trial(result);

        let output = rendered(&app, 80, 24);
        assert!(output.contains("(invio) Prossima Lista"));
    }

    #[test]
    fn final_feedback_points_to_the_results() {
        let mut app = create_test_app(test_options());
        for word in ["casa", "topo"] {
            app.trial = Trial::new(vec![word.to_string()], &app.options);
            for _ in 0..10 {
                app.trial.on_tick();
            }
            let result = app.trial.submit().unwrap();
            app.session.record_trial(result);
        }

        let output = rendered(&app, 80, 24);
        assert!(output.contains("(invio) Vai ai Risultati"));
    }

    #[test]
    fn summary_screen_shows_final_score() {
        let mut app = create_test_app(test_options());
        app.screen = Screen::Summary;

        let output = rendered(&app, 80, 24);
        assert!(output.contains("Risultato Finale"));
        assert!(output.contains("Bravo, Mario!"));
        assert!(output.contains("Punteggio: 0%"));
        assert!(output.contains("(r) Gioca Ancora"));
    }

    #[test]
    fn empty_leaderboard_shows_invitation() {
        let mut app = create_test_app(test_options());
        app.screen = Screen::Leaderboard;
        app.leaderboard = Some(Ok(vec![]));

        let output = rendered(&app, 80, 24);
        assert!(output.contains("Classifica Globale"));
        assert!(output.contains("Nessun punteggio ancora."));
    }

    #[test]
    fn leaderboard_rows_show_player_and_score() {
        let mut app = create_test_app(test_options());
        let record = ScoreRecord {
            name: "Anna".to_string(),
            score: 87,
            date: Local::now(),
            settings: ScoreSettings::from(&app.options),
        };
        app.screen = Screen::Leaderboard;
        app.leaderboard = Some(Ok(vec![record]));

        let output = rendered(&app, 120, 24);
        assert!(output.contains(" 1. Anna"));
        assert!(output.contains("87%"));
        assert!(output.contains("Recupero Diretto"));
        assert!(output.contains("Bisillabi"));
        assert!(output.contains("1 parole"));
    }

    #[test]
    fn leaderboard_error_is_shown_verbatim() {
        let mut app = create_test_app(test_options());
        app.screen = Screen::Leaderboard;
        app.leaderboard = Some(Err(
            "La classifica globale non è configurata per questa versione dell'app.".to_string(),
        ));

        let output = rendered(&app, 100, 24);
        assert!(output.contains("non è configurata"));
    }

    #[test]
    fn renders_in_small_areas_without_panicking() {
        let mut app = create_test_app(test_options());
        for screen in [Screen::Task, Screen::Summary, Screen::Leaderboard] {
            app.screen = screen;
            let area = Rect::new(0, 0, 20, 6);
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert_eq!(*buffer.area(), area);
        }
    }

    #[test]
    fn pad_name_counts_display_width() {
        assert_eq!(pad_name("Niccolò").width(), NAME_COLUMN_WIDTH);
        assert_eq!(pad_name("Anna").len(), 4 + NAME_COLUMN_WIDTH - 4);
        let long = "Un Nome Davvero Molto Lungo";
        assert_eq!(pad_name(long), long);
    }
}
