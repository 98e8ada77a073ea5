use chrono::Local;
use directories::ProjectDirs;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Options;

/// Outcome of one resolved trial, as it ends up in the results export.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub stimulus: String,
    pub response: String,
    pub correct: bool,
    pub time_used_secs: f64,
}

/// One run of trials under a fixed set of options.
///
/// The session is the single owner of its results; `record_trial` is the
/// only mutation and the score is always recomputed from the results, so
/// the two can never drift apart.
#[derive(Debug, Clone)]
pub struct Session {
    options: Options,
    results: Vec<TrialResult>,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            results: Vec::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn record_trial(&mut self, result: TrialResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn trials_done(&self) -> usize {
        self.results.len()
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.options.list_repetitions
    }

    /// Number of correct trials, derived from the recorded results.
    pub fn score(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }

    /// Score over configured repetitions, rounded to a whole percentage.
    pub fn percentage(&self) -> u8 {
        let ratio = self.score() as f64 / self.options.list_repetitions as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn write_results_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["Stimulus", "Response", "Correct", "TimeUsed(s)"])?;

        for result in &self.results {
            let correct = if result.correct { "1" } else { "0" };
            let time_used = format!("{:.2}", result.time_used_secs);
            writer.write_record([
                result.stimulus.as_str(),
                result.response.as_str(),
                correct,
                time_used.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write `risultati_<name>.csv` into `dir` and return its path.
    pub fn export_results(&self, dir: &Path) -> csv::Result<PathBuf> {
        let path = dir.join(format!("risultati_{}.csv", self.options.player_name));
        let file = File::create(&path)?;
        self.write_results_csv(file)?;
        Ok(path)
    }

    /// Append a one-line summary of the finished session to the log kept in
    /// the config directory.
    pub fn save_results(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "fonema") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            // If the log file doesn't exist, we need to emit a header
            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .write(true)
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,player,activity,category,word_count,repetitions,score,percentage"
                )?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{},{},{},{}",
                Local::now().format("%c"),
                self.options.player_name,
                self.options.mode().label(),
                self.options.category,
                self.options.word_count,
                self.options.list_repetitions,
                self.score(),
                self.percentage(),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(list_repetitions: usize) -> Options {
        Options {
            player_name: "Mario".to_string(),
            list_repetitions,
            ..Options::default()
        }
    }

    fn result(correct: bool) -> TrialResult {
        TrialResult {
            stimulus: "casa topo".to_string(),
            response: "casa topo".to_string(),
            correct,
            time_used_secs: 3.5,
        }
    }

    #[test]
    fn score_is_derived_from_results() {
        let mut session = Session::new(options(3));
        assert_eq!(session.score(), 0);

        session.record_trial(result(true));
        session.record_trial(result(false));
        session.record_trial(result(true));

        assert_eq!(session.score(), 2);
        assert_eq!(session.trials_done(), 3);
        assert!(session.is_complete());
    }

    #[test]
    fn session_completes_after_configured_repetitions() {
        let mut session = Session::new(options(2));
        assert!(!session.is_complete());

        session.record_trial(result(true));
        assert!(!session.is_complete());

        session.record_trial(result(false));
        assert!(session.is_complete());
    }

    #[test]
    fn percentage_rounds_to_nearest_whole() {
        let mut session = Session::new(options(3));
        session.record_trial(result(true));
        assert_eq!(session.percentage(), 33);

        session.record_trial(result(true));
        assert_eq!(session.percentage(), 67);

        session.record_trial(result(true));
        assert_eq!(session.percentage(), 100);
    }

    #[test]
    fn csv_has_header_and_one_row_per_trial() {
        let mut session = Session::new(options(2));
        session.record_trial(TrialResult {
            stimulus: "casa topo".to_string(),
            response: "CASA TOPO".to_string(),
            correct: true,
            time_used_secs: 3.456,
        });
        session.record_trial(TrialResult {
            stimulus: "mela pane".to_string(),
            response: "pane".to_string(),
            correct: false,
            time_used_secs: 12.0,
        });

        let mut buffer = Vec::new();
        session.write_results_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Stimulus,Response,Correct,TimeUsed(s)");
        assert_eq!(lines[1], "casa topo,CASA TOPO,1,3.46");
        assert_eq!(lines[2], "mela pane,pane,0,12.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_quotes_fields_containing_the_delimiter() {
        let mut session = Session::new(options(1));
        session.record_trial(TrialResult {
            stimulus: "Il gatto dorme La luna brilla".to_string(),
            response: "Il gatto dorme; La luna, forse".to_string(),
            correct: false,
            time_used_secs: 8.21,
        });

        let mut buffer = Vec::new();
        session.write_results_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("\"Il gatto dorme; La luna, forse\""));
    }

    #[test]
    fn export_writes_a_file_named_after_the_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(options(1));
        session.record_trial(result(true));

        let path = session.export_results(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "risultati_Mario.csv");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Stimulus,Response,Correct,TimeUsed(s)"));
    }
}
