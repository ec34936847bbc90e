use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, ValuesFinderError};
use crate::models::{Choice, RankedValues, SessionData};

/// Owns the run's history and appends a readable transcript to a file
pub struct SessionManager {
    data: SessionData,
    file: File,
    path: PathBuf,
}

impl SessionManager {
    /// Create `values_session_<timestamp>.txt` in `dir` and write the header
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let data = SessionData::new();
        let local = data.started_at.with_timezone(&Local);
        let filename = format!("values_session_{}.txt", local.format("%Y-%m-%d_%H-%M-%S"));
        let path = dir.as_ref().join(filename);

        let mut file = File::create(&path)?;
        let header = format!(
            "Values Discovery Session - {}\n=====================================\n\n",
            local.format("%Y-%m-%d %H:%M:%S")
        );
        file.write_all(header.as_bytes())?;
        tracing::info!(session = %data.id, "Session transcript at {}", path.display());

        Ok(Self {
            data,
            file,
            path,
        })
    }

    /// Record a finished round. A choice whose selection is out of range is
    /// refused and nothing is written.
    pub fn add_choice(&mut self, choice: Choice) -> Result<()> {
        let selected = choice
            .selected_label()
            .ok_or(ValuesFinderError::InvalidChoice {
                position: self.data.choices.len(),
                selected: choice.selected,
                options: choice.options.len(),
            })?
            .to_string();

        let mut entry = format!("Question: {}\n", choice.question_text);
        for (i, option) in choice.options.iter().enumerate() {
            entry.push_str(&format!("  {}) {}\n", i + 1, option));
        }
        entry.push_str(&format!("Selected: {}) {}\n\n", choice.selected + 1, selected));

        self.data.choices.push(choice);
        self.file.write_all(entry.as_bytes())?;
        Ok(())
    }

    pub fn log_final_values(&mut self, values: &RankedValues) -> Result<()> {
        let mut entry = String::from("\nFinal Values:\n============\n\n");
        for (i, value) in values.iter().enumerate() {
            entry.push_str(&format!("{}. {}\n", i + 1, value.name));
            entry.push_str(&format!("   {}\n\n", value.description));
        }
        self.data.final_ranking = Some(values.clone());
        self.file.write_all(entry.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    pub fn history(&self) -> &[Choice] {
        self.data.choices.choices()
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
