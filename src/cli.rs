use clap::Parser;

use crate::config::Settings;
use crate::project::DEFAULT_PROJECT_TITLE;
use crate::prompt::{Genre, Language, WritingMode};

#[derive(Parser)]
#[command(name = "draftpilot")]
#[command(version)]
#[command(about = "An unattended drafting engine that extends a novel chapter toward a word-count target")]
pub struct Args {
    /// Project file holding the novel (created if missing)
    #[arg(long, default_value = "novel.json")]
    pub project: String,

    /// Title used when creating a new project file
    #[arg(long, default_value = DEFAULT_PROJECT_TITLE)]
    pub title: String,

    /// Path to a TOML config file (defaults to ./draftpilot.toml when present)
    #[arg(long)]
    pub config: Option<String>,

    /// Writing mode selecting the instruction template
    #[arg(long, value_enum)]
    pub mode: Option<WritingMode>,

    /// Genre the templates name ("expert <genre> novelist")
    #[arg(long, value_enum)]
    pub genre: Option<Genre>,

    /// Target language of the generated prose
    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Run the auto-pilot loop until the active chapter reaches the target
    #[arg(long, short)]
    pub autopilot: bool,

    /// Target word count for the active chapter
    #[arg(long)]
    pub target_words: Option<usize>,

    /// Seconds between auto-pilot ticks (clamped to 5-60)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Base URL of the chat API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Model name passed through to the endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// max_tokens passed through to the endpoint
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature in [0, 1]
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Create a new chapter with this title and make it active
    #[arg(long)]
    pub new_chapter: Option<String>,

    /// Switch the active chapter by number (1-based)
    #[arg(long)]
    pub chapter: Option<usize>,

    /// Delete a chapter by number (1-based); a timestamped backup of the
    /// project file is written first
    #[arg(long)]
    pub delete_chapter: Option<usize>,

    /// Print project status and exit
    #[arg(long)]
    pub status: bool,
}

impl Args {
    /// Layer CLI flags on top of file/env settings. Flags win wherever
    /// they were given.
    pub fn merged_settings(&self, mut base: Settings) -> Settings {
        if let Some(url) = &self.api_url {
            base.api_url = url.clone();
        }
        if let Some(model) = &self.model {
            base.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            base.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            base.temperature = temperature;
        }
        if let Some(target) = self.target_words {
            base.target_words = target;
        }
        if let Some(interval) = self.interval {
            base.interval_secs = interval;
        }
        if let Some(mode) = self.mode {
            base.mode = mode;
        }
        if let Some(genre) = self.genre {
            base.genre = genre;
        }
        if let Some(language) = self.language {
            base.language = language;
        }
        base
    }
}
