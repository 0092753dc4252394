//! Prompt construction for the generation call.
//!
//! A pure function of writing mode, genre, language, the document tail,
//! and chapter progress. The word-count instructions embedded in the
//! templates are advisory only — the upstream model's compliance is
//! never enforced.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How close to the target a chapter must be before the closing template
/// takes over and asks the model to land the ending.
pub const CLOSING_THRESHOLD_WORDS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingMode {
    Story,
    Dialogue,
    Description,
    Character,
    Plot,
}

impl std::fmt::Display for WritingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WritingMode::Story => write!(f, "story"),
            WritingMode::Dialogue => write!(f, "dialogue"),
            WritingMode::Description => write!(f, "description"),
            WritingMode::Character => write!(f, "character"),
            WritingMode::Plot => write!(f, "plot"),
        }
    }
}

impl WritingMode {
    /// Mode-specific directive appended to the task section.
    fn directive(self) -> &'static str {
        match self {
            WritingMode::Story => "Advance the story with new events and narrative momentum.",
            WritingMode::Dialogue => {
                "Carry the scene forward primarily through dialogue between the characters."
            }
            WritingMode::Description => {
                "Deepen the scene with vivid sensory description of the setting and atmosphere."
            }
            WritingMode::Character => {
                "Develop the characters' inner lives, motivations, and relationships."
            }
            WritingMode::Plot => "Introduce a plot development that raises the stakes.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Fantasy,
    Romance,
    Mystery,
    Scifi,
    Horror,
    Adventure,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Genre::Fantasy => write!(f, "fantasy"),
            Genre::Romance => write!(f, "romance"),
            Genre::Mystery => write!(f, "mystery"),
            Genre::Scifi => write!(f, "science fiction"),
            Genre::Horror => write!(f, "horror"),
            Genre::Adventure => write!(f, "adventure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Indonesian,
}

impl Language {
    fn instruction(self) -> &'static str {
        match self {
            Language::English => "Write in English language. ",
            Language::Indonesian => "Write in Indonesian language (Bahasa Indonesia). ",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Indonesian => write!(f, "indonesian"),
        }
    }
}

/// Everything the prompt builder needs, borrowed from the caller.
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub mode: WritingMode,
    pub genre: Genre,
    pub language: Language,
    /// Last portion of the document, used as continuation context.
    pub tail: &'a str,
    /// Exact last sentence of the document, quoted as the ending point.
    pub last_sentence: Option<&'a str>,
    pub current_words: usize,
    pub target_words: usize,
}

/// Build the instruction string sent as the sole payload of the chat call.
///
/// Three template families: a chapter opening for an empty document, a
/// chapter closing when fewer than [`CLOSING_THRESHOLD_WORDS`] remain,
/// and a continuation otherwise.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    if input.tail.trim().is_empty() {
        return opening_prompt(input);
    }
    let remaining = input.target_words.saturating_sub(input.current_words);
    if remaining <= CLOSING_THRESHOLD_WORDS {
        closing_prompt(input, remaining)
    } else {
        continuation_prompt(input)
    }
}

fn opening_prompt(input: &PromptInput<'_>) -> String {
    format!(
        "You are an expert {genre} novelist. {lang}Write the BEGINNING of a new chapter. \
         Create an engaging opening with vivid descriptions, character development, and plot advancement. \
         {directive}\n\n\
         IMPORTANT: Write AT LEAST 500-800 words for this opening section. \
         Be detailed and descriptive. The goal is to generate substantial content with each request.\n\n\
         WORD COUNT REQUIREMENT: Your response must be at least 500 words minimum.",
        genre = input.genre,
        lang = input.language.instruction(),
        directive = input.mode.directive(),
    )
}

fn closing_prompt(input: &PromptInput<'_>, remaining: usize) -> String {
    format!(
        "You are writing a {genre} novel. {lang}\n\n\
         CURRENT CHAPTER PROGRESS: {current}/{target} words\n\n\
         LAST PART OF THE STORY:\n\"{tail}\"\n\n\
         TASK: Write the FINAL section to complete this chapter. \
         Continue naturally from where the story ended. \
         Write approximately {remaining} words to reach the {target}-word chapter goal. \
         End with a compelling cliffhanger or transition to the next chapter.\n\n\
         IMPORTANT:\n\
         - Continue from the exact point where the story left off\n\
         - Do NOT repeat or rewrite any existing content\n\
         - Maintain the same writing style and tone\n\
         - {directive}\n\
         - Write AT LEAST {remaining} words to complete the chapter",
        genre = input.genre,
        lang = input.language.instruction(),
        current = input.current_words,
        target = input.target_words,
        tail = input.tail,
        remaining = remaining,
        directive = input.mode.directive(),
    )
}

fn continuation_prompt(input: &PromptInput<'_>) -> String {
    let last_sentence = input.last_sentence.unwrap_or_default();
    format!(
        "SYSTEM: You are a novel continuation AI. Your ONLY job is to ADD NEW CONTENT.\n\n\
         CRITICAL MISSION: CONTINUE the story from the exact ending point. DO NOT REWRITE ANYTHING.\n\n\
         CURRENT PROGRESS: {current}/{target} words (generating AT LEAST 500 words this cycle)\n\n\
         STORY ENDING POINT:\n\"{tail}\"\n\n\
         EXACT LAST SENTENCE: \"{last_sentence}\"\n\n\
         TASK: Write the NEXT 500-800 words that happen AFTER this sentence: \"{last_sentence}\"\n\n\
         ABSOLUTE RULES:\n\
         - DO NOT repeat the last sentence\n\
         - DO NOT rewrite any existing content\n\
         - DO NOT start with \"Chapter\" or \"Bab\"\n\
         - DO NOT summarize what happened\n\
         - DO NOT change character names\n\
         - START with what happens NEXT\n\
         - Continue the same scene and action\n\
         - {directive}\n\
         - WRITE AT LEAST 500 WORDS - BE DETAILED AND DESCRIPTIVE\n\n\
         WORD COUNT REQUIREMENT: Your response must be at least 500 words minimum.\n\n\
         {lang}\n\nBEGIN CONTINUATION NOW:",
        current = input.current_words,
        target = input.target_words,
        tail = input.tail,
        last_sentence = last_sentence,
        directive = input.mode.directive(),
        lang = input.language.instruction(),
    )
}
