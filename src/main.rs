use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use colored::*;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use draftpilot::autopilot::{
    stop_channel, AutoPilot, AutoPilotConfig, ProgressEvent, RunOutcome,
    DEFAULT_CONTEXT_TAIL_CHARS,
};
use draftpilot::cli::Args;
use draftpilot::client::{ChatClient, ChatClientConfig, ChatRequest, Generate};
use draftpilot::config::Settings;
use draftpilot::document::{strip_filler, Document};
use draftpilot::error::DraftError;
use draftpilot::project::Project;
use draftpilot::prompt::{build_prompt, PromptInput};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), DraftError> {
    let settings = Settings::load(args.config.as_deref().map(Path::new))?;
    let settings = args.merged_settings(settings);

    let project_path = PathBuf::from(&args.project);
    let mut project = Project::load_or_create(&project_path, &args.title)?;

    let managing =
        args.new_chapter.is_some() || args.chapter.is_some() || args.delete_chapter.is_some();

    if let Some(title) = &args.new_chapter {
        project.add_chapter(title.clone());
        project.save(&project_path)?;
        println!("{} {}", "created chapter:".bright_green(), title);
    }

    if let Some(number) = args.chapter {
        let title = project.select_chapter(number)?.title.clone();
        project.save(&project_path)?;
        println!("{} {}", "active chapter:".bright_cyan(), title);
    }

    if let Some(number) = args.delete_chapter {
        let backup_path = project.backup(&project_path)?;
        let removed = project.delete_chapter(number)?;
        project.save(&project_path)?;
        println!(
            "{} '{}' (backup at {})",
            "deleted chapter:".bright_yellow(),
            removed.title,
            backup_path.display()
        );
    }

    if args.status {
        print_status(&project, &settings);
        return Ok(());
    }

    // Chapter management without --autopilot is a complete command; it
    // must not fall through into a generation call.
    if managing && !args.autopilot {
        print_status(&project, &settings);
        return Ok(());
    }

    let client = ChatClient::new(ChatClientConfig::new(settings.api_url.clone()));

    if args.autopilot {
        run_autopilot(client, settings, project, &project_path).await
    } else {
        generate_once(&client, &settings, &mut project, &project_path).await
    }
}

fn print_status(project: &Project, settings: &Settings) {
    println!("{} {}", "novel:".bright_cyan().bold(), project.title);
    let active_id = project.active_chapter().id.clone();
    for (i, chapter) in project.chapters().iter().enumerate() {
        let marker = if chapter.id == active_id { "*" } else { " " };
        println!(
            "{marker} {}. {} ({} words)",
            i + 1,
            chapter.title,
            chapter.word_count()
        );
    }
    println!(
        "{} {} words per chapter, {} total",
        "target:".bright_cyan(),
        settings.target_words,
        project.total_word_count()
    );
}

fn chat_request(settings: &Settings, prompt: String) -> ChatRequest {
    ChatRequest {
        message: prompt,
        model: Some(settings.model.clone()),
        max_tokens: Some(settings.max_tokens),
        temperature: Some(settings.temperature),
        conversation_id: None,
    }
}

/// One generation cycle triggered directly by the user: prompt, call,
/// append, save. Failures surface a generic message; nothing is retried.
async fn generate_once(
    client: &ChatClient,
    settings: &Settings,
    project: &mut Project,
    project_path: &Path,
) -> Result<(), DraftError> {
    let doc = Document::from_text(project.active_chapter().content.clone());
    println!(
        "{} ({}/{} words)",
        "Generating content...".bright_cyan(),
        doc.word_count(),
        settings.target_words
    );

    let prompt = {
        let input = PromptInput {
            mode: settings.mode,
            genre: settings.genre,
            language: settings.language,
            tail: doc.tail(DEFAULT_CONTEXT_TAIL_CHARS),
            last_sentence: doc.last_sentence(),
            current_words: doc.word_count(),
            target_words: settings.target_words,
        };
        build_prompt(&input)
    };

    match client.generate(chat_request(settings, prompt)).await {
        Ok(raw) => {
            let text = strip_filler(&raw);
            if text.is_empty() {
                return Err(DraftError::EmptyResponse);
            }
            let mut doc = doc;
            doc.append_generated(&text);
            let total = doc.word_count();
            project.active_chapter_mut().content = doc.into_text();
            project.save(project_path)?;
            println!(
                "{} {}/{} words",
                "appended.".bright_green(),
                total,
                settings.target_words
            );
            Ok(())
        }
        Err(e) if e.is_transient() => {
            eprintln!(
                "{}",
                "Failed to generate content. Please try again.".bright_red()
            );
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Drive the active chapter to the target word count unattended.
/// Ctrl-C stops scheduling; an in-flight request is abandoned and its
/// late result discarded.
async fn run_autopilot(
    client: ChatClient,
    settings: Settings,
    mut project: Project,
    project_path: &Path,
) -> Result<(), DraftError> {
    let config = AutoPilotConfig {
        target_words: settings.target_words,
        interval: Duration::from_secs(settings.interval_secs),
        mode: settings.mode,
        genre: settings.genre,
        language: settings.language,
        model: Some(settings.model.clone()),
        max_tokens: Some(settings.max_tokens),
        temperature: Some(settings.temperature),
        ..AutoPilotConfig::default()
    };

    let (stop_handle, stop_token) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!(
                "\n{}",
                "stopping auto-pilot, any in-flight request will be discarded...".bright_yellow()
            );
            stop_handle.stop();
        }
    });

    let mut document = Document::from_text(project.active_chapter().content.clone());
    println!(
        "{} '{}' ({}/{} words, every {}s)",
        "Auto-pilot started on".bright_cyan().bold(),
        project.active_chapter().title,
        document.word_count(),
        config.target_words,
        config.interval.as_secs()
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pilot = AutoPilot::new(client, config, stop_token);
    pilot.progress_tx = Some(tx);

    // Autosave task: keeps the project file in step with every accepted
    // append, so a crash mid-run loses at most one tick of prose.
    let saver_path = project_path.to_path_buf();
    let saver = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Appended { text, words, total_words } => {
                    let chapter = project.active_chapter_mut();
                    let mut doc = Document::from_text(std::mem::take(&mut chapter.content));
                    doc.append_generated(&text);
                    chapter.content = doc.into_text();
                    if let Err(e) = project.save(&saver_path) {
                        warn!(error = %e, "autosave failed");
                    }
                    println!(
                        "{} +{} words ({} total)",
                        "appended:".bright_green(),
                        words,
                        total_words
                    );
                }
                ProgressEvent::Rejected { words, min } => {
                    println!(
                        "{} {} words, below the {}-word minimum",
                        "discarded:".yellow(),
                        words,
                        min
                    );
                }
                ProgressEvent::Failed { error } => {
                    println!("{} {}", "tick failed:".yellow(), error);
                }
                ProgressEvent::Completed { total_words } => {
                    println!(
                        "{} {} words reached",
                        "Chapter complete!".bright_green().bold(),
                        total_words
                    );
                }
                ProgressEvent::Stopped { total_words } => {
                    println!(
                        "{} {} words so far",
                        "Auto-pilot stopped,".bright_yellow(),
                        total_words
                    );
                }
            }
        }
        project
    });

    let summary = pilot.run(&mut document).await;
    drop(pilot); // closes the progress channel so the saver can finish
    let mut project = saver.await.expect("autosave task panicked");

    project.active_chapter_mut().content = document.into_text();
    project.save(project_path)?;

    let outcome = match summary.outcome {
        RunOutcome::Completed => "completed".bright_green(),
        RunOutcome::Stopped => "stopped".bright_yellow(),
    };
    println!(
        "{outcome}: {} ticks, {} appended, {} rejected, {} failed, {} -> {} words",
        summary.ticks,
        summary.appended,
        summary.rejected,
        summary.failures,
        summary.initial_words,
        summary.final_words
    );
    Ok(())
}
