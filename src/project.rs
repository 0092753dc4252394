//! Project persistence: the novel title, its chapters, and which chapter
//! is active, serialized as JSON to a project file on disk.
//!
//! A project always has at least one chapter. Destructive operations
//! write a timestamped backup file next to the project file first.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::count_words;
use crate::error::DraftError;

pub const DEFAULT_PROJECT_TITLE: &str = "Untitled Novel";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Chapter {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: String::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    chapters: Vec<Chapter>,
    active_id: String,
}

impl Project {
    /// A fresh project with one empty "Chapter 1".
    pub fn new(title: impl Into<String>) -> Self {
        let first = Chapter::new("Chapter 1");
        let active_id = first.id.clone();
        Project {
            title: title.into(),
            chapters: vec![first],
            active_id,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let raw = fs::read_to_string(path).map_err(|e| DraftError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut project: Project =
            serde_json::from_str(&raw).map_err(|e| DraftError::Project {
                path: path.display().to_string(),
                source: e,
            })?;
        // Repair a stale active id rather than refusing the file.
        if !project.chapters.iter().any(|c| c.id == project.active_id) {
            if let Some(first) = project.chapters.first() {
                project.active_id = first.id.clone();
            }
        }
        if project.chapters.is_empty() {
            let first = Chapter::new("Chapter 1");
            project.active_id = first.id.clone();
            project.chapters.push(first);
        }
        debug!(path = %path.display(), chapters = project.chapters.len(), "project loaded");
        Ok(project)
    }

    /// Load the project file, or create a new one at `path` if missing.
    pub fn load_or_create(path: &Path, title: &str) -> Result<Self, DraftError> {
        if path.exists() {
            Self::load(path)
        } else {
            let project = Project::new(title);
            project.save(path)?;
            info!(path = %path.display(), "created new project");
            Ok(project)
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DraftError> {
        let raw = serde_json::to_string_pretty(self).map_err(|e| DraftError::Project {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(path, raw).map_err(|e| DraftError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn active_chapter(&self) -> &Chapter {
        self.chapters
            .iter()
            .find(|c| c.id == self.active_id)
            .unwrap_or(&self.chapters[0])
    }

    pub fn active_chapter_mut(&mut self) -> &mut Chapter {
        let idx = self
            .chapters
            .iter()
            .position(|c| c.id == self.active_id)
            .unwrap_or(0);
        &mut self.chapters[idx]
    }

    /// Add a chapter and make it active.
    pub fn add_chapter(&mut self, title: impl Into<String>) -> &Chapter {
        let chapter = Chapter::new(title);
        self.active_id = chapter.id.clone();
        self.chapters.push(chapter);
        self.chapters.last().expect("chapter just pushed")
    }

    /// Switch the active chapter by 1-based position.
    pub fn select_chapter(&mut self, number: usize) -> Result<&Chapter, DraftError> {
        let chapter = self
            .chapters
            .get(number.wrapping_sub(1))
            .ok_or_else(|| DraftError::UnknownChapter(number.to_string()))?;
        self.active_id = chapter.id.clone();
        Ok(chapter)
    }

    /// Delete a chapter by 1-based position. Refuses to delete the only
    /// chapter; deleting the active one switches to the first remaining.
    pub fn delete_chapter(&mut self, number: usize) -> Result<Chapter, DraftError> {
        if self.chapters.len() <= 1 {
            return Err(DraftError::LastChapter);
        }
        let idx = number.wrapping_sub(1);
        if idx >= self.chapters.len() {
            return Err(DraftError::UnknownChapter(number.to_string()));
        }
        let removed = self.chapters.remove(idx);
        if removed.id == self.active_id {
            self.active_id = self.chapters[0].id.clone();
        }
        Ok(removed)
    }

    pub fn total_word_count(&self) -> usize {
        self.chapters.iter().map(Chapter::word_count).sum()
    }

    /// Write a timestamped backup copy next to the project file and
    /// return its path.
    pub fn backup(&self, path: &Path) -> Result<PathBuf, DraftError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("novel");
        let backup_path = path.with_file_name(format!("{stem}.backup-{secs}.json"));
        self.save(&backup_path)?;
        info!(path = %backup_path.display(), "backup written");
        Ok(backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_project_has_one_chapter() {
        let project = Project::new("My Novel");
        assert_eq!(project.chapters().len(), 1);
        assert_eq!(project.active_chapter().title, "Chapter 1");
        assert!(project.active_chapter().content.is_empty());
    }

    #[test]
    fn test_add_chapter_becomes_active() {
        let mut project = Project::new("My Novel");
        project.add_chapter("Chapter 2");
        assert_eq!(project.chapters().len(), 2);
        assert_eq!(project.active_chapter().title, "Chapter 2");
    }

    #[test]
    fn test_select_chapter_by_position() {
        let mut project = Project::new("My Novel");
        project.add_chapter("Chapter 2");
        project.select_chapter(1).expect("chapter 1 exists");
        assert_eq!(project.active_chapter().title, "Chapter 1");
    }

    #[test]
    fn test_select_unknown_chapter_fails() {
        let mut project = Project::new("My Novel");
        assert!(matches!(
            project.select_chapter(9),
            Err(DraftError::UnknownChapter(_))
        ));
        assert!(matches!(
            project.select_chapter(0),
            Err(DraftError::UnknownChapter(_))
        ));
    }

    #[test]
    fn test_delete_only_chapter_refused() {
        let mut project = Project::new("My Novel");
        assert!(matches!(
            project.delete_chapter(1),
            Err(DraftError::LastChapter)
        ));
        assert_eq!(project.chapters().len(), 1);
    }

    #[test]
    fn test_delete_active_chapter_switches_to_first() {
        let mut project = Project::new("My Novel");
        project.add_chapter("Chapter 2");
        let removed = project.delete_chapter(2).expect("deletable");
        assert_eq!(removed.title, "Chapter 2");
        assert_eq!(project.active_chapter().title, "Chapter 1");
    }

    #[test]
    fn test_word_counts() {
        let mut project = Project::new("My Novel");
        project.active_chapter_mut().content = "one two three".to_string();
        project.add_chapter("Chapter 2");
        project.active_chapter_mut().content = "four five".to_string();
        assert_eq!(project.total_word_count(), 5);
        assert_eq!(project.active_chapter().word_count(), 2);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("novel.json");
        let mut project = Project::new("Roundtrip");
        project.active_chapter_mut().content = "Some prose here.".to_string();
        project.add_chapter("Chapter 2");
        project.save(&path).expect("save");

        let loaded = Project::load(&path).expect("load");
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_load_or_create_creates_missing_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("novel.json");
        let project = Project::load_or_create(&path, "Fresh").expect("create");
        assert!(path.exists());
        assert_eq!(project.title, "Fresh");
    }

    #[test]
    fn test_load_repairs_stale_active_id() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("novel.json");
        let raw = r#"{
            "title": "Broken",
            "chapters": [{"id": "c1", "title": "Chapter 1", "content": ""}],
            "active_id": "does-not-exist"
        }"#;
        std::fs::write(&path, raw).expect("write");
        let project = Project::load(&path).expect("load");
        assert_eq!(project.active_chapter().id, "c1");
    }

    #[test]
    fn test_load_invalid_json_is_project_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("novel.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(
            Project::load(&path),
            Err(DraftError::Project { .. })
        ));
    }

    #[test]
    fn test_backup_writes_sibling_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("novel.json");
        let project = Project::new("Backed Up");
        project.save(&path).expect("save");
        let backup_path = project.backup(&path).expect("backup");
        assert!(backup_path.exists());
        assert_ne!(backup_path, path);
        let restored = Project::load(&backup_path).expect("load backup");
        assert_eq!(restored.title, "Backed Up");
    }
}
