// src/ports/text.rs
use crate::application::NoteView;
use crate::domain::{Note, NoteImage, NoteList};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// Note as printed by `--json`. The image appears only as a URL plus its
/// lifecycle state; storage keys stay internal.
#[derive(Debug, Serialize)]
struct NoteOutput<'a> {
    id: Option<&'a str>,
    name: &'a str,
    description: &'a str,
    image_state: Option<&'static str>,
    image_url: Option<&'a str>,
    created_at: Option<&'a str>,
    updated_at: Option<&'a str>,
}

impl<'a> From<&'a Note> for NoteOutput<'a> {
    fn from(note: &'a Note) -> Self {
        let image_state = note.image.as_ref().map(|image| match image {
            NoteImage::Stored { .. } => "stored",
            NoteImage::Resolved { .. } => "resolved",
            NoteImage::Unavailable { .. } => "unavailable",
        });
        Self {
            id: note.id.as_ref().map(|id| id.as_str()),
            name: &note.name,
            description: &note.description,
            image_state,
            image_url: note.image_url(),
            created_at: note.created_at.as_deref(),
            updated_at: note.updated_at.as_deref(),
        }
    }
}

/// Renders note lists for the terminal
#[derive(Debug, Default)]
pub struct ListPresenter;

impl ListPresenter {
    pub fn new() -> Self {
        Self
    }

    fn render_note(&self, note: &Note) -> String {
        let id = note.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        let mut line = format!("{}\t{}\t{}", id, note.name, first_line(&note.description));

        match &note.image {
            Some(NoteImage::Resolved { url, .. }) => {
                line.push('\t');
                line.push_str(url);
            }
            Some(NoteImage::Unavailable { .. }) => line.push_str("\t(image unavailable)"),
            Some(NoteImage::Stored { .. }) | None => {}
        }
        line
    }

    /// One tab-separated line per note: id, name, description, image URL
    pub fn render(&self, notes: &NoteList) -> String {
        if notes.is_empty() {
            return "No notes".to_string();
        }
        notes
            .iter()
            .map(|note| self.render_note(note))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_json(&self, notes: &NoteList) -> Result<String> {
        let output: Vec<NoteOutput<'_>> = notes.iter().map(NoteOutput::from).collect();
        serde_json::to_string_pretty(&output).context("Failed to serialize notes to JSON")
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// View for non-interactive use: each render is logged, the caller prints the
/// final list itself.
#[derive(Debug, Default)]
pub struct LogView {
    renders: usize,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl NoteView for LogView {
    fn render(&mut self, notes: &NoteList) {
        self.renders += 1;
        debug!(count = notes.len(), render = self.renders, "Rendered notes");
    }
}
