// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use application::{BlobStore, NoteBackend, NoteForm, NoteSession, NoteSynchronizer, NoteView};
use domain::{NoteId, NoteList, SyncError};
use infrastructure::{Config, GraphqlBackend, HttpBlobStore};
use ports::{ListPresenter, LogView};
use tracing::{debug, info, warn};
use crate::cli::args::{Args, Command, ConfigAction};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting notesync with arguments");

    let config_path = match args.config {
        Some(path) => {
            debug!(?path, "Using provided config path");
            path
        }
        None => Config::default_path()?,
    };

    match args.command {
        Command::Config { action } => run_config(&action, config_path),
        Command::List { json } => {
            let mut session = open_session(&config_path)?;
            session.refresh().await?;
            print_notes(session.notes(), json)
        }
        Command::Create {
            name,
            description,
            image,
            json,
        } => {
            info!(%name, image = ?image, "Creating note");
            let mut session = open_session(&config_path)?;
            let form = NoteForm {
                name,
                description,
                image_file: image,
            };
            session.submit(form).await?;
            print_notes(session.notes(), json)
        }
        Command::Delete { id, name, json } => {
            info!(%id, %name, "Deleting note");
            let mut session = open_session(&config_path)?;
            let id = NoteId::new(id);
            delete_listed(&mut session, &id, &name)
                .await
                .with_context(|| format!("Failed to delete note {id}"))?;
            print_notes(session.notes(), json)
        }
    }
}

type CliSession = NoteSession<GraphqlBackend, HttpBlobStore, LogView>;

fn open_session(config_path: &Path) -> Result<CliSession> {
    let config = Config::load_or_default(config_path)?;
    debug!(?config, "Loaded configuration");

    // Initialize infrastructure
    let backend = GraphqlBackend::new(
        config.backend.endpoint_url()?,
        &config.backend.credentials()?,
        config.backend.timeout(),
    )?;
    let blobs = HttpBlobStore::new(
        config.storage.base_url()?,
        config.storage.public_url()?,
        config.storage.prefix.clone(),
        &config.storage.credentials(),
        config.backend.timeout(),
    )?;

    // Initialize application
    let synchronizer = NoteSynchronizer::with_policy(backend, blobs, config.sync);
    Ok(NoteSession::new(synchronizer, LogView::new()))
}

/// Delete `id`, loading the list first so the note's image is known.
///
/// A failed listing does not block the delete; the session then holds no
/// notes and the blob is addressed by `name`.
async fn delete_listed<B, S, V>(
    session: &mut NoteSession<B, S, V>,
    id: &NoteId,
    name: &str,
) -> Result<(), SyncError>
where
    B: NoteBackend,
    S: BlobStore,
    V: NoteView,
{
    if let Err(error) = session.refresh().await {
        warn!(%error, "Failed to list notes before deleting");
    }
    if !session.notes().contains(id) {
        debug!(note_id = %id, "Note not in listing, falling back to name as image key");
    }
    session.delete(id, name).await
}

fn print_notes(notes: &NoteList, json: bool) -> Result<()> {
    let presenter = ListPresenter::new();
    let output = if json {
        presenter.render_json(notes)?
    } else {
        presenter.render(notes)
    };
    println!("{output}");
    Ok(())
}

fn run_config(action: &ConfigAction, path: PathBuf) -> Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("Config file already exists: {} (use --force to overwrite)", path.display());
            }
            Config::create_default(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}
