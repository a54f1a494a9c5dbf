use std::sync::Arc;

use tracing::{info, warn};

use super::commands::{ServeArgs, StoreArgs};
use crate::config::Config;
use crate::entity::{Note, NoteInput};
use crate::error::{Result, SharenoteError};
use crate::server;
use crate::service::NoteService;
use crate::storage::{DocumentStore, MemoryStore, SqliteStore};

fn open_service(config: &Config) -> Result<NoteService> {
    let store: Arc<dyn DocumentStore> = if config.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&config.database, &config.collection)?)
    };
    NoteService::new(store, &config.share_base_url)
}

/// Service over the on-disk database, whatever `memory` says.
fn open_local_service(store: StoreArgs) -> Result<NoteService> {
    let mut config = Config::load(store.config.as_deref())?;
    if let Some(database) = store.database {
        config.database = database;
    }
    config.memory = false;
    open_service(&config)
}

pub fn handle_serve(args: ServeArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database = database;
        config.memory = false;
    }
    if args.memory {
        config.memory = true;
    }
    if let Some(url) = args.share_base_url {
        config.share_base_url = url;
    }

    let notes = open_service(&config)?;
    if config.memory {
        warn!("Using in-memory store, notes will be lost on shutdown");
    } else {
        info!("Using database {}", config.database.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(&config, notes))
}

pub fn handle_add(title: String, content: String, store: StoreArgs, json: bool) -> Result<()> {
    let input = NoteInput::new(title, content);
    input.validate().map_err(|e| SharenoteError::InvalidInput {
        field: e.field.to_string(),
        message: e.message,
    })?;

    let notes = open_local_service(store)?;
    let note = notes.create(&input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Created note {} - {}", note.id, note.title);
        if let Some(url) = &note.share_url {
            println!("  share: {}", url);
        }
    }

    Ok(())
}

pub fn handle_list(store: StoreArgs, json: bool) -> Result<()> {
    let notes = open_local_service(store)?;
    let all = notes.list()?.collect::<Result<Vec<Note>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    if all.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    for note in &all {
        println!("{}  {}", note.id, note.title);
    }

    Ok(())
}

pub fn handle_get(id: String, store: StoreArgs, json: bool) -> Result<()> {
    let notes = open_local_service(store)?;
    let note = notes.get(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    println!("ID:       {}", note.id);
    println!("Title:    {}", note.title);
    match (&note.share_id, &note.share_url) {
        (Some(share_id), Some(url)) => {
            println!("Share ID: {}", share_id);
            println!("Share:    {}", url);
        }
        _ => println!("Share:    (none)"),
    }
    println!();
    println!("{}", note.content);

    Ok(())
}

pub fn handle_delete(id: String, store: StoreArgs) -> Result<()> {
    let notes = open_local_service(store)?;
    notes.delete(&id)?;

    println!("Deleted note {}", id);
    Ok(())
}
