//! Sessions command - inspects and edits the local session history.

use std::path::{Path, PathBuf};

use nelson::{
    constants::SESSIONS_FILE,
    session::{Role, SessionStore},
};

use crate::{
    cli::{SessionsArgs, SessionsCommand},
    output::{OutputFormat, clip, print_json, print_table},
};

const TITLE_COLUMN_WIDTH: usize = 48;

/// Location of the session file under `data_dir` (default: current directory).
pub fn sessions_path(data_dir: Option<&Path>) -> PathBuf {
    data_dir.unwrap_or_else(|| Path::new(".")).join(SESSIONS_FILE)
}

/// Run a sessions subcommand
pub fn run(args: &SessionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = sessions_path(args.data_dir.as_deref());
    let mut store = SessionStore::load_from_file(&path)?;

    match &args.command {
        SessionsCommand::List { json } => list(&store, OutputFormat::from_json_flag(*json)),
        SessionsCommand::Show { id, json } => {
            show(&store, id, OutputFormat::from_json_flag(*json))
        }
        SessionsCommand::Rename { id, title } => {
            if !store.rename_session(id, title) {
                return Err(format!("No session '{id}' or blank title").into());
            }
            store.save_to_file(&path)?;
            println!("Renamed {id}");
            Ok(())
        }
        SessionsCommand::Delete { id } => {
            if !store.delete_session(id) {
                return Err(format!("No session '{id}'").into());
            }
            store.save_to_file(&path)?;
            println!("Deleted {id}");
            Ok(())
        }
    }
}

fn list(store: &SessionStore, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        print_json(&serde_json::to_value(store.sessions())?)?;
        return Ok(());
    }

    if store.sessions().is_empty() {
        println!("No sessions yet. Start one with `nelson ask`.");
        return Ok(());
    }

    let current = store.current_session_id();
    let rows: Vec<Vec<String>> = store
        .sessions()
        .iter()
        .map(|s| {
            vec![
                if current == Some(s.id.as_str()) { "*" } else { "" }.to_string(),
                s.id.clone(),
                clip(&s.title, TITLE_COLUMN_WIDTH),
                s.mode.label().to_string(),
                s.messages.len().to_string(),
                s.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["", "ID", "TITLE", "MODE", "MESSAGES", "UPDATED"], &rows);
    Ok(())
}

fn show(
    store: &SessionStore,
    id: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = store
        .session(id)
        .ok_or_else(|| format!("No session '{id}'"))?;

    if format == OutputFormat::Json {
        print_json(&serde_json::to_value(session)?)?;
        return Ok(());
    }

    println!("# {}", session.title);
    println!(
        "{} mode, started {}",
        session.mode.label(),
        session.created_at.to_rfc3339()
    );
    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Nelson",
        };
        println!();
        println!("[{speaker} at {}]", message.timestamp.format("%H:%M:%S"));
        println!("{}", message.content);
        if let Some(citations) = &message.citations {
            for citation in citations {
                println!("  - {}, p. {}", citation.chapter, citation.page);
            }
        }
    }
    Ok(())
}
