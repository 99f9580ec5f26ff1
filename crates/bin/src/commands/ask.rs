//! Ask command - sends one question to a running server.

use std::io::Write;

use nelson::{client::ChatClient, session::SessionStore};

use super::sessions::sessions_path;
use crate::cli::AskArgs;

/// Ask a question, print the answer as it streams and save the session
pub async fn run(args: &AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err("The question must not be empty".into());
    }

    let path = sessions_path(args.data_dir.as_deref());
    let mut store = SessionStore::load_from_file(&path)?;

    match &args.session {
        Some(id) => {
            store.set_current_session(id)?;
            store.set_mode(args.mode);
        }
        None if !args.new && store.current_session().is_some() => store.set_mode(args.mode),
        None => {
            store.start_conversation(&question, args.mode);
        }
    }

    let client = ChatClient::new(&args.server)?;
    let mut stdout = std::io::stdout();
    let result = client
        .send_with(&mut store, &question, |piece| {
            let _ = write!(stdout, "{piece}");
            let _ = stdout.flush();
        })
        .await;
    println!();

    // The exchange is saved even when it failed, like the chat window keeps it
    store.save_to_file(&path)?;
    result?;
    Ok(())
}
