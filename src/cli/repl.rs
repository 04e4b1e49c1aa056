use anyhow::Result;
use std::io::{self, Write};
use uuid::Uuid;

pub async fn run(app: super::App, resume_session: Option<String>) -> Result<()> {
    println!("\x1b[1masciigen\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Chat model: \x1b[36m{}\x1b[0m", app.config.chat_model);
    println!("Image model: \x1b[36m{}\x1b[0m", app.config.image_model);
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    let session_key =
        resume_session.unwrap_or_else(|| format!("session_{}", Uuid::new_v4()));

    loop {
        eprint!("\x1b[32;1masciigen>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if input.starts_with('/') {
            match handle_command(&input, &app, &session_key).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        match app.engine.submit_turn(&session_key, &input).await {
            Ok(response) => {
                if let Some(art) = &response.art {
                    println!("{art}");
                }
                println!("{}\n", response.text);
            }
            Err(e) => {
                eprintln!("\x1b[31mError: {e}\x1b[0m");
            }
        }
    }

    Ok(())
}

async fn handle_command(input: &str, app: &super::App, session_key: &str) -> Result<bool> {
    match input {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /help       Show this help");
            println!("  /history    Show the session transcript");
            println!("  /clear      Clear the session");
            println!("  /exit       Exit");
            Ok(true)
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            Ok(false)
        }
        "/history" => {
            let session = app
                .engine
                .history(session_key)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            if session.messages.is_empty() {
                println!("No messages yet.");
            } else {
                for msg in &session.messages {
                    println!("  \x1b[90m{:>9}\x1b[0m  {}", msg.role.as_str(), msg.content);
                }
            }
            Ok(true)
        }
        "/clear" => {
            app.engine
                .clear_session(session_key)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Session cleared.");
            Ok(true)
        }
        _ => {
            eprintln!("Unknown command: {input}. Type /help for available commands.");
            Ok(true)
        }
    }
}
