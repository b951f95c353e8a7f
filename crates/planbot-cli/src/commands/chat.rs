use std::io::{self, BufRead, Write};

use chrono::Local;
use planbot_core::{Assistant, Config, SessionStore};

// Single-user session; every line belongs to the same chat.
const CHAT_ID: i64 = 1;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let assistant = Assistant::new(config);
    let mut store = SessionStore::new();

    println!("Planbot chat. Type /help for commands, /quit to exit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }

        let now = Local::now().naive_local();
        for reply in assistant
            .handle_message(&mut store, CHAT_ID, line, now)
            .await
        {
            println!("{reply}");
        }
    }

    Ok(())
}
