//! Terminal input and prompt handling.

use std::{borrow::Cow, io::Write};

use rustyline::{
    DefaultEditor, Editor, Helper,
    completion::Completer,
    config::{ColorMode, Config},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
};
use tokio::sync::mpsc;

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Read lines on a blocking thread and forward them to the returned channel.
///
/// The channel closes on Ctrl+C, Ctrl+D or a readline error.
pub fn spawn_input_reader(username: &str) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = format!("{}> ", username);

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Renders every typed character as `*`
struct PasswordMask;

impl Completer for PasswordMask {
    type Candidate = String;
}

impl Hinter for PasswordMask {
    type Hint = String;
}

impl Validator for PasswordMask {}

impl Highlighter for PasswordMask {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Helper for PasswordMask {}

/// Prompt for a password on the terminal without echoing it.
///
/// Blocks the calling thread; nothing is added to the line history.
pub fn prompt_password(prompt: &str) -> Result<String, ReadlineError> {
    let config = Config::builder()
        .auto_add_history(false)
        .color_mode(ColorMode::Forced)
        .build();
    let mut rl: Editor<PasswordMask, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(PasswordMask));
    let password = rl.readline(prompt)?;
    Ok(password.trim().to_string())
}
