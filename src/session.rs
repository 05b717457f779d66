//! Line-oriented replay session.
//!
//! A text front end for the navigation engine, shaped like a GTP loop: each
//! line is an optional numeric id, a command and its arguments. Successful
//! responses start with `=`, failures with `?`, and every response ends
//! with a blank line.
//!
//! ## Supported Commands
//!
//! - `open <path>` / `close` - Load or drop a game record
//! - `next` / `prev` - One move forward / back
//! - `down` / `up` - Switch to the next / previous variation
//! - `next_event` / `prev_event` - Skip to the next / previous comment or branch
//! - `goto <n>` - Jump to move `n` on the current line
//! - `comment` - Print the current comment
//! - `toggle_comment` - Switch the fullscreen comment overlay
//! - `status` / `info` / `board` / `variations` - Display data
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`

use std::io::{self, BufRead, Write};

use log::debug;

use crate::board::GoBoard;
use crate::config::ResolvedConfig;
use crate::engine::Engine;
use crate::window;

/// The list of known session commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "close",
    "comment",
    "down",
    "goto",
    "info",
    "known_command",
    "list_commands",
    "name",
    "next",
    "next_event",
    "open",
    "prev",
    "prev_event",
    "quit",
    "status",
    "toggle_comment",
    "up",
    "variations",
    "version",
];

pub struct ReplaySession {
    engine: Engine<GoBoard>,
    window_width: usize,
    window_height: usize,
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new(&ResolvedConfig::default())
    }
}

impl ReplaySession {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            engine: Engine::new(GoBoard::default()).with_placeholder(config.unknown_placeholder.clone()),
            window_width: config.variation_width,
            window_height: config.variation_height,
        }
    }

    pub fn engine(&self) -> &Engine<GoBoard> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<GoBoard> {
        &mut self.engine
    }

    /// Run the session on stdin/stdout until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            debug!("session command: {command} {args:?}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "open" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let path = args.join(" ");
                match self.engine.open(&path) {
                    Ok(()) => (true, self.status_text()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "close" => {
                self.engine.close();
                (true, String::new())
            }

            _ if !self.engine.is_game_loaded() && Self::needs_game(command) => {
                (false, "no game loaded".to_string())
            }

            "next" => self.navigate(|e| e.step_forward()),
            "prev" => self.navigate(|e| e.step_back()),
            "down" => self.navigate(|e| e.switch_variation_down()),
            "up" => self.navigate(|e| e.switch_variation_up()),
            "next_event" => self.navigate(|e| e.move_to_next_event()),
            "prev_event" => self.navigate(|e| e.move_to_previous_event()),

            "goto" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                match args[0].parse::<usize>() {
                    Ok(n) => self.navigate(|e| e.jump_to_move_index(n)),
                    Err(_) => (false, "invalid move number".to_string()),
                }
            }

            "comment" => {
                let text = self.engine.comment().unwrap_or_default().to_string();
                self.engine.mark_comment_drawn();
                (true, text)
            }

            "toggle_comment" => {
                if self.engine.toggle_fullscreen_comment() {
                    let state = if self.engine.is_fullscreen_comment() { "on" } else { "off" };
                    (true, state.to_string())
                } else {
                    (false, "no comment at this position".to_string())
                }
            }

            "status" => (true, self.status_text()),

            "info" => match self.engine.metadata() {
                Some(info) => (true, info.to_string()),
                None => (false, "no game loaded".to_string()),
            },

            "board" => (true, self.engine.board().to_string().trim_end().to_string()),

            "variations" => {
                let columns = self.engine.variation_window(self.window_width, self.window_height);
                (true, window::render(&columns, self.window_height).trim_end().to_string())
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn needs_game(command: &str) -> bool {
        matches!(
            command,
            "next"
                | "prev"
                | "down"
                | "up"
                | "next_event"
                | "prev_event"
                | "goto"
                | "comment"
                | "toggle_comment"
                | "status"
                | "board"
                | "variations"
        )
    }

    /// Run a navigation call. Not moving is still a success; the reply says
    /// where the cursor is.
    fn navigate(&mut self, step: impl FnOnce(&mut Engine<GoBoard>) -> bool) -> (bool, String) {
        if self.engine.is_fullscreen_comment() {
            return (false, "fullscreen comment is shown".to_string());
        }
        let moved = step(&mut self.engine);
        let mut reply = self.status_text();
        if !moved {
            reply.push_str("\n(no move)");
        }
        (true, reply)
    }

    fn status_text(&self) -> String {
        self.engine
            .status()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = "(;SZ[9]PB[Black]PW[White];B[cc]C[opening];W[gg](;B[ee])(;B[dd]))";

    fn session() -> ReplaySession {
        let mut session = ReplaySession::default();
        session.engine_mut().open_str(GAME).unwrap();
        session
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ReplaySession::parse_id("123 next");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "next");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ReplaySession::parse_id("next");
        assert_eq!(id, None);
        assert_eq!(cmd, "next");
    }

    #[test]
    fn test_known_command() {
        let mut session = ReplaySession::default();
        let (success, response) = session.execute("known_command", &["goto"]);
        assert!(success);
        assert_eq!(response, "true");

        let (_, response) = session.execute("known_command", &["genmove"]);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_navigation_without_game() {
        let mut session = ReplaySession::default();
        let (success, response) = session.execute("next", &[]);
        assert!(!success);
        assert_eq!(response, "no game loaded");
    }

    #[test]
    fn test_next_and_comment() {
        let mut session = session();
        let (success, response) = session.execute("next", &[]);
        assert!(success);
        assert!(response.starts_with("Move 1"));

        let (_, comment) = session.execute("comment", &[]);
        assert_eq!(comment, "opening");
        assert!(!session.engine().is_comment_dirty());
    }

    #[test]
    fn test_goto_and_variations() {
        let mut session = session();
        let (success, _) = session.execute("goto", &["3"]);
        assert!(success);
        let (_, response) = session.execute("down", &[]);
        assert!(!response.contains("(no move)"));
        assert_eq!(session.engine().board().get(3, 3), Some(crate::board::Color::Black));

        let (success, _) = session.execute("goto", &["three"]);
        assert!(!success);
    }

    #[test]
    fn test_toggle_comment_blocks_navigation() {
        let mut session = session();
        session.execute("next", &[]);
        let (success, state) = session.execute("toggle_comment", &[]);
        assert!(success);
        assert_eq!(state, "on");

        let (success, _) = session.execute("next", &[]);
        assert!(!success);
    }

    #[test]
    fn test_run_with_ids_and_quit() {
        let mut session = session();
        let input = b"1 next\n# comment line\n2 info\nquit\nnext\n";
        let mut output = Vec::new();
        session.run_with(&input[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("=1 Move 1"));
        assert!(text.contains("=2 Black: Black [unknown], White: White [unknown]"));
        assert_eq!(session.engine().move_index(), Some(1));
    }

    #[test]
    fn test_open_missing_file() {
        let mut session = session();
        let (success, response) = session.execute("open", &["/no/such/game.sgf"]);
        assert!(!success);
        assert!(response.contains("not found"));
        assert!(!session.engine().is_game_loaded());
    }
}
