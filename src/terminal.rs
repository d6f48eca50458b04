//! Terminal front end
//!
//! Line-oriented transcript on stdout. Implements [`Presenter`] so the
//! runtime can drive it, and parses the few slash commands that stand in for
//! the sampling controls.

use crate::format::{Block, Markup};
use crate::runtime::{Controls, MessageBody, MessageHandle, Presenter, Sender};
use crossterm::style::Stylize;
use crossterm::{cursor, queue, terminal};
use std::io::Write;

const USER_LABEL: &str = "You:";
const ASSISTANT_LABEL: &str = "WayChat:";

pub const HELP: &str = "Type a message and press Enter to send.
  /temp <0-2>   set temperature
  /max <n>      set max output tokens
  /help         show this help
  /quit         exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Message(String),
    SetTemperature(Option<f32>),
    SetMaxOutputTokens(Option<u32>),
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (command, arg) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(c, a)| (c, a.trim()));

        match command {
            "/temp" => Input::SetTemperature(Controls::parse_temperature(arg)),
            "/max" => Input::SetMaxOutputTokens(Controls::parse_max_output_tokens(arg)),
            "/help" => Input::Help,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Message(line.to_string()),
        }
    }
}

/// Undo the formatter's escaping for plain-text display
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Presenter writing to any `Write` sink, normally stdout
pub struct TerminalPresenter<W: Write> {
    out: W,
    color: bool,
    controls: Controls,
    next_handle: u64,
    /// Handle of the entry occupying the last printed line, if it is a
    /// typing placeholder
    trailing_typing: Option<MessageHandle>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            controls: Controls::default(),
            next_handle: 0,
            trailing_typing: None,
        }
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.controls = Controls::new(temperature, self.controls.max_output_tokens);
    }

    pub fn set_max_output_tokens(&mut self, max_output_tokens: u32) {
        self.controls = Controls::new(self.controls.temperature, max_output_tokens);
    }

    /// Print an informational line outside the transcript
    pub fn notice(&mut self, text: &str) {
        let line = if self.color {
            text.dim().to_string()
        } else {
            text.to_string()
        };
        self.write_line(&line);
    }

    #[allow(dead_code)] // Used in tests
    pub fn into_inner(self) -> W {
        self.out
    }

    #[allow(dead_code)] // Used in tests
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn allocate(&mut self) -> MessageHandle {
        self.next_handle += 1;
        MessageHandle(self.next_handle)
    }

    fn label(&self, sender: Sender) -> String {
        let label = match sender {
            Sender::User => USER_LABEL,
            Sender::Assistant => ASSISTANT_LABEL,
        };
        if !self.color {
            return label.to_string();
        }
        match sender {
            Sender::User => label.bold().green().to_string(),
            Sender::Assistant => label.bold().magenta().to_string(),
        }
    }

    fn write_line(&mut self, line: &str) {
        self.trailing_typing = None;
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn render_markup(&self, markup: &Markup) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, block) in markup.blocks().iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            match block {
                Block::Section { label, body } => {
                    let label = decode_entities(label);
                    lines.push(if self.color {
                        label.bold().cyan().to_string()
                    } else {
                        label
                    });
                    lines.extend(decode_entities(body).lines().map(|l| format!("  {l}")));
                }
                Block::Paragraph(text) => {
                    lines.extend(decode_entities(text).lines().map(str::to_string));
                }
            }
        }
        lines
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn append_message(&mut self, sender: Sender, body: MessageBody) -> MessageHandle {
        let handle = self.allocate();
        let label = self.label(sender);
        match body {
            MessageBody::Text(text) => self.write_line(&format!("{label} {text}")),
            MessageBody::Markup(markup) => {
                self.write_line(&label);
                for line in self.render_markup(&markup) {
                    self.write_line(&line);
                }
            }
        }
        handle
    }

    fn show_typing(&mut self) -> MessageHandle {
        let handle = self.allocate();
        let line = format!("{} …", self.label(Sender::Assistant));
        self.write_line(&line);
        self.trailing_typing = Some(handle);
        handle
    }

    fn remove(&mut self, handle: MessageHandle) {
        // Printed output can only be taken back while it is the last line.
        if self.trailing_typing != Some(handle) {
            return;
        }
        self.trailing_typing = None;
        let result = queue!(
            self.out,
            cursor::MoveUp(1),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )
        .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to clear typing indicator");
        }
    }

    fn show_status(&mut self, text: &str, is_error: bool) {
        let line = match (self.color, is_error) {
            (false, _) => format!("[{text}]"),
            (true, false) => format!("[{text}]").dim().to_string(),
            (true, true) => format!("[{text}]").red().to_string(),
        };
        self.write_line(&line);
    }

    fn controls(&self) -> Controls {
        self.controls
    }

    fn reset_input(&mut self) {
        let prompt = if self.color { "> ".bold().to_string() } else { "> ".to_string() };
        self.trailing_typing = None;
        if let Err(e) = write!(self.out, "{prompt}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write prompt");
        }
    }
}
