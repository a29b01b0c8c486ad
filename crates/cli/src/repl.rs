use crate::render;
use crate::slash::{COMMAND_NAMES, ReplInput, SlashCommand, help_text, parse_input};
use crate::voice::VoiceCapture;

use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use socratic_agent::{InputMode, Page, SessionController};
use socratic_core::{Error, Result, SessionError, VoiceConfig, find_lesson};
use std::borrow::Cow::{self, Borrowed, Owned};

/// Completion and hints for slash commands
struct ReplHelper;

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, Vec::new()));
        }

        let candidates = COMMAND_NAMES
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair { display: cmd.to_string(), replacement: cmd.to_string() })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') { Owned(line.bright_cyan().to_string()) } else { Borrowed(line) }
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMAND_NAMES
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ReplHelper {}

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive session: one controller, one line editor, commands handled one at a time
pub struct Repl {
    controller: SessionController,
    voice: VoiceConfig,
}

impl Repl {
    pub fn new(controller: SessionController, voice: VoiceConfig) -> Self {
        Self { controller, voice }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut editor: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(ReplHelper));

        println!("{}", "=== AI Teaching Assistant for Data Structures and Algorithms ===".bright_magenta().bold());
        println!("{}", "Start a chat with /start <topic>, or type /help.".dimmed());
        println!();

        loop {
            match editor.readline(&self.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                }
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        println!("{}", "Goodbye!".bright_green());
        Ok(())
    }

    fn prompt(&self) -> String {
        let state = self.controller.state();
        match (state.page, state.current_topic()) {
            (Page::Learn, _) => "learn> ".to_string(),
            (Page::Chat, Some(topic)) if state.input_mode == InputMode::Voice => format!("[{}] (enter to speak)> ", topic),
            (Page::Chat, Some(topic)) => format!("[{}]> ", topic),
            (Page::Chat, None) => "> ".to_string(),
        }
    }

    /// Handle one input line, printing results and errors. Errors never end the loop.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let result = match parse_input(line) {
            ReplInput::Empty => self.on_empty_line().await,
            ReplInput::Message(text) => self.on_message(&text).await,
            ReplInput::Command(command) => return self.dispatch(command).await,
            ReplInput::Invalid(hint) => {
                println!("{}", hint.yellow());
                Ok(())
            }
        };

        if let Err(e) = result {
            render::print_error(&e);
        }
        Flow::Continue
    }

    async fn dispatch(&mut self, command: SlashCommand) -> Flow {
        let result = match command {
            SlashCommand::Quit => return Flow::Quit,
            SlashCommand::Help => {
                println!("{}", help_text());
                Ok(())
            }
            SlashCommand::Save => self.save(),
            SlashCommand::DeleteAll => {
                self.controller.delete_all_saved();
                render::print_success("Deleted all saved chats.");
                Ok(())
            }
            SlashCommand::Saved => {
                render::print_saved(self.controller.store().entries(), self.controller.state());
                Ok(())
            }
            SlashCommand::Load { topic } => self.controller.load(&topic).map(|()| {
                self.controller.back_to_chat();
                let state = self.controller.state();
                render::print_transcript(state.current_topic(), state.current_transcript());
            }),
            SlashCommand::Delete { topic } => self
                .controller
                .delete_saved(&topic)
                .map(|()| render::print_success(&format!("Deleted '{}'.", topic))),
            SlashCommand::Learn => {
                self.controller.open_learn_page();
                println!("{}", "Learning Resources With Summarization".bold());
                render::print_lessons();
                println!("{}", "Pick one with /explain <topic|number>; /back returns to the chat.".dimmed());
                Ok(())
            }
            SlashCommand::Lessons => {
                render::print_lessons();
                Ok(())
            }
            SlashCommand::Explain { query } => self.explain(&query).await,
            SlashCommand::Back => {
                self.controller.back_to_chat();
                Ok(())
            }
            chat_command => self.dispatch_chat(chat_command).await,
        };

        if let Err(e) = result {
            render::print_error(&e);
        }
        Flow::Continue
    }

    /// Commands that only make sense on the chat page
    async fn dispatch_chat(&mut self, command: SlashCommand) -> Result<()> {
        if self.controller.state().page != Page::Chat {
            return Err(Error::Validation("that command works on the chat page; /back returns there".to_string()));
        }

        match command {
            SlashCommand::Start { topic } => {
                self.controller.start(&topic)?;
                let state = self.controller.state();
                render::print_transcript(state.current_topic(), state.current_transcript());
                Ok(())
            }
            SlashCommand::Show => {
                let state = self.controller.state();
                render::print_transcript(state.current_topic(), state.current_transcript());
                Ok(())
            }
            SlashCommand::Input { mode } => {
                self.controller.set_input_mode(mode);
                render::print_info(&format!("Input mode: {}", mode.as_str()));
                Ok(())
            }
            SlashCommand::Voice => self.capture_voice().await,
            SlashCommand::Retry => {
                render::print_busy();
                let reply = self.controller.retry_last().await?;
                println!("{} {}", "Assistant:".cyan().bold(), reply);
                Ok(())
            }
            SlashCommand::End => {
                self.controller.end();
                render::print_info("Chat ended. You can start a new chat.");
                Ok(())
            }
            other => Err(Error::Validation(format!("unexpected command {:?}", other))),
        }
    }

    fn save(&mut self) -> Result<()> {
        if !self.controller.state().chat.is_active() {
            println!("{}", "Start a chat to enable saving.".dimmed());
            return Ok(());
        }
        self.controller.save_current()?;
        let topic = self.controller.state().current_topic().unwrap_or_default().to_string();
        render::print_success(&format!("Chat '{}' saved.", topic));
        Ok(())
    }

    async fn on_empty_line(&mut self) -> Result<()> {
        let state = self.controller.state();
        if state.page == Page::Chat && state.input_mode == InputMode::Voice && state.chat.is_active() {
            return self.capture_voice().await;
        }
        Ok(())
    }

    async fn on_message(&mut self, text: &str) -> Result<()> {
        match self.controller.state().page {
            Page::Chat => self.send(text).await,
            Page::Learn => self.explain(text).await,
        }
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        render::print_busy();
        let reply = self.controller.submit(text).await?;
        println!("{} {}", "Assistant:".cyan().bold(), reply);
        Ok(())
    }

    async fn capture_voice(&mut self) -> Result<()> {
        if !self.controller.state().chat.is_active() {
            return Err(SessionError::NoActiveChat.into());
        }
        let voice = VoiceCapture::from_config(&self.voice)?;
        println!("{}", "Listening...".dimmed());
        match voice.capture().await? {
            Some(text) => {
                println!("{} {}", "You said:".green().bold(), text);
                self.send(&text).await
            }
            None => {
                println!("{}", "Could not understand audio".yellow());
                Ok(())
            }
        }
    }

    async fn explain(&mut self, query: &str) -> Result<()> {
        if self.controller.state().page != Page::Learn {
            return Err(Error::Validation("open the learn page with /learn first".to_string()));
        }
        let lesson = find_lesson(query)
            .ok_or_else(|| Error::Validation(format!("unknown lesson '{}'; see /lessons", query)))?;

        println!("{}", "Obtaining...".dimmed());
        let explanation = self.controller.explain(lesson).await?;
        render::print_explanation(&explanation);
        Ok(())
    }
}
