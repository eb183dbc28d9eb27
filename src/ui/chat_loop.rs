//! Line-oriented interactive chat.
//!
//! Reads one line at a time, routes slash commands through
//! [`crate::commands`], and sends everything else in the selected
//! conversation. Replies are rendered with the markdown pipeline and written
//! to the output stream as they arrive.

use crate::commands::{process_input, CommandResult, CommandTarget};
use crate::core::chat::ChatController;
use crate::core::conversation::{Conversation, ConversationId};
use crate::core::message::Message;
use crate::core::storage::KeyValueStorage;
use crate::core::store::{LoadOrigin, StoreError};
use crate::ui::ansi::write_lines;
use crate::ui::markdown::{render_message, MessageRenderConfig};
use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

pub struct ChatLoopOptions {
    pub theme: Theme,
    pub syntax_enabled: bool,
    /// Emit ANSI styling.
    pub color: bool,
    /// Print a `> ` prompt before reading each line.
    pub prompt: bool,
}

pub struct ChatState<S, W> {
    controller: ChatController<S>,
    options: ChatLoopOptions,
    out: W,
}

impl<S: KeyValueStorage, W: Write> ChatState<S, W> {
    pub fn new(controller: ChatController<S>, options: ChatLoopOptions, out: W) -> Self {
        Self {
            controller,
            options,
            out,
        }
    }

    pub fn controller(&self) -> &ChatController<S> {
        &self.controller
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn render_config(&self) -> MessageRenderConfig {
        MessageRenderConfig::new(self.options.syntax_enabled)
    }

    fn write(&mut self, lines: &[Line<'_>]) {
        if let Err(err) = write_lines(&mut self.out, lines, self.options.color) {
            warn!(error = %err, "Failed to write chat output");
        }
    }

    fn print_message(&mut self, message: &Message) {
        let lines = render_message(message, &self.options.theme, self.render_config());
        self.write(&lines);
        self.write(&[Line::default()]);
    }

    fn print_prompt(&mut self) {
        if self.options.prompt {
            let _ = write!(self.out, "> ");
            let _ = self.out.flush();
        }
    }

    fn print_banner(&mut self) {
        if let LoadOrigin::Corrupt { reason } = self.controller.store().origin() {
            let reason = reason.clone();
            self.notice(format!(
                "Stored conversations could not be read ({reason}); started a new one."
            ));
        }
        self.notice("Type /help for commands.".to_string());
        self.show_selected();
    }

    async fn submit(&mut self, input: &str) {
        match self.controller.submit(input).await {
            Ok(Some(exchange)) => {
                debug!(
                    conversation = %exchange.conversation,
                    fallback = exchange.fallback,
                    "Exchange complete"
                );
                self.print_message(&exchange.reply);
            }
            Ok(None) => {}
            Err(err) => self.notice(err.to_string()),
        }
    }
}

impl<S: KeyValueStorage, W: Write> CommandTarget for ChatState<S, W> {
    fn conversations(&self) -> &[Conversation] {
        self.controller.store().conversations()
    }

    fn selected_id(&self) -> Option<ConversationId> {
        self.controller.store().selected_id()
    }

    fn new_conversation(&mut self) -> ConversationId {
        self.controller.new_conversation()
    }

    fn select_conversation(&mut self, id: ConversationId) -> Result<(), StoreError> {
        self.controller.select(id)
    }

    fn delete_conversation(&mut self, id: ConversationId) -> Result<(), StoreError> {
        self.controller.delete(id)
    }

    fn show_selected(&mut self) {
        let Some(conversation) = self.controller.store().selected().cloned() else {
            return;
        };
        self.notice(format!("── {} ({}) ──", conversation.title, conversation.id));
        for message in &conversation.messages {
            self.print_message(message);
        }
    }

    fn toggle_syntax(&mut self) -> bool {
        self.options.syntax_enabled = !self.options.syntax_enabled;
        self.options.syntax_enabled
    }

    fn notice(&mut self, text: String) {
        let style = self.options.theme.notice_style;
        let lines: Vec<Line<'_>> = text
            .lines()
            .map(|line| Line::from(vec![Span::styled(line.to_string(), style)]))
            .collect();
        self.write(&lines);
    }
}

/// Run the chat until `/quit` or end of input.
pub async fn drive<S, W, R>(state: &mut ChatState<S, W>, input: R) -> io::Result<()>
where
    S: KeyValueStorage,
    W: Write,
    R: AsyncBufRead + Unpin,
{
    state.print_banner();
    let mut lines = input.lines();
    loop {
        state.print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match process_input(state, &line) {
            CommandResult::Continue => {}
            CommandResult::ProcessAsMessage(text) => {
                // Echo is only needed when input is not a terminal
                if !state.options.prompt && !text.trim().is_empty() {
                    state.print_message(&Message::user(text.clone()));
                }
                state.submit(&text).await;
            }
            CommandResult::Quit => break,
        }
    }
    Ok(())
}

pub async fn run_chat<S: KeyValueStorage>(
    controller: ChatController<S>,
    options: ChatLoopOptions,
) -> io::Result<()> {
    let mut state = ChatState::new(controller, options, io::stdout());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    drive(&mut state, stdin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_client::test_support::ScriptedTransport;
    use crate::core::chat_client::APOLOGY_MESSAGE;
    use crate::core::storage::MemoryStorage;
    use crate::core::store::{ConversationStore, CONVERSATIONS_KEY};
    use std::sync::Arc;

    fn state(
        storage: &MemoryStorage,
        transport: ScriptedTransport,
    ) -> ChatState<&MemoryStorage, Vec<u8>> {
        let store = ConversationStore::load(storage);
        let controller = ChatController::new(store, Arc::new(transport));
        let options = ChatLoopOptions {
            theme: Theme::monochrome(),
            syntax_enabled: false,
            color: false,
            prompt: false,
        };
        ChatState::new(controller, options, Vec::new())
    }

    fn output(state: ChatState<&MemoryStorage, Vec<u8>>) -> String {
        String::from_utf8(state.into_output()).unwrap()
    }

    #[tokio::test]
    async fn messages_are_sent_and_rendered() {
        let storage = MemoryStorage::new();
        let mut chat = state(
            &storage,
            ScriptedTransport::new().reply("Use **care**:\n```python\nprint(1)\n```", 7),
        );

        drive(&mut chat, &b"hello\n\n/quit\nignored\n"[..])
            .await
            .unwrap();

        assert_eq!(chat.controller().store().selected().unwrap().messages.len(), 2);
        let text = output(chat);
        assert!(text.contains("You: hello"));
        assert!(text.contains("Mint: Use care:"));
        assert!(text.contains(" python "));
        assert!(text.contains("print(1)"));
        assert!(!text.contains("ignored"));
    }

    #[tokio::test]
    async fn failure_shows_apology() {
        let storage = MemoryStorage::new();
        let mut chat = state(&storage, ScriptedTransport::new().fail());
        drive(&mut chat, &b"hi\n"[..]).await.unwrap();
        assert!(output(chat).contains(APOLOGY_MESSAGE));
    }

    #[tokio::test]
    async fn commands_do_not_reach_the_backend() {
        let storage = MemoryStorage::new();
        let transport = ScriptedTransport::new();
        let mut chat = state(&storage, transport);
        drive(&mut chat, &b"/new\n/list\n"[..]).await.unwrap();
        assert_eq!(chat.controller().store().len(), 2);
        let text = output(chat);
        assert!(text.contains("Started Conversation 2"));
        assert!(text.contains("* "));
    }

    #[tokio::test]
    async fn corrupt_state_is_announced() {
        let storage = MemoryStorage::with_entry(CONVERSATIONS_KEY, "{not json");
        let mut chat = state(&storage, ScriptedTransport::new());
        drive(&mut chat, &b""[..]).await.unwrap();
        let text = output(chat);
        assert!(text.contains("could not be read"));
        assert!(text.contains("Conversation 1"));
    }

    #[tokio::test]
    async fn selecting_prints_history() {
        let storage = MemoryStorage::new();
        let mut chat = state(&storage, ScriptedTransport::new().reply("first answer", 1));
        let first = chat.controller().store().selected_id().unwrap();
        let script = format!("question\n/new\n/select {first}\n");
        drive(&mut chat, script.as_bytes()).await.unwrap();
        let text = output(chat);
        assert_eq!(text.matches("Mint: first answer").count(), 2);
    }
}
