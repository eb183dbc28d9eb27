use super::*;
use crate::core::message::Message;

#[derive(Default)]
struct FakeTarget {
    conversations: Vec<Conversation>,
    selected: Option<ConversationId>,
    notices: Vec<String>,
    shown: usize,
    syntax: bool,
    next_id: i64,
}

impl FakeTarget {
    fn with_conversations(count: usize) -> Self {
        let mut target = FakeTarget {
            syntax: true,
            next_id: 1,
            ..Default::default()
        };
        for _ in 0..count {
            target.new_conversation();
        }
        target
    }

    fn last_notice(&self) -> &str {
        self.notices.last().map(String::as_str).unwrap_or("")
    }
}

impl CommandTarget for FakeTarget {
    fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    fn selected_id(&self) -> Option<ConversationId> {
        self.selected
    }

    fn new_conversation(&mut self) -> ConversationId {
        let id = ConversationId(self.next_id);
        self.next_id += 1;
        self.conversations
            .push(Conversation::new(id, self.conversations.len()));
        self.selected = Some(id);
        id
    }

    fn select_conversation(&mut self, id: ConversationId) -> Result<(), StoreError> {
        if self.conversations.iter().any(|c| c.id == id) {
            self.selected = Some(id);
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    fn delete_conversation(&mut self, id: ConversationId) -> Result<(), StoreError> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.conversations.remove(index);
        if self.selected == Some(id) {
            self.selected = self.conversations.last().map(|c| c.id);
        }
        Ok(())
    }

    fn show_selected(&mut self) {
        self.shown += 1;
    }

    fn toggle_syntax(&mut self) -> bool {
        self.syntax = !self.syntax;
        self.syntax
    }

    fn notice(&mut self, text: String) {
        self.notices.push(text);
    }
}

#[test]
fn plain_text_is_processed_as_message() {
    let mut target = FakeTarget::with_conversations(1);
    match process_input(&mut target, "hello /new") {
        CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello /new"),
        _ => panic!("expected message"),
    }
}

#[test]
fn unknown_command_is_processed_as_message() {
    let mut target = FakeTarget::with_conversations(1);
    assert!(matches!(
        process_input(&mut target, "/usr/bin/env"),
        CommandResult::ProcessAsMessage(_)
    ));
    assert!(matches!(
        process_input(&mut target, "/"),
        CommandResult::ProcessAsMessage(_)
    ));
}

#[test]
fn command_names_are_case_insensitive() {
    let mut target = FakeTarget::with_conversations(1);
    assert!(matches!(
        process_input(&mut target, "/QUIT"),
        CommandResult::Quit
    ));
}

#[test]
fn help_lists_every_command() {
    let mut target = FakeTarget::with_conversations(1);
    assert!(matches!(
        process_input(&mut target, "/help"),
        CommandResult::Continue
    ));
    let help = target.last_notice();
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.name);
    }
}

#[test]
fn new_creates_and_selects() {
    let mut target = FakeTarget::with_conversations(1);
    process_input(&mut target, "/new");
    assert_eq!(target.conversations.len(), 2);
    assert_eq!(target.selected, Some(ConversationId(2)));
    assert_eq!(target.last_notice(), "Started Conversation 2 (2)");
}

#[test]
fn list_marks_the_selected_conversation() {
    let mut target = FakeTarget::with_conversations(2);
    target.conversations[0]
        .messages
        .push(Message::user("hi"));
    process_input(&mut target, "/list");
    let lines: Vec<&str> = target.last_notice().lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "  1  Conversation 1  (1 message)");
    assert_eq!(lines[1], "* 2  Conversation 2  (0 messages)");
}

#[test]
fn select_switches_and_shows_history() {
    let mut target = FakeTarget::with_conversations(2);
    process_input(&mut target, "/select 1");
    assert_eq!(target.selected, Some(ConversationId(1)));
    assert_eq!(target.shown, 1);
}

#[test]
fn select_reports_bad_input() {
    let mut target = FakeTarget::with_conversations(2);
    process_input(&mut target, "/select");
    assert_eq!(target.last_notice(), "Usage: /select <id>");
    process_input(&mut target, "/select 99");
    assert_eq!(target.last_notice(), StoreError::NotFound(ConversationId(99)).to_string());
    assert_eq!(target.selected, Some(ConversationId(2)));
    assert_eq!(target.shown, 0);
}

#[test]
fn delete_without_argument_removes_selected() {
    let mut target = FakeTarget::with_conversations(3);
    process_input(&mut target, "/delete");
    assert_eq!(target.conversations.len(), 2);
    assert_eq!(target.selected, Some(ConversationId(2)));
    assert_eq!(target.shown, 1);
}

#[test]
fn delete_of_other_conversation_keeps_selection() {
    let mut target = FakeTarget::with_conversations(3);
    process_input(&mut target, "/delete 1");
    assert_eq!(target.selected, Some(ConversationId(3)));
    assert_eq!(target.shown, 0);
    assert_eq!(target.last_notice(), "Deleted conversation 1");
}

#[test]
fn syntax_toggles() {
    let mut target = FakeTarget::with_conversations(1);
    process_input(&mut target, "/syntax");
    assert!(!target.syntax);
    assert_eq!(target.last_notice(), "Syntax highlighting off");
    process_input(&mut target, "/syntax");
    assert_eq!(target.last_notice(), "Syntax highlighting on");
}
