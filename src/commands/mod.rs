//! Slash commands available inside the interactive chat.

mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use crate::core::conversation::{Conversation, ConversationId};
use crate::core::store::StoreError;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Quit,
}

/// What a command may act on. Implemented by the chat loop state.
pub trait CommandTarget {
    fn conversations(&self) -> &[Conversation];
    fn selected_id(&self) -> Option<ConversationId>;
    fn new_conversation(&mut self) -> ConversationId;
    fn select_conversation(&mut self, id: ConversationId) -> Result<(), StoreError>;
    fn delete_conversation(&mut self, id: ConversationId) -> Result<(), StoreError>;
    fn show_selected(&mut self);
    /// Flip syntax highlighting and return the new setting.
    fn toggle_syntax(&mut self) -> bool;
    fn notice(&mut self, text: String);
}

pub fn process_input(target: &mut dyn CommandTarget, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation { args };
        (command.handler)(target, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

/// One line of the conversation list.
pub fn conversation_summary(conversation: &Conversation, selected: bool) -> String {
    let marker = if selected { '*' } else { ' ' };
    let count = conversation.messages.len();
    let noun = if count == 1 { "message" } else { "messages" };
    format!(
        "{marker} {}  {}  ({count} {noun})",
        conversation.id, conversation.title
    )
}

fn parse_id(target: &mut dyn CommandTarget, args: &str, usage: &str) -> Option<ConversationId> {
    match args.parse::<ConversationId>() {
        Ok(id) => Some(id),
        Err(_) => {
            target.notice(format!("Usage: {usage}"));
            None
        }
    }
}

pub(super) fn handle_help(
    target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<14} {}", command.usage, command.help));
    }
    help.push_str("\nAnything else is sent to the assistant.");
    target.notice(help);
    CommandResult::Continue
}

pub(super) fn handle_new(
    target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let id = target.new_conversation();
    let title = target
        .conversations()
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.title.clone())
        .unwrap_or_default();
    target.notice(format!("Started {title} ({id})"));
    CommandResult::Continue
}

pub(super) fn handle_list(
    target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let selected = target.selected_id();
    let listing = target
        .conversations()
        .iter()
        .map(|c| conversation_summary(c, Some(c.id) == selected))
        .collect::<Vec<_>>()
        .join("\n");
    target.notice(listing);
    CommandResult::Continue
}

pub(super) fn handle_select(
    target: &mut dyn CommandTarget,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let Some(id) = parse_id(target, invocation.args, "/select <id>") else {
        return CommandResult::Continue;
    };
    match target.select_conversation(id) {
        Ok(()) => target.show_selected(),
        Err(err) => target.notice(err.to_string()),
    }
    CommandResult::Continue
}

pub(super) fn handle_delete(
    target: &mut dyn CommandTarget,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let id = if invocation.args.is_empty() {
        match target.selected_id() {
            Some(id) => id,
            None => return CommandResult::Continue,
        }
    } else {
        match parse_id(target, invocation.args, "/delete [id]") {
            Some(id) => id,
            None => return CommandResult::Continue,
        }
    };
    let previous = target.selected_id();
    match target.delete_conversation(id) {
        Ok(()) => {
            target.notice(format!("Deleted conversation {id}"));
            if target.selected_id() != previous {
                target.show_selected();
            }
        }
        Err(err) => target.notice(err.to_string()),
    }
    CommandResult::Continue
}

pub(super) fn handle_history(
    target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    target.show_selected();
    CommandResult::Continue
}

pub(super) fn handle_syntax(
    target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let enabled = target.toggle_syntax();
    target.notice(format!(
        "Syntax highlighting {}",
        if enabled { "on" } else { "off" }
    ));
    CommandResult::Continue
}

pub(super) fn handle_quit(
    _target: &mut dyn CommandTarget,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}

#[cfg(test)]
mod tests;
