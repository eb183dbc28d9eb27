use super::{CommandResult, CommandTarget};

pub type CommandHandler = fn(&mut dyn CommandTarget, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new conversation and switch to it.",
        handler: super::handle_new,
    },
    Command {
        name: "list",
        usage: "/list",
        help: "List conversations; the selected one is marked with *.",
        handler: super::handle_list,
    },
    Command {
        name: "select",
        usage: "/select <id>",
        help: "Switch to another conversation.",
        handler: super::handle_select,
    },
    Command {
        name: "delete",
        usage: "/delete [id]",
        help: "Delete a conversation (the selected one by default).",
        handler: super::handle_delete,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "Print the selected conversation again.",
        handler: super::handle_history,
    },
    Command {
        name: "syntax",
        usage: "/syntax",
        help: "Toggle syntax highlighting for code blocks.",
        handler: super::handle_syntax,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
