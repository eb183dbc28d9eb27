//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

use std::error::Error;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::commands::conversation_summary;
use crate::core::chat::ChatController;
use crate::core::chat_client::HttpTransport;
use crate::core::config::{Appearance, Config};
use crate::core::conversation::ConversationId;
use crate::core::message::Message;
use crate::core::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use crate::core::store::{ConversationStore, StoreError};
use crate::ui::ansi::write_lines;
use crate::ui::chat_loop::{run_chat, ChatLoopOptions};
use crate::ui::markdown::{render_message, MessageRenderConfig};
use crate::ui::theme::Theme;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "codemint")]
#[command(about = "A terminal chat client for the CodeMint assistant")]
#[command(
    long_about = "CodeMint talks to an assistant backend over HTTP and keeps every \
conversation on disk. Replies are formatted in the terminal: fenced code blocks are \
syntax highlighted and **bold** runs are emphasized.\n\n\
Commands inside the chat:\n\
  /help             List the slash commands\n\
  /new              Start a new conversation\n\
  /list             List conversations\n\
  /select <id>      Switch conversation\n\
  /delete [id]      Delete a conversation\n\
  /quit             Leave"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the assistant backend (requests go to <URL>/chat)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Directory holding the stored conversations
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Render code blocks without syntax highlighting
    #[arg(long, global = true)]
    pub no_syntax: bool,

    /// Log filter written to stderr, e.g. "debug" or "codemint=trace"
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Keep conversations in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// List stored conversations
    List,
    /// Create a new conversation
    New,
    /// Open the chat with a conversation selected
    Select { id: ConversationId },
    /// Delete a conversation
    Delete { id: ConversationId },
    /// Print a conversation (the selected one by default)
    Show { id: Option<ConversationId> },
    /// Format a message read from a file, or stdin when no file is given
    Render { file: Option<PathBuf> },
    /// Send one message in the selected conversation and print the reply
    Say {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value, or print the configuration without arguments
    Set {
        key: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset { key: String },
}

/// Configuration file values with command-line overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub data_dir: PathBuf,
    pub syntax_enabled: bool,
    pub appearance: Appearance,
    pub request_timeout: Duration,
    pub ephemeral: bool,
}

impl Settings {
    pub fn resolve(args: &Args, config: &Config) -> Self {
        Self {
            endpoint: args
                .endpoint
                .clone()
                .unwrap_or_else(|| config.endpoint_or_default().to_string()),
            data_dir: args
                .data_dir
                .clone()
                .unwrap_or_else(|| config.data_dir_or_default()),
            syntax_enabled: config.syntax_enabled() && !args.no_syntax,
            appearance: config.appearance_or_default(),
            request_timeout: config.request_timeout(),
            ephemeral: args.ephemeral,
        }
    }
}

/// How output is styled: colors only when writing to a terminal.
struct Output {
    theme: Theme,
    color: bool,
    syntax_enabled: bool,
}

impl Output {
    fn for_stdout(settings: &Settings) -> Self {
        let color = io::stdout().is_terminal();
        Self {
            theme: if color {
                Theme::for_appearance(settings.appearance)
            } else {
                Theme::monochrome()
            },
            color,
            syntax_enabled: settings.syntax_enabled,
        }
    }

    fn print<W: Write>(
        &self,
        out: &mut W,
        message: &Message,
        config: MessageRenderConfig,
    ) -> io::Result<()> {
        let lines = render_message(message, &self.theme, config);
        write_lines(out, &lines, self.color)
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .try_init();
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(args))
}

async fn async_main(mut args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.take().unwrap_or(Commands::Chat);

    match &command {
        Commands::Set { key, value } => return set_config(key.as_deref(), value),
        Commands::Unset { key } => return unset_config(key),
        _ => {}
    }

    let config = Config::load()?;
    let settings = Settings::resolve(&args, &config);
    let output = Output::for_stdout(&settings);
    debug!(endpoint = %settings.endpoint, ephemeral = settings.ephemeral, "Starting");

    dispatch(command, &settings, &output).await
}

async fn dispatch(
    command: Commands,
    settings: &Settings,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    if let Commands::Render { file } = &command {
        return render_input(file.as_deref(), output, &mut io::stdout());
    }

    if settings.ephemeral {
        run_with_storage(command, MemoryStorage::new(), settings, output).await
    } else {
        let storage = FileStorage::new(&settings.data_dir);
        run_with_storage(command, storage, settings, output).await
    }
}

/// Format a message read from `file`, or stdin when absent.
fn render_input<W: Write>(
    file: Option<&Path>,
    output: &Output,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    let config = MessageRenderConfig::new(output.syntax_enabled).with_role_prefix(false);
    output.print(out, &Message::assistant(raw), config)?;
    Ok(())
}

async fn run_with_storage<S: KeyValueStorage>(
    command: Commands,
    storage: S,
    settings: &Settings,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    let mut store = ConversationStore::load(storage);
    let mut stdout = io::stdout();

    match command {
        Commands::List => list_conversations(&store, &mut stdout)?,
        Commands::New => {
            let id = store.create();
            if let Some(conversation) = store.get(id) {
                writeln!(stdout, "Created {} ({id})", conversation.title)?;
            }
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            writeln!(stdout, "Deleted conversation {id}")?;
        }
        Commands::Show { id } => show_conversation(&store, id, output, &mut stdout)?,
        Commands::Say { prompt } => {
            let mut controller = chat_controller(store, settings)?;
            let prompt = prompt.join(" ");
            if let Some(exchange) = controller.submit(&prompt).await? {
                let config =
                    MessageRenderConfig::new(output.syntax_enabled).with_role_prefix(false);
                output.print(&mut stdout, &exchange.reply, config)?;
            }
        }
        Commands::Select { id } => {
            store.select(id)?;
            run_interactive(store, settings, output).await?;
        }
        Commands::Chat => run_interactive(store, settings, output).await?,
        Commands::Render { .. } | Commands::Set { .. } | Commands::Unset { .. } => {}
    }
    Ok(())
}

fn chat_controller<S: KeyValueStorage>(
    store: ConversationStore<S>,
    settings: &Settings,
) -> Result<ChatController<S>, Box<dyn Error>> {
    let transport = HttpTransport::new(&settings.endpoint, settings.request_timeout)?;
    Ok(ChatController::new(store, Arc::new(transport)))
}

async fn run_interactive<S: KeyValueStorage>(
    store: ConversationStore<S>,
    settings: &Settings,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    let controller = chat_controller(store, settings)?;
    let options = ChatLoopOptions {
        theme: output.theme.clone(),
        syntax_enabled: output.syntax_enabled,
        color: output.color,
        prompt: io::stdin().is_terminal(),
    };
    run_chat(controller, options).await?;
    Ok(())
}

fn list_conversations<S: KeyValueStorage, W: Write>(
    store: &ConversationStore<S>,
    out: &mut W,
) -> io::Result<()> {
    let selected = store.selected_id();
    for conversation in store.conversations() {
        writeln!(
            out,
            "{}",
            conversation_summary(conversation, Some(conversation.id) == selected)
        )?;
    }
    Ok(())
}

fn show_conversation<S: KeyValueStorage, W: Write>(
    store: &ConversationStore<S>,
    id: Option<ConversationId>,
    output: &Output,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let conversation = match id {
        Some(id) => store.get(id).ok_or(StoreError::NotFound(id))?,
        None => match store.selected() {
            Some(conversation) => conversation,
            None => return Ok(()),
        },
    };
    writeln!(out, "{} ({})", conversation.title, conversation.id)?;
    for message in &conversation.messages {
        output.print(out, message, MessageRenderConfig::new(output.syntax_enabled))?;
    }
    Ok(())
}

fn set_config(key: Option<&str>, value: &[String]) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let Some(key) = key else {
        config.print_all();
        return Ok(());
    };
    let value = value.join(" ");
    if let Err(message) = config.set_value(key, &value) {
        eprintln!("❌ {message}");
        std::process::exit(1);
    }
    config.save()?;
    println!("✅ Set {key} to: {value}");
    Ok(())
}

fn unset_config(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Err(message) = config.unset_value(key) {
        eprintln!("❌ {message}");
        std::process::exit(1);
    }
    config.save()?;
    println!("✅ Unset {key}");
    Ok(())
}
