//! CLI commands for chatqueue using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::load_settings_or_default;
use crate::core::{PersistentQueue, StateStore};
use crate::error::Error;

/// chatqueue - Live chat queue with round-robin agent assignment.
#[derive(Parser)]
#[command(name = "chatqueue")]
#[command(version = "0.1.0")]
#[command(about = "Live chat queue balancer", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Commands {
    /// Queue state file (defaults to settings, then queue_state.json)
    #[arg(long, global = true, env = "CHATQUEUE_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add new chat request
    Add {
        /// Customer name
        customer_name: String,
    },

    /// End the oldest chat
    End,

    /// List all active chats
    List,

    /// Get status in JSON format
    Json,
}

impl Commands {
    /// Run the command.
    pub fn run(&self) -> Result<()> {
        let settings = load_settings_or_default();
        let store = StateStore::new(settings.state_file(self.state_file.as_deref()));
        tracing::debug!("Using state file {}", store.path().display());

        let mut queue = PersistentQueue::open(store, &settings.queue)?;

        match &self.command {
            Command::Add { customer_name } => cmd_add(&mut queue, customer_name),
            Command::End => cmd_end(&mut queue),
            Command::List => cmd_list(&queue),
            Command::Json => cmd_json(&queue),
        }
    }
}

// Command implementations

fn cmd_add(queue: &mut PersistentQueue, customer_name: &str) -> Result<()> {
    match queue.add_chat(customer_name) {
        Ok(chat) => println!("Chat request added for {}", chat.customer_name),
        Err(Error::QueueFull { capacity }) => {
            tracing::info!("Rejected chat for {}: queue full ({})", customer_name, capacity);
            println!("Error: Queue is full");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_end(queue: &mut PersistentQueue) -> Result<()> {
    match queue.end_chat() {
        Ok(_) => println!("Oldest chat ended"),
        Err(Error::QueueEmpty) => println!("Error: No active chats to end"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_list(queue: &PersistentQueue) -> Result<()> {
    print!("{}", queue.list_chats());
    Ok(())
}

fn cmd_json(queue: &PersistentQueue) -> Result<()> {
    println!("{}", serde_json::to_string(&queue.status())?);
    Ok(())
}
