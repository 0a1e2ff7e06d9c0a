//! Subcommands and their execution

use anyhow::{anyhow, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use sqskit_sqs::{Manager, Message, Queue};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List queue URLs
    List {
        /// Only queues whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Load and print all attributes of every queue
        #[arg(long)]
        attributes: bool,
    },

    /// Create a queue and print its URL
    Create {
        name: String,

        #[command(flatten)]
        attributes: QueueAttributes,
    },

    /// Delete a queue, given by name or URL
    Delete { queue: String },

    /// Send a message and print its id
    Send { queue: String, body: String },

    /// Receive at most one message
    Receive {
        queue: String,

        /// Seconds the message stays hidden from other consumers
        #[arg(long)]
        visibility_timeout: Option<u32>,

        /// Include message attributes such as SenderId
        #[arg(long)]
        attributes: bool,

        /// Delete the message once it has been printed
        #[arg(long)]
        delete: bool,
    },

    /// Print all attributes of a queue
    Attributes { queue: String },

    /// Change settable queue attributes
    Set {
        queue: String,

        #[command(flatten)]
        attributes: QueueAttributes,
    },
}

/// Settable queue attributes given on the command line
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    #[arg(long)]
    pub delay_seconds: Option<u32>,

    #[arg(long)]
    pub maximum_message_size: Option<u32>,

    #[arg(long)]
    pub message_retention_period: Option<u32>,

    #[arg(long)]
    pub receive_message_wait_time_seconds: Option<u32>,

    #[arg(long)]
    pub visibility_timeout: Option<u32>,

    /// Access policy as a JSON document
    #[arg(long)]
    pub policy: Option<String>,
}

impl QueueAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields of `queue` that were given
    pub fn apply(&self, queue: &mut Queue) {
        if let Some(v) = self.delay_seconds {
            queue.delay_seconds = Some(v);
        }
        if let Some(v) = self.maximum_message_size {
            queue.maximum_message_size = Some(v);
        }
        if let Some(v) = self.message_retention_period {
            queue.message_retention_period = Some(v);
        }
        if let Some(v) = self.receive_message_wait_time_seconds {
            queue.receive_message_wait_time_seconds = Some(v);
        }
        if let Some(v) = self.visibility_timeout {
            queue.visibility_timeout = Some(v);
        }
        if let Some(policy) = &self.policy {
            queue.policy = Some(policy.clone());
        }
    }
}

pub async fn run(manager: &Manager, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { prefix, attributes } => {
            let queues = manager.get_queues(prefix.as_deref(), attributes).await?;
            for queue in &queues {
                if attributes {
                    print_json(queue)?;
                } else {
                    println!("{}", queue.url.as_deref().unwrap_or_default());
                }
            }
        }
        Command::Create { name, attributes } => {
            let mut queue = Queue::named(name);
            attributes.apply(&mut queue);
            let created = manager.create_queue(&queue).await?;
            println!("{}", created.url.as_deref().unwrap_or_default());
        }
        Command::Delete { queue } => {
            let queue = resolve(manager, &queue, false).await?;
            if !manager.delete_queue(&queue).await? {
                bail!("Service did not confirm deletion of {}", display_url(&queue));
            }
            info!(url = %display_url(&queue), "Queue deleted");
        }
        Command::Send { queue, body } => {
            let queue = resolve(manager, &queue, false).await?;
            let mut message = Message::new(body);
            if !manager.send_message(&queue, &mut message).await? {
                bail!("Service returned no message id");
            }
            println!("{}", message.message_id.unwrap_or_default());
        }
        Command::Receive {
            queue,
            visibility_timeout,
            attributes,
            delete,
        } => {
            let queue = resolve(manager, &queue, false).await?;
            let Some(message) = manager
                .receive_message(&queue, visibility_timeout, attributes)
                .await?
            else {
                info!(url = %display_url(&queue), "No message available");
                return Ok(());
            };

            print_json(&message)?;
            if delete && !manager.delete_message(&message).await? {
                bail!("Service did not confirm deletion of the message");
            }
        }
        Command::Attributes { queue } => {
            print_json(&resolve(manager, &queue, true).await?)?;
        }
        Command::Set { queue, attributes } => {
            if attributes.is_empty() {
                bail!("No attributes given");
            }
            // Loading caches the current state the update is diffed against
            let mut queue = resolve(manager, &queue, true).await?;
            attributes.apply(&mut queue);
            print_json(&manager.update_queue(&queue).await?)?;
        }
    }
    Ok(())
}

fn is_url(queue: &str) -> bool {
    queue.starts_with("https://") || queue.starts_with("http://")
}

/// Look up a queue given either by URL or by name
async fn resolve(manager: &Manager, queue: &str, load_attributes: bool) -> anyhow::Result<Queue> {
    if is_url(queue) {
        return Ok(manager.get_queue_by_url(queue, load_attributes).await?);
    }
    manager
        .get_queue_by_name(queue, load_attributes)
        .await?
        .ok_or_else(|| anyhow!("Queue not found: {queue}"))
}

fn display_url(queue: &Queue) -> &str {
    queue.url.as_deref().unwrap_or("<unbound>")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
