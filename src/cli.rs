use clap::{Args, Parser, Subcommand};

use agentmail::requests::SendEmailRequest;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Gmail mailbox operations for agents", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the one-time interactive OAuth consent flow and persist credentials.
    Login,
    /// Send an email.
    Send(SendArgs),
    /// Create a draft with the same parameters as send.
    Draft(SendArgs),
    /// Search the mailbox with Gmail query syntax.
    Search {
        #[clap(default_value = "")]
        query: String,
        #[clap(long)]
        max_results: Option<u32>,
        #[clap(long)]
        page_token: Option<String>,
        /// Exclude your own sent messages (applied server-side via the query).
        #[clap(long)]
        exclude_sent: bool,
    },
    /// Read one message's text and (windowed) HTML bodies.
    Read {
        message_id: String,
        #[clap(long)]
        html_offset: Option<usize>,
        #[clap(long)]
        html_limit: Option<usize>,
    },
    /// Permanently delete a message.
    Delete { message_id: String },
    /// Add or remove labels on a message.
    Modify {
        message_id: String,
        #[clap(long = "add")]
        add_label_ids: Vec<String>,
        #[clap(long = "remove")]
        remove_label_ids: Vec<String>,
    },
    /// Label management.
    #[clap(subcommand)]
    Label(LabelCommand),
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[clap(long = "to", required = true)]
    pub to: Vec<String>,
    #[clap(long = "cc")]
    pub cc: Vec<String>,
    #[clap(long = "bcc")]
    pub bcc: Vec<String>,
    #[clap(long)]
    pub subject: String,
    #[clap(long, default_value = "")]
    pub body: String,
    #[clap(long)]
    pub in_reply_to: Option<String>,
    #[clap(long)]
    pub thread_id: Option<String>,
    /// Local file paths, attached in the given order.
    #[clap(long = "attach")]
    pub attachments: Vec<String>,
}

impl From<SendArgs> for SendEmailRequest {
    fn from(args: SendArgs) -> Self {
        SendEmailRequest {
            to: args.to,
            cc: args.cc,
            bcc: args.bcc,
            subject: args.subject,
            body: args.body,
            in_reply_to: args.in_reply_to,
            thread_id: args.thread_id,
            attachments: args.attachments,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum LabelCommand {
    /// List all labels grouped into system and user labels.
    List,
    /// Find a label by name (case-insensitive).
    Find { name: String },
    /// Create a new label.
    Create {
        name: String,
        #[clap(long, default_value = "show")]
        message_list_visibility: String,
        #[clap(long, default_value = "labelShow")]
        label_list_visibility: String,
    },
    /// Return the named label, creating it if absent.
    Ensure { name: String },
    /// Rename or re-configure a label.
    Update {
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "show")]
        message_list_visibility: String,
        #[clap(long, default_value = "labelShow")]
        label_list_visibility: String,
    },
    /// Delete a user label (system labels are refused).
    Delete { id: String },
}
