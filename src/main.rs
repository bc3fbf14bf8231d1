mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agentmail::auth::run_consent_flow;
use agentmail::credentials::CredentialStore;
use agentmail::requests::{
    DeleteMessageRequest, LabelRequest, MailOperationResult, ModifyLabelsRequest,
    ReadMessageRequest, SearchRequest,
};
use agentmail::{Config, MailError, Mailbox};

use cli::{Cli, Command, LabelCommand};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store = Arc::new(CredentialStore::new(config.credentials_path.clone()));

    match run(cli.command, &config, store).await {
        Ok(output) => println!("{output}"),
        Err(error) => {
            // Every failure leaves the process with a structured result,
            // never a crash.
            let result = MailOperationResult::failure(&error);
            println!("{}", to_json(&result));
            std::process::exit(1);
        }
    }
}

async fn run(
    command: Command,
    config: &Config,
    store: Arc<CredentialStore>,
) -> Result<String, MailError> {
    if let Command::Login = command {
        let credentials = run_consent_flow(config, &store).await?;
        return Ok(to_json(&serde_json::json!({
            "status": "success",
            "scopes": credentials.scopes,
            "expiry": credentials.expiry,
        })));
    }

    let mailbox = Mailbox::new(config, store);
    match command {
        Command::Login => unreachable!("handled above"),
        Command::Send(args) => {
            let response = mailbox.send_email(args.into()).await?;
            Ok(to_json(&response))
        }
        Command::Draft(args) => {
            let response = mailbox.create_draft(args.into()).await?;
            Ok(to_json(&response))
        }
        Command::Search {
            query,
            max_results,
            page_token,
            exclude_sent,
        } => {
            let response = mailbox
                .search(SearchRequest {
                    query,
                    max_results,
                    page_token,
                    exclude_sent,
                })
                .await?;
            Ok(to_json(&response))
        }
        Command::Read {
            message_id,
            html_offset,
            html_limit,
        } => {
            let response = mailbox
                .read_message(ReadMessageRequest {
                    message_id,
                    html_offset,
                    html_limit,
                })
                .await?;
            Ok(to_json(&response))
        }
        Command::Delete { message_id } => {
            let deleted = mailbox
                .delete_message(DeleteMessageRequest { message_id })
                .await?;
            Ok(to_json(&MailOperationResult::success(deleted)))
        }
        Command::Modify {
            message_id,
            add_label_ids,
            remove_label_ids,
        } => {
            let label_ids = mailbox
                .modify_labels(ModifyLabelsRequest {
                    message_id,
                    add_label_ids,
                    remove_label_ids,
                })
                .await?;
            Ok(to_json(&serde_json::json!({ "label_ids": label_ids })))
        }
        Command::Label(label_command) => run_label(label_command, &mailbox).await,
    }
}

async fn run_label(
    command: LabelCommand,
    mailbox: &Mailbox,
) -> Result<String, MailError> {
    match command {
        LabelCommand::List => Ok(to_json(&mailbox.list_labels().await?)),
        LabelCommand::Find { name } => Ok(to_json(&mailbox.find_label(&name).await?)),
        LabelCommand::Create {
            name,
            message_list_visibility,
            label_list_visibility,
        } => Ok(to_json(
            &mailbox
                .create_label(LabelRequest {
                    name,
                    message_list_visibility,
                    label_list_visibility,
                })
                .await?,
        )),
        LabelCommand::Ensure { name } => Ok(to_json(
            &mailbox
                .get_or_create_label(LabelRequest {
                    name,
                    message_list_visibility: "show".to_string(),
                    label_list_visibility: "labelShow".to_string(),
                })
                .await?,
        )),
        LabelCommand::Update {
            id,
            name,
            message_list_visibility,
            label_list_visibility,
        } => Ok(to_json(
            &mailbox
                .update_label(
                    &id,
                    LabelRequest {
                        name,
                        message_list_visibility,
                        label_list_visibility,
                    },
                )
                .await?,
        )),
        LabelCommand::Delete { id } => Ok(to_json(&mailbox.delete_label(&id).await?)),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}
