use serde::Serialize;

use crate::auth::TokenEndpoint;
use crate::error::{MailError, Result};

use super::client::MailClient;
use super::types::{Label, LabelSpec};

/// All labels split by origin, with a count for the tool layer.
#[derive(Debug, Serialize)]
pub struct LabelInventory {
    pub all: Vec<Label>,
    pub system: Vec<Label>,
    pub user: Vec<Label>,
    pub total: usize,
}

pub async fn list_grouped<E: TokenEndpoint>(client: &MailClient<E>) -> Result<LabelInventory> {
    let all = client.list_labels().await?;
    let system: Vec<Label> = all
        .iter()
        .filter(|label| label.label_type.as_deref() == Some("system"))
        .cloned()
        .collect();
    let user: Vec<Label> = all
        .iter()
        .filter(|label| label.label_type.as_deref() == Some("user"))
        .cloned()
        .collect();
    let total = all.len();
    Ok(LabelInventory {
        all,
        system,
        user,
        total,
    })
}

/// Case-insensitive lookup by display name.
pub async fn find_by_name<E: TokenEndpoint>(
    client: &MailClient<E>,
    name: &str,
) -> Result<Option<Label>> {
    let labels = client.list_labels().await?;
    Ok(labels.into_iter().find(|label| {
        label
            .name
            .as_deref()
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
    }))
}

/// Returns the existing label of that name or creates it.
pub async fn get_or_create<E: TokenEndpoint>(
    client: &MailClient<E>,
    spec: &LabelSpec,
) -> Result<Label> {
    if let Some(existing) = find_by_name(client, &spec.name).await? {
        return Ok(existing);
    }
    client.create_label(spec).await
}

/// Deletes a user label. System labels cannot be deleted; refusing locally
/// gives a clearer error than the remote 400.
pub async fn delete_checked<E: TokenEndpoint>(client: &MailClient<E>, id: &str) -> Result<Label> {
    let label = client.get_label(id).await?;
    if label.label_type.as_deref() == Some("system") {
        return Err(MailError::InvalidRequest(format!(
            "cannot delete system label '{id}'"
        )));
    }
    client.delete_label(id).await?;
    Ok(label)
}
