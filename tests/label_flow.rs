mod common;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agentmail::requests::LabelRequest;
use agentmail::Mailbox;

use common::{fast_retry, seeded_store, test_config};

async fn mailbox_against(server: &MockServer, dir: &tempfile::TempDir) -> Mailbox {
    let token_uri = format!("{}/token", server.uri());
    let store = seeded_store(dir, &token_uri, "valid-token", 3600);
    Mailbox::new(&test_config(dir, &server.uri()), store).with_retry(fast_retry())
}

fn label_request(name: &str) -> LabelRequest {
    LabelRequest {
        name: name.to_string(),
        message_list_visibility: "show".to_string(),
        label_list_visibility: "labelShow".to_string(),
    }
}

async fn mount_label_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/me/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "labels": [
                {"id": "INBOX", "name": "INBOX", "type": "system"},
                {"id": "SENT", "name": "SENT", "type": "system"},
                {"id": "Label_1", "name": "Receipts", "type": "user"}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_groups_labels_by_origin() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_label_listing(&server).await;

    let mailbox = mailbox_against(&server, &dir).await;
    let inventory = mailbox.list_labels().await.unwrap();

    assert_eq!(inventory.total, 3);
    assert_eq!(inventory.system.len(), 2);
    assert_eq!(inventory.user.len(), 1);
    assert_eq!(inventory.user[0].name.as_deref(), Some("Receipts"));
}

#[tokio::test]
async fn find_label_is_case_insensitive() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_label_listing(&server).await;

    let mailbox = mailbox_against(&server, &dir).await;
    let found = mailbox.find_label("receipts").await.unwrap();
    assert_eq!(found.unwrap().id.as_deref(), Some("Label_1"));
}

#[tokio::test]
async fn get_or_create_returns_existing_label_without_creating() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_label_listing(&server).await;
    // No POST mock mounted: a create attempt would fail the test.

    let mailbox = mailbox_against(&server, &dir).await;
    let label = mailbox
        .get_or_create_label(label_request("Receipts"))
        .await
        .unwrap();
    assert_eq!(label.id.as_deref(), Some("Label_1"));
}

#[tokio::test]
async fn get_or_create_creates_missing_label() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_label_listing(&server).await;

    Mock::given(method("POST"))
        .and(path("/users/me/labels"))
        .and(body_string_contains("Invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "Label_2",
            "name": "Invoices",
            "type": "user"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mailbox = mailbox_against(&server, &dir).await;
    let label = mailbox
        .get_or_create_label(label_request("Invoices"))
        .await
        .unwrap();
    assert_eq!(label.id.as_deref(), Some("Label_2"));
}

#[tokio::test]
async fn deleting_a_system_label_is_refused_locally() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/users/me/labels/INBOX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "INBOX",
            "name": "INBOX",
            "type": "system"
        })))
        .expect(1)
        .mount(&server)
        .await;
    // No DELETE mock: the refusal must happen before any delete request.

    let mailbox = mailbox_against(&server, &dir).await;
    let err = mailbox.delete_label("INBOX").await.unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}

#[tokio::test]
async fn deleting_a_user_label_succeeds() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/users/me/labels/Label_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "Label_1",
            "name": "Receipts",
            "type": "user"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/users/me/labels/Label_1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mailbox = mailbox_against(&server, &dir).await;
    let label = mailbox.delete_label("Label_1").await.unwrap();
    assert_eq!(label.name.as_deref(), Some("Receipts"));
}

#[tokio::test]
async fn update_label_puts_new_spec() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("PUT"))
        .and(path("/users/me/labels/Label_1"))
        .and(body_string_contains("Archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "Label_1",
            "name": "Archive",
            "type": "user"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mailbox = mailbox_against(&server, &dir).await;
    let label = mailbox
        .update_label("Label_1", label_request("Archive"))
        .await
        .unwrap();
    assert_eq!(label.name.as_deref(), Some("Archive"));
}

#[tokio::test]
async fn missing_label_surfaces_request_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/users/me/labels/Label_404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("label not found"))
        .expect(1)
        .mount(&server)
        .await;

    let mailbox = mailbox_against(&server, &dir).await;
    let err = mailbox.delete_label("Label_404").await.unwrap_err();
    assert_eq!(err.kind(), "request_rejected");
}
