//! The JSON service surface: envelopes, error classes, listing options.

use std::sync::Arc;
use std::time::Duration;

use pressroom_core::{ConfigError, DraftId, Settings};
use pressroom_github::mock::{MockReply, MockTransport};
use pressroom_github::Method;
use pressroom_publish::{
    ApiResponse, DraftInput, ErrorClass, ListQuery, PublishOptions, PublishRequest, Service,
};
use serde_json::{json, Value};

fn settings() -> Settings {
    let mut settings = Settings::new("octo", "blog", "t");
    settings.api_base = "https://api.example.test".into();
    settings.retry.base_delay = Duration::ZERO;
    settings
}

fn service(mock: &Arc<MockTransport>) -> Service {
    Service::with_transport(Ok(settings()), mock.clone())
}

fn script_listing(mock: &MockTransport, truncated: bool) {
    mock.on(
        Method::Get,
        "/repos/octo/blog/branches/master",
        MockReply::json(200, json!({ "name": "master", "commit": { "sha": "feedface00" } })),
    )
    .on(
        Method::Get,
        "/repos/octo/blog/git/trees/feedface00",
        MockReply::json(
            200,
            json!({
                "sha": "feedface00",
                "truncated": truncated,
                "tree": [
                    { "path": "README.md", "mode": "100644", "type": "blob", "sha": "1", "size": 100 },
                    { "path": "posts/b.md", "mode": "100644", "type": "blob", "sha": "2", "size": 300 },
                    { "path": "posts/a.mkd", "mode": "100644", "type": "blob", "sha": "3", "size": 200 },
                    { "path": "posts", "mode": "040000", "type": "tree", "sha": "4" },
                    { "path": "logo.png", "mode": "100644", "type": "blob", "sha": "5", "size": 9 },
                ],
            }),
        ),
    );
}

#[tokio::test]
async fn missing_configuration_is_a_configuration_error() {
    let service = Service::new(Err(ConfigError::Missing {
        keys: vec!["GITHUB_TOKEN"],
    }));
    let response = service.list_files(ListQuery::default()).await;
    assert_eq!(response.status(), 500);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["kind"], "api_error");
    assert_eq!(json["class"], "configuration");
    assert!(json["error"].as_str().unwrap().contains("GITHUB_TOKEN"));
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn listing_falls_back_branch_and_reports_stats() {
    let mock = Arc::new(MockTransport::new());
    script_listing(&mock, false);

    let response = service(&mock)
        .list_files(ListQuery {
            include_stats: true,
            group_by_folder: true,
            ..ListQuery::default()
        })
        .await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["kind"], "ok");
    assert_eq!(json["branch"], "master");
    assert_eq!(json["commit"], "feedface");
    assert_eq!(json["truncated"], false);
    assert_eq!(json["files"].as_array().unwrap().len(), 3);
    assert_eq!(json["stats"]["markdown_count"], 3);
    assert_eq!(json["stats"]["folders"], 2);
    assert_eq!(json["stats"]["extensions"], json!(["md", "mkd"]));
    assert_eq!(json["stats"]["total_size"], 600);
    assert_eq!(json["stats"]["average_size"], 200);
    let posts: Vec<&str> = json["folders"]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(posts, vec!["a.mkd", "b.md"]);
}

#[tokio::test]
async fn truncated_listing_is_flagged() {
    let mock = Arc::new(MockTransport::new());
    script_listing(&mock, true);

    let response = service(&mock).list_files(ListQuery::default()).await;
    let body = response.into_result().unwrap();
    assert!(body.listing.truncated);
    assert!(body.stats.is_none());
}

#[tokio::test]
async fn size_cap_filters_listing() {
    let mock = Arc::new(MockTransport::new());
    script_listing(&mock, false);

    let body = service(&mock)
        .list_files(ListQuery {
            max_size: Some(250),
            ..ListQuery::default()
        })
        .await
        .into_result()
        .unwrap();
    let paths: Vec<_> = body.listing.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md", "posts/a.mkd"]);
}

#[tokio::test]
async fn no_branch_anywhere_is_an_upstream_error() {
    let mock = Arc::new(MockTransport::new());
    let response = service(&mock).list_files(ListQuery::default()).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["class"], "upstream");
    assert_eq!(json["status"], 502);
    assert!(json["error"].as_str().unwrap().contains("main, master, develop, dev"));
}

#[tokio::test]
async fn read_file_parses_the_document() {
    use base64::Engine;
    let mock = Arc::new(MockTransport::new());
    let text = "---\ntitle: Hello\n---\n\nfour words right here\n";
    mock.on(
        Method::Get,
        "/repos/octo/blog/contents/posts/hello.md",
        MockReply::json(
            200,
            json!({
                "name": "hello.md", "path": "posts/hello.md", "sha": "abc", "size": text.len(),
                "type": "file", "encoding": "base64",
                "content": base64::engine::general_purpose::STANDARD.encode(text),
            }),
        ),
    );

    let body = service(&mock)
        .read_file("posts/hello.md")
        .await
        .into_result()
        .unwrap();
    assert_eq!(body.title, "Hello");
    assert_eq!(body.word_count, 4);
    assert_eq!(body.reading_time_minutes, 1);
    assert_eq!(body.content, text);
}

#[tokio::test]
async fn read_error_carries_the_path() {
    let mock = Arc::new(MockTransport::new());
    let response = service(&mock).read_file("nope.md").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["kind"], "api_error");
    assert_eq!(json["path"], "nope.md");
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn publish_validation_error_names_the_draft() {
    let mock = Arc::new(MockTransport::new());
    let request = PublishRequest {
        draft: DraftInput {
            id: Some(DraftId::from("draft-9")),
            title: "Title".into(),
            content: "   ".into(),
            slug: None,
        },
        options: PublishOptions::default(),
    };

    let response = service(&mock).publish(request).await;
    assert_eq!(response.status(), 400);
    let json: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(json["class"], "validation");
    assert_eq!(json["draft_id"], "draft-9");
    assert_eq!(json["path"], "title.md");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn publish_success_is_an_ok_envelope() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Put,
        "/repos/octo/blog/contents/drafts/launch.md",
        MockReply::json(201, json!({ "content": null, "commit": { "sha": "c0mm1t" } })),
    );
    let request = PublishRequest {
        draft: DraftInput {
            id: Some(DraftId::from("draft-1")),
            title: "Launch".into(),
            content: "We are live.".into(),
            slug: None,
        },
        options: PublishOptions {
            filename: Some("drafts/launch".into()),
            ..PublishOptions::default()
        },
    };

    let response = service(&mock).publish(request).await;
    assert!(response.is_ok());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["kind"], "ok");
    assert_eq!(json["filename"], "drafts/launch.md");
    assert_eq!(json["mode"], "created");
    assert_eq!(json["commit"]["sha"], "c0mm1t");
}

#[tokio::test]
async fn batch_envelope_reports_counts() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Put,
        "/repos/octo/blog/contents/one.md",
        MockReply::json(201, json!({ "content": null, "commit": { "sha": "c1" } })),
    );
    let drafts = vec![
        DraftInput {
            title: "One".into(),
            content: "x".into(),
            ..DraftInput::default()
        },
        DraftInput::default(),
    ];

    let response = service(&mock).publish_batch(drafts).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["kind"], "ok");
    assert_eq!(json["requested"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][0]["status"], "committed");
    assert_eq!(json["results"][1]["status"], "failed");
}

#[tokio::test]
async fn empty_read_many_is_a_validation_error() {
    let mock = Arc::new(MockTransport::new());
    let response = service(&mock).read_many(vec![]).await;
    assert!(matches!(
        response,
        ApiResponse::ApiError(ref err) if err.class == ErrorClass::Validation
    ));
}

#[tokio::test]
async fn delete_looks_up_the_current_hash() {
    let mock = Arc::new(MockTransport::new());
    let path = "/repos/octo/blog/contents/posts/old.md";
    mock.on(
        Method::Get,
        path,
        MockReply::json(
            200,
            json!({ "name": "old.md", "path": "posts/old.md", "sha": "prior", "type": "file" }),
        ),
    )
    .on(
        Method::Delete,
        path,
        MockReply::json(200, json!({ "content": null, "commit": { "sha": "d3l" } })),
    );

    let body = service(&mock)
        .delete_file("posts/old.md", None)
        .await
        .into_result()
        .unwrap();
    assert_eq!(body.commit.sha, "d3l");

    let sent = mock.requests_to(Method::Delete, path);
    let payload: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(payload["sha"], "prior");
    assert_eq!(payload["message"], "Delete post: posts/old.md");
}

#[tokio::test]
async fn deleting_a_missing_file_is_a_validation_error() {
    let mock = Arc::new(MockTransport::new());
    let response = service(&mock).delete_file("ghost.md", None).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["class"], "validation");
    assert_eq!(json["path"], "ghost.md");
    assert_eq!(mock.count(Method::Delete, "/repos/octo/blog/contents/ghost.md"), 0);
}
