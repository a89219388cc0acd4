use std::time::{SystemTime, UNIX_EPOCH};

use blogpost_client::{BlogClient, BlogClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("BLOGPOST_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn unconfirmed_account_cannot_login() {
    let mut client = BlogClient::new(base_url()).expect("client must build");

    let suffix = unique_suffix();
    let username = format!("user_{suffix}");
    let email = format!("user_{suffix}@example.com");
    let password = "password123";

    let user = client
        .register("Smoke Test", &username, &email, password)
        .await
        .expect("register must succeed");
    assert_eq!(user.username, username);
    assert!(user.is_active);

    let err = client
        .login(&username, password)
        .await
        .expect_err("unconfirmed login must be rejected");
    assert!(matches!(err, BlogClientError::Forbidden(_)));
    assert!(client.access_token().is_none());

    client
        .list_posts(0, 10)
        .await
        .expect("public listing must succeed");
}

/// Needs an already confirmed account: BLOGPOST_USERNAME / BLOGPOST_PASSWORD.
#[tokio::test]
#[ignore = "requires running HTTP server, database and a confirmed account"]
async fn confirmed_account_publishes_and_comments() {
    let username = std::env::var("BLOGPOST_USERNAME").expect("BLOGPOST_USERNAME must be set");
    let password = std::env::var("BLOGPOST_PASSWORD").expect("BLOGPOST_PASSWORD must be set");
    let mut client = BlogClient::new(base_url()).expect("client must build");

    let tokens = client
        .login(&username, &password)
        .await
        .expect("login must succeed");
    assert_eq!(tokens.token_type, "Bearer");

    let refreshed = client.refresh().await.expect("refresh must succeed");
    assert!(!refreshed.is_empty());

    let title = format!("smoke {}", unique_suffix());
    let created = client
        .create_post(&title, "smoke body")
        .await
        .expect("create_post must succeed");
    assert_eq!(created.title, title);

    let by_slug = client
        .get_post(&created.slug)
        .await
        .expect("get_post by slug must succeed");
    assert_eq!(by_slug.id, created.id);
    assert_eq!(by_slug.author.username, username);

    let comment = client
        .add_comment(created.id, "first!")
        .await
        .expect("add_comment must succeed");
    let comments = client
        .list_comments(created.id)
        .await
        .expect("list_comments must succeed");
    assert!(comments.iter().any(|c| c.id == comment.id));

    let updated = client
        .update_post(created.id, "smoke body updated")
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.body, "smoke body updated");
    assert_eq!(updated.slug, created.slug);

    let mine = client.my_posts(0, 50).await.expect("my_posts must succeed");
    assert!(mine.posts.iter().any(|p| p.id == created.id));

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");
    let after_delete = client.get_post(&created.id.to_string()).await;
    assert!(matches!(after_delete, Err(BlogClientError::NotFound(_))));

    let draft = client
        .create_draft("draft title", "draft body")
        .await
        .expect("create_draft must succeed");
    let patched = client
        .update_draft(draft.id, None, Some("patched"))
        .await
        .expect("update_draft must succeed");
    assert_eq!(patched.title, "draft title");
    assert_eq!(patched.body, "patched");
    client
        .delete_draft(draft.id)
        .await
        .expect("delete_draft must succeed");
}
