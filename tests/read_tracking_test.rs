mod common;

use serde_json::Value;

async fn view_count(app: &common::TestApp, post_id: i32) -> i64 {
    common::query_scalar_i64(
        &app.db,
        "SELECT view_count FROM posts WHERE id = $1",
        vec![post_id.into()],
    )
    .await
}

#[tokio::test]
async fn repeat_reads_by_same_user_count_once() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("readadmin");
    let (_, token) = common::mint_user("reader");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Read me").await;

    for _ in 0..3 {
        let resp = app
            .client
            .get(app.url(&format!("/posts/{}", post_id)))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(view_count(&app, post_id).await, 1);
}

#[tokio::test]
async fn distinct_users_each_count_once() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("readadmin");
    let (_, author_token) = common::mint_user("author");
    let (_, reader_a) = common::mint_user("reader");
    let (_, reader_b) = common::mint_user("reader");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &author_token, category_id, "Shared").await;

    for token in [&reader_a, &reader_b] {
        app.client
            .get(app.url(&format!("/posts/{}", post_id)))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
    }

    assert_eq!(view_count(&app, post_id).await, 2);
}

#[tokio::test]
async fn anonymous_reads_count_every_time() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("readadmin");
    let (_, token) = common::mint_user("author");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Public").await;

    for _ in 0..3 {
        app.client
            .get(app.url(&format!("/posts/{}", post_id)))
            .send()
            .await
            .unwrap();
    }

    assert_eq!(view_count(&app, post_id).await, 3);
}

#[tokio::test]
async fn view_count_is_returned_in_detail() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("readadmin");
    let (_, token) = common::mint_user("author");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Counted").await;

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();

    // The response reflects the read that was just recorded
    assert_eq!(body["data"]["view_count"], 1);
}
