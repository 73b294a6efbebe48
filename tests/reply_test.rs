mod common;

use serde_json::Value;

#[tokio::test]
async fn reply_bumps_count_and_last_reply_at() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("replier");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Discuss").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "First!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["content"], "First!");
    assert_eq!(body["data"]["is_author"], true);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["reply_count"], 1);
    assert!(!body["data"]["last_reply_at"].is_null());
}

#[tokio::test]
async fn reply_by_another_user_is_not_flagged_as_author() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, author_token) = common::mint_user("opauthor");
    let (_, other_token) = common::mint_user("visitor");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &author_token, category_id, "Thread").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({ "content": "Passing by" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_author"], false);
}

#[tokio::test]
async fn locked_post_rejects_replies() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("replier");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Quiet please").await;

    app.client
        .put(app.url(&format!("/posts/{}/lock", post_id)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "locked": true }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "Too late" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 423);
}

#[tokio::test]
async fn parent_must_belong_to_same_post() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("replier");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_a = common::create_test_post(&app, &token, category_id, "Post A").await;
    let post_b = common::create_test_post(&app, &token, category_id, "Post B").await;
    let reply_in_a = common::create_test_reply(&app, &token, post_a, None).await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_b)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "Cross-thread", "parent_id": reply_in_a }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn missing_parent_fails() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("replier");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Solo").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "Reply to ghost", "parent_id": 999999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn nested_replies_list_one_level_at_a_time() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("nester");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Tree").await;

    let top = common::create_test_reply(&app, &token, post_id, None).await;
    let child = common::create_test_reply(&app, &token, post_id, Some(top)).await;

    // Top level listing contains only the root
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/replies", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, top);

    // Children listing contains the nested reply
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/replies?parent_id={}", post_id, top)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, child);
}

#[tokio::test]
async fn delete_reply_decrements_count_and_keeps_children() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("pruner");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Orphans").await;

    let top = common::create_test_reply(&app, &token, post_id, None).await;
    let child = common::create_test_reply(&app, &token, post_id, Some(top)).await;

    let resp = app
        .client
        .delete(app.url(&format!("/replies/{}", top)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Only the deleted reply leaves the count
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["reply_count"], 1);

    // The child stays listable under its tombstoned parent
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/replies?parent_id={}", post_id, top)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, child);
}

#[tokio::test]
async fn non_author_cannot_delete_reply() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("owner");
    let (_, other_token) = common::mint_user("intruder");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Guarded").await;
    let reply_id = common::create_test_reply(&app, &token, post_id, None).await;

    let resp = app
        .client
        .delete(app.url(&format!("/replies/{}", reply_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn empty_reply_content_rejected() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("replyadmin");
    let (_, token) = common::mint_user("mute");
    let category_id = common::create_test_category(&app, &admin_token).await;
    let post_id = common::create_test_post(&app, &token, category_id, "Say something").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
