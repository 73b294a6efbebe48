mod common;

use serde_json::Value;

#[tokio::test]
async fn stats_require_admin() {
    let app = common::spawn_app().await;
    let (_, token) = common::mint_user("peeker");

    let resp = app
        .client
        .get(app.url("/admin/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app.client.get(app.url("/admin/stats")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn stats_count_published_content_and_authors() {
    let app = common::spawn_app().await;
    let (_, admin_token) = common::mint_admin("statadmin");
    let (_, writer_a) = common::mint_user("writer");
    let (_, writer_b) = common::mint_user("writer");
    let category_id = common::create_test_category(&app, &admin_token).await;

    let post_a = common::create_test_post(&app, &writer_a, category_id, "A's post").await;
    common::create_test_post(&app, &writer_b, category_id, "B's post").await;
    common::create_test_reply(&app, &writer_b, post_a, None).await;

    let deleted = common::create_test_post(&app, &writer_a, category_id, "Short lived").await;
    app.client
        .delete(app.url(&format!("/posts/{}", deleted)))
        .bearer_auth(&writer_a)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/admin/stats"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["data"]["total_posts"], 2);
    assert_eq!(body["data"]["total_replies"], 1);
    assert_eq!(body["data"]["total_users"], 2);
    assert_eq!(body["data"]["active_users"], 2);

    let top = body["data"]["top_categories"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["id"].as_i64().unwrap() as i32, category_id);
}
