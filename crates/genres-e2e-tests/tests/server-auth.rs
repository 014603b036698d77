use genres_e2e_tests::{
    TEST_PASSWORD, TEST_USER, create_test_user, extend_url, prepare_env, spawn_server,
};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_auth() {
    let (args, _config_guard) = prepare_env("test_auth").await.unwrap();
    create_test_user(&args).await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    let genres_url = extend_url(&base_url, "genres/list").unwrap();
    let response = client.get(genres_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );

    let login_url = extend_url(&base_url, "login").unwrap();
    let response = client
        .post(login_url.clone())
        .json(&json!({"username": TEST_USER, "password": "wrong password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(login_url)
        .json(&json!({"username": TEST_USER, "password": TEST_PASSWORD}))
        .send()
        .await
        .unwrap();
    info! {"Login Response: {:#?}", response};
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["username"], TEST_USER);
    assert_eq!(body["expires_in"], 24 * 3600);
    let token = body["access_token"].as_str().unwrap();

    let response = client
        .get(genres_url.clone())
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let genres: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(genres.is_empty());

    let response = client
        .get(genres_url)
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}
