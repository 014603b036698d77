use genres_e2e_tests::{prepare_env, spawn_server};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard) = prepare_env("server-health").await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();

    let response = reqwest::get(base_url.join("health").unwrap())
        .await
        .unwrap();
    assert!(response.status().is_success());
}
