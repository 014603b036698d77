use genres_dal::genre::Genre;
use genres_e2e_tests::{
    extend_url, launch_env, prepare_env,
    rest::{count_genres, create_genre},
};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_genre_crud() {
    let (args, _config_guard) = prepare_env("test_genre_crud").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _token) = launch_env(args).await.unwrap();

    let response = client
        .post(extend_url(&base_url, "genres").unwrap())
        .json(&json!({"name": "Sci-Fi"}))
        .send()
        .await
        .unwrap();
    info!("Create response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let genre: Genre = response.json().await.unwrap();
    assert_eq!(genre.name, "Sci-Fi");
    assert_eq!(location, format!("/genres/{}", genre.id));

    let genre_url = extend_url(&base_url, &location).unwrap();
    let response = client.get(genre_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let fetched: Genre = response.json().await.unwrap();
    assert_eq!(genre, fetched);

    let response = client
        .put(extend_url(&base_url, "genres").unwrap())
        .json(&json!({"id": genre.id, "name": "Science Fiction"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(response.headers().get("location").unwrap(), location.as_str());

    let fetched: Genre = client
        .get(genre_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.name, "Science Fiction");

    let response = client.delete(genre_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(genre_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.delete(genre_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
#[traced_test]
async fn test_genre_paging() {
    let (args, _config_guard) = prepare_env("test_genre_paging").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _token) = launch_env(args).await.unwrap();

    let first = create_genre(&client, &base_url, "Drama").await.unwrap();
    let second = create_genre(&client, &base_url, "Comedy").await.unwrap();

    let list_url = extend_url(&base_url, "genres/list").unwrap();
    let list = |query: &'static [(&'static str, &'static str)]| {
        let request = client.get(list_url.clone()).query(query);
        async move {
            let response = request.send().await.unwrap();
            assert!(response.status().is_success());
            response.json::<Vec<Genre>>().await.unwrap()
        }
    };

    let genres = list(&[]).await;
    assert_eq!(genres, vec![first.clone(), second.clone()]);

    let genres = list(&[("page", "0"), ("size", "1")]).await;
    assert_eq!(genres, vec![first.clone()]);

    let genres = list(&[("page", "1"), ("size", "1")]).await;
    assert_eq!(genres, vec![second.clone()]);

    let genres = list(&[("page", "2"), ("size", "1")]).await;
    assert!(genres.is_empty());

    let genres = list(&[("sort", "name")]).await;
    assert_eq!(genres, vec![second.clone(), first.clone()]);

    let genres = list(&[("sort", "id,desc")]).await;
    assert_eq!(genres, vec![second, first]);

    let response = client
        .get(list_url.clone())
        .query(&[("sort", "unknown")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .get(list_url)
        .query(&[("size", "0")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
#[traced_test]
async fn test_genre_rollback() {
    let (args, _config_guard) = prepare_env("test_genre_rollback").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _token) = launch_env(args).await.unwrap();

    create_genre(&client, &base_url, "Horror").await.unwrap();
    assert_eq!(count_genres(&client, &base_url).await.unwrap(), 1);

    let response = client
        .post(extend_url(&base_url, "genres/ex").unwrap())
        .json(&json!({"name": "Never stored"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(count_genres(&client, &base_url).await.unwrap(), 1);

    let genres: Vec<Genre> = client
        .get(extend_url(&base_url, "genres/list").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(genres.iter().all(|g| g.name != "Never stored"));

    let response = client
        .post(extend_url(&base_url, "genres").unwrap())
        .json(&json!({"name": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}
