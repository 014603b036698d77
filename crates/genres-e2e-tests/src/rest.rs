use anyhow::{Result, ensure};
use genres_dal::genre::Genre;
use reqwest::Url;
use serde_json::json;

use crate::extend_url;

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Genre> {
    let payload = json!({"name": name});
    let api_url = extend_url(base_url, "genres")?;

    let response = client.post(api_url).json(&payload).send().await?;
    ensure!(
        response.status().as_u16() == 201,
        "Unexpected status {}",
        response.status()
    );

    let new_genre: Genre = response.json().await?;
    Ok(new_genre)
}

pub async fn count_genres(client: &reqwest::Client, base_url: &Url) -> Result<u64> {
    let response = client
        .get(extend_url(base_url, "genres/count")?)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}
