use crate::{
    auth::token::TokenLayer,
    error::{ApiError, ApiResult},
    repository_from_request,
    rest_api::Paging,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use axum_valid::Garde;
use genres_dal::genre::{CreateGenre, GenreRepository, UpdateGenre};
use http::{header, StatusCode};
use tracing::{debug, warn};

repository_from_request!(GenreRepository);

fn location(id: i64) -> String {
    format!("/genres/{id}")
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Genre", operation_id = "getGenre",
    params(("id" = i64, Path, description = "Genre id")),
    responses((status = 200, description = "Get one", body = genres_dal::genre::Genre),
              (status = 404, description = "Genre does not exist"))))]
pub async fn get_genre(
    Path(id): Path<i64>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/list", tag = "Genre", operation_id = "listGenres",
    params(Paging),
    responses((status = 200, description = "List one page", body = Vec<genres_dal::genre::Genre>))))]
pub async fn list_genres(
    repository: GenreRepository,
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let listing_params = paging.into_listing_params(state.config().default_page_size)?;
    let records = repository.list(listing_params).await?;
    Ok((StatusCode::OK, Json(records)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/count", tag = "Genre", operation_id = "countGenres",
    responses((status = 200, description = "Count", body = u64))))]
pub async fn count_genres(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Genre", operation_id = "createGenre",
    request_body = CreateGenre,
    responses((status = 201, description = "Created Genre", body = genres_dal::genre::Genre))))]
pub async fn create_genre(
    repository: GenreRepository,
    Garde(Json(payload)): Garde<Json<CreateGenre>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;
    debug!("Created genre {}", record.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(record.id))],
        Json(record),
    ))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "", tag = "Genre", operation_id = "updateGenre",
    request_body = UpdateGenre,
    responses((status = 204, description = "Updated Genre"),
              (status = 404, description = "Genre does not exist"))))]
pub async fn update_genre(
    repository: GenreRepository,
    Garde(Json(payload)): Garde<Json<UpdateGenre>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(payload).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::LOCATION, location(record.id))],
    ))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Genre", operation_id = "deleteGenre",
    params(("id" = i64, Path, description = "Genre id")),
    responses((status = 204, description = "Deleted"),
              (status = 404, description = "Genre does not exist"))))]
pub async fn delete_genre(
    Path(id): Path<i64>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Insert is done in a transaction, which always fails and is rolled back,
/// failure is reported as 204 No Content
#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/ex", tag = "Genre", operation_id = "createGenreAborted",
    request_body = CreateGenre,
    responses((status = 204, description = "Insert was rolled back"))))]
pub async fn create_genre_aborted(
    repository: GenreRepository,
    Garde(Json(payload)): Garde<Json<CreateGenre>>,
) -> ApiResult<Response> {
    match repository.create_and_abort(payload).await {
        Ok(record) => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, location(record.id))],
            Json(record),
        )
            .into_response()),
        Err(
            e @ (genres_dal::Error::TransactionAborted(_) | genres_dal::Error::DatabaseError(_)),
        ) => {
            warn!("Genre was not created: {e}");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => Err(ApiError::from(e)),
    }
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(
    get_genre,
    list_genres,
    count_genres,
    create_genre,
    update_genre,
    delete_genre,
    create_genre_aborted
))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

/// Genre routes, all require valid bearer token - must be nested on /genres path!
pub fn router(state: AppState) -> axum::Router<AppState> {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/", post(create_genre).put(update_genre))
        .route("/list", get(list_genres))
        .route("/count", get(count_genres))
        .route("/ex", post(create_genre_aborted))
        .route("/{id}", get(get_genre).delete(delete_genre))
        .route_layer(TokenLayer::new(state))
}
