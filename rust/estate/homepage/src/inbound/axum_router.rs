//! HTTP surface for the homepage. The public router is read only, the admin
//! router edits listings and toggles what is featured.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    model::{
        Blog, BlogDraft, Homepage, HomepageError, HomepageItem, HomepageSlots, ItemKind,
        ListFilter, Property, PropertyDraft,
    },
    ports::HomepageService,
};


/// Query parameters accepted by the list endpoints
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only return listings with this featured flag
    #[serde(default)]
    pub is_on_home_page: Option<bool>,
    /// Page size. Defaults to 20. Max 100.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Number of listings to skip
    #[serde(default)]
    pub offset: Option<u32>,
}

impl From<ListParams> for ListFilter {
    fn from(params: ListParams) -> Self {
        ListFilter::new(params.is_on_home_page, params.limit, params.offset)
    }
}

/// Body of the homepage toggle endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetFeaturedRequest {
    /// The desired featured state
    pub is_on_home_page: bool,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable message
    pub message: String,
}

/// JSON request body, rejected with an [ErrorResponse]
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(HomepageHandlerErr))]
pub struct JsonBody<T>(pub T);

/// The listing id in the path, rejected with an [ErrorResponse]
#[derive(Debug, Deserialize, FromRequestParts)]
#[serde(transparent)]
#[from_request(via(Path), rejection(HomepageHandlerErr))]
pub struct ListingId(pub Uuid);

/// List query string, rejected with an [ErrorResponse]
#[derive(Debug, Deserialize, FromRequestParts)]
#[serde(transparent)]
#[from_request(via(Query), rejection(HomepageHandlerErr))]
pub struct ListQuery(pub ListParams);

/// State shared by the homepage routers
pub struct HomepageRouterState<T> {
    service: Arc<T>,
}

impl<T> Clone for HomepageRouterState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<T> HomepageRouterState<T>
where
    T: HomepageService,
{
    /// Wraps a service for use as router state
    pub fn new(service: T) -> Self {
        HomepageRouterState {
            service: Arc::new(service),
        }
    }
}

/// Read only routes used by the public site
pub fn public_router<T, S>(state: HomepageRouterState<T>) -> Router<S>
where
    T: HomepageService,
    S: Send + Sync,
{
    Router::new()
        .route("/homepage", get(get_homepage_handler))
        .route("/properties", get(list_properties_handler))
        .route("/properties/:id", get(get_property_handler))
        .route("/blogs", get(list_blogs_handler))
        .route("/blogs/:id", get(get_blog_handler))
        .with_state(state)
}

/// Routes used by the admin dashboard. Callers are expected to layer authentication on top.
pub fn admin_router<T, S>(state: HomepageRouterState<T>) -> Router<S>
where
    T: HomepageService,
    S: Send + Sync,
{
    Router::new()
        .route(
            "/properties",
            get(list_properties_handler).post(create_property_handler),
        )
        .route(
            "/properties/:id",
            get(get_property_handler)
                .put(update_property_handler)
                .delete(delete_property_handler),
        )
        .route(
            "/properties/:id/homepage",
            put(set_property_featured_handler),
        )
        .route("/blogs", get(list_blogs_handler).post(create_blog_handler))
        .route(
            "/blogs/:id",
            get(get_blog_handler)
                .put(update_blog_handler)
                .delete(delete_blog_handler),
        )
        .route("/blogs/:id/homepage", put(set_blog_featured_handler))
        .route("/homepage/slots", get(get_slots_handler))
        .with_state(state)
}

/// Errors surfaced by the homepage handlers
#[derive(Debug, Error)]
pub enum HomepageHandlerErr {
    /// Error coming out of the service
    #[error(transparent)]
    Homepage(#[from] HomepageError),
    /// Malformed JSON body
    #[error(transparent)]
    JsonErr(#[from] JsonRejection),
    /// Malformed path parameter
    #[error(transparent)]
    PathErr(#[from] PathRejection),
    /// Malformed query string
    #[error(transparent)]
    QueryErr(#[from] QueryRejection),
}

impl IntoResponse for HomepageHandlerErr {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            HomepageHandlerErr::Homepage(err) => err,
            HomepageHandlerErr::JsonErr(rejection) => {
                return rejection_response(rejection.status(), rejection.body_text());
            }
            HomepageHandlerErr::PathErr(rejection) => {
                return rejection_response(rejection.status(), rejection.body_text());
            }
            HomepageHandlerErr::QueryErr(rejection) => {
                return rejection_response(rejection.status(), rejection.body_text());
            }
        };
        let (status, message) = match &err {
            HomepageError::CapacityExceeded { .. } => (StatusCode::CONFLICT, err.to_string()),
            HomepageError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            HomepageError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            HomepageError::StorageLayerError(e) => {
                tracing::error!(error=?e, "homepage storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error has occurred".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

fn rejection_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(ErrorResponse { message })).into_response()
}

/// Everything currently featured on the homepage
#[utoipa::path(
    get,
    operation_id = "get_homepage",
    path = "/homepage",
    responses(
        (status = 200, body = Homepage),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn get_homepage_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
) -> Result<Json<Homepage>, HomepageHandlerErr> {
    Ok(Json(state.service.homepage().await?))
}

/// Lists properties, newest first
#[utoipa::path(
    get,
    operation_id = "list_properties",
    path = "/properties",
    params(ListParams),
    responses(
        (status = 200, body = Vec<Property>),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn list_properties_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListQuery(params): ListQuery,
) -> Result<Json<Vec<Property>>, HomepageHandlerErr> {
    Ok(Json(state.service.list_properties(params.into()).await?))
}

/// Gets a single property
#[utoipa::path(
    get,
    operation_id = "get_property",
    path = "/properties/{id}",
    params(("id" = Uuid, Path, description = "Property id")),
    responses(
        (status = 200, body = Property),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn get_property_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
) -> Result<Json<Property>, HomepageHandlerErr> {
    Ok(Json(state.service.get_property(id).await?))
}

/// Creates a property, never featured
#[utoipa::path(
    post,
    operation_id = "create_property",
    path = "/admin/properties",
    request_body = PropertyDraft,
    responses(
        (status = 201, body = Property),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn create_property_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    JsonBody(draft): JsonBody<PropertyDraft>,
) -> Result<(StatusCode, Json<Property>), HomepageHandlerErr> {
    let property = state.service.create_property(draft).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// Replaces the editable fields of a property
#[utoipa::path(
    put,
    operation_id = "update_property",
    path = "/admin/properties/{id}",
    params(("id" = Uuid, Path, description = "Property id")),
    request_body = PropertyDraft,
    responses(
        (status = 200, body = Property),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn update_property_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
    JsonBody(draft): JsonBody<PropertyDraft>,
) -> Result<Json<Property>, HomepageHandlerErr> {
    Ok(Json(state.service.update_property(id, draft).await?))
}

/// Deletes a property
#[utoipa::path(
    delete,
    operation_id = "delete_property",
    path = "/admin/properties/{id}",
    params(("id" = Uuid, Path, description = "Property id")),
    responses(
        (status = 204),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn delete_property_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
) -> Result<StatusCode, HomepageHandlerErr> {
    state.service.delete_property(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Puts a property on the homepage or takes it off
#[utoipa::path(
    put,
    operation_id = "set_property_featured",
    path = "/admin/properties/{id}/homepage",
    params(("id" = Uuid, Path, description = "Property id")),
    request_body = SetFeaturedRequest,
    responses(
        (status = 200, body = HomepageItem),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse, description = "The homepage already shows the maximum number of properties"),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn set_property_featured_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
    JsonBody(req): JsonBody<SetFeaturedRequest>,
) -> Result<Json<HomepageItem>, HomepageHandlerErr> {
    let item = state
        .service
        .set_featured(ItemKind::Property, id, req.is_on_home_page)
        .await?;
    Ok(Json(item))
}

/// Lists blogs, newest first
#[utoipa::path(
    get,
    operation_id = "list_blogs",
    path = "/blogs",
    params(ListParams),
    responses(
        (status = 200, body = Vec<Blog>),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn list_blogs_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListQuery(params): ListQuery,
) -> Result<Json<Vec<Blog>>, HomepageHandlerErr> {
    Ok(Json(state.service.list_blogs(params.into()).await?))
}

/// Gets a single blog
#[utoipa::path(
    get,
    operation_id = "get_blog",
    path = "/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, body = Blog),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn get_blog_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
) -> Result<Json<Blog>, HomepageHandlerErr> {
    Ok(Json(state.service.get_blog(id).await?))
}

/// Creates a blog, never featured
#[utoipa::path(
    post,
    operation_id = "create_blog",
    path = "/admin/blogs",
    request_body = BlogDraft,
    responses(
        (status = 201, body = Blog),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn create_blog_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    JsonBody(draft): JsonBody<BlogDraft>,
) -> Result<(StatusCode, Json<Blog>), HomepageHandlerErr> {
    let blog = state.service.create_blog(draft).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// Replaces the editable fields of a blog
#[utoipa::path(
    put,
    operation_id = "update_blog",
    path = "/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = BlogDraft,
    responses(
        (status = 200, body = Blog),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn update_blog_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
    JsonBody(draft): JsonBody<BlogDraft>,
) -> Result<Json<Blog>, HomepageHandlerErr> {
    Ok(Json(state.service.update_blog(id, draft).await?))
}

/// Deletes a blog
#[utoipa::path(
    delete,
    operation_id = "delete_blog",
    path = "/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 204),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn delete_blog_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
) -> Result<StatusCode, HomepageHandlerErr> {
    state.service.delete_blog(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Puts a blog on the homepage or takes it off
#[utoipa::path(
    put,
    operation_id = "set_blog_featured",
    path = "/admin/blogs/{id}/homepage",
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = SetFeaturedRequest,
    responses(
        (status = 200, body = HomepageItem),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse, description = "The homepage already shows the maximum number of blogs"),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn set_blog_featured_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
    ListingId(id): ListingId,
    JsonBody(req): JsonBody<SetFeaturedRequest>,
) -> Result<Json<HomepageItem>, HomepageHandlerErr> {
    let item = state
        .service
        .set_featured(ItemKind::Blog, id, req.is_on_home_page)
        .await?;
    Ok(Json(item))
}

/// Slot usage per kind, for the admin dashboard
#[utoipa::path(
    get,
    operation_id = "get_homepage_slots",
    path = "/admin/homepage/slots",
    responses(
        (status = 200, body = Vec<HomepageSlots>),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state), err)]
pub async fn get_slots_handler<T: HomepageService>(
    State(state): State<HomepageRouterState<T>>,
) -> Result<Json<Vec<HomepageSlots>>, HomepageHandlerErr> {
    Ok(Json(state.service.slots().await?))
}
