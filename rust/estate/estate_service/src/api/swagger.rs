use homepage::{
    domain::model::{
        Blog, BlogDraft, Homepage, HomepageItem, HomepageSlots, ItemKind, Property, PropertyDraft,
    },
    inbound::axum_router::{ErrorResponse, ListParams, SetFeaturedRequest},
};
use utoipa::OpenApi;

use crate::api::auth::{LoginRequest, LoginResponse, VerifyResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Public
        homepage::inbound::axum_router::get_homepage_handler,
        homepage::inbound::axum_router::list_properties_handler,
        homepage::inbound::axum_router::get_property_handler,
        homepage::inbound::axum_router::list_blogs_handler,
        homepage::inbound::axum_router::get_blog_handler,
        // Admin
        homepage::inbound::axum_router::create_property_handler,
        homepage::inbound::axum_router::update_property_handler,
        homepage::inbound::axum_router::delete_property_handler,
        homepage::inbound::axum_router::set_property_featured_handler,
        homepage::inbound::axum_router::create_blog_handler,
        homepage::inbound::axum_router::update_blog_handler,
        homepage::inbound::axum_router::delete_blog_handler,
        homepage::inbound::axum_router::set_blog_featured_handler,
        homepage::inbound::axum_router::get_slots_handler,
        // Auth
        crate::api::auth::login_handler,
        crate::api::auth::logout_handler,
        crate::api::auth::verify_handler,
    ),
    components(
        schemas(
            Blog,
            BlogDraft,
            ErrorResponse,
            Homepage,
            HomepageItem,
            HomepageSlots,
            ItemKind,
            ListParams,
            LoginRequest,
            LoginResponse,
            Property,
            PropertyDraft,
            SetFeaturedRequest,
            VerifyResponse,
        )
    ),
    tags(
        (name = "estate service", description = "Listings and homepage curation")
    )
)]
pub struct ApiDoc;
