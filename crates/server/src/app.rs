use crate::{
    doc::ApiDoc,
    routes::{health, mutation, report, root},
    state::AppState,
};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

/// Builds the full application router, including the Swagger UI
pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(root::root))
        .routes(routes!(health::health))
        .routes(routes!(mutation::submit_mutation))
        .routes(routes!(report::get_catalog))
        .routes(routes!(report::get_degree_roster))
        .routes(routes!(report::get_degree_courses))
        .routes(routes!(report::get_course_objectives))
        .routes(routes!(report::get_course_sections))
        .routes(routes!(report::get_instructor_sections))
        .routes(routes!(report::get_evaluation_rollup))
        .routes(routes!(report::get_non_f_report))
        .routes(routes!(report::get_worksheet))
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .with_state(state)
}
