use utoipa::OpenApi;

/// API Documentation
///
/// Paths are registered by the router in `app.rs`.
#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Mutations", description = "Guarded, transactional changes to the curriculum ledger"),
        (name = "Reports", description = "Read-only curriculum and evaluation reports"),
    ),
    info(
        title = "Curriculum Ledger API",
        version = "1.0.0",
        description = "Accreditation curriculum and outcome evaluation records",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
