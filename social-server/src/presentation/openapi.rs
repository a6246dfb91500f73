use utoipa::OpenApi;

use crate::presentation::handlers::auth::HomeDto;
use crate::presentation::handlers::checkin::LocationDto;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::home,
        crate::presentation::handlers::auth::authorize,
        crate::presentation::handlers::auth::callback,
        crate::presentation::handlers::checkin::hello_world
    ),
    components(schemas(HomeDto, LocationDto)),
    tags(
        (name = "auth", description = "OAuth login endpoints"),
        (name = "checkin", description = "Hello World check-in")
    )
)]
pub(crate) struct ApiDoc;
