use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Rent A Goalie Back.
#[openapi(
    paths(
        crate::routes::root::api_root,
        crate::routes::health::healthcheck,
        crate::routes::slots::apply,
        crate::routes::slots::release_goalie,
        crate::routes::games::list_games,
        crate::routes::games::create_game,
        crate::routes::games::get_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::locations::list_locations,
        crate::routes::locations::create_location,
        crate::routes::locations::get_location,
        crate::routes::messages::list_messages,
        crate::routes::messages::create_message,
        crate::routes::messages::get_message,
        crate::routes::messages::update_message,
        crate::routes::messages::delete_message,
        crate::routes::profiles::list_profiles,
        crate::routes::profiles::get_profile,
        crate::routes::profiles::update_profile,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::auth::obtain_token,
        crate::routes::auth::activate,
        crate::routes::auth::check_username,
        crate::routes::auth::check_email,
    ),
    components(
        schemas(
            crate::dto::root::ApiRoot,
            crate::dto::health::HealthResponse,
            crate::dto::assignment::SlotRequest,
            crate::dto::assignment::ApplyResult,
            crate::dto::assignment::ApplyResponse,
            crate::dto::assignment::ReleaseResult,
            crate::dto::assignment::ReleaseResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::GameSummary,
            crate::dto::location::CreateLocationRequest,
            crate::dto::location::LocationSummary,
            crate::dto::message::CreateMessageRequest,
            crate::dto::message::UpdateMessageRequest,
            crate::dto::message::MessageSummary,
            crate::dto::profile::UpdateProfileRequest,
            crate::dto::profile::ProfileSummary,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UpdateUserRequest,
            crate::dto::user::UserSummary,
            crate::dto::auth::TokenRequest,
            crate::dto::auth::TokenResponse,
            crate::dto::auth::CheckUsernameRequest,
            crate::dto::auth::CheckEmailRequest,
            crate::dto::auth::UniqueResponse,
        )
    ),
    tags(
        (name = "root", description = "API entry point"),
        (name = "health", description = "Health check endpoints"),
        (name = "slots", description = "Goalies applying to and leaving games"),
        (name = "games", description = "Games published by renters"),
        (name = "locations", description = "Rinks"),
        (name = "messages", description = "Renter and goalie conversations"),
        (name = "profiles", description = "Goalie preferences"),
        (name = "users", description = "Accounts"),
        (name = "auth", description = "Tokens, activation and uniqueness checks"),
    )
)]
/// OpenAPI document of the whole API.
pub struct ApiDoc;
