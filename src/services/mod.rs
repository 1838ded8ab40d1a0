/// Goalie applications to games.
pub mod assignment;
/// Token authentication, password hashing and activation links.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game listing, publishing and the versioned save shared by slot changes.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Rink management.
pub mod location_service;
/// Renter and goalie conversations.
pub mod message_service;
/// Outgoing email channel.
pub mod notifier;
/// Goalie profile updates.
pub mod profile_service;
/// Goalies withdrawing from games.
pub mod release;
/// Storage connection supervisor with exponential backoff.
pub mod storage_supervisor;
/// Accounts and registration.
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;
