use serde::Serialize;
use utoipa::ToSchema;

/// Links to the top-level collections.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiRoot {
    pub users: String,
    pub locations: String,
    pub games: String,
    pub messages: String,
    pub profiles: String,
}

impl ApiRoot {
    /// Build absolute links below `http://{site_domain}`.
    pub fn new(site_domain: &str) -> Self {
        let link = |path: &str| format!("http://{site_domain}/{path}/");
        Self {
            users: link("user"),
            locations: link("location"),
            games: link("game"),
            messages: link("message"),
            profiles: link("profile"),
        }
    }
}
