use serde::Serialize;

use super::engagement::ToggleState;

#[derive(Debug, Serialize)]
pub struct FollowToggleResponse {
    pub state: ToggleState,
}
