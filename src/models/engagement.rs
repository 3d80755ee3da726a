use serde::{Deserialize, Serialize};

/// The two-state machine behind every toggleable marker (upvote, bookmark,
/// follow). `Active` means the marker row exists. A toggle is the only
/// transition and flips the state both ways.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Active,
    Inactive,
}

impl ToggleState {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

#[derive(Debug, Serialize)]
pub struct UpvoteToggleResponse {
    pub state: ToggleState,
    pub upvote_count: i64,
}

#[derive(Debug, Serialize)]
pub struct BookmarkToggleResponse {
    pub state: ToggleState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_both_ways() {
        assert_eq!(ToggleState::Inactive.toggled(), ToggleState::Active);
        assert_eq!(ToggleState::Active.toggled(), ToggleState::Inactive);
    }

    #[test]
    fn test_double_toggle_is_identity() {
        for state in [ToggleState::Active, ToggleState::Inactive] {
            assert_eq!(state.toggled().toggled(), state);
        }
    }

    #[test]
    fn test_from_exists() {
        assert!(ToggleState::from_exists(true).is_active());
        assert!(!ToggleState::from_exists(false).is_active());
    }
}
