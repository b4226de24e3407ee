//! Profile Commands
//!
//! User directory and read-only profile pages.

use serde::Serialize;

use crate::domain::{Board, DomainResult, UserId, UserProfile};
use crate::AppState;

/// Someone else's page: their profile and board, not editable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub board: Board,
    /// True when the viewer is the profile owner
    pub is_own: bool,
}

/// Every known user, oldest account first
pub async fn list_profiles(state: &AppState) -> DomainResult<Vec<UserProfile>> {
    state.bridge.list_profiles().await
}

pub async fn view_profile(state: &AppState, user_id: &str) -> DomainResult<ProfileView> {
    let user = UserId::new(user_id);
    let (profile, board) = state.bridge.load_public(&user).await?;
    let is_own = state.session.current_user().as_ref() == Some(&user);
    Ok(ProfileView {
        profile,
        board,
        is_own,
    })
}
