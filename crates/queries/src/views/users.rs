use domain::User;
use serde::Deserialize;

use crate::search::{SearchTerm, matches};

/// Filters for the user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl UserListQuery {
    /// Free-text match over name and email.
    pub fn matches(&self, user: &User) -> bool {
        matches(
            SearchTerm::parse(self.search.as_deref()).as_ref(),
            &[&user.name, &user.email],
        )
    }
}
