//! Access policy for the appointment workflow.
//!
//! Every appointment-touching operation goes through one of these checks.
//! Staff see and transition everything; clients see only rows they own and
//! may only create. The route layer rejects unauthenticated requests before
//! any of this runs, so a [`Principal`] always refers to a real account.

use crate::db::User;

/// The authenticated actor behind a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub is_staff: bool,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        }
    }
}

/// Which appointment rows a principal may observe. Applied as a query
/// filter in the repository, so a client can never see another client's
/// rows through any listing, detail, or count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    OwnedBy(i32),
}

#[must_use]
pub fn visible_appointments(principal: &Principal) -> VisibilityScope {
    if principal.is_staff {
        VisibilityScope::All
    } else {
        VisibilityScope::OwnedBy(principal.id)
    }
}

/// Only staff may move an appointment between statuses.
#[must_use]
pub const fn can_transition_status(principal: &Principal) -> bool {
    principal.is_staff
}

/// Clients book through the public workflow; staff manage records directly
/// and never self-book.
#[must_use]
pub const fn can_create_appointment(principal: &Principal) -> bool {
    !principal.is_staff
}

/// Where to send a principal after login.
#[must_use]
pub const fn default_next_page(principal: &Principal) -> &'static str {
    if principal.is_staff { "manage" } else { "dashboard" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i32) -> Principal {
        Principal {
            id,
            username: format!("client{id}"),
            is_staff: false,
        }
    }

    fn staff() -> Principal {
        Principal {
            id: 1,
            username: "admin".to_string(),
            is_staff: true,
        }
    }

    #[test]
    fn test_staff_sees_everything() {
        assert_eq!(visible_appointments(&staff()), VisibilityScope::All);
    }

    #[test]
    fn test_client_sees_only_owned_rows() {
        assert_eq!(
            visible_appointments(&client(42)),
            VisibilityScope::OwnedBy(42)
        );
    }

    #[test]
    fn test_only_staff_transition_status() {
        assert!(can_transition_status(&staff()));
        assert!(!can_transition_status(&client(7)));
    }

    #[test]
    fn test_staff_never_self_book() {
        assert!(!can_create_appointment(&staff()));
        assert!(can_create_appointment(&client(7)));
    }

    #[test]
    fn test_next_page_by_role() {
        assert_eq!(default_next_page(&staff()), "manage");
        assert_eq!(default_next_page(&client(7)), "dashboard");
    }
}
