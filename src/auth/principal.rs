//! The party a request acts on behalf of.

/// Requesting principal: anonymous, or an authenticated user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    User(i64),
}

impl Principal {
    /// The authenticated user id, if any.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Principal::Anonymous => None,
            Principal::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    /// True iff this is the authenticated user `user_id`.
    pub fn is(&self, user_id: i64) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Option<i64>> for Principal {
    fn from(id: Option<i64>) -> Self {
        id.map(Principal::User).unwrap_or(Principal::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_identity() {
        assert!(Principal::User(3).is(3));
        assert!(!Principal::User(3).is(4));
        assert!(!Principal::Anonymous.is(0));
        assert_eq!(Principal::from(None), Principal::Anonymous);
        assert_eq!(Principal::from(Some(7)).user_id(), Some(7));
    }
}
