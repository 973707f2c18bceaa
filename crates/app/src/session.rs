use std::fmt;

/// Opaque server-issued conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// The single active-conversation slot.
///
/// Always replaced wholesale, never mutated in place; at most one session is
/// active at a time and export collaborators are gated on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    current: Option<SessionId>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Wholesale replacement, returning the displaced session if any.
    pub fn replace(&mut self, session: SessionId) -> Option<SessionId> {
        self.current.replace(session)
    }

    /// Reset to no active session (deletion path).
    pub fn clear(&mut self) -> Option<SessionId> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_displaces_the_prior_session() {
        let mut context = SessionContext::new();
        assert!(!context.is_active());

        assert_eq!(context.replace(SessionId::new("a")), None);
        assert_eq!(
            context.replace(SessionId::new("b")),
            Some(SessionId::new("a"))
        );
        assert_eq!(context.id().map(SessionId::as_str), Some("b"));
    }

    #[test]
    fn clear_resets_to_inactive() {
        let mut context = SessionContext::new();
        context.replace(SessionId::new("a"));

        assert_eq!(context.clear(), Some(SessionId::new("a")));
        assert!(!context.is_active());
    }
}
