use std::fmt;

use crate::models::ConversationId;

/// The two views of the app, addressable by path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Compose,
    Conversation(ConversationId),
}

impl Route {
    /// Parses a location path. Anything unrecognised falls back to compose.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["chat", id] => Route::Conversation(ConversationId::new(*id)),
            _ => Route::Compose,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Compose => "/".to_string(),
            Route::Conversation(id) => format!("/chat/{id}"),
        }
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        match self {
            Route::Conversation(id) => Some(id),
            Route::Compose => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::from_path("/"), Route::Compose);
        assert_eq!(Route::from_path(""), Route::Compose);
        assert_eq!(Route::from_path("/chat/665f1c"), Route::Conversation("665f1c".into()));
        assert_eq!(Route::from_path("/chat/665f1c/?tab=1"), Route::Conversation("665f1c".into()));
    }

    #[test]
    fn unknown_paths_fall_back_to_compose() {
        assert_eq!(Route::from_path("/chat"), Route::Compose);
        assert_eq!(Route::from_path("/chat/a/b"), Route::Compose);
        assert_eq!(Route::from_path("/settings"), Route::Compose);
    }

    #[test]
    fn path_round_trip() {
        let route = Route::Conversation("42".into());
        assert_eq!(route.path(), "/chat/42");
        assert_eq!(Route::from_path(&route.path()), route);
        assert_eq!(Route::Compose.to_string(), "/");
    }
}
