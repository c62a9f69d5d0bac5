use std::fmt;

/// A chat the bot's account has joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: String,
    pub name: String,
    pub is_group: bool,
}

impl Chat {
    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_group: true,
        }
    }

    pub fn direct(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_group: false,
        }
    }

    /// Exact match on the trimmed display name, groups only
    pub fn is_named_group(&self, name: &str) -> bool {
        self.is_group && self.name.trim() == name.trim()
    }
}

impl fmt::Display for Chat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
