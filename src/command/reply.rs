use std::path::PathBuf;

/// What the host should send back to the chat.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    /// Path of a freshly written audio file, owned by the host from here on.
    Audio(PathBuf),
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }
}
