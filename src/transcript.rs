use chrono::Local;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::Error => "Error",
        }
    }
}

/// One transcript entry. Entries are immutable once appended; the
/// transcript itself only ever grows or is cleared in bulk.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub sources: Vec<String>,
    pub audit_id: Option<String>,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            audit_id: None,
            timestamp: display_timestamp(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<String>, audit_id: String) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            audit_id: Some(audit_id),
            timestamp: display_timestamp(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            content: content.into(),
            sources: Vec::new(),
            audit_id: None,
            timestamp: display_timestamp(),
        }
    }
}

/// Client-side log of completed uploads. Not authoritative: the backend
/// owns ingestion state, this list only mirrors what succeeded this run.
#[derive(Debug, Clone)]
pub struct UploadedFileRecord {
    pub name: String,
    pub id: String,
    pub timestamp: String,
}

/// Outcome message shared between the upload flow and the page shell.
/// Overwritten on every attempt, last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Success(String),
    Error(String),
}

/// Models the backend accepts for `/query`. The wire name is sent verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatModel {
    #[default]
    Llama32,
    Llama2,
    Mistral,
}

impl ChatModel {
    pub const ALL: [ChatModel; 3] = [ChatModel::Llama32, ChatModel::Llama2, ChatModel::Mistral];

    pub fn wire_name(self) -> &'static str {
        match self {
            ChatModel::Llama32 => "llama3.2",
            ChatModel::Llama2 => "llama2",
            ChatModel::Mistral => "mistral",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChatModel::Llama32 => "Llama 3.2",
            ChatModel::Llama2 => "Llama 2",
            ChatModel::Mistral => "Mistral",
        }
    }
}

pub fn display_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
