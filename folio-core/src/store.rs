//! Shared document storage for editing sessions.
//!
//! Provides a thread-safe [`DocumentStore`] keyed by session id, the hand-off
//! point between an editor session and the public render path. Persistence is
//! optional: with a data directory configured, each session is saved as one
//! JSON file in the canonical dialect, and files written by any earlier
//! generation of the platform are read back through the full dialect adapter.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::dialect;
use crate::node::Document;

/// Default session identifier.
pub const DEFAULT_SESSION: &str = "default";

/// Maximum length for session ids.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session id failed validation.
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted payload matched no known dialect.
    #[error("Unreadable page payload for session {0}")]
    UnreadablePayload(String),
}

/// Check if a character is valid for session ids (alphanumeric, hyphen, or underscore).
fn is_valid_session_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Validate a session id: 1-64 characters, alphanumeric/hyphen/underscore.
///
/// # Errors
///
/// Returns [`StoreError::InvalidSessionId`] when the id is empty, too long,
/// or carries other characters.
pub fn validate_session_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN || !id.chars().all(is_valid_session_char) {
        return Err(StoreError::InvalidSessionId(id.to_string()));
    }
    Ok(())
}

/// Thread-safe document storage keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<HashMap<String, Document>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl DocumentStore {
    /// Create an in-memory store with no persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisting sessions as JSON files in `data_dir`.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            data_dir: Some(data_dir),
        })
    }

    /// Get a session's document, if loaded.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Document> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.get(session_id).cloned()
    }

    /// Store a session's document, replacing any previous one, and persist it
    /// when a data directory is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSessionId`] for a bad session id,
    /// [`StoreError::Serialization`] if the document cannot be encoded, or
    /// [`StoreError::Io`] if the file cannot be written.
    pub fn put(&self, session_id: &str, document: Document) -> Result<(), StoreError> {
        validate_session_id(session_id)?;
        if let Some(data_dir) = &self.data_dir {
            let payload = document
                .to_canonical_json()
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            std::fs::write(data_dir.join(format!("{session_id}.json")), payload)?;
        }
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.insert(session_id.to_string(), document);
        Ok(())
    }

    /// Remove a session from memory (and disk, when persisted).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] if the session is unknown.
    pub fn remove(&self, session_id: &str) -> Result<Document, StoreError> {
        let removed = {
            let mut documents = self
                .documents
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            documents.remove(session_id)
        };
        let Some(document) = removed else {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        };
        if let Some(data_dir) = &self.data_dir {
            let path = data_dir.join(format!("{session_id}.json"));
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(document)
    }

    /// Load a session's document from the data directory into memory.
    ///
    /// The payload is read through the full dialect adapter, so files written
    /// by earlier platform generations load as well as fresh ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] when the store has no data
    /// directory or no file for the session, [`StoreError::Io`] on read
    /// failure, or [`StoreError::UnreadablePayload`] when the file matches no
    /// dialect.
    pub fn load(&self, session_id: &str) -> Result<Document, StoreError> {
        validate_session_id(session_id)?;
        let Some(data_dir) = &self.data_dir else {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        };
        let path = data_dir.join(format!("{session_id}.json"));
        if !path.exists() {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        }
        let payload = std::fs::read_to_string(path)?;
        let Some(document) = dialect::parse(&payload) else {
            debug!(session_id, "persisted payload matched no dialect");
            return Err(StoreError::UnreadablePayload(session_id.to_string()));
        };
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.insert(session_id.to_string(), document.clone());
        Ok(document)
    }

    /// Ids of every loaded session.
    #[must_use]
    pub fn sessions(&self) -> Vec<String> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.keys().cloned().collect()
    }

    /// Number of loaded sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.len()
    }

    /// Whether no sessions are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeId};

    fn sample_document() -> Document {
        let mut doc = Document::new(Node::canvas(NodeId::new("root1"), "Container"));
        doc.add_child(
            &NodeId::new("root1"),
            Node::new(NodeId::new("n1"), "Heading").with_prop("text", "Hello"),
        )
        .expect("should attach");
        doc
    }

    #[test]
    fn test_put_and_get_in_memory() {
        let store = DocumentStore::new();
        store
            .put(DEFAULT_SESSION, sample_document())
            .expect("should store");
        let doc = store.get(DEFAULT_SESSION).expect("should load");
        assert_eq!(doc.len(), 2);
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_invalid_session_id_rejected() {
        let store = DocumentStore::new();
        assert!(store.put("bad session", sample_document()).is_err());
        assert!(store.put("", sample_document()).is_err());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = DocumentStore::with_data_dir(dir.path()).expect("should create store");
        store.put("landing", sample_document()).expect("should store");

        // A fresh store over the same directory reads the same document back.
        let reopened = DocumentStore::with_data_dir(dir.path()).expect("should create store");
        let doc = reopened.load("landing").expect("should load");
        assert_eq!(doc, sample_document());
        assert_eq!(reopened.sessions(), vec!["landing".to_string()]);
    }

    #[test]
    fn test_load_legacy_payload_from_disk() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        std::fs::write(
            dir.path().join("old.json"),
            r#"[{"type": "heading", "props": {"text": "Old page"}}]"#,
        )
        .expect("should write");
        let store = DocumentStore::with_data_dir(dir.path()).expect("should create store");
        let doc = store.load("old").expect("should upgrade and load");
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_load_unreadable_payload_errors() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        std::fs::write(dir.path().join("bad.json"), "{not json").expect("should write");
        let store = DocumentStore::with_data_dir(dir.path()).expect("should create store");
        assert!(matches!(
            store.load("bad"),
            Err(StoreError::UnreadablePayload(_))
        ));
    }

    #[test]
    fn test_remove_missing_session_errors() {
        let store = DocumentStore::new();
        assert!(matches!(
            store.remove("ghost"),
            Err(StoreError::SessionNotFound(_))
        ));
    }
}
