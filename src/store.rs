//! Page storage
//!
//! EntitySchema pages live in a revisioned page store. Every save stores the
//! complete document as a new revision; nothing is mutated in place. A save
//! names the revision it was based on, and the store refuses it when that is
//! no longer the latest revision of the page.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};
use crate::id::{EntitySchemaId, MAX_NUMERIC_ID};

/// Revision identifier, increasing across the whole store
pub type RevisionId = u64;

/// One saved version of a page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub page: EntitySchemaId,
    /// Previous revision of the same page
    pub parent_id: Option<RevisionId>,
    pub content: String,
    pub checksum: Checksum,
    pub summary: String,
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Storage for EntitySchema page revisions
pub trait PageStore {
    /// Latest revision of a page, if the page exists
    fn latest_revision(&self, page: &EntitySchemaId) -> Result<Option<Revision>>;

    fn revision(&self, id: RevisionId) -> Result<Option<Revision>>;

    /// Store `content` as a new revision of `page`.
    ///
    /// `expected_parent` is `None` to create the page and the latest revision
    /// ID otherwise. Saving content identical to the latest revision is a
    /// null edit and returns the latest revision ID.
    fn save_content(
        &mut self,
        page: &EntitySchemaId,
        content: String,
        summary: &str,
        author: Option<&str>,
        expected_parent: Option<RevisionId>,
    ) -> Result<RevisionId>;

    fn delete_page(&mut self, page: &EntitySchemaId) -> Result<()>;

    fn load_content(&self, page: &EntitySchemaId) -> Result<Option<String>> {
        Ok(self.latest_revision(page)?.map(|revision| revision.content))
    }

    fn exists(&self, page: &EntitySchemaId) -> Result<bool> {
        Ok(self.latest_revision(page)?.is_some())
    }
}

/// Hands out numeric parts for new EntitySchema IDs
pub trait IdGenerator {
    fn new_id(&mut self) -> Result<EntitySchemaId>;
}

/// Counts upwards from a starting number
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    next: u32,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&mut self) -> Result<EntitySchemaId> {
        if self.next > MAX_NUMERIC_ID as u32 {
            return Err(SchemaError::InvalidId {
                id: format!("E{}", self.next),
                reason: "ID space exhausted".to_string(),
            });
        }
        let id = EntitySchemaId::from_numeric(self.next)?;
        self.next += 1;
        Ok(id)
    }
}

/// Keeps every revision in memory
#[derive(Debug, Default)]
pub struct InMemoryPageStore {
    revisions: BTreeMap<RevisionId, Revision>,
    /// Revision history per page, oldest first
    pages: HashMap<EntitySchemaId, Vec<RevisionId>>,
    last_revision_id: RevisionId,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision IDs of a page, oldest first
    pub fn history(&self, page: &EntitySchemaId) -> Vec<RevisionId> {
        self.pages.get(page).cloned().unwrap_or_default()
    }

    fn latest_id(&self, page: &EntitySchemaId) -> Option<RevisionId> {
        self.pages.get(page).and_then(|history| history.last().copied())
    }
}

impl PageStore for InMemoryPageStore {
    fn latest_revision(&self, page: &EntitySchemaId) -> Result<Option<Revision>> {
        Ok(self
            .latest_id(page)
            .and_then(|id| self.revisions.get(&id))
            .cloned())
    }

    fn revision(&self, id: RevisionId) -> Result<Option<Revision>> {
        Ok(self.revisions.get(&id).cloned())
    }

    fn save_content(
        &mut self,
        page: &EntitySchemaId,
        content: String,
        summary: &str,
        author: Option<&str>,
        expected_parent: Option<RevisionId>,
    ) -> Result<RevisionId> {
        let latest = self.latest_id(page);
        match (expected_parent, latest) {
            (None, Some(_)) => return Err(SchemaError::AlreadyExists(page.to_string())),
            (Some(_), None) => return Err(SchemaError::NotFound(page.to_string())),
            (Some(base), Some(latest)) if base != latest => {
                return Err(SchemaError::EditConflict {
                    id: page.to_string(),
                    base,
                    latest,
                })
            }
            _ => {}
        }

        let checksum = Checksum::of_content(&content);
        if let Some(current) = latest.and_then(|id| self.revisions.get(&id)) {
            if current.checksum == checksum {
                tracing::debug!(%page, revision = current.id, "null edit, no revision created");
                return Ok(current.id);
            }
        }

        self.last_revision_id += 1;
        let revision = Revision {
            id: self.last_revision_id,
            page: page.clone(),
            parent_id: latest,
            content,
            checksum,
            summary: summary.to_string(),
            author: author.map(String::from),
            timestamp: Utc::now(),
        };
        tracing::info!(%page, revision = revision.id, parent = ?latest, "saved revision");

        self.pages.entry(page.clone()).or_default().push(revision.id);
        self.revisions.insert(revision.id, revision);
        Ok(self.last_revision_id)
    }

    fn delete_page(&mut self, page: &EntitySchemaId) -> Result<()> {
        let history = self
            .pages
            .remove(page)
            .ok_or_else(|| SchemaError::NotFound(page.to_string()))?;
        for id in history {
            self.revisions.remove(&id);
        }
        tracing::info!(%page, "deleted page");
        Ok(())
    }
}
