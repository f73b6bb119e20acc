//! Creating and editing EntitySchema pages
//!
//! Edits name the revision they were made against. Schema text and name badge
//! edits made against an older revision are merged into the latest one when
//! they touch different values; whole-schema overwrites, undos and restores
//! must be based on the latest revision.

use std::fmt;

use crate::converter::SchemaConverter;
use crate::differ::EntitySchemaDiffer;
use crate::encoder::{EntitySchemaEncoder, SchemaCleaner};
use crate::error::{Result, SchemaError};
use crate::id::EntitySchemaId;
use crate::patcher::EntitySchemaPatcher;
use crate::schema::{FullArraySchemaData, NameBadge};
use crate::store::{IdGenerator, PageStore, Revision, RevisionId};
use crate::undo::UndoHandler;
use crate::validation::InputValidator;

/// Who edits, against which revision, and why
#[derive(Debug, Clone, Copy)]
pub struct EditInfo<'s> {
    pub base_revision: RevisionId,
    pub summary: &'s str,
    pub author: Option<&'s str>,
}

impl<'s> EditInfo<'s> {
    pub fn new(base_revision: RevisionId) -> Self {
        Self {
            base_revision,
            summary: "",
            author: None,
        }
    }

    pub fn with_summary(mut self, summary: &'s str) -> Self {
        self.summary = summary;
        self
    }

    pub fn by(mut self, author: &'s str) -> Self {
        self.author = Some(author);
        self
    }
}

/// Machine-readable part of an edit summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSummary {
    NewSchema { language: String },
    UpdateSchemaText,
    UpdateNameBadge { language: String },
    OverwriteWholeSchema,
    Undo { revision: RevisionId },
    Restore { revision: RevisionId },
}

impl AutoSummary {
    /// `/* <autocomment> */ <user summary>`
    pub fn compose(&self, user_summary: &str) -> String {
        let user_summary = user_summary.trim();
        if user_summary.is_empty() {
            format!("/* {} */", self)
        } else {
            format!("/* {} */ {}", self, user_summary)
        }
    }
}

impl fmt::Display for AutoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoSummary::NewSchema { language } => write!(f, "entityschema-summary-newschema:{}", language),
            AutoSummary::UpdateSchemaText => write!(f, "entityschema-summary-update-schema-text"),
            AutoSummary::UpdateNameBadge { language } => {
                write!(f, "entityschema-summary-update-schema-namebadge:{}", language)
            }
            AutoSummary::OverwriteWholeSchema => write!(f, "entityschema-summary-update"),
            AutoSummary::Undo { revision } => write!(f, "entityschema-summary-undo:{}", revision),
            AutoSummary::Restore { revision } => write!(f, "entityschema-summary-restore:{}", revision),
        }
    }
}

/// Writes EntitySchema pages through a [`PageStore`]
pub struct EntitySchemaUpdater<'a, S: PageStore> {
    store: &'a mut S,
    validator: InputValidator,
    converter: SchemaConverter,
    differ: EntitySchemaDiffer,
    patcher: EntitySchemaPatcher,
}

impl<'a, S: PageStore> EntitySchemaUpdater<'a, S> {
    pub fn new(store: &'a mut S, validator: InputValidator) -> Self {
        Self {
            store,
            validator,
            converter: SchemaConverter::new(),
            differ: EntitySchemaDiffer::new(),
            patcher: EntitySchemaPatcher::new(),
        }
    }

    /// Create a new schema with terms in one language
    pub fn insert_schema(
        &mut self,
        ids: &mut impl IdGenerator,
        language: &str,
        badge: NameBadge,
        schema_text: &str,
        author: Option<&str>,
    ) -> Result<(EntitySchemaId, RevisionId)> {
        self.validator.validate_language_code(language)?;
        self.validator.validate_name_badge(&badge)?;
        self.validator.validate_schema_text_length(schema_text)?;

        let id = ids.new_id()?;
        if self.store.exists(&id)? {
            return Err(SchemaError::AlreadyExists(id.to_string()));
        }

        let mut data = FullArraySchemaData {
            schema_text: schema_text.to_string(),
            ..Default::default()
        };
        data.set_name_badge(language, SchemaCleaner::clean_name_badge(badge));

        let content = EntitySchemaEncoder::get_persistent_representation(&id, &data)?;
        let summary = AutoSummary::NewSchema {
            language: language.to_string(),
        }
        .compose(data.labels.get(language).map(String::as_str).unwrap_or_default());
        let revision = self.store.save_content(&id, content, &summary, author, None)?;
        Ok((id, revision))
    }

    /// Replace everything; only allowed against the latest revision
    pub fn overwrite_whole_schema(
        &mut self,
        id: &EntitySchemaId,
        data: &FullArraySchemaData,
        edit: EditInfo<'_>,
    ) -> Result<RevisionId> {
        let latest = self.latest_revision(id)?;
        self.ensure_latest(id, &latest, edit.base_revision)?;

        let stored = self.converter.get_full_array_schema_data(&latest.content)?;
        for language in data.languages() {
            if !stored.languages().contains(language) {
                self.validator.validate_language_code(language)?;
            }
            self.validator.validate_name_badge(&data.name_badge(language))?;
        }
        self.validator.validate_schema_text_length(&data.schema_text)?;

        let data = SchemaCleaner::clean_data(data);
        self.save(id, &latest, &data, AutoSummary::OverwriteWholeSchema, edit)
    }

    pub fn update_schema_text(
        &mut self,
        id: &EntitySchemaId,
        schema_text: &str,
        edit: EditInfo<'_>,
    ) -> Result<RevisionId> {
        self.validator.validate_schema_text_length(schema_text)?;
        self.merge_edit(id, edit, AutoSummary::UpdateSchemaText, |data| {
            data.schema_text = schema_text.to_string();
        })
    }

    pub fn update_schema_name_badge(
        &mut self,
        id: &EntitySchemaId,
        language: &str,
        badge: NameBadge,
        edit: EditInfo<'_>,
    ) -> Result<RevisionId> {
        self.validate_edited_language(id, language)?;
        self.validator.validate_name_badge(&badge)?;
        let badge = SchemaCleaner::clean_name_badge(badge);
        let summary = AutoSummary::UpdateNameBadge {
            language: language.to_string(),
        };
        self.merge_edit(id, edit, summary, |data| data.set_name_badge(language, badge))
    }

    /// Revert the change made by `undo_revision` (relative to `undo_after_revision`)
    pub fn undo(
        &mut self,
        id: &EntitySchemaId,
        undo_revision: RevisionId,
        undo_after_revision: RevisionId,
        edit: EditInfo<'_>,
    ) -> Result<RevisionId> {
        let latest = self.latest_revision(id)?;
        self.ensure_latest(id, &latest, edit.base_revision)?;
        let undo_from = self.page_revision(id, undo_revision)?;
        let undo_to = self.page_revision(id, undo_after_revision)?;

        let handler = UndoHandler::new();
        let schema_id = handler.validate_content_ids(&[
            undo_from.content.as_str(),
            undo_to.content.as_str(),
            latest.content.as_str(),
        ])?;
        if schema_id != *id {
            return Err(SchemaError::IdMismatch {
                expected: id.to_string(),
                actual: schema_id.to_string(),
            });
        }

        let diff = handler.get_diff_from_contents(&undo_from.content, &undo_to.content)?;
        let patched = handler.try_patching_undo_diff(&latest.content, &diff)?;
        self.save(id, &latest, &patched, AutoSummary::Undo { revision: undo_revision }, edit)
    }

    /// Make an old revision's content current again
    pub fn restore(&mut self, id: &EntitySchemaId, revision: RevisionId, edit: EditInfo<'_>) -> Result<RevisionId> {
        let latest = self.latest_revision(id)?;
        self.ensure_latest(id, &latest, edit.base_revision)?;
        let old = self.page_revision(id, revision)?;
        let data = self.converter.get_full_array_schema_data(&old.content)?;
        self.save(id, &latest, &data, AutoSummary::Restore { revision }, edit)
    }

    /// Apply `change` to the base revision's data and rebase it onto the latest revision
    fn merge_edit(
        &mut self,
        id: &EntitySchemaId,
        edit: EditInfo<'_>,
        summary: AutoSummary,
        change: impl FnOnce(&mut FullArraySchemaData),
    ) -> Result<RevisionId> {
        let latest = self.latest_revision(id)?;
        let latest_data = self.converter.get_full_array_schema_data(&latest.content)?;

        let target = if latest.id == edit.base_revision {
            let mut data = latest_data;
            change(&mut data);
            data
        } else {
            let base = self.page_revision(id, edit.base_revision)?;
            let base_data = self.converter.get_full_array_schema_data(&base.content)?;
            let mut edited = base_data.clone();
            change(&mut edited);

            let diff = self.differ.diff_schemas(&base_data, &edited);
            tracing::debug!(%id, base = base.id, latest = latest.id, operations = diff.len(), "merging edit onto latest revision");
            self.patcher
                .patch_schema(&latest_data, &diff)
                .map_err(|e| {
                    if e.is_conflict() {
                        SchemaError::EditConflict {
                            id: id.to_string(),
                            base: base.id,
                            latest: latest.id,
                        }
                    } else {
                        e
                    }
                })?
        };

        self.save(id, &latest, &target, summary, edit)
    }

    fn save(
        &mut self,
        id: &EntitySchemaId,
        latest: &Revision,
        data: &FullArraySchemaData,
        summary: AutoSummary,
        edit: EditInfo<'_>,
    ) -> Result<RevisionId> {
        let content = EntitySchemaEncoder::get_persistent_representation(id, data)?;
        self.store.save_content(
            id,
            content,
            &summary.compose(edit.summary),
            edit.author,
            Some(latest.id),
        )
    }

    /// Languages already stored on the page are accepted as they are
    fn validate_edited_language(&self, id: &EntitySchemaId, language: &str) -> Result<()> {
        if let Some(latest) = self.store.latest_revision(id)? {
            let stored = self.converter.get_full_array_schema_data(&latest.content)?;
            if stored.languages().contains(language) {
                return Ok(());
            }
        }
        self.validator.validate_language_code(language)
    }

    fn latest_revision(&self, id: &EntitySchemaId) -> Result<Revision> {
        self.store
            .latest_revision(id)?
            .ok_or_else(|| SchemaError::NotFound(id.to_string()))
    }

    /// A revision that must belong to `id`
    fn page_revision(&self, id: &EntitySchemaId, revision: RevisionId) -> Result<Revision> {
        self.store
            .revision(revision)?
            .filter(|r| r.page == *id)
            .ok_or_else(|| SchemaError::NotFound(format!("{} revision {}", id, revision)))
    }

    fn ensure_latest(&self, id: &EntitySchemaId, latest: &Revision, base: RevisionId) -> Result<()> {
        if latest.id != base {
            return Err(SchemaError::EditConflict {
                id: id.to_string(),
                base,
                latest: latest.id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryPageStore, SequentialIdGenerator};

    fn setup(store: &mut InMemoryPageStore) -> (EntitySchemaId, RevisionId) {
        let mut ids = SequentialIdGenerator::new();
        EntitySchemaUpdater::new(store, InputValidator::default())
            .insert_schema(
                &mut ids,
                "en",
                NameBadge::new("human", "a human", vec!["person".into()]),
                "<human> {}",
                Some("Alice"),
            )
            .unwrap()
    }

    fn current(store: &InMemoryPageStore, id: &EntitySchemaId) -> FullArraySchemaData {
        let content = store.load_content(id).unwrap().unwrap();
        SchemaConverter::new().get_full_array_schema_data(&content).unwrap()
    }

    #[test]
    fn test_insert_schema() {
        let mut store = InMemoryPageStore::new();
        let (id, rev) = setup(&mut store);
        assert_eq!(id.serialization(), "E1");

        let revision = store.revision(rev).unwrap().unwrap();
        assert_eq!(revision.summary, "/* entityschema-summary-newschema:en */ human");
        assert!(revision.content.contains(r#""serializationVersion":"3.0""#));
        assert_eq!(current(&store, &id).aliases["en"], vec!["person"]);
    }

    #[test]
    fn test_update_schema_text() {
        let mut store = InMemoryPageStore::new();
        let (id, rev) = setup(&mut store);

        let new_rev = EntitySchemaUpdater::new(&mut store, InputValidator::default())
            .update_schema_text(&id, "<human> { wdt:P31 [wd:Q5] }", EditInfo::new(rev).with_summary("typo").by("Bob"))
            .unwrap();
        assert_ne!(rev, new_rev);
        assert_eq!(current(&store, &id).schema_text, "<human> { wdt:P31 [wd:Q5] }");
        assert_eq!(
            store.revision(new_rev).unwrap().unwrap().summary,
            "/* entityschema-summary-update-schema-text */ typo"
        );
        assert_eq!(store.revision(new_rev).unwrap().unwrap().author.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_non_conflicting_edits_merge() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        updater
            .update_schema_name_badge(&id, "de", NameBadge::new("Mensch", "", vec![]), EditInfo::new(base))
            .unwrap();
        // second edit is still based on the first revision
        updater
            .update_schema_text(&id, "<changed> {}", EditInfo::new(base))
            .unwrap();

        let data = current(&store, &id);
        assert_eq!(data.labels["de"], "Mensch");
        assert_eq!(data.schema_text, "<changed> {}");
    }

    #[test]
    fn test_conflicting_edits_rejected() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        updater.update_schema_text(&id, "<a> {}", EditInfo::new(base)).unwrap();
        let result = updater.update_schema_text(&id, "<b> {}", EditInfo::new(base));
        assert!(matches!(result, Err(SchemaError::EditConflict { .. })));
    }

    #[test]
    fn test_overwrite_requires_latest_base() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        let latest = updater.update_schema_text(&id, "<a> {}", EditInfo::new(base)).unwrap();

        let data = FullArraySchemaData {
            schema_text: "<b> {}".into(),
            ..Default::default()
        };
        assert!(updater.overwrite_whole_schema(&id, &data, EditInfo::new(base)).is_err());
        updater.overwrite_whole_schema(&id, &data, EditInfo::new(latest)).unwrap();
        assert_eq!(current(&store, &id), data);
    }

    #[test]
    fn test_empty_label_is_cleared() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        let rev = updater
            .update_schema_name_badge(&id, "de", NameBadge::new("Mensch", "", vec![]), EditInfo::new(base))
            .unwrap();
        updater
            .update_schema_name_badge(&id, "de", NameBadge::new("", "", vec![]), EditInfo::new(rev))
            .unwrap();

        let data = current(&store, &id);
        assert!(!data.labels.contains_key("de"));
        assert_eq!(data.labels["en"], "human");
    }

    #[test]
    fn test_undo_and_restore() {
        let mut store = InMemoryPageStore::new();
        let (id, first) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        let second = updater.update_schema_text(&id, "<second> {}", EditInfo::new(first)).unwrap();
        let third = updater
            .update_schema_name_badge(&id, "fr", NameBadge::new("humain", "", vec![]), EditInfo::new(second))
            .unwrap();

        let fourth = updater.undo(&id, second, first, EditInfo::new(third)).unwrap();
        let data = current(&store, &id);
        assert_eq!(data.schema_text, "<human> {}");
        assert_eq!(data.labels["fr"], "humain");

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        updater.restore(&id, first, EditInfo::new(fourth)).unwrap();
        assert!(!current(&store, &id).labels.contains_key("fr"));
    }

    #[test]
    fn test_stored_unusual_languages_survive_edits() {
        let mut store = InMemoryPageStore::new();
        let id = EntitySchemaId::new("E5").unwrap();
        let legacy = r#"{"id":"E5","serializationVersion":"2.0","labels":{"de-CH":"Chatz","zh-classical":"貓"},"aliases":{"de-CH":["a","a"]},"schema":"<cat> {}"}"#;
        let first = store.save_content(&id, legacy.to_string(), "", None, None).unwrap();

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        let second = updater
            .update_schema_name_badge(&id, "de-CH", NameBadge::new("Katze", "", vec![]), EditInfo::new(first))
            .unwrap();
        let third = updater.update_schema_text(&id, "<cat> { }", EditInfo::new(second)).unwrap();
        updater.restore(&id, first, EditInfo::new(third)).unwrap();

        let data = current(&store, &id);
        assert_eq!(data.labels["de-CH"], "Chatz");
        assert_eq!(data.labels["zh-classical"], "貓");
        assert_eq!(data.aliases["de-CH"], vec!["a", "a"]);
    }

    #[test]
    fn test_overwrite_cleans_terms() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut data = FullArraySchemaData::default();
        data.labels.insert("en".into(), " human ".into());
        data.aliases.insert("en".into(), vec!["x".into(), "x".into()]);
        EntitySchemaUpdater::new(&mut store, InputValidator::default())
            .overwrite_whole_schema(&id, &data, EditInfo::new(base))
            .unwrap();

        let stored = current(&store, &id);
        assert_eq!(stored.labels["en"], "human");
        assert_eq!(stored.aliases["en"], vec!["x"]);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let mut store = InMemoryPageStore::new();
        let (id, base) = setup(&mut store);

        let mut updater = EntitySchemaUpdater::new(&mut store, InputValidator::default());
        let result = updater.update_schema_name_badge(&id, "Not a code", NameBadge::default(), EditInfo::new(base));
        assert!(matches!(result, Err(SchemaError::InvalidInput(_))));

        let missing = EntitySchemaId::new("E99").unwrap();
        let result = updater.update_schema_text(&missing, "", EditInfo::new(base));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }
}
