//! EntitySchema
//!
//! Document model for EntitySchema pages: ShExC schemas stored as JSON with
//! multilingual labels, descriptions and aliases, addressed by `E<n>` IDs.
//!
//! ## Features
//!
//! - **Layout Conversion**: Stored documents of every serialization version
//!   (1.0, 2.0, 3.0) are read into one normalized model
//! - **Canonical Encoding**: Writes always produce the latest layout, cleaned
//! - **Diffing and Patching**: Field-level diffs drive edit merging and undo
//! - **Revisioned Storage**: Every save is a new revision, guarded by its base
//! - **Wikibase Integration**: Term lookup, pseudo-entity access, change rows
//!
//! ## Stored layout
//!
//! ```text
//! {
//!   "id": "E1",
//!   "serializationVersion": "3.0",
//!   "labels":       { "<lang>": "<label>" },
//!   "descriptions": { "<lang>": "<description>" },
//!   "aliases":      { "<lang>": ["<alias>", ...] },
//!   "schemaText":   "<ShExC>",
//!   "type":         "ShExC"
//! }
//! ```

pub mod change;
pub mod checksum;
pub mod config;
pub mod converter;
pub mod datavalue;
pub mod differ;
pub mod encoder;
pub mod error;
pub mod format;
pub mod id;
pub mod lookup;
pub mod patcher;
pub mod schema;
pub mod store;
pub mod undo;
pub mod updater;
pub mod validation;
pub mod version;

pub use change::{EntityChange, EntitySchemaEntityChangeFactory};
pub use checksum::Checksum;
pub use config::EntitySchemaConfig;
pub use converter::SchemaConverter;
pub use datavalue::{DataValue, EntitySchemaExistsValidator};
pub use differ::{DiffOp, EntitySchemaDiffer, SchemaDiff};
pub use encoder::{EntitySchemaEncoder, SchemaCleaner};
pub use error::{Result, SchemaError};
pub use id::EntitySchemaId;
pub use lookup::{EntitySchemaTermLookup, PseudoEntityHandler};
pub use patcher::EntitySchemaPatcher;
pub use schema::{FullArraySchemaData, FullViewSchemaData, MonolingualSchemaData, NameBadge, PersistenceSchemaData};
pub use store::{InMemoryPageStore, PageStore, Revision, RevisionId};
pub use undo::UndoHandler;
pub use updater::{EditInfo, EntitySchemaUpdater};
pub use validation::InputValidator;
pub use version::SerializationVersion;
