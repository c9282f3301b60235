//! Run configuration
//!
//! One YAML (or JSON, by extension) document describes a migration run:
//!
//! ```yaml
//! server:
//!   base_url: http://localhost:3000
//!   session_token: 0f3c...
//! db_target: 3
//! schema_file: tables.yml
//! transformations:
//!   cards: { 12: 112 }
//!   dashboards: { 4: 104 }
//! personalization:
//!   columns: [{ column: 1101, table: 110, replacement: 1105 }]
//!   field_names: { TOTAL: TOTAL_EUR }
//! translation:
//!   language: fr
//!   on_miss: machine-translate
//!   terms_file: terms.yml
//!   provider_url: http://localhost:5000
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file.

use crate::error::RemoteError;
use crate::migration::{MetabaseClient, MigrationSession, RemoteEntities};
use dashmig_schema::{
    read_document, DatabaseId, EquivalenceTable, MigrationSchema, Personalization, PersonalizationOptions,
    SchemaError, TablesSpec, Transformations,
};
use dashmig_translate::{Language, LibreTranslateClient, OnMiss, TermDictionary, TranslationError, Translator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors loading or applying a run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unreadable or malformed document, inconsistent equivalence table
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Unreadable term dictionary, unusable translation provider
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// HTTP client could not be built
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Neither `schema` nor `schema_file` is set
    #[error("no equivalence table: set 'schema' or 'schema_file'")]
    MissingSchema,

    /// Both `schema` and `schema_file` are set
    #[error("both 'schema' and 'schema_file' are set")]
    AmbiguousSchema,

    /// Machine translation requested without a provider
    #[error("on_miss is 'machine-translate' but no 'provider_url' is set")]
    MissingProvider,
}

/// Remote installation to migrate on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://localhost:3000`
    pub base_url: String,
    /// Pre-issued session token
    #[serde(default)]
    pub session_token: Option<String>,
}

fn default_retry_delay_secs() -> u64 {
    5
}

/// Label translation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Target language
    pub language: Language,
    /// Policy for sentences with no known translation
    #[serde(default)]
    pub on_miss: OnMiss,
    /// User-defined term dictionary
    #[serde(default)]
    pub terms_file: Option<PathBuf>,
    /// Also register lower-case and capitalized variants of every term
    #[serde(default)]
    pub case_expand: bool,
    /// Pause before retrying the provider
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Machine translation provider
    #[serde(default)]
    pub provider_url: Option<String>,
    /// Provider API key
    #[serde(default)]
    pub api_key: Option<String>,
}

impl TranslationConfig {
    /// Translate to `language`, mirroring misses
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            on_miss: OnMiss::default(),
            terms_file: None,
            case_expand: false,
            retry_delay_secs: default_retry_delay_secs(),
            provider_url: None,
            api_key: None,
        }
    }

    /// With miss policy
    #[inline]
    #[must_use]
    pub fn with_on_miss(mut self, on_miss: OnMiss) -> Self {
        self.on_miss = on_miss;
        self
    }

    /// Build the translator
    ///
    /// # Errors
    /// Unreadable term dictionary, `MissingProvider`.
    pub fn translator(&self) -> Result<Translator, ConfigError> {
        let terms = match &self.terms_file {
            Some(path) => TermDictionary::from_path(path)?,
            None => TermDictionary::new(),
        };
        let mut translator = Translator::new(self.language, self.on_miss)
            .with_terms(&terms, self.case_expand)
            .with_retry_delay(Duration::from_secs(self.retry_delay_secs));

        match &self.provider_url {
            Some(url) => {
                let mut client = LibreTranslateClient::new(url.as_str())?;
                if let Some(key) = &self.api_key {
                    client = client.with_api_key(key.as_str());
                }
                translator = translator.with_machine(Box::new(client));
            }
            None if self.on_miss == OnMiss::MachineTranslate => return Err(ConfigError::MissingProvider),
            None => {}
        }
        Ok(translator)
    }
}

/// Migration run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Remote installation
    pub server: ServerConfig,
    /// Destination database id
    pub db_target: DatabaseId,
    /// Inline equivalence table
    #[serde(default)]
    pub schema: Option<TablesSpec>,
    /// Equivalence table document
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
    /// Card and dashboard id transformations
    #[serde(default)]
    pub transformations: Transformations,
    /// Business-specific column substitutions
    #[serde(default)]
    pub personalization: PersonalizationOptions,
    /// Label translation; labels are left alone when unset
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
    /// Rewrite without pushing
    #[serde(default)]
    pub dry_run: bool,
}

impl MigrationConfig {
    /// Configuration with an inline equivalence table
    #[must_use]
    pub fn new(server: ServerConfig, db_target: DatabaseId, schema: TablesSpec) -> Self {
        Self {
            server,
            db_target,
            schema: Some(schema),
            schema_file: None,
            transformations: Transformations::default(),
            personalization: PersonalizationOptions::default(),
            translation: None,
            dry_run: false,
        }
    }

    /// Load from a YAML or JSON document
    ///
    /// # Errors
    /// Unreadable or malformed document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config: Self = read_document(path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(path) = self.schema_file.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.translation.as_mut().and_then(|t| t.terms_file.as_mut()) {
            resolve(path);
        }
    }

    /// With transformations
    #[must_use]
    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = transformations;
        self
    }

    /// With personalization
    #[must_use]
    pub fn with_personalization(mut self, personalization: PersonalizationOptions) -> Self {
        self.personalization = personalization;
        self
    }

    /// With label translation
    #[must_use]
    pub fn with_translation(mut self, translation: TranslationConfig) -> Self {
        self.translation = Some(translation);
        self
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the equivalence table
    ///
    /// # Errors
    /// `MissingSchema`, `AmbiguousSchema`, unreadable schema document,
    /// duplicate mappings.
    pub fn tables(&self) -> Result<EquivalenceTable, ConfigError> {
        let table = match (&self.schema, &self.schema_file) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousSchema),
            (None, None) => return Err(ConfigError::MissingSchema),
            (Some(spec), None) => EquivalenceTable::from_spec(spec)?,
            (None, Some(path)) => EquivalenceTable::from_spec(&read_document::<TablesSpec>(path)?)?,
        };
        tracing::debug!(tables = table.table_count(), columns = table.column_count(), "equivalence table built");
        Ok(table)
    }

    /// Build the schema mapping
    ///
    /// # Errors
    /// See [`MigrationConfig::tables`].
    pub fn migration_schema(&self) -> Result<MigrationSchema, ConfigError> {
        Ok(MigrationSchema::new(self.db_target, self.tables()?)
            .with_personalization(Personalization::from_options(&self.personalization))
            .with_transformations(self.transformations.clone()))
    }

    /// Build the translator, if translation is configured
    ///
    /// # Errors
    /// See [`TranslationConfig::translator`].
    pub fn translator(&self) -> Result<Option<Translator>, ConfigError> {
        self.translation.as_ref().map(TranslationConfig::translator).transpose()
    }

    /// REST client for the configured server
    ///
    /// # Errors
    /// `Remote` if the HTTP client cannot be built.
    pub fn client(&self) -> Result<MetabaseClient, ConfigError> {
        let client = MetabaseClient::new(self.server.base_url.as_str())?;
        Ok(match &self.server.session_token {
            Some(token) => client.with_session_token(token.as_str()),
            None => client,
        })
    }

    /// Migration session over `remote`
    ///
    /// # Errors
    /// See [`MigrationConfig::migration_schema`] and
    /// [`MigrationConfig::translator`].
    pub fn session<R: RemoteEntities>(&self, remote: R) -> Result<MigrationSession<R>, ConfigError> {
        let mut session = MigrationSession::new(self.migration_schema()?, remote).with_dry_run(self.dry_run);
        if let Some(translator) = self.translator()? {
            session = session.with_translator(translator);
        }
        Ok(session)
    }
}
