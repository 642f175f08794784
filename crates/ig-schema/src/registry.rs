//! Filesystem schema registry with tenant overlay.
//!
//! Base guide schemas live as `*.json` files in one directory; a tenant
//! may shadow any of them under `tenant-specific/<tenant>/<name>`. Tenant
//! schemas are loaded lazily and cached; base schemas are loaded eagerly
//! at construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::model::GuideSchema;

/// Errors from loading a single schema file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema not found: {0}")]
    NotFound(String),

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load one guide schema from a JSON file.
pub fn load_schema_file(path: &Path) -> Result<GuideSchema, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    GuideSchema::from_json(&text).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Registry of guide schemas on the local filesystem.
pub struct SchemaRegistry {
    base_path: PathBuf,
    base_schemas: HashMap<String, GuideSchema>,
    tenant_cache: HashMap<String, GuideSchema>,
}

impl SchemaRegistry {
    /// Create a registry and eagerly load every `*.json` base schema.
    ///
    /// A missing directory or an unreadable file is logged and skipped;
    /// construction itself never fails.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let mut registry = Self {
            base_path: base_path.into(),
            base_schemas: HashMap::new(),
            tenant_cache: HashMap::new(),
        };
        registry.load_base_schemas();
        registry
    }

    fn load_base_schemas(&mut self) {
        if !self.base_path.exists() {
            warn!(path = %self.base_path.display(), "schema base path does not exist");
            return;
        }
        info!(path = %self.base_path.display(), "loading base guide schemas");

        let entries = match std::fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %self.base_path.display(), error = %e, "failed to list schema directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match load_schema_file(&path) {
                Ok(schema) => {
                    info!(schema = name, "loaded base schema");
                    self.base_schemas.insert(name.to_string(), schema);
                }
                Err(e) => error!(schema = name, error = %e, "failed to load schema"),
            }
        }
    }

    /// Schema for a tenant: tenant-specific overlay first, then the base
    /// set. Tenant schemas are cached after the first load.
    pub fn get_schema(&mut self, schema_name: &str, tenant_id: &str) -> Option<&GuideSchema> {
        let cache_key = format!("{tenant_id}/{schema_name}");
        if !self.tenant_cache.contains_key(&cache_key) {
            let tenant_path = self
                .base_path
                .join("tenant-specific")
                .join(tenant_id)
                .join(schema_name);
            if tenant_path.exists() {
                match load_schema_file(&tenant_path) {
                    Ok(schema) => {
                        info!(tenant = tenant_id, schema = schema_name, "loaded tenant-specific schema");
                        self.tenant_cache.insert(cache_key.clone(), schema);
                    }
                    Err(e) => {
                        error!(tenant = tenant_id, schema = schema_name, error = %e, "failed to load tenant schema");
                    }
                }
            }
        }
        if self.tenant_cache.contains_key(&cache_key) {
            return self.tenant_cache.get(&cache_key);
        }
        self.base_schemas.get(schema_name)
    }

    /// Base schema by file name (e.g. `837.5010.X222.A1.json`).
    pub fn get_base_schema(&self, schema_name: &str) -> Option<&GuideSchema> {
        self.base_schemas.get(schema_name)
    }

    /// Names of all loaded base schemas.
    pub fn list_base_schemas(&self) -> Vec<&str> {
        self.base_schemas.keys().map(|k| k.as_str()).collect()
    }

    /// Drop all cached schemas and reload from the filesystem.
    pub fn reload(&mut self) {
        self.base_schemas.clear();
        self.tenant_cache.clear();
        self.load_base_schemas();
    }
}
