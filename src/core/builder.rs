//! NF-006: Infrastructure builder — sequences factory, prototype, composite.
//!
//! ```no_run
//! use nullforge::core::builder::InfrastructureBuilder;
//!
//! let mut builder = InfrastructureBuilder::new("demo");
//! builder
//!     .build_fleet(3)?
//!     .add_custom_resource("finalizador", serde_json::Map::new())?;
//! builder.export("terraform/main.tf.json")?;
//! # Ok::<(), nullforge::core::error::Error>(())
//! ```

use super::composite::CompositeModule;
use super::config_store::ConfigStore;
use super::error::Result;
use super::factory::NullResourceFactory;
use super::hasher;
use super::output;
use super::prototype::{CloneMutation, ResourcePrototype};
use super::types::{default_base_name, AggregatedDocument, ExportReport, Triggers};
use std::path::Path;

/// Fluent builder for a Terraform JSON module of `null_resource`s.
#[derive(Debug)]
pub struct InfrastructureBuilder {
    env_name: String,
    base_name: String,
    factory: NullResourceFactory,
    module: CompositeModule,
}

impl InfrastructureBuilder {
    pub fn new(env_name: &str) -> Self {
        Self {
            env_name: env_name.to_string(),
            base_name: default_base_name(),
            factory: NullResourceFactory::new(),
            module: CompositeModule::new(),
        }
    }

    /// Builder for the environment recorded in the shared store.
    pub fn from_store(store: &ConfigStore) -> Self {
        Self::new(store.env_name())
    }

    /// Name fleet clones are derived from (default `placeholder`).
    pub fn with_base_name(mut self, base_name: &str) -> Self {
        self.base_name = base_name.to_string();
        self
    }

    pub fn with_factory(mut self, factory: NullResourceFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Number of fragments added so far.
    pub fn len(&self) -> usize {
        self.module.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module.is_empty()
    }

    /// Add `count` clones of the base resource, named `<base>_0 … <base>_{count-1}`,
    /// each tagged with its index.
    pub fn build_fleet(&mut self, count: usize) -> Result<&mut Self> {
        if count == 0 {
            return Ok(self);
        }
        let base = ResourcePrototype::new(self.factory.create(&self.base_name, None)?);
        for index in 0..count {
            let clone = base.clone_with(Some(&CloneMutation { index }))?;
            self.module.add(clone.into_data());
        }
        log::info!(
            "[{}] built fleet of {} '{}' resource(s)",
            self.env_name,
            count,
            self.base_name
        );
        Ok(self)
    }

    /// Add a single resource with the given triggers.
    pub fn add_custom_resource(&mut self, name: &str, triggers: Triggers) -> Result<&mut Self> {
        let repr = self.factory.create(name, Some(triggers))?;
        self.module.add(repr);
        log::debug!("[{}] added custom resource '{}'", self.env_name, name);
        Ok(self)
    }

    /// The aggregated document, without writing it.
    pub fn document(&self) -> AggregatedDocument {
        self.module.aggregate()
    }

    /// Number of `export()` calls made on this builder's module.
    pub fn export_count(&self) -> usize {
        self.module.export_count()
    }

    /// Aggregate and write the document to `path`, replacing any existing file.
    pub fn export(&mut self, path: impl AsRef<Path>) -> Result<ExportReport> {
        let path = path.as_ref();
        let doc = self.module.export();
        let json = output::save_document(path, &doc)?;
        let report = ExportReport {
            path: path.to_path_buf(),
            resources: doc.len(),
            hash: hasher::hash_string(&json),
        };
        log::info!(
            "[{}] Terraform JSON written to {} ({} resources)",
            self.env_name,
            report.path.display(),
            report.resources
        );
        Ok(report)
    }
}
