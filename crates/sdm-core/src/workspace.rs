//! Workspace facade

use std::sync::Arc;

use parking_lot::RwLock;
use sdm_instances::{ClassInstanceProvider, InstanceProvider};
use sdm_lifecycle::{
    DanglingReference, ExportFormat, Identifiers, RemovalOutcome, RepairReport, ResourceManager,
    ResourceRecord, ResourceState, SaveOutcome,
};
use sdm_shapes::{DescriptorSet, ShapeDescriptor, ShapeFetcher, ShapeSource};
use sdm_store::oxrdf::NamedNode;
use sdm_store::QuadStore;
use tracing::{info, instrument};

use crate::config::WorkspaceConfig;
use crate::error::WorkspaceError;
use crate::form::FormElement;

/// One store plus everything built on top of it
#[derive(Debug)]
pub struct Workspace {
    config: WorkspaceConfig,
    store: Arc<QuadStore>,
    shapes: ShapeSource,
    descriptors: RwLock<DescriptorSet>,
    manager: ResourceManager,
    instances: Arc<ClassInstanceProvider>,
}

impl Workspace {
    /// Compose a workspace over an existing store
    ///
    /// # Errors
    /// - `WorkspaceError::Config` if the configuration is invalid
    pub fn new(
        config: WorkspaceConfig,
        store: Arc<QuadStore>,
        fetcher: Arc<dyn ShapeFetcher>,
    ) -> Result<Self, WorkspaceError> {
        config.validate()?;
        let shapes = ShapeSource::with_cache(fetcher, config.shape_cache());
        let manager = ResourceManager::new(Arc::clone(&store));
        let instances = Arc::new(ClassInstanceProvider::with_capacity(
            Arc::clone(&store),
            config.instance_cache_capacity,
        ));
        Ok(Self {
            config,
            store,
            shapes,
            descriptors: RwLock::new(DescriptorSet::default()),
            manager,
            instances,
        })
    }

    /// Compose a workspace over a fresh in-memory store
    ///
    /// # Errors
    /// - `WorkspaceError::Config` if the configuration is invalid
    pub fn in_memory(
        config: WorkspaceConfig,
        fetcher: Arc<dyn ShapeFetcher>,
    ) -> Result<Self, WorkspaceError> {
        Self::new(config, Arc::new(QuadStore::in_memory()), fetcher)
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<QuadStore> {
        &self.store
    }

    /// Lifecycle manager
    #[must_use]
    pub fn manager(&self) -> &ResourceManager {
        &self.manager
    }

    /// Shared instance provider
    #[must_use]
    pub fn instances(&self) -> Arc<ClassInstanceProvider> {
        Arc::clone(&self.instances)
    }

    /// Re-run discovery over the configured shape sources
    ///
    /// # Errors
    /// - `WorkspaceError::Shapes` with `ShapeError::NoSources` if none are
    ///   configured
    #[instrument(skip(self))]
    pub async fn refresh_shapes(&self, force_reload: bool) -> Result<DescriptorSet, WorkspaceError> {
        let discovered = self
            .shapes
            .load(&self.config.shape_sources, force_reload)
            .await?;
        info!(descriptors = discovered.len(), "Shapes refreshed");
        *self.descriptors.write() = discovered.clone();
        Ok(discovered)
    }

    /// Forget cached shape documents
    pub fn reset_shapes(&self) {
        self.shapes.reset();
    }

    /// Descriptors from the last refresh
    #[must_use]
    pub fn descriptors(&self) -> DescriptorSet {
        self.descriptors.read().clone()
    }

    /// Descriptor whose slug matches
    #[must_use]
    pub fn descriptor(&self, slug: &str) -> Option<ShapeDescriptor> {
        self.descriptors.read().by_slug(slug).cloned()
    }

    /// Hand the instance provider to a form
    pub fn attach_form(&self, form: &mut dyn FormElement) {
        let provider: Arc<dyn InstanceProvider> = self.instances();
        form.set_instance_provider(provider);
    }

    /// Validate and save a form as the full contents of a resource
    ///
    /// # Errors
    /// - `WorkspaceError::Validation` if the form rejects its contents
    ///   (nothing is written)
    /// - `WorkspaceError::Form` if the form cannot serialize
    /// - `WorkspaceError::Lifecycle` for parse or store failures
    #[instrument(skip(self, form, descriptor), fields(subject = %identifiers.subject))]
    pub async fn save_form(
        &self,
        form: &dyn FormElement,
        identifiers: &Identifiers,
        descriptor: &ShapeDescriptor,
    ) -> Result<SaveOutcome, WorkspaceError> {
        let outcome = form.validate();
        if !outcome.is_valid() {
            return Err(WorkspaceError::Validation(outcome.violations));
        }
        let text = form.serialize()?;
        let options = self.config.save_options().with_format(form.format());
        let saved = self
            .manager
            .save_text(
                &text,
                &identifiers.subject,
                &identifiers.graph,
                &descriptor.target_type,
                options,
            )
            .await?;
        Ok(saved)
    }

    /// Resources of every known descriptor, per the configured listing options
    pub async fn list_resources(&self) -> Vec<ResourceRecord> {
        let descriptors = self.descriptors();
        self.manager
            .list_resources_with(descriptors.as_slice(), self.config.list_options())
            .await
    }

    /// Graph contents of a resource as N-Quads
    pub async fn read_as_text(&self, resource: &ResourceRecord) -> String {
        self.manager.read_as_text(resource).await
    }

    /// Retire a resource
    ///
    /// # Errors
    /// - `WorkspaceError::Lifecycle` if the resource is unknown or the store fails
    pub async fn remove(&self, resource: &ResourceRecord) -> Result<RemovalOutcome, WorkspaceError> {
        Ok(self.manager.remove(resource).await?)
    }

    /// Reopen a retired resource
    ///
    /// # Errors
    /// - `WorkspaceError::Lifecycle` if the store fails
    pub async fn restore(&self, resource: &ResourceRecord) -> Result<bool, WorkspaceError> {
        Ok(self.manager.restore(resource).await?)
    }

    /// Subjects referring to `subject`
    pub async fn list_incoming_references(&self, subject: &NamedNode) -> Vec<NamedNode> {
        self.manager.list_incoming_references(subject).await
    }

    /// Fresh identifiers for a new resource
    ///
    /// # Errors
    /// - `WorkspaceError::Lifecycle` if the descriptor's namespace is invalid
    pub fn mint_identifiers(
        &self,
        descriptor: &ShapeDescriptor,
    ) -> Result<Identifiers, WorkspaceError> {
        Ok(self.manager.mint_identifiers(descriptor)?)
    }

    /// Audit view of a resource
    ///
    /// # Errors
    /// - `WorkspaceError::Lifecycle` if the store fails
    pub async fn resource_state(
        &self,
        identifiers: &Identifiers,
    ) -> Result<ResourceState, WorkspaceError> {
        Ok(self
            .manager
            .resource_state(&identifiers.subject, &identifiers.graph)
            .await?)
    }

    /// References to retired resources across every known descriptor
    pub async fn find_dangling_references(&self) -> Vec<DanglingReference> {
        let descriptors = self.descriptors();
        self.manager
            .find_dangling_references(descriptors.as_slice())
            .await
    }

    /// Remove the given dangling references
    pub async fn repair_dangling_references(
        &self,
        references: &[DanglingReference],
    ) -> RepairReport {
        self.manager.repair_dangling_references(references).await
    }

    /// Dump the store
    ///
    /// # Errors
    /// - `WorkspaceError::Lifecycle` on read or serialization failure
    pub async fn export(&self, syntax: ExportFormat) -> Result<String, WorkspaceError> {
        Ok(self.manager.export(syntax).await?)
    }

    /// Load an N-Quads dump, returning the number of quads read
    ///
    /// # Errors
    /// - `WorkspaceError::Store` on parse or write failure
    pub async fn import_nquads(&self, text: &str) -> Result<usize, WorkspaceError> {
        Ok(self.store.import_nquads(text).await?)
    }

    /// Detach the instance provider and close the store
    ///
    /// # Errors
    /// - `WorkspaceError::Store` if the backend fails to close
    pub async fn close(&self) -> Result<(), WorkspaceError> {
        self.instances.detach();
        self.store.close().await?;
        Ok(())
    }
}
