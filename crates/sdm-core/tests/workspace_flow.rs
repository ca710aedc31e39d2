//! Integration tests for the workspace facade

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sdm_core::{
    FormElement, FormError, InstanceProvider, ValidationOutcome, Workspace, WorkspaceConfig,
    WorkspaceError,
};
use sdm_store::oxrdf::NamedNode;
use sdm_test_utils::{organisation_type, registry_fetcher, SHAPES_URL};

/// Minimal form editing an organisation's preferred label
#[derive(Default)]
struct OrganisationForm {
    subject: Option<NamedNode>,
    label: String,
    provider: Option<Arc<dyn InstanceProvider>>,
}

impl OrganisationForm {
    fn new(subject: &NamedNode, label: &str) -> Self {
        Self {
            subject: Some(subject.clone()),
            label: label.to_string(),
            provider: None,
        }
    }
}

impl FormElement for OrganisationForm {
    fn serialize(&self) -> Result<String, FormError> {
        let subject = self
            .subject
            .as_ref()
            .ok_or_else(|| FormError::Serialize("no subject".into()))?;
        Ok(format!(
            "<{}> <http://www.w3.org/2004/02/skos/core#prefLabel> \"{}\" .\n",
            subject.as_str(),
            self.label
        ))
    }

    fn validate(&self) -> ValidationOutcome {
        if self.label.trim().is_empty() {
            ValidationOutcome::invalid(["label is required"])
        } else {
            ValidationOutcome::valid()
        }
    }

    fn set_instance_provider(&mut self, provider: Arc<dyn InstanceProvider>) {
        self.provider = Some(provider);
    }
}

fn workspace(config: WorkspaceConfig) -> Workspace {
    Workspace::in_memory(config.with_shape_source(SHAPES_URL), registry_fetcher()).unwrap()
}

#[tokio::test]
async fn create_list_and_retire_through_the_facade() {
    let ws = workspace(WorkspaceConfig::new());
    let descriptors = ws.refresh_shapes(false).await.unwrap();
    assert_eq!(descriptors.len(), 2);

    let descriptor = ws.descriptor("organisation").unwrap();
    let ids = ws.mint_identifiers(&descriptor).unwrap();
    let form = OrganisationForm::new(&ids.subject, "Acme");
    let saved = ws.save_form(&form, &ids, &descriptor).await.unwrap();
    assert!(saved.first_save);

    let listed = ws.list_resources().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].label, "Acme");
    assert!(ws.read_as_text(&listed[0]).await.contains("\"Acme\""));

    ws.remove(&listed[0]).await.unwrap();
    assert!(ws.list_resources().await.is_empty());
    let state = ws.resource_state(&ids).await.unwrap();
    assert!(state.exists());
    assert!(state.validity.and_then(|w| w.end).is_some());
}

#[tokio::test]
async fn invalid_forms_are_rejected_before_writing() {
    let ws = workspace(WorkspaceConfig::new());
    ws.refresh_shapes(false).await.unwrap();
    let descriptor = ws.descriptor("organisation").unwrap();
    let ids = ws.mint_identifiers(&descriptor).unwrap();

    let err = ws
        .save_form(&OrganisationForm::new(&ids.subject, "  "), &ids, &descriptor)
        .await
        .unwrap_err();

    assert!(matches!(&err, WorkspaceError::Validation(v) if v == &vec!["label is required".to_string()]));
    assert!(err.requires_user_correction());
    assert!(ws.store().is_empty().await.unwrap());
}

#[tokio::test]
async fn form_serialization_failures_are_reported() {
    let ws = workspace(WorkspaceConfig::new());
    ws.refresh_shapes(false).await.unwrap();
    let descriptor = ws.descriptor("organisation").unwrap();
    let ids = ws.mint_identifiers(&descriptor).unwrap();
    let form = OrganisationForm {
        label: "Nameless".into(),
        ..OrganisationForm::default()
    };

    let err = ws.save_form(&form, &ids, &descriptor).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Form(FormError::Serialize(_))));
}

#[tokio::test]
async fn attached_forms_see_saved_instances() {
    let ws = workspace(WorkspaceConfig::new());
    ws.refresh_shapes(false).await.unwrap();
    let descriptor = ws.descriptor("organisation").unwrap();
    let ids = ws.mint_identifiers(&descriptor).unwrap();

    let mut form = OrganisationForm::new(&ids.subject, "Initech");
    ws.attach_form(&mut form);
    let provider = form.provider.clone().unwrap();
    assert_eq!(&*provider.instances_of(&organisation_type()).await, "");

    ws.save_form(&form, &ids, &descriptor).await.unwrap();
    let snapshot = provider.instances_of(&organisation_type()).await;
    assert!(snapshot.contains(ids.subject.as_str()));
    assert!(snapshot.contains("\"Initech\""));
}

#[tokio::test]
async fn configured_validity_is_attached_on_save() {
    let ws = workspace(WorkspaceConfig::new().with_attach_validity(true));
    ws.refresh_shapes(false).await.unwrap();
    let descriptor = ws.descriptor("certificate").unwrap();
    let ids = ws.mint_identifiers(&descriptor).unwrap();

    ws.save_form(&OrganisationForm::new(&ids.subject, "ISO 9001"), &ids, &descriptor)
        .await
        .unwrap();

    let state = ws.resource_state(&ids).await.unwrap();
    let window = state.validity.unwrap();
    assert_eq!(window.beginning, state.created);
    assert_eq!(window.end, None);
}

#[tokio::test]
async fn refreshing_without_sources_is_a_configuration_error() {
    let ws = Workspace::in_memory(WorkspaceConfig::new(), registry_fetcher()).unwrap();
    let err = ws.refresh_shapes(false).await.unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn invalid_configuration_fails_fast() {
    let config = WorkspaceConfig::new().with_shape_cache(0, None);
    let err = Workspace::in_memory(config, registry_fetcher()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sdm.toml");
    let config = WorkspaceConfig::new()
        .with_shape_source(SHAPES_URL)
        .with_include_expired(true);
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(WorkspaceConfig::from_file(&path).unwrap(), config);
    assert!(WorkspaceConfig::from_file(dir.path().join("missing.toml")).is_err());
}

#[tokio::test]
async fn close_detaches_and_closes() {
    let ws = workspace(WorkspaceConfig::new());
    assert_eq!(ws.store().listener_count(), 1);
    ws.close().await.unwrap();
    assert_eq!(ws.store().listener_count(), 0);
    assert!(ws.store().len().await.is_err());
}
