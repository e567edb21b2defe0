use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::models::property::Property;

use super::git::{GitSync, SyncError, SyncOutcome, SyncStage};
use super::images::ImageProcessor;
use super::repository::PropertyRepository;
use super::version::VersionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SyncStatus {
    Pushed,
    NoChanges,
    /// Record and version marker are persisted locally but publication
    /// failed; the operator must retry the sync.
    Failed { stage: SyncStage, message: String },
}

/// Outcome of one admin mutation, returned to the caller as data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationReport {
    pub operation: Operation,
    pub property_id: String,
    pub images_linked: usize,
    pub images_failed: usize,
    pub version: u64,
    pub sync: SyncStatus,
}

impl MutationReport {
    pub fn succeeded(&self) -> bool {
        !matches!(self.sync, SyncStatus::Failed { .. })
    }
}

/// Producer half: orchestrates each mutation as the fixed sequence
/// process images -> persist record -> bump version -> git sync. The whole
/// sequence runs under one lock; the version file and the git work tree are
/// shared mutable state with no synchronization of their own.
pub struct AdminService {
    repository: PropertyRepository,
    images: ImageProcessor,
    git: GitSync,
    version: VersionService,
    data_root: PathBuf,
    mutation_lock: Mutex<()>,
}

impl AdminService {
    pub fn new(config: &Arc<Config>) -> AdminService {
        let data_root = Path::new(&config.repo_path).join(&config.data_dir);
        AdminService {
            repository: PropertyRepository::new(data_root.join("data_property.json")),
            images: ImageProcessor::new(config),
            git: GitSync::new(config),
            version: VersionService::new(data_root.join("version.json")),
            data_root,
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn properties(&self) -> Result<Vec<Property>> {
        self.repository.get_all()
    }

    pub fn current_version(&self) -> Option<u64> {
        self.version.current().map(|record| record.version)
    }

    pub async fn create_property(
        &self,
        mut property: Property,
        image_paths: Vec<PathBuf>,
    ) -> Result<MutationReport> {
        let _guard = self.mutation_lock.lock().await;

        let output_dir = self.data_root.join("img").join(&property.id);
        let processed = self
            .images
            .process_batch(&property.id, &image_paths, &output_dir)
            .await;
        let images_failed = image_paths.len() - processed.len();
        property.image = processed.into_iter().map(|image| image.url).collect();
        let images_linked = property.image.len();

        self.repository.add(property.clone())?;
        let version = self
            .version
            .bump(&format!("Create property {}", property.id))?;
        let sync = self.publish(Operation::Create, &property.id).await;

        Ok(MutationReport {
            operation: Operation::Create,
            property_id: property.id,
            images_linked,
            images_failed,
            version: version.version,
            sync,
        })
    }

    /// Newly supplied images are processed and appended after the links the
    /// operator kept, preserving the user-controlled carousel order.
    pub async fn update_property(
        &self,
        id: &str,
        mut property: Property,
        image_paths: Vec<PathBuf>,
    ) -> Result<MutationReport> {
        let _guard = self.mutation_lock.lock().await;

        let output_dir = self.data_root.join("img").join(id);
        let processed = self
            .images
            .process_batch(id, &image_paths, &output_dir)
            .await;
        let images_failed = image_paths.len() - processed.len();
        property
            .image
            .extend(processed.into_iter().map(|image| image.url));
        let images_linked = property.image.len();

        self.repository.update(id, property.clone())?;
        let version = self.version.bump(&format!("Update property {}", id))?;
        let sync = self.publish(Operation::Update, id).await;

        Ok(MutationReport {
            operation: Operation::Update,
            property_id: property.id,
            images_linked,
            images_failed,
            version: version.version,
            sync,
        })
    }

    pub async fn delete_property(&self, id: &str) -> Result<MutationReport> {
        let _guard = self.mutation_lock.lock().await;

        self.repository.delete(id)?;
        let version = self.version.bump(&format!("Delete property {}", id))?;
        let sync = self.publish(Operation::Delete, id).await;

        Ok(MutationReport {
            operation: Operation::Delete,
            property_id: id.to_string(),
            images_linked: 0,
            images_failed: 0,
            version: version.version,
            sync,
        })
    }

    pub async fn pull_latest(&self) -> Result<(), SyncError> {
        let _guard = self.mutation_lock.lock().await;
        self.git.pull_latest().await
    }

    async fn publish(&self, operation: Operation, id: &str) -> SyncStatus {
        let message = format!(
            "Admin: {} property data and images for {}",
            operation.verb(),
            id
        );
        match self.git.sync(&message).await {
            Ok(SyncOutcome::Pushed) => {
                info!("Synced property {} to the data remote", id);
                SyncStatus::Pushed
            }
            Ok(SyncOutcome::NoChanges) => {
                info!("No data changes to sync for property {}", id);
                SyncStatus::NoChanges
            }
            Err(e) => {
                error!("Error while syncing property {}: {}", id, e);
                SyncStatus::Failed {
                    stage: e.stage,
                    message: e.message,
                }
            }
        }
    }
}
