//! # Inventory
//!
//! Read side of the project and flat inventory, plus project admin calls.
//! The backend owns flat status; nothing here changes it.

use std::collections::BTreeMap;
use std::sync::Arc;

use estate_core::validation::validate_required;
use estate_core::{Flat, FlatKey, FlatStatus, NewProject, Project, ProjectName};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::InventoryApi;
use crate::error::{ClientError, ClientResult};

/// Flats grouped by block, then floor. Both levels iterate in order.
pub type BlockLayout = BTreeMap<String, BTreeMap<i32, Vec<Flat>>>;

/// Free/booked/sold counts over a set of flats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub free: u32,
    pub booked: u32,
    pub sold: u32,
}

impl StatusTally {
    pub fn total(&self) -> u32 {
        self.free + self.booked + self.sold
    }
}

/// Groups flats for display. Flats within a floor keep their input order.
pub fn group_by_block_floor(flats: &[Flat]) -> BlockLayout {
    let mut layout = BlockLayout::new();
    for flat in flats {
        layout
            .entry(flat.block.clone())
            .or_default()
            .entry(flat.floor)
            .or_default()
            .push(flat.clone());
    }
    layout
}

pub fn tally(flats: &[Flat]) -> StatusTally {
    flats.iter().fold(StatusTally::default(), |mut t, flat| {
        match flat.status {
            FlatStatus::Free => t.free += 1,
            FlatStatus::Booked => t.booked += 1,
            FlatStatus::Sold => t.sold += 1,
        }
        t
    })
}

#[derive(Debug)]
pub struct Inventory<B> {
    backend: Arc<B>,
}

impl<B> Clone for Inventory<B> {
    fn clone(&self) -> Self {
        Inventory {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: InventoryApi> Inventory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Inventory { backend }
    }

    pub async fn projects(&self) -> ClientResult<Vec<Project>> {
        self.backend.projects().await
    }

    pub async fn project_names(&self) -> ClientResult<Vec<ProjectName>> {
        self.backend.project_names().await
    }

    pub async fn project_flats(&self, project_id: &str) -> ClientResult<Vec<Flat>> {
        let project_id = validate_required("project id", project_id)?;
        let flats = self.backend.project_flats(&project_id).await?;
        debug!(project_id = %project_id, count = flats.len(), "Loaded flats");
        Ok(flats)
    }

    /// Looks a flat up within its project's flat list.
    pub async fn find_flat(&self, key: &FlatKey) -> ClientResult<Flat> {
        self.project_flats(&key.project_id)
            .await?
            .into_iter()
            .find(|f| f.flat_id == key.flat_id)
            .ok_or_else(|| ClientError::NotFound(format!("flat {}", key)))
    }

    pub async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        validate_required("project name", &project.name)?;
        let created = self.backend.create_project(project).await?;
        info!(
            project_id = %created.project_id,
            flats = project.flats.len(),
            "Project created"
        );
        Ok(created)
    }

    pub async fn delete_project(&self, project_id: &str) -> ClientResult<()> {
        let project_id = validate_required("project id", project_id)?;
        self.backend.delete_project(&project_id).await?;
        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }
}
