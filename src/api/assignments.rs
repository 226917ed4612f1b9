//! Caregiver/elderly assignment links and the lookups that join them.
//!
//! The backend only exposes the full assignment list, so resolving one side of
//! the relation means filtering that list locally and fetching each
//! counterpart by id. Any failed lookup fails the whole resolution.

use super::caregivers::{fetch_caregiver, fetch_caregivers};
use super::elderly::{fetch_elderly, fetch_elderly_list};
use super::{ApiClient, ErrorText};
use crate::error::ApiError;
use crate::models::{Assignment, Caregiver, Elderly, NewAssignment};
use futures::future::try_join_all;
use std::collections::HashSet;
use tracing::{debug, error};

const LIST: ErrorText = ErrorText::new("Assignments not found", "Invalid assignment data");
const CREATE: ErrorText = ErrorText::new(
    "Caregiver or elderly person not found",
    "Invalid assignment data",
);
const DELETE: ErrorText = ErrorText::new("Assignment not found", "Invalid assignment data");

pub async fn fetch_assignments(client: &ApiClient) -> Result<Vec<Assignment>, ApiError> {
    client.get_json("/caregiver-assignments", LIST).await
}

pub async fn create_assignment(
    client: &ApiClient,
    caregiver_id: u64,
    elderly_id: u64,
) -> Result<Assignment, ApiError> {
    let body = NewAssignment {
        caregiver_id,
        elderly_id,
    };
    client
        .post_json("/caregiver-assignments", &body, CREATE)
        .await
}

/// Deletes the link between the pair. The backend deletes by row id, so the
/// row is looked up in the full list first.
pub async fn delete_assignment(
    client: &ApiClient,
    caregiver_id: u64,
    elderly_id: u64,
) -> Result<(), ApiError> {
    let snapshot = AssignmentSnapshot::load(client).await?;
    let row = snapshot
        .find(caregiver_id, elderly_id)
        .ok_or_else(|| ApiError::NotFound(DELETE.not_found.to_string()))?;
    client
        .delete(&format!("/caregiver-assignments/{}", row.id), DELETE)
        .await
}

/// Elderly records linked to the caregiver. Empty when none match.
pub async fn elderly_for_caregiver(
    client: &ApiClient,
    caregiver_id: u64,
) -> Result<Vec<Elderly>, ApiError> {
    let snapshot = AssignmentSnapshot::load(client).await?;
    snapshot
        .elderly_for(client, caregiver_id)
        .await
        .inspect_err(|err| error!("Error getting elderly for caregiver {}: {}", caregiver_id, err))
}

/// Caregivers linked to the elderly client. Empty when none match.
pub async fn caregivers_for_elderly(
    client: &ApiClient,
    elderly_id: u64,
) -> Result<Vec<Caregiver>, ApiError> {
    let snapshot = AssignmentSnapshot::load(client).await?;
    snapshot
        .caregivers_for(client, elderly_id)
        .await
        .inspect_err(|err| error!("Error getting caregivers for elderly {}: {}", elderly_id, err))
}

/// One fetched copy of the assignment list, reused for the lifetime of a
/// single interaction such as an open assignment modal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssignmentSnapshot {
    rows: Vec<Assignment>,
}

impl AssignmentSnapshot {
    pub fn new(rows: Vec<Assignment>) -> AssignmentSnapshot {
        AssignmentSnapshot { rows }
    }

    pub async fn load(client: &ApiClient) -> Result<AssignmentSnapshot, ApiError> {
        let rows = fetch_assignments(client).await?;
        debug!("loaded {} assignment rows", rows.len());
        Ok(AssignmentSnapshot::new(rows))
    }

    pub fn find(&self, caregiver_id: u64, elderly_id: u64) -> Option<&Assignment> {
        self.rows
            .iter()
            .find(|a| a.caregiver_id == caregiver_id && a.elderly_id == elderly_id)
    }

    pub fn is_linked(&self, caregiver_id: u64, elderly_id: u64) -> bool {
        self.find(caregiver_id, elderly_id).is_some()
    }

    /// Counterpart ids in list order, duplicates dropped.
    pub fn elderly_ids_for(&self, caregiver_id: u64) -> Vec<u64> {
        unique(
            self.rows
                .iter()
                .filter(|a| a.caregiver_id == caregiver_id)
                .map(|a| a.elderly_id),
        )
    }

    pub fn caregiver_ids_for(&self, elderly_id: u64) -> Vec<u64> {
        unique(
            self.rows
                .iter()
                .filter(|a| a.elderly_id == elderly_id)
                .map(|a| a.caregiver_id),
        )
    }

    pub async fn elderly_for(
        &self,
        client: &ApiClient,
        caregiver_id: u64,
    ) -> Result<Vec<Elderly>, ApiError> {
        let ids = self.elderly_ids_for(caregiver_id);
        try_join_all(ids.into_iter().map(|id| fetch_elderly(client, id))).await
    }

    pub async fn caregivers_for(
        &self,
        client: &ApiClient,
        elderly_id: u64,
    ) -> Result<Vec<Caregiver>, ApiError> {
        let ids = self.caregiver_ids_for(elderly_id);
        try_join_all(ids.into_iter().map(|id| fetch_caregiver(client, id))).await
    }
}

fn unique(ids: impl Iterator<Item = u64>) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// A record paired with whether it is linked to the entity a modal is open for.
#[derive(Clone, Debug, PartialEq)]
pub struct Linked<T> {
    pub record: T,
    pub assigned: bool,
}

/// Every elderly client, flagged by whether the caregiver is assigned to them.
pub async fn elderly_with_status(
    client: &ApiClient,
    caregiver_id: u64,
) -> Result<Vec<Linked<Elderly>>, ApiError> {
    let (all, snapshot) =
        futures::try_join!(fetch_elderly_list(client), AssignmentSnapshot::load(client))?;
    Ok(all
        .into_iter()
        .map(|record| Linked {
            assigned: snapshot.is_linked(caregiver_id, record.id),
            record,
        })
        .collect())
}

/// Every caregiver, flagged by whether they are assigned to the elderly client.
pub async fn caregivers_with_status(
    client: &ApiClient,
    elderly_id: u64,
) -> Result<Vec<Linked<Caregiver>>, ApiError> {
    let (all, snapshot) =
        futures::try_join!(fetch_caregivers(client), AssignmentSnapshot::load(client))?;
    Ok(all
        .into_iter()
        .map(|record| Linked {
            assigned: snapshot.is_linked(record.id, elderly_id),
            record,
        })
        .collect())
}
