use super::{ApiClient, ErrorText};
use crate::error::ApiError;
use crate::models::{Elderly, Medication, NewElderly, NewMedication, NewTask, Task};

const ELDERLY: ErrorText = ErrorText::new("Elderly person not found", "Invalid elderly data");

pub async fn fetch_elderly_list(client: &ApiClient) -> Result<Vec<Elderly>, ApiError> {
    client.get_json("/elderly", ELDERLY).await
}

pub async fn fetch_elderly(client: &ApiClient, id: u64) -> Result<Elderly, ApiError> {
    client.get_json(&format!("/elderly/{}", id), ELDERLY).await
}

pub async fn create_elderly(client: &ApiClient, elderly: &NewElderly) -> Result<Elderly, ApiError> {
    client.post_json("/elderly", elderly, ELDERLY).await
}

pub async fn delete_elderly(client: &ApiClient, id: u64) -> Result<(), ApiError> {
    client.delete(&format!("/elderly/{}", id), ELDERLY).await
}

pub async fn add_task(client: &ApiClient, elderly_id: u64, task: &NewTask) -> Result<Task, ApiError> {
    client
        .post_json(&format!("/elderly/{}/tasks", elderly_id), task, ELDERLY)
        .await
}

pub async fn add_medication(
    client: &ApiClient,
    elderly_id: u64,
    medication: &NewMedication,
) -> Result<Medication, ApiError> {
    client
        .post_json(
            &format!("/elderly/{}/medications", elderly_id),
            medication,
            ELDERLY,
        )
        .await
}
