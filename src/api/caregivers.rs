use super::{ApiClient, Download, ErrorText};
use crate::error::ApiError;
use crate::models::{Caregiver, NewCaregiver, SalaryUpdate};
use serde_json::Value;

const CAREGIVER: ErrorText = ErrorText::new("Caregiver not found", "Invalid caregiver data");

pub async fn fetch_caregivers(client: &ApiClient) -> Result<Vec<Caregiver>, ApiError> {
    client.get_json("/caregivers", CAREGIVER).await
}

pub async fn fetch_caregiver(client: &ApiClient, id: u64) -> Result<Caregiver, ApiError> {
    client
        .get_json(&format!("/caregivers/{}", id), CAREGIVER)
        .await
}

pub async fn create_caregiver(
    client: &ApiClient,
    caregiver: &NewCaregiver,
) -> Result<Caregiver, ApiError> {
    client.post_json("/caregivers", caregiver, CAREGIVER).await
}

pub async fn update_caregiver_salary(
    client: &ApiClient,
    id: u64,
    salary: &SalaryUpdate,
) -> Result<Value, ApiError> {
    client
        .put_json(&format!("/caregivers/{}/update-salary", id), salary, CAREGIVER)
        .await
}

pub async fn delete_caregiver(client: &ApiClient, id: u64) -> Result<(), ApiError> {
    client
        .delete(&format!("/caregivers/{}", id), CAREGIVER)
        .await
}

/// The caregiver's salary report as raw PDF bytes.
pub async fn generate_caregiver_pdf(client: &ApiClient, id: u64) -> Result<Download, ApiError> {
    client
        .get_bytes(
            &format!("/caregivers/{}/generate-pdf", id),
            "application/pdf",
            CAREGIVER,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;

    fn new_caregiver(custom_id: u64) -> NewCaregiver {
        NewCaregiver {
            custom_id,
            name: "Noa Cohen".into(),
            bank_name: "Leumi".into(),
            bank_account: "12345".into(),
            branch_number: "800".into(),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let backend = FakeBackend::start().await;
        let client = backend.client();

        let created = create_caregiver(&client, &new_caregiver(204)).await.unwrap();
        assert_eq!(created.custom_id, Some(204));

        let all = fetch_caregivers(&client).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Noa Cohen");
    }

    #[tokio::test]
    async fn test_duplicate_custom_id_surfaces_backend_detail() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        create_caregiver(&client, &new_caregiver(1)).await.unwrap();
        let err = create_caregiver(&client, &new_caregiver(1)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Caregiver with this ID already exists for this user"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_from_next_list() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        let keep = backend.seed_caregiver("Keep", [1.0, 1.0, 1.0]);
        let gone = backend.seed_caregiver("Gone", [1.0, 1.0, 1.0]);

        delete_caregiver(&client, gone).await.unwrap();

        let ids: Vec<u64> = fetch_caregivers(&client)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn test_missing_caregiver_is_not_found() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        let err = fetch_caregiver(&client, 99).await.unwrap_err();
        assert_eq!(err.to_string(), "Caregiver not found");
        let err = delete_caregiver(&client, 99).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_salary_stores_components() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        let id = backend.seed_caregiver("Noa", [0.0, 0.0, 0.0]);
        let update = SalaryUpdate {
            salary_price: 50.0,
            salary_amount: 10.0,
            saturday_price: 80.0,
            saturday_amount: 2.0,
            allowance_price: 5.0,
            allowance_amount: 4.0,
        };
        update_caregiver_salary(&client, id, &update).await.unwrap();

        let caregiver = fetch_caregiver(&client, id).await.unwrap();
        assert_eq!(caregiver.salary.price, 50.0);
        assert_eq!(caregiver.saturday.amount, 2.0);
        assert_eq!(caregiver.total_bank, 680.0);
        assert_eq!(caregiver.card_total(), 135.0);
    }

    #[tokio::test]
    async fn test_pdf_bytes_are_returned_verbatim() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        let id = backend.seed_caregiver("Noa", [1.0, 1.0, 1.0]);
        let report = generate_caregiver_pdf(&client, id).await.unwrap();
        assert!(report.bytes.starts_with(b"%PDF-1.4"));
        let expected = format!("caregiver_{}_report.pdf", id + 100);
        assert_eq!(report.file_name.as_deref(), Some(expected.as_str()));
    }
}
