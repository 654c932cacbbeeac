//! The provider-invoked function endpoint: patient lookup by Medical ID.
//!
//! The response is conversational content, not just data: `message` is read
//! aloud to the caller, so its wording is part of the product surface. Both
//! the "missing id" and "not found" outcomes are HTTP 200 with
//! `success:false` so the live call keeps going.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::patient;
use database::{DatabaseError, SqlitePool};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::state::AppState;

/// Lookup request from the provider's tool-use mechanism.
#[derive(Debug, Deserialize)]
pub struct PatientLookupRequest {
    #[serde(default)]
    pub medical_id: Option<String>,
}

/// Lookup response consumed by the voice provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientLookupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Spoken to the caller verbatim.
    pub message: String,
}

/// The curated patient subset exposed mid-call.
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientInfo {
    pub medical_id: String,
    pub name: String,
    pub date_of_birth: String,
    pub phone: String,
    pub email: String,
    pub allergies: Vec<String>,
    pub medical_history: String,
    pub emergency_contact: EmergencyContact,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// Handle a patient-info function call.
pub async fn get_patient_info(
    State(state): State<AppState>,
    Json(request): Json<PatientLookupRequest>,
) -> Response {
    match handle_lookup(state.db.pool(), &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(error = %err, "Patient lookup failed");
            let body = PatientLookupResponse {
                success: false,
                patient: None,
                error: Some("System error".to_string()),
                message: "I'm experiencing technical difficulties. Please try again \
                          or contact the front desk."
                    .to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Lookup logic, separated from the HTTP wrapper for testing.
async fn handle_lookup(
    pool: &SqlitePool,
    request: &PatientLookupRequest,
) -> Result<PatientLookupResponse, DatabaseError> {
    let medical_id = match request.medical_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            return Ok(PatientLookupResponse {
                success: false,
                patient: None,
                error: Some("Medical ID is required".to_string()),
                message: "Please provide your Medical ID to retrieve your information."
                    .to_string(),
            });
        }
    };

    let Some(patient) = patient::find_patient_by_medical_id(pool, medical_id).await? else {
        return Ok(PatientLookupResponse {
            success: false,
            patient: None,
            error: Some("Patient not found".to_string()),
            message: format!(
                "I couldn't find a patient with Medical ID {medical_id}. Please verify \
                 your ID or contact the front desk for assistance."
            ),
        });
    };

    info!(medical_id = %patient.medical_id, "Patient info retrieved");

    let medical_history = if patient.medical_history.is_empty() {
        "No medical history on file".to_string()
    } else {
        patient.medical_history.clone()
    };

    Ok(PatientLookupResponse {
        success: true,
        patient: Some(PatientInfo {
            medical_id: patient.medical_id.clone(),
            name: format!("{} {}", patient.first_name, patient.last_name),
            date_of_birth: patient.date_of_birth.clone(),
            phone: patient.phone.clone(),
            email: patient.email.clone(),
            allergies: patient.allergies.0.clone(),
            medical_history,
            emergency_contact: EmergencyContact {
                name: patient.emergency_contact_name.clone(),
                phone: patient.emergency_contact_phone.clone(),
            },
        }),
        error: None,
        message: format!(
            "Hello {}! I found your information. How can I help you today?",
            patient.first_name
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::PatientFields;
    use database::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_john_doe(pool: &SqlitePool) {
        patient::create_patient(
            pool,
            "pat-1",
            &PatientFields {
                medical_id: "MED001".to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                date_of_birth: "1985-03-14".to_string(),
                phone: "+15551234567".to_string(),
                email: "john@example.com".to_string(),
                allergies: vec!["Penicillin".to_string()],
                medical_history: String::new(),
                emergency_contact_name: "Jane Doe".to_string(),
                emergency_contact_phone: "+15557654321".to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let db = test_db().await;
        seed_john_doe(db.pool()).await;

        let response = handle_lookup(
            db.pool(),
            &PatientLookupRequest {
                medical_id: Some("MED001".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(response.success);
        let patient = response.patient.unwrap();
        assert_eq!(patient.medical_id, "MED001");
        assert_eq!(patient.name, "John Doe");
        assert_eq!(patient.medical_history, "No medical history on file");
        assert_eq!(patient.emergency_contact.name, "Jane Doe");
        assert_eq!(
            response.message,
            "Hello John! I found your information. How can I help you today?"
        );
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let db = test_db().await;
        seed_john_doe(db.pool()).await;

        let response = handle_lookup(
            db.pool(),
            &PatientLookupRequest {
                medical_id: Some("med001".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.patient.unwrap().medical_id, "MED001");
    }

    #[tokio::test]
    async fn test_lookup_not_found_is_a_spoken_message() {
        let db = test_db().await;

        let response = handle_lookup(
            db.pool(),
            &PatientLookupRequest {
                medical_id: Some("MED999".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(!response.success);
        assert!(response.patient.is_none());
        assert_eq!(response.error.as_deref(), Some("Patient not found"));
        assert_eq!(
            response.message,
            "I couldn't find a patient with Medical ID MED999. Please verify \
             your ID or contact the front desk for assistance."
        );
    }

    #[tokio::test]
    async fn test_lookup_missing_id() {
        let db = test_db().await;

        let response = handle_lookup(db.pool(), &PatientLookupRequest { medical_id: None })
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Medical ID is required"));
        assert_eq!(
            response.message,
            "Please provide your Medical ID to retrieve your information."
        );
    }
}
