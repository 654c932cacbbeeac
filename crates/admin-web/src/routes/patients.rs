//! Patient CRUD API routes and the patients page.

use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::models::{Patient, PatientFields};
use database::patient;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::state::AppState;

/// Patients page template.
#[derive(Template)]
#[template(path = "patients.html")]
pub struct PatientsTemplate {
    pub patients: Vec<Patient>,
}

/// Patient form payload (create and edit share the same shape).
///
/// Only the identifying fields are required; everything else defaults to
/// empty, matching the store's column defaults. The UI deduplicates the
/// allergy list before submitting; the store does not.
#[derive(Debug, Deserialize)]
pub struct PatientPayload {
    pub medical_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
}

impl From<PatientPayload> for PatientFields {
    fn from(payload: PatientPayload) -> Self {
        PatientFields {
            medical_id: payload.medical_id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            date_of_birth: payload.date_of_birth,
            phone: payload.phone,
            email: payload.email,
            allergies: payload.allergies,
            medical_history: payload.medical_history,
            emergency_contact_name: payload.emergency_contact_name,
            emergency_contact_phone: payload.emergency_contact_phone,
        }
    }
}

/// Render the patients page.
pub async fn patients_page(State(state): State<AppState>) -> Result<PatientsTemplate> {
    let patients = patient::list_patients(state.db.pool()).await?;
    Ok(PatientsTemplate { patients })
}

/// List all patients, newest first.
pub async fn list_api(State(state): State<AppState>) -> Result<Json<Vec<Patient>>> {
    let patients = patient::list_patients(state.db.pool()).await?;
    Ok(Json(patients))
}

/// Create a patient. The medical ID is upper-cased on entry.
pub async fn create_api(
    State(state): State<AppState>,
    Json(payload): Json<PatientPayload>,
) -> Result<(StatusCode, Json<Patient>)> {
    let id = Uuid::new_v4().to_string();
    let created = patient::create_patient(state.db.pool(), &id, &payload.into()).await?;
    info!(patient_id = %created.id, medical_id = %created.medical_id, "Patient created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a patient.
pub async fn update_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PatientPayload>,
) -> Result<Json<Patient>> {
    let updated = patient::update_patient(state.db.pool(), &id, &payload.into()).await?;
    info!(patient_id = %id, "Patient updated");

    Ok(Json(updated))
}

/// Delete a patient. Their call logs survive with the reference cleared.
pub async fn delete_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    patient::delete_patient(state.db.pool(), &id).await?;
    info!(patient_id = %id, "Patient deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}
