//! Patient CRUD operations.
//!
//! Medical IDs are normalized to upper case on every write and lookup, so
//! "med001" and "MED001" always address the same record.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Patient, PatientFields};

const PATIENT_COLUMNS: &str = "id, medical_id, first_name, last_name, date_of_birth, \
     phone, email, allergies, medical_history, emergency_contact_name, \
     emergency_contact_phone, created_at, updated_at";

/// Create a new patient and return the stored row.
pub async fn create_patient(pool: &SqlitePool, id: &str, fields: &PatientFields) -> Result<Patient> {
    let medical_id = fields.medical_id.to_uppercase();

    sqlx::query(
        r#"
        INSERT INTO patients (id, medical_id, first_name, last_name, date_of_birth,
                              phone, email, allergies, medical_history,
                              emergency_contact_name, emergency_contact_phone)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&medical_id)
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.date_of_birth)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(Json(&fields.allergies))
    .bind(&fields.medical_history)
    .bind(&fields.emergency_contact_name)
    .bind(&fields.emergency_contact_phone)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Patient", &medical_id))?;

    get_patient(pool, id).await
}

/// Get a patient by local ID.
pub async fn get_patient(pool: &SqlitePool, id: &str) -> Result<Patient> {
    sqlx::query_as::<_, Patient>(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Patient",
        id: id.to_string(),
    })
}

/// Find a patient by medical ID (case-insensitive exact match).
pub async fn find_patient_by_medical_id(
    pool: &SqlitePool,
    medical_id: &str,
) -> Result<Option<Patient>> {
    let patient = sqlx::query_as::<_, Patient>(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE medical_id = ?"
    ))
    .bind(medical_id.to_uppercase())
    .fetch_optional(pool)
    .await?;

    Ok(patient)
}

/// Find the first patient with an exact phone match.
///
/// Phone numbers are not unique; the pre-call webhook takes whichever row
/// sorts first.
pub async fn find_patient_by_phone(pool: &SqlitePool, phone: &str) -> Result<Option<Patient>> {
    let patient = sqlx::query_as::<_, Patient>(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE phone = ? ORDER BY created_at LIMIT 1"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(patient)
}

/// List all patients, newest first.
pub async fn list_patients(pool: &SqlitePool) -> Result<Vec<Patient>> {
    let patients = sqlx::query_as::<_, Patient>(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(patients)
}

/// Update a patient's fields and bump `updated_at`.
pub async fn update_patient(
    pool: &SqlitePool,
    id: &str,
    fields: &PatientFields,
) -> Result<Patient> {
    let medical_id = fields.medical_id.to_uppercase();

    let result = sqlx::query(
        r#"
        UPDATE patients
        SET medical_id = ?, first_name = ?, last_name = ?, date_of_birth = ?,
            phone = ?, email = ?, allergies = ?, medical_history = ?,
            emergency_contact_name = ?, emergency_contact_phone = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&medical_id)
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.date_of_birth)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(Json(&fields.allergies))
    .bind(&fields.medical_history)
    .bind(&fields.emergency_contact_name)
    .bind(&fields.emergency_contact_phone)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Patient", &medical_id))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Patient",
            id: id.to_string(),
        });
    }

    get_patient(pool, id).await
}

/// Delete a patient by ID. Call logs referencing them keep their history
/// with `patient_id` cleared.
pub async fn delete_patient(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM patients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Patient",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total patients.
pub async fn count_patients(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
