use sqlx::PgPool;
use tracing::info;

use crate::models::{MedicalRecord, NewMedicalRecord, NewPatient, Patient};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Patient {0} not found")]
    PatientNotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn insert_patient(pg_con_pool: &PgPool, patient: &NewPatient) -> Result<Patient, StoreError> {
    let created: Patient = sqlx::query_as(
        "INSERT INTO patients (first_name, last_name, dob, consent_status)
         VALUES ($1, $2, $3, $4)
         RETURNING id, first_name, last_name, dob, consent_status, created_at",
    )
    .bind(&patient.first_name)
    .bind(&patient.last_name)
    .bind(&patient.dob)
    .bind(patient.consent_status)
    .fetch_one(pg_con_pool)
    .await?;

    info!("Created patient {}", created.id);
    Ok(created)
}

pub async fn get_patient(pg_con_pool: &PgPool, patient_id: i32) -> Result<Option<Patient>, StoreError> {
    let patient: Option<Patient> = sqlx::query_as(
        "SELECT id, first_name, last_name, dob, consent_status, created_at
         FROM patients WHERE id = $1",
    )
    .bind(patient_id)
    .fetch_optional(pg_con_pool)
    .await?;
    Ok(patient)
}

pub async fn list_patients(pg_con_pool: &PgPool) -> Result<Vec<Patient>, StoreError> {
    let patients: Vec<Patient> = sqlx::query_as(
        "SELECT id, first_name, last_name, dob, consent_status, created_at
         FROM patients ORDER BY id",
    )
    .fetch_all(pg_con_pool)
    .await?;
    Ok(patients)
}

/// Inserts a record for an existing patient; an unknown `patient_id` is
/// `PatientNotFound`.
pub async fn insert_medical_record(
    pg_con_pool: &PgPool,
    patient_id: i32,
    record: &NewMedicalRecord,
) -> Result<MedicalRecord, StoreError> {
    if get_patient(pg_con_pool, patient_id).await?.is_none() {
        return Err(StoreError::PatientNotFound(patient_id));
    }

    let created: MedicalRecord = sqlx::query_as(
        "INSERT INTO medical_records (patient_id, record_type, record_content)
         VALUES ($1, $2, $3)
         RETURNING id, patient_id, record_type, record_content, created_at",
    )
    .bind(patient_id)
    .bind(&record.record_type)
    .bind(&record.record_content)
    .fetch_one(pg_con_pool)
    .await?;

    info!("Created {} record {} for patient {}", created.record_type, created.id, patient_id);
    Ok(created)
}

pub async fn list_medical_records(pg_con_pool: &PgPool, patient_id: i32) -> Result<Vec<MedicalRecord>, StoreError> {
    if get_patient(pg_con_pool, patient_id).await?.is_none() {
        return Err(StoreError::PatientNotFound(patient_id));
    }

    let records: Vec<MedicalRecord> = sqlx::query_as(
        "SELECT id, patient_id, record_type, record_content, created_at
         FROM medical_records WHERE patient_id = $1 ORDER BY id",
    )
    .bind(patient_id)
    .fetch_all(pg_con_pool)
    .await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_utils::{create_tables, get_pg_connection_pool};
    use sqlx::postgres::PgConnectOptions;
    use std::time::Duration;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pg_options: PgConnectOptions = url.parse().unwrap();
        let pool = get_pg_connection_pool(&pg_options, 1, Duration::ZERO, Duration::from_secs(5))
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance in DATABASE_URL"]
    async fn duplicate_patients_are_allowed() {
        let pool = test_pool().await;
        let new_patient = NewPatient {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            dob: "1990-01-01".to_string(),
            consent_status: true,
        };

        let first = insert_patient(&pool, &new_patient).await.unwrap();
        let second = insert_patient(&pool, &new_patient).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(get_patient(&pool, first.id).await.unwrap().unwrap().last_name, "Doe");
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance in DATABASE_URL"]
    async fn records_belong_to_existing_patients() {
        let pool = test_pool().await;
        let record = NewMedicalRecord {
            record_type: "OCR".to_string(),
            record_content: "Example Medical Report Data".to_string(),
        };

        let err = insert_medical_record(&pool, i32::MAX, &record).await.unwrap_err();
        assert!(matches!(err, StoreError::PatientNotFound(id) if id == i32::MAX));

        let patient = insert_patient(
            &pool,
            &NewPatient {
                first_name: "Jane".to_string(),
                last_name: "Roe".to_string(),
                dob: "1985-05-05".to_string(),
                consent_status: false,
            },
        )
        .await
        .unwrap();
        let created = insert_medical_record(&pool, patient.id, &record).await.unwrap();
        let records = list_medical_records(&pool, patient.id).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, created.id);
        assert_eq!(records[0].record_content, "Example Medical Report Data");
    }
}
