//! Patient registry backed by SQLite

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::Patient;

/// Patient registry over a single SQLite database file
pub struct PatientStore {
    conn: Mutex<Connection>,
}

impl PatientStore {
    /// Open (or create) the registry under the configured storage directory
    pub fn open(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.storage_dir)?;
        Self::open_at(&config.storage_dir.join("patients.db"))
    }

    /// Open the registry at an explicit path (used by tests)
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS patients (
                patient_id       TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                age              INTEGER,
                gender           TEXT,
                height_cm        REAL,
                weight_kg        REAL,
                diabetes_type    TEXT,
                duration_years   REAL,
                comorbidities    TEXT,
                latest_hba1c     REAL,
                current_meds     TEXT,
                egfr_ml_min      REAL,
                recent_symptoms  TEXT,
                created_at       TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new patient record
    pub fn insert(&self, patient: &Patient) -> Result<()> {
        let created_at = patient.created_at.unwrap_or_else(chrono::Utc::now);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO patients
                (patient_id, name, age, gender, height_cm, weight_kg, diabetes_type,
                 duration_years, comorbidities, latest_hba1c, current_meds,
                 egfr_ml_min, recent_symptoms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                patient.patient_id,
                patient.name,
                patient.age,
                patient.gender,
                patient.height_cm,
                patient.weight_kg,
                patient.diabetes_type,
                patient.duration_years,
                patient.comorbidities,
                patient.latest_hba1c,
                patient.current_meds,
                patient.egfr_ml_min,
                patient.recent_symptoms,
                created_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient record
    pub fn update(&self, patient: &Patient) -> Result<()> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE patients SET
                name = ?2, age = ?3, gender = ?4, height_cm = ?5, weight_kg = ?6,
                diabetes_type = ?7, duration_years = ?8, comorbidities = ?9,
                latest_hba1c = ?10, current_meds = ?11, egfr_ml_min = ?12,
                recent_symptoms = ?13
             WHERE patient_id = ?1",
            params![
                patient.patient_id,
                patient.name,
                patient.age,
                patient.gender,
                patient.height_cm,
                patient.weight_kg,
                patient.diabetes_type,
                patient.duration_years,
                patient.comorbidities,
                patient.latest_hba1c,
                patient.current_meds,
                patient.egfr_ml_min,
                patient.recent_symptoms,
            ],
        )?;

        if updated == 0 {
            return Err(Error::PatientNotFound(patient.patient_id.clone()));
        }
        Ok(())
    }

    /// Get a patient by ID
    pub fn get(&self, patient_id: &str) -> Result<Option<Patient>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE patient_id = ?1", SELECT_PATIENT),
            params![patient_id],
            row_to_patient,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all patients, newest first
    pub fn list(&self) -> Result<Vec<Patient>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_PATIENT))?;
        let rows = stmt.query_map([], row_to_patient)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Delete a patient by ID
    pub fn delete(&self, patient_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM patients WHERE patient_id = ?1",
            params![patient_id],
        )?;
        if deleted == 0 {
            return Err(Error::PatientNotFound(patient_id.to_string()));
        }
        Ok(())
    }
}

const SELECT_PATIENT: &str = "SELECT patient_id, name, age, gender, height_cm, weight_kg,
        diabetes_type, duration_years, comorbidities, latest_hba1c, current_meds,
        egfr_ml_min, recent_symptoms, created_at FROM patients";

fn row_to_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let created_at: chrono::DateTime<chrono::Utc> = row.get(13)?;

    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        height_cm: row.get(4)?,
        weight_kg: row.get(5)?,
        diabetes_type: row.get(6)?,
        duration_years: row.get(7)?,
        comorbidities: row.get(8)?,
        latest_hba1c: row.get(9)?,
        current_meds: row.get(10)?,
        egfr_ml_min: row.get(11)?,
        recent_symptoms: row.get(12)?,
        created_at: Some(created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_patient(id: &str) -> Patient {
        Patient {
            patient_id: id.to_string(),
            name: "Jane Doe".to_string(),
            age: Some(54),
            gender: Some("F".to_string()),
            height_cm: Some(165.0),
            weight_kg: Some(82.5),
            diabetes_type: Some("Type 2".to_string()),
            duration_years: Some(6.0),
            comorbidities: Some("hypertension".to_string()),
            latest_hba1c: Some(8.1),
            current_meds: Some("metformin 1000mg BID".to_string()),
            egfr_ml_min: Some(74.0),
            recent_symptoms: None,
            created_at: None,
        }
    }

    fn open_store() -> (tempfile::TempDir, PatientStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PatientStore::open_at(&dir.path().join("patients.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn crud_round_trip() {
        let (_dir, store) = open_store();

        store.insert(&make_patient("P-001")).unwrap();

        let fetched = store.get("P-001").unwrap().unwrap();
        assert_eq!(fetched.name, "Jane Doe");
        assert_eq!(fetched.latest_hba1c, Some(8.1));
        assert!(fetched.created_at.is_some());

        let mut updated = fetched.clone();
        updated.latest_hba1c = Some(7.2);
        store.update(&updated).unwrap();
        assert_eq!(store.get("P-001").unwrap().unwrap().latest_hba1c, Some(7.2));

        assert_eq!(store.list().unwrap().len(), 1);

        store.delete("P-001").unwrap();
        assert!(store.get("P-001").unwrap().is_none());
    }

    #[test]
    fn update_missing_patient_fails() {
        let (_dir, store) = open_store();
        let err = store.update(&make_patient("missing")).unwrap_err();
        assert!(matches!(err, Error::PatientNotFound(_)));
    }

    #[test]
    fn delete_missing_patient_fails() {
        let (_dir, store) = open_store();
        assert!(matches!(
            store.delete("missing").unwrap_err(),
            Error::PatientNotFound(_)
        ));
    }
}
