//! Medication and patient roster management.

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use shared::{
    AddMedicationRequest, MedicationResponse, NewMedication, Patient, Recurrence, SetupRequest,
    SetupResponse, ValidationError,
};
use tracing::info;

use crate::domain::DEFAULT_MAX_STOCK;
use crate::storage::{MedicationRepository, MedicationStorage, PatientRepository, PatientStorage};

/// Service for creating and deleting medications and for the initial
/// roster setup
#[derive(Clone)]
pub struct MedicationService {
    medications: MedicationRepository,
    patients: PatientRepository,
}

impl MedicationService {
    pub fn new(medications: MedicationRepository, patients: PatientRepository) -> Self {
        Self { medications, patients }
    }

    /// Create a single medication reminder.
    ///
    /// Stock and fill level default to the standard bottle size; the target
    /// patient defaults to the account's first patient when not specified.
    pub async fn add_medication(&self, request: AddMedicationRequest) -> Result<MedicationResponse> {
        let name = request.name.trim().to_string();
        self.validate_medication_name(&name)?;
        self.validate_schedule_time(&request.time)?;
        let recurrence = request.recurrence.clone().unwrap_or(Recurrence::Daily);
        self.validate_recurrence(&recurrence)?;

        let patient = self.resolve_patient(&request).await?;

        let medication = self
            .medications
            .store_medication(&NewMedication {
                patient_id: patient.id,
                name,
                dosage: request.dosage.unwrap_or_else(|| "1 pill".to_string()),
                instructions: request.instructions.unwrap_or_else(|| "None".to_string()),
                schedule_time: request.time,
                recurrence,
                stock: DEFAULT_MAX_STOCK,
                max_stock: DEFAULT_MAX_STOCK,
            })
            .await?;

        info!(
            "Created medication {} (id {}) for patient {}",
            medication.name, medication.id, patient.name
        );

        Ok(MedicationResponse {
            success_message: format!("Added reminder for {}", medication.name),
            medication,
        })
    }

    /// Delete a medication by ID
    pub async fn delete_medication(&self, medication_id: i64) -> Result<()> {
        let deleted = self.medications.delete_medication(medication_id).await?;
        if !deleted {
            return Err(anyhow!("Medication not found: {}", medication_id));
        }

        info!("Deleted medication {}", medication_id);
        Ok(())
    }

    /// Replace an account's entire patient/medication roster.
    ///
    /// The whole request is validated before any write, then the existing
    /// patients are deleted (cascading to their medications) and the new
    /// roster inserted. The initial stock of each row doubles as its fill
    /// level.
    pub async fn replace_roster(&self, request: SetupRequest) -> Result<SetupResponse> {
        for patient in &request.patients {
            if patient.name.trim().is_empty() {
                return Err(ValidationError::EmptyPatientName.into());
            }
            for med in &patient.meds {
                self.validate_medication_name(med.name.trim())?;
                self.validate_schedule_time(&med.time)?;
                self.validate_recurrence(&med.recurrence)?;
                if med.stock < 0 {
                    return Err(ValidationError::NegativeStock.into());
                }
            }
        }

        let replaced = self.patients.delete_for_account(request.account_id).await?;
        if replaced > 0 {
            info!(
                "Replaced {} existing patients for account {}",
                replaced, request.account_id
            );
        }

        let mut medications_created = 0;
        for patient_data in &request.patients {
            let patient = self
                .patients
                .store_patient(request.account_id, patient_data.name.trim())
                .await?;

            for med in &patient_data.meds {
                self.medications
                    .store_medication(&NewMedication {
                        patient_id: patient.id,
                        name: med.name.trim().to_string(),
                        dosage: med.dosage.clone(),
                        instructions: med.instructions.clone(),
                        schedule_time: med.time.clone(),
                        recurrence: med.recurrence.clone(),
                        stock: med.stock,
                        max_stock: med.stock,
                    })
                    .await?;
                medications_created += 1;
            }
        }

        info!(
            "Set up {} patients with {} medications for account {}",
            request.patients.len(),
            medications_created,
            request.account_id
        );

        Ok(SetupResponse {
            patients_created: request.patients.len(),
            medications_created,
            success_message: "Setup complete".to_string(),
        })
    }

    async fn resolve_patient(&self, request: &AddMedicationRequest) -> Result<Patient> {
        let patient = match request.patient_id {
            Some(id) => self
                .patients
                .get_patient(id)
                .await?
                .ok_or_else(|| anyhow!("Patient not found: {}", id))?,
            None => self
                .patients
                .list_for_account(request.account_id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("No patients exist for account {}", request.account_id))?,
        };

        // A patient id from another account is indistinguishable from an
        // unknown one as far as the caller is concerned.
        if patient.account_id != request.account_id {
            return Err(anyhow!("Patient not found: {}", patient.id));
        }
        Ok(patient)
    }

    fn validate_medication_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyMedicationName);
        }
        if name.len() > 100 {
            return Err(ValidationError::MedicationNameTooLong);
        }
        Ok(())
    }

    fn validate_schedule_time(&self, time: &str) -> Result<(), ValidationError> {
        // Fixed width matters: schedule ordering compares times lexically
        if time.len() != 5 || NaiveTime::parse_from_str(time, "%H:%M").is_err() {
            return Err(ValidationError::InvalidTime(time.to_string()));
        }
        Ok(())
    }

    fn validate_recurrence(&self, recurrence: &Recurrence) -> Result<(), ValidationError> {
        match recurrence {
            Recurrence::OnDays(days) if days.is_empty() => Err(ValidationError::EmptyDaySet),
            _ => Ok(()),
        }
    }
}
