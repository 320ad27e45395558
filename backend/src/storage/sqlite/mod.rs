//! SQLite implementations of the storage traits.

pub mod activity_repository;
pub mod medication_repository;
pub mod patient_repository;

pub use activity_repository::ActivityRepository;
pub use medication_repository::MedicationRepository;
pub use patient_repository::PatientRepository;
