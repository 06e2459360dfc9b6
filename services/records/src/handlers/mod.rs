pub mod account;
pub mod doctor;
pub mod files;
pub mod identity;
pub mod multipart;
pub mod patient;
pub mod pharmacist;
pub mod views;
