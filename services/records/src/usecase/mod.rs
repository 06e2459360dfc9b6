pub mod access;
pub mod account;
pub mod audit;
pub mod consent;
pub mod patient;
pub mod prescription;
pub mod session;
pub mod upload;
