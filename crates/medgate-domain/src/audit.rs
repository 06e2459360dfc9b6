//! Audit action tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What an audit entry documents. Stored as SCREAMING_SNAKE_CASE text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Verification code issued for a (doctor, patient) pair.
    OtpSent,
    /// Verification attempt, successful or not.
    OtpVerify,
    /// Gated read of the patient overview.
    PatientOverview,
    /// Gated report upload.
    ReportUpload,
    /// Gated report download by a doctor.
    ReportDownload,
    /// Gated prescription write.
    PrescriptionCreate,
    /// Refused dispense of a non-active prescription.
    DispenseAttempt,
    /// Prescription dispensed.
    Dispensed,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown audit action: {0}")]
pub struct UnknownAuditAction(pub String);

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OtpSent => "OTP_SENT",
            Self::OtpVerify => "OTP_VERIFY",
            Self::PatientOverview => "PATIENT_OVERVIEW",
            Self::ReportUpload => "REPORT_UPLOAD",
            Self::ReportDownload => "REPORT_DOWNLOAD",
            Self::PrescriptionCreate => "PRESCRIPTION_CREATE",
            Self::DispenseAttempt => "DISPENSE_ATTEMPT",
            Self::Dispensed => "DISPENSED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OTP_SENT" => Ok(Self::OtpSent),
            "OTP_VERIFY" => Ok(Self::OtpVerify),
            "PATIENT_OVERVIEW" => Ok(Self::PatientOverview),
            "REPORT_UPLOAD" => Ok(Self::ReportUpload),
            "REPORT_DOWNLOAD" => Ok(Self::ReportDownload),
            "PRESCRIPTION_CREATE" => Ok(Self::PrescriptionCreate),
            "DISPENSE_ATTEMPT" => Ok(Self::DispenseAttempt),
            "DISPENSED" => Ok(Self::Dispensed),
            other => Err(UnknownAuditAction(other.to_owned())),
        }
    }
}
