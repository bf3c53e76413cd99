//! # Identifier Newtypes
//!
//! Validated newtypes for the identifiers Popbill endpoints require in
//! exact formats:
//!
//! - [`CorpNum`]: business registration number, 10 digits
//! - [`JobId`]: hometax collection job ID, 18 characters (opaque)
//! - [`NtsConfirmNum`]: NTS tax-document confirmation number, 24 characters
//! - [`Ymd`]: `YYYYMMDD` calendar date with real month/day bounds
//!
//! ## Validation
//!
//! All validation happens in `new()`; a constructed value is always
//! well-formed. Deserialization routes through `new()` as well, so invalid
//! values coming off the wire are rejected rather than silently accepted.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Business registration number of a Popbill member corporation.
///
/// Canonical form is 10 digits without dashes. The constructor accepts
/// both `"1234567890"` and `"123-45-67890"` (dashes stripped).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorpNum(String);

impl_validating_deserialize!(CorpNum);

impl CorpNum {
    /// Create a business registration number, validating the 10-digit form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCorpNum`] if the string is not
    /// exactly 10 digits after stripping dashes.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(ValidationError::Missing("CorpNum"));
        }
        let digits: String = raw.chars().filter(|c| *c != '-').collect();
        if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCorpNum(raw));
        }
        Ok(Self(digits))
    }

    /// Access the canonical 10-digit string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorpNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hometax collection job identifier.
///
/// Opaque, service-assigned, always exactly 18 characters. Any other width
/// is a client-side input error — the service is never consulted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(String);

impl_validating_deserialize!(JobId);

impl JobId {
    /// Create a job ID, validating the 18-character width.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJobId`] if the string is not
    /// exactly 18 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::Missing("JobID"));
        }
        if s.chars().count() != 18 {
            return Err(ValidationError::InvalidJobId(s));
        }
        Ok(Self(s))
    }

    /// Access the job ID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NTS (National Tax Service) confirmation number of an issued tax document.
///
/// Always exactly 24 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NtsConfirmNum(String);

impl_validating_deserialize!(NtsConfirmNum);

impl NtsConfirmNum {
    /// Create a confirmation number, validating the 24-character width.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfirmNum`] if the string is not
    /// exactly 24 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::Missing("NTSConfirmNum"));
        }
        if s.chars().count() != 24 {
            return Err(ValidationError::InvalidConfirmNum(s));
        }
        Ok(Self(s))
    }

    /// Access the confirmation number string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NtsConfirmNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar date in the service's `YYYYMMDD` wire form.
///
/// # Validation
///
/// - Exactly 8 ASCII digits (no separators — `"2025-01-01"` is rejected)
/// - Month 1–12, day valid for the month including leap years
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ymd(String);

impl_validating_deserialize!(Ymd);

impl Ymd {
    /// Create a date, validating the 8-digit form and calendar bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDate`] if the string is not
    /// 8 digits or does not name a real calendar date.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::Missing("Date"));
        }
        if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidDate(s));
        }
        // Lengths checked above; the slices below are digit-only ASCII.
        let year: i32 = s[0..4].parse().map_err(|_| ValidationError::InvalidDate(s.clone()))?;
        let month: u32 = s[4..6].parse().map_err(|_| ValidationError::InvalidDate(s.clone()))?;
        let day: u32 = s[6..8].parse().map_err(|_| ValidationError::InvalidDate(s.clone()))?;
        if chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(ValidationError::InvalidDate(s));
        }
        Ok(Self(s))
    }

    /// Access the `YYYYMMDD` string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ymd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller's identity for a single request: the registered member
/// corporation plus an optional acting sub-user.
///
/// Immutable; supplied per call, never stored by the client beyond the
/// duration of that call (the token cache keys off it, but holds no
/// authoritative copy).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerIdentity {
    /// Member corporation's business registration number.
    pub corp_num: CorpNum,
    /// Acting sub-user ID, when the call is made on a user's behalf.
    pub user_id: Option<String>,
}

impl PartnerIdentity {
    /// Create an identity for a member corporation with no acting sub-user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCorpNum`] for a malformed
    /// registration number.
    pub fn new(corp_num: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            corp_num: CorpNum::new(corp_num)?,
            user_id: None,
        })
    }

    /// Attach an acting sub-user ID.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl std::fmt::Display for PartnerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.user_id {
            Some(user) => write!(f, "{}/{}", self.corp_num, user),
            None => write!(f, "{}", self.corp_num),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- CorpNum ----------------------------------------------------------------

    #[test]
    fn corp_num_accepts_10_digits() {
        let num = CorpNum::new("1234567890").unwrap();
        assert_eq!(num.as_str(), "1234567890");
    }

    #[test]
    fn corp_num_strips_dashes() {
        let num = CorpNum::new("123-45-67890").unwrap();
        assert_eq!(num.as_str(), "1234567890");
    }

    #[test]
    fn corp_num_rejects_wrong_length() {
        assert!(CorpNum::new("123456789").is_err());
        assert!(CorpNum::new("12345678901").is_err());
    }

    #[test]
    fn corp_num_rejects_non_digits() {
        let result = CorpNum::new("123456789a");
        assert!(matches!(result, Err(ValidationError::InvalidCorpNum(_))));
    }

    #[test]
    fn corp_num_rejects_empty() {
        assert_eq!(CorpNum::new(""), Err(ValidationError::Missing("CorpNum")));
    }

    // -- JobId ------------------------------------------------------------------

    #[test]
    fn job_id_accepts_18_chars() {
        let id = JobId::new("202501011234567890").unwrap();
        assert_eq!(id.as_str(), "202501011234567890");
    }

    #[test]
    fn job_id_rejects_17_and_19_chars() {
        assert!(matches!(
            JobId::new("20250101123456789"),
            Err(ValidationError::InvalidJobId(_))
        ));
        assert!(matches!(
            JobId::new("2025010112345678901"),
            Err(ValidationError::InvalidJobId(_))
        ));
    }

    #[test]
    fn job_id_rejects_empty() {
        assert_eq!(JobId::new(""), Err(ValidationError::Missing("JobID")));
    }

    // -- NtsConfirmNum ------------------------------------------------------------

    #[test]
    fn confirm_num_accepts_24_chars() {
        let num = NtsConfirmNum::new("202501014100002030000117").unwrap();
        assert_eq!(num.as_str().len(), 24);
    }

    #[test]
    fn confirm_num_rejects_other_widths() {
        assert!(NtsConfirmNum::new("20250101410000203000011").is_err());
        assert!(NtsConfirmNum::new("2025010141000020300001177").is_err());
    }

    // -- Ymd --------------------------------------------------------------------

    #[test]
    fn ymd_accepts_valid_date() {
        assert_eq!(Ymd::new("20250101").unwrap().as_str(), "20250101");
        assert_eq!(Ymd::new("20250131").unwrap().as_str(), "20250131");
    }

    #[test]
    fn ymd_accepts_leap_day() {
        assert!(Ymd::new("20240229").is_ok());
    }

    #[test]
    fn ymd_rejects_non_leap_feb_29() {
        assert!(matches!(
            Ymd::new("20250229"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn ymd_rejects_month_and_day_out_of_range() {
        assert!(Ymd::new("20251301").is_err());
        assert!(Ymd::new("20250132").is_err());
        assert!(Ymd::new("20250400").is_err());
    }

    #[test]
    fn ymd_rejects_separators() {
        let result = Ymd::new("2025-01-01");
        assert!(matches!(result, Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn ymd_rejects_empty() {
        assert_eq!(Ymd::new(""), Err(ValidationError::Missing("Date")));
    }

    // -- PartnerIdentity ----------------------------------------------------------

    #[test]
    fn identity_validates_corp_num() {
        assert!(PartnerIdentity::new("bad").is_err());
        let identity = PartnerIdentity::new("1234567890").unwrap();
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn identity_with_user_id() {
        let identity = PartnerIdentity::new("1234567890")
            .unwrap()
            .with_user_id("testuser");
        assert_eq!(identity.user_id.as_deref(), Some("testuser"));
        assert_eq!(identity.to_string(), "1234567890/testuser");
    }

    // -- Validating deserialization ------------------------------------------------

    #[test]
    fn deserialize_rejects_invalid_job_id() {
        let result: Result<JobId, _> = serde_json::from_str("\"too-short\"");
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_accepts_valid_job_id() {
        let id: JobId = serde_json::from_str("\"202501011234567890\"").unwrap();
        assert_eq!(id.as_str(), "202501011234567890");
    }

    #[test]
    fn validation_error_names_field() {
        assert_eq!(
            ValidationError::InvalidDate("x".into()).field(),
            "Date"
        );
        assert_eq!(
            ValidationError::InvalidJobId("x".into()).field(),
            "JobID"
        );
    }
}
