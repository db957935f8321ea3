//! Login state machine: phone entry, OTP check, authenticated session.
//!
//! The machine itself is pure. Code delivery and code checking live behind
//! the `CodeDispatcher` and `OtpVerifier` traits in the guided auth use case.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const PHONE_MIN_DIGITS: usize = 6;
const PHONE_MAX_DIGITS: usize = 15;
const OTP_LENGTH: usize = 6;

pub const DEFAULT_USER_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub phone: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
}

impl AuthState {
    pub fn logged_in(user: UserProfile) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhoneValidationError {
    #[error("Phone number must be at least 6 digits long.")]
    TooShort,
    #[error("Phone number cannot exceed 15 digits.")]
    TooLong,
    #[error("Phone number must contain only digits.")]
    NonDigit,
    #[error("Dial code must be + followed by 1-4 digits.")]
    InvalidDialCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpValidationError {
    #[error("The OTP must be exactly 6 digits.")]
    WrongLength,
    #[error("OTP must contain only digits.")]
    NonDigit,
}

/// Validates the national part of a phone number (dial code excluded).
pub fn validate_phone_number(raw: &str) -> Result<&str, PhoneValidationError> {
    let digits = raw.trim();
    let len = digits.chars().count();

    if len < PHONE_MIN_DIGITS {
        return Err(PhoneValidationError::TooShort);
    }
    if len > PHONE_MAX_DIGITS {
        return Err(PhoneValidationError::TooLong);
    }
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(PhoneValidationError::NonDigit);
    }

    Ok(digits)
}

pub fn validate_dial_code(raw: &str) -> Result<&str, PhoneValidationError> {
    let code = raw.trim();
    let digits = code
        .strip_prefix('+')
        .ok_or(PhoneValidationError::InvalidDialCode)?;

    if (1..=4).contains(&digits.len()) && digits.chars().all(|ch| ch.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(PhoneValidationError::InvalidDialCode)
    }
}

pub fn validate_otp(raw: &str) -> Result<&str, OtpValidationError> {
    let code = raw.trim();

    if code.chars().count() != OTP_LENGTH {
        return Err(OtpValidationError::WrongLength);
    }
    if !code.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(OtpValidationError::NonDigit);
    }

    Ok(code)
}

/// Joins dial code and national number from the values current at submit time.
pub fn full_phone_number(dial_code: &str, number: &str) -> String {
    format!("{}{}", dial_code.trim(), number.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStep {
    PhoneEntry { prefill: Option<String> },
    OtpPending { phone: String },
    Authenticated { user: UserProfile },
}

impl AuthStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PhoneEntry { .. } => "PHONE_ENTRY",
            Self::OtpPending { .. } => "OTP_PENDING",
            Self::Authenticated { .. } => "AUTHENTICATED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeVerdict {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFlowError {
    #[error("cannot {action} while in {from}")]
    InvalidTransition {
        action: &'static str,
        from: &'static str,
    },
    #[error(transparent)]
    Otp(#[from] OtpValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFlow {
    step: AuthStep,
    codes_sent: u32,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self {
            step: AuthStep::PhoneEntry { prefill: None },
            codes_sent: 0,
        }
    }
}

impl AuthFlow {
    /// Resumes from a hydrated auth state.
    pub fn from_state(state: &AuthState) -> Self {
        match (&state.user, state.is_logged_in) {
            (Some(user), true) => Self {
                step: AuthStep::Authenticated { user: user.clone() },
                codes_sent: 0,
            },
            _ => Self::default(),
        }
    }

    pub fn step(&self) -> &AuthStep {
        &self.step
    }

    pub fn codes_sent(&self) -> u32 {
        self.codes_sent
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.step, AuthStep::Authenticated { .. })
    }

    pub fn pending_phone(&self) -> Option<&str> {
        match &self.step {
            AuthStep::OtpPending { phone } => Some(phone),
            _ => None,
        }
    }

    /// The dispatcher delivered a code to `phone`.
    pub fn code_sent(&mut self, phone: String) -> Result<(), AuthFlowError> {
        self.require_phone_entry("send code")?;
        self.codes_sent += 1;
        self.step = AuthStep::OtpPending { phone };
        Ok(())
    }

    /// Checks the code format, then asks `verify` for a verdict.
    ///
    /// A rejected code leaves the flow in `OtpPending`.
    pub fn submit_otp<F>(&mut self, raw_code: &str, verify: F) -> Result<CodeVerdict, AuthFlowError>
    where
        F: FnOnce(&str, &str) -> CodeVerdict,
    {
        let AuthStep::OtpPending { phone } = &self.step else {
            return Err(self.invalid("verify code"));
        };

        let phone = phone.clone();
        let code = validate_otp(raw_code)?;
        let verdict = verify(phone.as_str(), code);

        if verdict == CodeVerdict::Accepted {
            self.step = AuthStep::Authenticated {
                user: UserProfile {
                    phone,
                    name: DEFAULT_USER_NAME.to_owned(),
                },
            };
        }

        Ok(verdict)
    }

    /// Back to phone entry with the same number kept for re-sending.
    pub fn resend(&mut self) -> Result<String, AuthFlowError> {
        let AuthStep::OtpPending { phone } = &self.step else {
            return Err(self.invalid("resend code"));
        };

        let phone = phone.clone();
        self.step = AuthStep::PhoneEntry {
            prefill: Some(phone.clone()),
        };
        Ok(phone)
    }

    /// Back to an empty phone form.
    pub fn change_number(&mut self) -> Result<(), AuthFlowError> {
        if !matches!(self.step, AuthStep::OtpPending { .. }) {
            return Err(self.invalid("change number"));
        }

        self.step = AuthStep::PhoneEntry { prefill: None };
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AuthFlowError> {
        if !self.is_authenticated() {
            return Err(self.invalid("log out"));
        }

        *self = Self::default();
        Ok(())
    }

    /// The auth state to publish into the store for the current step.
    pub fn auth_state(&self) -> AuthState {
        match &self.step {
            AuthStep::Authenticated { user } => AuthState::logged_in(user.clone()),
            _ => AuthState::default(),
        }
    }

    fn require_phone_entry(&self, action: &'static str) -> Result<(), AuthFlowError> {
        if matches!(self.step, AuthStep::PhoneEntry { .. }) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> AuthFlowError {
        AuthFlowError::InvalidTransition {
            action,
            from: self.step.label(),
        }
    }
}
