use std::{thread, time::Duration};

use crate::{
    domain::auth::CodeVerdict,
    infra::{config::SimulationConfig, secrets::mask_phone},
    usecases::guided_auth::{CodeDispatcher, DispatchError, OtpVerifier},
};

/// Stand-in for an SMS gateway: "sends" after a delay and accepts one fixed code.
#[derive(Debug, Clone)]
pub struct SimulatedOtpBackend {
    send_delay: Duration,
    verify_delay: Duration,
    accepted_code: String,
}

impl SimulatedOtpBackend {
    pub fn new(send_delay: Duration, verify_delay: Duration, accepted_code: impl Into<String>) -> Self {
        Self {
            send_delay,
            verify_delay,
            accepted_code: accepted_code.into(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            Duration::from_millis(config.otp_send_delay_ms),
            Duration::from_millis(config.otp_verify_delay_ms),
            config.accepted_otp.clone(),
        )
    }

    pub fn accepted_code(&self) -> &str {
        &self.accepted_code
    }
}

impl CodeDispatcher for SimulatedOtpBackend {
    fn send_code(&mut self, phone: &str) -> Result<(), DispatchError> {
        thread::sleep(self.send_delay);
        tracing::info!(
            code = "AUTH_CODE_SENT",
            phone = %mask_phone(phone),
            "simulated verification code sent"
        );
        Ok(())
    }

    fn hint(&self) -> Option<String> {
        Some(format!("Hint: use {} to log in.", self.accepted_code))
    }
}

impl OtpVerifier for SimulatedOtpBackend {
    fn verify(&mut self, _phone: &str, code: &str) -> CodeVerdict {
        thread::sleep(self.verify_delay);
        if code == self.accepted_code {
            CodeVerdict::Accepted
        } else {
            CodeVerdict::Rejected
        }
    }
}
