//! Line-based phone → OTP login that runs before the TUI.

use std::io;

use thiserror::Error;

use crate::{
    domain::{
        auth::{
            full_phone_number, validate_dial_code, validate_phone_number, AuthFlow,
            AuthFlowError, AuthState, AuthStep, CodeVerdict,
        },
        country::{is_known_dial_code, CountryCode},
    },
    infra::secrets::mask_phone,
};

const INVALID_OTP_TEXT: &str = "Invalid OTP. Please try again.";
const RESEND_COMMAND: &str = "r";
const CHANGE_NUMBER_COMMAND: &str = "c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub phone_attempts: usize,
    pub code_attempts: usize,
    /// Total verification codes one login may request.
    pub code_sends: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            phone_attempts: 3,
            code_attempts: 3,
            code_sends: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("AUTH_DISPATCH_UNAVAILABLE: the code could not be sent ({0})")]
    Unavailable(String),
}

/// Delivers a verification code to a phone number.
pub trait CodeDispatcher {
    fn send_code(&mut self, phone: &str) -> Result<(), DispatchError>;

    /// Extra guidance printed after a successful send.
    fn hint(&self) -> Option<String> {
        None
    }
}

/// Decides whether a code is valid for a phone number.
pub trait OtpVerifier {
    fn verify(&mut self, phone: &str, code: &str) -> CodeVerdict;
}

pub trait AuthTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()>;
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct StdTerminal;

impl AuthTerminal for StdTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        use std::io::Write;

        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(value) => Ok(Some(value.trim().to_owned())),
            Err(source) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(source) => Err(source),
        }
    }
}

/// Dial-code settings for the phone step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneForm {
    pub default_dial_code: String,
    /// `None` when the country list could not be loaded.
    pub catalog: Option<Vec<CountryCode>>,
}

impl PhoneForm {
    fn accepts_dial_code(&self, dial_code: &str) -> bool {
        self.catalog
            .as_deref()
            .map_or(true, |catalog| is_known_dial_code(catalog, dial_code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedAuthOutcome {
    Authenticated(AuthState),
    ExitWithGuidance,
}

enum CodeStep {
    Verified,
    Resend,
    ChangeNumber,
    GaveUp,
}

pub fn run_guided_auth(
    terminal: &mut dyn AuthTerminal,
    dispatcher: &mut dyn CodeDispatcher,
    verifier: &mut dyn OtpVerifier,
    phone_form: &PhoneForm,
    retry_policy: &RetryPolicy,
) -> io::Result<GuidedAuthOutcome> {
    terminal.print_line("You are not logged in. Starting phone login.")?;
    if phone_form.catalog.is_none() {
        terminal.print_line(
            "Country list is unavailable; any dial code of + and 1-4 digits is accepted.",
        )?;
    }

    let mut flow = AuthFlow::default();

    loop {
        match flow.step().clone() {
            AuthStep::PhoneEntry { prefill } => {
                let phone = match prefill {
                    Some(phone) => phone,
                    None => match collect_phone(terminal, phone_form, retry_policy.phone_attempts)? {
                        Some(phone) => phone,
                        None => return Ok(GuidedAuthOutcome::ExitWithGuidance),
                    },
                };

                if flow.codes_sent() >= retry_policy.code_sends {
                    terminal.print_line(
                        "AUTH_TOO_MANY_CODES: too many codes requested. Run gemclone again later.",
                    )?;
                    return Ok(GuidedAuthOutcome::ExitWithGuidance);
                }

                if !send_code(terminal, dispatcher, &phone)? {
                    return Ok(GuidedAuthOutcome::ExitWithGuidance);
                }
                flow.code_sent(phone).map_err(flow_error)?;
            }
            AuthStep::OtpPending { .. } => {
                match collect_code(terminal, verifier, &mut flow, retry_policy.code_attempts)? {
                    CodeStep::Verified => {}
                    CodeStep::Resend => {
                        flow.resend().map_err(flow_error)?;
                    }
                    CodeStep::ChangeNumber => flow.change_number().map_err(flow_error)?,
                    CodeStep::GaveUp => return Ok(GuidedAuthOutcome::ExitWithGuidance),
                }
            }
            AuthStep::Authenticated { .. } => {
                terminal.print_line("Login Successful! Welcome.")?;
                return Ok(GuidedAuthOutcome::Authenticated(flow.auth_state()));
            }
        }
    }
}

fn collect_phone(
    terminal: &mut dyn AuthTerminal,
    phone_form: &PhoneForm,
    attempts: usize,
) -> io::Result<Option<String>> {
    for attempt in 1..=attempts {
        let attempts_left = attempts.saturating_sub(attempt);
        terminal.print_line("Step 1/2: enter your country dial code and phone number.")?;

        let Some(raw_dial_code) =
            terminal.prompt_line(&format!("Dial code [{}]: ", phone_form.default_dial_code))?
        else {
            terminal.print_line("Input cancelled (EOF). Run gemclone again to retry.")?;
            return Ok(None);
        };

        let dial_code = normalize_dial_code(&raw_dial_code, &phone_form.default_dial_code);
        if let Err(error) = validate_dial_code(&dial_code) {
            terminal.print_line(&format!("{error} Attempts left: {attempts_left}"))?;
            continue;
        }

        if !phone_form.accepts_dial_code(&dial_code) {
            terminal.print_line(&format!(
                "Unknown dial code {dial_code}. Attempts left: {attempts_left}"
            ))?;
            continue;
        }

        let Some(number) = terminal.prompt_line("Phone number: ")? else {
            terminal.print_line("Input cancelled (EOF). Run gemclone again to retry.")?;
            return Ok(None);
        };

        match validate_phone_number(&number) {
            Ok(number) => return Ok(Some(full_phone_number(&dial_code, number))),
            Err(error) => {
                terminal.print_line(&format!("{error} Attempts left: {attempts_left}"))?;
            }
        }
    }

    terminal.print_line("Phone step failed too many times. Run gemclone again to retry.")?;
    Ok(None)
}

fn send_code(
    terminal: &mut dyn AuthTerminal,
    dispatcher: &mut dyn CodeDispatcher,
    phone: &str,
) -> io::Result<bool> {
    terminal.print_line(&format!("Sending OTP to {phone}..."))?;

    match dispatcher.send_code(phone) {
        Ok(()) => {
            terminal.print_line("OTP sent!")?;
            if let Some(hint) = dispatcher.hint() {
                terminal.print_line(&hint)?;
            }
            Ok(true)
        }
        Err(error) => {
            tracing::warn!(phone = %mask_phone(phone), %error, "code dispatch failed");
            terminal.print_line(&error.to_string())?;
            Ok(false)
        }
    }
}

fn collect_code(
    terminal: &mut dyn AuthTerminal,
    verifier: &mut dyn OtpVerifier,
    flow: &mut AuthFlow,
    attempts: usize,
) -> io::Result<CodeStep> {
    for attempt in 1..=attempts {
        let attempts_left = attempts.saturating_sub(attempt);
        let phone = flow.pending_phone().map(mask_phone).unwrap_or_default();
        terminal.print_line(&format!(
            "Step 2/2: enter the 6-digit code sent to {phone} ('{RESEND_COMMAND}' to resend, '{CHANGE_NUMBER_COMMAND}' to change number)."
        ))?;

        let Some(input) = terminal.prompt_secret("Code: ")? else {
            terminal.print_line("Input cancelled (EOF). Run gemclone again to retry.")?;
            return Ok(CodeStep::GaveUp);
        };

        match input.trim() {
            RESEND_COMMAND => return Ok(CodeStep::Resend),
            CHANGE_NUMBER_COMMAND => return Ok(CodeStep::ChangeNumber),
            _ => {}
        }

        terminal.print_line("Verifying OTP...")?;
        match flow.submit_otp(&input, |phone, code| verifier.verify(phone, code)) {
            Ok(CodeVerdict::Accepted) => return Ok(CodeStep::Verified),
            Ok(CodeVerdict::Rejected) => {
                terminal.print_line(&format!("{INVALID_OTP_TEXT} Attempts left: {attempts_left}"))?;
            }
            Err(AuthFlowError::Otp(error)) => {
                terminal.print_line(&format!("{error} Attempts left: {attempts_left}"))?;
            }
            Err(error) => return Err(flow_error(error)),
        }
    }

    terminal.print_line("Code step failed too many times. Run gemclone again to retry.")?;
    Ok(CodeStep::GaveUp)
}

/// Empty input takes the default; a missing `+` is added.
fn normalize_dial_code(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default.to_owned()
    } else if trimmed.starts_with('+') {
        trimmed.to_owned()
    } else {
        format!("+{trimmed}")
    }
}

fn flow_error(error: AuthFlowError) -> io::Error {
    io::Error::other(error)
}
