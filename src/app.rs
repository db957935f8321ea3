use std::{sync::mpsc, time::Duration};

use anyhow::Result;

use crate::{
    cli::{Cli, Command},
    domain::{self, store::AppStore},
    infra::{
        self, clipboard::SystemClipboard, country_codes, persistence,
        persistence::FileStatePersistence,
    },
    simulation::{self, otp::SimulatedOtpBackend, runtime::SimulationRuntime},
    ui::{self, ChannelEventSource},
    usecases::{
        self, bootstrap,
        context::AppContext,
        guided_auth::{run_guided_auth, GuidedAuthOutcome, PhoneForm, RetryPolicy, StdTerminal},
        logout::logout_and_reset,
        shell::{DefaultShellOrchestrator, ShellSettings},
        startup::{acquire_session_lock, plan_startup, StartupFlowState},
    },
};

const AUTH_TUI_BOOTSTRAP_FAILED: &str = "AUTH_TUI_BOOTSTRAP_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        simulation = simulation::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    match cli.command_or_default() {
        Command::Run => run_chat(&bootstrap::bootstrap(cli.config.as_deref())?),
        Command::Logout => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            let outcome = logout_and_reset(&context.layout)?;
            if outcome.was_logged_in {
                println!("Logged out. Chats are kept; run gemclone to log in again.");
            } else {
                println!("No active session. Nothing to do.");
            }
            Ok(())
        }
        Command::Countries => list_countries(&bootstrap::bootstrap(cli.config.as_deref())?),
    }
}

/// Login when needed, then the TUI; a logout inside the TUI loops back to login.
fn run_chat(context: &AppContext) -> Result<()> {
    let _lock = acquire_session_lock(context.layout.session_lock_file())?;

    let (sender, receiver) = mpsc::channel();
    let runtime = SimulationRuntime::start(sender)?;
    let mut event_source = ChannelEventSource::new(
        receiver,
        Duration::from_millis(context.config.ui.tick_rate_ms),
    );

    loop {
        let plan = plan_startup(&context.layout, now_ms())?;
        let mut store = plan.store;
        let freshly_authenticated = plan.state == StartupFlowState::GuidedAuth;

        if freshly_authenticated {
            tracing::info!(code = "AUTH_REQUIRED", "starting guided CLI login");
            let Some(auth) = authenticate(context, &runtime)? else {
                return Ok(());
            };
            store.set_auth_state(auth);
            persistence::save_store(&context.layout.store_file(), &store.persisted())?;
        }

        let mut orchestrator = DefaultShellOrchestrator::new(
            store,
            FileStatePersistence::new(&context.layout),
            SystemClipboard,
            &runtime,
            ShellSettings::from_config(&context.config),
        );

        if let Err(error) = ui::shell::start(context, &mut event_source, &mut orchestrator) {
            if freshly_authenticated {
                report_post_auth_tui_bootstrap_failure(&error);
                return Ok(());
            }
            return Err(error);
        }

        if still_logged_in(orchestrator.store()) {
            return Ok(());
        }
        tracing::info!(code = "AUTH_LOGGED_OUT", "returning to login");
    }
}

fn still_logged_in(store: &AppStore) -> bool {
    store.state().auth.is_logged_in
}

/// Runs the phone and code prompts; `None` when the user gave up.
fn authenticate(
    context: &AppContext,
    runtime: &SimulationRuntime,
) -> Result<Option<domain::auth::AuthState>> {
    let phone_form = PhoneForm {
        default_dial_code: context.config.auth.default_dial_code.clone(),
        catalog: load_country_catalog(context, runtime),
    };
    let backend = SimulatedOtpBackend::from_config(&context.config.simulation);
    let mut dispatcher = backend.clone();
    let mut verifier = backend;
    let mut terminal = StdTerminal;

    let outcome = run_guided_auth(
        &mut terminal,
        &mut dispatcher,
        &mut verifier,
        &phone_form,
        &RetryPolicy::default(),
    )?;

    match outcome {
        GuidedAuthOutcome::Authenticated(auth) => Ok(Some(auth)),
        GuidedAuthOutcome::ExitWithGuidance => {
            tracing::info!(code = "AUTH_ABORTED", "guided login ended without a session");
            Ok(None)
        }
    }
}

/// Without a catalog, any well-formed dial code is accepted.
fn load_country_catalog(
    context: &AppContext,
    runtime: &SimulationRuntime,
) -> Option<Vec<domain::country::CountryCode>> {
    let timeout = Duration::from_millis(context.config.auth.countries_timeout_ms);
    let fetched = country_codes::HttpCountryCodes::new(
        runtime.handle(),
        context.config.auth.countries_url.clone(),
        timeout,
    )
    .and_then(|source| source.fetch_blocking());

    match fetched {
        Ok(catalog) if !catalog.is_empty() => Some(catalog),
        Ok(_) => None,
        Err(error) => {
            tracing::warn!(
                code = "COUNTRY_CODES_UNAVAILABLE",
                %error,
                "continuing without dial-code validation"
            );
            None
        }
    }
}

fn list_countries(context: &AppContext) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(context.config.auth.countries_timeout_ms))
        .build()?;

    let catalog = runtime.block_on(country_codes::fetch_country_codes(
        &client,
        &context.config.auth.countries_url,
    ))?;

    for country in &catalog {
        println!(
            "{} {:<6} {} ({})",
            country.flag_emoji(),
            country.dial_code,
            country.name,
            country.code
        );
    }
    Ok(())
}

fn report_post_auth_tui_bootstrap_failure(error: &anyhow::Error) {
    tracing::error!(
        code = AUTH_TUI_BOOTSTRAP_FAILED,
        error = ?error,
        "TUI failed to start after a successful login"
    );

    for line in post_auth_tui_fallback_lines(AUTH_TUI_BOOTSTRAP_FAILED) {
        eprintln!("{line}");
    }
}

fn post_auth_tui_fallback_lines(error_code: &str) -> [String; 3] {
    [
        "Login successful. Your session is saved.".to_owned(),
        format!("{error_code}: the chat screen failed to start in this run."),
        "Please restart gemclone to continue with the saved session.".to_owned(),
    ]
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
