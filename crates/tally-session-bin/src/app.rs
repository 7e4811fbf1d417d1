//! Wires the session stack together and runs one command.

use std::sync::Arc;
use std::time::Duration;

use command_client::{CommandClient, HttpTransport};
use reactive_store::Store;
use serde_json::json;
use session_coordinator::{
    store_keys, Account, CoordinatorConfig, SessionCoordinator, SessionPorts,
};
use tally_config_and_utils::{Config, Paths};
use tracing::{info, warn};

use crate::ports::{ConsoleNavigator, LocalDeviceIdentity, LoggedRealtime};
use crate::{Commands, TwoFactorAction};

/// `LogOut` is fire-and-forget; give it this long before the runtime stops.
const LOGOUT_GRACE: Duration = Duration::from_secs(2);

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

pub async fn run(
    command: Commands,
    config: Config,
    paths: &Paths,
    initial_url: Option<String>,
) -> AppResult<()> {
    let store_path = paths.store_file();
    let store = Store::load(&store_path)?;

    let transport = HttpTransport::new(
        config.api_root()?,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let client = Arc::new(CommandClient::new(Arc::new(transport), store.clone()));
    let ports = SessionPorts {
        realtime: Arc::new(LoggedRealtime),
        device_identity: Arc::new(LocalDeviceIdentity::new(paths.device_id_file())),
        navigator: Arc::new(ConsoleNavigator::new(initial_url)),
    };
    let coordinator =
        SessionCoordinator::new(store.clone(), client, ports, CoordinatorConfig::from(&config));

    let cached = coordinator.session().auto_auth_state;
    coordinator.init_auto_auth_state(cached);

    execute(&coordinator, command).await;

    store.persist(&store_path)?;
    info!("session store saved");
    Ok(())
}

async fn execute(coordinator: &SessionCoordinator, command: Commands) {
    match command {
        Commands::BeginSignIn { email } => {
            coordinator.begin_sign_in(&email).await;
            report_account(coordinator);
        }
        Commands::SignIn { code, tfa } => {
            coordinator.sign_in(&code, tfa.as_deref()).await;
            report_account(coordinator);
            print_status(coordinator);
        }
        Commands::MagicLink {
            account_id,
            code,
            tfa,
        } => {
            coordinator
                .sign_in_with_validate_code(account_id, &code, tfa.as_deref())
                .await;
            report_account(coordinator);
            print_status(coordinator);
        }
        Commands::SignOut => {
            coordinator.sign_out_and_redirect_to_sign_in().await;
            tokio::time::sleep(LOGOUT_GRACE).await;
        }
        Commands::Status => print_status(coordinator),
        Commands::SupportToken {
            token,
            email,
            account_id,
        } => {
            coordinator.set_support_auth_token(&token, &email, account_id);
            print_status(coordinator);
        }
        Commands::TwoFactor { action } => {
            match action {
                TwoFactorAction::Enable => coordinator.toggle_two_factor_auth(true).await,
                TwoFactorAction::Disable => coordinator.toggle_two_factor_auth(false).await,
                TwoFactorAction::Validate { code } => {
                    coordinator.validate_two_factor_auth(&code).await
                }
            }
            report_account(coordinator);
        }
        Commands::RouteCheck { route } => {
            let allowed = coordinator.can_access_route_by_anonymous_user(&route);
            println!("{route}: {}", if allowed { "allowed" } else { "sign-in required" });
        }
    }
}

fn print_status(coordinator: &SessionCoordinator) {
    let session = coordinator.session();
    let status = json!({
        "signedIn": coordinator.has_auth_token(),
        "anonymous": coordinator.is_anonymous_user(),
        "support": coordinator.is_support_auth_token(),
        "email": session.email,
        "accountID": session.account_id,
        "autoAuthState": session.auto_auth_state,
    });
    match serde_json::to_string_pretty(&status) {
        Ok(text) => println!("{text}"),
        Err(err) => warn!(error = %err, "could not render status"),
    }
}

fn report_account(coordinator: &SessionCoordinator) {
    let Some(account) = coordinator.store().get_typed::<Account>(store_keys::ACCOUNT) else {
        return;
    };
    for key in account.errors.iter().flat_map(|errors| errors.values()) {
        eprintln!("error: {key}");
    }
    if let Some(message) = account.message {
        println!("{message}");
    }
    if let Some(success) = account.success {
        println!("{success}");
    }
}
