//! The session coordinator.
//!
//! Composes the store, the command client and the external ports into the
//! sign-in, sign-out, gating and channel-authorization flows. Every remote
//! flow follows the same shape: optimistic patches, one command, then
//! success or failure patches. Outcomes are observed through the store;
//! nothing here returns an error to the caller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use command_client::{
    CommandClient, ReadCommand, SideEffectCommand, StoreUpdates, WriteCommand,
};
use parking_lot::Mutex;
use reactive_store::{Connection, Store, StoreUpdate};
use serde_json::{json, Value};
use tally_config_and_utils::{
    Config, DEFAULT_PARTNER_NAME, DEFAULT_PARTNER_PASSWORD, DEFAULT_PUSHER_REAUTH_WINDOW_MS,
    DEFAULT_WEB_APP_URL,
};
use tracing::{debug, error, info, warn};

use crate::auto_auth::{advance_auto_auth, AutoAuthMachineInput, AutoAuthState};
use crate::context::SessionContext;
use crate::keys::{forms, messages, store_keys, DEFAULT_LOCALE};
use crate::ports::{DeviceIdentityProvider, Navigator, ReadinessFlag, RealtimeChannel, SessionPorts};
use crate::realtime::{empty_auth_payload, ChannelAuthCallback, ChannelAuthError};
use crate::routes::{self, SIGN_IN_MODAL_ROUTE, SIGN_IN_ROUTE};
use crate::throttle::{Throttle, TrailingPolicy};
use crate::timers::Timers;
use crate::timing::Timing;
use crate::types::{
    microsecond_error, Account, Credentials, Session, INVALID_AUTH_TOKEN, INVALID_CREDENTIAL,
    SUPPORT_AUTH_TOKEN_TYPE,
};
use crate::waiter::SignInWait;
use crate::{init_auto_auth_state, SessionError, SessionResult};

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub partner_name: String,
    pub partner_password: String,
    /// Web app origin used to parse deep links.
    pub web_app_url: String,
    /// Minimum spacing between real-time re-authentications.
    pub pusher_reauth_window: Duration,
    /// Store keys that survive sign-out.
    pub preserved_keys: Vec<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            partner_name: DEFAULT_PARTNER_NAME.to_string(),
            partner_password: DEFAULT_PARTNER_PASSWORD.to_string(),
            web_app_url: DEFAULT_WEB_APP_URL.to_string(),
            pusher_reauth_window: Duration::from_millis(DEFAULT_PUSHER_REAUTH_WINDOW_MS),
            preserved_keys: vec![store_keys::PREFERRED_LOCALE.to_string()],
        }
    }
}

impl From<&Config> for CoordinatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            partner_name: config.partner_name.clone(),
            partner_password: config.partner_password.clone(),
            web_app_url: config.web_app_url.clone(),
            pusher_reauth_window: Duration::from_millis(config.pusher_reauth_window_ms),
            ..Self::default()
        }
    }
}

struct Inner {
    store: Store,
    client: Arc<CommandClient>,
    context: Arc<SessionContext>,
    realtime: Arc<dyn RealtimeChannel>,
    device_identity: Arc<dyn DeviceIdentityProvider>,
    navigator: Arc<dyn Navigator>,
    reauth_throttle: Throttle,
    timers: Timers,
    timing: Timing,
    welcome_ready: ReadinessFlag,
    priority_mode_read: ReadinessFlag,
    config: CoordinatorConfig,
    /// Last token presence seen by the session watcher.
    signed_in: Arc<AtomicBool>,
    session_watch: Mutex<Option<Connection>>,
    sign_in_seq: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(connection) = self.session_watch.get_mut().take() {
            self.store.disconnect(&connection);
        }
    }
}

/// Single authority for starting, completing and tearing down a session.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

/// Result of [`SessionCoordinator::check_if_action_is_allowed`].
pub enum GatedAction<F> {
    /// The caller's callback, returned untouched.
    Allowed(F),
    /// Replacement that redirects to sign-in instead of running the callback.
    Blocked(RedirectToSignIn),
}

impl<F> GatedAction<F> {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GatedAction::Allowed(_))
    }

    pub fn into_allowed(self) -> Option<F> {
        match self {
            GatedAction::Allowed(callback) => Some(callback),
            GatedAction::Blocked(_) => None,
        }
    }
}

impl<F, R> GatedAction<F>
where
    F: FnOnce() -> R,
{
    /// Run the callback, or redirect to sign-in when blocked.
    pub async fn invoke(self) -> Option<R> {
        match self {
            GatedAction::Allowed(callback) => Some(callback()),
            GatedAction::Blocked(redirect) => {
                redirect.run().await;
                None
            }
        }
    }
}

/// Deferred `sign_out_and_redirect_to_sign_in`.
pub struct RedirectToSignIn {
    coordinator: SessionCoordinator,
}

impl RedirectToSignIn {
    pub async fn run(self) {
        self.coordinator.sign_out_and_redirect_to_sign_in().await;
    }
}

fn loading(form: &str) -> StoreUpdate {
    StoreUpdate::merge(
        store_keys::ACCOUNT,
        json!({"isLoading": true, "loadingForm": form, "errors": null, "message": null}),
    )
}

fn loading_done() -> StoreUpdate {
    StoreUpdate::merge(
        store_keys::ACCOUNT,
        json!({"isLoading": false, "loadingForm": null}),
    )
}

impl SessionCoordinator {
    pub fn new(
        store: Store,
        client: Arc<CommandClient>,
        ports: SessionPorts,
        config: CoordinatorConfig,
    ) -> Self {
        let context = SessionContext::attach(&store);
        let reauth_throttle = Throttle::new(config.pusher_reauth_window, TrailingPolicy::Drop);
        let coordinator = Self {
            inner: Arc::new(Inner {
                store,
                client,
                context,
                realtime: ports.realtime,
                device_identity: ports.device_identity,
                navigator: ports.navigator,
                reauth_throttle,
                timers: Timers::new(),
                timing: Timing::new(),
                welcome_ready: ReadinessFlag::new(),
                priority_mode_read: ReadinessFlag::new(),
                config,
                signed_in: Arc::new(AtomicBool::new(false)),
                session_watch: Mutex::new(None),
                sign_in_seq: AtomicU64::new(0),
            }),
        };
        coordinator.watch_session();
        coordinator
    }

    /// Run `cleanup_session` whenever the session loses its token, whoever wiped it.
    fn watch_session(&self) {
        let inner = Arc::downgrade(&self.inner);
        let signed_in = self.inner.signed_in.clone();
        let connection =
            self.inner
                .store
                .connect_typed::<Session, _>(store_keys::SESSION, move |session| {
                    let now = session.is_some_and(|session| session.has_auth_token());
                    let before = signed_in.swap(now, Ordering::SeqCst);
                    if before && !now {
                        if let Some(inner) = inner.upgrade() {
                            info!("session token removed, cleaning up");
                            SessionCoordinator { inner }.cleanup_session();
                        }
                    }
                });
        *self.inner.session_watch.lock() = Some(connection);
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn context(&self) -> &SessionContext {
        &self.inner.context
    }

    pub(crate) fn client(&self) -> &CommandClient {
        &self.inner.client
    }

    pub fn timers(&self) -> &Timers {
        &self.inner.timers
    }

    pub fn timing(&self) -> &Timing {
        &self.inner.timing
    }

    /// Flag owned by the welcome flow, reset on cleanup.
    pub fn welcome_ready_flag(&self) -> ReadinessFlag {
        self.inner.welcome_ready.clone()
    }

    /// Flag owned by the priority-mode feature, reset on cleanup.
    pub fn priority_mode_read_flag(&self) -> ReadinessFlag {
        self.inner.priority_mode_read.clone()
    }

    fn preferred_locale(&self) -> String {
        self.inner
            .store
            .get_typed::<String>(store_keys::PREFERRED_LOCALE)
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
    }

    // ------------------------------------------------------------------
    // Sign-in
    // ------------------------------------------------------------------

    fn begin_updates(&self, login: Option<&str>) -> StoreUpdates {
        let mut success = vec![
            loading_done(),
            StoreUpdate::merge(store_keys::CREDENTIALS, json!({"validateCode": null})),
        ];
        if let Some(login) = login {
            success.push(StoreUpdate::merge(
                store_keys::CREDENTIALS,
                json!({"login": login}),
            ));
        }
        StoreUpdates::new(
            vec![loading(forms::LOGIN)],
            success,
            vec![StoreUpdate::merge(
                store_keys::ACCOUNT,
                json!({
                    "isLoading": false,
                    "loadingForm": null,
                    "errors": microsecond_error(messages::CANNOT_GET_ACCOUNT_DETAILS),
                }),
            )],
        )
    }

    /// Look up the account for `email` and stage it as the login.
    pub async fn begin_sign_in(&self, email: &str) {
        info!("beginning sign in");
        let result = self
            .client()
            .read(
                ReadCommand::BeginSignIn,
                json!({"email": email}),
                self.begin_updates(Some(email)),
            )
            .await;
        if let Err(err) = result {
            warn!(command = "BeginSignIn", error = %err, "begin sign in failed");
        }
    }

    pub async fn begin_apple_sign_in(&self, id_token: &str) {
        let params = json!({"idToken": id_token, "preferredLocale": self.preferred_locale()});
        let result = self
            .client()
            .write(WriteCommand::SignInWithApple, params, self.begin_updates(None))
            .await;
        if let Err(err) = result {
            warn!(command = "SignInWithApple", error = %err, "federated sign in failed");
        }
    }

    pub async fn begin_google_sign_in(&self, token: &str) {
        let params = json!({"token": token, "preferredLocale": self.preferred_locale()});
        let result = self
            .client()
            .write(WriteCommand::SignInWithGoogle, params, self.begin_updates(None))
            .await;
        if let Err(err) = result {
            warn!(command = "SignInWithGoogle", error = %err, "federated sign in failed");
        }
    }

    async fn device_info(&self) -> Option<String> {
        match self.inner.device_identity.device_info_with_id().await {
            Ok(info) => Some(info),
            Err(err) => {
                error!(error = %err, "could not resolve device identity, sign in skipped");
                None
            }
        }
    }

    /// Complete sign-in for the staged login.
    ///
    /// With only a two-factor code, the stored validate code is sent.
    pub async fn sign_in(&self, validate_code: &str, two_factor_auth_code: Option<&str>) {
        let credentials = self.inner.context.credentials();
        let Some(login) = credentials.staged_login().map(str::to_string) else {
            warn!("sign in requested without a staged login");
            return;
        };
        let Some(device_info) = self.device_info().await else {
            return;
        };

        let two_factor = two_factor_auth_code.filter(|code| !code.is_empty());
        let form = if two_factor.is_some() {
            forms::VALIDATE_TFA_CODE
        } else {
            forms::VALIDATE_CODE
        };
        let validate_code = if validate_code.is_empty() && two_factor.is_some() {
            credentials.validate_code.clone().unwrap_or_default()
        } else {
            validate_code.to_string()
        };

        let params = json!({
            "twoFactorAuthCode": two_factor,
            "email": login,
            "preferredLocale": self.preferred_locale(),
            "validateCode": validate_code,
            "deviceInfo": device_info,
        });
        let updates = StoreUpdates::new(
            vec![loading(form)],
            vec![
                loading_done(),
                StoreUpdate::merge(
                    store_keys::CREDENTIALS,
                    json!({"validateCode": validate_code}),
                ),
            ],
            vec![loading_done()],
        );

        // Keyed per call so overlapping sign-ins keep separate measurements.
        let timing_key = format!(
            "sign_in#{}",
            self.inner.sign_in_seq.fetch_add(1, Ordering::Relaxed)
        );
        self.inner.timing.start(&timing_key);
        let result = self
            .client()
            .write(WriteCommand::SigninUser, params, updates)
            .await;
        self.inner.timing.end(&timing_key);
        match result {
            Ok(response) => debug!(json_code = response.json_code, form, "sign in settled"),
            Err(err) => warn!(command = "SigninUser", error = %err, "sign in failed"),
        }
    }

    /// Magic-link sign-in.
    ///
    /// With a two-factor code the stored validate code takes precedence over
    /// `code`, which may be stale by the time the second step runs.
    pub async fn sign_in_with_validate_code(
        &self,
        account_id: u64,
        code: &str,
        two_factor_auth_code: Option<&str>,
    ) {
        let two_factor = two_factor_auth_code.filter(|code| !code.is_empty());
        let validate_code = match two_factor {
            Some(_) => self
                .inner
                .context
                .credentials()
                .validate_code
                .filter(|stored| !stored.is_empty())
                .unwrap_or_else(|| code.to_string()),
            None => code.to_string(),
        };

        let Some(device_info) = self.device_info().await else {
            return;
        };

        let current = self
            .inner
            .context
            .session()
            .auto_auth_state
            .unwrap_or_default();
        let states = advance_auto_auth(current, AutoAuthMachineInput::SignInAttempt).and_then(
            |signing_in| {
                let succeeded =
                    advance_auto_auth(signing_in, AutoAuthMachineInput::SignInSucceeded)?;
                let failed = advance_auto_auth(signing_in, AutoAuthMachineInput::SignInFailed)?;
                Ok((signing_in, succeeded, failed))
            },
        );
        let (signing_in, succeeded, failed) = match states {
            Ok(states) => states,
            Err(err) => {
                error!(error = %err, "auto-auth transition rejected");
                return;
            }
        };

        let params = json!({
            "accountID": account_id,
            "validateCode": validate_code,
            "twoFactorAuthCode": two_factor,
            "preferredLocale": self.preferred_locale(),
            "deviceInfo": device_info,
        });
        let form = if two_factor.is_some() {
            forms::VALIDATE_TFA_CODE
        } else {
            forms::VALIDATE_CODE
        };
        let auto_auth = |state: AutoAuthState| {
            StoreUpdate::merge(store_keys::SESSION, json!({"autoAuthState": state}))
        };
        let updates = StoreUpdates::new(
            vec![loading(form), auto_auth(signing_in)],
            vec![
                loading_done(),
                auto_auth(succeeded),
                StoreUpdate::merge(
                    store_keys::CREDENTIALS,
                    json!({"accountID": account_id, "validateCode": validate_code}),
                ),
            ],
            vec![loading_done(), auto_auth(failed)],
        );

        let result = self
            .client()
            .write(WriteCommand::SigninUserWithLink, params, updates)
            .await;
        if let Err(err) = result {
            warn!(command = "SigninUserWithLink", error = %err, "magic link sign in failed");
        }
    }

    /// Normalise and store the persisted auto-auth state.
    pub fn init_auto_auth_state(&self, cached: Option<AutoAuthState>) -> AutoAuthState {
        let state = init_auto_auth_state(cached);
        self.inner
            .store
            .merge(store_keys::SESSION, json!({"autoAuthState": state}));
        debug!(auto_auth_state = state.as_str(), "auto-auth state initialised");
        state
    }

    pub async fn resend_validate_code(&self, login: Option<&str>) {
        let staged = self.inner.context.credentials();
        let Some(login) = login
            .filter(|login| !login.is_empty())
            .or_else(|| staged.staged_login())
            .map(str::to_string)
        else {
            warn!("validate code requested without a login");
            return;
        };

        let updates = StoreUpdates::new(
            vec![loading(forms::RESEND_VALIDATE_CODE)],
            vec![loading_done()],
            vec![loading_done()],
        );
        let result = self
            .client()
            .write(
                WriteCommand::RequestNewValidateCode,
                json!({"email": login}),
                updates,
            )
            .await;
        if let Err(err) = result {
            warn!(command = "RequestNewValidateCode", error = %err, "resend failed");
        }
    }

    pub async fn sign_in_with_short_lived_auth_token(&self, email: &str, auth_token: &str) {
        let old_partner_user_id = self.inner.context.credentials().auto_generated_login;
        let params = json!({
            "authToken": auth_token,
            "email": email,
            "oldPartnerUserID": old_partner_user_id,
            "skipReauthentication": true,
        });
        let updates = StoreUpdates::new(
            vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": true}))],
            vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
            vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
        );
        let result = self
            .client()
            .write(WriteCommand::SignInWithShortLivedAuthToken, params, updates)
            .await;
        if let Err(err) = result {
            warn!(command = "SignInWithShortLivedAuthToken", error = %err, "sign in failed");
        }
    }

    // ------------------------------------------------------------------
    // Unlink
    // ------------------------------------------------------------------

    pub async fn request_unlink_validation_link(&self) {
        let email = self.inner.context.credentials().login;
        let updates = StoreUpdates::new(
            vec![StoreUpdate::merge(
                store_keys::ACCOUNT,
                json!({"isLoading": true, "errors": null, "message": null}),
            )],
            vec![StoreUpdate::merge(
                store_keys::ACCOUNT,
                json!({"isLoading": false, "message": messages::UNLINK_LINK_SENT}),
            )],
            vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
        );
        let result = self
            .client()
            .write(
                WriteCommand::RequestUnlinkValidationLink,
                json!({"email": email}),
                updates,
            )
            .await;
        if let Err(err) = result {
            warn!(command = "RequestUnlinkValidationLink", error = %err, "request failed");
        }
    }

    pub async fn unlink_login(&self, account_id: u64, validate_code: &str) {
        let updates = StoreUpdates::new(
            vec![StoreUpdate::merge(
                store_keys::ACCOUNT,
                json!({"isLoading": true, "errors": null, "message": null}),
            )],
            vec![
                StoreUpdate::merge(
                    store_keys::ACCOUNT,
                    json!({"isLoading": false, "message": messages::UNLINK_SUCCEEDED}),
                ),
                StoreUpdate::merge(store_keys::CREDENTIALS, json!({"login": null})),
            ],
            vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
        );
        let result = self
            .client()
            .write(
                WriteCommand::UnlinkLogin,
                json!({"accountID": account_id, "validateCode": validate_code}),
                updates,
            )
            .await;
        if let Err(err) = result {
            warn!(command = "UnlinkLogin", error = %err, "unlink failed");
        }
    }

    /// Clear account errors and messages. No write when nothing is showing.
    pub fn clear_account_messages(&self) {
        let account = self
            .inner
            .store
            .get_typed::<Account>(store_keys::ACCOUNT)
            .unwrap_or_default();
        if !account.has_feedback() {
            return;
        }
        self.inner.store.merge(
            store_keys::ACCOUNT,
            json!({"errors": null, "message": null, "success": null}),
        );
    }

    /// Reset a partial multi-step sign-in back to step one.
    pub fn clear_sign_in_data(&self) {
        self.inner.store.multi_set([
            (store_keys::ACCOUNT, Value::Null),
            (store_keys::CREDENTIALS, Value::Null),
        ]);
    }

    // ------------------------------------------------------------------
    // Sign-out
    // ------------------------------------------------------------------

    /// Sign out locally and tell the backend without waiting for it.
    ///
    /// The store is cleared (keeping preserved keys), the session cleaned up
    /// and timing measurements dropped even if `LogOut` fails or never
    /// settles. `LogOut` is only sent when called inside a tokio runtime.
    pub fn sign_out(&self) {
        info!("signing out");
        if let Err(err) = observability::flush() {
            warn!(error = %err, "log flush before sign out failed");
        }

        let credentials: Credentials = self.inner.context.credentials();
        let params = json!({
            "authToken": null,
            "partnerUserID": credentials.auto_generated_login,
            "partnerName": self.inner.config.partner_name,
            "partnerPassword": self.inner.config.partner_password,
            "shouldRetry": false,
        });
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let client = self.inner.client.clone();
                runtime.spawn(async move {
                    match client
                        .write(WriteCommand::LogOut, params, StoreUpdates::default())
                        .await
                    {
                        Ok(response) => debug!(json_code = response.json_code, "logout settled"),
                        Err(err) => warn!(command = "LogOut", error = %err, "logout request failed"),
                    }
                });
            }
            Err(err) => warn!(error = %err, "no async runtime, LogOut not sent"),
        }

        let preserved: Vec<&str> = self
            .inner
            .config
            .preserved_keys
            .iter()
            .map(String::as_str)
            .collect();
        // The session watcher cleans up when this clear removes a token.
        let watcher_cleans_up = self.inner.signed_in.load(Ordering::SeqCst);
        self.inner.store.clear(&preserved);
        if !watcher_cleans_up {
            self.cleanup_session();
        }
        self.inner.timing.clear();
    }

    /// Sign out (or, for anonymous users, offer sign-in) and navigate.
    pub async fn sign_out_and_redirect_to_sign_in(&self) {
        if !self.is_anonymous_user() {
            self.sign_out();
            self.inner.navigator.navigate(SIGN_IN_ROUTE);
            return;
        }

        let navigator = &self.inner.navigator;
        if navigator.is_active_route(SIGN_IN_MODAL_ROUTE) {
            return;
        }

        if let Some(url) = navigator.initial_url().await {
            if let Some(report_id) = routes::report_id_from_url(&url, &self.inner.config.web_app_url)
            {
                debug!("staging public room for post sign-in redirect");
                self.inner
                    .store
                    .set(store_keys::LAST_OPENED_PUBLIC_ROOM_ID, json!(report_id));
            }
        }
        navigator.navigate(SIGN_IN_MODAL_ROUTE);
    }

    /// Tear down state owned by other features after a sign-out.
    pub fn cleanup_session(&self) {
        self.inner.realtime.disconnect();
        let cancelled = self.inner.timers.clear_all();
        self.inner.welcome_ready.reset();
        self.inner.priority_mode_read.reset();
        debug!(cancelled, "session cleaned up");
    }

    // ------------------------------------------------------------------
    // Session state
    // ------------------------------------------------------------------

    pub fn is_anonymous_user(&self) -> bool {
        self.inner.context.session().is_anonymous()
    }

    pub fn has_auth_token(&self) -> bool {
        self.inner.context.session().has_auth_token()
    }

    pub fn is_support_auth_token(&self) -> bool {
        self.inner.context.session().is_support()
    }

    /// Gate `callback` behind a full (non-anonymous) session.
    pub fn check_if_action_is_allowed<F>(
        &self,
        callback: F,
        is_anonymous_action: bool,
    ) -> GatedAction<F> {
        if is_anonymous_action || !self.is_anonymous_user() {
            return GatedAction::Allowed(callback);
        }
        GatedAction::Blocked(RedirectToSignIn {
            coordinator: self.clone(),
        })
    }

    pub fn invalidate_credentials(&self) {
        self.inner.store.merge(
            store_keys::CREDENTIALS,
            json!({
                "autoGeneratedLogin": INVALID_CREDENTIAL,
                "autoGeneratedPassword": INVALID_CREDENTIAL,
            }),
        );
    }

    pub fn invalidate_auth_token(&self) {
        self.inner.store.merge(
            store_keys::SESSION,
            json!({
                "authToken": INVALID_AUTH_TOKEN,
                "encryptedAuthToken": INVALID_AUTH_TOKEN,
            }),
        );
    }

    /// Point the session at a support token, or wipe it when `token` is empty.
    pub fn set_support_auth_token(&self, token: &str, email: &str, account_id: u64) {
        if token.is_empty() {
            info!("support session cleared");
            self.inner.store.set(store_keys::SESSION, json!({}));
            return;
        }

        info!("support session started");
        self.inner.store.merge(
            store_keys::SESSION,
            json!({
                "authToken": token,
                "supportAuthToken": token,
                "authTokenType": SUPPORT_AUTH_TOKEN_TYPE,
                "email": email,
                "accountID": account_id,
                "creationDate": chrono::Utc::now().timestamp_millis(),
            }),
        );
    }

    /// Resolves true once a session token exists.
    pub fn wait_for_user_sign_in(&self) -> SignInWait {
        self.inner.context.wait_for_sign_in()
    }

    pub fn can_access_route_by_anonymous_user(&self, route: &str) -> bool {
        routes::can_access_route_by_anonymous_user(route, &self.inner.config.web_app_url)
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.inner.context.session()
    }

    // ------------------------------------------------------------------
    // Real-time channel
    // ------------------------------------------------------------------

    /// Exchange the generated credentials for a fresh auth token.
    pub async fn reauthenticate(&self, command: &str) -> SessionResult<()> {
        let credentials = self.inner.context.credentials();
        let params = json!({
            "partnerName": self.inner.config.partner_name,
            "partnerPassword": self.inner.config.partner_password,
            "partnerUserID": credentials.auto_generated_login,
            "partnerUserSecret": credentials.auto_generated_password,
            "shouldRetry": false,
        });

        info!(command, "reauthenticating");
        let response = self
            .client()
            .make_request_with_side_effects(SideEffectCommand::Authenticate, params)
            .await?;

        if !response.is_success() {
            return Err(SessionError::Reauthentication {
                json_code: response.json_code,
                message: response.message.unwrap_or_default(),
            });
        }

        let mut session = serde_json::Map::new();
        for key in ["authToken", "encryptedAuthToken"] {
            if let Some(token) = response.payload_str(key).filter(|token| !token.is_empty()) {
                session.insert(key.to_string(), Value::String(token.to_string()));
            }
        }
        if !session.contains_key("authToken") {
            return Err(SessionError::Reauthentication {
                json_code: response.json_code,
                message: "response carried no auth token".to_string(),
            });
        }
        self.inner
            .store
            .merge(store_keys::SESSION, Value::Object(session));
        Ok(())
    }

    /// Re-authenticate and reconnect, at most once per window.
    pub fn reauthenticate_pusher(&self) {
        let coordinator = self.clone();
        let outcome = self.inner.reauth_throttle.call(move || async move {
            match coordinator
                .reauthenticate(SideEffectCommand::AuthenticatePusher.as_str())
                .await
            {
                Ok(()) => coordinator.inner.realtime.reconnect(),
                Err(err) => error!(error = %err, "realtime reauthentication failed"),
            }
        });
        debug!(?outcome, "realtime reauthentication requested");
    }

    /// Authorize a channel subscription for the real-time library.
    pub async fn authenticate_pusher(
        &self,
        socket_id: &str,
        channel_name: &str,
        callback: ChannelAuthCallback,
    ) {
        debug!(channel_name, "authorizing realtime channel");
        let params = json!({
            "socket_id": socket_id,
            "channel_name": channel_name,
            "shouldRetry": false,
            "forceNetworkRequest": true,
        });

        let result = self
            .client()
            .make_request_with_side_effects(SideEffectCommand::AuthenticatePusher, params)
            .await;

        match result {
            Ok(response) if response.is_not_authenticated() => {
                warn!(channel_name, json_code = response.json_code, "channel authorization needs reauthentication");
                self.reauthenticate_pusher();
                callback(Some(ChannelAuthError::NotAuthenticated), empty_auth_payload());
            }
            Ok(response) if !response.is_success() => {
                warn!(channel_name, json_code = response.json_code, "channel authorization rejected");
                callback(
                    Some(ChannelAuthError::Rejected {
                        json_code: response.json_code,
                        message: response.message.clone().unwrap_or_default(),
                    }),
                    empty_auth_payload(),
                );
            }
            Ok(response) => {
                debug!(channel_name, "channel authorized");
                callback(None, response.payload_value());
            }
            Err(err) => {
                error!(channel_name, error = %err, "channel authorization request failed");
                callback(
                    Some(ChannelAuthError::RequestFailed(err.to_string())),
                    empty_auth_payload(),
                );
            }
        }
    }
}
