//! Two-factor authentication toggle.

use command_client::{StoreUpdates, WriteCommand};
use reactive_store::StoreUpdate;
use serde_json::json;
use tracing::{info, warn};

use crate::keys::store_keys;
use crate::SessionCoordinator;

fn two_factor_updates() -> StoreUpdates {
    StoreUpdates::new(
        vec![StoreUpdate::merge(
            store_keys::ACCOUNT,
            json!({"isLoading": true, "errors": null}),
        )],
        vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
        vec![StoreUpdate::merge(store_keys::ACCOUNT, json!({"isLoading": false}))],
    )
}

impl SessionCoordinator {
    /// Enable or disable two-factor authentication.
    pub async fn toggle_two_factor_auth(&self, enable: bool) {
        let command = if enable {
            WriteCommand::EnableTwoFactorAuth
        } else {
            WriteCommand::DisableTwoFactorAuth
        };
        info!(command = command.as_str(), "toggling two-factor auth");

        let result = self
            .client()
            .write(command, json!({}), two_factor_updates())
            .await;
        if let Err(err) = result {
            warn!(command = command.as_str(), error = %err, "two-factor toggle failed");
        }
    }

    /// Confirm two-factor setup with a code from the authenticator.
    pub async fn validate_two_factor_auth(&self, two_factor_auth_code: &str) {
        let result = self
            .client()
            .write(
                WriteCommand::TwoFactorAuthValidate,
                json!({"twoFactorAuthCode": two_factor_auth_code}),
                two_factor_updates(),
            )
            .await;
        if let Err(err) = result {
            warn!(command = "TwoFactorAuth_Validate", error = %err, "two-factor validation failed");
        }
    }
}
