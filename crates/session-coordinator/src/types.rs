//! Stored document shapes for the session keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auto_auth::AutoAuthState;

/// `authTokenType` marking a restricted anonymous session.
pub const ANONYMOUS_AUTH_TOKEN_TYPE: &str = "anonymousAccount";

/// `authTokenType` written by support impersonation.
pub const SUPPORT_AUTH_TOKEN_TYPE: &str = "support";

/// Sentinel written by `invalidate_credentials`.
pub const INVALID_CREDENTIAL: &str = "invalid";

/// Sentinel written by `invalidate_auth_token`.
pub const INVALID_AUTH_TOKEN: &str = "invalid-auth-token";

/// Login identifiers and generated secondary credentials (`credentials`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_generated_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_generated_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_code: Option<String>,
    #[serde(default, rename = "accountID", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
}

impl Credentials {
    /// Staged login, if non-empty.
    pub fn staged_login(&self) -> Option<&str> {
        self.login.as_deref().filter(|login| !login.is_empty())
    }
}

/// Current auth token and related fields (`session`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_auth_state: Option<AutoAuthState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, rename = "accountID", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
}

impl Session {
    /// A non-empty auth token counts as signed in.
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth_token_type.as_deref() == Some(ANONYMOUS_AUTH_TOKEN_TYPE)
    }

    pub fn is_support(&self) -> bool {
        self.auth_token_type.as_deref() == Some(SUPPORT_AUTH_TOKEN_TYPE)
            && self.support_auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Transient UI feedback (`account`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub is_loading: bool,
    /// Microsecond timestamp to translation key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
}

impl Account {
    /// True when any feedback is showing.
    pub fn has_feedback(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
            || self.message.is_some()
            || self.success.is_some()
    }
}

/// Errors map with one translation key under the current microsecond timestamp.
pub fn microsecond_error(translation_key: &str) -> Value {
    let stamp = chrono::Utc::now().timestamp_micros().to_string();
    json!({ stamp: translation_key })
}
