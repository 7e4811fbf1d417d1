//! Store keys, form identifiers and translation keys.

/// Store keys owned by the session flows.
pub mod store_keys {
    pub const CREDENTIALS: &str = "credentials";
    pub const SESSION: &str = "session";
    pub const ACCOUNT: &str = "account";
    pub const PREFERRED_LOCALE: &str = "nvp_preferredLocale";
    pub const LAST_OPENED_PUBLIC_ROOM_ID: &str = "lastOpenedPublicRoomID";
}

/// Form identifiers written to `account.loadingForm`.
pub mod forms {
    pub const LOGIN: &str = "loginForm";
    pub const VALIDATE_CODE: &str = "validateCodeForm";
    pub const VALIDATE_TFA_CODE: &str = "validateTfaCodeForm";
    pub const RESEND_VALIDATE_CODE: &str = "resendValidateCodeForm";
}

/// Translation keys written to `account.errors` and `account.message`.
pub mod messages {
    pub const CANNOT_GET_ACCOUNT_DETAILS: &str = "loginForm.cannotGetAccountDetails";
    pub const UNLINK_LINK_SENT: &str = "unlinkLoginForm.linkSent";
    pub const UNLINK_SUCCEEDED: &str = "unlinkLoginForm.successfullyUnlinkedLogin";
}

/// Locale used when `nvp_preferredLocale` is unset.
pub const DEFAULT_LOCALE: &str = "en";
