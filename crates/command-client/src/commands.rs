//! Command names understood by the backend.

use std::fmt;

/// Commands sent with [`crate::CommandClient::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadCommand {
    BeginSignIn,
}

/// Commands sent with [`crate::CommandClient::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteCommand {
    SignInWithApple,
    SignInWithGoogle,
    SigninUser,
    SigninUserWithLink,
    LogOut,
    EnableTwoFactorAuth,
    DisableTwoFactorAuth,
    TwoFactorAuthValidate,
    RequestNewValidateCode,
    RequestUnlinkValidationLink,
    UnlinkLogin,
    SignInWithShortLivedAuthToken,
}

/// Commands sent with [`crate::CommandClient::make_request_with_side_effects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffectCommand {
    AuthenticatePusher,
    Authenticate,
}

impl ReadCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadCommand::BeginSignIn => "BeginSignIn",
        }
    }
}

impl WriteCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteCommand::SignInWithApple => "SignInWithApple",
            WriteCommand::SignInWithGoogle => "SignInWithGoogle",
            WriteCommand::SigninUser => "SigninUser",
            WriteCommand::SigninUserWithLink => "SigninUserWithLink",
            WriteCommand::LogOut => "LogOut",
            WriteCommand::EnableTwoFactorAuth => "EnableTwoFactorAuth",
            WriteCommand::DisableTwoFactorAuth => "DisableTwoFactorAuth",
            WriteCommand::TwoFactorAuthValidate => "TwoFactorAuth_Validate",
            WriteCommand::RequestNewValidateCode => "RequestNewValidateCode",
            WriteCommand::RequestUnlinkValidationLink => "RequestUnlinkValidationLink",
            WriteCommand::UnlinkLogin => "UnlinkLogin",
            WriteCommand::SignInWithShortLivedAuthToken => "SignInWithShortLivedAuthToken",
        }
    }
}

impl SideEffectCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideEffectCommand::AuthenticatePusher => "AuthenticatePusher",
            SideEffectCommand::Authenticate => "Authenticate",
        }
    }
}

impl fmt::Display for ReadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WriteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SideEffectCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_factor_validate_wire_name() {
        assert_eq!(
            WriteCommand::TwoFactorAuthValidate.as_str(),
            "TwoFactorAuth_Validate"
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(ReadCommand::BeginSignIn.to_string(), "BeginSignIn");
        assert_eq!(SideEffectCommand::AuthenticatePusher.to_string(), "AuthenticatePusher");
    }
}
