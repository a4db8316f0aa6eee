//! Request/response bodies for the portal API.

use serde::{Deserialize, Serialize};

pub const JOBS_PATH: &str = "/job/getAll";
pub const LOGIN_PATH: &str = "/user/login";
pub const SIGNUP_PATH: &str = "/user/signup";
pub const VERIFY_PATH: &str = "/user/signup/verify";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub rank: u8,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub rank: u8,
    pub email: String,
    pub password: String,
    pub name: String,
    /// Only sent for alumni.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub rank: u8,
    pub email: String,
    pub password: String,
    pub name: String,
    pub otp_attempt: String,
}

/// Body returned by every `/user/*` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub msg: Option<String>,
}

impl ServerMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Login,
    Signup,
    Verify,
}

impl RequestKind {
    pub fn path(self) -> &'static str {
        match self {
            RequestKind::Login => LOGIN_PATH,
            RequestKind::Signup => SIGNUP_PATH,
            RequestKind::Verify => VERIFY_PATH,
        }
    }
}

/// A validated submission ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login(LoginRequest),
    Signup(SignupRequest),
    Verify(VerifyRequest),
}

impl AuthRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            AuthRequest::Login(_) => RequestKind::Login,
            AuthRequest::Signup(_) => RequestKind::Signup,
            AuthRequest::Verify(_) => RequestKind::Verify,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_signup_omits_missing_description() {
        let body = SignupRequest {
            rank: 2,
            email: "a@iiitdwd.ac.in".to_string(),
            password: "Abcdef1!".to_string(),
            name: "A".to_string(),
            description: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"rank": 2, "email": "a@iiitdwd.ac.in", "password": "Abcdef1!", "name": "A"})
        );
    }

    #[test]
    fn test_verify_uses_otp_attempt_key() {
        let body = VerifyRequest {
            rank: 1,
            email: "a@b.com".to_string(),
            password: "Abcdef1!".to_string(),
            name: "A".to_string(),
            otp_attempt: "123456".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["otpAttempt"], "123456");
    }

    #[test]
    fn test_server_message_tolerates_missing_msg() {
        let parsed: ServerMessage = serde_json::from_str(r#"{"token":"x"}"#).unwrap();
        assert_eq!(parsed.msg, None);
    }
}
