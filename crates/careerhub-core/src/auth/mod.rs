//! Login, signup, and OTP verification.

mod dialog;
mod form;
mod validate;

pub use dialog::{
    AuthDialog, AuthReply, DialogContent, DialogOutcome, PendingSignup, SubmitError,
};
pub use form::{AuthForm, Field, Tab, UserType};
pub use validate::{
    FieldError, PASSWORD_MIN_LEN, PASSWORD_SYMBOLS, ValidationErrors, ValidationPolicy,
    validate_confirm, validate_email, validate_field, validate_form, validate_new_password,
    validate_otp, validate_usertype,
};

/// Message the signup endpoint returns when it has emailed an OTP.
pub const OTP_SENT_MESSAGE: &str = "OTP Sent Successfully.";
