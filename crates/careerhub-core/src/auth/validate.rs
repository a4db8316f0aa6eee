//! Field validation for the auth forms.
//!
//! Each check is a pure function of the form values and the policy, so the
//! same rules run on blur, on submit, and from the CLI.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::form::{AuthForm, Field, Tab, UserType};

/// Symbols accepted as the "special character" in a signup password.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+{};:,<.>";

pub const PASSWORD_MIN_LEN: usize = 8;

const DEFAULT_INSTITUTION_DOMAIN: &str = "iiitdwd.ac.in";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(Field),
    #[error("Enter a valid Email")]
    InvalidEmail,
    #[error("College Emails must end with @{domain}")]
    InstitutionDomain { domain: String },
    #[error(
        "Password must contain at least 8 characters, one uppercase, one number and one special case character"
    )]
    WeakPassword,
    #[error("Passwords don't match")]
    PasswordMismatch,
}

/// Rules that depend on deployment rather than on the form itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    institution_domain: String,
}

impl ValidationPolicy {
    pub fn new(institution_domain: impl Into<String>) -> Self {
        Self {
            institution_domain: institution_domain.into(),
        }
    }

    pub fn institution_domain(&self) -> &str {
        &self.institution_domain
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INSTITUTION_DOMAIN)
    }
}

/// Per-field errors from a whole-form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.0.iter().map(|(field, err)| (*field, err))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.values().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("email pattern is valid")
    })
}

fn required(field: Field, value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::Required(field))
    } else {
        Ok(())
    }
}

pub fn validate_usertype(usertype: Option<UserType>) -> Result<(), FieldError> {
    usertype.map(|_| ()).ok_or(FieldError::Required(Field::UserType))
}

/// Email must be present and well formed; students must use the institution domain.
pub fn validate_email(
    email: &str,
    usertype: Option<UserType>,
    policy: &ValidationPolicy,
) -> Result<(), FieldError> {
    required(Field::Email, email)?;
    if !email_regex().is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    if usertype == Some(UserType::Student) {
        let suffix = format!("@{}", policy.institution_domain);
        if !email.ends_with(&suffix) {
            return Err(FieldError::InstitutionDomain {
                domain: policy.institution_domain.clone(),
            });
        }
    }
    Ok(())
}

/// Signup passwords need length plus upper, lower, digit, and symbol classes.
pub fn validate_new_password(password: &str) -> Result<(), FieldError> {
    required(Field::Password, password)?;
    let long_enough = password.chars().count() >= PASSWORD_MIN_LEN;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(FieldError::WeakPassword)
    }
}

pub fn validate_confirm(password: &str, confirm: &str) -> Result<(), FieldError> {
    required(Field::Confirm, confirm)?;
    if password == confirm {
        Ok(())
    } else {
        Err(FieldError::PasswordMismatch)
    }
}

pub fn validate_otp(otp: &str) -> Result<(), FieldError> {
    required(Field::Otp, otp)
}

/// Validates one field of the login/signup form as it appears on `tab`.
///
/// Fields without rules (alumni description, or signup-only fields on the
/// login tab) always pass.
pub fn validate_field(
    tab: Tab,
    field: Field,
    form: &AuthForm,
    policy: &ValidationPolicy,
) -> Result<(), FieldError> {
    match (tab, field) {
        (_, Field::UserType) => validate_usertype(form.usertype),
        (_, Field::Email) => validate_email(&form.email, form.usertype, policy),
        (Tab::Login, Field::Password) => required(Field::Password, &form.password),
        (Tab::Signup, Field::Password) => validate_new_password(&form.password),
        (Tab::Signup, Field::Confirm) => validate_confirm(&form.password, &form.confirm),
        (Tab::Signup, Field::Name) => required(Field::Name, &form.name),
        (Tab::Login, Field::Name | Field::Confirm) | (_, Field::AlumniDesc | Field::Otp) => Ok(()),
    }
}

/// Validates every field shown on `tab`.
///
/// # Errors
/// Returns all failing fields at once.
pub fn validate_form(
    tab: Tab,
    form: &AuthForm,
    policy: &ValidationPolicy,
) -> Result<(), ValidationErrors> {
    let errors: BTreeMap<Field, FieldError> = tab
        .fields(form.usertype)
        .into_iter()
        .filter_map(|field| {
            validate_field(tab, field, form, policy)
                .err()
                .map(|err| (field, err))
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

impl FromIterator<(Field, FieldError)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (Field, FieldError)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
