//! Login/signup dialog state machine.
//!
//! The dialog owns the form values, which fields have been touched, and the
//! errors to show. Front ends feed it edits and blurs, ask it for a request to
//! send on submit, and hand the server's reply back to `handle_response`.

use std::collections::{BTreeMap, BTreeSet};

use super::OTP_SENT_MESSAGE;
use super::form::{AuthForm, Field, Tab, UserType};
use super::validate::{
    FieldError, ValidationErrors, ValidationPolicy, validate_field, validate_form, validate_otp,
};
use crate::api::{
    ApiError, AuthRequest, LoginRequest, RequestKind, ServerMessage, SignupRequest, VerifyRequest,
};

const LOGGED_IN_MESSAGE: &str = "Logged in.";
const SIGNUP_DONE_MESSAGE: &str = "Signup complete.";
const SIGNUP_UNCONFIRMED_MESSAGE: &str = "Signup accepted, but no OTP was sent.";

/// Signup data kept while the user enters the OTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub usertype: UserType,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogContent {
    #[default]
    Form,
    Otp(PendingSignup),
}

/// What came back from an auth request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthReply {
    /// 2xx with a decoded body.
    Ok(ServerMessage),
    /// The server answered with an error status. Holds its `msg`, or the
    /// status when the body carried none.
    Rejected(String),
    /// The request never produced a usable answer.
    Failed(String),
}

impl From<Result<ServerMessage, ApiError>> for AuthReply {
    fn from(result: Result<ServerMessage, ApiError>) -> Self {
        match result {
            Ok(message) => AuthReply::Ok(message),
            Err(ApiError::Status {
                status, message, ..
            }) => AuthReply::Rejected(
                message.unwrap_or_else(|| format!("Request rejected ({status})")),
            ),
            Err(err) => AuthReply::Failed(format!("{:#}", anyhow::Error::new(err))),
        }
    }
}

impl AuthReply {
    /// Message for a reply that finishes the flow (login accepted, or any
    /// server answer to an OTP). `None` for replies that keep the dialog open.
    pub fn closing_message(&self, kind: RequestKind) -> Option<String> {
        match (kind, self) {
            (RequestKind::Login, AuthReply::Ok(reply)) => Some(
                reply
                    .msg
                    .clone()
                    .unwrap_or_else(|| LOGGED_IN_MESSAGE.to_string()),
            ),
            (RequestKind::Verify, AuthReply::Ok(reply)) => Some(
                reply
                    .msg
                    .clone()
                    .unwrap_or_else(|| SIGNUP_DONE_MESSAGE.to_string()),
            ),
            (RequestKind::Verify, AuthReply::Rejected(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The flow finished; the dialog has been reset.
    Close { message: Option<String> },
    /// The dialog stays on its current form. `message` is `None` only when
    /// the request never reached the server.
    Stay { message: Option<String> },
    /// Signup accepted; the dialog now asks for the OTP.
    AwaitOtp { message: Option<String> },
    /// Reply to a request this dialog is no longer waiting for.
    Ignored,
}

impl DialogOutcome {
    pub fn message(&self) -> Option<&str> {
        match self {
            DialogOutcome::Close { message }
            | DialogOutcome::Stay { message }
            | DialogOutcome::AwaitOtp { message } => message.as_deref(),
            DialogOutcome::Ignored => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a request is already in flight")]
    InFlight,
    #[error("{0}")]
    Invalid(ValidationErrors),
}

#[derive(Debug, Clone)]
pub struct AuthDialog {
    tab: Tab,
    content: DialogContent,
    form: AuthForm,
    otp: String,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, FieldError>,
    submitting: Option<RequestKind>,
    submitted_signup: Option<PendingSignup>,
    policy: ValidationPolicy,
}

impl AuthDialog {
    pub fn new(tab: Tab, policy: ValidationPolicy) -> Self {
        Self {
            tab,
            content: DialogContent::Form,
            form: AuthForm::default(),
            otp: String::new(),
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            submitting: None,
            submitted_signup: None,
            policy,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn content(&self) -> &DialogContent {
        &self.content
    }

    pub fn is_otp(&self) -> bool {
        matches!(self.content, DialogContent::Otp(_))
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    /// Fields currently on screen, in display order.
    pub fn fields(&self) -> Vec<Field> {
        match self.content {
            DialogContent::Otp(_) => vec![Field::Otp],
            DialogContent::Form => self.tab.fields(self.form.usertype),
        }
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Otp => self.otp.clone(),
            other => self.form.value(other),
        }
    }

    /// Error for a field, shown only once the field has been touched.
    pub fn error(&self, field: Field) -> Option<&FieldError> {
        if self.touched.contains(&field) {
            self.errors.get(&field)
        } else {
            None
        }
    }

    /// Switches between login and signup, discarding everything entered.
    ///
    /// Ignored while the OTP step is showing or a request is in flight.
    pub fn select_tab(&mut self, tab: Tab) {
        if tab == self.tab || self.is_otp() || self.is_submitting() {
            return;
        }
        self.reset();
        self.tab = tab;
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        match field {
            Field::Otp => self.otp = value,
            other => self.form.set(other, value),
        }
        self.revalidate_touched();
    }

    pub fn set_usertype(&mut self, usertype: Option<UserType>) {
        self.form.usertype = usertype;
        self.revalidate_touched();
    }

    pub fn cycle_usertype(&mut self, forward: bool) {
        self.set_usertype(Some(UserType::cycle(self.form.usertype, forward)));
    }

    /// Marks a field touched and validates it.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.validate_one(field);
    }

    /// Resets all values and returns to the login/signup form.
    pub fn close(&mut self) {
        self.reset();
    }

    /// Validates the visible form and builds the request to send.
    ///
    /// # Errors
    /// `InFlight` while a previous request is pending; `Invalid` when any
    /// visible field fails validation (every field is then marked touched).
    pub fn submit(&mut self) -> Result<AuthRequest, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }

        let pending = match &self.content {
            DialogContent::Otp(pending) => Some(pending.clone()),
            DialogContent::Form => None,
        };
        let request = match pending {
            Some(pending) => {
                self.touched.insert(Field::Otp);
                if let Err(err) = validate_otp(&self.otp) {
                    self.errors.insert(Field::Otp, err.clone());
                    return Err(SubmitError::Invalid(
                        std::iter::once((Field::Otp, err)).collect(),
                    ));
                }
                AuthRequest::Verify(VerifyRequest {
                    rank: pending.usertype.rank(),
                    email: pending.email,
                    password: pending.password,
                    name: pending.name,
                    otp_attempt: self.otp.clone(),
                })
            }
            None => {
                let fields = self.fields();
                self.touched.extend(fields);
                if let Err(errors) = validate_form(self.tab, &self.form, &self.policy) {
                    self.errors = errors.iter().map(|(f, e)| (f, e.clone())).collect();
                    return Err(SubmitError::Invalid(errors));
                }
                self.errors.clear();
                let Some(usertype) = self.form.usertype else {
                    let err = FieldError::Required(Field::UserType);
                    return Err(SubmitError::Invalid(
                        std::iter::once((Field::UserType, err)).collect(),
                    ));
                };
                self.form_request(usertype)
            }
        };

        self.submitting = Some(request.kind());
        Ok(request)
    }

    /// Applies the reply to the request returned by the last `submit`.
    pub fn handle_response(&mut self, kind: RequestKind, reply: AuthReply) -> DialogOutcome {
        if self.submitting != Some(kind) {
            tracing::debug!(?kind, "dropping reply for a request no longer pending");
            return DialogOutcome::Ignored;
        }
        self.submitting = None;

        let closing = reply.closing_message(kind);
        match (kind, reply) {
            (RequestKind::Login, AuthReply::Ok(_)) => {
                self.reset();
                DialogOutcome::Close { message: closing }
            }
            (RequestKind::Signup, AuthReply::Ok(reply)) => {
                let pending = self.submitted_signup.take();
                match pending {
                    Some(pending) if reply.msg.as_deref() == Some(OTP_SENT_MESSAGE) => {
                        self.content = DialogContent::Otp(pending);
                        self.otp.clear();
                        self.touched.remove(&Field::Otp);
                        self.errors.remove(&Field::Otp);
                        DialogOutcome::AwaitOtp { message: reply.msg }
                    }
                    _ => DialogOutcome::Stay {
                        message: Some(
                            reply
                                .msg
                                .unwrap_or_else(|| SIGNUP_UNCONFIRMED_MESSAGE.to_string()),
                        ),
                    },
                }
            }
            (RequestKind::Verify, AuthReply::Ok(_) | AuthReply::Rejected(_)) => {
                self.reset();
                DialogOutcome::Close { message: closing }
            }
            (kind, AuthReply::Rejected(message)) => {
                tracing::warn!(?kind, %message, "auth request rejected");
                self.submitted_signup = None;
                DialogOutcome::Stay {
                    message: Some(message),
                }
            }
            (kind, AuthReply::Failed(error)) => {
                tracing::warn!(?kind, %error, "auth request failed");
                self.submitted_signup = None;
                DialogOutcome::Stay { message: None }
            }
        }
    }

    fn form_request(&mut self, usertype: UserType) -> AuthRequest {
        let rank = usertype.rank();
        match self.tab {
            Tab::Login => AuthRequest::Login(LoginRequest {
                rank,
                email: self.form.email.clone(),
                password: self.form.password.clone(),
            }),
            Tab::Signup => {
                self.submitted_signup = Some(PendingSignup {
                    usertype,
                    name: self.form.name.clone(),
                    email: self.form.email.clone(),
                    password: self.form.password.clone(),
                });
                AuthRequest::Signup(SignupRequest {
                    rank,
                    email: self.form.email.clone(),
                    password: self.form.password.clone(),
                    name: self.form.name.clone(),
                    description: self.form.is_alumni().then(|| self.form.alumni_desc.clone()),
                })
            }
        }
    }

    fn validate_one(&mut self, field: Field) {
        let result = match field {
            Field::Otp => validate_otp(&self.otp),
            other => validate_field(self.tab, other, &self.form, &self.policy),
        };
        match result {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(err) => {
                self.errors.insert(field, err);
            }
        }
    }

    fn revalidate_touched(&mut self) {
        let touched: Vec<Field> = self.touched.iter().copied().collect();
        for field in touched {
            self.validate_one(field);
        }
    }

    fn reset(&mut self) {
        self.content = DialogContent::Form;
        self.form = AuthForm::default();
        self.otp.clear();
        self.touched.clear();
        self.errors.clear();
        self.submitting = None;
        self.submitted_signup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog(tab: Tab) -> AuthDialog {
        AuthDialog::new(tab, ValidationPolicy::default())
    }

    fn fill_signup(dialog: &mut AuthDialog, usertype: UserType) {
        dialog.set_usertype(Some(usertype));
        dialog.set_field(Field::Name, "Asha".to_string());
        dialog.set_field(Field::Email, "asha@iiitdwd.ac.in".to_string());
        dialog.set_field(Field::Password, "Abcdef1!".to_string());
        dialog.set_field(Field::Confirm, "Abcdef1!".to_string());
    }

    fn otp_sent() -> AuthReply {
        AuthReply::Ok(ServerMessage::new(OTP_SENT_MESSAGE))
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut dialog = dialog(Tab::Login);
        dialog.set_field(Field::Email, "bad".to_string());
        assert_eq!(dialog.error(Field::Email), None);

        dialog.blur(Field::Email);
        assert_eq!(dialog.error(Field::Email), Some(&FieldError::InvalidEmail));

        dialog.set_field(Field::Email, "ok@example.com".to_string());
        assert_eq!(dialog.error(Field::Email), None);
    }

    #[test]
    fn test_usertype_change_revalidates_touched_email() {
        let mut dialog = dialog(Tab::Signup);
        dialog.set_usertype(Some(UserType::Outsider));
        dialog.set_field(Field::Email, "x@gmail.com".to_string());
        dialog.blur(Field::Email);
        assert_eq!(dialog.error(Field::Email), None);

        dialog.set_usertype(Some(UserType::Student));
        assert!(matches!(
            dialog.error(Field::Email),
            Some(FieldError::InstitutionDomain { .. })
        ));
    }

    #[test]
    fn test_invalid_submit_touches_every_field() {
        let mut dialog = dialog(Tab::Signup);
        let err = dialog.submit().unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(ref errors) if errors.len() == 5));
        assert_eq!(
            dialog.error(Field::Name),
            Some(&FieldError::Required(Field::Name))
        );
        assert!(!dialog.is_submitting());
    }

    #[test]
    fn test_login_submit_and_close() {
        let mut dialog = dialog(Tab::Login);
        dialog.set_usertype(Some(UserType::Alumni));
        dialog.set_field(Field::Email, "a@b.com".to_string());
        dialog.set_field(Field::Password, "pw".to_string());

        let request = dialog.submit().unwrap();
        assert_eq!(
            request,
            AuthRequest::Login(LoginRequest {
                rank: 1,
                email: "a@b.com".to_string(),
                password: "pw".to_string(),
            })
        );
        assert_eq!(dialog.submit(), Err(SubmitError::InFlight));

        let outcome =
            dialog.handle_response(RequestKind::Login, AuthReply::Ok(ServerMessage::new("Hi")));
        assert_eq!(
            outcome,
            DialogOutcome::Close {
                message: Some("Hi".to_string())
            }
        );
        assert_eq!(dialog.form(), &AuthForm::default());
    }

    #[test]
    fn test_login_failure_keeps_dialog_open() {
        let mut dialog = dialog(Tab::Login);
        dialog.set_usertype(Some(UserType::Outsider));
        dialog.set_field(Field::Email, "a@b.com".to_string());
        dialog.set_field(Field::Password, "pw".to_string());
        dialog.submit().unwrap();

        let outcome = dialog.handle_response(
            RequestKind::Login,
            AuthReply::Failed("connection refused".to_string()),
        );
        assert_eq!(outcome, DialogOutcome::Stay { message: None });
        assert_eq!(dialog.form().email, "a@b.com");
        assert!(!dialog.is_submitting());
    }

    #[test]
    fn test_signup_description_only_for_alumni() {
        let mut student = dialog(Tab::Signup);
        fill_signup(&mut student, UserType::Student);
        student.set_field(Field::AlumniDesc, "ignored".to_string());
        let AuthRequest::Signup(body) = student.submit().unwrap() else {
            panic!("expected signup request");
        };
        assert_eq!(body.description, None);
        assert_eq!(body.rank, 2);

        let mut alumni = dialog(Tab::Signup);
        fill_signup(&mut alumni, UserType::Alumni);
        alumni.set_field(Field::AlumniDesc, "Batch of 2020".to_string());
        let AuthRequest::Signup(body) = alumni.submit().unwrap() else {
            panic!("expected signup request");
        };
        assert_eq!(body.description.as_deref(), Some("Batch of 2020"));
    }

    #[test]
    fn test_otp_sent_moves_to_otp_step() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();

        let outcome = dialog.handle_response(RequestKind::Signup, otp_sent());
        assert!(matches!(outcome, DialogOutcome::AwaitOtp { .. }));
        assert_eq!(dialog.fields(), vec![Field::Otp]);
        assert_eq!(
            dialog.content(),
            &DialogContent::Otp(PendingSignup {
                usertype: UserType::Student,
                name: "Asha".to_string(),
                email: "asha@iiitdwd.ac.in".to_string(),
                password: "Abcdef1!".to_string(),
            })
        );
    }

    #[test]
    fn test_other_signup_message_stays_on_form() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();

        let outcome = dialog.handle_response(
            RequestKind::Signup,
            AuthReply::Ok(ServerMessage::new("otp sent successfully")),
        );
        assert_eq!(
            outcome.message(),
            Some("otp sent successfully")
        );
        assert!(!dialog.is_otp());
        assert_eq!(dialog.form().name, "Asha");
    }

    #[test]
    fn test_verify_sends_pending_signup_with_otp() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        dialog.handle_response(RequestKind::Signup, otp_sent());

        assert!(matches!(dialog.submit(), Err(SubmitError::Invalid(_))));
        assert_eq!(dialog.error(Field::Otp), Some(&FieldError::Required(Field::Otp)));

        dialog.set_field(Field::Otp, "123456".to_string());
        let request = dialog.submit().unwrap();
        assert_eq!(
            request,
            AuthRequest::Verify(VerifyRequest {
                rank: 2,
                email: "asha@iiitdwd.ac.in".to_string(),
                password: "Abcdef1!".to_string(),
                name: "Asha".to_string(),
                otp_attempt: "123456".to_string(),
            })
        );
    }

    #[test]
    fn test_verify_closes_on_any_server_reply() {
        for reply in [
            AuthReply::Ok(ServerMessage::new("Signup successful")),
            AuthReply::Rejected("Invalid OTP".to_string()),
        ] {
            let mut dialog = dialog(Tab::Signup);
            fill_signup(&mut dialog, UserType::Student);
            dialog.submit().unwrap();
            dialog.handle_response(RequestKind::Signup, otp_sent());
            dialog.set_field(Field::Otp, "000000".to_string());
            dialog.submit().unwrap();

            let outcome = dialog.handle_response(RequestKind::Verify, reply);
            assert!(matches!(outcome, DialogOutcome::Close { .. }));
            assert_eq!(dialog.content(), &DialogContent::Form);
        }
    }

    #[test]
    fn test_verify_transport_error_stays_on_otp() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        dialog.handle_response(RequestKind::Signup, otp_sent());
        dialog.set_field(Field::Otp, "000000".to_string());
        dialog.submit().unwrap();

        let outcome =
            dialog.handle_response(RequestKind::Verify, AuthReply::Failed("timeout".to_string()));
        assert_eq!(outcome, DialogOutcome::Stay { message: None });
        assert!(dialog.is_otp());
    }

    #[test]
    fn test_rejection_without_body_reports_status() {
        let reply = AuthReply::from(Err(ApiError::Status {
            path: crate::api::VERIFY_PATH,
            status: reqwest::StatusCode::BAD_REQUEST,
            message: None,
        }));
        assert_eq!(
            reply,
            AuthReply::Rejected("Request rejected (400 Bad Request)".to_string())
        );

        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        dialog.handle_response(RequestKind::Signup, otp_sent());
        dialog.set_field(Field::Otp, "000000".to_string());
        dialog.submit().unwrap();

        let outcome = dialog.handle_response(RequestKind::Verify, reply);
        assert_eq!(
            outcome,
            DialogOutcome::Close {
                message: Some("Request rejected (400 Bad Request)".to_string())
            }
        );
    }

    #[test]
    fn test_server_replies_without_msg_still_carry_a_message() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        let outcome =
            dialog.handle_response(RequestKind::Signup, AuthReply::Ok(ServerMessage { msg: None }));
        assert_eq!(
            outcome,
            DialogOutcome::Stay {
                message: Some(SIGNUP_UNCONFIRMED_MESSAGE.to_string())
            }
        );

        let mut login = AuthDialog::new(Tab::Login, ValidationPolicy::default());
        login.set_usertype(Some(UserType::Outsider));
        login.set_field(Field::Email, "a@b.com".to_string());
        login.set_field(Field::Password, "pw".to_string());
        login.submit().unwrap();
        let outcome =
            login.handle_response(RequestKind::Login, AuthReply::Ok(ServerMessage { msg: None }));
        assert_eq!(outcome.message(), Some(LOGGED_IN_MESSAGE));
    }

    #[test]
    fn test_closing_message_only_for_finishing_replies() {
        let ok = AuthReply::Ok(ServerMessage::new("Welcome"));
        let rejected = AuthReply::Rejected("Invalid OTP".to_string());

        assert_eq!(ok.closing_message(RequestKind::Login).as_deref(), Some("Welcome"));
        assert_eq!(ok.closing_message(RequestKind::Signup), None);
        assert_eq!(rejected.closing_message(RequestKind::Login), None);
        assert_eq!(
            rejected.closing_message(RequestKind::Verify).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            AuthReply::Failed("timeout".to_string()).closing_message(RequestKind::Verify),
            None
        );
    }

    #[test]
    fn test_tab_switch_resets_and_is_blocked_during_otp() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.select_tab(Tab::Login);
        assert_eq!(dialog.tab(), Tab::Login);
        assert_eq!(dialog.form(), &AuthForm::default());

        dialog.select_tab(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        dialog.handle_response(RequestKind::Signup, otp_sent());
        dialog.select_tab(Tab::Login);
        assert_eq!(dialog.tab(), Tab::Signup);
        assert!(dialog.is_otp());
    }

    #[test]
    fn test_close_returns_to_form() {
        let mut dialog = dialog(Tab::Signup);
        fill_signup(&mut dialog, UserType::Student);
        dialog.submit().unwrap();
        dialog.handle_response(RequestKind::Signup, otp_sent());

        dialog.close();
        assert_eq!(dialog.content(), &DialogContent::Form);
        assert_eq!(dialog.tab(), Tab::Signup);
        assert!(!dialog.is_submitting());
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let mut dialog = dialog(Tab::Login);
        let outcome = dialog.handle_response(RequestKind::Login, otp_sent());
        assert_eq!(outcome, DialogOutcome::Ignored);
    }
}
