//! Login and signup from the command line.
//!
//! Both commands drive the same dialog state machine as the board: fields are
//! filled in, `submit` validates them and produces the request, and the reply
//! goes back through `handle_response`. Secrets come from stdin so they stay
//! out of shell history.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use careerhub_core::api::ApiClient;
use careerhub_core::auth::{
    AuthDialog, AuthReply, DialogOutcome, Field, SubmitError, Tab, UserType,
};
use careerhub_core::config::Config;

pub struct SignupOptions {
    pub usertype: UserType,
    pub name: String,
    pub email: String,
    pub alumni_desc: Option<String>,
}

pub async fn login(
    client: &ApiClient,
    config: &Config,
    usertype: UserType,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_line(Field::Password)?,
    };

    let mut dialog = AuthDialog::new(Tab::Login, config.validation_policy());
    dialog.set_usertype(Some(usertype));
    dialog.set_field(Field::Email, email);
    dialog.set_field(Field::Password, password);

    let outcome = send(client, &mut dialog).await?;
    finish(&outcome)
}

pub async fn signup(client: &ApiClient, config: &Config, options: SignupOptions) -> Result<()> {
    let mut dialog = AuthDialog::new(Tab::Signup, config.validation_policy());
    dialog.set_usertype(Some(options.usertype));
    dialog.set_field(Field::Name, options.name);
    dialog.set_field(Field::Email, options.email);
    if let Some(desc) = options.alumni_desc {
        dialog.set_field(Field::AlumniDesc, desc);
    }
    dialog.set_field(Field::Password, prompt_line(Field::Password)?);
    dialog.set_field(Field::Confirm, prompt_line(Field::Confirm)?);

    let message = match send(client, &mut dialog).await? {
        DialogOutcome::AwaitOtp { message } => message,
        other => return finish(&other),
    };
    if let Some(message) = message {
        println!("{message}");
    }

    dialog.set_field(Field::Otp, prompt_line(Field::Otp)?);
    let outcome = send(client, &mut dialog).await?;
    finish(&outcome)
}

/// Submits the dialog and applies the reply.
async fn send(client: &ApiClient, dialog: &mut AuthDialog) -> Result<DialogOutcome> {
    let request = match dialog.submit() {
        Ok(request) => request,
        Err(SubmitError::Invalid(errors)) => {
            for (field, error) in errors.iter() {
                eprintln!("{}: {error}", field.label());
            }
            bail!("{} form has {} invalid field(s)", dialog.tab().label(), errors.len());
        }
        Err(err) => return Err(err.into()),
    };

    let kind = request.kind();
    tracing::info!(?kind, "sending auth request");
    let reply = AuthReply::from(client.send(&request).await);
    let failure = match &reply {
        AuthReply::Failed(error) => Some(error.clone()),
        AuthReply::Ok(_) | AuthReply::Rejected(_) => None,
    };

    let outcome = dialog.handle_response(kind, reply);
    if let Some(error) = failure {
        bail!("Request to {} failed: {error}", kind.path());
    }
    Ok(outcome)
}

fn finish(outcome: &DialogOutcome) -> Result<()> {
    match outcome {
        DialogOutcome::Close { message } => {
            println!("{}", message.as_deref().unwrap_or("Done."));
            Ok(())
        }
        DialogOutcome::Stay { message } => {
            bail!("{}", message.as_deref().unwrap_or("Request was not accepted"))
        }
        DialogOutcome::AwaitOtp { .. } => bail!("Unexpected OTP prompt"),
        DialogOutcome::Ignored => bail!("No reply for the submitted request"),
    }
}

/// Reads one line from stdin, prompting on stderr so stdout stays clean.
fn prompt_line(field: Field) -> Result<String> {
    let label = field.label();
    eprint!("{label}: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("read {label} from stdin"))?;
    if read == 0 {
        bail!("Expected {label} on stdin");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
