use std::fmt;
use std::str::FromStr;

/// Kind of account, sent to the backend as a numeric rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Outsider,
    Student,
    Alumni,
}

impl UserType {
    /// Rank 0 belongs to admins, who never sign up through this flow.
    pub const ADMIN_RANK: u8 = 0;

    pub const ALL: [UserType; 3] = [UserType::Outsider, UserType::Student, UserType::Alumni];

    pub fn rank(self) -> u8 {
        match self {
            UserType::Alumni => 1,
            UserType::Student => 2,
            UserType::Outsider => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserType::Outsider => "Outsider",
            UserType::Student => "Student",
            UserType::Alumni => "Alumni",
        }
    }

    /// Next type in menu order, wrapping; `None` starts at the first entry.
    pub fn cycle(current: Option<Self>, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = match current {
            None if forward => 0,
            None => len - 1,
            Some(ty) => {
                let pos = Self::ALL.iter().position(|t| *t == ty).unwrap_or(0);
                if forward {
                    (pos + 1) % len
                } else {
                    (pos + len - 1) % len
                }
            }
        };
        Self::ALL[index]
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserType::Outsider => "outsider",
            UserType::Student => "student",
            UserType::Alumni => "alumni",
        })
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "outsider" => Ok(UserType::Outsider),
            "student" => Ok(UserType::Student),
            "alumni" => Ok(UserType::Alumni),
            other => Err(format!(
                "Unknown user type: {other} (expected outsider, student, or alumni)"
            )),
        }
    }
}

/// Input fields across the login, signup, and OTP forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    UserType,
    Name,
    Email,
    AlumniDesc,
    Password,
    Confirm,
    Otp,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::UserType => "User Type",
            Field::Name => "Name",
            Field::Email => "Email",
            Field::AlumniDesc => "Alumni Description",
            Field::Password => "Password",
            Field::Confirm => "Confirm Password",
            Field::Otp => "OTP",
        }
    }

    /// Whether the field's value should be masked when displayed.
    pub fn is_secret(self) -> bool {
        matches!(self, Field::Password | Field::Confirm)
    }
}

/// Which form the dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Login,
    Signup,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Login => "Login",
            Tab::Signup => "Signup",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Tab::Login => Tab::Signup,
            Tab::Signup => Tab::Login,
        }
    }

    /// Fields shown on this tab, in display order.
    ///
    /// The alumni description only appears on signup for alumni.
    pub fn fields(self, usertype: Option<UserType>) -> Vec<Field> {
        match self {
            Tab::Login => vec![Field::UserType, Field::Email, Field::Password],
            Tab::Signup => {
                let mut fields = vec![Field::UserType, Field::Name, Field::Email];
                if usertype == Some(UserType::Alumni) {
                    fields.push(Field::AlumniDesc);
                }
                fields.extend([Field::Password, Field::Confirm]);
                fields
            }
        }
    }
}

/// Values of the login/signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub usertype: Option<UserType>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub alumni_desc: String,
}

impl AuthForm {
    /// Text value of a field; the user type renders as its lowercase id.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::UserType => self.usertype.map(|t| t.to_string()).unwrap_or_default(),
            Field::Name => self.name.clone(),
            Field::Email => self.email.clone(),
            Field::AlumniDesc => self.alumni_desc.clone(),
            Field::Password => self.password.clone(),
            Field::Confirm => self.confirm.clone(),
            Field::Otp => String::new(),
        }
    }

    /// Sets a field from text. Unknown user types clear the selection.
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::UserType => self.usertype = value.parse().ok(),
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::AlumniDesc => self.alumni_desc = value,
            Field::Password => self.password = value,
            Field::Confirm => self.confirm = value,
            Field::Otp => {}
        }
    }

    pub fn is_alumni(&self) -> bool {
        self.usertype == Some(UserType::Alumni)
    }
}
