// Askama template definitions

use askama::Template;

use super::labels::{fill, Labels};
use crate::db::{Customer, CustomerType, DashboardSummary, ALL_TYPES};
use crate::error::{CrmError, ValidationError};

/// Blocking message shown at the top of a page, the web form of a dialog box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub is_error: bool,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// Describe a failed action. Storage and I/O failures carry the
    /// underlying message after `failure_prefix`.
    pub fn from_error(labels: &Labels, failure_prefix: &str, err: &CrmError) -> Self {
        let message = match err {
            CrmError::Validation(ValidationError::MissingRequired) => labels.msg_required_fields,
            CrmError::Validation(ValidationError::InvalidPhone) => labels.msg_invalid_phone,
            CrmError::Validation(ValidationError::UnknownCustomerType) => labels.msg_invalid_type,
            CrmError::InvalidCredentials => {
                return Self::error(labels.login_failed_title, labels.msg_invalid_credentials)
            }
            CrmError::IncorrectPassword => labels.msg_incorrect_password,
            CrmError::EmptyPassword => labels.msg_empty_password,
            CrmError::PasswordMismatch => labels.msg_password_mismatch,
            CrmError::NoBackups => return Self::info(labels.title_hint, labels.msg_no_backups),
            CrmError::BackupNotFound(_) => labels.msg_backup_not_found,
            CrmError::Storage(e) => {
                return Self::error(labels.title_error, format!("{failure_prefix}: {e}"))
            }
            CrmError::Io(e) => {
                return Self::error(labels.title_error, format!("{failure_prefix}: {e}"))
            }
        };
        Self::error(labels.title_error, message)
    }

    pub fn css_class(&self) -> &'static str {
        if self.is_error {
            "notice notice-error"
        } else {
            "notice notice-info"
        }
    }
}

/// One entry of a `<select>`
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Type dropdown entries, optionally headed by the "all types" entry
pub fn type_options(selected: &str, include_all: bool) -> Vec<SelectOption> {
    let mut options = Vec::new();
    if include_all {
        options.push(SelectOption {
            value: ALL_TYPES,
            selected: selected == ALL_TYPES,
        });
    }
    for t in CustomerType::ALL {
        options.push(SelectOption {
            value: t.as_str(),
            selected: selected == t.as_str(),
        });
    }
    options
}

/// Field values of the add/edit form, kept as typed so a rejected
/// submission can be shown again for correction
#[derive(Debug, Clone, Default)]
pub struct CustomerFormValues {
    pub company_name: String,
    pub contact_name: String,
    pub phone: String,
    pub customer_type: String,
    pub notes: String,
}

impl From<&Customer> for CustomerFormValues {
    fn from(customer: &Customer) -> Self {
        Self {
            company_name: customer.company_name.clone(),
            contact_name: customer.contact_name.clone(),
            phone: customer.phone.clone(),
            customer_type: customer.customer_type.clone(),
            notes: customer.notes_or_empty().to_string(),
        }
    }
}

// Login template
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub labels: &'static Labels,
    pub notice: Option<Notice>,
    pub username: String,
    pub version: &'static str,
}

// Dashboard template
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub summary: DashboardSummary,
}

// Customer list template
#[derive(Template)]
#[template(path = "customers.html")]
pub struct CustomersTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub customers: Vec<Customer>,
    pub search: String,
    pub type_options: Vec<SelectOption>,
}

// Add/edit customer form
#[derive(Template)]
#[template(path = "customer_form.html")]
pub struct CustomerFormTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub heading: &'static str,
    pub action: String,
    pub form: CustomerFormValues,
    pub type_options: Vec<SelectOption>,
    /// Shown read-only when editing
    pub registration_date: Option<String>,
}

// Delete confirmation
#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub customer: Customer,
    pub prompt: String,
}

// Settings template
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub version: &'static str,
    /// Already filled `info_database` line
    pub database_location: String,
}

// Restore picker
#[derive(Template)]
#[template(path = "restore.html")]
pub struct RestoreTemplate {
    pub labels: &'static Labels,
    pub user: String,
    pub notice: Option<Notice>,
    pub backups: Vec<String>,
}

pub fn welcome(labels: &Labels, username: &str) -> Notice {
    Notice::info(labels.login_success_title, fill(labels.welcome_back, username))
}
