//! Customer models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coal grade a customer buys. Stored as its Chinese label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CustomerType {
    #[serde(rename = "精煤")]
    CleanCoal,
    #[serde(rename = "中煤")]
    Middlings,
}

impl CustomerType {
    pub const ALL: [CustomerType; 2] = [CustomerType::CleanCoal, CustomerType::Middlings];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::CleanCoal => "精煤",
            CustomerType::Middlings => "中煤",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "精煤" => Some(CustomerType::CleanCoal),
            "中煤" => Some(CustomerType::Middlings),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter value meaning "every type"
pub const ALL_TYPES: &str = "所有";

/// Type filter of the customer list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(CustomerType),
}

impl TypeFilter {
    /// Parse a dropdown value. Blank and unrecognised values mean "all".
    pub fn parse(s: &str) -> Self {
        match CustomerType::from_str(s) {
            Some(t) => TypeFilter::Only(t),
            None => TypeFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeFilter::All => ALL_TYPES,
            TypeFilter::Only(t) => t.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub company_name: String,
    pub contact_name: String,
    pub phone: String,
    pub customer_type: String,
    pub notes: Option<String>,
    pub registration_date: String,
}

impl Customer {
    pub fn notes_or_empty(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }

    /// CSS class used to colour rows by type
    pub fn type_class(&self) -> &'static str {
        match CustomerType::from_str(&self.customer_type) {
            Some(CustomerType::CleanCoal) => "type-clean",
            Some(CustomerType::Middlings) => "type-middlings",
            None => "",
        }
    }
}

/// Editable customer fields, as submitted by the add and edit forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub company_name: String,
    pub contact_name: String,
    pub phone: String,
    pub customer_type: CustomerType,
    pub notes: String,
}

impl CustomerInput {
    pub fn new(
        company_name: impl Into<String>,
        contact_name: impl Into<String>,
        phone: impl Into<String>,
        customer_type: CustomerType,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            contact_name: contact_name.into(),
            phone: phone.into(),
            customer_type,
            notes: notes.into(),
        }
    }

    /// Copy with surrounding whitespace stripped from every field
    pub fn trimmed(&self) -> Self {
        Self {
            company_name: self.company_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            customer_type: self.customer_type,
            notes: self.notes.trim().to_string(),
        }
    }
}

/// Search box and type dropdown of the customer list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub text: String,
    pub type_filter: TypeFilter,
}

impl CustomerQuery {
    pub fn new(text: impl Into<String>, type_filter: TypeFilter) -> Self {
        Self {
            text: text.into(),
            type_filter,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

/// Counts and recent rows shown on the dashboard
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    pub total: i64,
    pub clean_coal: i64,
    pub middlings: i64,
    pub recent: Vec<Customer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_type_from_str() {
        assert_eq!(CustomerType::from_str("精煤"), Some(CustomerType::CleanCoal));
        assert_eq!(CustomerType::from_str("中煤"), Some(CustomerType::Middlings));
        assert_eq!(CustomerType::from_str("所有"), None);
        assert_eq!(CustomerType::from_str("coal"), None);
    }

    #[test]
    fn test_type_filter_parse() {
        assert_eq!(TypeFilter::parse("所有"), TypeFilter::All);
        assert_eq!(TypeFilter::parse(""), TypeFilter::All);
        assert_eq!(
            TypeFilter::parse("中煤"),
            TypeFilter::Only(CustomerType::Middlings)
        );
        assert_eq!(TypeFilter::All.as_str(), "所有");
    }

    #[test]
    fn test_input_trimmed() {
        let input = CustomerInput::new(" 凯川 ", "王五\n", " 13800138000 ", CustomerType::CleanCoal, "  ");
        let trimmed = input.trimmed();
        assert_eq!(trimmed.company_name, "凯川");
        assert_eq!(trimmed.contact_name, "王五");
        assert_eq!(trimmed.phone, "13800138000");
        assert_eq!(trimmed.notes, "");
    }
}
