use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Fields every invoice configuration must set.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "paid_by", "wire_info"];

/// Fields required when invoices are sent by e-mail.
pub const EMAIL_FIELDS: [&str; 2] = ["email", "accounting_email"];

/// Per-user invoice settings.
///
/// Every field is optional at the type level; [`check_config_for`] decides
/// which ones must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Full name printed on the invoice.
    pub name: Option<String>,
    /// Paying party.
    pub paid_by: Option<String>,
    /// Bank transfer details.
    pub wire_info: Option<String>,
    /// Address the invoice is sent to.
    pub email: Option<String>,
    /// Accounting address copied on every sent invoice.
    pub accounting_email: Option<String>,
    /// Payments below this amount are deferred to the next month.
    pub minimal_payment: Option<Decimal>,
    /// Fixed amount added to every payout.
    pub extra_add: Option<Decimal>,
    /// Users whose work is invoiced as part of this user's invoice.
    pub subcontractors: Vec<String>,
}

impl InvoiceConfig {
    /// Configuration with the always-required fields set.
    pub fn new(
        name: impl Into<String>,
        paid_by: impl Into<String>,
        wire_info: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            paid_by: Some(paid_by.into()),
            wire_info: Some(wire_info.into()),
            ..Self::default()
        }
    }

    /// Set the recipient and accounting addresses.
    pub fn with_email(
        mut self,
        email: impl Into<String>,
        accounting_email: impl Into<String>,
    ) -> Self {
        self.email = Some(email.into());
        self.accounting_email = Some(accounting_email.into());
        self
    }

    /// Defer payments below `amount`.
    pub fn with_minimal_payment(mut self, amount: Decimal) -> Self {
        self.minimal_payment = Some(amount);
        self
    }

    /// Add `amount` to every payout.
    pub fn with_extra_add(mut self, amount: Decimal) -> Self {
        self.extra_add = Some(amount);
        self
    }

    /// Include the work of `username` in this invoice.
    pub fn with_subcontractor(mut self, username: impl Into<String>) -> Self {
        self.subcontractors.push(username.into());
        self
    }

    /// Minimal payment, zero when unset.
    pub fn minimal_payment(&self) -> Decimal {
        self.minimal_payment.unwrap_or(Decimal::ZERO)
    }

    /// Extra amount, zero when unset.
    pub fn extra_add(&self) -> Decimal {
        self.extra_add.unwrap_or(Decimal::ZERO)
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => self.name.as_deref(),
            "paid_by" => self.paid_by.as_deref(),
            "wire_info" => self.wire_info.as_deref(),
            "email" => self.email.as_deref(),
            "accounting_email" => self.accounting_email.as_deref(),
            _ => None,
        }
    }

    /// Parse a single user's settings from a JSON object.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(json).map_err(|e| InvoiceError::Config(e.to_string()))
    }
}

/// Check that `config` has all mandatory fields for `username`.
///
/// `name`, `paid_by` and `wire_info` are always required; `email` and
/// `accounting_email` only with `require_email_fields`. All missing fields
/// are reported at once.
pub fn check_config_for(
    config: &InvoiceConfig,
    username: &str,
    require_email_fields: bool,
) -> Result<(), InvoiceError> {
    let email_fields: &[&'static str] = if require_email_fields {
        &EMAIL_FIELDS
    } else {
        &[]
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .chain(email_fields)
        .copied()
        .filter(|field| config.field(field).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(InvoiceError::ImproperlyConfigured {
            username: username.to_string(),
            missing,
        })
    }
}

/// Invoice settings of all invoiced users, keyed by username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoicesConfig {
    users: BTreeMap<String, InvoiceConfig>,
}

impl InvoicesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the settings of `username`.
    pub fn insert(&mut self, username: impl Into<String>, config: InvoiceConfig) {
        self.users.insert(username.into(), config);
    }

    /// Settings of `username`, if configured.
    pub fn get(&self, username: &str) -> Option<&InvoiceConfig> {
        self.users.get(username)
    }

    /// Usernames in sorted order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Validate every entry, failing on the first misconfigured user.
    pub fn check(&self, require_email_fields: bool) -> Result<(), InvoiceError> {
        self.users
            .iter()
            .try_for_each(|(username, config)| {
                check_config_for(config, username, require_email_fields)
            })
    }

    /// Parse a JSON object mapping usernames to their settings.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(json).map_err(|e| InvoiceError::Config(e.to_string()))
    }
}

impl FromIterator<(String, InvoiceConfig)> for InvoicesConfig {
    fn from_iter<I: IntoIterator<Item = (String, InvoiceConfig)>>(iter: I) -> Self {
        Self {
            users: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn missing_fields(result: Result<(), InvoiceError>) -> Vec<&'static str> {
        match result {
            Err(InvoiceError::ImproperlyConfigured { missing, .. }) => missing,
            other => panic!("expected ImproperlyConfigured, got {other:?}"),
        }
    }

    #[test]
    fn complete_config_passes() {
        let config = InvoiceConfig::new("Foo", "Bar", "Baz 01234");
        assert!(check_config_for(&config, "alice", false).is_ok());
    }

    #[test]
    fn empty_config_reports_all_required_fields() {
        let missing = missing_fields(check_config_for(&InvoiceConfig::default(), "alice", false));
        assert_eq!(missing, vec!["name", "paid_by", "wire_info"]);
    }

    #[test]
    fn email_fields_only_checked_on_request() {
        let config = InvoiceConfig::new("Foo", "Bar", "Baz 01234");
        assert!(check_config_for(&config, "alice", false).is_ok());
        let missing = missing_fields(check_config_for(&config, "alice", true));
        assert_eq!(missing, vec!["email", "accounting_email"]);

        let config = config.with_email("foo@example.org", "bar@example.com");
        assert!(check_config_for(&config, "alice", true).is_ok());
    }

    #[test]
    fn error_names_user() {
        let err = check_config_for(&InvoiceConfig::default(), "fake_username", false).unwrap_err();
        assert!(err.to_string().contains("fake_username"));
    }

    #[test]
    fn defaults_are_zero() {
        let config = InvoiceConfig::default();
        assert_eq!(config.minimal_payment(), Decimal::ZERO);
        assert_eq!(config.extra_add(), Decimal::ZERO);

        let config = config.with_minimal_payment(dec!(20)).with_extra_add(dec!(5));
        assert_eq!(config.minimal_payment(), dec!(20));
        assert_eq!(config.extra_add(), dec!(5));
    }

    #[test]
    fn check_all_users() {
        let mut configs = InvoicesConfig::new();
        configs.insert("alice", InvoiceConfig::new("Alice", "Acme", "IBAN 1"));
        assert!(configs.check(false).is_ok());

        configs.insert("bob", InvoiceConfig::default());
        let err = configs.check(false).unwrap_err();
        assert_eq!(err.username(), Some("bob"));
        assert_eq!(configs.usernames().collect::<Vec<_>>(), vec!["alice", "bob"]);
    }
}
