//! Value objects owned by the customers module.
//!
//! Every type here validates on construction; the aggregate never re-checks them.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use customerflow_core::{AggregateId, DomainError, DomainResult, ValueObject, require};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    /// Fresh, unique identifier.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }

    pub fn as_aggregate_id(&self) -> AggregateId {
        self.0
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CustomerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("CustomerId: '{s}'")))
    }
}

impl From<CustomerId> for AggregateId {
    fn from(value: CustomerId) -> Self {
        value.0
    }
}

impl ValueObject for CustomerId {}

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// A syntactically valid email address.
///
/// Surrounding whitespace is trimmed; the rest is kept as given (no case
/// folding), so two addresses are equal only if they were typed the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = require("email_address", Some(raw))?.trim();

        if value.len() > MAX_EMAIL_LEN {
            return Err(DomainError::validation("email address is too long"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email address contains whitespace"));
        }

        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| DomainError::validation("email address needs an '@'"))?;

        if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
            return Err(DomainError::validation("email local part is empty or too long"));
        }
        if domain.contains('@') {
            return Err(DomainError::validation("email address has more than one '@'"));
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(DomainError::validation(format!(
                "email domain '{domain}' is not a dotted host name"
            )));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl ValueObject for EmailAddress {}

/// Opaque token proving control of an email address.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfirmationHash(String);

impl ConfirmationHash {
    /// 128 random bits, hex encoded.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = require("confirmation_hash", Some(raw))?.trim();
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("confirmation hash contains whitespace"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs through Debug; keep them short.
impl core::fmt::Debug for ConfirmationHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "ConfirmationHash({prefix}..)")
    }
}

impl TryFrom<String> for ConfirmationHash {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConfirmationHash> for String {
    fn from(value: ConfirmationHash) -> Self {
        value.0
    }
}

impl ValueObject for ConfirmationHash {}

/// Given + family name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PersonNameParts")]
pub struct PersonName {
    given_name: String,
    family_name: String,
}

#[derive(Deserialize)]
struct PersonNameParts {
    given_name: String,
    family_name: String,
}

impl PersonName {
    pub fn build(given_name: &str, family_name: &str) -> DomainResult<Self> {
        let given_name = require("given_name", Some(given_name))?.trim();
        let family_name = require("family_name", Some(family_name))?.trim();
        Ok(Self {
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
        })
    }

    pub fn given_name(&self) -> &str {
        &self.given_name
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }
}

impl core::fmt::Display for PersonName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.given_name, self.family_name)
    }
}

impl TryFrom<PersonNameParts> for PersonName {
    type Error = DomainError;

    fn try_from(parts: PersonNameParts) -> Result<Self, Self::Error> {
        Self::build(&parts.given_name, &parts.family_name)
    }
}

impl ValueObject for PersonName {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_plus_addressing() {
        let email = EmailAddress::parse("john+changed@doe.com").unwrap();
        assert_eq!(email.as_str(), "john+changed@doe.com");
    }

    #[test]
    fn email_trims_surrounding_whitespace() {
        let email = EmailAddress::parse("  john@doe.com \n").unwrap();
        assert_eq!(email, EmailAddress::parse("john@doe.com").unwrap());
    }

    #[test]
    fn email_rejects_malformed_input() {
        for raw in [
            "john.doe.com",
            "@doe.com",
            "john@",
            "john@doe",
            "john@doe..com",
            "john@@doe.com",
            "jo hn@doe.com",
        ] {
            let err = EmailAddress::parse(raw).unwrap_err();
            assert!(
                matches!(err, DomainError::Validation(_)),
                "{raw} gave {err:?}"
            );
        }
    }

    #[test]
    fn email_blank_is_a_missing_field() {
        assert_eq!(
            EmailAddress::parse("   ").unwrap_err(),
            DomainError::MissingField("email_address")
        );
    }

    #[test]
    fn email_is_case_sensitive_value() {
        assert_ne!(
            EmailAddress::parse("John@doe.com").unwrap(),
            EmailAddress::parse("john@doe.com").unwrap()
        );
    }

    #[test]
    fn email_deserializes_through_validation() {
        let ok: EmailAddress = serde_json::from_str("\"john@doe.com\"").unwrap();
        assert_eq!(ok.as_str(), "john@doe.com");
        assert!(serde_json::from_str::<EmailAddress>("\"nope\"").is_err());
    }

    #[test]
    fn generated_hashes_differ() {
        let a = ConfirmationHash::generate();
        let b = ConfirmationHash::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn hash_round_trips_through_parse() {
        let hash = ConfirmationHash::generate();
        assert_eq!(ConfirmationHash::parse(hash.as_str()).unwrap(), hash);
    }

    #[test]
    fn hash_blank_is_a_missing_field() {
        assert_eq!(
            ConfirmationHash::parse("").unwrap_err(),
            DomainError::MissingField("confirmation_hash")
        );
    }

    #[test]
    fn hash_debug_does_not_leak_the_token() {
        let hash = ConfirmationHash::parse("abcdef0123456789").unwrap();
        assert_eq!(format!("{hash:?}"), "ConfirmationHash(abcdef..)");
    }

    #[test]
    fn person_name_requires_both_parts() {
        assert_eq!(
            PersonName::build("", "Doe").unwrap_err(),
            DomainError::MissingField("given_name")
        );
        assert_eq!(
            PersonName::build("John", " ").unwrap_err(),
            DomainError::MissingField("family_name")
        );

        let name = PersonName::build("John", "Doe").unwrap();
        assert_eq!(name.given_name(), "John");
        assert_eq!(name.family_name(), "Doe");
        assert_eq!(name.to_string(), "John Doe");
    }

    #[test]
    fn person_name_deserialization_is_validated() {
        let json = r#"{"given_name":"John","family_name":""}"#;
        assert!(serde_json::from_str::<PersonName>(json).is_err());

        let json = r#"{"given_name":"John","family_name":"Doe"}"#;
        let name: PersonName = serde_json::from_str(json).unwrap();
        assert_eq!(name, PersonName::build("John", "Doe").unwrap());
    }

    #[test]
    fn customer_id_parse_errors_are_invalid_id() {
        assert!(matches!(
            "xyz".parse::<CustomerId>().unwrap_err(),
            DomainError::InvalidId(_)
        ));
        let id = CustomerId::generate();
        assert_eq!(id.to_string().parse::<CustomerId>().unwrap(), id);
    }
}
