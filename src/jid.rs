//! Messaging identifiers used as path parameters.
//!
//! A bare identifier is `[local@]domain`. A full identifier adds an optional
//! `/resource` suffix. Parsing is deliberately shallow: no stringprep, only the
//! structural rules needed to reject obviously broken input at bind time.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons an identifier string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier contains whitespace")]
    Whitespace,
    #[error("identifier has an empty domain")]
    EmptyDomain,
    #[error("identifier has an empty local part")]
    EmptyLocal,
    #[error("identifier has an empty resource")]
    EmptyResource,
    #[error("identifier contains more than one '@'")]
    MultipleAt,
    #[error("bare identifier must not carry a resource")]
    UnexpectedResource,
}

/// `[local@]domain`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BareJid {
    local: Option<String>,
    domain: String,
}

impl BareJid {
    pub fn new(local: Option<&str>, domain: &str) -> Result<Self, JidError> {
        if domain.is_empty() {
            return Err(JidError::EmptyDomain);
        }
        if let Some(l) = local {
            if l.is_empty() {
                return Err(JidError::EmptyLocal);
            }
        }
        Ok(Self {
            local: local.map(str::to_string),
            domain: domain.to_string(),
        })
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl FromStr for BareJid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            return Err(JidError::UnexpectedResource);
        }
        parse_bare(s)
    }
}

impl fmt::Display for BareJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.local {
            Some(local) => write!(f, "{}@{}", local, self.domain),
            None => f.write_str(&self.domain),
        }
    }
}

/// `[local@]domain[/resource]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    bare: BareJid,
    resource: Option<String>,
}

impl Jid {
    pub fn bare(&self) -> &BareJid {
        &self.bare
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn into_bare(self) -> BareJid {
        self.bare
    }
}

impl From<BareJid> for Jid {
    fn from(bare: BareJid) -> Self {
        Self {
            bare,
            resource: None,
        }
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The resource may itself contain '/' or '@', so split on the first '/'.
        let (bare, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(JidError::EmptyResource),
            Some((bare, resource)) => (bare, Some(resource.to_string())),
            None => (s, None),
        };
        Ok(Self {
            bare: parse_bare(bare)?,
            resource,
        })
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{}", self.bare, resource),
            None => write!(f, "{}", self.bare),
        }
    }
}

fn parse_bare(s: &str) -> Result<BareJid, JidError> {
    if s.is_empty() {
        return Err(JidError::Empty);
    }
    if s.chars().any(char::is_whitespace) {
        return Err(JidError::Whitespace);
    }
    let mut parts = s.split('@');
    let first = parts.next().unwrap_or_default();
    match (parts.next(), parts.next()) {
        (None, _) => BareJid::new(None, first),
        (Some(domain), None) => BareJid::new(Some(first), domain),
        (Some(_), Some(_)) => Err(JidError::MultipleAt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_jid_parse() {
        let jid: BareJid = "alice@example.com".parse().unwrap();
        assert_eq!(jid.local(), Some("alice"));
        assert_eq!(jid.domain(), "example.com");
        assert_eq!(jid.to_string(), "alice@example.com");

        let domain_only: BareJid = "example.com".parse().unwrap();
        assert_eq!(domain_only.local(), None);
    }

    #[test]
    fn test_bare_jid_rejects_malformed() {
        assert_eq!("".parse::<BareJid>(), Err(JidError::Empty));
        assert_eq!("@example.com".parse::<BareJid>(), Err(JidError::EmptyLocal));
        assert_eq!("alice@".parse::<BareJid>(), Err(JidError::EmptyDomain));
        assert_eq!("a@b@c".parse::<BareJid>(), Err(JidError::MultipleAt));
        assert_eq!("a@b/res".parse::<BareJid>(), Err(JidError::UnexpectedResource));
        assert_eq!("al ice@b".parse::<BareJid>(), Err(JidError::Whitespace));
    }

    #[test]
    fn test_full_jid_resource() {
        let jid: Jid = "alice@example.com/phone".parse().unwrap();
        assert_eq!(jid.bare().to_string(), "alice@example.com");
        assert_eq!(jid.resource(), Some("phone"));
        assert_eq!(jid.to_string(), "alice@example.com/phone");

        let no_resource: Jid = "alice@example.com".parse().unwrap();
        assert_eq!(no_resource.resource(), None);

        assert_eq!("alice@example.com/".parse::<Jid>(), Err(JidError::EmptyResource));
    }
}
