use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Transfer network a remittance is sent through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    Wu,
    Ria,
    Mg,
    Wave,
    Om,
}

impl Provider {
    pub const ALL: [Provider; 5] = [Self::Wu, Self::Ria, Self::Mg, Self::Wave, Self::Om];

    /// Canonical code as stored in the database and used as translation key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wu => "WU",
            Self::Ria => "RIA",
            Self::Mg => "MG",
            Self::Wave => "WAVE",
            Self::Om => "OM",
        }
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == code)
            .ok_or_else(|| ValidationError::UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer handed over the funds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Cash,
    Mobile,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Mobile => "MOBILE",
        }
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "MOBILE" => Ok(Self::Mobile),
            _ => Err(ValidationError::UnknownChannel(s.to_string())),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff role. Only admins may change office settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "EMPLOYEE" => Ok(Self::Employee),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}

/// Operations gated by [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRemittance,
    ViewRemittances,
    ViewDashboard,
    ViewSettings,
    ManageSettings,
}

/// Whether a principal holding `role` may perform `action`.
pub fn authorize(role: Role, action: Action) -> bool {
    match action {
        Action::ManageSettings => role == Role::Admin,
        Action::CreateRemittance
        | Action::ViewRemittances
        | Action::ViewDashboard
        | Action::ViewSettings => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_case_insensitive() {
        assert_eq!("wu".parse::<Provider>().unwrap(), Provider::Wu);
        assert_eq!(" WAVE ".parse::<Provider>().unwrap(), Provider::Wave);
        assert!("PAYPAL".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_serde_uses_codes() {
        let json = serde_json::to_string(&Provider::Mg).unwrap();
        assert_eq!(json, "\"MG\"");
        let back: Provider = serde_json::from_str("\"OM\"").unwrap();
        assert_eq!(back, Provider::Om);
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("cash".parse::<Channel>().unwrap(), Channel::Cash);
        assert_eq!(
            "bank".parse::<Channel>(),
            Err(ValidationError::UnknownChannel("bank".into()))
        );
    }

    #[test]
    fn test_only_admin_manages_settings() {
        assert!(authorize(Role::Admin, Action::ManageSettings));
        assert!(!authorize(Role::Employee, Action::ManageSettings));
        assert!(authorize(Role::Employee, Action::CreateRemittance));
        assert!(authorize(Role::Employee, Action::ViewDashboard));
    }
}
