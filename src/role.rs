//! Authorization classes of an account.

use serde::{Deserialize, Serialize};

/// Role of an account, derived from the label stored with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Label is missing or not recognized.
    #[default]
    Unknown,
    Administrador,
    Medico,
    Recepcionista,
    Paciente,
}

impl Role {
    /// Map a stored role label to a [`Role`].
    ///
    /// Never fails: anything outside the recognized labels is
    /// [`Role::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "ADMINISTRADOR" => Role::Administrador,
            "MEDICO" => Role::Medico,
            "RECEPCIONISTA" => Role::Recepcionista,
            "PACIENTE" => Role::Paciente,
            _ => Role::Unknown,
        }
    }

    /// Label as written on database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unknown => "UNKNOWN",
            Role::Administrador => "ADMINISTRADOR",
            Role::Medico => "MEDICO",
            Role::Recepcionista => "RECEPCIONISTA",
            Role::Paciente => "PACIENTE",
        }
    }
}

impl From<&str> for Role {
    fn from(label: &str) -> Self {
        Role::from_label(label)
    }
}

impl From<Option<&str>> for Role {
    fn from(label: Option<&str>) -> Self {
        label.map(Role::from_label).unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
