use thiserror::Error;

use crate::types::ResourceKind;

/// Broad class of a [`SimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad world or config input; fatal, never recovered.
    Configuration,
    /// An operation would break a model invariant; the operation is rejected.
    InvariantViolation,
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown ship class: {0}")]
    UnknownShipClass(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Duplicate city name: {0}")]
    DuplicateCity(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Unknown ship: {0}")]
    UnknownShip(String),

    #[error("Ship {ship} has an empty route")]
    EmptyRoute { ship: String },

    #[error("Rejected transfer of {amount} {what}: amount must be finite and non-negative")]
    InvalidTransfer { what: &'static str, amount: f64 },

    #[error("{holder} cannot give {requested} {what}, only {available} available")]
    Overdraw {
        holder: String,
        what: &'static str,
        requested: f64,
        available: f64,
    },

    #[error("Ship {ship} cannot load {tons}t of {resource:?}: only {free}t of hold free")]
    HoldOverflow {
        ship: String,
        resource: ResourceKind,
        tons: u32,
        free: f64,
    },
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::UnknownShipClass(_)
            | SimError::InvalidConfig(_)
            | SimError::ConfigParse(_)
            | SimError::DuplicateCity(_)
            | SimError::UnknownCity(_)
            | SimError::UnknownShip(_) => ErrorKind::Configuration,
            SimError::EmptyRoute { .. }
            | SimError::InvalidTransfer { .. }
            | SimError::Overdraw { .. }
            | SimError::HoldOverflow { .. } => ErrorKind::InvariantViolation,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject negative, NaN or infinite amounts before they touch a balance.
pub(crate) fn check_amount(what: &'static str, amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTransfer { what, amount })
    }
}

/// Take `amount` out of `balance`, rejecting draws beyond what is held.
/// Float dust from price arithmetic is tolerated and floored at zero.
pub(crate) fn draw_down(
    balance: &mut f64,
    amount: f64,
    holder: &str,
    what: &'static str,
) -> Result<()> {
    check_amount(what, amount)?;
    let tolerance = 1e-9 * balance.abs().max(1.0);
    if amount > *balance + tolerance {
        return Err(SimError::Overdraw {
            holder: holder.to_string(),
            what,
            requested: amount,
            available: *balance,
        });
    }
    *balance = (*balance - amount).max(0.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SimError::UnknownShipClass("Raft".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            SimError::EmptyRoute { ship: "x".into() }.kind(),
            ErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_check_amount() {
        assert!(check_amount("gold", 0.0).is_ok());
        assert!(check_amount("gold", 12.5).is_ok());
        assert!(check_amount("gold", -1.0).is_err());
        assert!(check_amount("gold", f64::NAN).is_err());
        assert!(check_amount("gold", f64::INFINITY).is_err());
    }

    #[test]
    fn test_draw_down() {
        let mut gold = 10.0;
        draw_down(&mut gold, 4.0, "Tortuga", "gold").unwrap();
        assert_eq!(gold, 6.0);

        let err = draw_down(&mut gold, 7.0, "Tortuga", "gold").unwrap_err();
        assert!(matches!(err, SimError::Overdraw { .. }));
        assert_eq!(gold, 6.0, "failed draw must not touch the balance");

        draw_down(&mut gold, 6.0 + 1e-12, "Tortuga", "gold").unwrap();
        assert_eq!(gold, 0.0);
    }
}
