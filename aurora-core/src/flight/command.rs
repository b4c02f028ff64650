//! Operator command grammar for the flight panel prompt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `sair`
    Exit,
    /// `eco on` / `eco off`
    Eco(bool),
    /// `impulso N`
    Impulse(u32),
    /// Anything else; validated by the maneuver operation.
    Speed(String),
    /// Blank line: let time pass.
    Idle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid impulse count '{0}'")]
    InvalidImpulseCount(String),
    #[error("impulse count must be positive")]
    NonPositiveImpulse,
    #[error("impulse command expects exactly one count (e.g. 'impulso 5')")]
    MalformedImpulse,
}

impl Command {
    /// Parse one line of operator input.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed `impulso` command.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let text = line.trim().to_lowercase();
        if text.is_empty() {
            return Ok(Self::Idle);
        }
        match text.as_str() {
            "sair" => return Ok(Self::Exit),
            "eco on" => return Ok(Self::Eco(true)),
            "eco off" => return Ok(Self::Eco(false)),
            _ => {}
        }

        let mut words = text.split_whitespace();
        if words.next() == Some("impulso") {
            let (Some(count), None) = (words.next(), words.next()) else {
                return Err(CommandError::MalformedImpulse);
            };
            return parse_impulse_count(count).map(Self::Impulse);
        }
        Ok(Self::Speed(text))
    }
}

fn parse_impulse_count(raw: &str) -> Result<u32, CommandError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| CommandError::InvalidImpulseCount(raw.to_string()))?;
    if value <= 0 {
        return Err(CommandError::NonPositiveImpulse);
    }
    u32::try_from(value).map_err(|_| CommandError::InvalidImpulseCount(raw.to_string()))
}
