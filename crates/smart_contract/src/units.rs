//! Ether denominations and decimal conversion between them.
//!
//! Pages show amounts in a display unit (typically ether) while contracts
//! expect an integer amount in a smaller unit (typically wei). Values are
//! handled as decimal strings backed by arbitrary precision integers so that
//! 256-bit amounts never lose precision.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{Num, Zero};

use crate::error::ConversionError;

/// Named Ether denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EthUnit {
    #[default]
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
    Kether,
    Mether,
    Gether,
    Tether,
}

impl EthUnit {
    /// Power of ten relative to wei.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        match self {
            Self::Wei => 0,
            Self::Kwei => 3,
            Self::Mwei => 6,
            Self::Gwei => 9,
            Self::Szabo => 12,
            Self::Finney => 15,
            Self::Ether => 18,
            Self::Kether => 21,
            Self::Mether => 24,
            Self::Gether => 27,
            Self::Tether => 30,
        }
    }
}

impl FromStr for EthUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wei" | "noether" => Ok(Self::Wei),
            "kwei" | "babbage" | "femtoether" => Ok(Self::Kwei),
            "mwei" | "lovelace" | "picoether" => Ok(Self::Mwei),
            "gwei" | "shannon" | "nanoether" | "nano" => Ok(Self::Gwei),
            "szabo" | "microether" | "micro" => Ok(Self::Szabo),
            "finney" | "milliether" | "milli" => Ok(Self::Finney),
            "ether" | "eth" => Ok(Self::Ether),
            "kether" | "grand" => Ok(Self::Kether),
            "mether" => Ok(Self::Mether),
            "gether" => Ok(Self::Gether),
            "tether" => Ok(Self::Tether),
            _ => Err(ConversionError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for EthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wei => "wei",
            Self::Kwei => "kwei",
            Self::Mwei => "mwei",
            Self::Gwei => "gwei",
            Self::Szabo => "szabo",
            Self::Finney => "finney",
            Self::Ether => "ether",
            Self::Kether => "kether",
            Self::Mether => "mether",
            Self::Gether => "gether",
            Self::Tether => "tether",
        };
        write!(f, "{name}")
    }
}

fn parse_unit(unit: Option<&str>) -> Result<EthUnit, ConversionError> {
    match unit.map(str::trim) {
        None | Some("") => Ok(EthUnit::Wei),
        Some(name) => name.parse(),
    }
}

/// Splits a non-negative decimal into its digits and the number of
/// fractional digits.
fn parse_decimal(value: &str) -> Result<(BigUint, u32), ConversionError> {
    let invalid = || ConversionError::InvalidNumber(value.to_string());
    let trimmed = value.trim();

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let digits = format!("{int_part}{frac_part}");
    let mantissa = BigUint::from_str_radix(&digits, 10).map_err(|_| invalid())?;
    let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
    Ok((mantissa, scale))
}

fn format_scaled(mantissa: &BigUint, scale: u32) -> String {
    let digits = mantissa.to_string();
    if scale == 0 {
        return digits;
    }
    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Converts `value` expressed in `display_units` into `contract_units`.
///
/// A missing unit on either side means wei. The result is an integer string
/// whenever the target unit can represent the value exactly, otherwise a
/// decimal string without trailing zeros.
pub fn convert_units(
    display_units: Option<&str>,
    contract_units: Option<&str>,
    value: &str,
) -> Result<String, ConversionError> {
    let from = parse_unit(display_units)?;
    let to = parse_unit(contract_units)?;
    let (mantissa, scale) = parse_decimal(value)?;

    if mantissa.is_zero() {
        return Ok("0".to_string());
    }

    let shift = i64::from(from.decimals()) - i64::from(to.decimals()) - i64::from(scale);
    if shift >= 0 {
        let factor = BigUint::from(10u32).pow(shift as u32);
        Ok((mantissa * factor).to_string())
    } else {
        Ok(format_scaled(&mantissa, shift.unsigned_abs() as u32))
    }
}
