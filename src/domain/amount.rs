//! Conversion between human-readable amounts and token smallest units.

use rust_decimal::Decimal;

use crate::error::GatewayError;

/// Scales a human amount (e.g. `320` DAI) to smallest token units.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAmount`] if the amount is negative, has
/// more fractional digits than `decimals`, or does not fit in `u128`.
pub fn parse_units(amount: Decimal, decimals: u8) -> Result<u128, GatewayError> {
    if amount.is_sign_negative() {
        return Err(GatewayError::InvalidAmount(format!(
            "{amount} is negative"
        )));
    }
    let amount = amount.normalize();
    if amount.scale() > u32::from(decimals) {
        return Err(GatewayError::InvalidAmount(format!(
            "{amount} has more than {decimals} decimal places"
        )));
    }

    let mantissa = u128::try_from(amount.mantissa())
        .map_err(|_| GatewayError::InvalidAmount(format!("{amount} is negative")))?;
    let shift = u32::from(decimals) - amount.scale();
    10u128
        .checked_pow(shift)
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or_else(|| GatewayError::InvalidAmount(format!("{amount} overflows token units")))
}

/// Converts smallest token units back to a human amount.
///
/// Returns `None` when the value exceeds what a [`Decimal`] can hold.
#[must_use]
pub fn format_units(units: u128, decimals: u8) -> Option<Decimal> {
    let units = i128::try_from(units).ok()?;
    Decimal::try_from_i128_with_scale(units, u32::from(decimals))
        .ok()
        .map(|d| d.normalize())
}

/// Parses a decimal string and requires it to be strictly positive.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAmount`] if `raw` is not a number or is
/// not greater than zero.
pub fn parse_positive(field: &str, raw: &str) -> Result<Decimal, GatewayError> {
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| GatewayError::InvalidAmount(format!("{field} is not a number: {raw}")))?;
    if value <= Decimal::ZERO {
        return Err(GatewayError::InvalidAmount(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(value.normalize())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scales_whole_amounts() {
        let Ok(units) = parse_units(dec!(320), 18) else {
            panic!("320 DAI should scale");
        };
        assert_eq!(units, 320_000_000_000_000_000_000);
    }

    #[test]
    fn scales_fractional_amounts() {
        assert_eq!(parse_units(dec!(1.5), 6).ok(), Some(1_500_000));
        assert_eq!(parse_units(dec!(0.000001), 6).ok(), Some(1));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert_eq!(parse_units(dec!(2.500000000), 6).ok(), Some(2_500_000));
    }

    #[test]
    fn rejects_excess_precision_and_negatives() {
        assert!(parse_units(dec!(0.0000001), 6).is_err());
        assert!(parse_units(dec!(-1), 18).is_err());
    }

    #[test]
    fn format_inverts_parse() {
        let Ok(units) = parse_units(dec!(480), 18) else {
            panic!("480 should scale");
        };
        assert_eq!(format_units(units, 18), Some(dec!(480)));
    }

    #[test]
    fn parse_positive_rejects_zero_and_garbage() {
        assert!(parse_positive("investmentAmount", "0").is_err());
        assert!(parse_positive("investmentAmount", "-3").is_err());
        assert!(parse_positive("investmentAmount", "abc").is_err());
        assert_eq!(
            parse_positive("investmentAmount", " 320 ").ok(),
            Some(dec!(320))
        );
    }
}
