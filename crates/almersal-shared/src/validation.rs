use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ValidationError;
use crate::fees::{compute_fee, validate_amount};
use crate::models::NewRemittance;

/// Raw remittance submission as posted by the counter staff.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemittanceForm {
    pub provider: String,
    pub channel: String,
    pub amount: Decimal,
    #[serde(default)]
    pub dest_country: String,
    #[serde(default)]
    pub dest_currency: String,
    #[serde(default)]
    pub tracking: String,
}

impl RemittanceForm {
    /// Check enum membership, the amount and required text fields. The
    /// amount must also be small enough to price without overflow.
    ///
    /// `allow_non_positive` skips the amount check for offices that record
    /// refunds or corrections as negative transfers.
    pub fn validate(self, allow_non_positive: bool) -> Result<NewRemittance, ValidationError> {
        let provider = self.provider.parse()?;
        let channel = self.channel.parse()?;
        let amount_mru = if allow_non_positive {
            self.amount
        } else {
            validate_amount(self.amount)?
        };
        compute_fee(amount_mru)?;

        let tracking = self.tracking.trim().to_string();
        if tracking.is_empty() {
            return Err(ValidationError::MissingField("tracking"));
        }

        Ok(NewRemittance {
            provider,
            channel,
            amount_mru,
            dest_country: self.dest_country.trim().to_string(),
            dest_currency: self.dest_currency.trim().to_uppercase(),
            tracking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Provider};
    use rust_decimal_macros::dec;

    fn form(amount: Decimal) -> RemittanceForm {
        RemittanceForm {
            provider: "ria".into(),
            channel: "MOBILE".into(),
            amount,
            dest_country: " Senegal ".into(),
            dest_currency: "xof".into(),
            tracking: " 1234567890 ".into(),
        }
    }

    #[test]
    fn test_valid_form() {
        let r = form(dec!(250)).validate(false).unwrap();
        assert_eq!(r.provider, Provider::Ria);
        assert_eq!(r.channel, Channel::Mobile);
        assert_eq!(r.dest_country, "Senegal");
        assert_eq!(r.dest_currency, "XOF");
        assert_eq!(r.tracking, "1234567890");
    }

    #[test]
    fn test_zero_amount_rejected_unless_allowed() {
        assert_eq!(
            form(Decimal::ZERO).validate(false),
            Err(ValidationError::NonPositiveAmount)
        );
        assert!(form(Decimal::ZERO).validate(true).is_ok());
    }

    #[test]
    fn test_unpriceable_amount_rejected() {
        assert_eq!(
            form(dec!(77000000000000000000000000000)).validate(false),
            Err(ValidationError::AmountTooLarge)
        );
        assert_eq!(
            form(Decimal::MIN).validate(true),
            Err(ValidationError::AmountTooLarge)
        );
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut f = form(dec!(10));
        f.provider = "PAYPAL".into();
        assert!(matches!(
            f.validate(false),
            Err(ValidationError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_missing_tracking_rejected() {
        let mut f = form(dec!(10));
        f.tracking = "   ".into();
        assert_eq!(
            f.validate(false),
            Err(ValidationError::MissingField("tracking"))
        );
    }

    #[test]
    fn test_deserialize_numeric_amount() {
        let f: RemittanceForm = serde_json::from_str(
            r#"{"provider":"WU","channel":"CASH","amount":50,"tracking":"A1"}"#,
        )
        .unwrap();
        assert_eq!(f.amount, dec!(50));
        assert_eq!(f.dest_country, "");
    }
}
