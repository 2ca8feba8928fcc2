use crate::error::Error;
use crate::types::{FeeRate, MAX_LABEL_LEN};
use soroban_sdk::{String, Vec};

pub struct Validator;

impl Validator {
    pub fn validate_label(label: &String) -> Result<(), Error> {
        if label.len() == 0 || label.len() > MAX_LABEL_LEN {
            return Err(Error::InvalidName);
        }
        Ok(())
    }

    pub fn validate_risk(risk: &String) -> Result<(), Error> {
        if risk.len() == 0 || risk.len() > MAX_LABEL_LEN {
            return Err(Error::InvalidRisk);
        }
        Ok(())
    }

    /// Initial risk set: non-empty, every entry valid and unique
    pub fn validate_risk_set(risks: &Vec<String>) -> Result<(), Error> {
        if risks.is_empty() {
            return Err(Error::InvalidRisk);
        }
        for (i, risk) in risks.iter().enumerate() {
            Self::validate_risk(&risk)?;
            if risks.iter().skip(i + 1).any(|other| other == risk) {
                return Err(Error::InvalidRisk);
            }
        }
        Ok(())
    }

    pub fn validate_deposit_ratio(deposit_ratio: i128) -> Result<(), Error> {
        if deposit_ratio <= 0 {
            return Err(Error::InvalidDepositRatio);
        }
        Ok(())
    }

    /// Yearly fee must stay below 10%
    pub fn validate_fee_rate(fee_rate: &FeeRate) -> Result<(), Error> {
        if fee_rate.denominator <= 0 || fee_rate.numerator < 0 {
            return Err(Error::InvalidFeeRate);
        }
        let scaled = fee_rate
            .numerator
            .checked_mul(10)
            .ok_or(Error::InvalidFeeRate)?;
        if scaled >= fee_rate.denominator {
            return Err(Error::InvalidFeeRate);
        }
        Ok(())
    }

    /// One positive rate per risk, none above the denominator, sum within it.
    pub fn validate_payout_rates(
        risks: &Vec<String>,
        payout_rates: &Vec<i128>,
        payout_denominator: i128,
    ) -> Result<(), Error> {
        if risks.is_empty() || risks.len() != payout_rates.len() || payout_denominator <= 0 {
            return Err(Error::InvalidPayoutRates);
        }
        let mut total: i128 = 0;
        for rate in payout_rates.iter() {
            if rate <= 0 || rate > payout_denominator {
                return Err(Error::InvalidPayoutRates);
            }
            total = total.checked_add(rate).ok_or(Error::InvalidPayoutRates)?;
        }
        if total > payout_denominator {
            return Err(Error::InvalidPayoutRates);
        }
        for (i, risk) in risks.iter().enumerate() {
            if risks.iter().skip(i + 1).any(|other| other == risk) {
                return Err(Error::InvalidPayoutRates);
            }
        }
        Ok(())
    }
}
