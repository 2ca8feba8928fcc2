use crate::error::Error;
use crate::storage::PAYOUT_DENOMINATOR;
use soroban_sdk::{String, Vec};

/// Fee charged for the filing after one that cost `fee`
///
/// Formula: next = min(fee × multiplier, cap)
///
/// Example:
/// - fee: 10, multiplier: 2, cap: 500
/// - next fees: 20, 40, 80, 160, 320, 500, 500, ...
pub fn next_claim_fee(fee: i128, multiplier: i128, cap: i128) -> Option<i128> {
    Some(fee.checked_mul(multiplier)?.min(cap))
}

/// `incident` lies in `[reference - lookback, reference]`
pub fn incident_in_window(incident: u64, reference: u64, lookback: u64) -> bool {
    incident <= reference && incident.saturating_add(lookback) >= reference
}

/// Accepted payouts: one rate per distinct risk, each in `(0, PAYOUT_DENOMINATOR]`,
/// summing to at most `PAYOUT_DENOMINATOR`.
pub fn validate_payout_rates(risks: &Vec<String>, rates: &Vec<i128>) -> Result<(), Error> {
    if risks.is_empty() || risks.len() != rates.len() {
        return Err(Error::InvalidPayoutRates);
    }

    let mut total: i128 = 0;
    for (i, (risk, rate)) in risks.iter().zip(rates.iter()).enumerate() {
        if rate <= 0 || rate > PAYOUT_DENOMINATOR {
            return Err(Error::InvalidPayoutRates);
        }
        total = total.checked_add(rate).ok_or(Error::MathOverflow)?;

        if risks.iter().skip(i + 1).any(|other| other == risk) {
            return Err(Error::InvalidPayoutRates);
        }
    }
    if total > PAYOUT_DENOMINATOR {
        return Err(Error::InvalidPayoutRates);
    }
    Ok(())
}

/// Rates add up to exactly `PAYOUT_DENOMINATOR`
pub fn is_full_payout(rates: &Vec<i128>) -> bool {
    rates
        .iter()
        .try_fold(0i128, |total, rate| total.checked_add(rate))
        == Some(PAYOUT_DENOMINATOR)
}

/// Denials carry no payout
pub fn validate_deny_rates(rates: &Vec<i128>) -> Result<(), Error> {
    if rates.iter().any(|rate| rate != 0) {
        return Err(Error::PayoutRateOnDeny);
    }
    Ok(())
}
