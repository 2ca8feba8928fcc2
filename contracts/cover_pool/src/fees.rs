use crate::types::{FeeRate, SCALE, YEAR};

/// Tranche units minted for a collateral deposit
///
/// Formula: units = collateral × deposit_ratio / SCALE
pub fn tranche_amount(collateral_amount: i128, deposit_ratio: i128) -> Option<i128> {
    collateral_amount
        .checked_mul(deposit_ratio)?
        .checked_div(SCALE)
}

/// Collateral backing a number of tranche units, rounded down
///
/// Formula: collateral = units × SCALE / deposit_ratio
pub fn collateral_amount(tranche_amount: i128, deposit_ratio: i128) -> Option<i128> {
    tranche_amount.checked_mul(SCALE)?.checked_div(deposit_ratio)
}

/// Time-prorated redemption fee, rounded up so the protocol never
/// under-collects.
///
/// Formula: fee = ⌈gross × numerator × elapsed / (denominator × YEAR)⌉
///
/// Example:
/// - gross: 10 DAI, fee 6/1000 a year, elapsed: half a year
/// - fee: 10 × 0.006 × 0.5 = 0.03 DAI
pub fn redeem_fee(gross: i128, fee_rate: &FeeRate, elapsed: u64) -> Option<i128> {
    if gross <= 0 || fee_rate.numerator == 0 || elapsed == 0 {
        return Some(0);
    }
    let numerator = gross
        .checked_mul(fee_rate.numerator)?
        .checked_mul(elapsed as i128)?;
    let denominator = fee_rate.denominator.checked_mul(YEAR as i128)?;
    let fee = numerator.checked_add(denominator - 1)?.checked_div(denominator)?;
    Some(fee.min(gross))
}

/// Tranche units a holder can claim once a claim is accepted.
///
/// Formula: units = (no_claim × (den − Σ rates) + Σ claim_balance × rate) / den
///
/// `weighted_claims` is the already summed `claim_balance × rate` over the
/// accepted risks held by the cover.
pub fn claimable_units(
    no_claim_balance: i128,
    weighted_claims: i128,
    rate_sum: i128,
    payout_denominator: i128,
) -> Option<i128> {
    let no_claim_share = payout_denominator.checked_sub(rate_sum)?;
    no_claim_balance
        .checked_mul(no_claim_share)?
        .checked_add(weighted_claims)?
        .checked_div(payout_denominator)
}
