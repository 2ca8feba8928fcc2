use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    AlreadyInitialized = 1,
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-15)
    // ============================================
    /// Caller does not hold the required role or is not on the pool's CVC
    Unauthorized = 10,
    /// Governance and owner must stay separate addresses
    GovernanceIsOwner = 11,

    // ============================================
    // CLAIM ERRORS (20-29)
    // ============================================
    /// No pool registered under this name
    PoolNotRegistered = 20,
    /// Registered pool for the name differs from the one given
    PoolNameMismatch = 21,
    /// Index out of bounds for the (pool, nonce) claim list
    ClaimNotFound = 22,
    /// Claim is not in a state that allows this operation
    InvalidClaimState = 23,
    /// Nonce differs from the pool's live claim nonce
    NonceMismatch = 24,
    /// Force filing needs an explicit CVC group for the pool
    NoCvcGroup = 25,
    /// Claim names no risks
    InvalidRisks = 26,

    // ============================================
    // TIME ERRORS (40-49)
    // ============================================
    /// Incident in the future or outside the lookback window
    InvalidIncidentTimestamp = 40,

    // ============================================
    // AMOUNT ERRORS (50-59)
    // ============================================
    MathOverflow = 50,

    // ============================================
    // PARAMETER ERRORS (60-69)
    // ============================================
    /// Rates zero, above the denominator, summing past it or mismatched
    InvalidPayoutRates = 60,
    /// A deny (requested or forced) carried a non-zero payout rate
    PayoutRateOnDeny = 61,
    InvalidFee = 62,
    InvalidFeeMultiplier = 63,
    /// Partial payouts are switched off and the rates do not sum to the denominator
    PartialClaimNotAllowed = 64,
}
