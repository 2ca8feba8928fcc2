use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-15)
    // ============================================
    /// Caller does not hold the role required for this call
    Unauthorized = 10,
    /// Governance and owner must stay separate addresses
    GovernanceIsOwner = 11,

    // ============================================
    // STATE ERRORS (20-39)
    // ============================================
    PoolNotActive = 20,
    CollateralNotActive = 21,
    ExpiryNotActive = 22,
    RiskNotActive = 23,
    RiskAlreadyActive = 24,
    /// Deleted risks can never come back
    DeletedRiskNotAllowed = 25,
    /// A pool must always cover at least one risk
    LastRisk = 26,
    /// Closed pools cannot add risks
    PoolNotExtendable = 27,
    /// Caller nonce does not match the live claim nonce
    NonceMismatch = 28,
    CoverNotFound = 29,
    /// Tranches for the cover are not all registered yet
    CoverDeployIncomplete = 30,
    /// No accepted claim applies to the cover
    ClaimNotAccepted = 31,
    /// An accepted claim applies, use redeem_claim
    ClaimAccepted = 32,

    // ============================================
    // TIME ERRORS (40-49)
    // ============================================
    /// Cover expiry has passed or is not in the future
    CoverExpired = 40,
    /// Claim redeem delay since enactment has not passed
    RedeemDelayNotPassed = 41,
    /// Incident happened after the cover expired
    IncidentAfterExpiry = 42,
    /// Incident timestamp lies in the future
    InvalidIncidentTimestamp = 43,

    // ============================================
    // AMOUNT ERRORS (50-59)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 50,
    /// Tranche balance too low for the redemption
    InsufficientBalance = 51,
    /// Redemption would exceed collateral held by the cover
    InsufficientCollateral = 52,
    MathOverflow = 53,

    // ============================================
    // PARAMETER ERRORS (60-69)
    // ============================================
    /// Fee must satisfy numerator * 10 < denominator
    InvalidFeeRate = 60,
    InvalidDepositRatio = 61,
    /// Payout rates must be positive and sum to at most the denominator
    InvalidPayoutRates = 62,
    /// Risk or label empty, too long or duplicated
    InvalidRisk = 63,
    InvalidName = 64,
}
