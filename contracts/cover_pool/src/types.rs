use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals, 1.0 deposit ratio
pub const DAY: u64 = 24 * 60 * 60;
pub const YEAR: u64 = 365 * DAY;

pub const DEFAULT_CLAIM_REDEEM_DELAY: u64 = 2 * DAY;
pub const DEFAULT_NO_CLAIM_REDEEM_DELAY: u64 = 10 * DAY;
pub const DEFAULT_FEE_NUMERATOR: i128 = 6;
pub const DEFAULT_FEE_DENOMINATOR: i128 = 1_000;

/// Claim tranches registered per call while provisioning a cover
pub const TRANCHE_DEPLOY_BATCH: u32 = 8;
pub const MAX_LABEL_LEN: u32 = 32;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Null = 0,
    Active = 1,
    /// Existing covers keep working, new deposits are rejected
    Disabled = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeRate {
    pub numerator: i128,
    pub denominator: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Roles {
    pub owner: Address,
    pub governance: Address,
    pub claim_manager: Address,
    pub treasury: Address,
}

/// Everything needed to bring a pool to life in one call.
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolParams {
    pub name: String,
    /// Open pools may add risks later, closed pools can only shrink
    pub extendable: bool,
    pub risks: Vec<String>,
    pub collateral: Address,
    pub deposit_ratio: i128,
    pub expiry: u64,
    pub expiry_name: String,
    pub owner: Address,
    pub governance: Address,
    pub claim_manager: Address,
    pub treasury: Address,
    pub cover_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub name: String,
    pub extendable: bool,
    pub active: bool,
    pub claim_nonce: u32,
    pub claim_redeem_delay: u64,
    pub no_claim_redeem_delay: u64,
    pub fee_rate: FeeRate,
    pub cover_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralInfo {
    /// Tranche units minted per collateral unit, scaled by SCALE
    pub deposit_ratio: i128,
    pub status: Status,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpiryInfo {
    pub name: String,
    pub status: Status,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrancheKind {
    NoClaim,
    Claim(String),
    /// Placeholder for risks added after the deposit, by position in the chain
    Future(u32),
}

/// Locked collateral for one (collateral, expiry, nonce) tuple.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverInfo {
    pub id: BytesN<32>,
    pub name: String,
    pub collateral: Address,
    /// `None` for perpetual covers
    pub expiry: Option<u64>,
    pub deposit_ratio: i128,
    pub claim_nonce: u32,
    pub created_at: u64,
    pub collateral_held: i128,
    pub no_claim_token: BytesN<32>,
    /// Risks active at creation followed by risks added while the cover was live
    pub risks: Vec<String>,
    /// Claim tranche ids, `claim_tokens[i]` belongs to `risks[i]`
    pub claim_tokens: Vec<BytesN<32>>,
    /// Future tranche chain, deposits mint the last one
    pub future_tokens: Vec<BytesN<32>>,
    /// `future_tokens[i]` converts into the claim tranche of `future_risks[i]`
    pub future_risks: Vec<String>,
    pub deploy_complete: bool,
}

/// A claim enacted by the claim manager, stored under its nonce.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolClaim {
    pub nonce: u32,
    pub risks: Vec<String>,
    pub payout_rates: Vec<i128>,
    pub payout_denominator: i128,
    pub incident_timestamp: u64,
    pub enacted_timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolDetails {
    pub name: String,
    pub extendable: bool,
    pub active: bool,
    pub claim_nonce: u32,
    pub claim_redeem_delay: u64,
    pub no_claim_redeem_delay: u64,
    pub risks: Vec<String>,
    pub deleted_risks: Vec<String>,
    pub collaterals: Vec<Address>,
    pub expiries: Vec<u64>,
    pub all_covers: Vec<BytesN<32>>,
    pub active_covers: Vec<BytesN<32>>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Pool,
    Roles,
    Risks,
    DeletedRisks,
    Collaterals,
    Collateral(Address),
    Expiries,
    Expiry(u64),
    AllCovers,
    ActiveCovers,
    Cover(BytesN<32>),
    Claim(u32), // claim nonce → PoolClaim
}
