use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::error::Error;

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub(crate) const RECORD_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub(crate) const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub const DAY: u64 = 86_400;

/// Denominator for decided payout rates (7 decimals, same as collateral SCALE)
pub const PAYOUT_DENOMINATOR: i128 = 10_000_000;

pub const DEFAULT_BASE_CLAIM_FEE: i128 = 10 * 10_000_000;
pub const DEFAULT_FORCE_CLAIM_FEE: i128 = 500 * 10_000_000;
pub const DEFAULT_FEE_MULTIPLIER: i128 = 2;
pub const DEFAULT_DECISION_WINDOW: u64 = 30 * DAY;
pub const DEFAULT_INCIDENT_LOOKBACK: u64 = 14 * DAY;
pub const DEFAULT_CLAIM_PENDING_DELAY: u64 = 10 * DAY;
pub const DEFAULT_NO_CLAIM_DELAY: u64 = 3 * DAY;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClaimState {
    /// Waiting for governance validation
    Filed = 0,
    /// Skipped validation, waiting for the CVC
    ForceFiled = 1,
    /// Waiting for the CVC
    Validated = 2,
    Invalidated = 3,
    Accepted = 4,
    Denied = 5,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    pub filed_by: Address,
    pub description: String,
    /// Risks named by the filer
    pub risks: Vec<String>,
    pub state: ClaimState,
    /// Filer's incident time, replaced by the CVC's on accept
    pub incident_timestamp: u64,
    pub filed_timestamp: u64,
    /// Zero until validated false or decided
    pub decided_timestamp: u64,
    pub fee_paid: i128,
    pub payout_risks: Vec<String>,
    pub payout_rates: Vec<i128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimConfig {
    pub owner: Address,
    pub governance: Address,
    pub treasury: Address,
    /// Token filing fees are paid in
    pub fee_currency: Address,
    pub base_claim_fee: i128,
    pub force_claim_fee: i128,
    pub fee_multiplier: i128,
    /// Decides claims for pools without their own CVC group
    pub default_cvc: Address,
    pub max_claim_decision_window: u64,
    pub max_incident_lookback: u64,
    /// No-claim redeem delay applied to a pool while claims are pending
    pub claim_pending_delay: u64,
    /// No-claim redeem delay restored once nothing is pending
    pub default_no_claim_delay: u64,
    /// When false, accepted rates must add up to the full denominator
    pub allow_partial_claim: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Config,
    Pool(String),          // pool name -> pool address
    Claims(Address, u32),  // (pool, nonce) -> Vec<Claim>
    ClaimFee(Address),     // pool -> next filing fee
    CvcGroup(Address),     // pool -> Vec<Address>
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_config(env: &Env) -> Result<ClaimConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn write_config(env: &Env, config: &ClaimConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

fn read_record<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
    }
    value
}

fn write_record<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

pub fn read_pool(env: &Env, name: &String) -> Option<Address> {
    read_record(env, &DataKey::Pool(name.clone()))
}

pub fn write_pool(env: &Env, name: &String, pool: &Address) {
    write_record(env, &DataKey::Pool(name.clone()), pool);
}

pub fn read_claims(env: &Env, pool: &Address, nonce: u32) -> Vec<Claim> {
    read_record(env, &DataKey::Claims(pool.clone(), nonce)).unwrap_or(Vec::new(env))
}

pub fn write_claims(env: &Env, pool: &Address, nonce: u32, claims: &Vec<Claim>) {
    write_record(env, &DataKey::Claims(pool.clone(), nonce), claims);
}

/// Next filing fee for the pool, the base fee until a claim raises it
pub fn read_claim_fee(env: &Env, config: &ClaimConfig, pool: &Address) -> i128 {
    read_record(env, &DataKey::ClaimFee(pool.clone())).unwrap_or(config.base_claim_fee)
}

pub fn write_claim_fee(env: &Env, pool: &Address, fee: i128) {
    write_record(env, &DataKey::ClaimFee(pool.clone()), &fee);
}

pub fn read_cvc_group(env: &Env, pool: &Address) -> Vec<Address> {
    read_record(env, &DataKey::CvcGroup(pool.clone())).unwrap_or(Vec::new(env))
}

pub fn write_cvc_group(env: &Env, pool: &Address, group: &Vec<Address>) {
    write_record(env, &DataKey::CvcGroup(pool.clone()), group);
}
