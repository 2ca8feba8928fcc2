#![no_std]

mod access;
mod admin;
mod claim;
mod cover;
mod error;
mod events;
mod fees;
mod naming;
mod storage;
mod tranche;
mod types;
mod validation;

pub use error::Error;
pub use types::{
    CollateralInfo, CoverInfo, ExpiryInfo, FeeRate, PoolClaim, PoolDetails, PoolParams, Roles,
    Status, TrancheKind, DAY, SCALE, YEAR,
};

use admin::Admin;
use claim::ClaimOps;
use cover::{check_deposit_terms, CoverOps};
use storage::Storage;

use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Vec};

/// One cover pool: a named set of risks, the collaterals and expiries it
/// accepts, and the covers holding deposited collateral for each claim epoch.
#[contract]
pub struct CoverPool;

#[contractimpl]
impl CoverPool {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Initialize the pool
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidName` / `InvalidRisk` / `InvalidDepositRatio`: Bad parameters
    /// - `CoverExpired`: First expiry is not in the future
    pub fn initialize(env: Env, params: PoolParams) -> Result<(), Error> {
        Admin::initialize(&env, params)
    }

    // ============================================
    // DEPOSITS
    // ============================================

    /// Deposit collateral into the current cover for `(collateral, expiry)`
    /// and receive claim and no-claim tranches. Returns the cover id.
    ///
    /// # Errors
    /// - `PoolNotActive`, `CollateralNotActive`, `ExpiryNotActive`
    /// - `CoverExpired`: Expiry has passed
    /// - `CoverDeployIncomplete`: Call `deploy_cover` until it returns true
    /// - `InvalidAmount`: Amount mints no tranche units
    pub fn add_cover(
        env: Env,
        depositor: Address,
        collateral: Address,
        expiry: u64,
        amount: i128,
    ) -> Result<BytesN<32>, Error> {
        Self::deposit(&env, depositor, collateral, Some(expiry), amount)
    }

    /// Deposit into the perpetual cover for `collateral`
    pub fn add_perp_cover(
        env: Env,
        depositor: Address,
        collateral: Address,
        amount: i128,
    ) -> Result<BytesN<32>, Error> {
        Self::deposit(&env, depositor, collateral, None, amount)
    }

    /// Create the current cover for `(collateral, expiry)` or register its
    /// next batch of claim tranches. Returns true once every tranche exists.
    pub fn deploy_cover(env: Env, collateral: Address, expiry: Option<u64>) -> Result<bool, Error> {
        let pool = Storage::get_pool(&env)?;
        check_deposit_terms(&env, &pool, &collateral, expiry)?;

        let (mut cover, created) = CoverOps::open(&env, &pool, &collateral, expiry)?;
        if !created && !cover.deploy_complete {
            CoverOps::provision(&env, &pool, &mut cover)?;
        }
        Ok(cover.deploy_complete)
    }

    /// Swap older future tranches for the claim tranches of risks added since
    /// the deposit, plus the current future tranche. Returns the units moved.
    ///
    /// # Errors
    /// - `CoverNotFound`: Unknown cover
    /// - `CoverDeployIncomplete`: Claim tranches still being registered
    /// - `InsufficientBalance`: No older future tranches held
    pub fn convert(env: Env, holder: Address, cover_id: BytesN<32>) -> Result<i128, Error> {
        holder.require_auth();
        let pool = Storage::get_pool(&env)?;
        let cover = Storage::get_cover(&env, &cover_id).ok_or(Error::CoverNotFound)?;
        CoverOps::convert(&env, &pool, &cover, &holder)
    }

    // ============================================
    // REDEMPTIONS
    // ============================================

    /// Burn `amount` of each required tranche and receive collateral minus
    /// the prorated fee. Returns the payout.
    ///
    /// # Errors
    /// - `CoverNotFound`: Unknown cover
    /// - `ClaimAccepted`: An accepted claim applies, use `redeem_claim`
    /// - `InsufficientBalance`: Missing no-claim, current future or active
    ///   claim tranches
    pub fn redeem_collateral(
        env: Env,
        holder: Address,
        cover_id: BytesN<32>,
        amount: i128,
    ) -> Result<i128, Error> {
        holder.require_auth();
        let pool = Storage::get_pool(&env)?;
        let treasury = Storage::get_roles(&env)?.treasury;
        let mut cover = Storage::get_cover(&env, &cover_id).ok_or(Error::CoverNotFound)?;
        CoverOps::redeem_collateral(&env, &pool, &treasury, &mut cover, &holder, amount)
    }

    /// Redeem the holder's whole position against the accepted claim.
    /// Returns the payout.
    ///
    /// # Errors
    /// - `ClaimNotAccepted`: No claim enacted at the cover's nonce
    /// - `IncidentAfterExpiry`: Claim incident is outside the cover window
    /// - `RedeemDelayNotPassed`: Claim redeem delay still running
    /// - `InsufficientBalance`: Nothing to claim
    pub fn redeem_claim(env: Env, holder: Address, cover_id: BytesN<32>) -> Result<i128, Error> {
        holder.require_auth();
        let pool = Storage::get_pool(&env)?;
        let treasury = Storage::get_roles(&env)?.treasury;
        let mut cover = Storage::get_cover(&env, &cover_id).ok_or(Error::CoverNotFound)?;
        CoverOps::redeem_claim(&env, &pool, &treasury, &mut cover, &holder)
    }

    /// Collateral `holder` could claim before fees
    pub fn view_claimable(env: Env, cover_id: BytesN<32>, holder: Address) -> Result<i128, Error> {
        let pool = Storage::get_pool(&env)?;
        let cover = Storage::get_cover(&env, &cover_id).ok_or(Error::CoverNotFound)?;
        CoverOps::view_claimable(&env, &pool, &cover, &holder)
    }

    // ============================================
    // CLAIMS
    // ============================================

    /// Enact an accepted claim (claim manager only)
    ///
    /// # Errors
    /// - `Unauthorized`: Caller is not the claim manager
    /// - `NonceMismatch`: `nonce` is stale
    /// - `RiskNotActive`: A listed risk is not active
    /// - `InvalidPayoutRates`: Rates zero, above or summing past the denominator
    /// - `InvalidIncidentTimestamp`: Incident in the future
    pub fn enact_claim(
        env: Env,
        caller: Address,
        risks: Vec<String>,
        payout_rates: Vec<i128>,
        payout_denominator: i128,
        incident_timestamp: u64,
        nonce: u32,
    ) -> Result<(), Error> {
        ClaimOps::enact(
            &env,
            &caller,
            risks,
            payout_rates,
            payout_denominator,
            incident_timestamp,
            nonce,
        )
    }

    // ============================================
    // ADMIN
    // ============================================

    pub fn add_risk(env: Env, caller: Address, risk: String) -> Result<(), Error> {
        Admin::add_risk(&env, &caller, risk)
    }

    pub fn delete_risk(env: Env, caller: Address, risk: String) -> Result<(), Error> {
        Admin::delete_risk(&env, &caller, risk)
    }

    pub fn set_collateral(
        env: Env,
        caller: Address,
        collateral: Address,
        deposit_ratio: i128,
        status: Status,
    ) -> Result<(), Error> {
        Admin::set_collateral(&env, &caller, collateral, deposit_ratio, status)
    }

    pub fn set_expiry(
        env: Env,
        caller: Address,
        expiry: u64,
        name: String,
        status: Status,
    ) -> Result<(), Error> {
        Admin::set_expiry(&env, &caller, expiry, name, status)
    }

    pub fn set_active(env: Env, caller: Address, active: bool) -> Result<(), Error> {
        Admin::set_active(&env, &caller, active)
    }

    pub fn set_claim_manager(env: Env, caller: Address, claim_manager: Address) -> Result<(), Error> {
        Admin::set_claim_manager(&env, &caller, claim_manager)
    }

    /// Yearly fee as `numerator / denominator`, below 10%
    pub fn set_fees(env: Env, caller: Address, numerator: i128, denominator: i128) -> Result<(), Error> {
        Admin::set_fees(&env, &caller, numerator, denominator)
    }

    pub fn set_claim_redeem_delay(env: Env, caller: Address, delay: u64) -> Result<(), Error> {
        Admin::set_claim_redeem_delay(&env, &caller, delay)
    }

    pub fn set_no_claim_redeem_delay(env: Env, caller: Address, delay: u64) -> Result<(), Error> {
        Admin::set_no_claim_redeem_delay(&env, &caller, delay)
    }

    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), Error> {
        Admin::set_treasury(&env, &caller, treasury)
    }

    pub fn set_governance(env: Env, caller: Address, governance: Address) -> Result<(), Error> {
        Admin::set_governance(&env, &caller, governance)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_pool_details(env: Env) -> Result<PoolDetails, Error> {
        let pool = Storage::get_pool(&env)?;
        Ok(PoolDetails {
            name: pool.name,
            extendable: pool.extendable,
            active: pool.active,
            claim_nonce: pool.claim_nonce,
            claim_redeem_delay: pool.claim_redeem_delay,
            no_claim_redeem_delay: pool.no_claim_redeem_delay,
            risks: Storage::get_risks(&env),
            deleted_risks: Storage::get_deleted_risks(&env),
            collaterals: Storage::get_collaterals(&env),
            expiries: Storage::get_expiries(&env),
            all_covers: Storage::get_all_covers(&env),
            active_covers: Storage::get_active_covers(&env),
        })
    }

    pub fn get_roles(env: Env) -> Result<Roles, Error> {
        Storage::get_roles(&env)
    }

    pub fn get_name(env: Env) -> Result<String, Error> {
        Ok(Storage::get_pool(&env)?.name)
    }

    pub fn get_claim_nonce(env: Env) -> Result<u32, Error> {
        Ok(Storage::get_pool(&env)?.claim_nonce)
    }

    pub fn get_fee_rate(env: Env) -> Result<FeeRate, Error> {
        Ok(Storage::get_pool(&env)?.fee_rate)
    }

    pub fn get_no_claim_redeem_delay(env: Env) -> Result<u64, Error> {
        Ok(Storage::get_pool(&env)?.no_claim_redeem_delay)
    }

    pub fn get_collateral_info(env: Env, collateral: Address) -> Result<CollateralInfo, Error> {
        Storage::get_collateral(&env, &collateral).ok_or(Error::CollateralNotActive)
    }

    pub fn get_expiry_info(env: Env, expiry: u64) -> Result<ExpiryInfo, Error> {
        Storage::get_expiry(&env, expiry).ok_or(Error::ExpiryNotActive)
    }

    pub fn get_cover(env: Env, cover_id: BytesN<32>) -> Result<CoverInfo, Error> {
        Storage::get_cover(&env, &cover_id).ok_or(Error::CoverNotFound)
    }

    /// Id of the cover new deposits for `(collateral, expiry)` go to
    pub fn get_current_cover_id(
        env: Env,
        collateral: Address,
        expiry: Option<u64>,
    ) -> Result<BytesN<32>, Error> {
        let pool = Storage::get_pool(&env)?;
        Ok(cover::cover_id(&env, &pool.name, &collateral, expiry, pool.claim_nonce))
    }

    /// Deterministic cover id for any nonce, whether or not it exists yet
    pub fn compute_cover_id(
        env: Env,
        collateral: Address,
        expiry: Option<u64>,
        nonce: u32,
    ) -> Result<BytesN<32>, Error> {
        let pool = Storage::get_pool(&env)?;
        Ok(cover::cover_id(&env, &pool.name, &collateral, expiry, nonce))
    }

    pub fn compute_tranche_id(env: Env, cover_id: BytesN<32>, kind: TrancheKind) -> BytesN<32> {
        cover::tranche_id(&env, &cover_id, &kind)
    }

    pub fn get_claim(env: Env, nonce: u32) -> Result<PoolClaim, Error> {
        Storage::get_claim(&env, nonce).ok_or(Error::ClaimNotAccepted)
    }
}

impl CoverPool {
    fn deposit(
        env: &Env,
        depositor: Address,
        collateral: Address,
        expiry: Option<u64>,
        amount: i128,
    ) -> Result<BytesN<32>, Error> {
        depositor.require_auth();

        let pool = Storage::get_pool(env)?;
        check_deposit_terms(env, &pool, &collateral, expiry)?;

        let (mut cover, _) = CoverOps::open(env, &pool, &collateral, expiry)?;
        CoverOps::deposit(env, &pool, &mut cover, &depositor, amount)?;
        Ok(cover.id)
    }
}

#[cfg(test)]
mod test;
