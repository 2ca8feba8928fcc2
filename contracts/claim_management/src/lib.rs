#![no_std]

mod error;
mod events;
mod pool;
mod storage;
mod validation;

pub use error::Error;
pub use storage::{Claim, ClaimConfig, ClaimState, PAYOUT_DENOMINATOR};

use events::*;
use pool::CoverPoolCaller;
use storage::{
    read_claim_fee, read_claims, read_config, read_cvc_group, read_pool, write_claim_fee,
    write_claims, write_config, write_cvc_group, write_pool, DataKey, DEFAULT_BASE_CLAIM_FEE,
    DEFAULT_CLAIM_PENDING_DELAY, DEFAULT_DECISION_WINDOW, DEFAULT_FEE_MULTIPLIER,
    DEFAULT_FORCE_CLAIM_FEE, DEFAULT_INCIDENT_LOOKBACK, DEFAULT_NO_CLAIM_DELAY,
};
use validation::{
    incident_in_window, is_full_payout, next_claim_fee, validate_deny_rates,
    validate_payout_rates,
};

use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Symbol, Vec};

/// Files, validates and decides claims against registered cover pools, and
/// enacts accepted ones on the pool as its claim manager.
#[contract]
pub struct ClaimManagement;

#[contractimpl]
impl ClaimManagement {
    // ============================================
    // INITIALIZATION
    // ============================================

    pub fn initialize(
        env: Env,
        owner: Address,
        governance: Address,
        treasury: Address,
        fee_currency: Address,
        default_cvc: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();
        if governance == owner {
            return Err(Error::GovernanceIsOwner);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        write_config(
            &env,
            &ClaimConfig {
                owner,
                governance,
                treasury,
                fee_currency,
                base_claim_fee: DEFAULT_BASE_CLAIM_FEE,
                force_claim_fee: DEFAULT_FORCE_CLAIM_FEE,
                fee_multiplier: DEFAULT_FEE_MULTIPLIER,
                default_cvc,
                max_claim_decision_window: DEFAULT_DECISION_WINDOW,
                max_incident_lookback: DEFAULT_INCIDENT_LOOKBACK,
                claim_pending_delay: DEFAULT_CLAIM_PENDING_DELAY,
                default_no_claim_delay: DEFAULT_NO_CLAIM_DELAY,
                allow_partial_claim: true,
            },
        );

        Ok(())
    }

    // ============================================
    // FILING
    // ============================================

    /// File a claim against `pool` for its live nonce. Returns the claim index.
    ///
    /// The filer pays the pool's current claim fee, which then escalates by
    /// `fee_multiplier` up to `force_claim_fee`. The pool's no-claim redeem
    /// delay is stretched to `claim_pending_delay` until the claim is settled.
    ///
    /// # Errors
    /// - `PoolNotRegistered` / `PoolNameMismatch`: Name does not resolve to `pool`
    /// - `InvalidIncidentTimestamp`: Incident in the future or past the lookback
    /// - `InvalidRisks`: No risk named
    pub fn file_claim(
        env: Env,
        filer: Address,
        pool_name: String,
        pool: Address,
        risks: Vec<String>,
        incident_timestamp: u64,
        description: String,
    ) -> Result<u32, Error> {
        Self::file(
            &env,
            filer,
            pool_name,
            pool,
            risks,
            incident_timestamp,
            description,
            false,
        )
    }

    /// File a claim that skips governance validation, at the flat
    /// `force_claim_fee`. Only for pools with their own CVC group.
    ///
    /// # Errors
    /// - `NoCvcGroup`: Pool has no explicit CVC group
    /// - Same as `file_claim`
    pub fn force_file_claim(
        env: Env,
        filer: Address,
        pool_name: String,
        pool: Address,
        risks: Vec<String>,
        incident_timestamp: u64,
        description: String,
    ) -> Result<u32, Error> {
        if read_cvc_group(&env, &pool).is_empty() {
            return Err(Error::NoCvcGroup);
        }
        Self::file(
            &env,
            filer,
            pool_name,
            pool,
            risks,
            incident_timestamp,
            description,
            true,
        )
    }

    // ============================================
    // VALIDATION & DECISION
    // ============================================

    /// Governance gate for filed claims. `false` forfeits the fee to the
    /// treasury; `true` resets the pool's claim fee to the base fee.
    pub fn validate_claim(
        env: Env,
        caller: Address,
        pool: Address,
        nonce: u32,
        index: u32,
        valid: bool,
    ) -> Result<(), Error> {
        let config = read_config(&env)?;
        if caller != config.governance {
            return Err(Error::Unauthorized);
        }
        caller.require_auth();

        let pool_caller = CoverPoolCaller::new(&env, &pool);
        if nonce != pool_caller.claim_nonce() {
            return Err(Error::NonceMismatch);
        }

        let mut claims = read_claims(&env, &pool, nonce);
        let mut claim = claims.get(index).ok_or(Error::ClaimNotFound)?;
        if claim.state != ClaimState::Filed {
            return Err(Error::InvalidClaimState);
        }

        if valid {
            claim.state = ClaimState::Validated;
            Self::set_claim_fee(&env, &pool, config.base_claim_fee);
        } else {
            claim.state = ClaimState::Invalidated;
            claim.decided_timestamp = env.ledger().timestamp();
            Self::pay_fee(&env, &config, &config.treasury, claim.fee_paid);
        }
        claims.set(index, claim);
        write_claims(&env, &pool, nonce, &claims);

        if !valid {
            Self::release_pool_delay(&env, &config, &pool_caller, &pool);
        }

        env.events().publish(
            (Symbol::new(&env, "claim_validated"), pool.clone()),
            ClaimValidatedEvent {
                pool,
                nonce,
                index,
                valid,
            },
        );

        Ok(())
    }

    /// CVC decision on a validated or force-filed claim.
    ///
    /// Past `filed_timestamp + max_claim_decision_window` the decision is a
    /// deny whatever `accept` says. An accept enacts `risks`/`payout_rates`
    /// (over `PAYOUT_DENOMINATOR`) on the pool, refunds the filer and denies
    /// every other open claim on the nonce; a deny sends the fee to the
    /// treasury and must carry only zero rates.
    ///
    /// # Errors
    /// - `Unauthorized`: `member` is not on the pool's CVC
    /// - `NonceMismatch` / `ClaimNotFound` / `InvalidClaimState`
    /// - `InvalidPayoutRates` / `InvalidIncidentTimestamp`: Bad accept terms
    /// - `PartialClaimNotAllowed`: Rates short of the denominator while
    ///   partial payouts are off
    /// - `PayoutRateOnDeny`: Non-zero rate on a deny
    pub fn decide_claim(
        env: Env,
        member: Address,
        pool: Address,
        nonce: u32,
        index: u32,
        incident_timestamp: u64,
        accept: bool,
        risks: Vec<String>,
        payout_rates: Vec<i128>,
    ) -> Result<(), Error> {
        let config = read_config(&env)?;
        if !Self::is_member(&env, &config, &pool, &member) {
            return Err(Error::Unauthorized);
        }
        member.require_auth();

        let pool_caller = CoverPoolCaller::new(&env, &pool);
        if nonce != pool_caller.claim_nonce() {
            return Err(Error::NonceMismatch);
        }

        let mut claims = read_claims(&env, &pool, nonce);
        let mut claim = claims.get(index).ok_or(Error::ClaimNotFound)?;
        if claim.state != ClaimState::Validated && claim.state != ClaimState::ForceFiled {
            return Err(Error::InvalidClaimState);
        }

        let now = env.ledger().timestamp();
        let window_open =
            now <= claim.filed_timestamp.saturating_add(config.max_claim_decision_window);
        let accepted = accept && window_open;

        if accepted {
            validate_payout_rates(&risks, &payout_rates)?;
            if !config.allow_partial_claim && !is_full_payout(&payout_rates) {
                return Err(Error::PartialClaimNotAllowed);
            }
            if !incident_in_window(
                incident_timestamp,
                claim.filed_timestamp,
                config.max_incident_lookback,
            ) {
                return Err(Error::InvalidIncidentTimestamp);
            }

            pool_caller.enact_claim(
                &risks,
                &payout_rates,
                PAYOUT_DENOMINATOR,
                incident_timestamp,
                nonce,
            );

            claim.state = ClaimState::Accepted;
            claim.incident_timestamp = incident_timestamp;
            claim.payout_risks = risks;
            claim.payout_rates = payout_rates;
            Self::pay_fee(&env, &config, &claim.filed_by, claim.fee_paid);
            Self::set_claim_fee(&env, &pool, config.base_claim_fee);
        } else {
            validate_deny_rates(&payout_rates)?;
            claim.state = ClaimState::Denied;
            Self::pay_fee(&env, &config, &config.treasury, claim.fee_paid);
        }
        claim.decided_timestamp = now;
        claims.set(index, claim);
        if accepted {
            Self::deny_superseded(&env, &config, &pool, nonce, index, &mut claims);
        }
        write_claims(&env, &pool, nonce, &claims);

        Self::release_pool_delay(&env, &config, &pool_caller, &pool);

        env.events().publish(
            (Symbol::new(&env, "claim_decided"), pool.clone()),
            ClaimDecidedEvent {
                pool,
                nonce,
                index,
                accepted,
                forced_deny: accept && !window_open,
            },
        );

        Ok(())
    }

    // ============================================
    // OWNER ADMINISTRATION
    // ============================================

    /// Bind a pool name to its address for filing checks
    pub fn register_cover_pool(
        env: Env,
        caller: Address,
        name: String,
        pool: Address,
    ) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        write_pool(&env, &name, &pool);

        env.events().publish(
            (Symbol::new(&env, "pool_registered"),),
            PoolRegisteredEvent { name, pool },
        );
        Ok(())
    }

    pub fn add_cvc_for_pools(
        env: Env,
        caller: Address,
        pools: Vec<Address>,
        cvc: Address,
    ) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        for pool in pools.iter() {
            let mut group = read_cvc_group(&env, &pool);
            if group.iter().any(|member| member == cvc) {
                continue;
            }
            group.push_back(cvc.clone());
            write_cvc_group(&env, &pool, &group);
            Self::publish_cvc(&env, pool, &cvc, true);
        }
        Ok(())
    }

    pub fn remove_cvc_for_pools(
        env: Env,
        caller: Address,
        pools: Vec<Address>,
        cvc: Address,
    ) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        for pool in pools.iter() {
            let mut group = read_cvc_group(&env, &pool);
            if let Some(position) = group.iter().position(|member| member == cvc) {
                group.remove(position as u32);
                write_cvc_group(&env, &pool, &group);
                Self::publish_cvc(&env, pool, &cvc, false);
            }
        }
        Ok(())
    }

    pub fn set_default_cvc(env: Env, caller: Address, cvc: Address) -> Result<(), Error> {
        let mut config = Self::require_owner(&env, &caller)?;
        config.default_cvc = cvc;
        write_config(&env, &config);
        Ok(())
    }

    pub fn set_decision_window(env: Env, caller: Address, window: u64) -> Result<(), Error> {
        let mut config = Self::require_owner(&env, &caller)?;
        config.max_claim_decision_window = window;
        write_config(&env, &config);
        Ok(())
    }

    pub fn set_incident_lookback(env: Env, caller: Address, lookback: u64) -> Result<(), Error> {
        let mut config = Self::require_owner(&env, &caller)?;
        config.max_incident_lookback = lookback;
        write_config(&env, &config);
        Ok(())
    }

    /// Switch partial payouts on or off for future decisions
    pub fn set_partial_claim_status(env: Env, caller: Address, allow: bool) -> Result<(), Error> {
        let mut config = Self::require_owner(&env, &caller)?;
        config.allow_partial_claim = allow;
        write_config(&env, &config);
        Ok(())
    }

    // ============================================
    // GOVERNANCE ADMINISTRATION
    // ============================================

    /// Requires `0 < base_claim_fee <= force_claim_fee`
    pub fn set_fee_and_currency(
        env: Env,
        caller: Address,
        base_claim_fee: i128,
        force_claim_fee: i128,
        fee_currency: Address,
    ) -> Result<(), Error> {
        let mut config = Self::require_governance(&env, &caller)?;
        if base_claim_fee <= 0 || force_claim_fee < base_claim_fee {
            return Err(Error::InvalidFee);
        }
        config.base_claim_fee = base_claim_fee;
        config.force_claim_fee = force_claim_fee;
        config.fee_currency = fee_currency;
        write_config(&env, &config);
        Ok(())
    }

    pub fn set_fee_multiplier(env: Env, caller: Address, multiplier: i128) -> Result<(), Error> {
        let mut config = Self::require_governance(&env, &caller)?;
        if multiplier < 1 {
            return Err(Error::InvalidFeeMultiplier);
        }
        config.fee_multiplier = multiplier;
        write_config(&env, &config);
        Ok(())
    }

    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), Error> {
        let mut config = Self::require_governance(&env, &caller)?;
        config.treasury = treasury;
        write_config(&env, &config);
        Ok(())
    }

    pub fn set_governance(env: Env, caller: Address, governance: Address) -> Result<(), Error> {
        let mut config = Self::require_governance(&env, &caller)?;
        if governance == config.owner {
            return Err(Error::GovernanceIsOwner);
        }
        config.governance = governance;
        write_config(&env, &config);
        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// True iff a claim for `(pool, nonce)` is filed or force-filed
    pub fn has_pending_claim(env: Env, pool: Address, nonce: u32) -> bool {
        read_claims(&env, &pool, nonce)
            .iter()
            .any(|claim| claim.state == ClaimState::Filed || claim.state == ClaimState::ForceFiled)
    }

    pub fn get_claim(env: Env, pool: Address, nonce: u32, index: u32) -> Result<Claim, Error> {
        read_claims(&env, &pool, nonce)
            .get(index)
            .ok_or(Error::ClaimNotFound)
    }

    pub fn get_claims(env: Env, pool: Address, nonce: u32) -> Vec<Claim> {
        read_claims(&env, &pool, nonce)
    }

    pub fn get_claims_by_state(
        env: Env,
        pool: Address,
        nonce: u32,
        state: ClaimState,
    ) -> Vec<Claim> {
        let mut matching = Vec::new(&env);
        for claim in read_claims(&env, &pool, nonce).iter() {
            if claim.state == state {
                matching.push_back(claim);
            }
        }
        matching
    }

    pub fn get_pool_claim_fee(env: Env, pool: Address) -> Result<i128, Error> {
        let config = read_config(&env)?;
        Ok(read_claim_fee(&env, &config, &pool))
    }

    pub fn is_cvc_member(env: Env, pool: Address, member: Address) -> Result<bool, Error> {
        let config = read_config(&env)?;
        Ok(Self::is_member(&env, &config, &pool, &member))
    }

    pub fn get_cvc_group(env: Env, pool: Address) -> Vec<Address> {
        read_cvc_group(&env, &pool)
    }

    pub fn get_cover_pool(env: Env, name: String) -> Result<Address, Error> {
        read_pool(&env, &name).ok_or(Error::PoolNotRegistered)
    }

    pub fn get_config(env: Env) -> Result<ClaimConfig, Error> {
        read_config(&env)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    #[allow(clippy::too_many_arguments)]
    fn file(
        env: &Env,
        filer: Address,
        pool_name: String,
        pool: Address,
        risks: Vec<String>,
        incident_timestamp: u64,
        description: String,
        forced: bool,
    ) -> Result<u32, Error> {
        filer.require_auth();
        let config = read_config(env)?;

        let registered = read_pool(env, &pool_name).ok_or(Error::PoolNotRegistered)?;
        if registered != pool {
            return Err(Error::PoolNameMismatch);
        }
        if risks.is_empty() {
            return Err(Error::InvalidRisks);
        }
        let now = env.ledger().timestamp();
        if !incident_in_window(incident_timestamp, now, config.max_incident_lookback) {
            return Err(Error::InvalidIncidentTimestamp);
        }

        let pool_caller = CoverPoolCaller::new(env, &pool);
        let nonce = pool_caller.claim_nonce();

        let fee = if forced {
            config.force_claim_fee
        } else {
            let fee = read_claim_fee(env, &config, &pool);
            let next = next_claim_fee(fee, config.fee_multiplier, config.force_claim_fee)
                .ok_or(Error::MathOverflow)?;
            Self::set_claim_fee(env, &pool, next);
            fee
        };
        token::Client::new(env, &config.fee_currency).transfer(
            &filer,
            &env.current_contract_address(),
            &fee,
        );

        let mut claims = read_claims(env, &pool, nonce);
        let index = claims.len();
        claims.push_back(Claim {
            filed_by: filer.clone(),
            description,
            risks,
            state: if forced {
                ClaimState::ForceFiled
            } else {
                ClaimState::Filed
            },
            incident_timestamp,
            filed_timestamp: now,
            decided_timestamp: 0,
            fee_paid: fee,
            payout_risks: Vec::new(env),
            payout_rates: Vec::new(env),
        });
        write_claims(env, &pool, nonce, &claims);

        pool_caller.set_no_claim_redeem_delay(config.claim_pending_delay);

        env.events().publish(
            (Symbol::new(env, "claim_filed"), pool.clone()),
            ClaimFiledEvent {
                pool,
                nonce,
                index,
                filed_by: filer,
                fee,
                forced,
            },
        );

        Ok(index)
    }

    /// Restore the pool's normal no-claim delay once its live nonce has
    /// nothing pending.
    fn release_pool_delay(
        env: &Env,
        config: &ClaimConfig,
        pool_caller: &CoverPoolCaller,
        pool: &Address,
    ) {
        let nonce = pool_caller.claim_nonce();
        if !Self::has_pending_claim(env.clone(), pool.clone(), nonce) {
            pool_caller.set_no_claim_redeem_delay(config.default_no_claim_delay);
        }
    }

    /// Pools with a CVC group answer to it alone; others to the default CVC
    fn is_member(env: &Env, config: &ClaimConfig, pool: &Address, member: &Address) -> bool {
        let group = read_cvc_group(env, pool);
        if group.is_empty() {
            return *member == config.default_cvc;
        }
        group.iter().any(|m| m == *member)
    }

    /// Once a claim on `nonce` is accepted the pool moves on, so every other
    /// open claim on that nonce is denied and its fee goes to the treasury.
    fn deny_superseded(
        env: &Env,
        config: &ClaimConfig,
        pool: &Address,
        nonce: u32,
        accepted_index: u32,
        claims: &mut Vec<Claim>,
    ) {
        let now = env.ledger().timestamp();
        for index in 0..claims.len() {
            if index == accepted_index {
                continue;
            }
            let Some(mut claim) = claims.get(index) else {
                continue;
            };
            if !matches!(
                claim.state,
                ClaimState::Filed | ClaimState::ForceFiled | ClaimState::Validated
            ) {
                continue;
            }

            claim.state = ClaimState::Denied;
            claim.decided_timestamp = now;
            Self::pay_fee(env, config, &config.treasury, claim.fee_paid);
            claims.set(index, claim);

            env.events().publish(
                (Symbol::new(env, "claim_decided"), pool.clone()),
                ClaimDecidedEvent {
                    pool: pool.clone(),
                    nonce,
                    index,
                    accepted: false,
                    forced_deny: true,
                },
            );
        }
    }

    fn pay_fee(env: &Env, config: &ClaimConfig, to: &Address, amount: i128) {
        if amount > 0 {
            token::Client::new(env, &config.fee_currency).transfer(
                &env.current_contract_address(),
                to,
                &amount,
            );
        }
    }

    fn set_claim_fee(env: &Env, pool: &Address, fee: i128) {
        write_claim_fee(env, pool, fee);
        env.events().publish(
            (Symbol::new(env, "claim_fee_updated"), pool.clone()),
            ClaimFeeUpdatedEvent {
                pool: pool.clone(),
                fee,
            },
        );
    }

    fn publish_cvc(env: &Env, pool: Address, cvc: &Address, added: bool) {
        env.events().publish(
            (Symbol::new(env, "cvc_updated"), pool.clone()),
            CvcUpdatedEvent {
                pool,
                cvc: cvc.clone(),
                added,
            },
        );
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<ClaimConfig, Error> {
        let config = read_config(env)?;
        if *caller != config.owner {
            return Err(Error::Unauthorized);
        }
        caller.require_auth();
        Ok(config)
    }

    fn require_governance(env: &Env, caller: &Address) -> Result<ClaimConfig, Error> {
        let config = read_config(env)?;
        if *caller != config.governance {
            return Err(Error::Unauthorized);
        }
        caller.require_auth();
        Ok(config)
    }
}
