use crate::access::{require_any_role, require_role, Role};
use crate::cover::CoverOps;
use crate::error::Error;
use crate::events::{
    CollateralUpdatedEvent, DelayUpdatedEvent, ExpiryUpdatedEvent, FeesUpdatedEvent,
    RiskUpdatedEvent, RoleUpdatedEvent,
};
use crate::storage::Storage;
use crate::types::{
    CollateralInfo, ExpiryInfo, FeeRate, PoolParams, PoolState, Roles, Status,
    DEFAULT_CLAIM_REDEEM_DELAY, DEFAULT_FEE_DENOMINATOR, DEFAULT_FEE_NUMERATOR,
    DEFAULT_NO_CLAIM_REDEEM_DELAY,
};
use crate::validation::Validator;
use soroban_sdk::{Address, Env, String, Symbol};

pub struct Admin;

impl Admin {
    /// Initialize the pool with its first risk set, collateral and expiry
    pub fn initialize(env: &Env, params: PoolParams) -> Result<(), Error> {
        if Storage::is_initialized(env) {
            return Err(Error::AlreadyInitialized);
        }
        params.owner.require_auth();
        if params.governance == params.owner {
            return Err(Error::GovernanceIsOwner);
        }

        Validator::validate_label(&params.name)?;
        Validator::validate_label(&params.expiry_name)?;
        Validator::validate_risk_set(&params.risks)?;
        Validator::validate_deposit_ratio(params.deposit_ratio)?;
        if params.expiry <= env.ledger().timestamp() {
            return Err(Error::CoverExpired);
        }

        Storage::set_initialized(env);
        Storage::set_roles(
            env,
            &Roles {
                owner: params.owner,
                governance: params.governance,
                claim_manager: params.claim_manager,
                treasury: params.treasury,
            },
        );
        Storage::set_pool(
            env,
            &PoolState {
                name: params.name,
                extendable: params.extendable,
                active: true,
                claim_nonce: 0,
                claim_redeem_delay: DEFAULT_CLAIM_REDEEM_DELAY,
                no_claim_redeem_delay: DEFAULT_NO_CLAIM_REDEEM_DELAY,
                fee_rate: FeeRate {
                    numerator: DEFAULT_FEE_NUMERATOR,
                    denominator: DEFAULT_FEE_DENOMINATOR,
                },
                cover_token: params.cover_token,
            },
        );
        Storage::set_risks(env, &params.risks);
        Storage::set_collateral(
            env,
            &params.collateral,
            &CollateralInfo {
                deposit_ratio: params.deposit_ratio,
                status: Status::Active,
            },
        );
        Storage::set_expiry(
            env,
            params.expiry,
            &ExpiryInfo {
                name: params.expiry_name,
                status: Status::Active,
            },
        );

        Ok(())
    }

    // ============================================
    // OWNER
    // ============================================

    /// Add a risk to an open pool. Every live cover gains its claim tranche,
    /// reachable for existing holders through `convert`.
    pub fn add_risk(env: &Env, caller: &Address, risk: String) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;
        let pool = Storage::get_pool(env)?;
        if !pool.extendable {
            return Err(Error::PoolNotExtendable);
        }
        Validator::validate_risk(&risk)?;

        if Storage::get_deleted_risks(env).iter().any(|r| r == risk) {
            return Err(Error::DeletedRiskNotAllowed);
        }
        let mut risks = Storage::get_risks(env);
        if risks.iter().any(|r| r == risk) {
            return Err(Error::RiskAlreadyActive);
        }
        risks.push_back(risk.clone());
        Storage::set_risks(env, &risks);

        for cover_id in Storage::get_active_covers(env).iter() {
            if let Some(mut cover) = Storage::get_cover(env, &cover_id) {
                CoverOps::extend(env, &pool, &mut cover, &risk)?;
            }
        }

        env.events().publish(
            (Symbol::new(env, "risk_updated"),),
            RiskUpdatedEvent { risk, active: true },
        );
        Ok(())
    }

    /// Move a risk to the deleted list for good
    pub fn delete_risk(env: &Env, caller: &Address, risk: String) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;

        let risks = Storage::get_risks(env);
        let index = risks
            .iter()
            .position(|r| r == risk)
            .ok_or(Error::RiskNotActive)?;
        if risks.len() == 1 {
            return Err(Error::LastRisk);
        }

        let mut remaining = risks.clone();
        remaining.remove(index as u32);
        Storage::set_risks(env, &remaining);

        let mut deleted = Storage::get_deleted_risks(env);
        deleted.push_back(risk.clone());
        Storage::set_deleted_risks(env, &deleted);

        env.events().publish(
            (Symbol::new(env, "risk_updated"),),
            RiskUpdatedEvent {
                risk,
                active: false,
            },
        );
        Ok(())
    }

    pub fn set_collateral(
        env: &Env,
        caller: &Address,
        collateral: Address,
        deposit_ratio: i128,
        status: Status,
    ) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;
        Validator::validate_deposit_ratio(deposit_ratio)?;
        if status == Status::Null {
            return Err(Error::CollateralNotActive);
        }

        Storage::set_collateral(
            env,
            &collateral,
            &CollateralInfo {
                deposit_ratio,
                status,
            },
        );

        env.events().publish(
            (Symbol::new(env, "collateral_updated"), collateral.clone()),
            CollateralUpdatedEvent {
                collateral,
                deposit_ratio,
                active: status == Status::Active,
            },
        );
        Ok(())
    }

    pub fn set_expiry(
        env: &Env,
        caller: &Address,
        expiry: u64,
        name: String,
        status: Status,
    ) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;
        Validator::validate_label(&name)?;
        if status == Status::Null {
            return Err(Error::ExpiryNotActive);
        }
        if status == Status::Active && expiry <= env.ledger().timestamp() {
            return Err(Error::CoverExpired);
        }

        Storage::set_expiry(
            env,
            expiry,
            &ExpiryInfo {
                name: name.clone(),
                status,
            },
        );

        env.events().publish(
            (Symbol::new(env, "expiry_updated"), expiry),
            ExpiryUpdatedEvent {
                expiry,
                name,
                active: status == Status::Active,
            },
        );
        Ok(())
    }

    pub fn set_active(env: &Env, caller: &Address, active: bool) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;
        let mut pool = Storage::get_pool(env)?;
        pool.active = active;
        Storage::set_pool(env, &pool);
        Ok(())
    }

    pub fn set_claim_manager(env: &Env, caller: &Address, new: Address) -> Result<(), Error> {
        require_role(env, caller, Role::Owner)?;
        Self::update_role(env, "claim_manager", new, |roles| &mut roles.claim_manager)
    }

    // ============================================
    // GOVERNANCE
    // ============================================

    pub fn set_fees(
        env: &Env,
        caller: &Address,
        numerator: i128,
        denominator: i128,
    ) -> Result<(), Error> {
        require_role(env, caller, Role::Governance)?;
        let fee_rate = FeeRate {
            numerator,
            denominator,
        };
        Validator::validate_fee_rate(&fee_rate)?;

        let mut pool = Storage::get_pool(env)?;
        pool.fee_rate = fee_rate;
        Storage::set_pool(env, &pool);

        env.events().publish(
            (Symbol::new(env, "fees_updated"),),
            FeesUpdatedEvent {
                numerator,
                denominator,
            },
        );
        Ok(())
    }

    pub fn set_claim_redeem_delay(env: &Env, caller: &Address, delay: u64) -> Result<(), Error> {
        require_role(env, caller, Role::Governance)?;
        let mut pool = Storage::get_pool(env)?;
        pool.claim_redeem_delay = delay;
        Self::store_delays(env, &pool);
        Ok(())
    }

    /// Claim management stretches this while a claim is pending
    pub fn set_no_claim_redeem_delay(env: &Env, caller: &Address, delay: u64) -> Result<(), Error> {
        require_any_role(env, caller, &[Role::Owner, Role::ClaimManager])?;
        let mut pool = Storage::get_pool(env)?;
        pool.no_claim_redeem_delay = delay;
        Self::store_delays(env, &pool);
        Ok(())
    }

    pub fn set_treasury(env: &Env, caller: &Address, new: Address) -> Result<(), Error> {
        require_role(env, caller, Role::Governance)?;
        Self::update_role(env, "treasury", new, |roles| &mut roles.treasury)
    }

    pub fn set_governance(env: &Env, caller: &Address, new: Address) -> Result<(), Error> {
        require_role(env, caller, Role::Governance)?;
        if new == Storage::get_roles(env)?.owner {
            return Err(Error::GovernanceIsOwner);
        }
        Self::update_role(env, "governance", new, |roles| &mut roles.governance)
    }

    fn store_delays(env: &Env, pool: &PoolState) {
        Storage::set_pool(env, pool);
        env.events().publish(
            (Symbol::new(env, "delay_updated"),),
            DelayUpdatedEvent {
                claim_redeem_delay: pool.claim_redeem_delay,
                no_claim_redeem_delay: pool.no_claim_redeem_delay,
            },
        );
    }

    fn update_role<F>(env: &Env, role: &str, new: Address, slot: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Roles) -> &mut Address,
    {
        let mut roles = Storage::get_roles(env)?;
        let old = core::mem::replace(slot(&mut roles), new.clone());
        Storage::set_roles(env, &roles);

        env.events().publish(
            (Symbol::new(env, "role_updated"),),
            RoleUpdatedEvent {
                role: String::from_str(env, role),
                old,
                new,
            },
        );
        Ok(())
    }
}
