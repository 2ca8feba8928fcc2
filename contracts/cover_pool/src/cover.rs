use crate::error::Error;
use crate::events::{
    ClaimRedeemedEvent, CollateralRedeemedEvent, CoverAddedEvent, CoverCreatedEvent,
    CoverDeployedEvent, CoverExtendedEvent, FutureConvertedEvent,
};
use crate::fees::{claimable_units, collateral_amount, redeem_fee, tranche_amount};
use crate::naming;
use crate::storage::Storage;
use crate::tranche::TrancheLedger;
use crate::types::{
    CoverInfo, FeeRate, PoolClaim, PoolState, Status, TrancheKind, TRANCHE_DEPLOY_BATCH,
};
use soroban_sdk::{token, xdr::ToXdr, Address, BytesN, Env, String, Symbol, Vec};

/// Content address of the cover for `(pool, collateral, expiry, nonce)`.
///
/// The pool contract address is part of the preimage, so pools sharing a
/// name and a tranche ledger never derive the same ids.
pub fn cover_id(
    env: &Env,
    pool_name: &String,
    collateral: &Address,
    expiry: Option<u64>,
    nonce: u32,
) -> BytesN<32> {
    let payload = (
        env.current_contract_address(),
        pool_name.clone(),
        collateral.clone(),
        expiry,
        nonce,
    )
        .to_xdr(env);
    env.crypto().sha256(&payload).to_bytes()
}

pub fn tranche_id(env: &Env, cover_id: &BytesN<32>, kind: &TrancheKind) -> BytesN<32> {
    let payload = (cover_id.clone(), kind.clone()).to_xdr(env);
    env.crypto().sha256(&payload).to_bytes()
}

fn is_active_risk(active: &Vec<String>, risk: &String) -> bool {
    active.iter().any(|r| r == *risk)
}

/// Incidents after a cover's expiry only matter to no-claim holders.
fn covers_incident(cover: &CoverInfo, incident_timestamp: u64) -> bool {
    match cover.expiry {
        Some(expiry) => incident_timestamp <= expiry,
        None => true,
    }
}

fn current_future(cover: &CoverInfo) -> Result<BytesN<32>, Error> {
    cover
        .future_tokens
        .last()
        .ok_or(Error::CoverDeployIncomplete)
}

fn coverage_elapsed(cover: &CoverInfo, now: u64) -> u64 {
    let end = match cover.expiry {
        Some(expiry) => now.min(expiry),
        None => now,
    };
    end.saturating_sub(cover.created_at)
}

pub struct CoverOps;

impl CoverOps {
    /// Load the current-nonce cover for `(collateral, expiry)` or create it.
    ///
    /// Returns the cover and whether it was created by this call.
    pub fn open(
        env: &Env,
        pool: &PoolState,
        collateral: &Address,
        expiry: Option<u64>,
    ) -> Result<(CoverInfo, bool), Error> {
        let id = cover_id(env, &pool.name, collateral, expiry, pool.claim_nonce);
        if let Some(cover) = Storage::get_cover(env, &id) {
            return Ok((cover, false));
        }
        let cover = Self::create(env, pool, id, collateral, expiry)?;
        Ok((cover, true))
    }

    fn create(
        env: &Env,
        pool: &PoolState,
        id: BytesN<32>,
        collateral: &Address,
        expiry: Option<u64>,
    ) -> Result<CoverInfo, Error> {
        let info = Storage::get_collateral(env, collateral).ok_or(Error::CollateralNotActive)?;
        let expiry_name = match expiry {
            Some(timestamp) => Some(
                Storage::get_expiry(env, timestamp)
                    .ok_or(Error::ExpiryNotActive)?
                    .name,
            ),
            None => None,
        };

        let collateral_client = token::Client::new(env, collateral);
        let name = naming::cover_name(
            env,
            &pool.name,
            pool.claim_nonce,
            &collateral_client.symbol(),
            expiry_name.as_ref(),
        )?;

        let ledger = TrancheLedger::new(env, &pool.cover_token);
        let decimals = collateral_client.decimals();
        let no_claim_token = tranche_id(env, &id, &TrancheKind::NoClaim);
        ledger.create(&no_claim_token, &naming::no_claim_symbol(env, &name)?, decimals);
        let future_token = tranche_id(env, &id, &TrancheKind::Future(0));
        ledger.create(&future_token, &naming::future_symbol(env, 0, &name)?, decimals);

        let mut cover = CoverInfo {
            id: id.clone(),
            name: name.clone(),
            collateral: collateral.clone(),
            expiry,
            deposit_ratio: info.deposit_ratio,
            claim_nonce: pool.claim_nonce,
            created_at: env.ledger().timestamp(),
            collateral_held: 0,
            no_claim_token,
            risks: Storage::get_risks(env),
            claim_tokens: Vec::new(env),
            future_tokens: Vec::from_array(env, [future_token]),
            future_risks: Vec::new(env),
            deploy_complete: false,
        };
        Storage::push_cover(env, &id);

        env.events().publish(
            (Symbol::new(env, "cover_created"), id.clone()),
            CoverCreatedEvent {
                cover_id: id,
                name,
                collateral: collateral.clone(),
                expiry,
                claim_nonce: pool.claim_nonce,
            },
        );

        Self::provision(env, pool, &mut cover)?;
        Ok(cover)
    }

    /// Register the next batch of claim tranches for the cover.
    ///
    /// Returns how many tranches were registered in this call.
    pub fn provision(env: &Env, pool: &PoolState, cover: &mut CoverInfo) -> Result<u32, Error> {
        let ledger = TrancheLedger::new(env, &pool.cover_token);
        let decimals = token::Client::new(env, &cover.collateral).decimals();

        let start = cover.claim_tokens.len();
        let risks = cover.risks.clone();
        let mut registered = 0u32;
        for risk in risks.iter().skip(start as usize) {
            if registered == TRANCHE_DEPLOY_BATCH {
                break;
            }
            let id = tranche_id(env, &cover.id, &TrancheKind::Claim(risk.clone()));
            ledger.create(&id, &naming::claim_symbol(env, &risk, &cover.name)?, decimals);
            cover.claim_tokens.push_back(id);
            registered += 1;
        }

        cover.deploy_complete = cover.claim_tokens.len() == cover.risks.len();
        Storage::set_cover(env, cover);

        env.events().publish(
            (Symbol::new(env, "cover_deployed"), cover.id.clone()),
            CoverDeployedEvent {
                cover_id: cover.id.clone(),
                tranches_registered: registered,
                complete: cover.deploy_complete,
            },
        );

        Ok(registered)
    }

    /// Attach a risk added to the pool to a live cover.
    ///
    /// The current future tranche now converts into the risk's claim tranche,
    /// and a new future tranche takes its place for later additions.
    pub fn extend(
        env: &Env,
        pool: &PoolState,
        cover: &mut CoverInfo,
        risk: &String,
    ) -> Result<(), Error> {
        let index = cover.future_tokens.len();
        let future_token = tranche_id(env, &cover.id, &TrancheKind::Future(index));
        TrancheLedger::new(env, &pool.cover_token).create(
            &future_token,
            &naming::future_symbol(env, index, &cover.name)?,
            token::Client::new(env, &cover.collateral).decimals(),
        );

        cover.risks.push_back(risk.clone());
        cover.future_risks.push_back(risk.clone());
        cover.future_tokens.push_back(future_token.clone());
        Self::provision(env, pool, cover)?;

        env.events().publish(
            (Symbol::new(env, "cover_extended"), cover.id.clone()),
            CoverExtendedEvent {
                cover_id: cover.id.clone(),
                risk: risk.clone(),
                claim_token: tranche_id(env, &cover.id, &TrancheKind::Claim(risk.clone())),
                future_token,
            },
        );
        Ok(())
    }

    /// Walk the holder's future tranches up the chain.
    ///
    /// Each unit of `future_tokens[i]` becomes one unit of the claim tranche
    /// for `future_risks[i]` plus one unit of `future_tokens[i + 1]`, so the
    /// holder ends with the current future tranche. Claim tranches of risks
    /// deleted since are skipped. Returns the units now held in the current
    /// future tranche that came from older ones.
    pub fn convert(
        env: &Env,
        pool: &PoolState,
        cover: &CoverInfo,
        holder: &Address,
    ) -> Result<i128, Error> {
        if !cover.deploy_complete {
            return Err(Error::CoverDeployIncomplete);
        }

        let ledger = TrancheLedger::new(env, &pool.cover_token);
        let active = Storage::get_risks(env);
        let mut carried: i128 = 0;
        for (future_token, risk) in cover.future_tokens.iter().zip(cover.future_risks.iter()) {
            let balance = ledger.balance_of(&future_token, holder);
            if balance > 0 {
                ledger.burn_from(&future_token, holder, balance);
                carried = carried.checked_add(balance).ok_or(Error::MathOverflow)?;
            }
            if carried > 0 && is_active_risk(&active, &risk) {
                let claim_token = tranche_id(env, &cover.id, &TrancheKind::Claim(risk));
                ledger.mint(&claim_token, holder, carried);
            }
        }
        if carried == 0 {
            return Err(Error::InsufficientBalance);
        }
        ledger.mint(&current_future(cover)?, holder, carried);

        env.events().publish(
            (Symbol::new(env, "future_converted"), cover.id.clone()),
            FutureConvertedEvent {
                cover_id: cover.id.clone(),
                holder: holder.clone(),
                amount: carried,
            },
        );
        Ok(carried)
    }

    /// Lock collateral and mint the no-claim tranche, the current future
    /// tranche and every claim tranche whose risk is still active.
    pub fn deposit(
        env: &Env,
        pool: &PoolState,
        cover: &mut CoverInfo,
        depositor: &Address,
        amount: i128,
    ) -> Result<i128, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if !cover.deploy_complete {
            return Err(Error::CoverDeployIncomplete);
        }
        if let Some(expiry) = cover.expiry {
            if env.ledger().timestamp() >= expiry {
                return Err(Error::CoverExpired);
            }
        }

        let minted = tranche_amount(amount, cover.deposit_ratio).ok_or(Error::MathOverflow)?;
        if minted <= 0 {
            return Err(Error::InvalidAmount);
        }

        token::Client::new(env, &cover.collateral).transfer(
            depositor,
            &env.current_contract_address(),
            &amount,
        );

        let ledger = TrancheLedger::new(env, &pool.cover_token);
        ledger.mint(&cover.no_claim_token, depositor, minted);
        ledger.mint(&current_future(cover)?, depositor, minted);
        let active = Storage::get_risks(env);
        for (risk, token_id) in cover.risks.iter().zip(cover.claim_tokens.iter()) {
            if is_active_risk(&active, &risk) {
                ledger.mint(&token_id, depositor, minted);
            }
        }

        cover.collateral_held = cover
            .collateral_held
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        Storage::set_cover(env, cover);

        env.events().publish(
            (Symbol::new(env, "cover_added"), cover.id.clone()),
            CoverAddedEvent {
                cover_id: cover.id.clone(),
                depositor: depositor.clone(),
                collateral_amount: amount,
                tranche_amount: minted,
            },
        );

        Ok(minted)
    }

    /// The claim enacted at the cover's nonce, if it covers the incident.
    pub fn accepted_claim(env: &Env, cover: &CoverInfo) -> Option<PoolClaim> {
        Storage::get_claim(env, cover.claim_nonce)
            .filter(|claim| covers_incident(cover, claim.incident_timestamp))
    }

    /// Redeem tranches 1:1 for collateral when no claim applies.
    ///
    /// Before `expiry + no_claim_redeem_delay` the holder burns the no-claim
    /// tranche, the current future tranche and every active claim tranche;
    /// deleted risks' tranches are left alone. After it, the no-claim tranche
    /// alone is enough.
    pub fn redeem_collateral(
        env: &Env,
        pool: &PoolState,
        treasury: &Address,
        cover: &mut CoverInfo,
        holder: &Address,
        amount: i128,
    ) -> Result<i128, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if Self::accepted_claim(env, cover).is_some() {
            return Err(Error::ClaimAccepted);
        }

        let now = env.ledger().timestamp();
        let no_claim_only = match cover.expiry {
            Some(expiry) => now >= expiry.saturating_add(pool.no_claim_redeem_delay),
            None => false,
        };

        let ledger = TrancheLedger::new(env, &pool.cover_token);
        if ledger.balance_of(&cover.no_claim_token, holder) < amount {
            return Err(Error::InsufficientBalance);
        }

        let mut claim_burns: Vec<BytesN<32>> = Vec::new(env);
        if !no_claim_only {
            let future_token = current_future(cover)?;
            if ledger.balance_of(&future_token, holder) < amount {
                return Err(Error::InsufficientBalance);
            }
            claim_burns.push_back(future_token);

            let active = Storage::get_risks(env);
            for (risk, token_id) in cover.risks.iter().zip(cover.claim_tokens.iter()) {
                if !is_active_risk(&active, &risk) {
                    continue;
                }
                if ledger.balance_of(&token_id, holder) < amount {
                    return Err(Error::InsufficientBalance);
                }
                claim_burns.push_back(token_id);
            }
        }

        let gross = collateral_amount(amount, cover.deposit_ratio).ok_or(Error::MathOverflow)?;
        if gross <= 0 {
            return Err(Error::InvalidAmount);
        }
        if gross > cover.collateral_held {
            return Err(Error::InsufficientCollateral);
        }

        ledger.burn_from(&cover.no_claim_token, holder, amount);
        for token_id in claim_burns.iter() {
            ledger.burn_from(&token_id, holder, amount);
        }

        let (payout, fee) = Self::pay_out(env, &pool.fee_rate, treasury, cover, holder, gross)?;

        env.events().publish(
            (Symbol::new(env, "collateral_redeemed"), cover.id.clone()),
            CollateralRedeemedEvent {
                cover_id: cover.id.clone(),
                holder: holder.clone(),
                tranche_amount: amount,
                no_claim_only,
                payout,
                fee,
            },
        );

        Ok(payout)
    }

    /// Burn the holder's whole position and pay out per the accepted claim.
    pub fn redeem_claim(
        env: &Env,
        pool: &PoolState,
        treasury: &Address,
        cover: &mut CoverInfo,
        holder: &Address,
    ) -> Result<i128, Error> {
        let claim = Storage::get_claim(env, cover.claim_nonce).ok_or(Error::ClaimNotAccepted)?;
        if !covers_incident(cover, claim.incident_timestamp) {
            return Err(Error::IncidentAfterExpiry);
        }
        if env.ledger().timestamp() < claim.enacted_timestamp.saturating_add(pool.claim_redeem_delay)
        {
            return Err(Error::RedeemDelayNotPassed);
        }

        let ledger = TrancheLedger::new(env, &pool.cover_token);
        let (units, burns) = Self::claim_position(env, &ledger, cover, &claim, holder)?;
        let gross = collateral_amount(units, cover.deposit_ratio).ok_or(Error::MathOverflow)?;
        if gross <= 0 {
            return Err(Error::InsufficientBalance);
        }
        if gross > cover.collateral_held {
            return Err(Error::InsufficientCollateral);
        }

        for (token_id, balance) in burns.iter() {
            ledger.burn_from(&token_id, holder, balance);
        }

        let (payout, fee) = Self::pay_out(env, &pool.fee_rate, treasury, cover, holder, gross)?;

        env.events().publish(
            (Symbol::new(env, "claim_redeemed"), cover.id.clone()),
            ClaimRedeemedEvent {
                cover_id: cover.id.clone(),
                holder: holder.clone(),
                claim_nonce: cover.claim_nonce,
                payout,
                fee,
            },
        );

        Ok(payout)
    }

    /// Collateral (before fee) `holder` would receive from `redeem_claim`,
    /// zero when no accepted claim applies.
    pub fn view_claimable(
        env: &Env,
        pool: &PoolState,
        cover: &CoverInfo,
        holder: &Address,
    ) -> Result<i128, Error> {
        let claim = match Self::accepted_claim(env, cover) {
            Some(claim) => claim,
            None => return Ok(0),
        };
        let ledger = TrancheLedger::new(env, &pool.cover_token);
        let (units, _) = Self::claim_position(env, &ledger, cover, &claim, holder)?;
        collateral_amount(units, cover.deposit_ratio).ok_or(Error::MathOverflow)
    }

    /// Claimable tranche units and the balances to burn for them.
    fn claim_position(
        env: &Env,
        ledger: &TrancheLedger,
        cover: &CoverInfo,
        claim: &PoolClaim,
        holder: &Address,
    ) -> Result<(i128, Vec<(BytesN<32>, i128)>), Error> {
        let mut burns: Vec<(BytesN<32>, i128)> = Vec::new(env);

        let no_claim_balance = ledger.balance_of(&cover.no_claim_token, holder);
        if no_claim_balance > 0 {
            burns.push_back((cover.no_claim_token.clone(), no_claim_balance));
        }

        let mut weighted: i128 = 0;
        let mut rate_sum: i128 = 0;
        for (risk, token_id) in cover.risks.iter().zip(cover.claim_tokens.iter()) {
            let rate = claim
                .risks
                .iter()
                .position(|r| r == risk)
                .and_then(|i| claim.payout_rates.get(i as u32))
                .unwrap_or(0);
            rate_sum = rate_sum.checked_add(rate).ok_or(Error::MathOverflow)?;

            let balance = ledger.balance_of(&token_id, holder);
            if balance > 0 {
                let share = balance.checked_mul(rate).ok_or(Error::MathOverflow)?;
                weighted = weighted.checked_add(share).ok_or(Error::MathOverflow)?;
                burns.push_back((token_id, balance));
            }
        }

        let units = claimable_units(
            no_claim_balance,
            weighted,
            rate_sum,
            claim.payout_denominator,
        )
        .ok_or(Error::MathOverflow)?;
        Ok((units, burns))
    }

    /// Send `gross` minus the prorated fee to the holder and the fee to the
    /// treasury. Returns `(payout, fee)`.
    fn pay_out(
        env: &Env,
        fee_rate: &FeeRate,
        treasury: &Address,
        cover: &mut CoverInfo,
        holder: &Address,
        gross: i128,
    ) -> Result<(i128, i128), Error> {
        let elapsed = coverage_elapsed(cover, env.ledger().timestamp());
        let fee = redeem_fee(gross, fee_rate, elapsed).ok_or(Error::MathOverflow)?;
        let payout = gross - fee;

        cover.collateral_held -= gross;
        Storage::set_cover(env, cover);

        let client = token::Client::new(env, &cover.collateral);
        let this = env.current_contract_address();
        if payout > 0 {
            client.transfer(&this, holder, &payout);
        }
        if fee > 0 {
            client.transfer(&this, treasury, &fee);
        }

        Ok((payout, fee))
    }
}

/// Deposits need an active collateral and, for expiring covers, an active
/// expiry that has not passed yet.
pub fn check_deposit_terms(
    env: &Env,
    pool: &PoolState,
    collateral: &Address,
    expiry: Option<u64>,
) -> Result<(), Error> {
    if !pool.active {
        return Err(Error::PoolNotActive);
    }
    match Storage::get_collateral(env, collateral) {
        Some(info) if info.status == Status::Active => {}
        _ => return Err(Error::CollateralNotActive),
    }
    if let Some(expiry) = expiry {
        match Storage::get_expiry(env, expiry) {
            Some(info) if info.status == Status::Active => {}
            _ => return Err(Error::ExpiryNotActive),
        }
        if expiry <= env.ledger().timestamp() {
            return Err(Error::CoverExpired);
        }
    }
    Ok(())
}
