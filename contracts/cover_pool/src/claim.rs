use crate::access::{require_role, Role};
use crate::error::Error;
use crate::events::ClaimEnactedEvent;
use crate::storage::Storage;
use crate::types::PoolClaim;
use crate::validation::Validator;
use soroban_sdk::{Address, Env, String, Symbol, Vec};

pub struct ClaimOps;

impl ClaimOps {
    /// Record an accepted claim and start a new claim epoch.
    ///
    /// `nonce` must equal the live claim nonce, so a second enactment racing
    /// on the same nonce fails. Covers of the old nonce stay redeemable
    /// against this claim; new deposits land in fresh covers.
    pub fn enact(
        env: &Env,
        caller: &Address,
        risks: Vec<String>,
        payout_rates: Vec<i128>,
        payout_denominator: i128,
        incident_timestamp: u64,
        nonce: u32,
    ) -> Result<(), Error> {
        require_role(env, caller, Role::ClaimManager)?;

        let mut pool = Storage::get_pool(env)?;
        if nonce != pool.claim_nonce {
            return Err(Error::NonceMismatch);
        }

        let active = Storage::get_risks(env);
        for risk in risks.iter() {
            if !active.iter().any(|r| r == risk) {
                return Err(Error::RiskNotActive);
            }
        }
        Validator::validate_payout_rates(&risks, &payout_rates, payout_denominator)?;

        let now = env.ledger().timestamp();
        if incident_timestamp > now {
            return Err(Error::InvalidIncidentTimestamp);
        }

        let claim = PoolClaim {
            nonce,
            risks: risks.clone(),
            payout_rates: payout_rates.clone(),
            payout_denominator,
            incident_timestamp,
            enacted_timestamp: now,
        };
        Storage::set_claim(env, &claim);

        pool.claim_nonce = nonce.checked_add(1).ok_or(Error::MathOverflow)?;
        Storage::set_pool(env, &pool);
        Storage::clear_active_covers(env);

        env.events().publish(
            (Symbol::new(env, "claim_enacted"), nonce),
            ClaimEnactedEvent {
                claim_nonce: nonce,
                risks,
                payout_rates,
                payout_denominator,
                incident_timestamp,
            },
        );

        Ok(())
    }
}
