use soroban_sdk::{vec, Address, Env, IntoVal, String, Symbol, Vec};

/// Calls into a cover pool as its claim manager.
pub struct CoverPoolCaller<'a> {
    env: &'a Env,
    pool: Address,
}

impl<'a> CoverPoolCaller<'a> {
    pub fn new(env: &'a Env, pool: &Address) -> Self {
        CoverPoolCaller {
            env,
            pool: pool.clone(),
        }
    }

    pub fn claim_nonce(&self) -> u32 {
        let env = self.env;
        env.invoke_contract(&self.pool, &Symbol::new(env, "get_claim_nonce"), vec![env])
    }

    pub fn set_no_claim_redeem_delay(&self, delay: u64) {
        let env = self.env;
        env.invoke_contract::<()>(
            &self.pool,
            &Symbol::new(env, "set_no_claim_redeem_delay"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                delay.into_val(env),
            ],
        );
    }

    pub fn enact_claim(
        &self,
        risks: &Vec<String>,
        payout_rates: &Vec<i128>,
        payout_denominator: i128,
        incident_timestamp: u64,
        nonce: u32,
    ) {
        let env = self.env;
        env.invoke_contract::<()>(
            &self.pool,
            &Symbol::new(env, "enact_claim"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                risks.into_val(env),
                payout_rates.into_val(env),
                payout_denominator.into_val(env),
                incident_timestamp.into_val(env),
                nonce.into_val(env),
            ],
        );
    }
}
