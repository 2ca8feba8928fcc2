use soroban_sdk::{vec, Address, BytesN, Env, IntoVal, String, Symbol};

/// Calls into the tranche token ledger on behalf of this pool.
///
/// The pool is the controller of every tranche it registers, so it passes its
/// own address as operator/controller.
pub struct TrancheLedger<'a> {
    env: &'a Env,
    token: Address,
}

impl<'a> TrancheLedger<'a> {
    pub fn new(env: &'a Env, token: &Address) -> Self {
        TrancheLedger {
            env,
            token: token.clone(),
        }
    }

    pub fn create(&self, tranche_id: &BytesN<32>, name: &String, decimals: u32) {
        let env = self.env;
        env.invoke_contract::<()>(
            &self.token,
            &Symbol::new(env, "create_tranche"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                tranche_id.into_val(env),
                name.into_val(env),
                name.into_val(env),
                decimals.into_val(env),
            ],
        );
    }

    pub fn mint(&self, tranche_id: &BytesN<32>, to: &Address, amount: i128) {
        let env = self.env;
        env.invoke_contract::<()>(
            &self.token,
            &Symbol::new(env, "mint"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                tranche_id.into_val(env),
                to.into_val(env),
                amount.into_val(env),
            ],
        );
    }

    pub fn burn_from(&self, tranche_id: &BytesN<32>, from: &Address, amount: i128) {
        let env = self.env;
        env.invoke_contract::<()>(
            &self.token,
            &Symbol::new(env, "burn_from"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                tranche_id.into_val(env),
                from.into_val(env),
                amount.into_val(env),
            ],
        );
    }

    pub fn balance_of(&self, tranche_id: &BytesN<32>, holder: &Address) -> i128 {
        let env = self.env;
        env.invoke_contract(
            &self.token,
            &Symbol::new(env, "balance_of"),
            vec![env, tranche_id.into_val(env), holder.into_val(env)],
        )
    }
}
