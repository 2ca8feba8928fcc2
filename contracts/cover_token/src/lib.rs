#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
pub use storage::Tranche;

use events::{ApproveEvent, BurnEvent, MintEvent, TrancheCreatedEvent, TransferEvent};
use storage::{
    AllowanceDataKey, AllowanceValue, Balance, DataKey, BALANCE_BUMP_AMOUNT,
    BALANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD,
};

use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Symbol};

/// Ledger for every claim and no-claim tranche issued by the cover pools.
///
/// Each tranche is identified by a 32 byte id derived by the pool and has a
/// single controller, the pool that created it. Only that controller can mint
/// or burn; everything else is a plain fungible balance per tranche.
#[contract]
pub struct CoverToken;

#[contractimpl]
impl CoverToken {
    /// Initialize the token contract
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        bump_instance(&env);

        Ok(())
    }

    /// Allow a cover pool contract to register tranches
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::Operators(operator.clone()), &true);
        bump_instance(&env);

        Ok(())
    }

    /// Remove an operator. Tranches it already controls keep working.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .remove(&DataKey::Operators(operator));

        Ok(())
    }

    /// Register a new tranche controlled by `operator`
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotOperator`: Caller is not a registered operator
    /// - `TrancheExists`: The id is already taken
    pub fn create_tranche(
        env: Env,
        operator: Address,
        tranche_id: BytesN<32>,
        name: String,
        symbol: String,
        decimals: u32,
    ) -> Result<(), Error> {
        check_initialized(&env)?;

        if !Self::is_operator(env.clone(), operator.clone()) {
            return Err(Error::NotOperator);
        }
        operator.require_auth();

        let key = DataKey::Tranche(tranche_id.clone());
        if env.storage().persistent().has(&key) {
            return Err(Error::TrancheExists);
        }

        let tranche = Tranche {
            name: name.clone(),
            symbol: symbol.clone(),
            decimals,
            controller: operator.clone(),
            total_supply: 0,
        };
        write_tranche(&env, &tranche_id, &tranche);
        bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "tranche_created"), tranche_id.clone()),
            TrancheCreatedEvent {
                tranche_id,
                controller: operator,
                name,
                symbol,
            },
        );

        Ok(())
    }

    /// Mint tokens (tranche controller only)
    ///
    /// # Errors
    /// - `TrancheNotFound`: Unknown tranche
    /// - `Unauthorized`: Caller is not the tranche controller
    /// - `InvalidAmount`: Amount <= 0
    pub fn mint(
        env: Env,
        controller: Address,
        tranche_id: BytesN<32>,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        let mut tranche = read_controlled(&env, &tranche_id, &controller)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let balance = read_balance(&env, &tranche_id, &to);
        let new_balance = balance.checked_add(amount).ok_or(Error::InvalidAmount)?;
        tranche.total_supply = tranche
            .total_supply
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        write_balance(&env, &tranche_id, &to, new_balance);
        write_tranche(&env, &tranche_id, &tranche);

        env.events().publish(
            (Symbol::new(&env, "mint"), tranche_id.clone()),
            MintEvent {
                tranche_id,
                to,
                amount,
            },
        );

        Ok(())
    }

    /// Burn tokens from a holder without an allowance (tranche controller only)
    ///
    /// # Errors
    /// - `TrancheNotFound`: Unknown tranche
    /// - `Unauthorized`: Caller is not the tranche controller
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn burn_from(
        env: Env,
        controller: Address,
        tranche_id: BytesN<32>,
        from: Address,
        amount: i128,
    ) -> Result<(), Error> {
        let mut tranche = read_controlled(&env, &tranche_id, &controller)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let balance = read_balance(&env, &tranche_id, &from);
        if balance < amount {
            return Err(Error::InsufficientBalance);
        }

        write_balance(&env, &tranche_id, &from, balance - amount);
        tranche.total_supply -= amount;
        write_tranche(&env, &tranche_id, &tranche);

        env.events().publish(
            (Symbol::new(&env, "burn"), tranche_id.clone()),
            BurnEvent {
                tranche_id,
                from,
                amount,
            },
        );

        Ok(())
    }

    /// Transfer tokens between holders
    ///
    /// # Errors
    /// - `TrancheNotFound`: Unknown tranche
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(
        env: Env,
        tranche_id: BytesN<32>,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        from.require_auth();
        move_balance(&env, &tranche_id, &from, &to, amount)
    }

    /// Let `spender` move up to `amount` of `from`'s balance until
    /// `expiration_ledger`.
    ///
    /// # Errors
    /// - `TrancheNotFound`: Unknown tranche
    /// - `InvalidAmount`: Amount < 0
    /// - `InvalidExpiration`: Non-zero allowance that is already expired
    pub fn approve(
        env: Env,
        tranche_id: BytesN<32>,
        from: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), Error> {
        from.require_auth();
        read_tranche(&env, &tranche_id)?;

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }
        if amount > 0 && expiration_ledger < env.ledger().sequence() {
            return Err(Error::InvalidExpiration);
        }

        let key = DataKey::Allowance(AllowanceDataKey {
            tranche_id: tranche_id.clone(),
            from: from.clone(),
            spender: spender.clone(),
        });
        env.storage().temporary().set(
            &key,
            &AllowanceValue {
                amount,
                expiration_ledger,
            },
        );
        if amount > 0 {
            let live_for = expiration_ledger.saturating_sub(env.ledger().sequence());
            env.storage().temporary().extend_ttl(&key, live_for, live_for);
        }

        env.events().publish(
            (Symbol::new(&env, "approve"), tranche_id.clone()),
            ApproveEvent {
                tranche_id,
                from,
                spender,
                amount,
                expiration_ledger,
            },
        );

        Ok(())
    }

    /// Transfer on behalf of `from` using the spender's allowance
    ///
    /// # Errors
    /// - `InsufficientAllowance`: Allowance missing, expired or too small
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer_from(
        env: Env,
        tranche_id: BytesN<32>,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        spender.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let key = DataKey::Allowance(AllowanceDataKey {
            tranche_id: tranche_id.clone(),
            from: from.clone(),
            spender,
        });
        let allowance = read_allowance(&env, &key);
        if allowance.amount < amount {
            return Err(Error::InsufficientAllowance);
        }
        env.storage().temporary().set(
            &key,
            &AllowanceValue {
                amount: allowance.amount - amount,
                expiration_ledger: allowance.expiration_ledger,
            },
        );

        move_balance(&env, &tranche_id, &from, &to, amount)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn allowance(env: Env, tranche_id: BytesN<32>, from: Address, spender: Address) -> i128 {
        read_allowance(
            &env,
            &DataKey::Allowance(AllowanceDataKey {
                tranche_id,
                from,
                spender,
            }),
        )
        .amount
    }

    /// Get balance of a holder in a tranche
    pub fn balance_of(env: Env, tranche_id: BytesN<32>, holder: Address) -> i128 {
        read_balance(&env, &tranche_id, &holder)
    }

    /// Total minted minus burned for a tranche, zero when unknown
    pub fn total_supply(env: Env, tranche_id: BytesN<32>) -> i128 {
        read_tranche(&env, &tranche_id)
            .map(|t| t.total_supply)
            .unwrap_or(0)
    }

    pub fn get_tranche(env: Env, tranche_id: BytesN<32>) -> Result<Tranche, Error> {
        read_tranche(&env, &tranche_id)
    }

    /// Check if address is an operator
    pub fn is_operator(env: Env, address: Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operators(address))
            .unwrap_or(false)
    }
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn check_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Initialized) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn read_tranche(env: &Env, tranche_id: &BytesN<32>) -> Result<Tranche, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Tranche(tranche_id.clone()))
        .ok_or(Error::TrancheNotFound)
}

fn write_tranche(env: &Env, tranche_id: &BytesN<32>, tranche: &Tranche) {
    let key = DataKey::Tranche(tranche_id.clone());
    env.storage().persistent().set(&key, tranche);
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

/// Loads the tranche and checks that `controller` owns it before requiring
/// its signature.
fn read_controlled(
    env: &Env,
    tranche_id: &BytesN<32>,
    controller: &Address,
) -> Result<Tranche, Error> {
    let tranche = read_tranche(env, tranche_id)?;
    if tranche.controller != *controller {
        return Err(Error::Unauthorized);
    }
    controller.require_auth();
    Ok(tranche)
}

fn read_balance(env: &Env, tranche_id: &BytesN<32>, holder: &Address) -> i128 {
    let key = DataKey::Balance(tranche_id.clone(), holder.clone());
    match env.storage().persistent().get::<DataKey, Balance>(&key) {
        Some(balance) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
            balance.amount
        }
        None => 0,
    }
}

fn write_balance(env: &Env, tranche_id: &BytesN<32>, holder: &Address, amount: i128) {
    let key = DataKey::Balance(tranche_id.clone(), holder.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &Balance { amount });
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

fn read_allowance(env: &Env, key: &DataKey) -> AllowanceValue {
    match env.storage().temporary().get::<DataKey, AllowanceValue>(key) {
        Some(allowance) if allowance.expiration_ledger >= env.ledger().sequence() => allowance,
        _ => AllowanceValue {
            amount: 0,
            expiration_ledger: 0,
        },
    }
}

fn move_balance(
    env: &Env,
    tranche_id: &BytesN<32>,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), Error> {
    read_tranche(env, tranche_id)?;

    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let from_balance = read_balance(env, tranche_id, from);
    if from_balance < amount {
        return Err(Error::InsufficientBalance);
    }
    write_balance(env, tranche_id, from, from_balance - amount);

    let to_balance = read_balance(env, tranche_id, to);
    let new_to_balance = to_balance.checked_add(amount).ok_or(Error::InvalidAmount)?;
    write_balance(env, tranche_id, to, new_to_balance);

    env.events().publish(
        (Symbol::new(env, "transfer"), tranche_id.clone()),
        TransferEvent {
            tranche_id: tranche_id.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        },
    );

    Ok(())
}
