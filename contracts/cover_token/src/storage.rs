use soroban_sdk::{contracttype, Address, BytesN, String};

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub(crate) const BALANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const BALANCE_LIFETIME_THRESHOLD: u32 = BALANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Balance {
    pub amount: i128,
}

/// Metadata and supply of one claim or no-claim tranche.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tranche {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    /// The only address allowed to mint and burn this tranche
    pub controller: Address,
    pub total_supply: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct AllowanceDataKey {
    pub tranche_id: BytesN<32>,
    pub from: Address,
    pub spender: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Operators(Address),
    Tranche(BytesN<32>),
    Balance(BytesN<32>, Address), // (tranche_id, holder)
    Allowance(AllowanceDataKey),
    Initialized,
}
