use soroban_sdk::{contracttype, Address, String};

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimFiledEvent {
    pub pool: Address,
    pub nonce: u32,
    pub index: u32,
    pub filed_by: Address,
    pub fee: i128,
    pub forced: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimValidatedEvent {
    pub pool: Address,
    pub nonce: u32,
    pub index: u32,
    pub valid: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimDecidedEvent {
    pub pool: Address,
    pub nonce: u32,
    pub index: u32,
    pub accepted: bool,
    /// Deny imposed because the decision window had closed, or because
    /// another claim on the same nonce was accepted first
    pub forced_deny: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolRegisteredEvent {
    pub name: String,
    pub pool: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CvcUpdatedEvent {
    pub pool: Address,
    pub cvc: Address,
    pub added: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimFeeUpdatedEvent {
    pub pool: Address,
    pub fee: i128,
}
