use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

#[contracttype]
#[derive(Clone, Debug)]
pub struct CoverCreatedEvent {
    pub cover_id: BytesN<32>,
    pub name: String,
    pub collateral: Address,
    pub expiry: Option<u64>,
    pub claim_nonce: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CoverDeployedEvent {
    pub cover_id: BytesN<32>,
    pub tranches_registered: u32,
    pub complete: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CoverExtendedEvent {
    pub cover_id: BytesN<32>,
    pub risk: String,
    pub claim_token: BytesN<32>,
    pub future_token: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FutureConvertedEvent {
    pub cover_id: BytesN<32>,
    pub holder: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CoverAddedEvent {
    pub cover_id: BytesN<32>,
    pub depositor: Address,
    pub collateral_amount: i128,
    pub tranche_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CollateralRedeemedEvent {
    pub cover_id: BytesN<32>,
    pub holder: Address,
    pub tranche_amount: i128,
    pub no_claim_only: bool,
    pub payout: i128,
    pub fee: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimRedeemedEvent {
    pub cover_id: BytesN<32>,
    pub holder: Address,
    pub claim_nonce: u32,
    pub payout: i128,
    pub fee: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimEnactedEvent {
    pub claim_nonce: u32,
    pub risks: Vec<String>,
    pub payout_rates: Vec<i128>,
    pub payout_denominator: i128,
    pub incident_timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RiskUpdatedEvent {
    pub risk: String,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CollateralUpdatedEvent {
    pub collateral: Address,
    pub deposit_ratio: i128,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ExpiryUpdatedEvent {
    pub expiry: u64,
    pub name: String,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FeesUpdatedEvent {
    pub numerator: i128,
    pub denominator: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoleUpdatedEvent {
    pub role: String,
    pub old: Address,
    pub new: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DelayUpdatedEvent {
    pub claim_redeem_delay: u64,
    pub no_claim_redeem_delay: u64,
}
