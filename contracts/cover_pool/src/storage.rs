use crate::error::Error;
use crate::types::{
    CollateralInfo, CoverInfo, DataKey, ExpiryInfo, PoolClaim, PoolState, Roles,
};
use soroban_sdk::{Address, BytesN, Env, String, Vec};

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub(crate) const RECORD_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub(crate) const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - 7 * DAY_IN_LEDGERS;

pub struct Storage;

impl Storage {
    pub fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    pub fn is_initialized(env: &Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    pub fn set_initialized(env: &Env) {
        env.storage().instance().set(&DataKey::Initialized, &true);
    }

    // Pool state
    pub fn get_pool(env: &Env) -> Result<PoolState, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Pool)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_pool(env: &Env, pool: &PoolState) {
        env.storage().instance().set(&DataKey::Pool, pool);
        Self::bump_instance(env);
    }

    // Roles
    pub fn get_roles(env: &Env) -> Result<Roles, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Roles)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_roles(env: &Env, roles: &Roles) {
        env.storage().instance().set(&DataKey::Roles, roles);
    }

    // Risks
    pub fn get_risks(env: &Env) -> Vec<String> {
        env.storage()
            .instance()
            .get(&DataKey::Risks)
            .unwrap_or(Vec::new(env))
    }

    pub fn set_risks(env: &Env, risks: &Vec<String>) {
        env.storage().instance().set(&DataKey::Risks, risks);
    }

    pub fn get_deleted_risks(env: &Env) -> Vec<String> {
        env.storage()
            .instance()
            .get(&DataKey::DeletedRisks)
            .unwrap_or(Vec::new(env))
    }

    pub fn set_deleted_risks(env: &Env, risks: &Vec<String>) {
        env.storage().instance().set(&DataKey::DeletedRisks, risks);
    }

    // Collaterals
    pub fn get_collaterals(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::Collaterals)
            .unwrap_or(Vec::new(env))
    }

    pub fn get_collateral(env: &Env, collateral: &Address) -> Option<CollateralInfo> {
        env.storage()
            .instance()
            .get(&DataKey::Collateral(collateral.clone()))
    }

    /// Stores the info and records the collateral the first time it is seen.
    pub fn set_collateral(env: &Env, collateral: &Address, info: &CollateralInfo) {
        let mut list = Self::get_collaterals(env);
        if !list.iter().any(|c| c == *collateral) {
            list.push_back(collateral.clone());
            env.storage().instance().set(&DataKey::Collaterals, &list);
        }
        env.storage()
            .instance()
            .set(&DataKey::Collateral(collateral.clone()), info);
    }

    // Expiries
    pub fn get_expiries(env: &Env) -> Vec<u64> {
        env.storage()
            .instance()
            .get(&DataKey::Expiries)
            .unwrap_or(Vec::new(env))
    }

    pub fn get_expiry(env: &Env, expiry: u64) -> Option<ExpiryInfo> {
        env.storage().instance().get(&DataKey::Expiry(expiry))
    }

    pub fn set_expiry(env: &Env, expiry: u64, info: &ExpiryInfo) {
        let mut list = Self::get_expiries(env);
        if !list.iter().any(|e| e == expiry) {
            list.push_back(expiry);
            env.storage().instance().set(&DataKey::Expiries, &list);
        }
        env.storage().instance().set(&DataKey::Expiry(expiry), info);
    }

    // Covers
    pub fn get_cover(env: &Env, cover_id: &BytesN<32>) -> Option<CoverInfo> {
        let key = DataKey::Cover(cover_id.clone());
        let cover: Option<CoverInfo> = env.storage().persistent().get(&key);
        if cover.is_some() {
            env.storage()
                .persistent()
                .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
        }
        cover
    }

    pub fn set_cover(env: &Env, cover: &CoverInfo) {
        let key = DataKey::Cover(cover.id.clone());
        env.storage().persistent().set(&key, cover);
        env.storage()
            .persistent()
            .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
    }

    pub fn get_all_covers(env: &Env) -> Vec<BytesN<32>> {
        env.storage()
            .persistent()
            .get(&DataKey::AllCovers)
            .unwrap_or(Vec::new(env))
    }

    pub fn get_active_covers(env: &Env) -> Vec<BytesN<32>> {
        env.storage()
            .instance()
            .get(&DataKey::ActiveCovers)
            .unwrap_or(Vec::new(env))
    }

    pub fn push_cover(env: &Env, cover_id: &BytesN<32>) {
        let mut all = Self::get_all_covers(env);
        all.push_back(cover_id.clone());
        env.storage().persistent().set(&DataKey::AllCovers, &all);
        env.storage().persistent().extend_ttl(
            &DataKey::AllCovers,
            RECORD_LIFETIME_THRESHOLD,
            RECORD_BUMP_AMOUNT,
        );

        let mut active = Self::get_active_covers(env);
        active.push_back(cover_id.clone());
        env.storage().instance().set(&DataKey::ActiveCovers, &active);
    }

    pub fn clear_active_covers(env: &Env) {
        env.storage().instance().remove(&DataKey::ActiveCovers);
    }

    // Claims
    pub fn get_claim(env: &Env, nonce: u32) -> Option<PoolClaim> {
        env.storage().persistent().get(&DataKey::Claim(nonce))
    }

    pub fn set_claim(env: &Env, claim: &PoolClaim) {
        let key = DataKey::Claim(claim.nonce);
        env.storage().persistent().set(&key, claim);
        env.storage()
            .persistent()
            .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
    }
}
