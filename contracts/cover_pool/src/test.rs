use super::*;
use cover_token::{CoverToken, CoverTokenClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, vec, Address, BytesN, Env, String, Vec,
};

const DAI: i128 = SCALE;
const NOW: u64 = 1_700_000_000;

struct Setup<'a> {
    env: Env,
    pool: CoverPoolClient<'a>,
    tranches: CoverTokenClient<'a>,
    dai: Address,
    owner: Address,
    governance: Address,
    claim_manager: Address,
    treasury: Address,
    expiry: u64,
}

fn setup<'a>(risks: &[&str], extendable: bool) -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| li.timestamp = NOW);

    let owner = Address::generate(&env);
    let governance = Address::generate(&env);
    let claim_manager = Address::generate(&env);
    let treasury = Address::generate(&env);

    let token_id = env.register_contract(None, CoverToken);
    let tranches = CoverTokenClient::new(&env, &token_id);
    tranches.initialize(&owner);

    let pool_id = env.register_contract(None, CoverPool);
    let pool = CoverPoolClient::new(&env, &pool_id);
    tranches.add_operator(&pool_id);

    let dai = env.register_stellar_asset_contract_v2(owner.clone()).address();

    let mut risk_list = Vec::new(&env);
    for risk in risks {
        risk_list.push_back(String::from_str(&env, risk));
    }

    let expiry = NOW + 30 * DAY;
    pool.initialize(&PoolParams {
        name: String::from_str(&env, "Pool1"),
        extendable,
        risks: risk_list,
        collateral: dai.clone(),
        deposit_ratio: SCALE,
        expiry,
        expiry_name: String::from_str(&env, "2050_12_31"),
        owner: owner.clone(),
        governance: governance.clone(),
        claim_manager: claim_manager.clone(),
        treasury: treasury.clone(),
        cover_token: token_id,
    });

    Setup {
        env,
        pool,
        tranches,
        dai,
        owner,
        governance,
        claim_manager,
        treasury,
        expiry,
    }
}

fn default_setup<'a>() -> Setup<'a> {
    setup(&["Binance", "Curve"], true)
}

fn s(env: &Env, value: &str) -> String {
    String::from_str(env, value)
}

fn funded_user(t: &Setup, amount: i128) -> Address {
    let user = Address::generate(&t.env);
    token::StellarAssetClient::new(&t.env, &t.dai).mint(&user, &amount);
    user
}

fn dai_balance(t: &Setup, who: &Address) -> i128 {
    token::Client::new(&t.env, &t.dai).balance(who)
}

fn claim_token(t: &Setup, cover_id: &BytesN<32>, index: u32) -> BytesN<32> {
    t.pool.get_cover(cover_id).claim_tokens.get(index).unwrap()
}

fn future_token(t: &Setup, cover_id: &BytesN<32>, index: u32) -> BytesN<32> {
    t.pool.get_cover(cover_id).future_tokens.get(index).unwrap()
}

fn no_claim_token(t: &Setup, cover_id: &BytesN<32>) -> BytesN<32> {
    t.pool.get_cover(cover_id).no_claim_token
}

fn set_time(t: &Setup, timestamp: u64) {
    t.env.ledger().with_mut(|li| li.timestamp = timestamp);
}

fn expected_fee(gross: i128, numerator: i128, denominator: i128, elapsed: u64) -> i128 {
    let den = denominator * YEAR as i128;
    (gross * numerator * elapsed as i128 + den - 1) / den
}

/// No-claim supply matches collateral held, the future chain and every
/// active claim supply.
fn assert_supply_invariant(t: &Setup, cover_id: &BytesN<32>) {
    let cover = t.pool.get_cover(cover_id);
    let active = t.pool.get_pool_details().risks;
    let no_claim_supply = t.tranches.total_supply(&cover.no_claim_token);
    assert_eq!(no_claim_supply, cover.collateral_held);
    let future_supply: i128 = cover
        .future_tokens
        .iter()
        .map(|token_id| t.tranches.total_supply(&token_id))
        .sum();
    assert_eq!(future_supply, no_claim_supply);
    for (risk, token_id) in cover.risks.iter().zip(cover.claim_tokens.iter()) {
        if active.iter().any(|r| r == risk) {
            assert_eq!(t.tranches.total_supply(&token_id), no_claim_supply);
        }
    }
}

#[test]
fn test_initialize() {
    let t = default_setup();

    let details = t.pool.get_pool_details();
    assert_eq!(details.name, s(&t.env, "Pool1"));
    assert!(details.active);
    assert!(details.extendable);
    assert_eq!(details.claim_nonce, 0);
    assert_eq!(details.claim_redeem_delay, 2 * DAY);
    assert_eq!(details.no_claim_redeem_delay, 10 * DAY);
    assert_eq!(details.risks.len(), 2);
    assert_eq!(details.collaterals, vec![&t.env, t.dai.clone()]);
    assert_eq!(details.expiries, vec![&t.env, t.expiry]);
    assert_eq!(details.all_covers.len(), 0);

    let info = t.pool.get_collateral_info(&t.dai);
    assert_eq!(info.deposit_ratio, SCALE);
    assert_eq!(info.status, Status::Active);

    let params = PoolParams {
        name: s(&t.env, "Pool1"),
        extendable: true,
        risks: vec![&t.env, s(&t.env, "Binance")],
        collateral: t.dai.clone(),
        deposit_ratio: SCALE,
        expiry: t.expiry,
        expiry_name: s(&t.env, "2050_12_31"),
        owner: t.owner.clone(),
        governance: t.governance.clone(),
        claim_manager: t.claim_manager.clone(),
        treasury: t.treasury.clone(),
        cover_token: t.dai.clone(),
    };
    assert_eq!(
        t.pool.try_initialize(&params),
        Err(Ok(Error::AlreadyInitialized))
    );
}

#[test]
fn test_add_cover_mints_every_tranche() {
    let t = default_setup();
    let user = funded_user(&t, 100 * DAI);

    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    assert_eq!(cover_id, t.pool.get_current_cover_id(&t.dai, &Some(t.expiry)));
    assert_eq!(cover_id, t.pool.compute_cover_id(&t.dai, &Some(t.expiry), &0));

    let nc = no_claim_token(&t, &cover_id);
    assert_eq!(t.tranches.balance_of(&nc, &user), 10 * DAI);
    assert_eq!(t.tranches.balance_of(&claim_token(&t, &cover_id, 0), &user), 10 * DAI);
    assert_eq!(t.tranches.balance_of(&claim_token(&t, &cover_id, 1), &user), 10 * DAI);
    assert_eq!(t.tranches.balance_of(&future_token(&t, &cover_id, 0), &user), 10 * DAI);
    assert_eq!(dai_balance(&t, &t.pool.address), 10 * DAI);
    assert_eq!(dai_balance(&t, &user), 90 * DAI);

    let cover = t.pool.get_cover(&cover_id);
    assert_eq!(cover.collateral_held, 10 * DAI);
    assert_eq!(cover.expiry, Some(t.expiry));
    assert!(cover.deploy_complete);
    assert_eq!(
        nc,
        t.pool.compute_tranche_id(&cover_id, &TrancheKind::NoClaim)
    );
    assert_eq!(
        claim_token(&t, &cover_id, 1),
        t.pool
            .compute_tranche_id(&cover_id, &TrancheKind::Claim(s(&t.env, "Curve")))
    );
    assert_eq!(
        future_token(&t, &cover_id, 0),
        t.pool.compute_tranche_id(&cover_id, &TrancheKind::Future(0))
    );

    let tranche = t.tranches.get_tranche(&nc);
    assert_eq!(tranche.controller, t.pool.address);

    // A second deposit lands in the same cover
    let again = t.pool.add_cover(&user, &t.dai, &t.expiry, &(5 * DAI));
    assert_eq!(again, cover_id);
    assert_eq!(t.pool.get_pool_details().all_covers.len(), 1);
    assert_supply_invariant(&t, &cover_id);
}

#[test]
fn test_round_trip_without_fee() {
    let t = default_setup();
    t.pool.set_fees(&t.governance, &0, &1);
    let user = funded_user(&t, 10 * DAI);

    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));
    set_time(&t, NOW + 5 * DAY);
    let payout = t.pool.redeem_collateral(&user, &cover_id, &(10 * DAI));

    assert_eq!(payout, 10 * DAI);
    assert_eq!(dai_balance(&t, &user), 10 * DAI);
    assert_eq!(t.tranches.total_supply(&no_claim_token(&t, &cover_id)), 0);
    assert_eq!(t.tranches.total_supply(&claim_token(&t, &cover_id, 0)), 0);
    assert_eq!(t.tranches.total_supply(&claim_token(&t, &cover_id, 1)), 0);
    assert_eq!(t.pool.get_cover(&cover_id).collateral_held, 0);
}

#[test]
fn test_redeem_fee_is_prorated() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);

    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));
    set_time(&t, NOW + 15 * DAY);
    let payout = t.pool.redeem_collateral(&user, &cover_id, &(4 * DAI));

    let fee = expected_fee(4 * DAI, 6, 1000, 15 * DAY);
    assert!(fee > 0);
    assert_eq!(payout, 4 * DAI - fee);
    assert_eq!(dai_balance(&t, &t.treasury), fee);
    assert_eq!(dai_balance(&t, &user), 4 * DAI - fee);
    assert_supply_invariant(&t, &cover_id);
}

#[test]
fn test_dust_amounts() {
    let t = default_setup();
    let user = funded_user(&t, 10);

    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &1);
    assert_eq!(t.pool.redeem_collateral(&user, &cover_id, &1), 1);

    t.pool.add_cover(&user, &t.dai, &t.expiry, &1);
    set_time(&t, NOW + DAY);
    // The fee rounds up, so a single unit goes to the treasury
    assert_eq!(t.pool.redeem_collateral(&user, &cover_id, &1), 0);
    assert_eq!(dai_balance(&t, &t.treasury), 1);

    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &t.expiry, &0),
        Err(Ok(Error::InvalidAmount))
    );
    assert_eq!(
        t.pool.try_redeem_collateral(&user, &cover_id, &0),
        Err(Ok(Error::InvalidAmount))
    );
}

#[test]
fn test_add_cover_after_expiry_fails() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    set_time(&t, t.expiry);

    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &t.expiry, &DAI),
        Err(Ok(Error::CoverExpired))
    );
}

#[test]
fn test_add_cover_preconditions() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);

    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &(t.expiry + DAY), &DAI),
        Err(Ok(Error::ExpiryNotActive))
    );

    let other = t.env.register_stellar_asset_contract_v2(t.owner.clone()).address();
    assert_eq!(
        t.pool.try_add_cover(&user, &other, &t.expiry, &DAI),
        Err(Ok(Error::CollateralNotActive))
    );

    t.pool
        .set_collateral(&t.owner, &t.dai, &SCALE, &Status::Disabled);
    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &t.expiry, &DAI),
        Err(Ok(Error::CollateralNotActive))
    );
    t.pool.set_collateral(&t.owner, &t.dai, &SCALE, &Status::Active);

    t.pool.set_active(&t.owner, &false);
    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &t.expiry, &DAI),
        Err(Ok(Error::PoolNotActive))
    );
}

#[test]
fn test_deposit_ratio_snapshot() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    let usdc = t.env.register_stellar_asset_contract_v2(t.owner.clone()).address();
    token::StellarAssetClient::new(&t.env, &usdc).mint(&user, &(10 * DAI));

    t.pool.set_collateral(&t.owner, &usdc, &(2 * SCALE), &Status::Active);
    let cover_id = t.pool.add_cover(&user, &usdc, &t.expiry, &(5 * DAI));

    assert_eq!(
        t.tranches.balance_of(&no_claim_token(&t, &cover_id), &user),
        10 * DAI
    );
    assert_eq!(t.pool.get_cover(&cover_id).deposit_ratio, 2 * SCALE);
    assert_eq!(t.pool.get_pool_details().collaterals.len(), 2);
}

#[test]
fn test_over_redemption_fails() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    let other = Address::generate(&t.env);
    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    assert_eq!(
        t.pool.try_redeem_collateral(&user, &cover_id, &(11 * DAI)),
        Err(Ok(Error::InsufficientBalance))
    );

    // Missing one active claim tranche blocks the full-set redemption
    t.tranches
        .transfer(&claim_token(&t, &cover_id, 1), &user, &other, &DAI);
    assert_eq!(
        t.pool.try_redeem_collateral(&user, &cover_id, &(10 * DAI)),
        Err(Ok(Error::InsufficientBalance))
    );
    t.pool.redeem_collateral(&user, &cover_id, &(9 * DAI));
    assert_supply_invariant(&t, &cover_id);

    let unknown = BytesN::from_array(&t.env, &[0u8; 32]);
    assert_eq!(
        t.pool.try_redeem_collateral(&user, &unknown, &DAI),
        Err(Ok(Error::CoverNotFound))
    );
}

#[test]
fn test_risk_lifecycle() {
    let t = default_setup();
    let binance = s(&t.env, "Binance");
    let curve = s(&t.env, "Curve");

    t.pool.delete_risk(&t.owner, &curve);
    let details = t.pool.get_pool_details();
    assert_eq!(details.risks, vec![&t.env, binance.clone()]);
    assert_eq!(details.deleted_risks, vec![&t.env, curve.clone()]);

    assert_eq!(
        t.pool.try_delete_risk(&t.owner, &curve),
        Err(Ok(Error::RiskNotActive))
    );
    assert_eq!(
        t.pool.try_add_risk(&t.owner, &curve),
        Err(Ok(Error::DeletedRiskNotAllowed))
    );
    assert_eq!(
        t.pool.try_delete_risk(&t.owner, &binance),
        Err(Ok(Error::LastRisk))
    );
    assert_eq!(
        t.pool.try_add_risk(&t.owner, &binance),
        Err(Ok(Error::RiskAlreadyActive))
    );
    assert_eq!(
        t.pool.try_add_risk(&t.governance, &s(&t.env, "Aave")),
        Err(Ok(Error::Unauthorized))
    );

    t.pool.add_risk(&t.owner, &s(&t.env, "Aave"));
    assert_eq!(t.pool.get_pool_details().risks.len(), 2);
}

#[test]
fn test_single_risk_cannot_be_deleted() {
    let t = setup(&["Binance"], true);
    assert_eq!(
        t.pool.try_delete_risk(&t.owner, &s(&t.env, "Binance")),
        Err(Ok(Error::LastRisk))
    );
}

#[test]
fn test_closed_pool_cannot_add_risk() {
    let t = setup(&["Binance", "Curve"], false);
    assert_eq!(
        t.pool.try_add_risk(&t.owner, &s(&t.env, "Aave")),
        Err(Ok(Error::PoolNotExtendable))
    );
    t.pool.delete_risk(&t.owner, &s(&t.env, "Curve"));
    assert_eq!(t.pool.get_pool_details().risks.len(), 1);
}

#[test]
fn test_deleted_risk_tranche_left_untouched() {
    let t = default_setup();
    t.pool.set_fees(&t.governance, &0, &1);
    let user = funded_user(&t, 20 * DAI);
    let other = Address::generate(&t.env);

    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));
    let curve_token = claim_token(&t, &cover_id, 1);
    t.pool.delete_risk(&t.owner, &s(&t.env, "Curve"));

    // Deleted risk tranches get no new mints
    t.pool.add_cover(&user, &t.dai, &t.expiry, &(5 * DAI));
    assert_eq!(t.tranches.balance_of(&curve_token, &user), 10 * DAI);
    assert_eq!(
        t.tranches.balance_of(&claim_token(&t, &cover_id, 0), &user),
        15 * DAI
    );

    // Holding deleted risk tranches is optional and they are not burned
    t.tranches.transfer(&curve_token, &user, &other, &(10 * DAI));
    t.pool.redeem_collateral(&user, &cover_id, &(15 * DAI));
    assert_eq!(dai_balance(&t, &user), 20 * DAI);
    assert_eq!(t.tranches.total_supply(&curve_token), 10 * DAI);
    assert_supply_invariant(&t, &cover_id);
}

#[test]
fn test_add_risk_extends_live_covers() {
    let t = default_setup();
    t.pool.set_fees(&t.governance, &0, &1);
    let user_a = funded_user(&t, 10 * DAI);
    let user_b = funded_user(&t, 20 * DAI);
    let cover_id = t.pool.add_cover(&user_a, &t.dai, &t.expiry, &(10 * DAI));

    let aave = s(&t.env, "Aave");
    let cream = s(&t.env, "Cream");
    t.pool.add_risk(&t.owner, &aave);
    t.pool.add_risk(&t.owner, &cream);

    let cover = t.pool.get_cover(&cover_id);
    assert_eq!(cover.risks.len(), 4);
    assert_eq!(cover.claim_tokens.len(), 4);
    assert_eq!(cover.future_tokens.len(), 3);
    assert_eq!(cover.future_risks, vec![&t.env, aave.clone(), cream.clone()]);
    assert!(cover.deploy_complete);
    assert_eq!(
        claim_token(&t, &cover_id, 2),
        t.pool.compute_tranche_id(&cover_id, &TrancheKind::Claim(aave.clone()))
    );
    assert_eq!(
        future_token(&t, &cover_id, 2),
        t.pool.compute_tranche_id(&cover_id, &TrancheKind::Future(2))
    );

    // Earlier depositors hold the first future tranche, not the current one
    assert_eq!(
        t.tranches.balance_of(&future_token(&t, &cover_id, 0), &user_a),
        10 * DAI
    );
    assert_eq!(
        t.pool.try_redeem_collateral(&user_a, &cover_id, &(10 * DAI)),
        Err(Ok(Error::InsufficientBalance))
    );

    assert_eq!(t.pool.convert(&user_a, &cover_id), 10 * DAI);
    assert_eq!(t.tranches.balance_of(&future_token(&t, &cover_id, 0), &user_a), 0);
    assert_eq!(t.tranches.balance_of(&future_token(&t, &cover_id, 1), &user_a), 0);
    assert_eq!(
        t.tranches.balance_of(&future_token(&t, &cover_id, 2), &user_a),
        10 * DAI
    );
    assert_eq!(
        t.pool.try_convert(&user_a, &cover_id),
        Err(Ok(Error::InsufficientBalance))
    );

    // New deposits mint every claim tranche and the current future tranche
    t.pool.add_cover(&user_b, &t.dai, &t.expiry, &(20 * DAI));
    for token_id in t.pool.get_cover(&cover_id).claim_tokens.iter() {
        assert_eq!(t.tranches.balance_of(&token_id, &user_a), 10 * DAI);
        assert_eq!(t.tranches.balance_of(&token_id, &user_b), 20 * DAI);
    }
    assert_eq!(
        t.tranches.balance_of(&future_token(&t, &cover_id, 2), &user_b),
        20 * DAI
    );
    assert_supply_invariant(&t, &cover_id);

    assert_eq!(t.pool.redeem_collateral(&user_a, &cover_id, &(10 * DAI)), 10 * DAI);
    for token_id in t.pool.get_cover(&cover_id).claim_tokens.iter() {
        assert_eq!(t.tranches.balance_of(&token_id, &user_a), 0);
    }
    assert_eq!(t.tranches.balance_of(&future_token(&t, &cover_id, 2), &user_a), 0);
    assert_supply_invariant(&t, &cover_id);

    // Covers created afterwards start with the full risk set
    let perp = t.pool.add_perp_cover(&user_b, &t.dai, &DAI);
    let perp_cover = t.pool.get_cover(&perp);
    assert_eq!(perp_cover.risks.len(), 4);
    assert_eq!(perp_cover.future_tokens.len(), 1);
    assert_supply_invariant(&t, &perp);
}

#[test]
fn test_convert_skips_deleted_risks() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    let aave = s(&t.env, "Aave");
    t.pool.add_risk(&t.owner, &aave);
    t.pool.delete_risk(&t.owner, &aave);

    assert_eq!(t.pool.convert(&user, &cover_id), 10 * DAI);
    assert_eq!(t.tranches.balance_of(&claim_token(&t, &cover_id, 2), &user), 0);
    assert_eq!(
        t.tranches.balance_of(&future_token(&t, &cover_id, 1), &user),
        10 * DAI
    );

    let unknown = BytesN::from_array(&t.env, &[0u8; 32]);
    assert_eq!(
        t.pool.try_convert(&user, &unknown),
        Err(Ok(Error::CoverNotFound))
    );
}

#[test]
fn test_same_name_pools_share_tranche_ledger() {
    let t = default_setup();
    let user = funded_user(&t, 20 * DAI);

    let second_id = t.env.register_contract(None, CoverPool);
    let second = CoverPoolClient::new(&t.env, &second_id);
    t.tranches.add_operator(&second_id);
    second.initialize(&PoolParams {
        name: s(&t.env, "Pool1"),
        extendable: true,
        risks: vec![&t.env, s(&t.env, "Binance"), s(&t.env, "Curve")],
        collateral: t.dai.clone(),
        deposit_ratio: SCALE,
        expiry: t.expiry,
        expiry_name: s(&t.env, "2050_12_31"),
        owner: t.owner.clone(),
        governance: t.governance.clone(),
        claim_manager: t.claim_manager.clone(),
        treasury: t.treasury.clone(),
        cover_token: t.tranches.address.clone(),
    });

    let first_cover = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));
    let second_cover = second.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));
    assert_ne!(first_cover, second_cover);
    assert_ne!(
        no_claim_token(&t, &first_cover),
        second.get_cover(&second_cover).no_claim_token
    );
    assert_eq!(
        t.tranches.get_tranche(&second.get_cover(&second_cover).no_claim_token).controller,
        second_id
    );
    assert_eq!(dai_balance(&t, &second_id), 10 * DAI);
}

#[test]
fn test_claim_payout_split() {
    let t = default_setup();
    t.pool.set_fees(&t.governance, &0, &1);
    let user_a = funded_user(&t, 10 * DAI);
    let user_b = Address::generate(&t.env);

    let cover_id = t.pool.add_cover(&user_a, &t.dai, &t.expiry, &(10 * DAI));
    let nc = no_claim_token(&t, &cover_id);
    t.tranches.transfer(&nc, &user_a, &t.owner, &(6 * DAI));

    set_time(&t, NOW + DAY);
    t.pool.enact_claim(
        &t.claim_manager,
        &vec![&t.env, s(&t.env, "Binance"), s(&t.env, "Curve")],
        &vec![&t.env, 40, 20],
        &100,
        &NOW,
        &0,
    );
    assert_eq!(t.pool.get_claim_nonce(), 1);
    assert_eq!(t.pool.get_pool_details().active_covers.len(), 0);

    assert_eq!(
        t.pool.try_redeem_claim(&user_a, &cover_id),
        Err(Ok(Error::RedeemDelayNotPassed))
    );
    assert_eq!(
        t.pool.try_redeem_collateral(&user_a, &cover_id, &DAI),
        Err(Ok(Error::ClaimAccepted))
    );

    // 10 × 40% + 10 × 20% + 4 × 40%
    assert_eq!(t.pool.view_claimable(&cover_id, &user_a), 76 * DAI / 10);
    // 6 × 40%
    assert_eq!(t.pool.view_claimable(&cover_id, &t.owner), 24 * DAI / 10);

    set_time(&t, NOW + 3 * DAY);
    assert_eq!(t.pool.redeem_claim(&user_a, &cover_id), 76 * DAI / 10);
    assert_eq!(t.pool.redeem_claim(&t.owner, &cover_id), 24 * DAI / 10);

    assert_eq!(t.tranches.total_supply(&nc), 0);
    assert_eq!(t.tranches.total_supply(&claim_token(&t, &cover_id, 0)), 0);
    assert_eq!(t.tranches.total_supply(&claim_token(&t, &cover_id, 1)), 0);
    assert_eq!(dai_balance(&t, &t.pool.address), 0);

    assert_eq!(
        t.pool.try_redeem_claim(&user_b, &cover_id),
        Err(Ok(Error::InsufficientBalance))
    );
}

#[test]
fn test_claim_redeem_charges_fee() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    set_time(&t, NOW + 10 * DAY);
    t.pool.enact_claim(
        &t.claim_manager,
        &vec![&t.env, s(&t.env, "Binance")],
        &vec![&t.env, 50],
        &100,
        &(NOW + 9 * DAY),
        &0,
    );
    set_time(&t, NOW + 12 * DAY);

    let claimable = t.pool.view_claimable(&cover_id, &user);
    assert_eq!(claimable, 10 * DAI);
    let payout = t.pool.redeem_claim(&user, &cover_id);
    let fee = expected_fee(10 * DAI, 6, 1000, 12 * DAY);
    assert_eq!(payout, claimable - fee);
    assert_eq!(dai_balance(&t, &t.treasury), fee);
}

#[test]
fn test_new_nonce_opens_new_cover() {
    let t = default_setup();
    let user = funded_user(&t, 20 * DAI);
    let old = t.pool.add_cover(&user, &t.dai, &t.expiry, &(5 * DAI));

    t.pool.enact_claim(
        &t.claim_manager,
        &vec![&t.env, s(&t.env, "Curve")],
        &vec![&t.env, 1],
        &1,
        &NOW,
        &0,
    );

    let new = t.pool.add_cover(&user, &t.dai, &t.expiry, &(5 * DAI));
    assert_ne!(new, old);
    assert_eq!(t.pool.get_cover(&new).claim_nonce, 1);
    assert_eq!(t.pool.compute_cover_id(&t.dai, &Some(t.expiry), &0), old);

    let details = t.pool.get_pool_details();
    assert_eq!(details.all_covers.len(), 2);
    assert_eq!(details.active_covers, vec![&t.env, new.clone()]);

    // Fresh tranches under the new nonce
    assert_eq!(
        t.tranches.balance_of(&no_claim_token(&t, &new), &user),
        5 * DAI
    );
    assert_eq!(t.pool.redeem_collateral(&user, &new, &DAI), DAI);
}

#[test]
fn test_incident_after_expiry_pays_no_claim_holders() {
    let t = default_setup();
    let user = funded_user(&t, 10 * DAI);
    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    set_time(&t, t.expiry + DAY);
    t.pool.enact_claim(
        &t.claim_manager,
        &vec![&t.env, s(&t.env, "Binance")],
        &vec![&t.env, 40],
        &100,
        &(t.expiry + 1),
        &0,
    );
    set_time(&t, t.expiry + 3 * DAY);
    assert_eq!(
        t.pool.try_redeem_claim(&user, &cover_id),
        Err(Ok(Error::IncidentAfterExpiry))
    );
    assert_eq!(t.pool.view_claimable(&cover_id, &user), 0);

    set_time(&t, t.expiry + 10 * DAY);
    let payout = t.pool.redeem_collateral(&user, &cover_id, &(10 * DAI));

    let fee = expected_fee(10 * DAI, 6, 1000, 30 * DAY);
    assert_eq!(payout, 10 * DAI - fee);
    assert_eq!(t.tranches.total_supply(&no_claim_token(&t, &cover_id)), 0);
    // Claim tranches are worthless now and stay outstanding
    assert_eq!(
        t.tranches.total_supply(&claim_token(&t, &cover_id, 0)),
        10 * DAI
    );
    assert_eq!(dai_balance(&t, &t.pool.address), 0);
}

#[test]
fn test_no_claim_only_redeem_waits_for_delay() {
    let t = default_setup();
    t.pool.set_fees(&t.governance, &0, &1);
    let user = funded_user(&t, 10 * DAI);
    let other = Address::generate(&t.env);
    let cover_id = t.pool.add_cover(&user, &t.dai, &t.expiry, &(10 * DAI));

    t.tranches
        .transfer(&claim_token(&t, &cover_id, 0), &user, &other, &(5 * DAI));

    // Past expiry but inside the no-claim delay only full sets redeem
    set_time(&t, t.expiry + DAY);
    assert_eq!(
        t.pool.try_redeem_collateral(&user, &cover_id, &(10 * DAI)),
        Err(Ok(Error::InsufficientBalance))
    );
    assert_eq!(t.pool.redeem_collateral(&user, &cover_id, &(5 * DAI)), 5 * DAI);
    assert_supply_invariant(&t, &cover_id);

    set_time(&t, t.expiry + 10 * DAY);
    assert_eq!(t.pool.redeem_collateral(&user, &cover_id, &(5 * DAI)), 5 * DAI);
    assert_eq!(t.pool.get_cover(&cover_id).collateral_held, 0);
}

#[test]
fn test_enact_claim_validation() {
    let t = default_setup();
    let binance = vec![&t.env, s(&t.env, "Binance")];

    assert_eq!(
        t.pool
            .try_enact_claim(&t.owner, &binance, &vec![&t.env, 1], &1, &NOW, &0),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        t.pool
            .try_enact_claim(&t.claim_manager, &binance, &vec![&t.env, 1], &1, &NOW, &1),
        Err(Ok(Error::NonceMismatch))
    );
    assert_eq!(
        t.pool.try_enact_claim(
            &t.claim_manager,
            &vec![&t.env, s(&t.env, "Cream")],
            &vec![&t.env, 1],
            &1,
            &NOW,
            &0
        ),
        Err(Ok(Error::RiskNotActive))
    );
    assert_eq!(
        t.pool
            .try_enact_claim(&t.claim_manager, &binance, &vec![&t.env, 0], &100, &NOW, &0),
        Err(Ok(Error::InvalidPayoutRates))
    );
    assert_eq!(
        t.pool.try_enact_claim(
            &t.claim_manager,
            &vec![&t.env, s(&t.env, "Binance"), s(&t.env, "Curve")],
            &vec![&t.env, 60, 50],
            &100,
            &NOW,
            &0
        ),
        Err(Ok(Error::InvalidPayoutRates))
    );
    assert_eq!(
        t.pool.try_enact_claim(
            &t.claim_manager,
            &binance,
            &vec![&t.env, 1],
            &1,
            &(NOW + 1),
            &0
        ),
        Err(Ok(Error::InvalidIncidentTimestamp))
    );
}

#[test]
fn test_claim_nonce_increments_by_one() {
    let t = default_setup();
    let binance = vec![&t.env, s(&t.env, "Binance")];

    t.pool
        .enact_claim(&t.claim_manager, &binance, &vec![&t.env, 1], &2, &NOW, &0);
    set_time(&t, NOW + 1);
    t.pool
        .enact_claim(&t.claim_manager, &binance, &vec![&t.env, 2], &2, &NOW, &1);
    assert_eq!(t.pool.get_claim_nonce(), 2);

    assert_eq!(
        t.pool
            .try_enact_claim(&t.claim_manager, &binance, &vec![&t.env, 1], &2, &NOW, &1),
        Err(Ok(Error::NonceMismatch))
    );

    let claim = t.pool.get_claim(&1);
    assert_eq!(claim.nonce, 1);
    assert_eq!(claim.enacted_timestamp, NOW + 1);
    assert_eq!(t.pool.try_get_claim(&2), Err(Ok(Error::ClaimNotAccepted)));
}

#[test]
fn test_large_risk_set_deploys_in_batches() {
    let t = setup(
        &["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8", "R9"],
        true,
    );
    let user = funded_user(&t, 10 * DAI);

    assert_eq!(
        t.pool.try_add_cover(&user, &t.dai, &t.expiry, &DAI),
        Err(Ok(Error::CoverDeployIncomplete))
    );

    assert!(!t.pool.deploy_cover(&t.dai, &Some(t.expiry)));
    let cover_id = t.pool.get_current_cover_id(&t.dai, &Some(t.expiry));
    let cover = t.pool.get_cover(&cover_id);
    assert_eq!(cover.claim_tokens.len(), 8);
    assert!(!cover.deploy_complete);

    assert!(t.pool.deploy_cover(&t.dai, &Some(t.expiry)));
    assert!(t.pool.deploy_cover(&t.dai, &Some(t.expiry)));

    t.pool.add_cover(&user, &t.dai, &t.expiry, &DAI);
    let cover = t.pool.get_cover(&cover_id);
    assert_eq!(cover.claim_tokens.len(), 10);
    for token_id in cover.claim_tokens.iter() {
        assert_eq!(t.tranches.balance_of(&token_id, &user), DAI);
    }
}

#[test]
fn test_perpetual_cover() {
    let t = default_setup();
    let user = funded_user(&t, 20 * DAI);

    let cover_id = t.pool.add_perp_cover(&user, &t.dai, &(10 * DAI));
    assert_eq!(t.pool.get_cover(&cover_id).expiry, None);
    assert_eq!(cover_id, t.pool.get_current_cover_id(&t.dai, &None));

    // No expiry, so redemptions stay open long after any expiry would pass
    set_time(&t, NOW + 400 * DAY);
    let payout = t.pool.redeem_collateral(&user, &cover_id, &(5 * DAI));
    assert_eq!(payout, 5 * DAI - expected_fee(5 * DAI, 6, 1000, 400 * DAY));

    t.pool.enact_claim(
        &t.claim_manager,
        &vec![&t.env, s(&t.env, "Curve")],
        &vec![&t.env, 1],
        &1,
        &(NOW + 399 * DAY),
        &0,
    );
    set_time(&t, NOW + 402 * DAY);
    assert_eq!(t.pool.view_claimable(&cover_id, &user), 5 * DAI);
    t.pool.redeem_claim(&user, &cover_id);
    assert_eq!(t.pool.get_cover(&cover_id).collateral_held, 0);
}

#[test]
fn test_fee_and_delay_setters() {
    let t = default_setup();

    assert_eq!(
        t.pool.try_set_fees(&t.governance, &100, &1000),
        Err(Ok(Error::InvalidFeeRate))
    );
    assert_eq!(
        t.pool.try_set_fees(&t.owner, &1, &1000),
        Err(Ok(Error::Unauthorized))
    );
    t.pool.set_fees(&t.governance, &99, &1000);
    assert_eq!(t.pool.get_fee_rate().numerator, 99);

    t.pool.set_claim_redeem_delay(&t.governance, &DAY);
    assert_eq!(
        t.pool.try_set_claim_redeem_delay(&t.owner, &DAY),
        Err(Ok(Error::Unauthorized))
    );

    t.pool.set_no_claim_redeem_delay(&t.claim_manager, &(3 * DAY));
    t.pool.set_no_claim_redeem_delay(&t.owner, &(4 * DAY));
    assert_eq!(t.pool.get_no_claim_redeem_delay(), 4 * DAY);
    assert_eq!(
        t.pool.try_set_no_claim_redeem_delay(&t.governance, &DAY),
        Err(Ok(Error::Unauthorized))
    );

    let details = t.pool.get_pool_details();
    assert_eq!(details.claim_redeem_delay, DAY);
}

#[test]
fn test_role_setters() {
    let t = default_setup();
    let next = Address::generate(&t.env);

    t.pool.set_claim_manager(&t.owner, &next);
    assert_eq!(t.pool.get_roles().claim_manager, next);

    t.pool.set_treasury(&t.governance, &next);
    assert_eq!(t.pool.get_roles().treasury, next);

    assert_eq!(
        t.pool.try_set_governance(&t.owner, &next),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        t.pool.try_set_governance(&t.governance, &t.owner),
        Err(Ok(Error::GovernanceIsOwner))
    );
    t.pool.set_governance(&t.governance, &next);
    assert_eq!(t.pool.get_roles().governance, next);

    let fresh = CoverPoolClient::new(&t.env, &t.env.register_contract(None, CoverPool));
    let mut params = PoolParams {
        name: s(&t.env, "Pool2"),
        extendable: true,
        risks: vec![&t.env, s(&t.env, "Binance")],
        collateral: t.dai.clone(),
        deposit_ratio: SCALE,
        expiry: t.expiry,
        expiry_name: s(&t.env, "2050_12_31"),
        owner: t.owner.clone(),
        governance: t.owner.clone(),
        claim_manager: t.claim_manager.clone(),
        treasury: t.treasury.clone(),
        cover_token: t.tranches.address.clone(),
    };
    assert_eq!(
        fresh.try_initialize(&params),
        Err(Ok(Error::GovernanceIsOwner))
    );
    params.governance = t.governance.clone();
    fresh.initialize(&params);

    t.pool
        .set_expiry(&t.owner, &(t.expiry + 30 * DAY), &s(&t.env, "2051_1_1"), &Status::Active);
    assert_eq!(t.pool.get_pool_details().expiries.len(), 2);
    assert_eq!(
        t.pool
            .try_set_expiry(&t.owner, &NOW, &s(&t.env, "past"), &Status::Active),
        Err(Ok(Error::CoverExpired))
    );
}
