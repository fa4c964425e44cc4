use std::sync::{Arc, Mutex};
use std::thread;

use uramix_core::{
    AccountId, EngineError, Grams, Inventory, Paise, RewardRates, Store, SubmissionStatus,
    TokenId, WasteCategory,
};

fn citizen(store: &mut Store, id: &str) -> AccountId {
    store.signup(id, "compost1").unwrap().id
}

fn verified_token(store: &mut Store, account: &AccountId, category: WasteCategory, kg: u64) -> TokenId {
    let id = store.create_submission(account, category).unwrap().id;
    store
        .verify_submission(id, Grams::from_kg(kg))
        .unwrap()
        .token
        .unwrap()
}

#[test]
fn organic_submission_credits_account_and_feeds_stock() {
    let mut store = Store::default();
    let account = citizen(&mut store, "asha@example.com");
    assert_eq!(store.balance(&account).unwrap(), 0);

    let stock = store.inventory().stock;
    let token = verified_token(&mut store, &account, WasteCategory::Organic, 10);
    let receipt = store.redeem(&token).unwrap();

    assert_eq!(receipt.credits, 75);
    assert_eq!(receipt.manure_added, Some(Grams::from_kg(3)));
    assert_eq!(store.balance(&account).unwrap(), 75);
    assert_eq!(store.inventory().stock, stock.saturating_add(Grams::from_kg(3)));
}

#[test]
fn withdrawal_below_minimum_is_rejected() {
    let mut store = Store::default();
    let account = citizen(&mut store, "asha@example.com");
    let token = verified_token(&mut store, &account, WasteCategory::Organic, 10);
    store.redeem(&token).unwrap();

    assert!(matches!(
        store.withdraw(&account, 500),
        Err(EngineError::InsufficientCredits { .. })
    ));
    assert_eq!(store.balance(&account).unwrap(), 75);
}

#[test]
fn withdrawal_pays_out_at_conversion_rate() {
    let mut store = Store::default();
    let account = citizen(&mut store, "asha@example.com");
    for _ in 0..8 {
        let token = verified_token(&mut store, &account, WasteCategory::Organic, 10);
        store.redeem(&token).unwrap();
    }
    assert_eq!(store.balance(&account).unwrap(), 600);

    let receipt = store.withdraw(&account, 500).unwrap();
    assert_eq!(receipt.payout, Paise(2_500));
    assert_eq!(receipt.payout.to_string(), "₹25.00");
    assert_eq!(store.balance(&account).unwrap(), 100);
}

#[test]
fn marketplace_purchase_depletes_stock() {
    let inventory = Inventory::new(Grams::from_kg(50), Paise::from_rupees(15)).unwrap();
    let mut store = Store::new(RewardRates::default(), inventory).unwrap();
    let account = citizen(&mut store, "farmer@example.com");
    store.credit_award(&account, 3_000, None).unwrap();

    let sale = store.purchase(&account, Grams::from_kg(10)).unwrap();
    assert_eq!(store.inventory().stock, Grams::from_kg(40));
    assert_eq!(sale.quantity, Grams::from_kg(10));
    assert_eq!(sale.amount, Paise::from_rupees(150));
    assert_eq!(store.inventory().sales.last(), Some(&sale));
    assert_eq!(store.balance(&account).unwrap(), 0);
}

#[test]
fn second_redemption_fails_and_pays_once() {
    let mut store = Store::default();
    let account = citizen(&mut store, "asha@example.com");
    let token = verified_token(&mut store, &account, WasteCategory::Inorganic, 4);

    let first = store.redeem(&token).unwrap();
    assert_eq!(store.redeem(&token).unwrap_err(), EngineError::AlreadyRedeemed);
    assert_eq!(store.balance(&account).unwrap(), first.credits);
    assert_eq!(
        store.submission(first.submission).unwrap().status,
        SubmissionStatus::Redeemed
    );
}

#[test]
fn verify_then_redeem_matches_formula() {
    let rates = RewardRates::default();
    for category in [WasteCategory::Organic, WasteCategory::Inorganic] {
        for grams in [500u64, 1_000, 3_333, 9_999, 10_000, 250_000] {
            let mut store = Store::default();
            let account = citizen(&mut store, "asha");
            let id = store.create_submission(&account, category).unwrap().id;
            let token = store
                .verify_submission(id, Grams(grams))
                .unwrap()
                .token
                .unwrap();
            store.redeem(&token).unwrap();
            assert_eq!(
                store.balance(&account).unwrap(),
                rates.credits_for(category, Grams(grams))
            );
        }
    }
}

#[test]
fn concurrent_redemptions_succeed_exactly_once() {
    let mut store = Store::default();
    let account = citizen(&mut store, "asha");
    let token = verified_token(&mut store, &account, WasteCategory::Organic, 10);
    let store = Arc::new(Mutex::new(store));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let token = token.clone();
            thread::spawn(move || store.lock().unwrap().redeem(&token).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(store.lock().unwrap().balance(&account).unwrap(), 75);
}

#[test]
fn concurrent_purchases_never_oversell() {
    let inventory = Inventory::new(Grams::from_kg(5), Paise::from_rupees(1)).unwrap();
    let mut store = Store::new(RewardRates::default(), inventory).unwrap();
    let accounts: Vec<AccountId> = (0..8)
        .map(|i| {
            let id = citizen(&mut store, &format!("farmer{}", i));
            store.credit_award(&id, 1_000, None).unwrap();
            id
        })
        .collect();
    let store = Arc::new(Mutex::new(store));

    let handles: Vec<_> = accounts
        .into_iter()
        .map(|account| {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .lock()
                    .unwrap()
                    .purchase(&account, Grams::from_kg(1))
                    .is_ok()
            })
        })
        .collect();
    let sold = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    let store = store.lock().unwrap();
    assert_eq!(sold, 5);
    assert_eq!(store.inventory().stock, Grams::ZERO);
    assert_eq!(store.inventory().sales.len(), 5);
}
