//! Persistence tests: engines written to sled and read back.
//!
//! Each test uses its own temporary database or temp directory.

use precisebank::store::DbError;
use precisebank::{
    Address, Amount, BaseLedger, Coin, CoinInfo, GenesisState, MemoryBank, PersistError,
    PreciseBank, PreciseBankError, PreciseDb,
};

const CF: u64 = 1_000_000_000_000;

fn account(n: u8) -> Address {
    Address::new(vec![n; 20])
}

fn aatom(v: u64) -> precisebank::Coins {
    Coin::new("aatom", v).into()
}

#[test]
fn reopened_directory_restores_engine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let alice = account(1);
    let bob = account(2);

    let exported = {
        let db = PreciseDb::open(dir.path()).unwrap();
        let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
        bank.save_genesis(&db).unwrap();

        bank.mint(&alice, &aatom(3 * CF + 250)).unwrap();
        bank.persist(&db).unwrap();
        bank.send_coins(&alice, &bob, &aatom(CF + 500)).unwrap();
        bank.burn(&alice, &aatom(10)).unwrap();
        bank.persist(&db).unwrap();
        bank.export_genesis()
    };

    let db = PreciseDb::open(dir.path()).unwrap();
    let bank = PreciseBank::<MemoryBank>::load(&db).unwrap();
    assert_eq!(bank.export_genesis(), exported);
    assert_eq!(
        bank.get_balance(&alice, "aatom").unwrap().amount,
        Amount::from(2 * CF - 260)
    );
    assert_eq!(
        bank.get_balance(&bob, "aatom").unwrap().amount,
        Amount::from(CF + 500)
    );
    bank.check_invariants().unwrap();
}

#[test]
fn zeroed_entries_are_deleted_on_disk() {
    let db = PreciseDb::open_temporary().unwrap();
    let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
    bank.save_genesis(&db).unwrap();

    bank.mint(&account(1), &aatom(42)).unwrap();
    bank.persist(&db).unwrap();
    assert_eq!(db.fractional_count(), 1);

    bank.burn(&account(1), &aatom(42)).unwrap();
    bank.persist(&db).unwrap();
    assert_eq!(db.fractional_count(), 0);

    let loaded = PreciseBank::<MemoryBank>::load(&db).unwrap();
    assert!(loaded.store().fractional().is_empty());
}

#[test]
fn uncommitted_operations_are_not_persisted() {
    let db = PreciseDb::open_temporary().unwrap();
    let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
    bank.save_genesis(&db).unwrap();
    bank.mint(&account(1), &aatom(CF + 1)).unwrap();

    let loaded = PreciseBank::<MemoryBank>::load(&db).unwrap();
    assert_eq!(
        loaded.get_balance(&account(1), "aatom").unwrap().amount,
        Amount::ZERO
    );
    loaded.check_invariants().unwrap();
}

#[test]
fn tampered_ledger_fails_invariants_on_load() {
    let db = PreciseDb::open_temporary().unwrap();
    let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
    bank.save_genesis(&db).unwrap();
    bank.mint(&account(1), &aatom(7)).unwrap();

    // Drain the reserve behind the engine's back and persist that ledger.
    let reserve = bank.reserve_address().clone();
    bank.base_mut()
        .apply(&[precisebank::Movement::Burn {
            from: reserve,
            coin: Coin::new("uatom", 1u64),
        }])
        .unwrap();
    bank.persist(&db).unwrap();

    let err = PreciseBank::<MemoryBank>::load(&db).unwrap_err();
    assert!(matches!(
        err,
        PersistError::Bank(PreciseBankError::InvariantViolation(_))
    ));
}

#[test]
fn genesis_file_round_trip_through_json() {
    let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
    for n in 1..=3u8 {
        bank.mint(&account(n), &aatom(u64::from(n) * 333_333_333_333))
            .unwrap();
    }
    let exported = bank.export_genesis();
    let json = serde_json::to_string_pretty(&exported).unwrap();
    let parsed: GenesisState = serde_json::from_str(&json).unwrap();
    parsed.validate().unwrap();

    let reimported = PreciseBank::init_genesis(parsed, bank.base().clone()).unwrap();
    assert_eq!(reimported.export_genesis(), exported);
}

#[test]
fn corrupted_value_is_reported() {
    let db = PreciseDb::open_temporary().unwrap();
    let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
    bank.save_genesis(&db).unwrap();
    let reserve_units = bank.base().balance(bank.reserve_address(), "uatom");
    assert_eq!(reserve_units.amount, Amount::ZERO);

    let mut journal = precisebank::store::StoreBatch::new();
    journal.set_fractional(account(4), Amount::from(CF * 2));
    db.commit(&journal, bank.base()).unwrap();

    let err = PreciseBank::<MemoryBank>::load(&db).unwrap_err();
    assert!(matches!(err, PersistError::Db(DbError::Corrupted(_))));
}
