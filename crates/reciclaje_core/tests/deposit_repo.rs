mod common;

use common::{TestStore, CENTRO, PALERMO_INACTIVE, VILLA_URQUIZA};
use reciclaje_core::db::open_connection;
use reciclaje_core::{
    CategoryId, CenterId, DepositId, DepositListQuery, DepositRepository, Kilograms, NewDeposit,
    RepoError, SqliteDepositRepository,
};
use rust_decimal::Decimal;

fn deposit(center: i64, category: i64, quantity: Decimal) -> NewDeposit {
    NewDeposit {
        center_id: CenterId(center),
        category_id: CategoryId(category),
        quantity_kg: Kilograms(quantity),
    }
}

#[test]
fn center_lookup_only_sees_active_exact_names() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    assert_eq!(
        repo.find_active_center_id(VILLA_URQUIZA).unwrap(),
        Some(CenterId(1))
    );
    assert_eq!(repo.find_active_center_id(CENTRO).unwrap(), Some(CenterId(2)));
    assert_eq!(repo.find_active_center_id(PALERMO_INACTIVE).unwrap(), None);
    assert_eq!(repo.find_active_center_id("EcoPunto%").unwrap(), None);
    assert_eq!(repo.find_active_center_id("' OR 1=1 --").unwrap(), None);
}

#[test]
fn category_lookup_matches_exact_names() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    assert_eq!(repo.find_category_id("Plástico").unwrap(), Some(CategoryId(3)));
    assert_eq!(repo.find_category_id("Plastico").unwrap(), None);
    assert_eq!(
        repo.find_category_id("Vidrio' UNION SELECT id FROM users--").unwrap(),
        None
    );
}

#[test]
fn insert_reports_one_changed_row_and_reads_back() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    let (changed, id) = repo
        .insert_deposit(&deposit(2, 4, Decimal::new(8000, 3)))
        .unwrap();
    assert_eq!(changed, 1);

    let loaded = repo.get_deposit(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.center_id, CenterId(2));
    assert_eq!(loaded.category_id, CategoryId(4));
    assert_eq!(loaded.quantity_kg.to_string(), "8.000");
    assert!(loaded.deposited_at > 0);

    assert!(repo.get_deposit(DepositId(id.0 + 100)).unwrap().is_none());
}

#[test]
fn insert_with_unknown_center_is_rejected_by_foreign_key() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    let err = repo.insert_deposit(&deposit(99, 1, Decimal::ONE)).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(store.row_count("deposit_records"), 0);
}

#[test]
fn list_filters_by_center_and_paginates_newest_first() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    let (_, first) = repo.insert_deposit(&deposit(1, 1, Decimal::ONE)).unwrap();
    let (_, second) = repo.insert_deposit(&deposit(2, 2, Decimal::TWO)).unwrap();
    let (_, third) = repo.insert_deposit(&deposit(1, 3, Decimal::TEN)).unwrap();

    let all = repo.list_deposits(&DepositListQuery::default()).unwrap();
    let ids: Vec<DepositId> = all.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![third, second, first]);

    let center_one = DepositListQuery {
        center_id: Some(CenterId(1)),
        ..DepositListQuery::default()
    };
    let filtered = repo.list_deposits(&center_one).unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|record| record.center_id == CenterId(1)));

    let page = DepositListQuery {
        limit: Some(1),
        offset: 1,
        ..DepositListQuery::default()
    };
    let paged = repo.list_deposits(&page).unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, second);

    let skip_only = DepositListQuery {
        offset: 2,
        ..DepositListQuery::default()
    };
    let rest = repo.list_deposits(&skip_only).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, first);
}

#[test]
fn unreadable_quantity_is_invalid_data() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO deposit_records (center_id, category_id, quantity_kg)
         VALUES (1, 1, 'a lot');",
    )
    .unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    let err = repo
        .list_deposits(&DepositListQuery::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("quantity_kg")));
}

#[test]
fn deposit_records_serialize_for_callers() {
    let store = TestStore::seeded();
    let conn = open_connection(&store.config()).unwrap();
    let repo = SqliteDepositRepository::new(&conn);

    let (_, id) = repo
        .insert_deposit(&deposit(1, 1, Decimal::new(1250, 2)))
        .unwrap();
    let record = repo.get_deposit(id).unwrap().unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["center_id"], 1);
    assert_eq!(json["quantity_kg"], "12.50");
}
