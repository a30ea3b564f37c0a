//! Integration tests for the customer repository against real PostgreSQL
//!
//! These run against a disposable postgres:16 container and are ignored
//! by default; run them with `cargo test -- --ignored` on a machine with
//! a Docker daemon.

use std::sync::Arc;

use chrono::NaiveDate;

use core_kernel::{CustomerId, PageRequest};
use domain_customer::{BulkTransferService, CustomerError, CustomerStore};
use infra_db::CustomerRepository;
use test_utils::{create_isolated_test_database, CustomerRequestBuilder};

fn dob(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn create_returns_children_matching_request() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let request = CustomerRequestBuilder::new()
        .with_mobile("+94771234567")
        .with_mobile("+94770000001")
        .with_address("12 Temple Road", "Colombo", "Sri Lanka", "LK")
        .with_family_member("Kamala Perera", dob(1990, 7, 1), "907654321V")
        .build();

    let customer = repo.create(request).await.unwrap();

    assert_eq!(customer.mobile_numbers.len(), 2);
    assert_eq!(customer.addresses.len(), 1);
    assert_eq!(customer.family_members.len(), 1);
    assert_eq!(customer.addresses[0].city.country.code, "LK");
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn duplicate_nic_conflicts_even_as_family_member() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let first = CustomerRequestBuilder::new()
        .with_family_member("Kamala Perera", dob(1990, 7, 1), "907654321V")
        .build();
    repo.create(first).await.unwrap();

    // NIC taken by the parent row.
    let parent_clash = CustomerRequestBuilder::new()
        .name("Someone Else")
        .build();
    assert!(matches!(
        repo.create(parent_clash).await.unwrap_err(),
        CustomerError::Conflict(_)
    ));

    // NIC taken by the family-member row.
    let member_clash = CustomerRequestBuilder::new()
        .nic_number("907654321V")
        .build();
    assert!(matches!(
        repo.create(member_clash).await.unwrap_err(),
        CustomerError::Conflict(_)
    ));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn family_links_are_symmetric() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let parent = repo
        .create(
            CustomerRequestBuilder::new()
                .with_family_member("Kamala Perera", dob(1990, 7, 1), "907654321V")
                .build(),
        )
        .await
        .unwrap();

    let child_id = parent.family_members[0].id;
    let child = repo.get(child_id).await.unwrap();

    assert_eq!(child.family_of.len(), 1);
    assert_eq!(child.family_of[0].id, parent.id);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn delete_leaves_no_dangling_family_edges() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let parent = repo
        .create(
            CustomerRequestBuilder::new()
                .with_mobile("+94771234567")
                .with_family_member("Kamala Perera", dob(1990, 7, 1), "907654321V")
                .build(),
        )
        .await
        .unwrap();

    repo.delete(parent.id).await.unwrap();

    let edges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_family_members")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(edges, 0);

    let mobiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mobile_numbers")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(mobiles, 0);

    // The family member survives as an independent customer.
    let child = repo.get(parent.family_members[0].id).await.unwrap();
    assert!(child.family_of.is_empty());

    assert!(matches!(
        repo.get(parent.id).await.unwrap_err(),
        CustomerError::NotFound(_)
    ));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn resolver_never_duplicates_reference_rows() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    for (index, nic) in ["851234567V", "852234567V"].iter().enumerate() {
        repo.create(
            CustomerRequestBuilder::new()
                .name(format!("Customer {index}"))
                .nic_number(*nic)
                .with_address("12 Temple Road", "Colombo", "Sri Lanka", "LK")
                .build(),
        )
        .await
        .unwrap();
    }

    let countries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let cities: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
        .fetch_one(db.pool())
        .await
        .unwrap();

    assert_eq!(countries, 1);
    assert_eq!(cities, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn pagination_over_five_customers() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    for index in 0..5 {
        repo.create(
            CustomerRequestBuilder::new()
                .name(format!("Customer {index}"))
                .nic_number(format!("85123456{index}V"))
                .build(),
        )
        .await
        .unwrap();
    }

    let (first_page, total) = repo.list(PageRequest::new(0, 2)).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(total, 5);

    let (last_page, _) = repo.list(PageRequest::new(2, 2)).await.unwrap();
    assert_eq!(last_page.len(), 1);

    // Identity-ascending order across pages.
    assert!(first_page[0].id < first_page[1].id);
    assert!(first_page[1].id < last_page[0].id);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn update_replaces_child_collections() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let created = repo
        .create(
            CustomerRequestBuilder::new()
                .with_mobile("+94771234567")
                .with_mobile("+94770000001")
                .with_address("12 Temple Road", "Colombo", "Sri Lanka", "LK")
                .build(),
        )
        .await
        .unwrap();

    // Update with no mobile numbers clears all of them.
    let updated = repo
        .update(created.id, CustomerRequestBuilder::new().build())
        .await
        .unwrap();

    assert!(updated.mobile_numbers.is_empty());
    assert!(updated.addresses.is_empty());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn update_conflicts_on_number_owned_by_other_customer() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    repo.create(
        CustomerRequestBuilder::new()
            .with_mobile("+94771234567")
            .build(),
    )
    .await
    .unwrap();

    let second = repo
        .create(
            CustomerRequestBuilder::new()
                .name("Ruwan Silva")
                .nic_number("921234567X")
                .build(),
        )
        .await
        .unwrap();

    let stolen = CustomerRequestBuilder::new()
        .name("Ruwan Silva")
        .nic_number("921234567X")
        .with_mobile("+94771234567")
        .build();

    assert!(matches!(
        repo.update(second.id, stolen).await.unwrap_err(),
        CustomerError::Conflict(_)
    ));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn update_missing_customer_is_not_found() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let error = repo
        .update(CustomerId::new(9999), CustomerRequestBuilder::new().build())
        .await
        .unwrap_err();
    assert!(matches!(error, CustomerError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn bulk_import_against_real_store() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());
    let service = BulkTransferService::new(Arc::new(repo.clone()));

    // Seed one customer whose NIC also appears in the sheet.
    repo.create(CustomerRequestBuilder::new().build())
        .await
        .unwrap();

    let template = service.template().await.unwrap();
    // The template round-trips: importing it again skips every existing NIC.
    let created = service.import(&template).await.unwrap();
    assert!(created.is_empty());

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn store_port_nic_exists() {
    let db = create_isolated_test_database().await.unwrap();
    let repo = CustomerRepository::new(db.pool().clone());

    let store: Arc<dyn CustomerStore> = Arc::new(repo.clone());
    assert!(!store.nic_exists("851234567V").await.unwrap());

    repo.create(CustomerRequestBuilder::new().build())
        .await
        .unwrap();
    assert!(store.nic_exists("851234567V").await.unwrap());
}
