mod common;

use anyhow::Result;
use common::{page, test_service, StandardTenants};
use tenant_ledger::application::{page_request, AppError, ErrorKind};
use tenant_ledger::domain::{Operation, PageRequest};

#[tokio::test]
async fn test_book_book_rollback_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    let t1 = service.book(1, 1, 10000).await?;
    let statements = service.list(1, 1, page(0, 10)).await?;
    assert_eq!(statements[0].account_balance_cents, 10000);

    let t2 = service.book(1, 1, 20000).await?;
    let statements = service.list(1, 1, page(0, 10)).await?;
    assert_eq!(statements[0].account_balance_cents, 30000);

    service.rollback(t1.id).await?;

    let statements = service.list(1, 1, page(0, 10)).await?;
    assert_eq!(statements.len(), 1);
    let statement = &statements[0];
    assert_eq!(statement.tenant_name, "enterprise-all-inclusive.com");
    assert_eq!(statement.customer_name, "enterprise customer one");
    assert_eq!(statement.account_balance_cents, 10000);
    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(statement.transactions[0].id, t1.id);
    assert_eq!(statement.transactions[0].operation, Operation::Rollback);
    assert!(!statement.transactions[0].rollback_at.is_empty());
    assert_eq!(statement.transactions[1].id, t2.id);
    assert_eq!(statement.transactions[1].operation, Operation::Book);
    assert_eq!(statement.transactions[1].rollback_at, "");

    let audit = service.audit(1, 1, page(0, 10)).await?;
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[0].amount_cents, 10000);
    assert_eq!(audit[0].operation, Operation::Rollback);
    assert_eq!(audit[1].amount_cents, 20000);
    assert_eq!(audit[1].operation, Operation::Book);
    assert_eq!(audit[1].time, statement.transactions[1].booked_at);

    Ok(())
}

#[tokio::test]
async fn test_unfiltered_list_groups_every_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    service.book(1, 1, 100).await?;
    service.book(2, 1, 300).await?;
    service.book(1, 2, 200).await?;
    service.book(1, 1, 50).await?;

    let statements = service.list(0, 0, page(0, 10)).await?;

    let summary: Vec<(&str, &str, i64)> = statements
        .iter()
        .map(|s| {
            (
                s.tenant_name.as_str(),
                s.customer_name.as_str(),
                s.account_balance_cents,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("enterprise-all-inclusive.com", "enterprise customer one", 150),
            ("betrieb-alles-inklusive.de", "betrieb customer one", 300),
            ("enterprise-all-inclusive.com", "enterprise customer two", 200),
        ]
    );

    // Audit keeps each account contiguous, accounts in first-seen order.
    let amounts: Vec<i64> = service
        .audit(0, 0, page(0, 10))
        .await?
        .iter()
        .map(|r| r.amount_cents)
        .collect();
    assert_eq!(amounts, vec![100, 50, 300, 200]);

    Ok(())
}

#[tokio::test]
async fn test_tenant_filter() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    service.book(1, 1, 100).await?;
    service.book(2, 1, 300).await?;
    service.book(2, 2, 400).await?;

    let statements = service.list(2, 0, page(0, 10)).await?;

    assert_eq!(statements.len(), 2);
    assert!(
        statements
            .iter()
            .all(|s| s.tenant_name == "betrieb-alles-inklusive.de")
    );

    Ok(())
}

#[tokio::test]
async fn test_customer_filter_takes_precedence() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    service.book(1, 1, 100).await?;
    service.book(1, 2, 200).await?;

    let statements = service.list(1, 2, page(0, 10)).await?;

    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].customer_name, "enterprise customer two");
    assert_eq!(statements[0].account_balance_cents, 200);

    Ok(())
}

#[tokio::test]
async fn test_customer_filter_without_tenant_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;
    service.book(1, 1, 100).await?;

    let err = service.list(0, 1, page(0, 10)).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::CustomerNotFound {
            customer_number: 1,
            tenant_number: 0
        }
    ));

    Ok(())
}

#[tokio::test]
async fn test_unknown_filters_are_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    let err = service.list(9, 0, page(0, 10)).await.unwrap_err();
    assert!(matches!(err, AppError::TenantNotFound(9)));

    let err = service.audit(1, 9, page(0, 10)).await.unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_resolved_filter_with_no_transactions_is_empty() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    assert!(service.list(1, 1, page(0, 10)).await?.is_empty());
    assert!(service.audit(1, 0, page(0, 10)).await?.is_empty());
    assert!(service.list(0, 0, page(0, 10)).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_balance_is_scoped_to_the_page() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    for amount in [100, 200, 300, 400, 500] {
        service.book(1, 1, amount).await?;
    }

    let first = service.list(1, 1, page(0, 2)).await?;
    let second = service.list(1, 1, page(1, 2)).await?;
    let third = service.list(1, 1, page(2, 2)).await?;
    let beyond = service.list(1, 1, page(3, 2)).await?;
    let everything = service.list(1, 1, page(0, 10)).await?;

    assert_eq!(first[0].account_balance_cents, 300);
    assert_eq!(second[0].account_balance_cents, 700);
    assert_eq!(third[0].account_balance_cents, 500);
    assert_eq!(third[0].transactions.len(), 1);
    assert!(beyond.is_empty());
    assert_eq!(everything[0].account_balance_cents, 1500);

    Ok(())
}

#[tokio::test]
async fn test_pages_follow_booking_order() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(service.book(1, 1, 100).await?.id);
    }

    let mut seen = Vec::new();
    for index in 0..3 {
        for statement in service.list(0, 0, page(index, 2)).await? {
            seen.extend(statement.transactions.iter().map(|t| t.id));
        }
    }

    assert_eq!(seen, ids);

    Ok(())
}

#[test]
fn test_zero_page_size_is_rejected() -> Result<()> {
    let err = page_request(0, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let request = page_request(4, 25)?;
    assert_eq!(request.offset(), Some(100));

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_page_is_a_validation_error() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardTenants::create(&service).await?;
    service.book(1, 1, 100).await?;

    let err = page_request(u32::MAX, u32::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let huge = PageRequest {
        page: u32::MAX,
        size: u32::MAX,
    };
    let err = service.list(0, 0, huge).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = service.audit(1, 1, huge).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // The furthest page that still fits is simply empty.
    assert!(service.list(0, 0, page(u32::MAX, 1)).await?.is_empty());

    Ok(())
}
