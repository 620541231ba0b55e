//! HTTP API tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.
//! Most tests run against the demo seed file: a three-day Ha Long trip with
//! four members (Bao at factor 0.5) and one personal expense.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use core_kernel::{MemberId, TripId};
use domain_settlement::{InMemoryTripStore, Member, TripSnapshotPort};
use interface_api::config::ApiConfig;
use interface_api::create_router;
use interface_api::dto::trips::{MemberDebtResponse, SpendingResponse, TripSummaryResponse};
use interface_api::seed::load_seed_file;

const DEMO_SEED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demo/trip_seed.json");

struct Demo {
    app: Router,
    store: Arc<InMemoryTripStore>,
    trip_id: TripId,
    members: Vec<Member>,
}

impl Demo {
    fn member(&self, name: &str) -> MemberId {
        self.members.iter().find(|m| m.name == name).unwrap().id
    }
}

async fn demo() -> Demo {
    let store = Arc::new(InMemoryTripStore::new());
    load_seed_file(&store, DEMO_SEED).await.unwrap();

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(DEMO_SEED).unwrap()).unwrap();
    let trip_id: TripId = serde_json::from_value(raw["trips"][0]["trip"]["id"].clone()).unwrap();
    let members = store.list_members(trip_id).await.unwrap();

    Demo {
        app: create_router(store.clone(), ApiConfig::default()),
        store,
        trip_id,
        members,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_store() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"]["status"], "healthy");
        assert_eq!(body["storage"]["adapter_id"], "in-memory-trip-store");
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let demo = demo().await;
        let response = demo
            .app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }
}

mod summary {
    use super::*;

    #[tokio::test]
    async fn test_demo_trip_summary() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, &format!("/api/v1/trips/{}/summary", demo.trip_id.as_uuid())).await;
        assert_eq!(status, StatusCode::OK);

        let summary: TripSummaryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(summary.rounding_rule, 1000);
        assert_eq!(summary.total_expenses, dec!(7425000));
        assert_eq!(summary.total_shared_expenses, dec!(6905000));

        let minh = demo.member("Minh");
        let flows: Vec<(&str, Decimal)> = summary
            .settlements
            .iter()
            .inspect(|s| assert_eq!(s.to_member_id, minh))
            .map(|s| (s.from_member_name.as_str(), s.amount))
            .collect();
        assert_eq!(
            flows,
            vec![("Bao", dec!(986000)), ("Huy", dec!(773000)), ("Lan", dec!(143000))]
        );

        test_utils::assert_zero_sum(&summary.member_balances, summary.rounding_rule.into());
        test_utils::assert_conserved(&summary.member_balances, &summary.settlements);
    }

    #[tokio::test]
    async fn test_breakdowns_cover_shared_spend() {
        let demo = demo().await;
        let (_, body) = get(&demo.app, &format!("/api/v1/trips/{}/summary", demo.trip_id)).await;

        assert_eq!(body["expense_by_category"]["food"], "1725000");
        assert!(body["expense_by_category"].get("shopping").is_none());
        assert_eq!(body["expense_by_date"]["2024-08-02"], "1580000");
    }

    #[tokio::test]
    async fn test_prefixed_id_is_accepted() {
        let demo = demo().await;
        let (status, _) = get(&demo.app, &format!("/api/v1/trips/{}/summary", demo.trip_id)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_trip_is_404() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, &format!("/api/v1/trips/{}/summary", TripId::new())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_id_is_400() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, "/api/v1/trips/not-a-trip/summary").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_trip_without_members_is_422() {
        let demo = demo().await;
        let empty = demo
            .store
            .insert_trip(test_utils::TripFixtures::vnd_trip())
            .await
            .unwrap();

        let (status, body) = get(&demo.app, &format!("/api/v1/trips/{}/summary", empty.id)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "unprocessable");
    }
}

mod debts {
    use super::*;

    #[tokio::test]
    async fn test_debtor_view() {
        let demo = demo().await;
        let uri = format!("/api/v1/trips/{}/members/{}/debts", demo.trip_id, demo.member("Bao"));
        let (status, body) = get(&demo.app, &uri).await;
        assert_eq!(status, StatusCode::OK);

        let debts: MemberDebtResponse = serde_json::from_value(body).unwrap();
        assert_eq!(debts.member_name, "Bao");
        assert_eq!(debts.balance, dec!(-986000));
        assert_eq!(debts.should_pay, dec!(986000));
        assert_eq!(debts.should_receive, Decimal::ZERO);
        assert_eq!(debts.related_settlements.len(), 1);
    }

    #[tokio::test]
    async fn test_creditor_view() {
        let demo = demo().await;
        let uri = format!("/api/v1/trips/{}/members/{}/debts", demo.trip_id, demo.member("Minh"));
        let (_, body) = get(&demo.app, &uri).await;

        let debts: MemberDebtResponse = serde_json::from_value(body).unwrap();
        assert_eq!(debts.should_receive, dec!(1902000));
        assert_eq!(debts.related_settlements.len(), 3);
    }

    #[tokio::test]
    async fn test_stranger_is_422() {
        let demo = demo().await;
        let uri = format!("/api/v1/trips/{}/members/{}/debts", demo.trip_id, MemberId::new());
        let (status, _) = get(&demo.app, &uri).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod spending {
    use super::*;

    #[tokio::test]
    async fn test_spending_includes_personal_expenses() {
        let demo = demo().await;
        let (status, body) = get(&demo.app, &format!("/api/v1/trips/{}/spending", demo.trip_id)).await;
        assert_eq!(status, StatusCode::OK);

        let spending: SpendingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(spending.total, dec!(7425000));

        let bao = spending.members.iter().find(|m| m.member_name == "Bao").unwrap();
        assert_eq!(bao.total_paid, dec!(520000));
        assert_eq!(bao.expense_count, 1);
    }
}

mod expenses {
    use super::*;

    #[tokio::test]
    async fn test_category_filter_newest_first() {
        let demo = demo().await;
        let (status, body) = get(
            &demo.app,
            &format!("/api/v1/trips/{}/expenses?category=food", demo.trip_id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let descriptions: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["description"].as_str().unwrap())
            .collect();
        assert_eq!(descriptions, vec!["Breakfast pho", "Seafood dinner"]);
    }

    #[tokio::test]
    async fn test_payer_and_pagination() {
        let demo = demo().await;
        let uri = format!(
            "/api/v1/trips/{}/expenses?paid_by={}&limit=1",
            demo.trip_id,
            demo.member("Lan")
        );
        let (_, body) = get(&demo.app, &uri).await;

        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["description"], "Grab rides");
    }

    #[tokio::test]
    async fn test_foreign_expense_shows_effective_amount() {
        let demo = demo().await;
        let uri = format!(
            "/api/v1/trips/{}/expenses?from=2024-08-02&to=2024-08-02&category=entertainment",
            demo.trip_id
        );
        let (_, body) = get(&demo.app, &uri).await;

        assert_eq!(body[0]["currency"], "USD");
        assert_eq!(body[0]["effective_amount"], "1200000");
    }

    #[tokio::test]
    async fn test_inverted_range_is_400() {
        let demo = demo().await;
        let uri = format!("/api/v1/trips/{}/expenses?from=2024-08-03&to=2024-08-01", demo.trip_id);
        let (status, _) = get(&demo.app, &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod seed {
    use super::*;
    use interface_api::seed::{apply_seed, SeedDocument, SeedError};

    #[tokio::test]
    async fn test_seed_rejects_expense_outside_trip() {
        let trip = test_utils::TripFixtures::vnd_trip();
        let member = Member::new(trip.id, "An");
        let late = test_utils::TestExpenseBuilder::new(&trip, &member, dec!(10000))
            .on(test_utils::TemporalFixtures::after_trip())
            .build();

        let document: SeedDocument = serde_json::from_value(serde_json::json!({
            "trips": [{ "trip": trip, "members": [member], "expenses": [late] }]
        }))
        .unwrap();

        let result = apply_seed(&InMemoryTripStore::new(), document).await;
        assert!(matches!(result, Err(SeedError::Store(core_kernel::PortError::Validation { .. }))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = load_seed_file(&InMemoryTripStore::new(), "/nonexistent/seed.json").await;
        assert!(matches!(result, Err(SeedError::Io { .. })));
    }
}
