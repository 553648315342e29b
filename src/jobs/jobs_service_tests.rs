#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    use crate::assets::{canonical_asset_id, Asset, AssetClass, AssetRepositoryTrait};
    use crate::connections::{ConnectionRepositoryTrait, ConnectionStatus, ObservedBalance};
    use crate::holdings::{
        Cadence, HoldingOrigin, HoldingRepositoryTrait, HoldingsServiceTrait, NewHolding,
    };
    use crate::jobs::JobsService;
    use crate::ledger::{LedgerServiceTrait, TradeDirection};
    use crate::portfolio::snapshot::SnapshotRepositoryTrait;
    use crate::testing::{d, TestContext};

    const HOLDER: &str = "u1";

    fn jobs(ctx: &TestContext) -> JobsService {
        JobsService::new(
            ctx.holding_repository.clone(),
            ctx.asset_service.clone(),
            ctx.connection_repository.clone(),
            ctx.balance_provider.clone(),
            ctx.reconciler.clone(),
            ctx.ledger_service.clone(),
            ctx.history_builder.clone(),
        )
    }

    #[tokio::test]
    async fn refresh_prices_updates_stale_assets_and_records_history() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        let stale = Utc::now() - Duration::hours(1);
        ctx.asset_repository
            .upsert_asset(Asset::new("AAPL", AssetClass::Stock, dec!(100), stale))
            .await
            .unwrap();
        ctx.price_provider.set_current("AAPL", AssetClass::Stock, dec!(120));
        ctx.create_holding(HOLDER, "AAPL", AssetClass::Stock, today).await;

        let refreshed = jobs(&ctx).refresh_prices(Utc::now(), today).await.unwrap();
        assert_eq!(refreshed, 1);

        let asset_id = canonical_asset_id("AAPL", AssetClass::Stock);
        let asset = ctx.asset_repository.get_asset(&asset_id).unwrap();
        assert_eq!(asset.current_price, dec!(120));
        let record = ctx
            .asset_repository
            .get_price_at_or_before(&asset_id, today)
            .unwrap()
            .expect("today's history row should exist");
        assert_eq!(record.date, today);
        assert_eq!(record.price, dec!(120));
    }

    #[tokio::test]
    async fn refresh_prices_leaves_fresh_assets_alone() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.seed_asset("AAPL", AssetClass::Stock, dec!(100)).await;
        ctx.create_holding(HOLDER, "AAPL", AssetClass::Stock, today).await;
        ctx.price_provider.set_current("AAPL", AssetClass::Stock, dec!(130));

        jobs(&ctx).refresh_prices(Utc::now(), today).await.unwrap();

        let asset = ctx
            .asset_repository
            .get_asset(&canonical_asset_id("AAPL", AssetClass::Stock))
            .unwrap();
        assert_eq!(asset.current_price, dec!(100));
    }

    #[tokio::test]
    async fn refresh_prices_survives_a_provider_outage() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        let stale = Utc::now() - Duration::hours(1);
        ctx.price_provider.set_current("AAPL", AssetClass::Stock, dec!(100));
        ctx.asset_repository
            .upsert_asset(Asset::new("AAPL", AssetClass::Stock, dec!(100), stale))
            .await
            .unwrap();
        ctx.create_holding(HOLDER, "AAPL", AssetClass::Stock, today).await;
        ctx.price_provider.set_unavailable(true);

        let refreshed = jobs(&ctx).refresh_prices(Utc::now(), today).await.unwrap();
        assert_eq!(refreshed, 0);

        let asset = ctx
            .asset_repository
            .get_asset(&canonical_asset_id("AAPL", AssetClass::Stock))
            .unwrap();
        assert_eq!(asset.current_price, dec!(100));
    }

    #[tokio::test]
    async fn reconcile_connections_creates_holdings_and_stamps_sync_time() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        let now = Utc::now();
        ctx.price_provider.set_current("BTC", AssetClass::Crypto, dec!(30000));
        ctx.connection_repository
            .save_connection(&ctx.connection("c1", HOLDER))
            .await
            .unwrap();
        ctx.balance_provider.set_balances(
            "c1",
            vec![ObservedBalance {
                symbol: "BTC".to_string(),
                asset_class: AssetClass::Crypto,
                quantity: dec!(0.5),
            }],
        );

        jobs(&ctx).reconcile_connections(now, today).await.unwrap();

        let holding = ctx
            .holding_repository
            .find_by_connection_symbol("c1", "BTC")
            .unwrap()
            .expect("reconciliation should create the holding");
        assert_eq!(holding.quantity, dec!(0.5));
        let connection = ctx.connection_repository.get_connection("c1").unwrap();
        assert_eq!(connection.last_synced, Some(now));
        assert_eq!(connection.status, ConnectionStatus::Active);
    }

    #[tokio::test]
    async fn reconcile_connections_marks_failing_connections_invalid() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.connection_repository
            .save_connection(&ctx.connection("c1", HOLDER))
            .await
            .unwrap();
        ctx.balance_provider.set_failing(true);

        jobs(&ctx).reconcile_connections(Utc::now(), today).await.unwrap();

        let connection = ctx.connection_repository.get_connection("c1").unwrap();
        assert_eq!(connection.status, ConnectionStatus::Invalid);
        assert!(connection.last_synced.is_none());
    }

    #[tokio::test]
    async fn periodic_investments_execute_only_due_plans() {
        let ctx = TestContext::new();
        let created = d(2023, 7, 1);
        ctx.seed_asset("VWCE", AssetClass::Stock, dec!(100)).await;
        ctx.seed_asset("AAPL", AssetClass::Stock, dec!(100)).await;
        let plan = ctx
            .holdings_service
            .create_holding(
                NewHolding {
                    holder_id: HOLDER.to_string(),
                    symbol: "VWCE".to_string(),
                    asset_class: AssetClass::Stock,
                    origin: HoldingOrigin::Periodic(Cadence::Daily),
                    periodic_quantity: Some(dec!(2)),
                },
                created,
            )
            .await
            .unwrap();
        ctx.create_holding(HOLDER, "AAPL", AssetClass::Stock, created).await;

        // Not due on the plan's own anchor day.
        assert_eq!(jobs(&ctx).run_periodic_investments(created).await.unwrap(), 0);

        let today = d(2023, 7, 2);
        assert_eq!(jobs(&ctx).run_periodic_investments(today).await.unwrap(), 1);
        assert_eq!(
            ctx.ledger_service.quantity_as_of(&plan.id, today).unwrap(),
            dec!(2)
        );
    }

    #[tokio::test]
    async fn snapshot_maintenance_isolates_a_failing_holder() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.seed_asset("AAPL", AssetClass::Stock, dec!(100)).await;
        let good = ctx.create_holding("good", "AAPL", AssetClass::Stock, today).await;
        ctx.ledger_service
            .append_event(&good.id, TradeDirection::Buy, dec!(1), d(2023, 7, 8), today)
            .await
            .unwrap();

        // A holding whose asset was never registered makes this holder's
        // refresh fail.
        ctx.holding_repository
            .create_holding(
                NewHolding {
                    holder_id: "bad".to_string(),
                    symbol: "GHOST".to_string(),
                    asset_class: AssetClass::Stock,
                    origin: HoldingOrigin::Manual,
                    periodic_quantity: None,
                },
                today,
            )
            .await
            .unwrap();

        ctx.asset_repository
            .upsert_asset(Asset::new("AAPL", AssetClass::Stock, dec!(110), Utc::now()))
            .await
            .unwrap();
        jobs(&ctx).run_snapshot_maintenance(today).await.unwrap();

        let snapshot = ctx
            .snapshot_repository
            .get_snapshot("good", today)
            .unwrap()
            .expect("the healthy holder must still be maintained");
        assert_eq!(snapshot.reported_total(), dec!(110.00));
    }
}
