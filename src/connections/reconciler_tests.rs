#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::assets::AssetClass;
    use crate::connections::ObservedBalance;
    use crate::holdings::{HoldingOrigin, HoldingRepositoryTrait};
    use crate::ledger::{LedgerServiceTrait, TradeDirection};
    use crate::testing::{d, TestContext};

    const HOLDER: &str = "u1";

    fn btc(quantity: rust_decimal::Decimal) -> ObservedBalance {
        ObservedBalance {
            symbol: "BTC".to_string(),
            asset_class: AssetClass::Crypto,
            quantity,
        }
    }

    #[tokio::test]
    async fn first_observation_creates_a_holding_with_a_buy() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.price_provider.set_current("BTC", AssetClass::Crypto, dec!(30000));
        let connection = ctx.connection("c1", HOLDER);

        let event = ctx
            .reconciler
            .reconcile(&connection, &btc(dec!(0.5)), today, today)
            .await
            .unwrap()
            .expect("expected a synthetic buy");
        assert_eq!(event.direction, TradeDirection::Buy);
        assert_eq!(event.quantity, dec!(0.5));

        let holding = ctx
            .holding_repository
            .find_by_connection_symbol("c1", "BTC")
            .unwrap()
            .expect("holding should exist");
        assert_eq!(holding.origin, HoldingOrigin::Connection("c1".to_string()));
        assert_eq!(holding.quantity, dec!(0.5));
    }

    #[tokio::test]
    async fn positive_delta_emits_a_buy_for_the_difference() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.price_provider.set_current("BTC", AssetClass::Crypto, dec!(30000));
        let connection = ctx.connection("c1", HOLDER);

        ctx.reconciler
            .reconcile(&connection, &btc(dec!(0.5)), d(2023, 7, 1), today)
            .await
            .unwrap();
        let event = ctx
            .reconciler
            .reconcile(&connection, &btc(dec!(0.8)), today, today)
            .await
            .unwrap()
            .expect("expected a delta buy");
        assert_eq!(event.direction, TradeDirection::Buy);
        assert_eq!(event.quantity, dec!(0.3));
    }

    #[tokio::test]
    async fn negative_delta_emits_a_sell() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.price_provider.set_current("BTC", AssetClass::Crypto, dec!(30000));
        let connection = ctx.connection("c1", HOLDER);

        ctx.reconciler
            .reconcile(&connection, &btc(dec!(1)), d(2023, 7, 1), today)
            .await
            .unwrap();
        let event = ctx
            .reconciler
            .reconcile(&connection, &btc(dec!(0.25)), today, today)
            .await
            .unwrap()
            .expect("expected a delta sell");
        assert_eq!(event.direction, TradeDirection::Sell);
        assert_eq!(event.quantity, dec!(0.75));

        let holding = ctx
            .holding_repository
            .find_by_connection_symbol("c1", "BTC")
            .unwrap()
            .unwrap();
        assert_eq!(holding.quantity, dec!(0.25));
    }

    #[tokio::test]
    async fn matching_balance_is_a_no_op() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        ctx.price_provider.set_current("BTC", AssetClass::Crypto, dec!(30000));
        let connection = ctx.connection("c1", HOLDER);

        ctx.reconciler
            .reconcile(&connection, &btc(dec!(2)), d(2023, 7, 1), today)
            .await
            .unwrap();
        let outcome = ctx
            .reconciler
            .reconcile(&connection, &btc(dec!(2)), today, today)
            .await
            .unwrap();
        assert!(outcome.is_none());

        let events = ctx
            .ledger_service
            .quantity_as_of(
                &ctx.holding_repository
                    .find_by_connection_symbol("c1", "BTC")
                    .unwrap()
                    .unwrap()
                    .id,
                today,
            )
            .unwrap();
        assert_eq!(events, dec!(2));
    }

    #[tokio::test]
    async fn zero_observation_without_holding_creates_nothing() {
        let ctx = TestContext::new();
        let today = d(2023, 7, 10);
        let connection = ctx.connection("c1", HOLDER);

        let outcome = ctx
            .reconciler
            .reconcile(&connection, &btc(dec!(0)), today, today)
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(ctx
            .holding_repository
            .find_by_connection_symbol("c1", "BTC")
            .unwrap()
            .is_none());
    }
}
