//! # End-to-End Insurance Tests
//!
//! The complete lifecycle, with the oracle pool answering over the bus:
//!
//! ```text
//! fund ─→ propose ─→ vote ─→ registered ─→ fund ─→ ... (N = 4, majority)
//!                                                       │
//! passenger buy ─→ fetch_flight_status ─→ OracleRequested ─→ OraclePool
//!                                                       │ quorum
//!                                                       ▼
//!                        FlightStatusResolved ─→ InsureeCredited ─→ withdraw
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::harness::*;
    use fs_ledger::{LedgerApi, LedgerError};
    use fs_oracle_pool::StatusStrategy;
    use shared_types::{ether, FlightStatus, ETHER};

    /// Grow the fleet to four funded airlines, then admit a fifth by majority.
    async fn fleet_of_five(harness: &Harness) -> u64 {
        harness.fund(GENESIS).await;
        let mut members = vec![GENESIS];

        for candidate in GENESIS + 1..GENESIS + 4 {
            let sponsor = *members.last().unwrap();
            let votes = harness.admit(sponsor, candidate, &members).await;
            assert_eq!(votes, 1, "below four airlines a single vote admits");
            harness.fund(candidate).await;
            members.push(candidate);
        }

        let fifth = GENESIS + 4;
        let votes = harness.admit(GENESIS, fifth, &members).await;
        assert_eq!(votes, 2, "four registered airlines need two votes");
        harness.fund(fifth).await;
        fifth
    }

    #[tokio::test]
    async fn test_late_airline_pays_one_and_a_half_times_premium() {
        let harness = Harness::with_pool(StatusStrategy::Fixed(FlightStatus::LateAirline)).await;
        let fifth = fleet_of_five(&harness).await;
        let fly1 = flight(fifth, "FLY-1");

        harness
            .ledger
            .buy(paying(PASSENGER, ETHER), fly1.clone())
            .await
            .unwrap();

        let status = harness.resolve(&fly1).await;
        assert_eq!(status, FlightStatus::LateAirline);
        assert_eq!(
            harness.ledger.get_insuree_balance(addr(PASSENGER)).await,
            ETHER * 3 / 2
        );

        let wallet_before = harness.ledger.custody().wallet_balance(&addr(PASSENGER));
        let paid = harness.ledger.withdraw(ctx(PASSENGER)).await.unwrap();
        assert_eq!(paid, ETHER * 3 / 2);
        assert_eq!(
            harness.ledger.custody().wallet_balance(&addr(PASSENGER)),
            wallet_before + paid
        );
        assert_eq!(harness.ledger.get_insuree_balance(addr(PASSENGER)).await, 0);
        assert!(matches!(
            harness.ledger.withdraw(ctx(PASSENGER)).await,
            Err(LedgerError::ZeroBalance { .. })
        ));

        assert!(harness.ledger.check_invariants().is_valid());
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_on_time_flight_credits_nothing() {
        let harness = Harness::with_pool(StatusStrategy::Fixed(FlightStatus::OnTime)).await;
        harness.fund(GENESIS).await;
        let fly = flight(GENESIS, "ND1309");

        harness
            .ledger
            .buy(paying(PASSENGER, ETHER / 2), fly.clone())
            .await
            .unwrap();

        assert_eq!(harness.resolve(&fly).await, FlightStatus::OnTime);
        let policy = harness.ledger.get_policy(fly.clone(), addr(PASSENGER)).await.unwrap();
        assert!(policy.resolved);
        assert_eq!(policy.credited, 0);
        assert_eq!(harness.ledger.get_insuree_balance(addr(PASSENGER)).await, 0);
        assert_eq!(
            harness.ledger.get_flight_status(fly).await,
            Some(FlightStatus::OnTime)
        );

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_random_pool_resolution_matches_credit() {
        let harness = Harness::with_pool(StatusStrategy::Random).await;
        harness.fund(GENESIS).await;
        let fly = flight(GENESIS, "RND-7");

        harness
            .ledger
            .buy(paying(PASSENGER, ETHER), fly.clone())
            .await
            .unwrap();

        let status = harness.resolve(&fly).await;
        let expected = if status.triggers_payout() {
            ETHER * 3 / 2
        } else {
            0
        };
        assert_eq!(
            harness.ledger.get_insuree_balance(addr(PASSENGER)).await,
            expected
        );
        assert!(harness.ledger.check_invariants().is_valid());

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_repeat_requests_never_double_credit() {
        let harness = Harness::with_pool(StatusStrategy::Fixed(FlightStatus::LateAirline)).await;
        harness.fund(GENESIS).await;
        let fly = flight(GENESIS, "TWICE");

        harness
            .ledger
            .buy(paying(PASSENGER, ETHER), fly.clone())
            .await
            .unwrap();

        harness.resolve(&fly).await;
        // Later requests land on other indexes and may resolve them too
        for _ in 0..3 {
            let _ = harness.ledger.fetch_flight_status(ctx(ADMIN), fly.clone()).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert_eq!(
            harness.ledger.get_insuree_balance(addr(PASSENGER)).await,
            ETHER * 3 / 2
        );
        assert!(harness.ledger.check_invariants().is_valid());

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_unfunded_airline_cannot_sell_or_propose() {
        let harness = Harness::new();
        harness.fund(GENESIS).await;
        harness.admit(GENESIS, GENESIS + 1, &[GENESIS]).await;

        let unfunded = GENESIS + 1;
        assert!(harness.ledger.get_airline(addr(unfunded)).await.unwrap().registered);
        assert!(matches!(
            harness
                .ledger
                .buy(paying(PASSENGER, ETHER), flight(unfunded, "NOPE"))
                .await,
            Err(LedgerError::AirlineNotEligible { .. })
        ));
        assert!(harness
            .ledger
            .propose_airline(ctx(unfunded), addr(GENESIS + 2), "Blocked".to_string())
            .await
            .is_err());

        harness.ledger.fund(paying(unfunded, ether(10)), addr(unfunded)).await.unwrap();
        harness
            .ledger
            .propose_airline(ctx(unfunded), addr(GENESIS + 2), "Allowed".to_string())
            .await
            .unwrap();
    }
}
