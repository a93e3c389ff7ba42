//! # Event Flow Tests
//!
//! Checks what reaches the bus: committed operations publish their events
//! in order, rejected operations publish nothing, and the node runtime
//! starts and stops cleanly.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::integration::harness::*;
    use fs_ledger::{LedgerApi, LedgerError};
    use fs_node::{NodeConfig, NodeRuntime};
    use shared_bus::{EventTopic, LedgerEvent};
    use shared_types::{ether, ETHER};

    async fn next(sub: &mut shared_bus::Subscription) -> LedgerEvent {
        timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout waiting for event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_admission_events_in_order() {
        let harness = Harness::new();
        let mut airlines = harness.subscribe(EventTopic::Airlines);
        harness.fund(GENESIS).await;
        harness.admit(GENESIS, GENESIS + 1, &[GENESIS]).await;

        assert!(matches!(next(&mut airlines).await, LedgerEvent::AirlineProposed { .. }));
        assert!(matches!(
            next(&mut airlines).await,
            LedgerEvent::AirlineVoted { votes: 1, .. }
        ));
        match next(&mut airlines).await {
            LedgerEvent::AirlineRegistered { airline, votes } => {
                assert_eq!(airline, addr(GENESIS + 1));
                assert_eq!(votes, 1);
            }
            other => panic!("Expected AirlineRegistered, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_call_publishes_nothing() {
        let harness = Harness::new();
        let mut all = harness.bus.subscribe(shared_bus::EventFilter::all());

        let err = harness
            .ledger
            .buy(paying(PASSENGER, ETHER), flight(GENESIS, "FLY-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AirlineNotEligible { .. }));

        let err = harness
            .ledger
            .set_operational(ctx(PASSENGER), false)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));

        assert!(all.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_announces_request() {
        let harness = Harness::new();
        let mut oracles = harness.subscribe(EventTopic::Oracles);
        let fly = flight(GENESIS, "FLY-2");

        let index = harness
            .ledger
            .fetch_flight_status(ctx(ADMIN), fly.clone())
            .await
            .unwrap();

        match next(&mut oracles).await {
            LedgerEvent::OracleRequested { index: i, flight: f } => {
                assert_eq!(i, index);
                assert_eq!(f, fly);
            }
            other => panic!("Expected OracleRequested, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_paused_ledger_rejects_and_resumes() {
        let harness = Harness::new();
        let mut gate = harness.subscribe(EventTopic::AccessGate);

        harness.ledger.set_operational(ctx(ADMIN), false).await.unwrap();
        assert!(matches!(
            next(&mut gate).await,
            LedgerEvent::OperationalStatusChanged { operational: false }
        ));
        assert!(matches!(
            harness.ledger.fund(paying(GENESIS, ether(10)), addr(GENESIS)).await,
            Err(LedgerError::NotOperational)
        ));

        harness.ledger.set_operational(ctx(ADMIN), true).await.unwrap();
        harness.fund(GENESIS).await;
        assert!(harness.ledger.is_airline_funded(addr(GENESIS)).await.unwrap());
    }

    #[tokio::test]
    async fn test_node_runtime_lifecycle() {
        let mut config = NodeConfig::default();
        config.oracle_pool.oracle_count = 5;

        let runtime = NodeRuntime::new(config).unwrap();
        runtime.start().await.unwrap();

        let ledger = runtime.ledger();
        assert!(ledger.is_operational().await);
        let admin = runtime.config().genesis.administrator;
        for oracle in runtime.config().oracle_pool.addresses() {
            assert_eq!(ledger.get_oracle(oracle).await.unwrap().address, oracle);
        }

        let fly = shared_types::FlightKey::new(runtime.config().genesis.airline, "NODE-1", 1);
        ledger
            .fetch_flight_status(shared_types::CallContext::new(admin), fly)
            .await
            .unwrap();

        timeout(Duration::from_secs(5), runtime.shutdown()).await.unwrap();
    }
}
