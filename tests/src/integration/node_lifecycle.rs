//! # Node Runtime Lifecycle
//!
//! The runtime container opening databases at startup, dropping one while
//! a call is still in flight, and the metrics publisher loop.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use node_runtime::{publisher, DbmsError, NodeConfig, NodeContainer};
    use sc_01_chain_mux::*;
    use shared_types::DatabaseId;
    use sqlchain_telemetry::metrics::CHAIN_HEIGHT;

    use crate::integration::fixtures::{call, next_block, signer};

    fn node(databases: &[&str], drain_timeout: Duration) -> NodeContainer {
        NodeContainer::new(NodeConfig {
            node_seed: [0x42; 32],
            databases: databases.iter().map(|d| DatabaseId::new(*d)).collect(),
            drain_timeout,
            ..NodeConfig::default()
        })
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drop_waits_for_call_in_flight() {
        let node = node(&["orders"], Duration::from_secs(5));
        let producer = signer(1);
        let mux = Arc::clone(node.mux());

        // A request task that has already resolved its chain handle
        let handle = mux.lookup(&DatabaseId::new("orders")).unwrap();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let worker = tokio::spawn(async move {
            let _ = release_rx.await;
            handle.advise_new_block(AdviseNewBlockReq {
                block: next_block("orders", None, &producer, vec![], vec![]),
            })
        });

        let dbms = Arc::clone(&node.dbms);
        let dropper =
            tokio::spawn(async move { dbms.drop_database(&DatabaseId::new("orders")).await });

        // New calls are refused as soon as the database is unregistered
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(mux
            .fetch_last_block(call("orders", FetchLastBlockReq {}))
            .unwrap_err()
            .is_routing());
        assert!(!dropper.is_finished());

        release_tx.send(()).unwrap();
        assert!(worker.await.unwrap().is_ok());
        assert_eq!(dropper.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_drop_unknown_database() {
        let node = node(&[], Duration::from_millis(50));
        assert_eq!(
            node.dbms.drop_database(&DatabaseId::new("ghost")).await,
            Err(DbmsError::NotFound {
                database_id: DatabaseId::new("ghost")
            })
        );
    }

    #[tokio::test]
    async fn test_publisher_exports_chain_height() {
        let node = node(&["lifecycle-metrics-db"], Duration::from_millis(50));
        let producer = signer(1);
        let genesis = next_block("lifecycle-metrics-db", None, &producer, vec![], vec![]);
        node.mux()
            .advise_new_block(call(
                "lifecycle-metrics-db",
                AdviseNewBlockReq { block: genesis },
            ))
            .unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let task = tokio::spawn(publisher::run(
            Arc::clone(&node.dbms),
            Duration::from_millis(10),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            CHAIN_HEIGHT
                .with_label_values(&["lifecycle-metrics-db"])
                .get(),
            1
        );

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_empties_the_mux() {
        let node = node(&["a", "b"], Duration::from_millis(50));
        assert_eq!(node.mux().len(), 2);

        assert!(node.dbms.shutdown().await.is_empty());
        assert!(node.mux().is_empty());
    }
}
