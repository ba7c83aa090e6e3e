//! Dispatch integration tests
//!
//! Drives a dispatcher with a recording evaluator to observe the order and
//! concurrency of evaluations.

#[cfg(test)]
mod tests {
    use crate::common::eventually;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use vigil::core::evaluators::Evaluator;
    use vigil::{CheckIdentity, Dispatcher, Result};

    /// Records which tenant each evaluation belonged to and how many ran at once
    #[derive(Default)]
    struct Recorder {
        order: Mutex<Vec<String>>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Evaluator for Recorder {
        type Definition = Duration;
        type Output = String;

        async fn evaluate(
            &self,
            identity: &CheckIdentity,
            definition: &Duration,
            cancel: CancellationToken,
        ) -> Result<String> {
            self.order.lock().push(identity.tenant.clone());
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(*definition) => {}
            }

            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(identity.name.clone())
        }
    }

    fn identity(tenant: &str, name: &str) -> CheckIdentity {
        CheckIdentity::new("test", tenant, "web", name)
    }

    /// A tenant with a backlog does not delay the others
    #[tokio::test]
    async fn test_tenants_take_turns() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::new("health", recorder.clone(), 1);

        let mut handles = Vec::new();
        for i in 0..6 {
            handles.push(dispatcher.submit(
                "busy",
                identity("busy", &format!("check-{}", i)),
                Duration::from_millis(5),
            ));
        }
        handles.push(dispatcher.submit("quiet", identity("quiet", "only"), Duration::from_millis(5)));

        let cancel = CancellationToken::new();
        let runner = dispatcher.clone();
        let loop_cancel = cancel.clone();
        let running = tokio::spawn(async move { runner.run(loop_cancel).await });

        for handle in handles {
            assert!(handle.await.is_ok());
        }

        let order = recorder.order.lock().clone();
        let quiet = order.iter().position(|tenant| tenant == "quiet").unwrap();
        assert!(quiet <= 1, "quiet tenant served at position {}", quiet);
        assert_eq!(recorder.peak.load(Ordering::SeqCst), 1);

        cancel.cancel();
        running.await.unwrap();
    }

    /// Raising the limit takes effect without restarting the loop
    #[tokio::test]
    async fn test_reconfigure_raises_concurrency() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::new("health", recorder.clone(), 2);

        let cancel = CancellationToken::new();
        let runner = dispatcher.clone();
        let loop_cancel = cancel.clone();
        let running = tokio::spawn(async move { runner.run(loop_cancel).await });

        let first: Vec<_> = (0..4)
            .map(|i| {
                let tenant = format!("tenant-{}", i);
                dispatcher.submit(tenant.clone(), identity(&tenant, "slow"), Duration::from_millis(200))
            })
            .collect();
        assert!(eventually(|| dispatcher.in_flight() == 2).await);
        assert_eq!(recorder.peak.load(Ordering::SeqCst), 2);
        for handle in first {
            assert!(handle.await.is_ok());
        }

        dispatcher.reconfigure(5);
        assert_eq!(dispatcher.limit(), 5);

        let second: Vec<_> = (0..5)
            .map(|i| {
                let tenant = format!("tenant-{}", i);
                dispatcher.submit(tenant.clone(), identity(&tenant, "slow"), Duration::from_millis(200))
            })
            .collect();
        assert!(eventually(|| dispatcher.in_flight() == 5).await);
        for handle in second {
            assert!(handle.await.is_ok());
        }
        assert_eq!(recorder.peak.load(Ordering::SeqCst), 5);

        cancel.cancel();
        running.await.unwrap();
    }

    /// Evicting a tenant resolves its queued checks as cancelled
    #[tokio::test]
    async fn test_cancel_tenant_resolves_queued_checks() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::new("health", recorder.clone(), 1);

        let evicted: Vec<_> = (0..3)
            .map(|i| dispatcher.submit("gone", identity("gone", &format!("c{}", i)), Duration::ZERO))
            .collect();
        let kept = dispatcher.submit("stays", identity("stays", "c0"), Duration::ZERO);

        assert_eq!(dispatcher.cancel_tenant("gone"), 3);
        assert_eq!(dispatcher.queued(), 1);

        for handle in evicted {
            let error = handle.await.unwrap_err();
            assert!(error.is_cancelled());
        }

        let cancel = CancellationToken::new();
        let runner = dispatcher.clone();
        let loop_cancel = cancel.clone();
        let running = tokio::spawn(async move { runner.run(loop_cancel).await });

        assert_eq!(kept.await.unwrap(), "c0");
        assert_eq!(*recorder.order.lock(), vec!["stays".to_string()]);

        cancel.cancel();
        running.await.unwrap();
    }
}
