use tokio::signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM. In-flight requests finish; an open exam
/// transaction is either committed or rolled back by Postgres.
pub(crate) async fn shutdown_signal() {
    let received = wait_for_stop().await;
    tracing::info!(signal = received.as_str(), "Shutting down, draining in-flight requests");
}

async fn wait_for_stop() -> StopSignal {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => StopSignal::Interrupt,
            Err(err) => {
                tracing::error!(error = %err, "Ctrl+C handler unavailable");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                StopSignal::Terminate
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler unavailable");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<StopSignal>();

    tokio::select! {
        received = interrupt => received,
        received = terminate => received,
    }
}
