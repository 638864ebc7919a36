//! Fan-out delivery with failure pruning

use crate::models::Sample;
use crate::registry::ConnectionRegistry;

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Deliver one sample to every observer in a fresh registry snapshot.
///
/// Each peer gets at most one non-blocking send attempt. A peer whose
/// outbox is closed or full is unregistered and delivery continues to
/// the remaining peers; pruning is the only side effect beyond the
/// sends themselves.
pub fn deliver(
    registry: &ConnectionRegistry,
    sample: &Sample,
) -> Result<DeliveryReport, serde_json::Error> {
    let payload = serde_json::to_string(sample)?;
    let mut report = DeliveryReport::default();

    for connection in registry.snapshot() {
        match connection.send(payload.clone()) {
            Ok(()) => report.delivered += 1,
            Err(failure) => {
                tracing::debug!(
                    connection = %connection.id(),
                    %failure,
                    "pruning unreachable observer"
                );
                registry.unregister(connection.id());
                report.pruned += 1;
            }
        }
    }

    Ok(report)
}
