use crate::domain::delivery::DeliverableRecord;
use crate::domain::universe::ReferenceSymbolSet;

/// Keep rows whose symbol is in the reference set, in their original order.
pub fn filter_to_reference(
    rows: Vec<DeliverableRecord>,
    reference: &ReferenceSymbolSet,
) -> Vec<DeliverableRecord> {
    let total = rows.len();
    let kept: Vec<_> = rows
        .into_iter()
        .filter(|r| reference.contains(&r.symbol))
        .collect();

    if kept.is_empty() {
        tracing::warn!(
            total,
            reference = reference.len(),
            "no reference rows matched; check CSV format or symbol cases"
        );
    } else {
        tracing::info!(total, kept = kept.len(), "filtered to reference symbols");
    }

    kept
}
