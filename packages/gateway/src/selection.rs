//! Picks one functional zone source out of the ones a scenario offers.

use urbanomy_gateway_models::{KnownSource, SourceDescriptor};

use crate::GatewayError;

/// Selects the preferred source record.
///
/// A single candidate is returned as-is, whatever its label. Otherwise
/// [`select_by_priority`] decides.
///
/// `scenario_id` only labels the error.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if `sources` is empty or none of the
/// records carries a known label.
pub fn select_best_source(
    sources: &[SourceDescriptor],
    scenario_id: i64,
) -> Result<&SourceDescriptor, GatewayError> {
    if let [only] = sources {
        return Ok(only);
    }
    select_by_priority(sources, scenario_id)
}

/// Selects by label priority alone: the first label in
/// [`KnownSource::PRIORITY`] with any record wins, and among that label's
/// records the most recent `year` wins (earliest in the list on a tie).
///
/// Unlike [`select_best_source`] there is no single-candidate shortcut, so
/// a lone record with an unknown label is rejected.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if none of the records carries a
/// known label.
pub fn select_by_priority(
    sources: &[SourceDescriptor],
    scenario_id: i64,
) -> Result<&SourceDescriptor, GatewayError> {
    KnownSource::PRIORITY
        .iter()
        .find_map(|known| latest_of(sources, *known))
        .ok_or_else(|| {
            GatewayError::not_found(
                "No functional zone source with a known label for scenario_id",
                scenario_id,
            )
        })
}

fn latest_of(sources: &[SourceDescriptor], known: KnownSource) -> Option<&SourceDescriptor> {
    sources
        .iter()
        .filter(|s| s.known_source() == Some(known))
        .fold(None, |best: Option<&SourceDescriptor>, s| match best {
            Some(b) if b.year >= s.year => Some(b),
            _ => Some(s),
        })
}
