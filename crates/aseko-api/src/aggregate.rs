// ── Fan-out outcome classification ──
//
// Folds the per-unit results of a concurrent detail fetch into either the
// list of retrieved snapshots or a single error for the whole cycle.

use tracing::{debug, warn};

use crate::error::{Error, ErrorKind};
use crate::unit::UnitSnapshot;

/// Classify per-unit outcomes, in `serials` order.
///
/// - an authentication failure anywhere is returned as-is
/// - not-found units are dropped silently
/// - other failures are dropped and logged
///
/// If every unit failed, the cycle itself fails: with a stale-data message
/// when all of them were 404, otherwise with the error count. Any success
/// makes the result `Ok`, however many units failed.
pub fn aggregate_units(
    serials: &[String],
    results: Vec<Result<UnitSnapshot, Error>>,
) -> Result<Vec<UnitSnapshot>, Error> {
    let mut units = Vec::with_capacity(results.len());
    let mut errors: Vec<(&str, Error)> = Vec::new();
    let mut not_found = 0usize;

    for (serial, result) in serials.iter().zip(results) {
        match result {
            Ok(unit) => units.push(unit),
            Err(err) => match err.kind() {
                ErrorKind::Auth => return Err(err),
                ErrorKind::NotFound => {
                    debug!(serial = %serial, "unit not found, skipping");
                    not_found += 1;
                }
                ErrorKind::Api | ErrorKind::Connection => {
                    warn!(serial = %serial, error = %err, "failed to fetch unit");
                    errors.push((serial.as_str(), err));
                }
            },
        }
    }

    if units.is_empty() && !serials.is_empty() {
        if not_found == serials.len() {
            return Err(Error::api(format!(
                "All {not_found} units returned 404 - data may be stale"
            )));
        }
        if !errors.is_empty() {
            return Err(Error::api(format!(
                "Failed to fetch any units. Errors: {}",
                errors.len()
            )));
        }
    }

    Ok(units)
}
