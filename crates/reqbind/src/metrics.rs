//! Binding metrics.
//!
//! Recorded through the [`metrics`] facade; nothing is exported unless the
//! application installs a recorder.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `reqbind_bind_total` | Counter | `binder`, `outcome` | Bind calls by result |
//! | `reqbind_violations_total` | Counter | `reason` | Reported field violations |
//! | `reqbind_bind_duration_seconds` | Histogram | `binder` | Bind call latency |

use crate::error::BindError;
use ::metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Which binder produced a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinderKind {
    /// The collect-all body binder.
    Body,
    /// The fail-fast query/form binder.
    Params,
}

impl BinderKind {
    /// Returns the metric label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Params => "params",
        }
    }
}

/// Registers descriptions for the binding metrics.
///
/// Call once after installing a metrics recorder.
pub fn describe_metrics() {
    describe_counter!(
        "reqbind_bind_total",
        "Total number of bind calls by binder and outcome"
    );
    describe_counter!(
        "reqbind_violations_total",
        "Total number of field violations by reason"
    );
    describe_histogram!(
        "reqbind_bind_duration_seconds",
        "Bind call duration in seconds"
    );
}

/// Records the outcome of one bind call.
///
/// The outcome label is `ok` or the error's [`BindError::error_code`].
pub fn record_bind(binder: BinderKind, result: Result<(), &BindError>, duration: Duration) {
    let outcome = match result {
        Ok(()) => "ok",
        Err(e) => e.error_code(),
    };
    counter!(
        "reqbind_bind_total",
        "binder" => binder.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "reqbind_bind_duration_seconds",
        "binder" => binder.as_str()
    )
    .record(duration.as_secs_f64());

    if let Err(e) = result {
        for violation in e.violations() {
            counter!(
                "reqbind_violations_total",
                "reason" => violation.reason.as_str()
            )
            .increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Violation;

    #[test]
    fn test_labels() {
        assert_eq!(BinderKind::Body.as_str(), "body");
        assert_eq!(BinderKind::Params.as_str(), "params");
    }

    #[test]
    fn test_record_functions_dont_panic() {
        describe_metrics();
        record_bind(BinderKind::Body, Ok(()), Duration::from_micros(40));
        let err = BindError::missing(vec![Violation::missing("age", "")]);
        record_bind(BinderKind::Params, Err(&err), Duration::from_micros(12));
    }
}
