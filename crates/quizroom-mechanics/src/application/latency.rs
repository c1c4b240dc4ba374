//! Answer latency bookkeeping.
//!
//! Latency is measured from the step start. Handlers hand the repository a
//! charge alongside each write, and the repository moves the author's
//! counters from the replaced submission to the new one, so only the latest
//! submission is reflected.

use quizroom_core::model::{GlobalState, LatencyBucket, LatencyCharge};

/// Charge for a submission in `bucket` during the current step.
#[must_use]
pub fn charge(state: &GlobalState, bucket: LatencyBucket) -> LatencyCharge {
    LatencyCharge {
        bucket,
        step_started_at: state.step_started_at,
    }
}
