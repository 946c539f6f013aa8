//! One-shot timer capability, the timing half of the viewport debounce.
//!
//! The core owns the debounce policy: it keeps a generation counter in the
//! model, cancels the previous id and starts a new timer on every viewport
//! change, and ignores firings whose id no longer matches. The shell only
//! has to run a cancellable one-shot timer per `Start` operation.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum TimerOperation {
    Start { id: u64, millis: u64 },
    Cancel { id: u64 },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum TimerOutput {
    /// The quiet period elapsed without a cancellation.
    Fired { id: u64 },
    /// The shell observed a `Cancel` for this id before it fired.
    Cancelled { id: u64 },
}

#[derive(Clone)]
pub struct Timer<E> {
    context: CapabilityContext<TimerOperation, E>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<E> Timer<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, E>) -> Self {
        Self { context }
    }

    /// Schedules a one-shot timer. The callback runs when the shell resolves
    /// the request, whether the timer fired or was cancelled.
    pub fn start<F>(&self, id: u64, millis: u64, callback: F)
    where
        F: Fn(TimerOutput) -> E + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            context.update_app(callback(output));
        });
    }

    /// Asks the shell to cancel a pending timer. Idempotent: cancelling an
    /// unknown or already-fired id is a no-op on the shell side.
    pub fn cancel(&self, id: u64) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_operation_round_trips_through_serde() {
        let op = TimerOperation::Start { id: 7, millis: 1000 };
        let json = serde_json::to_string(&op).unwrap();
        let back: TimerOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn timer_output_round_trips_through_serde() {
        let out = TimerOutput::Fired { id: 7 };
        let json = serde_json::to_string(&out).unwrap();
        let back: TimerOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(out, back);
    }
}
