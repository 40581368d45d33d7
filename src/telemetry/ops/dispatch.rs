use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Dispatch;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadEvent, Classify, Route }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadEvent => "read_event",
        Phase::Classify => "classify",
        Phase::Route => "route",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadEvent => info_span!("read_event"),
        Phase::Classify => info_span!("classify"),
        Phase::Route => info_span!("route"),
    }}
}

impl OpMarker for Dispatch {
    const NAME: &'static str = "dispatch";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("dispatch") }
}
