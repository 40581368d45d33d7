use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Process;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Fetch, Decode, Summarize, WriteSummary, WriteTable }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Fetch => "fetch",
        Phase::Decode => "decode",
        Phase::Summarize => "summarize",
        Phase::WriteSummary => "write_summary",
        Phase::WriteTable => "write_table",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Decode => info_span!("decode"),
        Phase::Summarize => info_span!("summarize"),
        Phase::WriteSummary => info_span!("write_summary"),
        Phase::WriteTable => info_span!("write_table"),
    }}
}

impl OpMarker for Process {
    const NAME: &'static str = "process";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("process") }
}
