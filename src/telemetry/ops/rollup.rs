use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Rollup;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, List, ReadSummary, Fold, WriteReport }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::List => "list",
        Phase::ReadSummary => "read_summary",
        Phase::Fold => "fold",
        Phase::WriteReport => "write_report",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::List => info_span!("list"),
        Phase::ReadSummary => info_span!("read_summary"),
        Phase::Fold => info_span!("fold"),
        Phase::WriteReport => info_span!("write_report"),
    }}
}

impl OpMarker for Rollup {
    const NAME: &'static str = "rollup";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("rollup") }
}
