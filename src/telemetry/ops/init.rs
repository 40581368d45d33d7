use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Init;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Connect, EnsureTable }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Connect => "connect", Phase::EnsureTable => "ensure_table" } }
    fn span(&self) -> Span { match self { Phase::Connect => info_span!("connect"), Phase::EnsureTable => info_span!("ensure_table") } }
}

impl OpMarker for Init {
    const NAME: &'static str = "init";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("init") }
}
