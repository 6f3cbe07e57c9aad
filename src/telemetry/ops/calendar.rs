use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Calendar;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Select, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Select => "select",
        Phase::Render => "render",
    }}
    fn span(&self) -> Span { match self {
        Phase::Select => info_span!("select"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for Calendar {
    const NAME: &'static str = "calendar";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("calendar") }
}
