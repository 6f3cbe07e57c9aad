pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

// Factory helpers: one typed logging context per CLI operation
pub fn init() -> LogCtx<ops::init::Init> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn source() -> LogCtx<ops::source::Source> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn ingest() -> LogCtx<ops::ingest::Ingest> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn terms() -> LogCtx<ops::terms::Terms> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn stats() -> LogCtx<ops::stats::Stats> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn calendar() -> LogCtx<ops::calendar::Calendar> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
