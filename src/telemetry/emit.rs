use anyhow::Result;
use serde::Serialize;
use std::io;

use super::config;
use crate::output::config::{OutputConfig, OutputFormat};
use crate::output::types::{Envelope, Meta};
use crate::output::Emitter;

fn emitter() -> Emitter {
    let mut cfg = OutputConfig::from_env();
    if config::json_mode() { cfg.format = OutputFormat::Json; }
    Emitter::new(cfg)
}

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::plan(op, plan, meta)?;
    emitter().emit(&env, &mut io::stdout().lock())?;
    Ok(())
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::result(op, result, meta)?;
    emitter().emit(&env, &mut io::stdout().lock())?;
    Ok(())
}
