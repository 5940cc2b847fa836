//! Scripted walkthroughs of both patterns, driven by [`Config`].

use anyhow::{Context as _, Result, anyhow};
use std::{fmt::Debug, io::Write, rc::Rc};
use tracing::debug;

use crate::{
    config::{ObserverConfig, StrategyConfig},
    observer::{SubscriberHandle, WeatherApp, WeatherService},
    strategy::{Context, operation_from_id},
};

/// Register every configured app, broadcast the updates, drop the configured
/// app and broadcast the rest. Each app writes to its own sink from `make_sink`.
pub fn run_observer<W, F>(cfg: &ObserverConfig, make_sink: F) -> Result<()>
where
    W: Write + Debug + 'static,
    F: Fn() -> W,
{
    let mut service = WeatherService::new();
    let mut apps: Vec<(&str, SubscriberHandle)> = Vec::with_capacity(cfg.apps.len());

    for name in &cfg.apps {
        let handle: SubscriberHandle = Rc::new(WeatherApp::new(name.as_str(), make_sink()));
        service.register(Rc::clone(&handle));
        apps.push((name.as_str(), handle));
    }

    for update in &cfg.updates {
        service.set_weather_update(update)?;
    }

    if let Some(target) = &cfg.remove {
        let (_, handle) = apps
            .iter()
            .find(|(name, _)| *name == target.as_str())
            .ok_or_else(|| anyhow!("No app named '{target}' to remove"))?;
        service.remove(handle);
        debug!(app = %target, remaining = service.len(), "app unsubscribed");
    }

    for update in &cfg.after_remove {
        service.set_weather_update(update)?;
    }

    Ok(())
}

/// Run `a op b` for the initial operation and each operation in `sequence`,
/// writing `a <symbol> b = result` lines to `out`. Returns the results in order.
pub fn run_strategy<W: Write>(cfg: &StrategyConfig, out: &mut W) -> Result<Vec<i32>> {
    let mut context = Context::new(operation_from_id(cfg.initial));
    let mut results = Vec::with_capacity(cfg.sequence.len() + 1);

    results.push(print_step(&context, cfg.a, cfg.b, out)?);

    for id in &cfg.sequence {
        context.set_strategy(operation_from_id(*id));
        results.push(print_step(&context, cfg.a, cfg.b, out)?);
    }

    Ok(results)
}

fn print_step<W: Write>(context: &Context, a: i32, b: i32, out: &mut W) -> Result<i32> {
    let result = context.execute(a, b);
    writeln!(out, "{a} {} {b} = {result}", context.strategy().symbol())
        .context("Failed to write strategy result")?;
    Ok(result)
}
