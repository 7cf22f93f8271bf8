// Simulrs Pipeline
// Read -> chord engine -> write, until the upstream stream ends

use std::io::Read;
use std::sync::Arc;

use log::{debug, info};

use crate::chord::ChordEngine;
use crate::config::ChordConfig;
use crate::input::EventReader;
use crate::output::EventSink;
use crate::timer::{ChordTimers, FaultHandler, TimerService};
use crate::SimulResult;

/// Engine type used by the binary: real timers writing through a shared sink
pub type LiveEngine<S> = ChordEngine<TimerService, Arc<S>>;

/// Validate `config` and assemble an engine whose timers share `sink` with
/// the main loop.
pub fn build_engine<S>(config: &ChordConfig, sink: Arc<S>, on_fault: FaultHandler) -> SimulResult<LiveEngine<S>>
where
    S: EventSink + 'static,
{
    let table = config.validate()?;
    let timer_sink: Arc<dyn EventSink> = sink.clone();
    let timers = TimerService::new(table.down_templates(), config.threshold, timer_sink, on_fault)?;

    info!(
        "chord {} -> {} (threshold {:?}, settle {:?})",
        table
            .source_keys()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join("+"),
        table.target(),
        config.threshold,
        config.settle_delay
    );

    Ok(ChordEngine::new(table, timers, sink))
}

/// Feed every record from `reader` through `engine`.
///
/// Returns the number of records consumed once the stream ends cleanly; any
/// transport failure stops the loop.
pub fn run<R, T, S>(reader: &mut EventReader<R>, engine: &mut ChordEngine<T, S>) -> SimulResult<u64>
where
    R: Read,
    T: ChordTimers,
    S: EventSink,
{
    let mut count = 0u64;
    while let Some(event) = reader.next_event()? {
        engine.process(event)?;
        count += 1;
    }
    debug!("input ended after {} records, target state {}", count, engine.target_state());
    Ok(count)
}
