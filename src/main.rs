//! Demo driver for the conclave components.
//!
//! Re-creates the classic scenarios with bounded termination: a
//! producer/consumer pair over the bounded monitor, philosophers eating a
//! fixed number of meals, and a batch of tasks through the worker pool.
//! Select one with DEMO=monitor|dining|pool (default: all).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use conclave::config::Config;
use conclave::{logging, BoundedMonitor, DiningTable, WorkerPool};

const PRODUCED_ITEMS: usize = 30;
const POOL_TASKS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    logging::init(&config.logging);

    info!(version = conclave::PKG_VERSION, "starting conclave demos");
    config.log_summary();

    let demo = std::env::var("DEMO").unwrap_or_else(|_| "all".to_string());
    match demo.as_str() {
        "monitor" => run_monitor_demo(&config)?,
        "dining" => run_dining_demo(&config),
        "pool" => run_pool_demo(&config)?,
        _ => {
            run_monitor_demo(&config)?;
            run_dining_demo(&config);
            run_pool_demo(&config)?;
        }
    }
    Ok(())
}

/// Producer/consumer pair over the bounded monitor, with distinct work
/// pauses so the buffer both fills and drains.
fn run_monitor_demo(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("--- bounded monitor demo ---");
    let monitor = Arc::new(BoundedMonitor::with_threshold(
        config.monitor.capacity(),
        config.monitor.deadlock_threshold,
    ));
    let timeout = config.monitor.default_timeout;

    let producer = {
        let monitor = Arc::clone(&monitor);
        thread::Builder::new().name("producer".into()).spawn(move || {
            for i in 0..PRODUCED_ITEMS as i32 {
                match monitor.insert(i, timeout) {
                    Ok(()) => info!(item = i, "produced"),
                    Err(e) => warn!(item = i, error = %e, "producer gave up"),
                }
                thread::sleep(Duration::from_millis(10));
            }
        })?
    };

    let consumer = {
        let monitor = Arc::clone(&monitor);
        thread::Builder::new().name("consumer".into()).spawn(move || {
            for _ in 0..PRODUCED_ITEMS {
                match monitor.remove(Some(Duration::from_secs(2))) {
                    Ok(item) => info!(item, "consumed"),
                    Err(e) => {
                        warn!(error = %e, "consumer gave up");
                        break;
                    }
                }
                thread::sleep(Duration::from_millis(15));
            }
        })?
    };

    join_or_log(producer, "producer");
    join_or_log(consumer, "consumer");
    monitor.close();

    let stats = monitor.stats();
    info!(stats = %serde_json::to_string(&stats)?, "monitor demo finished");
    Ok(())
}

/// Philosophers with randomized think/eat pauses, each eating a bounded
/// number of meals.
fn run_dining_demo(config: &Config) {
    info!("--- dining philosophers demo ---");
    let table = Arc::new(DiningTable::new(config.table.seats()));
    let max_meals = config.table.max_meals.unwrap_or(3);

    let mut handles = Vec::with_capacity(table.seats());
    for seat in 0..table.seats() {
        let table = Arc::clone(&table);
        let handle = thread::Builder::new()
            .name(format!("philosopher-{}", seat))
            .spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..max_meals {
                    thread::sleep(Duration::from_millis(rng.gen_range(1..50)));
                    if table.pickup(seat).is_err() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(rng.gen_range(1..25)));
                    let _ = table.putdown(seat);
                }
                info!(seat, meals = max_meals, "philosopher done");
            })
            .expect("failed to spawn philosopher thread");
        handles.push(handle);
    }

    for (seat, handle) in handles.into_iter().enumerate() {
        join_or_log(handle, &format!("philosopher-{}", seat));
    }
    table.stop();

    let stats = table.stats();
    info!(
        stats = %serde_json::to_string(&stats).unwrap_or_default(),
        "dining demo finished"
    );
}

/// A batch of counter tasks through the pool, including one deliberate
/// failure to show per-task fault isolation.
fn run_pool_demo(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("--- worker pool demo ---");
    let pool = WorkerPool::new(
        config.pool.workers(),
        config.pool.queue_capacity(),
        "demo",
    );
    let counter = Arc::new(AtomicUsize::new(0));

    for i in 0..POOL_TASKS {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            let done = counter.fetch_add(1, Ordering::SeqCst) + 1;
            info!(task = i, done, "task executed");
            Ok(())
        })?;
    }
    pool.submit(|| Err("deliberate demo failure".to_string()))?;

    pool.shutdown_and_join()?;
    info!(executed = counter.load(Ordering::SeqCst), "all tasks drained");

    let stats = pool.stats();
    info!(stats = %serde_json::to_string(&stats)?, "pool demo finished");
    Ok(())
}

fn join_or_log(handle: thread::JoinHandle<()>, name: &str) {
    if handle.join().is_err() {
        tracing::error!(thread = name, "demo thread panicked");
    }
}
