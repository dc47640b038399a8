//! Host CPU / memory sampling.
//!
//! The scheduler only sees the [`Sensor`] trait, so tests can substitute a
//! fixed reading instead of the real host.

use parking_lot::Mutex;
use sysinfo::System;

/// Source of the two host gauges, both as integer percentages.
pub trait Sensor: Send + Sync + 'static {
    fn cpu_percent(&self) -> i64;
    fn memory_percent(&self) -> i64;
}

/// Reads the real host through `sysinfo`.
pub struct HostSensor {
    system: Mutex<System>,
    cpu_count: usize,
}

impl HostSensor {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        let cpu_count = system.cpus().len();
        Self {
            system: Mutex::new(system),
            cpu_count,
        }
    }
}

impl Default for HostSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for HostSensor {
    /// One-minute load average spread over the CPU count.
    fn cpu_percent(&self) -> i64 {
        cpu_load_percent(System::load_average().one, self.cpu_count)
    }

    fn memory_percent(&self) -> i64 {
        let mut system = self.system.lock();
        system.refresh_memory();
        memory_used_percent(system.total_memory(), system.available_memory())
    }
}

/// Load per CPU as a whole percentage (load 0.5 on 2 CPUs is 25).
pub fn cpu_load_percent(load_one: f64, cpus: usize) -> i64 {
    if cpus == 0 {
        return 0;
    }
    (load_one / cpus as f64 * 100.0).round() as i64
}

/// Used share of total memory, truncated to a whole percentage.
/// `available` counts reclaimable page cache as free.
pub fn memory_used_percent(total: u64, available: u64) -> i64 {
    if total == 0 {
        return 0;
    }
    let used = total.saturating_sub(available);
    (used as f64 / total as f64 * 100.0) as i64
}
