#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub phase_time: Duration,
    pub elapsed_time: Duration,
}

/// Per-phase timing and memory for one ETL run.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    last_phase: Mutex<Instant>,
    peak_memory: Mutex<u64>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Could not resolve current PID, memory stats disabled");
        }

        Self {
            system: Mutex::new(System::new()),
            pid,
            start_time: now,
            last_phase: Mutex::new(now),
            peak_memory: Mutex::new(0),
            enabled,
        }
    }

    fn current_memory_mb(&self) -> u64 {
        let (Some(pid), Ok(mut system)) = (self.pid, self.system.lock()) else {
            return 0;
        };
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system
            .process(pid)
            .map(|process| process.memory() / 1024 / 1024)
            .unwrap_or(0)
    }

    /// 記錄一個階段結束，回傳該階段的統計
    pub fn finish_phase(&self, phase: &str) -> Option<PhaseStats> {
        if !self.enabled {
            return None;
        }

        let memory_mb = self.current_memory_mb();
        let peak_memory_mb = {
            let mut peak = self.peak_memory.lock().ok()?;
            *peak = (*peak).max(memory_mb);
            *peak
        };
        let phase_time = {
            let mut last = self.last_phase.lock().ok()?;
            let elapsed = last.elapsed();
            *last = Instant::now();
            elapsed
        };

        let stats = PhaseStats {
            phase: phase.to_string(),
            memory_usage_mb: memory_mb,
            peak_memory_mb,
            phase_time,
            elapsed_time: self.start_time.elapsed(),
        };
        tracing::info!(
            "📊 {} - Phase: {:?}, Memory: {}MB, Peak: {}MB, Total: {:?}",
            stats.phase,
            stats.phase_time,
            stats.memory_usage_mb,
            stats.peak_memory_mb,
            stats.elapsed_time
        );
        Some(stats)
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.peak_memory.lock().map(|p| *p).unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.start_time.elapsed(),
            peak
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn finish_phase(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
