/// Cross-platform time types
/// Uses web_time for WASM targets and std::time for native targets

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

/// Wall-clock timer used to measure how long each pipeline stage takes.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the elapsed milliseconds and restarts the timer
    pub fn lap_ms(&mut self) -> f64 {
        let ms = self.elapsed_ms();
        self.started = Instant::now();
        ms
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}
