/// Measures how long a named step takes and reports it through the logger.
pub struct TaskTimer {
    start_time: std::time::Instant,
    task_name: &'static str,
}

impl TaskTimer {
    pub fn new(task_name: &'static str) -> Self {
        log::trace!("Task: {} started", task_name);
        Self {
            start_time: std::time::Instant::now(),
            task_name,
        }
    }

    /// Log the elapsed time and return it.
    pub fn stop(&self) -> std::time::Duration {
        let elapsed = self.start_time.elapsed();
        log::debug!(
            "Task: {} finished in {:.1}ms",
            self.task_name,
            elapsed.as_secs_f64() * 1000.0
        );
        elapsed
    }
}
