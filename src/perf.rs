use std::collections::VecDeque;

/// Samples kept per rolling timing window.
pub const SAMPLE_CAPACITY: usize = 100;

/// Bounded FIFO of the most recent elapsed-time samples.
#[derive(Debug, Clone)]
pub struct TimingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl TimingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one at capacity.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Arithmetic mean over the current contents.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for TimingWindow {
    fn default() -> Self {
        Self::new(SAMPLE_CAPACITY)
    }
}

/// Labeled rolling-average readout backing one performance line in the GUI.
///
/// Pure state: the GUI renders [`PerfDisplay::text`] verbatim.
#[derive(Debug, Clone)]
pub struct PerfDisplay {
    label: &'static str,
    window: TimingWindow,
    text: String,
}

impl PerfDisplay {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            window: TimingWindow::default(),
            text: Self::placeholder(label),
        }
    }

    fn placeholder(label: &str) -> String {
        format!("{label} time: Not yet measured")
    }

    /// Record a new measurement and refresh the display text, e.g.
    /// `"Detection time: 12ms (3 avg.: 11.7ms)"`.
    pub fn update_time(&mut self, value: f64, unit: &str) {
        self.window.push(value);
        let average = self.window.average().unwrap_or(value);
        self.text = format!(
            "{} time: {}{} ({} avg.: {:.1}{})",
            self.label,
            value.round() as i64,
            unit,
            self.window.len(),
            average,
            unit,
        );
    }

    /// Drop all samples and revert to the unmeasured placeholder.
    pub fn reset(&mut self) {
        self.window.clear();
        self.text = Self::placeholder(self.label);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }
}
