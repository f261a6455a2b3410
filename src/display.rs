//! Live plot of the internal temperature against second-of-minute.

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub second: u32,
    pub celsius: f64,
}

/// Points plotted since the last reset.
///
/// The plot is cleared each time the wall clock reaches `reset_second` within a minute. Since
/// an iteration may take more than a second, reaching means crossing: a point that lands past
/// the threshold after one that was before it also clears the plot.
#[derive(Debug, Clone)]
pub struct PlotBuffer {
    points: Vec<PlotPoint>,
    reset_second: u32,
    last_second: Option<u32>,
}

impl PlotBuffer {
    pub fn new(reset_second: u32) -> PlotBuffer {
        PlotBuffer { points: Vec::new(), reset_second, last_second: None }
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn reaches_threshold(&self, second: u32) -> bool {
        let threshold = self.reset_second;
        match self.last_second {
            None =>
                second == threshold,
            Some(last) if second >= last =>
                last < threshold && threshold <= second,
            // wrapped into the next minute
            Some(last) =>
                last < threshold || threshold <= second,
        }
    }

    /// Appends `point`, then clears the buffer if the point reaches the reset threshold.
    /// Returns whether the buffer was cleared.
    pub fn push(&mut self, point: PlotPoint) -> bool {
        let reset = self.reaches_threshold(point.second);
        self.points.push(point);
        self.last_second = Some(point.second);
        if reset {
            log::debug!("plot: reset at second {} ({} points)", point.second, self.points.len());
            self.points.clear();
        }
        reset
    }
}

pub trait DisplaySink {
    fn append(&mut self, point: PlotPoint) -> Result<()>;
    fn reset(&mut self) -> Result<()>;
}

/// Strip chart drawn into the log, one line per point.
#[derive(Debug, Clone)]
pub struct TerminalDisplay {
    series: Vec<f64>,
    width: usize,
}

impl TerminalDisplay {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    pub fn new(width: usize) -> TerminalDisplay {
        TerminalDisplay { series: Vec::new(), width: width.max(1) }
    }

    pub fn render(&self) -> String {
        let visible = &self.series[self.series.len().saturating_sub(self.width)..];
        let min = visible.iter().copied().fold(f64::INFINITY, f64::min);
        let max = visible.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        visible.iter().map(|&value| {
            let level = if span > 0.0 {
                ((value - min) / span * (Self::BARS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            Self::BARS[level.min(Self::BARS.len() - 1)]
        }).collect()
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        TerminalDisplay::new(60)
    }
}

impl DisplaySink for TerminalDisplay {
    fn append(&mut self, point: PlotPoint) -> Result<()> {
        self.series.push(point.celsius);
        log::info!(target: "plot", "{:>2}s {:6.1} C {}", point.second, point.celsius, self.render());
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.series.clear();
        log::info!(target: "plot", "cleared");
        Ok(())
    }
}
