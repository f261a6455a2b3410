//! Linear sweep of a timer's PWM duty cycle.

use std::thread::sleep;

use crate::Result;
use crate::config::SweepConfiguration;
use crate::device::{PwmTimer, TimerConfig};
use crate::regs::labjack::TIMER_MODE_PWM16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyStep {
    pub value: u16,
    /// Percent of the period the output is high.
    pub duty_cycle: f64,
}

impl DutyStep {
    pub fn new(value: u16) -> DutyStep {
        let duty_cycle = if value == 0 {
            100.0
        } else {
            (65536 - value as u32) as f64 / 65535.0 * 100.0
        };
        DutyStep { value, duty_cycle }
    }
}

/// The timer values visited by a sweep, not including the final 100% step.
pub fn duty_steps(config: &SweepConfiguration) -> Vec<DutyStep> {
    (0..config.step_count)
        .map_while(|index| {
            let decrement = index as u32 * config.step as u32;
            (config.base_value as u32).checked_sub(decrement)
                .map(|value| DutyStep::new(value as u16))
        })
        .collect()
}

/// Configures timer 0 for PWM, walks it through [`duty_steps`], finishes at 100% duty and
/// closes the device.
pub fn sweep<T: PwmTimer>(timer: &mut T, config: &SweepConfiguration) -> Result<Vec<DutyStep>> {
    timer.write_timer_config(&TimerConfig {
        clock_divisor: config.clock_divisor,
        mode: TIMER_MODE_PWM16,
        initial_value: config.base_value,
    })?;
    let mut visited = Vec::new();
    for step in duty_steps(config) {
        timer.write_duty_cycle(step.value)?;
        log::info!("Duty Cycle = {}%", step.duty_cycle);
        visited.push(step);
        sleep(config.step_delay);
    }
    let last = DutyStep::new(0);
    timer.write_duty_cycle(last.value)?;
    log::info!("Duty Cycle = 100%");
    visited.push(last);
    timer.close()?;
    Ok(visited)
}
