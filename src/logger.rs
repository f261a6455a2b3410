use std::cell::Cell;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::sleep;
use std::time::Duration;

use crate::Result;
use crate::config::LoggerConfiguration;
use crate::convert::internal_temperature;
use crate::device::AnalogSource;
use crate::display::{DisplaySink, PlotBuffer, PlotPoint};
use crate::reading::{ChannelSample, Reading, Timestamp};
use crate::sink::ReadingSink;

pub trait Clock {
    fn now(&mut self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Timestamp {
        chrono::Local::now().naive_local().into()
    }
}

#[derive(Debug, Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // the session may already be over, in which case there is nobody to tell
        let _ = self.0.send(());
    }
}

/// Receiving end of a stop request. Dropping every `StopHandle` also counts as a request.
#[derive(Debug)]
pub struct StopToken {
    receiver: Option<Receiver<()>>,
    stopped: Cell<bool>,
}

pub fn stop_signal() -> (StopHandle, StopToken) {
    let (sender, receiver) = channel();
    (StopHandle(sender), StopToken { receiver: Some(receiver), stopped: Cell::new(false) })
}

impl StopToken {
    /// A token that is never signalled.
    pub fn never() -> StopToken {
        StopToken { receiver: None, stopped: Cell::new(false) }
    }

    pub fn is_stopped(&self) -> bool {
        if !self.stopped.get() {
            if let Some(receiver) = self.receiver.as_ref() {
                match receiver.try_recv() {
                    Err(TryRecvError::Empty) => (),
                    Ok(()) | Err(TryRecvError::Disconnected) => self.stopped.set(true),
                }
            }
        }
        self.stopped.get()
    }

    /// Sleeps for `timeout` unless a stop is requested first. Returns whether it was.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.stopped.get() {
            return true
        }
        match self.receiver.as_ref() {
            None => {
                if !timeout.is_zero() { sleep(timeout) }
            }
            Some(receiver) => match receiver.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => (),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => self.stopped.set(true),
            }
        }
        self.stopped.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub recorded: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct SensorLogger<C: Clock> {
    config: LoggerConfiguration,
    clock: C,
    plot: PlotBuffer,
}

impl SensorLogger<SystemClock> {
    pub fn new(config: LoggerConfiguration) -> SensorLogger<SystemClock> {
        SensorLogger::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SensorLogger<C> {
    pub fn with_clock(config: LoggerConfiguration, clock: C) -> SensorLogger<C> {
        let plot = PlotBuffer::new(config.plot_reset_second);
        SensorLogger { config, clock, plot }
    }

    pub fn config(&self) -> &LoggerConfiguration {
        &self.config
    }

    pub fn plot(&self) -> &PlotBuffer {
        &self.plot
    }

    /// Performs one acquisition cycle. Nothing is recorded if any channel fails to read or
    /// convert.
    pub fn sample<S: AnalogSource>(&mut self, device: &mut S) -> Result<Reading> {
        let timestamp = self.clock.now();
        let internal_celsius = internal_temperature(device.internal_temperature_kelvin()?)?;
        let mut voltages = [0.0; 3];
        for (voltage, calibration) in voltages.iter_mut().zip(self.config.channels.iter()) {
            *voltage = device.analog_input(calibration.input)?;
        }
        let [lna, sp4t, load] = &self.config.channels;
        let channels = [
            ChannelSample::convert(lna, voltages[0])?,
            ChannelSample::convert(sp4t, voltages[1])?,
            ChannelSample::convert(load, voltages[2])?,
        ];
        Ok(Reading { timestamp, channels, internal_celsius })
    }

    fn update_display<V: DisplaySink>(&mut self, display: &mut V, reading: &Reading) {
        let point = PlotPoint {
            second: reading.timestamp.second(),
            celsius: reading.internal_celsius,
        };
        let reset = self.plot.push(point);
        if let Err(error) = display.append(point) {
            log::warn!("{}", error);
        }
        if reset {
            if let Err(error) = display.reset() {
                log::warn!("{}", error);
            }
        }
    }

    /// Runs acquisition cycles until `stop` is signalled or the sample limit is reached.
    ///
    /// Device and conversion failures skip the cycle. A failure to record a reading ends the
    /// session with that error.
    pub fn run<S, O, V>(&mut self, device: &mut S, output: &mut O, display: &mut V, stop: &StopToken)
            -> Result<SessionSummary>
            where S: AnalogSource, O: ReadingSink, V: DisplaySink {
        let mut summary = SessionSummary::default();
        let mut iterations = 0;
        loop {
            if stop.is_stopped() {
                log::info!("stop requested");
                break
            }
            match self.sample(device) {
                Ok(reading) => {
                    if let Err(error) = output.record(&reading) {
                        log::error!("{}", error);
                        return Err(error)
                    }
                    summary.recorded += 1;
                    log::info!("{}", reading);
                    self.update_display(display, &reading);
                }
                Err(error) if error.is_recoverable() => {
                    summary.skipped += 1;
                    log::warn!("skipping sample: {}", error);
                }
                Err(error) => return Err(error),
            }
            iterations += 1;
            if self.config.sample_limit.is_some_and(|limit| iterations >= limit) {
                break
            }
            if stop.wait(self.config.settle_delay) {
                log::info!("stop requested");
                break
            }
        }
        log::info!("session ended: {} recorded, {} skipped", summary.recorded, summary.skipped);
        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;
    use std::time::Instant;
    use chrono::{NaiveDate, NaiveDateTime};
    use crate::Error;
    use crate::config::Channel;
    use crate::convert::DomainError;
    use crate::device::{Device, DeviceVariant};
    use crate::sink::CsvLog;

    struct FixedSource {
        kelvin: f64,
        inputs: [f64; 4],
        fail_reads: usize,
    }

    impl FixedSource {
        fn new(lna: f64, sp4t: f64, load: f64, kelvin: f64) -> FixedSource {
            FixedSource { kelvin, inputs: [sp4t, load, 0.0, lna], fail_reads: 0 }
        }
    }

    impl AnalogSource for FixedSource {
        fn internal_temperature_kelvin(&mut self) -> Result<f64> {
            if self.fail_reads > 0 {
                self.fail_reads -= 1;
                return Err(Error::DeviceRead("timeout".to_owned()))
            }
            Ok(self.kelvin)
        }

        fn analog_input(&mut self, channel: u8) -> Result<f64> {
            Ok(self.inputs[channel as usize])
        }
    }

    struct SteppingClock(NaiveDateTime);

    impl Clock for SteppingClock {
        fn now(&mut self) -> Timestamp {
            let now = self.0;
            self.0 += chrono::Duration::seconds(1);
            now.into()
        }
    }

    fn logger(limit: usize, start_second: u32) -> SensorLogger<SteppingClock> {
        let start = NaiveDate::from_ymd_opt(2015, 5, 26).unwrap().and_hms_opt(14, 3, start_second).unwrap();
        SensorLogger::with_clock(LoggerConfiguration {
            settle_delay: Duration::ZERO,
            sample_limit: Some(limit),
            ..Default::default()
        }, SteppingClock(start))
    }

    #[derive(Default)]
    struct RecordingDisplay {
        points: Vec<PlotPoint>,
        resets: usize,
        broken: bool,
    }

    impl DisplaySink for RecordingDisplay {
        fn append(&mut self, point: PlotPoint) -> Result<()> {
            if self.broken { return Err(Error::Display("window closed".to_owned())) }
            self.points.push(point);
            Ok(())
        }

        fn reset(&mut self) -> Result<()> {
            if self.broken { return Err(Error::Display("window closed".to_owned())) }
            self.resets += 1;
            Ok(())
        }
    }

    fn rows(log: CsvLog<Vec<u8>>) -> Vec<String> {
        String::from_utf8(log.into_inner()).unwrap().lines().skip(1).map(str::to_owned).collect()
    }

    #[test]
    fn test_end_to_end_row() {
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let mut logger = logger(1, 9);
        let summary = logger.run(&mut source, &mut output, &mut display, &StopToken::never()).unwrap();
        assert_eq!(summary, SessionSummary { recorded: 1, skipped: 0 });

        let config = logger.config().clone();
        let mut expected = vec!["5/26/2015".to_owned(), "14:3:9".to_owned()];
        for (calibration, raw) in config.channels.iter().zip([1.2, 0.8, 1.5]) {
            let resistance = raw * calibration.r_ref / (calibration.v_ref - raw);
            let celsius = match calibration.channel {
                Channel::Lna | Channel::Sp4t => {
                    let ln_r = resistance.ln();
                    1.0 / (0.00129675 + 0.000197374 * ln_r + 0.000000304 * ln_r.powi(3)) - 273.0
                }
                Channel::Load => -24.19 * resistance.ln() + 260.81,
            };
            expected.push(format!("{:.3}", raw));
            expected.push(format!("{:.1}", resistance));
            expected.push(format!("{:.2}", celsius));
        }
        expected.push("27.00".to_owned());
        let rows = rows(output);
        assert_eq!(rows, vec![expected.join(",")]);
        assert_eq!(rows[0], "5/26/2015,14:3:9,1.200,3091.3,55.87,0.800,1931.1,69.27,\
            1.500,4344.3,58.18,27.00");
        assert_eq!(display.points, vec![PlotPoint { second: 9, celsius: 27.0 }]);
    }

    #[test]
    fn test_reference_voltage_skips_row() {
        let mut source = FixedSource::new(1.2, 4.9262, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let mut logger = logger(3, 0);
        assert!(matches!(logger.sample(&mut source), Err(Error::Domain(_))));
        let summary = logger.run(&mut source, &mut output, &mut display, &StopToken::never()).unwrap();
        assert_eq!(summary, SessionSummary { recorded: 0, skipped: 3 });
        assert!(rows(output).is_empty());
        assert!(display.points.is_empty());
    }

    #[test]
    fn test_non_finite_internal_temperature_skips_row() {
        let mut device = Device::simulated(DeviceVariant::U6);
        for (input, volts) in [(3, 1.2), (0, 0.8), (1, 1.5)] {
            device.driver_mut().set_analog_input(input, volts);
        }
        device.driver_mut().set_internal_temperature(f32::NAN);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let summary = logger(1, 0).run(&mut device, &mut output, &mut display, &StopToken::never()).unwrap();
        assert_eq!(summary, SessionSummary { recorded: 0, skipped: 1 });
        assert!(rows(output).is_empty());
        assert!(display.points.is_empty());

        device.driver_mut().set_internal_temperature(f32::INFINITY);
        let mut logger = logger(1, 0);
        assert!(matches!(logger.sample(&mut device),
            Err(Error::Domain(DomainError::NonFiniteInternalTemperature { .. }))));
    }

    #[test]
    fn test_device_error_skips_and_retries() {
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        source.fail_reads = 2;
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let summary = logger(5, 0).run(&mut source, &mut output, &mut display, &StopToken::never()).unwrap();
        assert_eq!(summary, SessionSummary { recorded: 3, skipped: 2 });
        assert_eq!(rows(output).len(), 3);
    }

    #[test]
    fn test_plot_reset() {
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let mut logger = logger(4, 28);
        logger.run(&mut source, &mut output, &mut display, &StopToken::never()).unwrap();
        // seconds 28, 29, 30 (reset), 31
        assert_eq!(display.resets, 1);
        assert_eq!(display.points.len(), 4);
        assert_eq!(logger.plot().len(), 1);
        assert_eq!(logger.plot().points()[0].second, 31);
    }

    #[test]
    fn test_broken_display_does_not_block_log() {
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay { broken: true, ..Default::default() };
        let summary = logger(2, 29).run(&mut source, &mut output, &mut display, &StopToken::never()).unwrap();
        assert_eq!(summary.recorded, 2);
        assert_eq!(rows(output).len(), 2);
    }

    struct FullDisk;

    impl ReadingSink for FullDisk {
        fn record(&mut self, _reading: &Reading) -> Result<()> {
            Err(Error::OutputWrite(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
        }
    }

    #[test]
    fn test_output_error_is_fatal() {
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut display = RecordingDisplay::default();
        let result = logger(5, 0).run(&mut source, &mut FullDisk, &mut display, &StopToken::never());
        assert!(matches!(result, Err(Error::OutputWrite(_))));
        assert!(display.points.is_empty());
    }

    #[test]
    fn test_stop_before_first_sample() {
        let (handle, token) = stop_signal();
        handle.stop();
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let summary = logger(5, 0).run(&mut source, &mut output, &mut display, &token).unwrap();
        assert_eq!(summary, SessionSummary::default());
        assert!(rows(output).is_empty());
    }

    #[test]
    fn test_stop_interrupts_settle_delay() {
        let (handle, token) = stop_signal();
        let mut source = FixedSource::new(1.2, 0.8, 1.5, 300.0);
        let mut output = CsvLog::new(Vec::new()).unwrap();
        let mut display = RecordingDisplay::default();
        let mut logger = SensorLogger::new(LoggerConfiguration {
            settle_delay: Duration::from_secs(60),
            ..Default::default()
        });
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.stop();
        });
        let started = Instant::now();
        let summary = logger.run(&mut source, &mut output, &mut display, &token).unwrap();
        stopper.join().unwrap();
        assert_eq!(summary.recorded, 1);
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_dropped_handle_stops() {
        let (handle, token) = stop_signal();
        assert!(!token.is_stopped());
        drop(handle);
        assert!(token.is_stopped());
        assert!(token.wait(Duration::from_secs(60)));
        assert!(!StopToken::never().is_stopped());
    }
}
