mod sys;
mod regs;
mod config;
mod convert;
mod reading;
mod device;
mod sink;
mod display;
mod logger;
mod pwm;

#[derive(Debug)]
pub enum Error {
    NotFound,
    DeviceRead(String),
    Domain(DomainError),
    OutputWrite(std::io::Error),
    Display(String),
    Other(Box<dyn std::error::Error + Sync + Send + 'static>),
}

impl Error {
    /// Whether the acquisition loop may skip the failed iteration and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound | Self::DeviceRead(_) | Self::Domain(_) | Self::Display(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotFound =>
                write!(f, "device not connected"),
            Self::DeviceRead(reason) =>
                write!(f, "device read failed: {}", reason),
            Self::Domain(error) =>
                write!(f, "conversion out of domain: {}", error),
            Self::OutputWrite(io_error) =>
                write!(f, "cannot write log file: {}", io_error),
            Self::Display(reason) =>
                write!(f, "display update failed: {}", reason),
            Self::Other(error) =>
                write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            &Self::Domain(ref error) => Some(error),
            &Self::OutputWrite(ref io_error) => Some(io_error),
            _ => None
        }
    }
}

impl From<DomainError> for Error {
    fn from(error: DomainError) -> Self {
        Error::Domain(error)
    }
}

/// The only I/O the crate performs itself is writing the session log.
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::OutputWrite(error)
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use sys::{
    Driver,
    SimDriver,
};

pub use config::{
    Channel,
    TemperatureCurve,
    ChannelCalibration,
    LoggerConfiguration,
    SweepConfiguration,
};

pub use convert::{
    DomainError,
    kelvin_to_celsius,
    internal_temperature,
    resistance,
    temperature,
};

pub use reading::{
    Timestamp,
    ChannelSample,
    Reading,
};

pub use device::{
    DeviceVariant,
    AnalogSource,
    PwmTimer,
    TimerConfig,
    Device,
};

pub use sink::{
    ReadingSink,
    CsvLog,
    COLUMNS,
    log_file_name,
};

pub use display::{
    PlotPoint,
    PlotBuffer,
    DisplaySink,
    TerminalDisplay,
};

pub use logger::{
    Clock,
    SystemClock,
    StopHandle,
    StopToken,
    stop_signal,
    SessionSummary,
    SensorLogger,
};

pub use pwm::{
    DutyStep,
    duty_steps,
    sweep,
};
