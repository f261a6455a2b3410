pub mod labjack;
