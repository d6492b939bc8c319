use as7331::{Error, Gain, IntegrationTime};
use clap::{Args, Parser, Subcommand};
use num_traits::FromPrimitive;

use crate::{bus::BusConf, output::Output};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists I2C character devices present on this machine
    List,
    /// Takes one auto-ranged measurement
    Read(ReadConf),
    /// Keeps measuring at a fixed interval
    Watch(WatchConf),
    /// Takes one measurement at explicit settings, no auto-ranging
    Raw(RawConf),
}

#[derive(Args)]
pub struct ReadConf {
    /// Also read the uncalibrated UVC channel
    #[clap(long)]
    pub uvc: bool,

    /// Attempt ceiling for the ranging loop
    #[clap(long, value_parser)]
    pub max_attempts: Option<u8>,

    #[clap(flatten)]
    pub output: Output,

    #[clap(flatten)]
    pub bus: BusConf,
}

#[derive(Args)]
pub struct WatchConf {
    /// Seconds between measurements
    #[clap(short, long, value_parser, default_value = "2")]
    pub interval: u64,

    /// Stop after this many measurements
    #[clap(short, long, value_parser)]
    pub count: Option<usize>,

    #[clap(flatten)]
    pub read: ReadConf,
}

#[derive(Args)]
pub struct RawConf {
    /// Gain multiplier (1, 2, 4, ... 2048)
    #[clap(long, value_parser = parse_gain, default_value = "1")]
    pub gain: Gain,

    /// Integration time in milliseconds (1, 2, 4, ... 64)
    #[clap(long, value_parser = parse_integration_time, default_value = "64")]
    pub time: IntegrationTime,

    /// Also read the uncalibrated UVC channel
    #[clap(long)]
    pub uvc: bool,

    #[clap(flatten)]
    pub output: Output,

    #[clap(flatten)]
    pub bus: BusConf,
}

fn parse_gain(s: &str) -> Result<Gain, Error> {
    s.parse::<u32>()
        .ok()
        .filter(|m| m.is_power_of_two())
        .and_then(|m| FromPrimitive::from_u32(m.trailing_zeros()))
        .ok_or(Error::InvalidConfig)
}

fn parse_integration_time(s: &str) -> Result<IntegrationTime, Error> {
    s.parse::<u32>()
        .ok()
        .filter(|ms| ms.is_power_of_two())
        .and_then(|ms| FromPrimitive::from_u32(ms.trailing_zeros()))
        .ok_or(Error::InvalidConfig)
}
