use as7331::{As7331, Calibration, I2cAdapter, RangingPolicy};
use clap::Args;
use linux_embedded_hal::I2cdev;
use simple_eyre::{eyre::eyre, Result};

#[derive(Args)]
pub struct BusConf {
    /// I2C character device the sensor hangs off
    #[clap(short, long, value_parser, default_value = "/dev/i2c-1")]
    pub bus: String,

    /// 7-bit device address
    #[clap(short, long, value_parser = parse_address, default_value = "0x74")]
    pub address: u8,
}

pub type I2cSensor = As7331<I2cAdapter<I2cdev>>;

impl BusConf {
    pub fn open_sensor(&self, policy: RangingPolicy) -> Result<I2cSensor> {
        let dev = I2cdev::new(&self.bus)
            .map_err(|_| eyre!("Could not open I2C device {}", self.bus))?;
        let adapter = I2cAdapter::with_address(dev, self.address);
        Ok(As7331::with_policy(adapter, policy, Calibration::default()))
    }
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("{s} is not a 7-bit I2C address"))
}
