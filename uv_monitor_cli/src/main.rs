mod bus;
mod cli;
mod output;

use std::io::Write;
use std::thread;
use std::time::Duration;

use as7331::{RangingPolicy, SensorConfig};
use clap::Parser;
use simple_eyre::Result;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use cli::*;

fn main() -> Result<()> {
    simple_eyre::install()?;
    let cli = Cli::parse();
    env_logger::init();

    match &cli.command {
        Commands::List => list_buses(),
        Commands::Read(conf) => read_once(conf),
        Commands::Watch(conf) => watch(conf),
        Commands::Raw(conf) => read_raw(conf),
    }
}

/// Returns std::io::Write stream with coloring enabled if program is run interactively
fn get_stdout() -> StandardStream {
    StandardStream::stdout(if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

fn list_buses() -> Result<()> {
    let mut stdout = get_stdout();
    let mut paths: Vec<_> = std::fs::read_dir("/dev")?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("i2c-"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(&mut stdout, "No I2C character devices found.")?;
    } else {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(&mut stdout, "Available I2C buses:")?;
    }
    stdout.reset()?;
    paths.iter().for_each(|p| println!("{}", p.display()));

    Ok(())
}

fn policy_for(conf: &ReadConf) -> RangingPolicy {
    let mut policy = RangingPolicy::default();
    if let Some(max_attempts) = conf.max_attempts {
        policy.max_attempts = max_attempts;
    }
    policy
}

fn read_once(conf: &ReadConf) -> Result<()> {
    let mut sensor = conf.bus.open_sensor(policy_for(conf))?;
    sensor.init_with_config(SensorConfig {
        include_uvc: conf.uvc,
        ..SensorConfig::default()
    })?;

    let result = sensor.measure();
    conf.output.write_result(&result)
}

fn watch(conf: &WatchConf) -> Result<()> {
    let mut sensor = conf.read.bus.open_sensor(policy_for(&conf.read))?;
    sensor.init_with_config(SensorConfig {
        include_uvc: conf.read.uvc,
        ..SensorConfig::default()
    })?;

    let mut taken = 0usize;
    loop {
        let result = sensor.measure();
        conf.read.output.write_result(&result)?;

        taken += 1;
        if conf.count.map(|count| taken >= count).unwrap_or(false) {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(conf.interval));
    }
}

fn read_raw(conf: &RawConf) -> Result<()> {
    let mut sensor = conf.bus.open_sensor(RangingPolicy::default())?;
    sensor.init_with_config(SensorConfig {
        gain: conf.gain,
        integration_time: conf.time,
        include_uvc: conf.uvc,
    })?;

    let result = sensor.measure_raw()?;
    conf.output.write_result(&result)
}
