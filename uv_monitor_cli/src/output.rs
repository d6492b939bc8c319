use std::io::{self, Write};

use as7331::MeasurementResult;
use clap::{ArgEnum, Args};
use simple_eyre::Result;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

#[derive(Args)]
pub struct Output {
    /// Print format for measurements
    #[clap(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Prefix each line with a timestamp
    #[clap(long)]
    pub timestamps: bool,
}

#[derive(ArgEnum, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Csv,
}

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn format_plain(result: &MeasurementResult) -> String {
    let mut line = format!(
        "G:{:<6} | T:{:>4} | UVA: {:8.2} uW/cm2 | UVB: {:8.2} uW/cm2 | raw A:{} B:{}",
        result.gain.to_string(),
        result.integration_time.to_string(),
        result.uva_uw_cm2,
        result.uvb_uw_cm2,
        result.uva_raw,
        result.uvb_raw,
    );
    if let Some(uvc) = result.uvc_raw {
        line.push_str(&format!(" C:{uvc}"));
    }
    line
}

fn format_csv(result: &MeasurementResult) -> String {
    let uvc = result
        .uvc_raw
        .map(|c| c.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{:.2},{:.2}",
        result.gain.multiplier(),
        result.integration_time.millis(),
        result.uva_raw,
        result.uvb_raw,
        uvc,
        result.uva_uw_cm2,
        result.uvb_uw_cm2,
    )
}

impl Output {
    pub fn write_result(&self, result: &MeasurementResult) -> Result<()> {
        log::debug!("Formatting measurement");
        let line = match self.format {
            OutputFormat::Plain => format_plain(result),
            OutputFormat::Csv => format_csv(result),
        };
        let mut stdout = io::stdout().lock();
        if self.timestamps {
            let now = OffsetDateTime::now_local()?;
            write!(stdout, "{} ", now.format(TIMESTAMP_FORMAT)?)?;
        }
        writeln!(stdout, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as7331::{Gain, IntegrationTime};

    fn result() -> MeasurementResult {
        MeasurementResult {
            uva_raw: 18798,
            uvb_raw: 3388,
            uvc_raw: None,
            uva_uw_cm2: 24998.94,
            uvb_uw_cm2: 4999.01,
            gain: Gain::X4,
            integration_time: IntegrationTime::Ms64,
        }
    }

    #[test]
    fn plain_line_carries_settings_and_both_units() {
        let line = format_plain(&result());
        assert!(line.contains("G:4x"));
        assert!(line.contains("T:64ms"));
        assert!(line.contains("raw A:18798 B:3388"));
        assert!(!line.contains(" C:"));
    }

    #[test]
    fn plain_line_appends_uvc_when_present() {
        let line = format_plain(&MeasurementResult {
            uvc_raw: Some(12),
            ..result()
        });
        assert!(line.ends_with(" C:12"));
    }

    #[test]
    fn csv_row_leaves_missing_uvc_empty() {
        let row = format_csv(&result());
        assert_eq!(row, "4,64,18798,3388,,24998.94,4999.01");
    }
}
