use super::Parser;
use crate::logger::LogFormat;

#[derive(Parser, Debug)]
#[command(version, about = "Session token authority")]
pub struct Cli {
    /// Path of the settings file
    #[arg(long)]
    pub settings: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
