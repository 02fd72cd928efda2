use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// One year.
pub const MAX_SESSION_HOURS: u64 = 24 * 365;

/// Command-line and environment configuration of the web server
#[derive(Debug, Clone, Parser)]
#[command(name = "journal-ratings", version, about = "Academic journal ratings finder")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "JOURNALS_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Spreadsheet with Revista, Origen and Rating columns (.xlsx, .xls, .ods or .csv)
    #[arg(long, env = "JOURNALS_DATASET", default_value = "Journals.xlsx")]
    pub dataset: PathBuf,

    /// Directory served under /static
    #[arg(long, env = "JOURNALS_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Hours a sign-in stays valid (1 to 8760)
    #[arg(
        long,
        env = "JOURNALS_SESSION_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u64).range(1..=MAX_SESSION_HOURS)
    )]
    pub session_hours: u64,
}

impl Config {
    pub fn session_duration(&self) -> Duration {
        Duration::from_secs(self.session_hours * 60 * 60)
    }
}
