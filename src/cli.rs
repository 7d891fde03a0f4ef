use clap::Parser;

#[derive(Parser)]
#[command(name = "ordercheck", about = "Vendor portal login & order-status checker")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Compose the report but log it instead of sending mail
    #[arg(long)]
    pub no_mail: bool,
}
