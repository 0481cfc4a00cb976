use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Verification code store")]
pub struct Cli {
    /// Path to a settings TOML file
    #[arg(long)]
    pub settings: Option<String>,
}
