use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "safe-delete")]
#[command(
    about = "Inspect a file, back it up and move it to the trash instead of deleting it",
    long_about = None
)]
pub struct Cli {
    /// File to move to the trash. Prompted for when omitted.
    pub path: Option<String>,
}
