use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "teleput")]
#[command(about = "Send text and files to the Teleput Telegram Bot.", long_about = None)]
pub struct Cli {
    /// Set or update your Teleput key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Send the file without compression
    #[arg(short, long)]
    pub raw: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Text or a file name to send. Add second argument for a description
    #[arg(num_args = 0..=2)]
    pub what: Vec<String>,
}

impl Cli {
    /// The key given on the command line, ignoring blank values.
    pub fn new_key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}
