#[derive(clap::Parser, Debug)]
#[clap(about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Wasm,
    Wat,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wasm => "wasm",
            Self::Wat => "wat",
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Command {
    /// Parse a file and print the AST of every top-level unit
    Parse { file: std::path::PathBuf },

    /// Compile a file to WASM
    Compile {
        file: std::path::PathBuf,

        /// The file name of the generated WASM output
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Specifies the output format
        #[arg(short, long)]
        #[clap(value_enum, default_value_t = OutputFormat::Wasm)]
        format: OutputFormat,
    },
}
