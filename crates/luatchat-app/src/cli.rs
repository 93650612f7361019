use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for luatchat
#[derive(Parser)]
#[command(name = "luatchat")]
#[command(about = "Trợ lý pháp lý Luật Bảo hiểm y tế - terminal chat client")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Backend API base URL (e.g. http://127.0.0.1:5000/api)
    #[arg(long, value_name = "URL", env = "LUATCHAT_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding persisted chat history and preferences
    #[arg(long, value_name = "DIR", env = "LUATCHAT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Ask a single question and exit instead of starting the chat loop
    #[arg(short = 'q', long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Skip the backend initialize handshake on startup
    #[arg(long)]
    pub no_init: bool,
}
