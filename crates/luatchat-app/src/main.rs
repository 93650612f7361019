use anyhow::Result;
use clap::Parser;

use luatchat_api::HttpQaClient;
use luatchat_store::{DisplayPrefs, FileStorage, SessionStore};

use luatchat::cli::Cli;
use luatchat::{config, repl, ChatController, TerminalView};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::resolve(&cli);

    // Session snapshot and display preference share the storage directory
    // but are separate keys; the store owns its handle exclusively.
    let prefs_storage = FileStorage::new(&config.data_dir);
    let prefs = DisplayPrefs::load(&prefs_storage);
    let store = SessionStore::restore(Box::new(FileStorage::new(&config.data_dir)));

    let view = TerminalView::new(prefs.dark_mode());
    let endpoint = HttpQaClient::new(&config.api_base_url);
    let controller = ChatController::new(store, endpoint, view);

    if !cli.no_init {
        controller.initialize().await;
    }

    if let Some(question) = cli.question {
        controller.ask(Some(question)).await;
        return Ok(());
    }

    repl::run_repl(controller, prefs, Box::new(prefs_storage)).await
}
