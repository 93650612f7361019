//! Interactive chat loop and command surface.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use luatchat_api::QaEndpoint;
use luatchat_store::{DisplayPrefs, KvStorage};

use crate::controller::ChatController;
use crate::view::TerminalView;

/// Starter questions from the welcome screen.
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "Luật Bảo hiểm y tế là gì?",
    "Đối tượng nào bắt buộc tham gia BHYT?",
    "Người tham gia BHYT được hưởng những quyền lợi gì?",
    "Mức đóng BHYT hiện nay là bao nhiêu?",
];

pub async fn run_repl<E: QaEndpoint>(
    controller: ChatController<E, TerminalView>,
    mut prefs: DisplayPrefs,
    mut prefs_storage: Box<dyn KvStorage>,
) -> Result<()> {
    // A restored conversation replays; a fresh one gets the welcome screen.
    if controller.replay_current().await == 0 {
        print_welcome();
    }
    println!(
        "{}",
        "Gõ câu hỏi và nhấn Enter, '/help' để xem lệnh, 'exit' để thoát\n".bright_black()
    );

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("❯ ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if line == "exit" || line == "quit" {
                    break;
                }
                if let Some(command) = line.strip_prefix('/') {
                    handle_command(&controller, &mut prefs, prefs_storage.as_mut(), command)
                        .await;
                } else {
                    controller.ask(Some(line.to_string())).await;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} Lỗi đọc dòng lệnh: {}", "⚠".yellow(), err);
                break;
            }
        }
    }

    Ok(())
}

async fn handle_command<E: QaEndpoint>(
    controller: &ChatController<E, TerminalView>,
    prefs: &mut DisplayPrefs,
    prefs_storage: &mut dyn KvStorage,
    command: &str,
) {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();

    match name {
        "new" => {
            controller.new_session().await;
            print_welcome();
        }
        "history" => print_history(controller).await,
        "open" => match resolve_index(controller, arg).await {
            Some(id) => {
                if let Err(err) = controller.select_session(&id).await {
                    eprintln!("{} {}", "⚠".yellow(), err);
                }
            }
            None => println!("{}", "Dùng: /open <số thứ tự trong /history>".bright_black()),
        },
        "delete" => match resolve_index(controller, arg).await {
            // Deleting is its own command; it never also opens the session.
            Some(id) => match controller.delete_session(&id).await {
                Ok(()) => println!("{}", "Đã xóa cuộc trò chuyện".bright_black()),
                Err(err) => eprintln!("{} {}", "⚠".yellow(), err),
            },
            None => println!("{}", "Dùng: /delete <số thứ tự trong /history>".bright_black()),
        },
        "suggest" => {
            let picked = arg
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| SUGGESTED_QUESTIONS.get(n.wrapping_sub(1)));
            match picked {
                Some(question) => controller.ask_suggested(question).await,
                None => {
                    println!("{}", "Bạn có thể hỏi về:".bold());
                    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
                        println!("  {}. {}", i + 1, question);
                    }
                    println!("{}", "Dùng: /suggest <1-4>".bright_black());
                }
            }
        }
        "dark" => {
            let dark = prefs.toggle(prefs_storage);
            controller.view().set_dark_mode(dark);
            let state = if dark { "bật" } else { "tắt" };
            println!("{}", format!("Chế độ tối: {}", state).bright_black());
        }
        "stats" => {
            let stats = controller.stats().await;
            println!(
                "{} cuộc trò chuyện, {} tin nhắn, trung bình {} tin nhắn/cuộc",
                stats.total_sessions, stats.total_messages, stats.average_messages_per_session
            );
        }
        "help" => print_help(),
        _ => println!(
            "{}",
            format!("Lệnh không hợp lệ: /{} — gõ /help", name).yellow()
        ),
    }
}

/// Map a 1-based history index to the session id it currently points at.
async fn resolve_index<E: QaEndpoint>(
    controller: &ChatController<E, TerminalView>,
    arg: Option<&str>,
) -> Option<String> {
    let index = arg?.parse::<usize>().ok()?.checked_sub(1)?;
    let entries = controller.history().await;
    entries.get(index).map(|entry| entry.id.clone())
}

async fn print_history<E: QaEndpoint>(controller: &ChatController<E, TerminalView>) {
    let entries = controller.history().await;
    if entries.is_empty() {
        println!("{}", "Chưa có cuộc trò chuyện nào".bright_black());
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        let marker = if entry.is_active { "●" } else { " " };
        println!("{} {}. {}", marker.green(), i + 1, entry.title);
    }
}

fn print_welcome() {
    println!("\n{}", "Xin chào! 👋".bright_cyan().bold());
    println!("Tôi là trợ lý pháp lý chuyên tư vấn về Luật Bảo hiểm y tế\n");
    println!("{}", "Bạn có thể hỏi về:".bold());
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        println!("  {}. {}", i + 1, question);
    }
}

fn print_help() {
    println!("{}", "Các lệnh:".bold());
    println!("  /new          cuộc trò chuyện mới");
    println!("  /history      danh sách cuộc trò chuyện");
    println!("  /open <n>     mở cuộc trò chuyện thứ n");
    println!("  /delete <n>   xóa cuộc trò chuyện thứ n");
    println!("  /suggest <n>  hỏi câu gợi ý thứ n");
    println!("  /dark         bật/tắt chế độ tối");
    println!("  /stats        thống kê");
    println!("  exit | quit   thoát");
}
