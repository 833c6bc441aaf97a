// Terminal Driver
//
// 在终端中驱动视图模型：打开聊天窗口，逐行读取输入并流式打印回复

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::infrastructure::{AppEvent, EventBus};
use crate::modules::chat::{ChatDomainEvent, MessageKind, MessageRole, SendOutcome};
use crate::modules::contact::{ContactError, FormField};
use crate::shared::AppResult;
use crate::ui::{KeyInput, Site};

const HELP: &str = "Commands: /open /close /stop /page /contact /help /quit";

/// 终端命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Open,
    Close,
    Stop,
    Page,
    Contact,
    Help,
    Quit,
    /// 普通文本：作为聊天消息发送
    Say(String),
    Unknown(String),
}

impl TerminalCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/open" => TerminalCommand::Open,
            "/close" => TerminalCommand::Close,
            "/stop" => TerminalCommand::Stop,
            "/page" => TerminalCommand::Page,
            "/contact" => TerminalCommand::Contact,
            "/help" => TerminalCommand::Help,
            "/quit" | "/exit" => TerminalCommand::Quit,
            _ if trimmed.starts_with('/') => TerminalCommand::Unknown(trimmed.to_string()),
            _ => TerminalCommand::Say(line.to_string()),
        }
    }
}

/// 把聊天事件渲染到标准输出
fn spawn_transcript_printer(event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AppEvent::Chat(event)) => print_chat_event(&event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!("[Terminal] Printer lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_chat_event(event: &ChatDomainEvent) {
    let mut out = std::io::stdout();
    match event {
        ChatDomainEvent::MessageAppended(e) if e.message.role() == MessageRole::Assistant => {
            match e.message.kind() {
                MessageKind::Placeholder => {}
                MessageKind::Failure => {
                    let _ = writeln!(out, "EloyText: {}", e.message.text());
                }
                MessageKind::Normal => {
                    let _ = write!(out, "EloyText: {}", e.message.text());
                }
            }
        }
        ChatDomainEvent::MessageUpdated(e) => {
            let _ = write!(out, "{}", e.fragment);
        }
        ChatDomainEvent::StateChanged(e) if e.from.is_awaiting_response() => {
            let _ = writeln!(out);
        }
        _ => {}
    }
    let _ = out.flush();
}

fn prompt(label: &str) {
    let mut out = std::io::stdout();
    let _ = write!(out, "{}", label);
    let _ = out.flush();
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> AppResult<Option<String>> {
    Ok(lines.next_line().await?)
}

/// 逐个字段读取并提交联系表单
async fn run_contact_flow(site: &Site, lines: &mut Lines<BufReader<Stdin>>) -> AppResult<()> {
    let view = site.contact.view().await;
    println!("-- {} --", view.heading);
    for field in view.fields {
        let marker = if field.required { " *" } else { "" };
        prompt(&format!("{}{} ({}): ", field.label, marker, field.placeholder));
        let Some(value) = read_line(lines).await? else {
            return Ok(());
        };
        site.contact.edit(field.field, value).await;
    }

    match site.contact.submit().await {
        Ok(()) => {}
        Err(ContactError::Validation(errors)) => {
            for field in FormField::ALL {
                if let Some(message) = errors.get(&field) {
                    println!("  {}: {}", field, message);
                }
            }
        }
        Err(e) => debug!("[Terminal] Contact submission failed: {}", e),
    }

    let view = site.contact.view().await;
    if let Some(banner) = view.success_banner {
        println!("{}", banner);
    }
    if let Some(banner) = view.error_banner {
        println!("{}", banner);
    }
    Ok(())
}

async fn print_page(site: &Site) {
    let view = site.page_view().await;
    for section in &view.sections {
        let mark = if section.visible { "x" } else { " " };
        println!("[{}] {}", mark, section.title);
    }
    println!("Chat launcher: {}", view.launcher.aria_label);
}

async fn send(
    site: &mut Site,
    text: String,
    lines: &mut Lines<BufReader<Stdin>>,
) -> AppResult<()> {
    if !site.chat.is_open() {
        site.chat.open().await;
    }
    site.chat.set_draft(text);
    let Some(mut handle) = site.chat.handle_key(KeyInput::Enter { shift: false }).await else {
        let view = site.chat.view().await?;
        if let Some(banner) = view.modal.and_then(|m| m.unavailable_banner) {
            println!("{}", banner);
        }
        site.chat.set_draft(String::new());
        return Ok(());
    };

    // 回复流式输出期间只接受 /stop
    let mut input_open = true;
    let joined = loop {
        tokio::select! {
            joined = &mut handle => break joined,
            line = lines.next_line(), if input_open => match line? {
                Some(line) if TerminalCommand::parse(&line) == TerminalCommand::Stop => {
                    site.chat.stop().await;
                }
                Some(_) => println!("(waiting for the reply, /stop to cancel)"),
                None => input_open = false,
            },
        }
    };

    match joined {
        Ok(SendOutcome::Failed { .. }) => {
            if let Some(banner) = site.chat.view().await?.modal.and_then(|m| m.error_banner) {
                println!("({})", banner);
            }
        }
        Ok(_) => {}
        Err(e) => error!("[Terminal] Send task failed: {}", e),
    }
    Ok(())
}

/// 交互循环
pub async fn run_terminal(mut site: Site, event_bus: Arc<EventBus>) -> AppResult<()> {
    let printer = spawn_transcript_printer(&event_bus);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("EloyText Live Chat");
    println!("{}", HELP);
    site.chat.open().await;
    if let Some(modal) = site.chat.view().await?.modal {
        if let Some(banner) = &modal.unavailable_banner {
            println!("{}", banner);
        }
        for message in &modal.messages {
            println!("EloyText: {}", message.text);
        }
    }

    loop {
        prompt("> ");
        let Some(line) = read_line(&mut lines).await? else {
            break;
        };

        match TerminalCommand::parse(&line) {
            TerminalCommand::Open => {
                site.chat.open().await;
                if let Some(modal) = site.chat.view().await?.modal {
                    for message in modal.messages {
                        let who = if message.is_user { "You" } else { "EloyText" };
                        println!("[{}] {}: {}", message.time_label, who, message.text);
                    }
                }
            }
            TerminalCommand::Close => {
                site.chat.close().await;
                println!("Chat closed. Type /open to continue the conversation.");
            }
            TerminalCommand::Stop => {
                if !site.chat.stop().await {
                    println!("Nothing to stop.");
                }
            }
            TerminalCommand::Page => print_page(&site).await,
            TerminalCommand::Contact => run_contact_flow(&site, &mut lines).await?,
            TerminalCommand::Help => println!("{}", HELP),
            TerminalCommand::Quit => break,
            TerminalCommand::Unknown(command) => {
                println!("Unknown command {}. {}", command, HELP)
            }
            TerminalCommand::Say(text) => send(&mut site, text, &mut lines).await?,
        }
    }

    drop(site);
    printer.abort();
    Ok(())
}
