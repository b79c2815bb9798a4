//! Interactive chat application for a banchan chat service.
//!
//! This binary provides a streaming REPL interface for chatting with the
//! service, rendering text, tool activity, and final results as they
//! arrive.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the locally resolved endpoint
//! banchan-chat
//!
//! # Point at a specific deployment
//! banchan-chat --base-url https://chat.example.com
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Reset the session (start a new conversation)
//! - `/image <path>` - Attach an image to the next message
//! - `/quit` - Exit the application

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::Notify;

use banchan::{Client, ImageAttachment, StreamEvent};

/// Command-line arguments for the banchan-chat tool.
#[derive(arrrg_derive::CommandLine, Debug, Default, PartialEq, Eq)]
struct ChatArgs {
    /// Base URL of the chat service.
    #[arrrg(optional, "Base URL of the chat service", "URL")]
    base_url: Option<String>,
}

const HELP_TEXT: &str = "/help           Show this help
/clear          Reset the session and start a new conversation
/image <path>   Attach an image to the next message
/quit           Exit";

/// Main entry point for the banchan-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("banchan-chat [OPTIONS]");

    let client = Client::with_options(args.base_url, None)?;
    let mut rl = DefaultEditor::new()?;
    let mut pending_images: Vec<ImageAttachment> = Vec::new();

    // Interrupt handling during streaming: the flag records the request and
    // the notify wakes the select loop even while the stream is stalled.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupt_notify = Arc::new(Notify::new());
    let interrupted_clone = interrupted.clone();
    let notify_clone = interrupt_notify.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
        notify_clone.notify_one();
    })?;

    println!("banchan chat (service: {})", client.base_url());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if line == "/quit" || line == "/exit" {
                    println!("Goodbye!");
                    break;
                }
                if line == "/help" {
                    for help_line in HELP_TEXT.lines() {
                        println!("    {help_line}");
                    }
                    continue;
                }
                if line == "/clear" {
                    client.clear_session();
                    println!("Session cleared.");
                    continue;
                }
                if let Some(path) = line.strip_prefix("/image ") {
                    match ImageAttachment::from_path(path.trim()).await {
                        Ok(attachment) => {
                            println!(
                                "Attached {} ({}), {} pending",
                                path.trim(),
                                attachment.mime_type,
                                pending_images.len() + 1
                            );
                            pending_images.push(attachment);
                        }
                        Err(err) => eprintln!("Failed to attach image: {err}"),
                    }
                    continue;
                }

                let images = std::mem::take(&mut pending_images);
                let stream = match client.stream_with_images(line, images).await {
                    Ok(stream) => stream,
                    Err(err) => {
                        eprintln!("Error: {err}");
                        continue;
                    }
                };
                futures::pin_mut!(stream);

                print!("Assistant: ");
                std::io::stdout().flush()?;

                loop {
                    let item = tokio::select! {
                        item = stream.next() => match item {
                            Some(item) => item,
                            None => break,
                        },
                        _ = interrupt_notify.notified() => {
                            // A stale wakeup from a prompt-time Ctrl-C does
                            // not carry the flag; keep waiting.
                            if interrupted.swap(false, Ordering::Relaxed) {
                                println!("\n[interrupted]");
                                break;
                            }
                            continue;
                        }
                    };
                    match item {
                        Ok(StreamEvent::Text { content }) => {
                            if let Some(text) = content {
                                print!("{text}");
                                std::io::stdout().flush()?;
                            }
                        }
                        Ok(StreamEvent::Tool { tool, status }) => {
                            println!(
                                "\n[tool: {} ({})]",
                                tool.as_deref().unwrap_or("unknown"),
                                status.as_deref().unwrap_or("running"),
                            );
                        }
                        Ok(StreamEvent::ToolProgress { tool, content, .. }) => {
                            if let Some(progress) = content {
                                println!(
                                    "\n[{}: {progress}]",
                                    tool.as_deref().unwrap_or("tool"),
                                );
                            }
                        }
                        Ok(StreamEvent::Done { map_url, images }) => {
                            if let Some(url) = map_url {
                                println!("\nMap: {url}");
                            }
                            for image in images.unwrap_or_default() {
                                println!("Image: {image}");
                            }
                        }
                        Ok(StreamEvent::Session { .. }) => {}
                        Ok(StreamEvent::Error { message }) => {
                            eprintln!(
                                "\nService error: {}",
                                message.as_deref().unwrap_or("unknown error"),
                            );
                        }
                        Err(err) => {
                            eprintln!("\nStream error: {err}");
                            break;
                        }
                    }
                }
                println!("\n");
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    Ok(())
}
