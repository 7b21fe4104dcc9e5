//! Telegram front end: /top200btc posts the rich list, /csv sends it as a file.

use anyhow::{Context, Result};
use btc_richlist_bot::config::{load_env, Env};
use btc_richlist_bot::services::{RichList, RichListBuilder};
use btc_richlist_bot::utils::format::{render_batches, to_csv_bytes, ENTRIES_PER_MESSAGE, MAX_MESSAGE_CHARS};
use btc_richlist_bot::utils::{init_tracing, Logger};
use std::sync::Arc;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use teloxide::utils::command::BotCommands;

const CSV_FILE_NAME: &str = "top200_btc.csv";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Bitcoin rich list bot commands:")]
enum Command {
    #[command(description = "show this message")]
    Start,
    #[command(description = "show this message")]
    Help,
    #[command(description = "build and show the current top-200 BTC addresses")]
    Top200btc,
    #[command(description = "send the current top-200 as a CSV file")]
    Csv,
}

fn help_text() -> String {
    format!(
        "Hi! I show the <b>current top-200 BTC addresses</b> by balance.\n\n{}",
        Command::descriptions()
    )
}

async fn build(env: &Env) -> Result<RichList> {
    let builder = RichListBuilder::from_settings(&env.settings)?;
    let rich_list = builder.build(env.settings.default_limit).await?;
    Logger::info(&format!(
        "Built rich list: {} entries from {} candidates",
        rich_list.entries.len(),
        rich_list.report.candidates
    ));
    Ok(rich_list)
}

async fn answer(bot: Bot, msg: Message, cmd: Command, env: Arc<Env>) -> ResponseResult<()> {
    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(msg.chat.id, help_text())
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Top200btc => {
            bot.send_message(
                msg.chat.id,
                "Collecting data from several sources and refreshing balances... this can take 1-3 minutes.",
            )
            .await?;

            match build(&env).await {
                Ok(rich_list) => {
                    for batch in render_batches(&rich_list.entries, ENTRIES_PER_MESSAGE, MAX_MESSAGE_CHARS) {
                        bot.send_message(msg.chat.id, batch)
                            .parse_mode(ParseMode::Html)
                            .await?;
                    }
                    bot.send_message(msg.chat.id, "Done ✅").await?;
                }
                Err(e) => {
                    Logger::error(&format!("Build failed: {}", e));
                    bot.send_message(msg.chat.id, format!("Error: {}", e)).await?;
                }
            }
        }
        Command::Csv => {
            bot.send_message(msg.chat.id, "Preparing CSV...").await?;

            match build(&env).await.and_then(|rich_list| to_csv_bytes(&rich_list.entries)) {
                Ok(bytes) => {
                    bot.send_document(msg.chat.id, InputFile::memory(bytes).file_name(CSV_FILE_NAME))
                        .caption("Current top-200 BTC addresses")
                        .await?;
                }
                Err(e) => {
                    Logger::error(&format!("CSV export failed: {}", e));
                    bot.send_message(msg.chat.id, format!("Error: {}", e)).await?;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let env = load_env()?;
    let token = env
        .telegram_bot_token
        .clone()
        .context("Please set TELEGRAM_BOT_TOKEN in .env")?;
    let env = Arc::new(env);

    let bot = Bot::new(token);
    Logger::success("Telegram bot started, waiting for commands...");

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(answer);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![env])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Logger::success("Graceful shutdown completed");
    Ok(())
}
