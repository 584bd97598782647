use teloxide::{
    prelude::*,
    types::{ButtonRequest, KeyboardButton, KeyboardMarkup, Me},
    utils::command::BotCommands,
};

use crate::{
    config, dispatch,
    weather::{self, Coordinates},
};

type InternalError = Box<dyn std::error::Error + Send + Sync>;
type HandlerResult = Result<(), InternalError>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to create bot")]
    Creation(#[source] weather::Error),
    #[error("failed to initialize bot")]
    Initialization(#[source] teloxide::RequestError),
}

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "как узнать погоду")]
    Help,
}

fn reply_keyboard(keyboard: &dispatch::Keyboard) -> KeyboardMarkup {
    let rows = keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| {
                let key = KeyboardButton::new(button.label);
                if button.requests_location {
                    key.request(ButtonRequest::Location)
                } else {
                    key
                }
            })
            .collect::<Vec<_>>()
    });

    KeyboardMarkup::new(rows).resize_keyboard()
}

async fn send_reply(bot: &Bot, chat: ChatId, reply: dispatch::Reply) {
    let mut request = bot.send_message(chat, reply.text);
    if let Some(keyboard) = &reply.keyboard {
        request = request.reply_markup(reply_keyboard(keyboard));
    }

    if let Err(err) = request.await {
        log::warn!("failed to send reply to chat {}: {err}", chat.0);
    }
}

fn inbound_event(msg: &Message) -> dispatch::Event {
    if let Some(location) = msg.location() {
        return dispatch::Event::Location(Coordinates {
            latitude: location.latitude,
            longitude: location.longitude,
        });
    }

    match msg.text() {
        Some(text) if text.starts_with('/') => dispatch::Event::Unrecognized,
        Some(text) => dispatch::Event::Text(text.to_string()),
        None => dispatch::Event::Unrecognized,
    }
}

async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: dispatch::Dispatcher,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let event = match cmd {
        Command::Start => dispatch::Event::Start {
            first_name: user.first_name.clone(),
        },
        Command::Help => dispatch::Event::Help,
    };

    let reply = dispatcher.handle(user.id.0, event).await;
    send_reply(&bot, msg.chat.id, reply).await;

    Ok(())
}

async fn message_handler(
    bot: Bot,
    msg: Message,
    dispatcher: dispatch::Dispatcher,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let reply = dispatcher.handle(user.id.0, inbound_event(&msg)).await;
    send_reply(&bot, msg.chat.id, reply).await;

    Ok(())
}

fn start_sessions_sweeper(dispatcher: dispatch::Dispatcher, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            let dropped = dispatcher.sessions().sweep();
            if dropped > 0 {
                log::info!(
                    "swept {} idle session{} ({} pending)",
                    dropped,
                    if dropped != 1 { "s" } else { "" },
                    dispatcher.sessions().len()
                );
            }
        }
    });
}

async fn announce(bot: &Bot) -> Result<Me, teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;

    bot.get_me().await
}

pub async fn run(conf: config::App) -> Result<(), Error> {
    let weather = weather::Client::new(&conf.weather).map_err(Error::Creation)?;
    let dispatcher = dispatch::Dispatcher::new(weather);

    let bot = Bot::new(conf.bot.telegram_token);

    let me = announce(&bot).await.map_err(Error::Initialization)?;
    log::info!("bot has been connected to telegram as @{}", me.username());

    start_sessions_sweeper(dispatcher.clone(), conf.session.sweep_interval());

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("bot has been stopped");

    Ok(())
}
