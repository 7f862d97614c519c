//! End-to-end dispatch against the shipped translations
//! Run with: cargo test --test dispatch_flow

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use yuzu_bot::application::errors::BotError;
use yuzu_bot::application::i18n::Translator;
use yuzu_bot::application::messaging::{CommandDispatcher, CommandRegistry, Dispatch};
use yuzu_bot::application::response::Palette;
use yuzu_bot::application::services::register_defaults;
use yuzu_bot::application::state::{AppState, RuntimeOptions};
use yuzu_bot::domain::entities::Message;
use yuzu_bot::domain::traits::{Bot, BotInfo, MessageId, Reply, Store};
use yuzu_bot::infrastructure::storage::MemoryStore;

const BOT_ID: i64 = 1;
const OWNER: i64 = 10;
const USER: i64 = 100;
const GUILD: i64 = 5;

#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<(MessageId, Reply)>>,
    deleted: Mutex<Vec<MessageId>>,
}

impl RecordingBot {
    fn last(&self) -> Reply {
        self.sent.lock().unwrap().last().map(|(_, r)| r.clone()).expect("nothing sent")
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_reply(&self, _channel_id: i64, reply: &Reply) -> Result<MessageId, BotError> {
        let mut sent = self.sent.lock().unwrap();
        let id = format!("msg-{}", sent.len() + 1);
        sent.push((id.clone(), reply.clone()));
        Ok(id)
    }

    async fn delete_message(&self, _channel_id: i64, message_id: &str) -> Result<(), BotError> {
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: BOT_ID,
            name: "yuzu-test".to_string(),
        }
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    bot: Arc<RecordingBot>,
    dispatcher: CommandDispatcher,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let bot = Arc::new(RecordingBot::default());
        let translator = Translator::load(concat!(env!("CARGO_MANIFEST_DIR"), "/locales/translations.json"))
            .await
            .unwrap();

        let options = RuntimeOptions {
            mention_id: BOT_ID,
            owner_ids: vec![OWNER],
            ..Default::default()
        };
        let state = Arc::new(AppState::new(store.clone(), translator, options).unwrap());

        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry);
        let dispatcher = CommandDispatcher::new(state, bot.clone(), registry);

        Self { store, bot, dispatcher }
    }

    async fn dm(&self, author: i64, text: &str) -> Dispatch {
        self.dispatcher.dispatch(&Message::new(author, author, text)).await.unwrap()
    }

    async fn in_guild(&self, author: i64, text: &str) -> Dispatch {
        let message = Message::new(GUILD, author, text).in_guild(GUILD);
        self.dispatcher.dispatch(&message).await.unwrap()
    }
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_outcome_is_rendered_and_withdrawn() {
    let h = Harness::new().await;

    assert!(matches!(h.dm(USER, "y ping").await, Dispatch::Replied(_)));
    assert_eq!(h.bot.last(), Reply::text("Pong!"));

    let Dispatch::Outcome(handle) = h.dm(USER, "y ping").await else {
        panic!("expected a cooldown outcome");
    };
    let reply = h.bot.last();
    assert_eq!(reply.body, "Slow down! Try again in 3s.");
    assert_eq!(reply.title.as_deref(), Some("Command Exception: Pending"));
    assert_eq!(reply.colour, Some(Palette::friday().pending.packed()));

    let id = handle.message_id().to_string();
    tokio::time::advance(Duration::from_secs(5)).await;
    handle.expired().await;
    assert_eq!(*h.bot.deleted.lock().unwrap(), vec![id]);

    // Plain replies are never withdrawn
    assert_eq!(h.bot.deleted.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_locale_change_is_persisted_and_used() {
    let h = Harness::new().await;

    assert!(matches!(h.dm(USER, "y lang es_ES").await, Dispatch::Outcome(_)));
    assert_eq!(h.bot.last().body, "Idioma cambiado a es_ES.");
    assert_eq!(h.store.fetch_user(USER).await.unwrap().unwrap().locale, "es_ES");

    h.dm(USER, "y ping").await;
    assert_eq!(h.bot.last().body, "¡Pong!");
}

#[tokio::test(start_paused = true)]
async fn test_outcome_titles_follow_locale() {
    let h = Harness::new().await;

    h.dm(USER, "y lang es_ES").await;
    assert_eq!(h.bot.last().title.as_deref(), Some("Excepción del comando: Éxito"));

    h.dm(USER, "y ping").await;
    assert!(matches!(h.dm(USER, "y ping").await, Dispatch::Outcome(_)));
    assert_eq!(h.bot.last().title.as_deref(), Some("Excepción del comando: Pendiente"));
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_locale_is_an_error_outcome() {
    let h = Harness::new().await;

    let Dispatch::Outcome(handle) = h.dm(USER, "y lang xx_XX").await else {
        panic!("expected an outcome");
    };
    assert_eq!(h.bot.last().colour, Some(Palette::friday().error.packed()));
    assert_eq!(h.bot.last().title.as_deref(), Some("Command Exception: Error"));
    assert!(!handle.is_expired());
    assert_eq!(h.store.fetch_user(USER).await.unwrap().unwrap().locale, "en_US");
}

#[tokio::test(start_paused = true)]
async fn test_new_prefix_takes_effect_immediately() {
    let h = Harness::new().await;

    assert!(matches!(h.in_guild(USER, "!ping").await, Dispatch::Ignored));

    h.in_guild(USER, "<@1> prefix add !").await;
    assert_eq!(h.bot.last().body, "Added prefix `!`.");

    assert!(matches!(h.in_guild(USER, "!ping").await, Dispatch::Replied(_)));
    assert_eq!(h.bot.last().body, "Pong!");

    h.in_guild(USER, "<@!1> prefix list").await;
    assert_eq!(h.bot.last().body, "Prefixes here: `!`");
}

#[tokio::test(start_paused = true)]
async fn test_unaddressed_and_unknown_messages_send_nothing() {
    let h = Harness::new().await;

    assert!(matches!(h.dm(USER, "hello there").await, Dispatch::Ignored));
    assert!(matches!(h.dm(USER, "y").await, Dispatch::Ignored));
    assert!(matches!(h.dm(BOT_ID, "y ping").await, Dispatch::Ignored));
    match h.dm(USER, "y frobnicate").await {
        Dispatch::UnknownCommand(name) => assert_eq!(name, "frobnicate"),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(h.bot.sent_count(), 0);
    assert_eq!(h.store.stats().user_upserts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_owner_only_command() {
    let h = Harness::new().await;

    h.dm(USER, "y reload").await;
    let denied = h.bot.last();
    assert_eq!(denied.body, "Only the bot owner can use that.");
    assert_eq!(denied.colour, Some(Palette::friday().cancelled.packed()));

    h.dm(OWNER, "y reload").await;
    let reloaded = h.bot.last();
    assert_eq!(reloaded.body, "Reloaded translations for 2 locale(s).");
    assert_eq!(reloaded.colour, Some(Palette::friday().success.packed()));
}

#[tokio::test(start_paused = true)]
async fn test_guild_only_command_in_dm() {
    let h = Harness::new().await;

    h.dm(USER, "y prefix list").await;
    let reply = h.bot.last();
    assert_eq!(reply.body, "That command only works in a server.");
    assert_eq!(reply.title.as_deref(), Some("Command Exception: Neutral"));
}

#[tokio::test(start_paused = true)]
async fn test_first_contact_creates_rows_once() {
    let h = Harness::new().await;

    h.in_guild(USER, "<@1> ping").await;
    h.in_guild(USER, "<@1> settings").await;

    let stats = h.store.stats();
    assert_eq!(stats.user_upserts, 1);
    assert_eq!(stats.guild_upserts, 1);
    assert_eq!(h.bot.last().body, "Language: en_US\nTime zone: UTC");
}

#[tokio::test(start_paused = true)]
async fn test_joined_guild_members_need_no_fetch() {
    let h = Harness::new().await;

    let (guild, added) = h.dispatcher.state().register_guild(GUILD, &[USER, 200]).await.unwrap();
    assert_eq!(added, 2);
    assert_eq!(h.store.fetch_guild(GUILD).await.unwrap(), Some(guild));
    let before = h.store.stats();

    h.in_guild(USER, "<@1> ping").await;
    h.in_guild(200, "<@1> settings").await;

    let after = h.store.stats();
    assert_eq!(after.user_fetches, before.user_fetches);
    assert_eq!(after.user_upserts, before.user_upserts);
    assert_eq!(after.guild_fetches, before.guild_fetches);
    assert_eq!(h.bot.last().body, "Language: en_US\nTime zone: UTC");
}
