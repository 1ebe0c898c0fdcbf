//! Pipeline Integration Tests
//!
//! Drive gateway packets through handlers, the listener registry and the
//! dispatcher, and check cache state and listener-visible behavior.
//!
//! Run with: cargo test -p integration-tests --test pipeline_tests

use std::sync::Arc;
use std::time::Duration;

use chat_common::ClientConfig;
use chat_core::{Emoji, Snowflake};
use chat_gateway::events::{
    ChannelDeleteEvent, GuildDeleteEvent, MessageCreateEvent, MessageDeleteEvent, ReactionAddEvent,
    ReactionRemoveAllEvent,
};
use chat_gateway::listeners::ScopeKey;
use chat_gateway::protocol::Packet;
use chat_gateway::PacketPump;
use integration_tests::*;
use serde_json::json;

// ============================================================================
// Remove-all scenarios
// ============================================================================

#[tokio::test]
async fn test_remove_all_on_cached_message() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    ctx.cache().update_message(MESSAGE_ID, |message| {
        message.add_reaction(&Emoji::unicode("👍"), USER_A, false);
        message.add_reaction(&Emoji::unicode("👍"), USER_B, false);
    });

    let log = CallLog::new();
    log.record::<ReactionRemoveAllEvent>(ctx, ScopeKey::Channel(CHANNEL_ID), |e| {
        format!("channel:{}:{}", e.message_id, e.channel_id)
    });
    log.record::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, |e| {
        format!("global:{}:{}", e.message_id, e.channel_id)
    });

    client
        .feed([envelope(
            r#"{"t":"MESSAGE_REACTION_REMOVE_ALL","d":{"channel_id":"100","message_id":"200"}}"#,
        )])
        .await;

    assert_eq!(log.calls(), vec!["channel:200:100", "global:200:100"]);
    let message = ctx.cache().cached_message(MESSAGE_ID).unwrap();
    assert!(message.reactions().is_empty());
    assert!(client.observer.packet_errors().is_empty());
}

#[tokio::test]
async fn test_remove_all_on_message_without_reactions() {
    let client = TestClient::seeded();
    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(&client.ctx, ScopeKey::Global, "global");

    client.feed([remove_all_packet(CHANNEL_ID, MESSAGE_ID)]).await;

    assert_eq!(log.count("global"), 1);
    let message = client.ctx.cache().cached_message(MESSAGE_ID).unwrap();
    assert!(message.reactions().is_empty());
}

#[tokio::test]
async fn test_remove_all_on_uncached_message_still_dispatches() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    ctx.cache().remove_message(MESSAGE_ID);

    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Channel(CHANNEL_ID), "channel");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Guild(GUILD_ID), "guild");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, "global");

    client.feed([remove_all_packet(CHANNEL_ID, MESSAGE_ID)]).await;

    assert_eq!(log.calls(), vec!["channel", "guild", "global"]);
    assert!(!ctx.cache().has_message(MESSAGE_ID));
    assert!(client.observer.packet_errors().is_empty());
    assert!(client.observer.listener_failures().is_empty());
}

// ============================================================================
// Unknown channel
// ============================================================================

#[tokio::test]
async fn test_unknown_channel_packets_are_dropped() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let unknown = Snowflake::new(999);

    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, "remove-all");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Global, "add");
    log.listen::<MessageDeleteEvent>(ctx, ScopeKey::Global, "delete");

    client
        .feed([
            remove_all_packet(unknown, MESSAGE_ID),
            reaction_add_packet(unknown, MESSAGE_ID, USER_A),
            Packet::new(
                "MESSAGE_DELETE",
                json!({ "id": "200", "channel_id": "999" }),
            ),
            Packet::new(
                "MESSAGE_UPDATE",
                json!({ "id": "200", "channel_id": "999", "content": "edited" }),
            ),
        ])
        .await;

    assert!(log.calls().is_empty());
    assert_eq!(ctx.dispatcher().dispatch_count(), 0);

    let message = ctx.cache().cached_message(MESSAGE_ID).unwrap();
    assert!(message.reactions().is_empty());
    assert_eq!(message.content, "message 200");
    assert!(client.observer.packet_errors().is_empty());
}

// ============================================================================
// Listener gathering
// ============================================================================

#[tokio::test]
async fn test_gather_order_across_scopes() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();

    // Registered out of order on purpose
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Global, "global");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Guild(GUILD_ID), "guild");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Channel(CHANNEL_ID), "channel");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::User(USER_B), "user");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Message(MESSAGE_ID), "message");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::Global, "global-2");
    log.listen::<ReactionAddEvent>(ctx, ScopeKey::User(USER_A), "other-user");

    client
        .feed([reaction_add_packet(CHANNEL_ID, MESSAGE_ID, USER_B)])
        .await;

    assert_eq!(
        log.calls(),
        vec!["message", "user", "channel", "guild", "global", "global-2"]
    );
}

#[tokio::test]
async fn test_callback_registered_twice_fires_twice() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();

    let shared = {
        let log = log.clone();
        move |_: &ReactionRemoveAllEvent| -> Result<(), chat_gateway::listeners::BoxError> {
            log.push("shared");
            Ok(())
        }
    };
    ctx.listeners()
        .register::<ReactionRemoveAllEvent>(ScopeKey::Channel(CHANNEL_ID), shared.clone());
    ctx.listeners()
        .register::<ReactionRemoveAllEvent>(ScopeKey::Global, shared);

    client.feed([remove_all_packet(CHANNEL_ID, MESSAGE_ID)]).await;

    assert_eq!(log.count("shared"), 2);
}

#[tokio::test]
async fn test_private_channel_skips_guild_scope() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Guild(GUILD_ID), "guild");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Channel(DM_CHANNEL_ID), "dm");
    log.record::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, |e| {
        format!("global:{:?}", e.guild_id)
    });

    client
        .feed([remove_all_packet(DM_CHANNEL_ID, Snowflake::new(201))])
        .await;

    assert_eq!(log.calls(), vec!["dm", "global:None"]);
}

#[tokio::test]
async fn test_listener_unregistered_mid_dispatch_still_runs_this_pass() {
    let client = TestClient::seeded();
    let ctx = client.ctx.clone();
    let log = CallLog::new();

    let later = log.listen::<ReactionRemoveAllEvent>(&ctx, ScopeKey::Global, "later");
    let remover = {
        let ctx = ctx.clone();
        let log = log.clone();
        move |_: &ReactionRemoveAllEvent| -> Result<(), chat_gateway::listeners::BoxError> {
            ctx.listeners().unregister(later);
            log.push("remover");
            Ok(())
        }
    };
    ctx.listeners()
        .register::<ReactionRemoveAllEvent>(ScopeKey::Channel(CHANNEL_ID), remover);

    client
        .feed([
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
        ])
        .await;

    // The second packet may be gathered before or after the removal ran
    let calls = log.calls();
    assert_eq!(calls[..2], ["remover", "later"]);
    assert_eq!(log.count("remover"), 2);
}

// ============================================================================
// Dispatch ordering
// ============================================================================

#[tokio::test]
async fn test_same_guild_dispatches_in_submission_order() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();
    log.record::<ReactionAddEvent>(ctx, ScopeKey::Guild(GUILD_ID), |e| e.user_id.to_string());

    let packets: Vec<Packet> = (1..=50)
        .map(|user| reaction_add_packet(CHANNEL_ID, MESSAGE_ID, Snowflake::new(user)))
        .collect();
    client.feed(packets).await;

    let expected: Vec<String> = (1..=50).map(|user: u64| user.to_string()).collect();
    assert_eq!(log.calls(), expected);

    let message = ctx.cache().cached_message(MESSAGE_ID).unwrap();
    assert_eq!(message.reaction(&Emoji::unicode("👍")).unwrap().count(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_different_guilds_do_not_block_each_other() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let other_guild = Snowflake::new(11);
    let other_channel = Snowflake::new(110);
    ctx.cache().insert_guild(guild(other_guild));
    ctx.cache().insert_channel(text_channel(other_channel, other_guild));

    let log = CallLog::new();
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let rx = Arc::new(parking_lot::Mutex::new(rx));

    // Guild 10's listener waits until guild 11's listener has run
    {
        let log = log.clone();
        ctx.listeners().register::<ReactionRemoveAllEvent>(ScopeKey::Guild(GUILD_ID), move |_| {
            rx.lock().recv_timeout(Duration::from_secs(5))?;
            log.push("guild-10");
            Ok(())
        });
    }
    {
        let log = log.clone();
        ctx.listeners().register::<ReactionRemoveAllEvent>(ScopeKey::Guild(other_guild), move |_| {
            log.push("guild-11");
            tx.send(())?;
            Ok(())
        });
    }

    client
        .feed([
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
            remove_all_packet(other_channel, Snowflake::new(210)),
        ])
        .await;

    assert_eq!(log.calls(), vec!["guild-11", "guild-10"]);
    assert!(client.observer.listener_failures().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pump_keeps_per_guild_arrival_order_with_many_workers() -> anyhow::Result<()> {
    let mut config = ClientConfig::default();
    config.gateway.max_concurrent_handlers = 8;
    let client = TestClient::with_config(config);
    let ctx = client.ctx.clone();

    let other_guild = Snowflake::new(11);
    let other_channel = Snowflake::new(110);
    let other_message = Snowflake::new(210);
    ctx.cache().insert_guild(guild(GUILD_ID));
    ctx.cache().insert_channel(text_channel(CHANNEL_ID, GUILD_ID));
    ctx.cache().insert_message(message(MESSAGE_ID, CHANNEL_ID));
    ctx.cache().insert_guild(guild(other_guild));
    ctx.cache().insert_channel(text_channel(other_channel, other_guild));
    ctx.cache().insert_message(message(other_message, other_channel));

    let first = CallLog::new();
    first.record::<ReactionAddEvent>(&ctx, ScopeKey::Guild(GUILD_ID), |e| e.user_id.to_string());
    let second = CallLog::new();
    second.record::<ReactionAddEvent>(&ctx, ScopeKey::Guild(other_guild), |e| e.user_id.to_string());

    let (tx, rx) = PacketPump::channel(&ctx);
    let pump = PacketPump::new(ctx.clone()).spawn(rx);
    for user in 1..=300u64 {
        tx.send(reaction_add_packet(CHANNEL_ID, MESSAGE_ID, Snowflake::new(user)))
            .await?;
        tx.send(reaction_add_packet(other_channel, other_message, Snowflake::new(user)))
            .await?;
    }
    drop(tx);

    assert_eq!(pump.await?, 600);
    ctx.dispatcher().flush().await;

    let expected: Vec<String> = (1..=300u64).map(|user| user.to_string()).collect();
    assert_eq!(first.calls(), expected);
    assert_eq!(second.calls(), expected);
    Ok(())
}

// ============================================================================
// Entity lifecycle
// ============================================================================

#[tokio::test]
async fn test_channel_delete_drops_listeners_of_its_messages() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Message(MESSAGE_ID), "message");
    log.listen::<ChannelDeleteEvent>(ctx, ScopeKey::Channel(CHANNEL_ID), "channel");

    client
        .feed([Packet::new(
            "CHANNEL_DELETE",
            json!({ "id": "100", "type": 0, "guild_id": "10" }),
        )])
        .await;

    assert!(!ctx.cache().has_message(MESSAGE_ID));
    assert_eq!(log.calls(), vec!["channel"]);
    assert!(ctx.listeners().is_empty());

    // The ids come back; the old listeners must not
    ctx.cache().insert_channel(text_channel(CHANNEL_ID, GUILD_ID));
    ctx.cache().insert_message(message(MESSAGE_ID, CHANNEL_ID));
    client.feed([remove_all_packet(CHANNEL_ID, MESSAGE_ID)]).await;
    assert_eq!(log.calls(), vec!["channel"]);
}

#[tokio::test]
async fn test_guild_leave_drops_every_listener_inside_it() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();
    log.listen::<GuildDeleteEvent>(ctx, ScopeKey::Guild(GUILD_ID), "guild");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Channel(CHANNEL_ID), "channel");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Message(MESSAGE_ID), "message");
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, "global");

    client
        .feed([Packet::new("GUILD_DELETE", json!({ "id": "10" }))])
        .await;

    assert_eq!(log.calls(), vec!["guild"]);
    assert!(ctx.cache().guild(GUILD_ID).is_none());
    assert!(!ctx.cache().has_message(MESSAGE_ID));
    assert_eq!(ctx.listeners().len(), 1);

    // Rejoining reuses the root; only the global listener remains
    ctx.cache().insert_guild(guild(GUILD_ID));
    ctx.cache().insert_channel(text_channel(CHANNEL_ID, GUILD_ID));
    client.feed([remove_all_packet(CHANNEL_ID, MESSAGE_ID)]).await;
    assert_eq!(log.calls(), vec!["guild", "global"]);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_failing_listeners_are_isolated() {
    let client = TestClient::seeded();
    let ctx = &client.ctx;
    let log = CallLog::new();

    ctx.listeners()
        .register::<ReactionRemoveAllEvent>(ScopeKey::Message(MESSAGE_ID), |_| {
            Err("listener rejected event".into())
        });
    ctx.listeners()
        .register::<ReactionRemoveAllEvent>(ScopeKey::Channel(CHANNEL_ID), |_| {
            panic!("listener bug")
        });
    log.listen::<ReactionRemoveAllEvent>(ctx, ScopeKey::Global, "global");

    client
        .feed([
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
        ])
        .await;

    assert_eq!(log.count("global"), 2);
    assert_eq!(
        client.observer.listener_failures(),
        vec![
            (0, "LISTENER_FAILED"),
            (1, "LISTENER_PANICKED"),
            (0, "LISTENER_FAILED"),
            (1, "LISTENER_PANICKED"),
        ]
    );
    assert!(client.observer.packet_errors().is_empty());
}

#[tokio::test]
async fn test_malformed_packet_does_not_affect_others() {
    let client = TestClient::seeded();
    let log = CallLog::new();
    log.listen::<ReactionRemoveAllEvent>(&client.ctx, ScopeKey::Global, "global");

    client
        .feed([
            Packet::new("MESSAGE_REACTION_REMOVE_ALL", json!({ "channel_id": "100" })),
            Packet::new(
                "MESSAGE_REACTION_REMOVE_ALL",
                json!({ "channel_id": true, "message_id": "200" }),
            ),
            Packet::new("PRESENCE_UPDATE", json!({})),
            remove_all_packet(CHANNEL_ID, MESSAGE_ID),
        ])
        .await;

    assert_eq!(log.count("global"), 1);
    assert_eq!(
        client.observer.packet_errors(),
        vec![
            ("MESSAGE_REACTION_REMOVE_ALL".to_string(), "MISSING_FIELD"),
            ("MESSAGE_REACTION_REMOVE_ALL".to_string(), "INVALID_FIELD"),
        ]
    );
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[tokio::test]
async fn test_session_replay_through_pump() -> anyhow::Result<()> {
    let mut config = ClientConfig::default();
    config.cache.message_capacity = 2;
    config.gateway.max_concurrent_handlers = 4;
    let client = TestClient::with_config(config);
    let ctx = client.ctx.clone();

    let log = CallLog::new();
    log.record::<MessageCreateEvent>(&ctx, ScopeKey::Global, |e| e.message.content.clone());

    let (tx, rx) = PacketPump::channel(&ctx);
    let pump = PacketPump::new(ctx.clone()).spawn(rx);

    let setup = [
        r#"{"t":"READY","s":1,"d":{"user":{"id":"1","username":"me"},"session_id":"s1","guilds":[{"id":"10","unavailable":true}]}}"#,
        r#"{"t":"GUILD_CREATE","s":2,"d":{"id":"10","name":"guild","owner_id":"1","channels":[{"id":"100","type":0,"name":"general"}]}}"#,
    ];
    for raw in setup {
        tx.send(envelope(raw)).await?;
    }

    for id in 1..=3u64 {
        tx.send(Packet::new(
            "MESSAGE_CREATE",
            json!({
                "id": (1000 + id).to_string(),
                "channel_id": "100",
                "author": { "id": "301", "username": "alice" },
                "content": format!("m{id}"),
            }),
        ))
        .await?;
    }
    drop(tx);

    assert_eq!(pump.await?, 5);
    ctx.shutdown().await;

    assert_eq!(ctx.cache().current_user_id(), Some(Snowflake::new(1)));
    assert_eq!(ctx.cache().message_count(), 2);
    assert_eq!(log.calls().len(), 3);
    assert!(!ctx.dispatcher().is_running());

    Ok(())
}
