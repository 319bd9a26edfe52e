//! Integration tests for the room session actor, driving it the way the
//! connection layer does: one unbounded channel per player standing in
//! for their outbound pump.

use std::time::Duration;

use tokio::sync::mpsc;

use bingohall_game::{CardId, GameMode, Item, OwnerIndex};
use bingohall_host::{HostConfig, RoomSession, RoundConfig};
use bingohall_protocol::{ChatMessage, RoundSnapshot, ServerMessage};

type Rx = mpsc::UnboundedReceiver<ServerMessage>;

fn standard_session() -> RoomSession {
    RoomSession::spawn(RoundConfig::standard(), HostConfig::default())
        .unwrap()
}

/// A themed round whose pool is exactly 24 items. Every generated card
/// holds the full pool, so calling it to exhaustion legitimately
/// completes every card. The deterministic fixture for claim tests.
fn tiny_themed_session() -> RoomSession {
    let items: Vec<Item> =
        (0..24).map(|i| Item::from(format!("item-{i}"))).collect();
    RoomSession::spawn(
        RoundConfig::themed("snacks", items),
        HostConfig::default(),
    )
    .unwrap()
}

async fn join(
    session: &RoomSession,
    name: &str,
    token: Option<String>,
) -> (OwnerIndex, RoundSnapshot, Rx) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let owner = session.join(name, token, tx).await.unwrap();
    let welcome = recv(&mut rx).await;
    let ServerMessage::Welcome(snapshot) = welcome else {
        panic!("expected Welcome, got {welcome:?}");
    };
    (owner, snapshot, rx)
}

async fn recv(rx: &mut Rx) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed")
}

/// Lets fire-and-forget commands land before asserting.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_join_welcomes_with_four_cards() {
    let session = standard_session();
    let (owner, snapshot, _rx) = join(&session, "Ada", None).await;

    assert_eq!(owner, OwnerIndex(0));
    assert_eq!(snapshot.owner, OwnerIndex(0));
    assert_eq!(snapshot.player_name, "Ada");
    assert_eq!(snapshot.cards.len(), 4);
    assert_eq!(snapshot.mode, GameMode::Standard);
    assert!(snapshot.called_items.is_empty());
    assert!(snapshot.current_call.is_none());
    assert_eq!(snapshot.resume_token.len(), 32);
    for card in &snapshot.cards {
        assert_eq!(card.owner, OwnerIndex(0));
        assert_eq!(card.cells.len(), 25);
    }
}

#[tokio::test]
async fn test_join_second_player_gets_next_index() {
    let session = standard_session();
    let (a, ..) = join(&session, "Ada", None).await;
    let (b, ..) = join(&session, "Bea", None).await;
    assert_eq!(a, OwnerIndex(0));
    assert_eq!(b, OwnerIndex(1));
}

#[tokio::test]
async fn test_rejoin_by_name_keeps_owner_and_cards() {
    let session = standard_session();
    let (_, first, rx) = join(&session, "Ada", None).await;
    drop(rx); // channel closes, roster entry survives

    let (owner, second, _rx) = join(&session, "ada", None).await;

    assert_eq!(owner, OwnerIndex(0), "case-insensitive name match");
    let first_ids: Vec<CardId> = first.cards.iter().map(|c| c.id).collect();
    let second_ids: Vec<CardId> =
        second.cards.iter().map(|c| c.id).collect();
    assert_eq!(first_ids, second_ids, "identical cards across reconnect");
}

#[tokio::test]
async fn test_rejoin_by_token_survives_rename() {
    let session = standard_session();
    let (_, first, rx) = join(&session, "Ada", None).await;
    drop(rx);

    let (owner, second, _rx) =
        join(&session, "Someone Else", Some(first.resume_token.clone()))
            .await;

    assert_eq!(owner, OwnerIndex(0), "token reclaims the slot");
    assert_eq!(
        first.cards.iter().map(|c| c.id).collect::<Vec<_>>(),
        second.cards.iter().map(|c| c.id).collect::<Vec<_>>(),
    );
}

#[tokio::test]
async fn test_rejoin_does_not_duplicate_cards() {
    let session = standard_session();
    let (..) = join(&session, "Ada", None).await;
    let (..) = join(&session, "Ada", None).await;
    let (_, snapshot, _rx) = join(&session, "Ada", None).await;

    assert_eq!(snapshot.cards.len(), 4, "still exactly four cards");
    let info = session.info().await.unwrap();
    assert_eq!(info.players, 1);
}

// =========================================================================
// Calling
// =========================================================================

#[tokio::test]
async fn test_call_next_broadcasts_in_order_to_all() {
    let session = standard_session();
    let (_, _, mut rx_a) = join(&session, "Ada", None).await;
    let (_, _, mut rx_b) = join(&session, "Bea", None).await;

    let c1 = session.call_next().await.unwrap().expect("call");
    let c2 = session.call_next().await.unwrap().expect("call");

    for rx in [&mut rx_a, &mut rx_b] {
        let m1 = recv(rx).await;
        let m2 = recv(rx).await;
        assert_eq!(m1, ServerMessage::NextCall { item: c1.clone() });
        assert_eq!(m2, ServerMessage::NextCall { item: c2.clone() });
    }
}

#[tokio::test]
async fn test_call_next_exhaustion_returns_none_not_error() {
    let session = tiny_themed_session();
    let (_, _, mut rx) = join(&session, "Ada", None).await;

    for _ in 0..24 {
        assert!(session.call_next().await.unwrap().is_some());
        let _ = recv(&mut rx).await;
    }

    let result = session.call_next().await.unwrap();
    assert!(result.is_none(), "exhausted pool surfaces as None");

    let info = session.info().await.unwrap();
    assert!(info.exhausted);
    assert_eq!(info.remaining, 0);
    assert!(
        rx.try_recv().is_err(),
        "no NextCall broadcast on exhaustion"
    );
}

#[tokio::test]
async fn test_late_joiner_receives_full_history() {
    let session = standard_session();
    let (_, _, mut rx_a) = join(&session, "Ada", None).await;

    let c1 = session.call_next().await.unwrap().unwrap();
    let c2 = session.call_next().await.unwrap().unwrap();
    let _ = recv(&mut rx_a).await;
    let _ = recv(&mut rx_a).await;

    let (_, snapshot, _rx_b) = join(&session, "Bea", None).await;

    // Most-recent-first, exactly the host's history.
    assert_eq!(snapshot.called_items, vec![c2.clone(), c1]);
    assert_eq!(snapshot.current_call, Some(c2));
}

// =========================================================================
// Claims
// =========================================================================

#[tokio::test]
async fn test_claim_with_nothing_called_is_rejected_privately() {
    // Scenario B: client-side marks mean nothing; with no calls issued
    // the rebuilt marks satisfy no pattern.
    let session = standard_session();
    let (owner_a, snapshot, mut rx_a) = join(&session, "Ada", None).await;
    let (_, _, mut rx_b) = join(&session, "Bea", None).await;

    let card_id = snapshot.cards[0].id;
    session.claim(owner_a, card_id).await.unwrap();
    settle().await;

    let reply = recv(&mut rx_a).await;
    assert!(
        matches!(
            reply,
            ServerMessage::ClaimRejected { card_id: c, .. } if c == card_id
        ),
        "claimant hears the rejection, got {reply:?}"
    );
    assert!(
        rx_b.try_recv().is_err(),
        "failed claims are never broadcast"
    );

    let info = session.info().await.unwrap();
    assert!(info.winners.is_empty());
}

#[tokio::test]
async fn test_claim_unknown_card_is_rejected() {
    let session = standard_session();
    let (owner, _, mut rx) = join(&session, "Ada", None).await;

    session.claim(owner, CardId(9999)).await.unwrap();
    settle().await;

    assert!(matches!(
        recv(&mut rx).await,
        ServerMessage::ClaimRejected { .. }
    ));
}

#[tokio::test]
async fn test_duplicate_claims_announce_exactly_once() {
    // Scenario C: after exhausting a 24-item themed pool every card is
    // a legitimate winner. Two racing claims for the same card must
    // yield one recorded winner and one broadcast.
    let session = tiny_themed_session();
    let (owner_a, snapshot, mut rx_a) = join(&session, "Ada", None).await;
    let (owner_b, _, mut rx_b) = join(&session, "Bea", None).await;

    while session.call_next().await.unwrap().is_some() {}
    while let Ok(msg) = rx_a.try_recv() {
        assert!(matches!(msg, ServerMessage::NextCall { .. }));
    }
    while rx_b.try_recv().is_ok() {}

    let card_id = snapshot.cards[0].id;
    // Both players' apps detected the win and raced their claims in.
    session.claim(owner_a, card_id).await.unwrap();
    session.claim(owner_b, card_id).await.unwrap();
    session.claim(owner_a, card_id).await.unwrap();
    settle().await;

    let info = session.info().await.unwrap();
    assert_eq!(info.winners, vec![card_id], "recorded exactly once");

    for rx in [&mut rx_a, &mut rx_b] {
        let msg = recv(rx).await;
        assert_eq!(
            msg,
            ServerMessage::BingoAnnounced {
                owner: owner_a,
                card_id
            }
        );
        assert!(
            rx.try_recv().is_err(),
            "exactly one announcement per client"
        );
    }
}

#[tokio::test]
async fn test_claim_announces_card_owner_not_claimant() {
    let session = tiny_themed_session();
    let (owner_a, snapshot_a, mut rx_a) = join(&session, "Ada", None).await;
    let (owner_b, _, mut rx_b) = join(&session, "Bea", None).await;

    while session.call_next().await.unwrap().is_some() {}
    while rx_a.try_recv().is_ok() {}
    while rx_b.try_recv().is_ok() {}

    // Bea claims Ada's card id; verification still targets the card.
    let card_id = snapshot_a.cards[1].id;
    session.claim(owner_b, card_id).await.unwrap();
    settle().await;

    let msg = recv(&mut rx_b).await;
    assert_eq!(
        msg,
        ServerMessage::BingoAnnounced {
            owner: owner_a,
            card_id
        },
        "announcement credits the card's owner"
    );
}

// =========================================================================
// Rounds
// =========================================================================

#[tokio::test]
async fn test_new_round_resets_state_and_pushes_fresh_cards() {
    let session = standard_session();
    let (_, first, mut rx) = join(&session, "Ada", None).await;

    session.call_next().await.unwrap().unwrap();
    let _ = recv(&mut rx).await;

    session.new_round(RoundConfig::standard()).await.unwrap();

    let msg = recv(&mut rx).await;
    let ServerMessage::NewGame(fresh) = msg else {
        panic!("expected NewGame push, got {msg:?}");
    };
    assert_eq!(fresh.owner, first.owner);
    assert_eq!(fresh.cards.len(), 4);
    assert!(fresh.called_items.is_empty());
    assert!(fresh.current_call.is_none());
    let old_ids: Vec<CardId> = first.cards.iter().map(|c| c.id).collect();
    assert!(
        fresh.cards.iter().all(|c| !old_ids.contains(&c.id)),
        "fresh cards, fresh ids"
    );

    let info = session.info().await.unwrap();
    assert_eq!(info.called, 0);
    assert!(info.winners.is_empty());
    assert!(info.current_call.is_none());
}

#[tokio::test]
async fn test_new_round_clears_winners() {
    let session = tiny_themed_session();
    let (owner, snapshot, mut rx) = join(&session, "Ada", None).await;

    while session.call_next().await.unwrap().is_some() {}
    while rx.try_recv().is_ok() {}
    session.claim(owner, snapshot.cards[0].id).await.unwrap();
    settle().await;
    assert_eq!(session.info().await.unwrap().winners.len(), 1);

    session.new_round(RoundConfig::standard()).await.unwrap();
    assert!(session.info().await.unwrap().winners.is_empty());
}

#[tokio::test]
async fn test_new_round_regenerates_for_disconnected_players() {
    let session = standard_session();
    let (..) = join(&session, "Ada", None).await; // rx dropped: disconnected
    settle().await;

    session.new_round(RoundConfig::standard()).await.unwrap();

    // Ada rejoins after the reset and finds a full fresh card set.
    let (owner, snapshot, _rx) = join(&session, "Ada", None).await;
    assert_eq!(owner, OwnerIndex(0));
    assert_eq!(snapshot.cards.len(), 4);
}

#[tokio::test]
async fn test_new_round_failure_leaves_round_untouched() {
    let session = standard_session();
    let (_, _, mut rx) = join(&session, "Ada", None).await;
    let called = session.call_next().await.unwrap().unwrap();
    let _ = recv(&mut rx).await;

    let too_small = RoundConfig::themed(
        "snacks",
        (0..5).map(|i| Item::from(format!("x{i}"))).collect(),
    );
    let result = session.new_round(too_small).await;
    assert!(result.is_err(), "generation failure aborts the switch");

    let info = session.info().await.unwrap();
    assert_eq!(info.called, 1, "running round untouched");
    assert_eq!(info.current_call, Some(called));
    assert!(rx.try_recv().is_err(), "no NewGame was pushed");
}

// =========================================================================
// Chat
// =========================================================================

#[tokio::test]
async fn test_chat_relays_to_others_not_sender() {
    let session = standard_session();
    let (owner_a, _, mut rx_a) = join(&session, "Ada", None).await;
    let (_, _, mut rx_b) = join(&session, "Bea", None).await;
    let (_, _, mut rx_c) = join(&session, "Cyd", None).await;

    let line = ChatMessage {
        id: 0,
        sender: "spoofed".into(),
        text: "almost there".into(),
        timestamp: 0,
    };
    session.chat(owner_a, line).await.unwrap();
    settle().await;

    for rx in [&mut rx_b, &mut rx_c] {
        let msg = recv(rx).await;
        let ServerMessage::Chat { message } = msg else {
            panic!("expected Chat, got {msg:?}");
        };
        assert_eq!(message.text, "almost there");
        assert_eq!(message.sender, "Ada", "sender is the roster name");
        assert!(message.id > 0, "host assigns the id");
    }
    assert!(rx_a.try_recv().is_err(), "no echo back to the sender");
}

// =========================================================================
// Connection loss
// =========================================================================

#[tokio::test]
async fn test_closed_channel_skipped_on_broadcast() {
    let session = standard_session();
    let (_, _, rx_a) = join(&session, "Ada", None).await;
    let (_, _, mut rx_b) = join(&session, "Bea", None).await;
    drop(rx_a);

    // Broadcast still reaches the live player; the dead channel is
    // pruned, not retried.
    let item = session.call_next().await.unwrap().unwrap();
    assert_eq!(
        recv(&mut rx_b).await,
        ServerMessage::NextCall { item }
    );
    settle().await;

    let info = session.info().await.unwrap();
    assert_eq!(info.players, 2, "roster entry survives the close");
    assert_eq!(info.connected, 1);
}
