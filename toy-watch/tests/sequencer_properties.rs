//! Behavioural properties of sequential playback
//!
//! Drives the full player (sequencer + buffer manager + remote slots) with
//! simulated renderer signals and checks the ordering guarantees of a run.

mod helpers;

use helpers::clips;
use std::time::Duration;
use toy_common::api::{RendererCommand, UserAction};
use toy_common::{PlaybackStatus, SlotId};
use toy_watch::config::PlayerSettings;
use toy_watch::playback::{MountRequest, Player, PlayerEvent, RemoteOutbox, RemoteSlot, SlotSignal};

fn settings() -> PlayerSettings {
    PlayerSettings {
        loading_timeout: Duration::from_millis(3000),
        autoplay: false,
        start_muted: true,
    }
}

fn mount_ids(ids: &[&str]) -> (Player<RemoteSlot>, RemoteOutbox) {
    let outbox = RemoteOutbox::new();
    let slot_outbox = outbox.clone();
    let request = MountRequest {
        clips: clips(ids),
        ..MountRequest::default()
    };
    let player = Player::mount(request, settings(), move |slot| {
        RemoteSlot::new(slot, slot_outbox.clone())
    });
    (player, outbox)
}

fn mount_n(n: usize) -> (Player<RemoteSlot>, RemoteOutbox) {
    let ids: Vec<String> = (0..n).map(|i| format!("clip{}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    mount_ids(&refs)
}

fn end_active(player: &mut Player<RemoteSlot>) {
    let slot = player.snapshot().active_slot.unwrap();
    player.report(slot, SlotSignal::Ended);
}

#[test]
fn test_full_run_visits_every_index_in_order() {
    for n in 1..=7 {
        let (mut player, _outbox) = mount_n(n);
        player.user_action(UserAction::Play);

        let mut visited = vec![player.snapshot().current_index.unwrap()];
        for _ in 0..n {
            end_active(&mut player);
            if player.status() == PlaybackStatus::Playing {
                visited.push(player.snapshot().current_index.unwrap());
            }
        }

        assert_eq!(visited, (0..n).collect::<Vec<_>>(), "n = {}", n);
        assert_eq!(player.status(), PlaybackStatus::Finished, "n = {}", n);
    }
}

#[test]
fn test_single_clip_never_uses_slot_b() {
    let (mut player, outbox) = mount_n(1);
    player.user_action(UserAction::ToggleMute);
    player.user_action(UserAction::Play);
    player.user_action(UserAction::Pause);
    player.user_action(UserAction::Play);
    end_active(&mut player);

    assert_eq!(player.status(), PlaybackStatus::Finished);
    let buffers = player.buffers().unwrap();
    assert_eq!(buffers.assignment_count(SlotId::B), 0);

    player.user_action(UserAction::Replay);
    player.report(SlotId::A, SlotSignal::Error("network".to_string()));
    player.unmount();

    let commands = outbox.drain();
    assert!(commands.contains(&RendererCommand::Release { slot: SlotId::A }));
    let slot_b: Vec<_> = commands.iter().filter(|c| c.slot() == SlotId::B).collect();
    assert!(slot_b.is_empty(), "slot B commands: {:?}", slot_b);
}

#[test]
fn test_preload_targets_hidden_slot_with_next_clip() {
    let n = 6;
    let (mut player, _outbox) = mount_n(n);
    player.user_action(UserAction::Play);

    for i in 0..n {
        let snapshot = player.snapshot();
        assert_eq!(snapshot.current_index, Some(i));

        let buffers = player.buffers().unwrap();
        let visible = buffers.visible().unwrap();
        assert_eq!(visible, snapshot.active_slot.unwrap());

        let hidden = visible.other();
        if i + 1 < n {
            assert_eq!(snapshot.preloaded_index, Some(i + 1));
            assert_eq!(buffers.assigned(hidden), Some(i + 1));
        } else {
            assert_eq!(snapshot.preloaded_index, None);
        }

        end_active(&mut player);
    }
}

#[test]
fn test_replay_is_repeatable() {
    let (mut player, _outbox) = mount_n(3);
    player.user_action(UserAction::Play);

    for cycle in 0..4 {
        for _ in 0..3 {
            end_active(&mut player);
        }
        assert_eq!(player.status(), PlaybackStatus::Finished, "cycle {}", cycle);

        player.user_action(UserAction::Replay);
        let snapshot = player.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Loading);
        assert_eq!(snapshot.current_index, Some(0));
        assert_eq!(snapshot.active_slot, Some(SlotId::A));
        assert_eq!(player.buffers().unwrap().assigned(SlotId::A), Some(0));
        assert_eq!(player.buffers().unwrap().assigned(SlotId::B), Some(1));

        player.report(SlotId::A, SlotSignal::Ready);
        assert_eq!(player.status(), PlaybackStatus::Playing);
    }
}

#[test]
fn test_pause_resume_does_not_advance() {
    let (mut player, outbox) = mount_n(3);
    player.user_action(UserAction::Play);
    end_active(&mut player);
    outbox.drain();

    let before = player.snapshot();
    player.user_action(UserAction::Pause);
    player.user_action(UserAction::Play);
    let after = player.snapshot();

    assert_eq!(before.current_index, after.current_index);
    assert_eq!(before.active_slot, after.active_slot);
    assert_eq!(
        outbox.drain(),
        vec![
            RendererCommand::Pause { slot: SlotId::B },
            RendererCommand::Play { slot: SlotId::B },
        ]
    );
}

#[test]
fn test_error_freezes_every_state() {
    let setups: [fn(&mut Player<RemoteSlot>); 4] = [
        |_| {},
        |p| p.user_action(UserAction::Play),
        |p| {
            p.user_action(UserAction::Play);
            p.user_action(UserAction::Pause);
        },
        |p| {
            p.user_action(UserAction::Play);
            for _ in 0..3 {
                let slot = p.snapshot().active_slot.unwrap();
                p.report(slot, SlotSignal::Ended);
            }
        },
    ];

    for setup in setups {
        let (mut player, _outbox) = mount_n(3);
        setup(&mut player);

        let slot = player.snapshot().active_slot.unwrap();
        player.report(slot, SlotSignal::Error("network".to_string()));
        let frozen = player.snapshot();
        assert_eq!(frozen.status, PlaybackStatus::Errored);

        end_active(&mut player);
        player.user_action(UserAction::Play);
        player.user_action(UserAction::Replay);
        player.dispatch(PlayerEvent::LoadTimeout { generation: 1 });

        assert_eq!(player.snapshot(), frozen);
    }
}

#[test]
fn test_abc_scenario() {
    let (mut player, _outbox) = mount_ids(&["a", "b", "c"]);
    player.user_action(UserAction::Play);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Playing);
    assert_eq!(snapshot.current_index, Some(0));
    assert_eq!(player.buffers().unwrap().visible(), Some(SlotId::A));

    player.report(SlotId::A, SlotSignal::Ended);
    assert_eq!(player.snapshot().current_index, Some(1));
    assert_eq!(player.buffers().unwrap().visible(), Some(SlotId::B));
    assert_eq!(player.buffers().unwrap().assigned(SlotId::A), Some(2));
    assert_eq!(player.sequencer().unwrap().clip(2).unwrap().id, "c");

    player.report(SlotId::B, SlotSignal::Ended);
    assert_eq!(player.snapshot().current_index, Some(2));
    assert_eq!(player.buffers().unwrap().visible(), Some(SlotId::A));

    player.report(SlotId::A, SlotSignal::Ended);
    assert_eq!(player.status(), PlaybackStatus::Finished);
}

#[test]
fn test_empty_list_scenario() {
    let (player, outbox) = mount_ids(&[]);

    assert!(player.sequencer().is_none());
    assert!(player.buffers().is_none());
    assert!(outbox.is_empty());
    assert_eq!(player.overlay().notice.as_deref(), Some("no playable content"));
}

#[test]
fn test_preloading_never_starts_playback() {
    let (mut player, outbox) = mount_n(3);

    player.report(SlotId::B, SlotSignal::Ready);
    player.report(SlotId::A, SlotSignal::Ready);

    assert_eq!(player.status(), PlaybackStatus::Loading);
    assert!(!outbox
        .drain()
        .iter()
        .any(|c| matches!(c, RendererCommand::Play { .. })));
}
