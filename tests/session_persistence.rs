//! Integration tests for sessions backed by the sled blob store

use chrono::{TimeZone, Utc};
use snakesave::progress::{
    BlobStore, Catalog, LoadOutcome, Preferences, RewardPolicy, Section, Session,
    SledBlobStore, SledBlobStoreBuilder, SoundStatus, StandardCatalog, TutorialStatus,
    DEFAULT_SAVE_KEY,
};
use tempfile::TempDir;

fn catalog() -> Catalog {
    Catalog::from_provider(&StandardCatalog).expect("catalog")
}

fn open(dir: &TempDir) -> Session<SledBlobStore> {
    let store = SledBlobStore::open(dir.path()).expect("store");
    Session::open(store, DEFAULT_SAVE_KEY, catalog()).expect("session")
}

#[test]
fn test_purchases_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut session = open(&dir);
        assert_eq!(session.outcome(), LoadOutcome::FirstRun);
        session.progress_mut().set_total_score(150);
        session
            .progress_mut()
            .unlock_purchaseable(Section::Hats, 1)
            .unwrap();
        session
            .progress_mut()
            .select_purchaseable(Section::Hats, 1)
            .unwrap();
        session.checkpoint().unwrap();
    }

    let session = open(&dir);
    assert_eq!(session.outcome(), LoadOutcome::Restored);
    let progress = session.progress();
    assert_eq!(progress.total_score(), 50);
    assert_eq!(progress.selected_hat(), 1);
    assert!(progress.is_purchaseable_unlocked(Section::Hats, 1).unwrap());
}

#[test]
fn test_corrupt_save_is_replaced_on_open() {
    let dir = TempDir::new().expect("tempdir");
    {
        let store = SledBlobStore::open(dir.path()).expect("store");
        store.save_raw(DEFAULT_SAVE_KEY, "H0x;garbage").unwrap();
    }

    let session = open(&dir);
    assert_eq!(session.outcome(), LoadOutcome::Recovered);
    assert_eq!(session.progress().total_score(), 0);
    let stored = session.store().load_raw(DEFAULT_SAVE_KEY).unwrap();
    assert_eq!(stored, Some(session.progress().encode()));
    drop(session);

    // The reseeded blob decodes cleanly next time.
    assert_eq!(open(&dir).outcome(), LoadOutcome::Restored);
}

#[test]
fn test_unchecked_changes_are_lost() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut session = open(&dir);
        session.progress_mut().set_total_score(999);
    }
    assert_eq!(open(&dir).progress().total_score(), 0);
}

#[test]
fn test_preferences_share_the_store() {
    let dir = TempDir::new().expect("tempdir");
    {
        let session = open(&dir);
        let prefs = session.preferences();
        assert_eq!(prefs.sound_status().unwrap(), SoundStatus::On);
        assert_eq!(prefs.tutorial_status().unwrap(), TutorialStatus::Open);
        prefs.set_sound_status(SoundStatus::Off).unwrap();
    }

    let store = SledBlobStore::open(dir.path()).expect("store");
    let prefs = Preferences::new(&store);
    assert_eq!(prefs.sound_status().unwrap(), SoundStatus::Off);
}

#[test]
fn test_daily_reward_persists_across_sessions() {
    let dir = TempDir::new().expect("tempdir");
    let policy = RewardPolicy {
        enabled: true,
        daily_play_bonus: 50,
    };
    let morning = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
    let next_day = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

    {
        let mut session = open(&dir).with_rewards(policy);
        let summary = session.finish_run(20, morning).unwrap();
        assert_eq!(summary.daily_reward, Some(50));
        assert_eq!(summary.total_score, 70);
    }
    {
        let mut session = open(&dir).with_rewards(policy);
        let summary = session.finish_run(5, evening).unwrap();
        assert_eq!(summary.daily_reward, None);
        assert_eq!(summary.total_score, 75);
        assert_eq!(summary.highscore, 20);
    }

    let mut session = open(&dir).with_rewards(policy);
    assert_eq!(session.claim_daily_reward(next_day).unwrap(), Some(50));
    assert_eq!(session.progress().total_score(), 125);
}

#[test]
fn test_disabled_rewards_pay_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let mut session = open(&dir).with_rewards(RewardPolicy {
        enabled: false,
        daily_play_bonus: 50,
    });
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let summary = session.finish_run(10, now).unwrap();
    assert_eq!(summary.daily_reward, None);
    assert_eq!(summary.total_score, 10);
}

#[test]
fn test_custom_tree_and_key_are_isolated() {
    let dir = TempDir::new().expect("tempdir");
    let store = SledBlobStoreBuilder::new(dir.path())
        .with_tree("slot_b")
        .open()
        .expect("store");
    let mut session = Session::open(&store, "SlotB", catalog()).expect("session");
    session.progress_mut().set_highscore(12);
    session.checkpoint().unwrap();

    assert!(store.load_raw(DEFAULT_SAVE_KEY).unwrap().is_none());
    let saved = store.load_raw("SlotB").unwrap().expect("slot saved");
    assert!(saved.contains("S012;"));
}
