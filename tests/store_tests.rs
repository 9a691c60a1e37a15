//! Staleness query, archive mutation, and channel lookup against an in-memory database.

mod common;

use chanarchiver::store::{ChannelStore, build_stale_query, open_db};
use chanarchiver::utils::now_millis;
use chanarchiver::{ChannelRef, ChannelType, PageRequest, StaleChannelCriteria};
use common::{Fixture, ids, week_ago, year_ago};
use rusqlite::types::Value;

#[test]
fn test_stale_channels_mixed_activity() {
    let fx = Fixture::new();
    let channels = fx.create_channels(10, "stale-test");
    for ch in &channels {
        fx.populate(&ch.id, 5);
        fx.make_stale(&ch.id);
    }
    let old = year_ago();
    let recent = week_ago();

    // 2: channel row touched recently
    fx.set_timestamps("Channels", &channels[2].id, old, recent, 0);
    // 3: posts edited recently
    fx.set_timestamps("Posts", &channels[3].id, old, recent, 0);
    // 4: reactions recent
    fx.set_timestamps("Reactions", &channels[4].id, old, recent, 0);
    // 5: one fresh post among old ones
    fx.create_posts(1, &channels[5].id);
    // 6: post deleted recently
    fx.set_timestamps("Posts", &channels[6].id, old, old, recent);
    // 7: already archived
    fx.set_timestamps("Channels", &channels[7].id, old, old, old);
    // 8: reaction removed recently
    fx.set_timestamps("Reactions", &channels[8].id, old, old, recent);
    // 9: fresh reaction on an old post
    let old_post = fx.create_posts(1, &channels[9].id);
    fx.set_timestamps("Posts", &channels[9].id, old, old, 0);
    fx.create_reactions(&old_post);

    let criteria = StaleChannelCriteria::new(30);
    let page = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::unbounded())
        .unwrap();

    assert_eq!(ids(&page.items), ids(&channels[0..2]));
    assert!(!page.has_more);
}

#[test]
fn test_empty_channel_judged_on_own_timestamps() {
    let fx = Fixture::new();
    let channels = fx.create_channels(2, "empty");
    let old = year_ago();
    fx.set_timestamps("Channels", &channels[0].id, old, old, 0);

    let page = fx
        .store
        .fetch_stale_channels(&StaleChannelCriteria::new(30), PageRequest::unbounded())
        .unwrap();
    assert_eq!(page.items, vec![channels[0].clone()]);
}

#[test]
fn test_age_threshold_respected() {
    let fx = Fixture::new();
    let channels = fx.create_channels(1, "aging");
    fx.populate(&channels[0].id, 3);
    let sixty_days_ago = now_millis() - 60 * common::DAY_MS;
    for table in ["Channels", "Posts", "Reactions"] {
        fx.set_timestamps(table, &channels[0].id, sixty_days_ago, sixty_days_ago, 0);
    }

    let stale_at_30 = fx
        .store
        .fetch_stale_channels(&StaleChannelCriteria::new(30), PageRequest::unbounded())
        .unwrap();
    let stale_at_90 = fx
        .store
        .fetch_stale_channels(&StaleChannelCriteria::new(90), PageRequest::unbounded())
        .unwrap();
    assert_eq!(stale_at_30.items.len(), 1);
    assert!(stale_at_90.items.is_empty());
}

#[test]
fn test_pagination_covers_all_stale_channels() {
    let fx = Fixture::new();
    let channels = fx.create_channels(100, "paged");
    for ch in channels.iter().step_by(2) {
        fx.populate(&ch.id, 1);
        fx.make_stale(&ch.id);
    }
    let criteria = StaleChannelCriteria::new(30);

    let mut seen: Vec<ChannelRef> = Vec::new();
    let mut pages = 0;
    loop {
        let page = fx
            .store
            .fetch_stale_channels(&criteria, PageRequest::new(pages, 10))
            .unwrap();
        pages += 1;
        assert!(page.items.len() <= 10);
        seen.extend(page.items);
        if !page.has_more {
            break;
        }
        assert!(pages < 20, "pagination did not terminate");
    }

    assert_eq!(pages, 5);
    let expected: Vec<ChannelRef> = channels.iter().step_by(2).cloned().collect();
    assert_eq!(ids(&seen), ids(&expected));

    // Pages concatenate to the unpaginated, id-ordered result.
    let all = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::unbounded())
        .unwrap();
    assert_eq!(seen, all.items);
}

#[test]
fn test_has_more_is_exact_on_partial_last_page() {
    let fx = Fixture::new();
    let channels = fx.create_channels(25, "partial");
    for ch in &channels {
        fx.make_stale(&ch.id);
    }
    let criteria = StaleChannelCriteria::new(30);
    let p2 = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::new(2, 10))
        .unwrap();
    assert_eq!(p2.items.len(), 5);
    assert!(!p2.has_more);
    let p1 = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::new(1, 10))
        .unwrap();
    assert_eq!(p1.items.len(), 10);
    assert!(p1.has_more);
}

#[test]
fn test_explicit_excludes_by_id_and_name() {
    let fx = Fixture::new();
    let channels = fx.create_channels(5, "excl");
    for ch in &channels {
        fx.make_stale(&ch.id);
    }
    let criteria = StaleChannelCriteria::new(30).with_excludes([
        channels[0].id.clone(),
        channels[1].id.clone(),
        channels[2].name.clone(),
    ]);
    let page = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::unbounded())
        .unwrap();
    assert_eq!(ids(&page.items), ids(&channels[3..5]));
}

#[test]
fn test_reserved_and_admin_channels_never_selected() {
    let fx = Fixture::new();
    let old = year_ago();
    for name in ["town-square", "off-topic"] {
        fx.insert_channel(&ChannelRef::new(format!("{name}-id"), name), ChannelType::Open, old);
    }
    let admin = ChannelRef::new("admin-id", "audit");
    fx.insert_channel(&admin, ChannelType::Private, old);
    let regular = ChannelRef::new("regular-id", "regular");
    fx.insert_channel(&regular, ChannelType::Open, old);

    let criteria = StaleChannelCriteria::new(30).with_admin_channel(Some(admin.id.clone()));
    let page = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::unbounded())
        .unwrap();
    assert_eq!(page.items, vec![regular]);
}

#[test]
fn test_type_filter() {
    let fx = Fixture::new();
    let open = fx.create_channels_of_type(1, "open", ChannelType::Open);
    let private = fx.create_channels_of_type(1, "private", ChannelType::Private);
    let direct = fx.create_channels_of_type(1, "direct", ChannelType::Direct);
    for ch in open.iter().chain(&private).chain(&direct) {
        fx.make_stale(&ch.id);
    }

    let default_types = fx
        .store
        .fetch_stale_channels(&StaleChannelCriteria::new(30), PageRequest::unbounded())
        .unwrap();
    let mut expected = open.clone();
    expected.extend(private.clone());
    assert_eq!(ids(&default_types.items), ids(&expected));

    let direct_only = fx
        .store
        .fetch_stale_channels(
            &StaleChannelCriteria::new(30).with_types([ChannelType::Direct]),
            PageRequest::unbounded(),
        )
        .unwrap();
    assert_eq!(direct_only.items, direct);

    let none = fx
        .store
        .fetch_stale_channels(
            &StaleChannelCriteria::new(30).with_types([]),
            PageRequest::unbounded(),
        )
        .unwrap();
    assert!(none.items.is_empty());
    assert!(!none.has_more);
}

#[test]
fn test_explicit_reference_time() {
    let fx = Fixture::new();
    let channels = fx.create_channels(1, "clock");
    let now = now_millis();
    let criteria = StaleChannelCriteria::new(30);

    let today = fx
        .store
        .fetch_stale_channels_at(&criteria, PageRequest::unbounded(), now)
        .unwrap();
    assert!(today.items.is_empty());

    let next_year = fx
        .store
        .fetch_stale_channels_at(&criteria, PageRequest::unbounded(), now + 365 * common::DAY_MS)
        .unwrap();
    assert_eq!(next_year.items, channels);
}

#[test]
fn test_build_stale_query_paging_params() {
    let criteria = StaleChannelCriteria::new(30);
    let q = build_stale_query(&criteria, PageRequest::new(3, 10), 0)
        .unwrap()
        .unwrap();
    assert!(q.sql.contains("LIMIT ? OFFSET ?"));
    let n = q.params.len();
    assert_eq!(q.params[n - 2], Value::Integer(11));
    assert_eq!(q.params[n - 1], Value::Integer(30));
    assert_eq!(q.params[0], Value::Integer(-30 * common::DAY_MS));

    let unbounded = build_stale_query(&criteria, PageRequest::unbounded(), 0)
        .unwrap()
        .unwrap();
    assert!(!unbounded.sql.contains("LIMIT"));

    let no_types = build_stale_query(&criteria.clone().with_types([]), PageRequest::unbounded(), 0);
    assert!(no_types.unwrap().is_none());
}

#[test]
fn test_huge_page_size_returns_every_row() {
    let fx = Fixture::new();
    let channels = fx.create_channels(3, "huge");
    for ch in &channels {
        fx.make_stale(&ch.id);
    }
    let criteria = StaleChannelCriteria::new(30);

    for size in [usize::MAX, i64::MAX as usize, i64::MAX as usize + 1] {
        let page = fx
            .store
            .fetch_stale_channels(&criteria, PageRequest::new(0, size))
            .unwrap();
        assert_eq!(ids(&page.items), ids(&channels), "page size {size}");
        assert!(!page.has_more);
    }

    let q = build_stale_query(&criteria, PageRequest::new(0, usize::MAX), 0)
        .unwrap()
        .unwrap();
    assert_eq!(q.params[q.params.len() - 2], Value::Integer(-1));
}

#[test]
fn test_out_of_range_offset_is_an_error() {
    let fx = Fixture::new();
    let criteria = StaleChannelCriteria::new(30);
    let err = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::new(2, usize::MAX))
        .unwrap_err();
    assert!(err.to_string().contains("out of range"), "{err}");
    assert!(
        fx.store
            .fetch_stale_channels(&criteria, PageRequest::new(1, i64::MAX as usize + 1))
            .is_err()
    );
}

#[test]
fn test_archive_channel_idempotent() {
    let fx = Fixture::new();
    let channels = fx.create_channels(1, "arch");
    let id = &channels[0].id;

    fx.store.archive_channel_at(id, 1_000).unwrap();
    assert_eq!(fx.delete_at(id), 1_000);
    assert!(fx.store.get_channel(id).unwrap().is_archived());

    // Second archive keeps the original marker.
    fx.store.archive_channel_at(id, 2_000).unwrap();
    assert_eq!(fx.delete_at(id), 1_000);
}

#[test]
fn test_archive_unknown_channel_fails() {
    let fx = Fixture::new();
    let err = fx.store.archive_channel("missing").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_archived_channel_leaves_candidate_pool() {
    let fx = Fixture::new();
    let channels = fx.create_channels(3, "pool");
    for ch in &channels {
        fx.make_stale(&ch.id);
    }
    let criteria = StaleChannelCriteria::new(30);
    fx.store.archive_channel(&channels[1].id).unwrap();
    let page = fx
        .store
        .fetch_stale_channels(&criteria, PageRequest::unbounded())
        .unwrap();
    let mut expected = vec![channels[0].clone(), channels[2].clone()];
    expected.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(page.items, expected);
}

#[test]
fn test_get_channel() {
    let fx = Fixture::new();
    let ch = ChannelRef::new("lookup-id", "lookup");
    fx.insert_channel(&ch, ChannelType::Private, 42);

    let info = fx.store.get_channel("lookup-id").unwrap();
    assert_eq!(info.name, "lookup");
    assert_eq!(info.display_name, "lookup");
    assert_eq!(info.channel_type, ChannelType::Private);
    assert_eq!(info.update_at, 42);
    assert!(!info.is_archived());

    assert!(fx.store.get_channel("nope").is_err());
}

#[test]
fn test_open_db_on_disk_creates_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("platform.db");
    {
        let store = open_db(&path).unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO Channels (Id, Name, Type, CreateAt, UpdateAt) VALUES ('a', 'a', 'O', 0, 0)",
                [],
            )
            .unwrap();
    }
    let reopened = open_db(&path).unwrap();
    let info = reopened.get_channel("a").unwrap();
    assert_eq!(info.channel_type, ChannelType::Open);
}
