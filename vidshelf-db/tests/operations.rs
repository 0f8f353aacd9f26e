use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use vidshelf_catalog::*;
use vidshelf_db::*;

fn open_temp() -> (TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open(dir.path().join("catalog.db")).unwrap();
    (dir, session)
}

fn seed_file(session: &mut Session) -> (Folder, File) {
    let folder = session.folder_add(Path::new("/videos")).unwrap();
    let file = session
        .file_add(Path::new("/videos/a.mp4"), &folder)
        .unwrap();
    (folder, file)
}

// ── Folders and files ───────────────────────────────────────────────────────

#[test]
fn folder_and_file_lifecycle() {
    let (_dir, mut s) = open_temp();

    let folder = s.folder_add(Path::new("/videos")).unwrap();
    assert_eq!(folder.id, 1);
    assert_eq!(folder.path, Path::new("/videos"));
    assert!(folder.never_scanned());

    let file = s.file_add(Path::new("/videos/a.mp4"), &folder).unwrap();
    assert_eq!(file.id, 1);
    assert_eq!(file.folder_id, 1);
    assert_eq!(file.path, Path::new("/videos/a.mp4"));

    let found = s.file_get_by_path(Path::new("/videos/a.mp4")).unwrap();
    assert_eq!(found, Some(file.clone()));

    let err = s.folder_remove(&folder).unwrap_err();
    assert!(err.is_constraint(), "expected constraint error, got {err}");
    assert!(!s.in_transaction());

    s.file_remove(&file).unwrap();
    s.folder_remove(&folder).unwrap();
    assert!(s.folder_get_all().unwrap().is_empty());
}

#[test]
fn added_files_listed_once() {
    let (_dir, mut s) = open_temp();
    let folder = s.folder_add(Path::new("/videos")).unwrap();
    let paths = ["/videos/c.mkv", "/videos/a.mp4", "/videos/b.avi"];
    for p in paths {
        s.file_add(Path::new(p), &folder).unwrap();
    }

    let files = s.file_get_all().unwrap();
    assert_eq!(files.len(), 3);
    for p in paths {
        let matching: Vec<_> = files.iter().filter(|f| f.path == Path::new(p)).collect();
        assert_eq!(matching.len(), 1, "{p}");
        assert!(matching[0].id > 0);
    }
    // Ordered by path
    assert_eq!(files[0].path, Path::new("/videos/a.mp4"));
}

#[test]
fn removed_file_disappears() {
    let (_dir, mut s) = open_temp();
    let folder = s.folder_add(Path::new("/videos")).unwrap();
    let a = s.file_add(Path::new("/videos/a.mp4"), &folder).unwrap();
    s.file_add(Path::new("/videos/b.mp4"), &folder).unwrap();

    let before = s.file_get_all().unwrap().len();
    s.file_remove(&a).unwrap();
    let after = s.file_get_all().unwrap();
    assert_eq!(after.len(), before - 1);
    assert!(after.iter().all(|f| f.id != a.id));
    assert_eq!(s.file_get_by_id(a.id).unwrap(), None);
}

#[test]
fn duplicate_paths_rejected() {
    let (_dir, mut s) = open_temp();
    let (folder, _) = seed_file(&mut s);

    let err = s
        .file_add(Path::new("/videos/a.mp4"), &folder)
        .unwrap_err();
    assert!(err.is_constraint());
    let err = s.folder_add(Path::new("/videos")).unwrap_err();
    assert!(err.is_constraint());
    assert_eq!(s.file_get_all().unwrap().len(), 1);
}

#[test]
fn file_needs_existing_folder() {
    let (_dir, mut s) = open_temp();
    let ghost = Folder {
        id: 42,
        path: "/nowhere".into(),
        last_scan: DateTime::UNIX_EPOCH,
    };
    let err = s.file_add(Path::new("/nowhere/a.mp4"), &ghost).unwrap_err();
    assert!(err.is_constraint());
}

#[test]
fn file_edits_persist() {
    let (_dir, mut s) = open_temp();
    let (_, mut file) = seed_file(&mut s);

    s.file_set_title(&mut file, Some("A Movie")).unwrap();
    s.file_set_year(&mut file, Some(1999)).unwrap();
    s.file_set_hidden(&mut file, true).unwrap();

    let stored = s.file_get_by_id(file.id).unwrap().unwrap();
    assert_eq!(stored, file);
    assert_eq!(stored.display_title(), "A Movie");
    assert_eq!(stored.year, Some(1999));
    assert!(stored.hidden);

    s.file_set_title(&mut file, None).unwrap();
    s.file_set_year(&mut file, None).unwrap();
    let stored = s.file_get_by_id(file.id).unwrap().unwrap();
    assert_eq!(stored.title, None);
    assert_eq!(stored.year, None);
    assert_eq!(stored.display_title(), "a.mp4");
}

#[test]
fn implausible_year_rejected() {
    let (_dir, mut s) = open_temp();
    let (_, mut file) = seed_file(&mut s);

    let err = s.file_set_year(&mut file, Some(1900)).unwrap_err();
    assert!(err.is_constraint());
    assert_eq!(file.year, None);
    assert_eq!(s.file_get_by_id(file.id).unwrap().unwrap().year, None);
}

#[test]
fn folder_scan_stamp_round_trips() {
    let (_dir, mut s) = open_temp();
    let mut folder = s.folder_add(Path::new("/videos")).unwrap();
    let stamp = Utc.with_ymd_and_hms(2021, 8, 7, 18, 30, 5).unwrap()
        + chrono::Duration::milliseconds(250);

    s.folder_update_scan(&mut folder, stamp).unwrap();
    assert!(!folder.never_scanned());
    assert_eq!(folder.last_scan.timestamp_subsec_millis(), 0);

    let stored = s.folder_get_by_id(folder.id).unwrap().unwrap();
    assert_eq!(stored, folder);
}

#[test]
fn folder_reads_are_repeatable() {
    let (_dir, mut s) = open_temp();
    s.folder_add(Path::new("/b")).unwrap();
    s.folder_add(Path::new("/a")).unwrap();

    let first = s.folder_get_all().unwrap();
    let second = s.folder_get_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].path, Path::new("/a"));
}

#[test]
fn files_by_folder() {
    let (_dir, mut s) = open_temp();
    let movies = s.folder_add(Path::new("/movies")).unwrap();
    let shows = s.folder_add(Path::new("/shows")).unwrap();
    s.file_add(Path::new("/movies/x.mkv"), &movies).unwrap();
    s.file_add(Path::new("/shows/y.mkv"), &shows).unwrap();
    s.file_add(Path::new("/shows/z.mkv"), &shows).unwrap();

    assert_eq!(s.file_get_by_folder(&movies).unwrap().len(), 1);
    let in_shows = s.file_get_by_folder(&shows).unwrap();
    assert_eq!(in_shows.len(), 2);
    assert!(in_shows.iter().all(|f| f.folder_id == shows.id));
}

#[cfg(unix)]
#[test]
fn non_utf8_path_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (_dir, mut s) = open_temp();
    let bad = Path::new(OsStr::from_bytes(b"/videos/\xff.mkv"));
    let err = s.folder_add(bad).unwrap_err();
    assert!(matches!(err, DbError::NonUtf8Path(_)));
}

// ── Tags ────────────────────────────────────────────────────────────────────

#[test]
fn tag_links_both_directions() {
    let (_dir, mut s) = open_temp();
    let (folder, file) = seed_file(&mut s);
    let other = s.file_add(Path::new("/videos/b.mp4"), &folder).unwrap();
    let scifi = s.tag_add("scifi").unwrap();
    let classic = s.tag_add("classic").unwrap();

    s.tag_link_add(&file, &scifi).unwrap();
    s.tag_link_add(&file, &classic).unwrap();
    s.tag_link_add(&other, &scifi).unwrap();

    let tags = s.tag_link_get_by_file(&file).unwrap();
    assert_eq!(tags, vec![classic.clone(), scifi.clone()]);
    let files = s.tag_link_get_by_tag(&scifi).unwrap();
    assert_eq!(files, vec![file.clone(), other]);

    assert_eq!(s.tag_get_by_name("scifi").unwrap(), Some(scifi.clone()));
    assert_eq!(s.tag_get_by_id(classic.id).unwrap(), Some(classic));
    assert_eq!(s.tag_get_all().unwrap().len(), 2);
}

#[test]
fn duplicate_tagging_rejected() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let tag = s.tag_add("scifi").unwrap();

    s.tag_link_add(&file, &tag).unwrap();
    let err = s.tag_link_add(&file, &tag).unwrap_err();
    assert!(err.is_constraint());
    assert!(s.tag_add("scifi").unwrap_err().is_constraint());
}

#[test]
fn linked_tag_and_file_are_restricted() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let tag = s.tag_add("scifi").unwrap();
    s.tag_link_add(&file, &tag).unwrap();

    assert!(s.tag_delete(&tag).unwrap_err().is_constraint());
    assert!(s.file_remove(&file).unwrap_err().is_constraint());

    s.tag_link_delete(&file, &tag).unwrap();
    s.tag_delete(&tag).unwrap();
    s.file_remove(&file).unwrap();
    assert_eq!(s.tag_get_all().unwrap(), vec![]);
}

#[test]
fn deleting_absent_link_is_not_an_error() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let tag = s.tag_add("scifi").unwrap();
    s.tag_link_delete(&file, &tag).unwrap();
}

// ── Credits ─────────────────────────────────────────────────────────────────

#[test]
fn actor_and_director_credits_are_separate() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let actor = s.person_add("Ann Actor", None).unwrap();
    let director = s.person_add("Dan Director", None).unwrap();

    s.actor_add(&file, &actor).unwrap();
    s.director_add(&file, &director).unwrap();
    s.director_add(&file, &actor).unwrap();

    assert_eq!(s.actor_get_by_file(&file).unwrap(), vec![actor.clone()]);
    assert_eq!(
        s.director_get_by_file(&file).unwrap(),
        vec![actor.clone(), director.clone()]
    );
    assert_eq!(s.actor_get_by_person(&actor).unwrap(), vec![file.clone()]);
    assert_eq!(s.director_get_by_person(&actor).unwrap(), vec![file.clone()]);
    assert!(s.actor_get_by_person(&director).unwrap().is_empty());
}

#[test]
fn credits_restrict_deletes() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let person = s.person_add("Ann Actor", None).unwrap();
    s.credit_add(Role::Actor, &file, &person).unwrap();

    assert!(s.actor_add(&file, &person).unwrap_err().is_constraint());
    assert!(s.file_remove(&file).unwrap_err().is_constraint());
    assert!(s.person_remove(&person).unwrap_err().is_constraint());

    s.actor_delete(&file, &person).unwrap();
    s.person_remove(&person).unwrap();
    s.file_remove(&file).unwrap();
}

#[test]
fn credit_needs_existing_person() {
    let (_dir, mut s) = open_temp();
    let (_, file) = seed_file(&mut s);
    let ghost = Person {
        id: 99,
        name: "Nobody".to_string(),
        birthday: None,
    };
    assert!(s.director_add(&file, &ghost).unwrap_err().is_constraint());
}
