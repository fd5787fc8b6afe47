//! Songbook table of contents, navigation and cover reveal over the fixture songbook.

use chantbook::context::Session;
use chantbook::input;
use chantbook::layout;
use chantbook::output;
use chantbook::songbook::{CoverReveal, CoverState, Navigator, NavigationError, TaskState};
use chantbook::toc;
use std::path::Path;
use std::time::{Duration, Instant};

fn songbook() -> input::SongbookFile {
    input::load_songbook(&Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/songbook.json"))
        .unwrap()
}

#[test]
fn toc_numbers_found_songs_and_reports_missing() {
    let book = songbook();
    let songs = book.index();
    let contents = toc::build(&book.chapters, &songs);

    let titles: Vec<&str> = contents.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Anthems", "Terrace"]);

    let pages: Vec<(&str, u32)> = contents
        .entries()
        .map(|e| (e.song_id.as_str(), e.page))
        .collect();
    assert_eq!(pages, vec![("s-blue", 1), ("s-up", 2), ("s-clap", 3)]);

    let missing: Vec<&str> = contents.warnings.iter().map(|w| w.song_id.as_str()).collect();
    assert_eq!(missing, vec!["s-retired", "s-gone"]);
}

#[test]
fn toc_output_matches_rows() {
    let book = songbook();
    let songs = book.index();
    let contents = toc::build(&book.chapters, &songs);

    assert_eq!(
        output::format_toc(&contents, &songs, "📢: "),
        vec![
            "Anthems",
            "    001 Forever Blue",
            "        📢: two claps",
            "        Reference recording",
            "    002 Stand Up",
            "        Sheet music",
            "",
            "Terrace",
            "    003 Clap Along",
            "",
            "Missing songs",
            "    Anthems: s-retired",
            "    Lost Chants: s-gone",
        ]
    );
}

#[test]
fn selecting_an_entry_opens_song_with_its_page() {
    let book = songbook();
    let songs = book.index();
    let contents = toc::build(&book.chapters, &songs);
    let entry = contents.entries().nth(1).unwrap();

    let mut navigator = Navigator::new();
    let mut opened = Vec::new();
    navigator
        .select_entry(&songs, entry, |current| {
            opened.push((current.song.title.clone(), current.page))
        })
        .unwrap();

    assert_eq!(opened, vec![("Stand Up".to_string(), Some(2))]);
    assert_eq!(navigator.current().unwrap().song.id, "s-up");
}

#[test]
fn direct_lookup_of_missing_song_fails() {
    let songs = songbook().index();
    assert_eq!(
        songs.lookup("s-retired").unwrap_err(),
        NavigationError::NotFound("s-retired".into())
    );
}

#[test]
fn cover_shows_once_per_session() {
    let delay = Duration::from_millis(1000);
    let mut session = Session::anonymous();
    let t0 = Instant::now();

    let mut first = CoverReveal::mount(&session, delay, t0);
    assert_eq!(first.state(), CoverState::ShowingCover);
    assert_eq!(first.tick(&mut session, t0 + delay), CoverState::ShowingContents);
    assert!(session.cover_seen);

    let second = CoverReveal::mount(&session, delay, t0 + delay * 2);
    assert_eq!(second.state(), CoverState::ShowingContents);
    assert_eq!(second.timer_state(), None);
}

#[test]
fn cover_left_early_stays_unseen() {
    let delay = Duration::from_millis(1000);
    let mut session = Session::anonymous();
    let t0 = Instant::now();

    let mut reveal = CoverReveal::mount(&session, delay, t0);
    reveal.teardown();
    reveal.tick(&mut session, t0 + delay * 5);

    assert_eq!(reveal.timer_state(), Some(TaskState::Cancelled));
    assert!(!session.cover_seen);
}

#[test]
fn cover_scales_to_window_width() {
    assert_eq!(layout::cover_geometry((1080, 1440), 390.0), Some((390.0, 520.0)));
    assert_eq!(layout::cover_geometry((0, 1440), 390.0), None);
}
