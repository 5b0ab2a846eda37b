mod common;

use common::{MemSource, collect_backward, collect_forward, mem_cursor, strings};
use proptest::prelude::*;
use slide_disc::listing::DirectorySource;
use slide_disc::ExtensionFilter;
use std::path::{Path, PathBuf};

#[test]
fn unreadable_directory_counts_as_empty() {
    let source = MemSource::new(&[
        "/r/a/1.jpg",
        "/r/b/2.jpg",
        "/r/b/sub/3.jpg",
        "/r/c/4.jpg",
    ])
    .failing("/r/b");
    let mut cursor = mem_cursor(source, &["/r"]);

    let forward = collect_forward(&mut cursor);
    assert_eq!(strings(&forward), vec!["/r/a/1.jpg", "/r/c/4.jpg"]);

    let mut backward = collect_backward(&mut cursor);
    backward.reverse();
    assert_eq!(backward, forward);

    assert!(!cursor.seek_to_path("/r/b/2.jpg"));
}

#[test]
fn unreadable_root_is_skipped() {
    let source = MemSource::new(&["/one/1.jpg", "/two/2.jpg"]).failing("/one");
    let mut cursor = mem_cursor(source, &["/one", "/two"]);
    assert_eq!(strings(&collect_forward(&mut cursor)), vec!["/two/2.jpg"]);
}

#[test]
fn seek_lists_only_the_containing_directory() {
    let source = MemSource::new(&["/r/1.jpg", "/r/a/2.jpg", "/r/b/c/3.jpg", "/r/b/4.jpg"]);
    let mut cursor = mem_cursor(source, &["/r"]);

    assert!(cursor.seek_to_path("/r/b/c/3.jpg"));
    assert_eq!(
        *cursor.source().file_listings.borrow(),
        vec![PathBuf::from("/r/b/c")]
    );
    assert_eq!(cursor.current(), Some(Path::new("/r/b/c/3.jpg")));

    // The rebuilt frames continue exactly like a forward walk would.
    assert!(!cursor.step_forward(false));
    assert!(cursor.seek_to_path("/r/b/c/3.jpg"));
    assert!(cursor.step_backward(false));
    assert_eq!(cursor.current(), Some(Path::new("/r/b/4.jpg")));
}

#[test]
fn seek_picks_the_root_containing_the_path() {
    let source = MemSource::new(&["/r/1.jpg", "/r/sub/2.jpg"]);
    let mut cursor = mem_cursor(source, &["/r/sub", "/r"]);
    assert!(cursor.seek_to_path("/r/1.jpg"));
    assert!(cursor.step_backward(false));
    assert_eq!(cursor.current(), Some(Path::new("/r/sub/2.jpg")));
}

#[test]
fn seek_tries_every_folder_matching_without_case() {
    let source = MemSource::new(&["/r/Photos/a.jpg", "/r/photos/b.jpg", "/r/photos/c.jpg"]);
    let mut cursor = mem_cursor(source, &["/r"]);

    assert!(cursor.seek_to_path("/r/photos/b.jpg"));
    assert_eq!(cursor.current(), Some(Path::new("/r/photos/b.jpg")));
    assert!(cursor.step_forward(false));
    assert_eq!(cursor.current(), Some(Path::new("/r/photos/c.jpg")));
    assert!(cursor.step_backward(false));
    assert!(cursor.step_backward(false));
    assert_eq!(cursor.current(), Some(Path::new("/r/Photos/a.jpg")));

    // The exact spelling wins before any other candidate is listed.
    cursor.source().file_listings.borrow_mut().clear();
    assert!(cursor.seek_to_path("/r/photos/c.jpg"));
    assert_eq!(
        *cursor.source().file_listings.borrow(),
        vec![PathBuf::from("/r/photos")]
    );

    assert!(cursor.seek_to_path("/r/PHOTOS/A.JPG"));
    assert_eq!(cursor.current(), Some(Path::new("/r/Photos/a.jpg")));
}

/// Depth-first order computed straight from the listings.
fn reference_order(source: &MemSource, dir: &Path, filter: &ExtensionFilter, out: &mut Vec<PathBuf>) {
    out.extend(source.files(dir, filter));
    for sub in source.subdirectories(dir) {
        reference_order(source, &sub, filter, out);
    }
}

fn arb_tree() -> impl Strategy<Value = Vec<String>> {
    let dir = prop::sample::select(vec!["a", "B", "c", "D"]);
    let file = prop::sample::select(vec!["x.jpg", "Y.JPG", "z.png", "w.jpg"]);
    prop::collection::vec(
        (prop::collection::vec(dir, 0..4), file),
        0..24,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(dirs, file)| {
                let mut path = String::from("/r");
                for d in dirs {
                    path.push('/');
                    path.push_str(d);
                }
                path.push('/');
                path.push_str(file);
                path
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_walks_match_reference_order(tree in arb_tree()) {
        let entries: Vec<&str> = tree.iter().map(String::as_str).collect();
        let mut cursor = mem_cursor(MemSource::new(&entries), &["/r"]);

        let mut expected = Vec::new();
        reference_order(cursor.source(), Path::new("/r"), cursor.extension_filter(), &mut expected);

        let forward = collect_forward(&mut cursor);
        prop_assert_eq!(&forward, &expected);

        let mut backward = collect_backward(&mut cursor);
        backward.reverse();
        prop_assert_eq!(&backward, &expected);
    }

    #[test]
    fn prop_seek_and_round_trip(tree in arb_tree()) {
        let entries: Vec<&str> = tree.iter().map(String::as_str).collect();
        let mut cursor = mem_cursor(MemSource::new(&entries), &["/r"]);
        let all = collect_forward(&mut cursor);

        for (i, path) in all.iter().enumerate() {
            prop_assert!(cursor.seek_to_path(path));
            prop_assert_eq!(cursor.current(), Some(path.as_path()));
            if i + 1 < all.len() {
                prop_assert!(cursor.step_forward(false));
                prop_assert!(cursor.step_backward(false));
                prop_assert_eq!(cursor.current(), Some(path.as_path()));
            }
            if i > 0 {
                prop_assert!(cursor.step_backward(false));
                prop_assert!(cursor.step_forward(false));
                prop_assert_eq!(cursor.current(), Some(path.as_path()));
            }
        }
    }

    #[test]
    fn prop_folder_skip_leaves_directory_subtree(tree in arb_tree()) {
        let entries: Vec<&str> = tree.iter().map(String::as_str).collect();
        let mut cursor = mem_cursor(MemSource::new(&entries), &["/r"]);
        let all = collect_forward(&mut cursor);

        for path in &all {
            let dir = path.parent().unwrap().to_path_buf();
            // First file after the last one inside `dir`'s subtree.
            let expected = all
                .iter()
                .rposition(|p| p.starts_with(&dir))
                .and_then(|last| all.get(last + 1));

            prop_assert!(cursor.seek_to_path(path));
            let moved = cursor.step_folder(true);
            prop_assert_eq!(moved, expected.is_some());
            prop_assert_eq!(cursor.current(), expected.map(PathBuf::as_path));
        }
    }
}
