//! Integration tests for folder navigation over indexed images.
//!
//! Tests cover:
//! - Index bounds at the start of a sequence
//! - Advancing only while the next file exists
//! - Path construction for indexed files

mod common;

use common::*;
use memdetect::nav::ImageFolder;

#[test]
fn test_navigation_within_bounds() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    write_indexed_images(dir.path(), 3)?;

    let mut folder = ImageFolder::open(dir.path().to_path_buf());
    assert_eq!(folder.index(), 0);
    assert_eq!(folder.peek_prev(), None);
    assert_eq!(folder.peek_next(), Some(1));

    folder.set_index(1);
    assert_eq!(folder.peek_prev(), Some(0));
    assert_eq!(folder.peek_next(), Some(2));

    folder.set_index(2);
    assert_eq!(folder.peek_next(), None);

    Ok(())
}

#[test]
fn test_never_advances_past_missing_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    write_indexed_images(dir.path(), 2)?;

    let mut folder = ImageFolder::open(dir.path().to_path_buf());
    folder.set_index(1);
    // 2.png does not exist, so the sequence ends here.
    assert_eq!(folder.peek_next(), None);

    Ok(())
}

#[test]
fn test_empty_folder_has_no_neighbors() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;

    let folder = ImageFolder::open(dir.path().to_path_buf());
    assert_eq!(folder.peek_prev(), None);
    assert_eq!(folder.peek_next(), None);

    Ok(())
}

#[test]
fn test_image_path_naming() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;

    let folder = ImageFolder::open(dir.path().to_path_buf());
    assert_eq!(folder.current_path(), dir.path().join("0.png"));
    assert_eq!(folder.image_path(17), dir.path().join("17.png"));

    Ok(())
}
