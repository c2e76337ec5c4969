use std::fs;

use prioboard::priority::PRIORITIES_KEY;
use prioboard::prio_list::PRIOS_KEY;
use prioboard::store::TASKS_KEY;
use prioboard::{Board, FileStorage, NewTask, Prio, TaskPatch};

#[test]
fn board_survives_reopen_on_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let (id, high) = {
        let mut board = Board::open(FileStorage::new(dir.path()));
        let high = board.tasks.defaults().high.clone();
        let id = board.tasks.add(NewTask::new("Renew passport").priority(high.clone()))?;
        board.tasks.add(NewTask::new("Water plants"))?;
        (id, high)
    };

    assert!(dir.path().join(TASKS_KEY).is_file());
    assert!(dir.path().join(PRIORITIES_KEY).is_file());
    // The CSV list is only written once it changes.
    assert!(!dir.path().join(PRIOS_KEY).exists());

    let mut board = Board::open(FileStorage::new(dir.path()));
    assert_eq!(board.tasks.defaults().high, high);
    let titles: Vec<_> = board
        .tasks
        .entries(&board.priorities)
        .into_iter()
        .map(|(_, t)| t.title.clone())
        .collect();
    assert_eq!(titles, vec!["Renew passport", "Water plants"]);

    board.tasks.update(&id, TaskPatch { done: Some(true), ..TaskPatch::default() })?;
    let board = Board::open(FileStorage::new(dir.path()));
    let first = board.tasks.entries(&board.priorities)[0].1.title.clone();
    assert_eq!(first, "Water plants");

    Ok(())
}

#[test]
fn legacy_task_file_is_migrated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(TASKS_KEY),
        r#"{
            "abc": {"title": "Old urgent", "priority": 1, "done": false, "updatedAt": "2024-01-01T00:00:00.000Z", "categoryId": null},
            "def": {"title": "Old whatever", "priority": 2, "done": true, "updatedAt": "2024-01-02T00:00:00.000Z"}
        }"#,
    )?;

    let mut board = Board::open(FileStorage::new(dir.path()));
    let ids = board.tasks.defaults().clone();
    assert_eq!(board.tasks.get("abc").and_then(|t| t.priority_ref.clone()), Some(ids.high.clone()));
    assert_eq!(board.tasks.get("def").and_then(|t| t.priority_ref.clone()), Some(ids.medium.clone()));

    // Loading alone does not rewrite the file; the next change does.
    let raw = fs::read_to_string(dir.path().join(TASKS_KEY))?;
    assert!(!raw.contains("priorityRef"));
    board.tasks.add(NewTask::new("New"))?;
    let raw = fs::read_to_string(dir.path().join(TASKS_KEY))?;
    assert!(raw.contains(&ids.high));

    Ok(())
}

#[test]
fn corrupt_files_fall_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(TASKS_KEY), "{{{{")?;
    fs::write(dir.path().join(PRIORITIES_KEY), "nonsense")?;
    fs::write(dir.path().join(PRIOS_KEY), "   \n")?;

    let board = Board::open(FileStorage::new(dir.path()));
    assert!(board.tasks.is_empty());
    assert_eq!(board.priorities.len(), 3);
    let keys: Vec<_> = board.prio_list.list().iter().map(|p| (p.key.clone(), p.weight)).collect();
    assert_eq!(
        keys,
        vec![("high".to_string(), 1), ("medium".to_string(), 2), ("low".to_string(), 3)]
    );

    Ok(())
}

#[test]
fn clear_all_deletes_task_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut board = Board::open(FileStorage::new(dir.path()));
    board.tasks.add(NewTask::new("gone soon"))?;
    assert!(dir.path().join(TASKS_KEY).exists());

    board.tasks.clear_all()?;
    assert!(!dir.path().join(TASKS_KEY).exists());
    board.tasks.clear_all()?;
    assert!(!dir.path().join(TASKS_KEY).exists());

    let board = Board::open(FileStorage::new(dir.path()));
    assert!(board.tasks.is_empty());
    Ok(())
}

#[test]
fn csv_list_round_trips_on_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut board = Board::open(FileStorage::new(dir.path()));
    board.prio_list.add(Prio {
        key: "note".into(),
        label: "Say \"hi\", bye\nand more".into(),
        weight: 7,
    })?;

    let board = Board::open(FileStorage::new(dir.path()));
    assert_eq!(board.prio_list.list().len(), 4);
    assert_eq!(
        board.prio_list.get("note").map(|p| p.label.as_str()),
        Some("Say \"hi\", bye\nand more")
    );
    Ok(())
}
