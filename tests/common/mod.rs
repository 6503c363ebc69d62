#![allow(dead_code)]

use catquiz::{
    db::Db,
    irt::ResponseModel,
    models::{ChoiceImport, QuestionImport, QuestionnaireImport},
};

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("catquiz_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

fn yes_no(question: String, level: u32, difficulty: f64) -> QuestionImport {
    QuestionImport {
        question,
        level,
        slope: 1.2,
        thresholds: vec![difficulty],
        choices: vec![
            ChoiceImport {
                text: "no".to_string(),
                value: 0,
            },
            ChoiceImport {
                text: "yes".to_string(),
                value: 1,
            },
        ],
    }
}

/// A binary bank with `level_one` level-1 items and `level_two` level-2 items.
pub fn binary_bank(name: &str, flow: &str, level_one: usize, level_two: usize, seconds: u32) -> QuestionnaireImport {
    let questions = (0..level_one)
        .map(|i| yes_no(format!("Level one item {}", i + 1), 1, -1.0 + i as f64 * 0.5))
        .chain((0..level_two).map(|i| {
            yes_no(format!("Level two item {}", i + 1), 2, -1.0 + i as f64 * 0.7)
        }))
        .collect();

    QuestionnaireImport {
        name: name.to_string(),
        model: ResponseModel::Binary,
        flow: flow.to_string(),
        seconds,
        questions,
    }
}

/// "Vocabulary": flow `2|2`, two level-1 and three level-2 items, 30 seconds
/// per item.
pub async fn seed_vocabulary(db: &Db) -> i64 {
    db.load_questionnaire(binary_bank("Vocabulary", "2|2", 2, 3, 30))
        .await
        .expect("load vocabulary")
}
