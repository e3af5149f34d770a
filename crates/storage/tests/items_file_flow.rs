use quiz_core::model::{CollectionId, ItemId, Member, MemberId, QuizItem, QuizVariant};
use storage::records::{ItemSetRecord, QuizItemRecord};
use storage::repository::{ItemRequest, QuizItemSource, StorageError};
use storage::JsonFileItemSource;

fn expression_items() -> Vec<QuizItem> {
    vec![
        QuizItem::phrase(
            ItemId::new(1),
            "Let's ___ ___ tomorrow.",
            vec!["catch".into(), "up".into()],
        )
        .unwrap()
        .with_translation("내일 만나서 얘기하자."),
        QuizItem::blank(ItemId::new(2), "It's a piece of ___.", "cake")
            .unwrap()
            .with_meaning("very easy"),
    ]
}

#[tokio::test]
async fn exported_item_sets_load_back_per_request() {
    let sets = vec![
        ItemSetRecord {
            variant: QuizVariant::Expression,
            collection: CollectionId::new(7),
            items: expression_items().iter().map(QuizItemRecord::from_item).collect(),
        },
        ItemSetRecord {
            variant: QuizVariant::Word,
            collection: CollectionId::new(7),
            items: Vec::new(),
        },
    ];
    let path = std::env::temp_dir().join(format!("quiz-items-flow-{}.json", std::process::id()));
    tokio::fs::write(&path, serde_json::to_vec_pretty(&sets).unwrap())
        .await
        .unwrap();

    let source = JsonFileItemSource::new(&path);
    let member = Member::new(MemberId::new(2), "sora");

    let items = source
        .fetch_items(
            &member,
            &ItemRequest::new(QuizVariant::Expression, CollectionId::new(7)),
        )
        .await
        .unwrap();
    assert_eq!(items, expression_items());

    // An empty set is served as-is; deciding it is unusable is the session's job.
    let empty = source
        .fetch_items(&member, &ItemRequest::new(QuizVariant::Word, CollectionId::new(7)))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let other = source
        .fetch_items(&member, &ItemRequest::new(QuizVariant::Word, CollectionId::new(8)))
        .await
        .unwrap_err();
    assert!(matches!(other, StorageError::NotFound));

    tokio::fs::remove_file(path).await.unwrap();
}

#[tokio::test]
async fn invalid_item_in_file_names_the_item() {
    let path = std::env::temp_dir().join(format!("quiz-items-invalid-{}.json", std::process::id()));
    let json = r#"[{"variant": "grammar", "collection": 1, "items": [
        {"kind": "sentence", "id": 31, "tokens": ["I", "ran"], "choices": ["I", "run"]}
    ]}]"#;
    tokio::fs::write(&path, json).await.unwrap();

    let err = JsonFileItemSource::new(&path)
        .fetch_items(
            &Member::guest(),
            &ItemRequest::new(QuizVariant::Grammar, CollectionId::new(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidItem { id, .. } if id == ItemId::new(31)));

    tokio::fs::remove_file(path).await.unwrap();
}
