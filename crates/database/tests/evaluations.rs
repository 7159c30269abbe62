mod common;

use common::{TestStore, cs_objective, evaluation, section};
use database::{
    entities::evaluations,
    error::{ErrorKind, Rule},
};
use models::evaluation::{EvaluationStatus, evaluation_status};
use sea_orm::EntityTrait;

async fn find_evaluation(
    store: &TestStore,
    degree: &str,
    code: &str,
) -> Option<evaluations::Model> {
    evaluations::Entity::find_by_id((
        "CS101".to_owned(),
        2024,
        "Fall".to_owned(),
        "01".to_owned(),
        degree.to_owned(),
        "BS".to_owned(),
        code.to_owned(),
    ))
    .one(&store.db)
    .await
    .unwrap()
}

/// Gives SE (BS) the course CS101 assessing O1
async fn share_objective_with_se(store: &TestStore) {
    let se = |fields: &[(&'static str, &'static str)]| {
        let mut all = vec![("name", "SE"), ("level", "BS"), ("course_no", "CS101")];
        all.extend_from_slice(fields);
        all
    };

    store.apply("link_course_to_degree", &se(&[])).await;
    store
        .apply("link_objective_to_course", &se(&[("objective_code", "O1")]))
        .await;
}

#[tokio::test]
async fn test_counts_cannot_exceed_enrollment() {
    let store = TestStore::seeded().await;
    let counts = |f: &'static str| {
        evaluation(
            "O1",
            &[
                ("method_label", "Final exam"),
                ("a_count", "10"),
                ("b_count", "10"),
                ("c_count", "5"),
                ("f_count", f),
            ],
        )
    };

    let err = store
        .submit("record_evaluation", &counts("10"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert_eq!(err.to_string(), "Counts cannot exceed the enrolled total.");
    assert!(find_evaluation(&store, "CS", "O1").await.is_none());

    let outcome = store.apply("record_evaluation", &counts("5")).await;
    assert_eq!(outcome.message, "Evaluation saved.");

    let row = find_evaluation(&store, "CS", "O1").await.unwrap();
    assert_eq!(evaluation_status(&row.fields()), EvaluationStatus::Complete);
}

#[tokio::test]
async fn test_objective_must_belong_to_the_degree_course() {
    let store = TestStore::seeded().await;
    let before = store.snapshot().await;

    let err = store
        .submit(
            "record_evaluation",
            &evaluation("O2", &[("method_label", "Essay")]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "Objective is not valid for this degree/course."
    );
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_missing_section_is_reported_first() {
    let store = TestStore::seeded().await;
    let mut fields = evaluation("O9", &[]);
    fields.retain(|&(key, _)| key != "section_no");
    fields.push(("section_no", "02"));

    let err = store
        .submit("record_evaluation", &fields)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Section not found.");
}

#[tokio::test]
async fn test_recording_again_overwrites_the_same_row() {
    let store = TestStore::seeded().await;

    store
        .apply(
            "record_evaluation",
            &evaluation("O1", &[("method_label", "Quiz"), ("a_count", "3")]),
        )
        .await;
    store
        .apply(
            "save_evaluation",
            &evaluation(
                "O1",
                &[
                    ("method_label", "Project"),
                    ("b_count", "4"),
                    ("improvement_text", "More practice problems"),
                ],
            ),
        )
        .await;

    assert_eq!(store.count(evaluations::Entity).await, 1);
    let row = find_evaluation(&store, "CS", "O1").await.unwrap();
    assert_eq!(row.method_label.as_deref(), Some("Project"));
    assert_eq!(row.a_count, None);
    assert_eq!(row.b_count, Some(4));
    assert_eq!(evaluation_status(&row.fields()), EvaluationStatus::Partial);
}

#[tokio::test]
async fn test_malformed_counts_are_rejected_without_a_write() {
    let store = TestStore::seeded().await;

    let err = store
        .submit("record_evaluation", &evaluation("O1", &[("a_count", "-2")]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = store
        .submit("record_evaluation", &evaluation("O1", &[("f_count", "ten")]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(store.count(evaluations::Entity).await, 0);
}

#[tokio::test]
async fn test_copy_requires_destination_objective() {
    let store = TestStore::seeded().await;
    store
        .apply(
            "record_evaluation",
            &evaluation("O1", &[("method_label", "Exam"), ("a_count", "12")]),
        )
        .await;

    let err = store
        .submit(
            "copy_evaluation",
            &evaluation("O1", &[("target_degree", "SE|BS")]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.rule(), Some(&Rule::DestinationLacksObjective));
    assert_eq!(
        err.to_string(),
        "Destination degree does not own this objective."
    );
    assert!(find_evaluation(&store, "SE", "O1").await.is_none());
}

#[tokio::test]
async fn test_copy_duplicates_every_field_including_nulls() {
    let store = TestStore::seeded().await;
    share_objective_with_se(&store).await;
    store
        .apply(
            "record_evaluation",
            &evaluation(
                "O1",
                &[
                    ("method_label", "Lab practical"),
                    ("a_count", "8"),
                    ("c_count", "0"),
                    ("f_count", "2"),
                    ("improvement_text", "Add a review session"),
                ],
            ),
        )
        .await;

    let outcome = store
        .apply(
            "copy_evaluation",
            &evaluation("O1", &[("target_name", "SE"), ("target_level", "BS")]),
        )
        .await;
    assert_eq!(outcome.message, "Evaluation copied to the selected degree.");

    let source = find_evaluation(&store, "CS", "O1").await.unwrap();
    let copy = find_evaluation(&store, "SE", "O1").await.unwrap();
    assert_eq!(copy.fields(), source.fields());
    assert_eq!(copy.b_count, None);
}

#[tokio::test]
async fn test_copy_without_a_source_is_not_found() {
    let store = TestStore::seeded().await;
    share_objective_with_se(&store).await;

    let err = store
        .submit(
            "copy_evaluation",
            &evaluation("O1", &[("target_degree", "SE|BS")]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "No evaluation exists to copy.");
}

#[tokio::test]
async fn test_enrollment_cannot_drop_below_recorded_counts() {
    let store = TestStore::seeded().await;
    store
        .apply(
            "record_evaluation",
            &evaluation("O1", &[("a_count", "20"), ("f_count", "5")]),
        )
        .await;

    let err = store
        .submit("upsert_section", &section("CS101", "01", "24"))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(&Rule::EnrollmentBelowRecorded));

    store
        .apply("upsert_section", &section("CS101", "01", "25"))
        .await;
}

#[tokio::test]
async fn test_section_requires_its_references() {
    let store = TestStore::seeded().await;

    let mut fields = section("CS101", "02", "20");
    fields.retain(|&(key, _)| key != "instructor_id");
    fields.push(("instructor_id", "I9"));
    let err = store.submit("upsert_section", &fields).await.unwrap_err();
    assert_eq!(err.to_string(), "Instructor I9 not found.");

    let mut fields = section("CS101", "02", "20");
    fields.retain(|&(key, _)| key != "term");
    fields.push(("term", "Spring"));
    let err = store.submit("add_section", &fields).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Semester 2024-Spring not found.");
}

#[tokio::test]
async fn test_evaluation_needs_degree_scoped_objective() {
    let store = TestStore::seeded().await;
    share_objective_with_se(&store).await;
    store
        .apply("link_objective_to_course", &cs_objective("CS101", "O2"))
        .await;

    // O2 belongs to CS101 in CS but not in SE
    let mut fields = evaluation("O2", &[("method_label", "Essay")]);
    fields.retain(|&(key, _)| key != "name");
    fields.push(("name", "SE"));

    let err = store
        .submit("record_evaluation", &fields)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
