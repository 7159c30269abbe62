mod common;

use common::{TestStore, cs_objective, evaluation, section};
use database::{
    error::ErrorKind,
    services::report::{ReportService, WorksheetFilter},
};
use models::{
    evaluation::EvaluationStatus,
    keys::{DegreeCourseKey, DegreeKey},
    term::{Semester, SemesterRange, Term},
};

const FALL_2024: Semester = Semester {
    year: 2024,
    term: Term::Fall,
};

/// Seeded store plus an empty second section, an older section, a complete
/// evaluation on CS101-01, and SE (BS) sharing CS101/O1
async fn reporting_store() -> TestStore {
    let store = TestStore::seeded().await;

    store
        .apply("upsert_section", &section("CS101", "02", "20"))
        .await;
    store
        .apply("upsert_semester", &[("year", "2023"), ("term", "Spring")])
        .await;
    store
        .apply(
            "upsert_section",
            &[
                ("course_no", "CS101"),
                ("section_no", "01"),
                ("year", "2023"),
                ("term", "Spring"),
                ("instructor_id", "I1"),
                ("enrolled_count", "25"),
            ],
        )
        .await;
    store
        .apply(
            "record_evaluation",
            &evaluation(
                "O1",
                &[
                    ("method_label", "Final exam"),
                    ("a_count", "10"),
                    ("b_count", "10"),
                    ("c_count", "5"),
                    ("f_count", "5"),
                    ("improvement_text", "Spend more time on recursion"),
                ],
            ),
        )
        .await;

    let se = [("name", "SE"), ("level", "BS"), ("course_no", "CS101")];
    store.apply("link_course_to_degree", &se).await;
    let mut se_objective = se.to_vec();
    se_objective.push(("objective_code", "O1"));
    store
        .apply("link_objective_to_course", &se_objective)
        .await;

    store
}

#[tokio::test]
async fn test_rollup_counts_rows_per_section() {
    let store = reporting_store().await;
    store
        .apply("link_objective_to_course", &cs_objective("CS101", "O2"))
        .await;

    let rollup = ReportService::evaluation_rollup(&store.db, FALL_2024)
        .await
        .unwrap();
    assert_eq!(rollup.len(), 2);
    assert_eq!(rollup[0].section_no, "01");
    assert_eq!(rollup[0].title, "Intro to Computing");
    assert_eq!(rollup[0].total_rows, 1);
    assert_eq!(rollup[0].improved_rows, 1);
    assert_eq!(rollup[0].status, EvaluationStatus::Complete);
    assert_eq!(rollup[1].total_rows, 0);
    assert_eq!(rollup[1].status, EvaluationStatus::NoEvaluation);

    store
        .apply(
            "record_evaluation",
            &evaluation("O2", &[("method_label", "Essay")]),
        )
        .await;

    let rollup = ReportService::evaluation_rollup(&store.db, FALL_2024)
        .await
        .unwrap();
    assert_eq!(rollup[0].total_rows, 2);
    assert_eq!(rollup[0].complete_rows, 1);
    assert_eq!(rollup[0].partial_rows, 1);
    assert_eq!(rollup[0].status, EvaluationStatus::Partial);
}

#[tokio::test]
async fn test_non_f_report_applies_threshold() {
    let store = reporting_store().await;

    let rows = ReportService::non_f_report(&store.db, FALL_2024, 0.8)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].non_f, 25);
    assert_eq!(rows[0].total, 30);
    assert_eq!(rows[0].enrolled_count, 30);
    assert!((rows[0].ratio - 25.0 / 30.0).abs() < f64::EPSILON);

    let rows = ReportService::non_f_report(&store.db, FALL_2024, 0.9)
        .await
        .unwrap();
    assert!(rows.is_empty());

    let err = ReportService::non_f_report(&store.db, FALL_2024, 1.5)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_worksheet_lists_pairs_and_copy_targets() {
    let store = reporting_store().await;
    let filter = WorksheetFilter {
        degree: DegreeKey::new("CS", "BS"),
        semester: FALL_2024,
        instructor_id: "I1".to_owned(),
    };

    let rows = ReportService::evaluation_worksheet(&store.db, &filter)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].section.section_no, "01");
    assert_eq!(rows[0].objective_code, "O1");
    assert_eq!(rows[0].objective_title, "Problem solving");
    assert_eq!(rows[0].status, EvaluationStatus::Complete);
    assert_eq!(rows[0].evaluation.counts.f, Some(5));
    assert_eq!(rows[0].other_degrees, vec![DegreeKey::new("SE", "BS")]);

    assert_eq!(rows[1].section.section_no, "02");
    assert_eq!(rows[1].status, EvaluationStatus::NoEvaluation);
    assert_eq!(rows[1].evaluation.method_label, None);
}

#[tokio::test]
async fn test_worksheet_for_another_instructor_is_empty() {
    let store = reporting_store().await;
    let filter = WorksheetFilter {
        degree: DegreeKey::new("CS", "BS"),
        semester: FALL_2024,
        instructor_id: "I2".to_owned(),
    };

    let rows = ReportService::evaluation_worksheet(&store.db, &filter)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_degree_roster_limits_sections_to_range() {
    let store = reporting_store().await;
    let degree = DegreeKey::new("CS", "BS");

    let range = SemesterRange::from_labels(Some("2024-Spring"), None).unwrap();
    let roster = ReportService::degree_roster(&store.db, &degree, &range, &["O1".to_owned()])
        .await
        .unwrap();

    let courses: Vec<_> = roster
        .courses
        .iter()
        .map(|course| (course.course_no.as_str(), course.is_core))
        .collect();
    assert_eq!(courses, vec![("CS101", true), ("CS201", false)]);
    assert_eq!(roster.courses[0].title, "Intro to Computing");
    assert_eq!(roster.courses[1].title, "Data Structures");
    assert_eq!(roster.objectives.len(), 1);
    assert_eq!(roster.objectives[0].title, "Problem solving");
    assert_eq!(roster.sections.len(), 2);
    assert!(roster.sections.iter().all(|s| s.semester == FALL_2024));
    assert_eq!(roster.objective_courses.len(), 1);
    assert_eq!(roster.objective_courses[0].course_no, "CS101");

    let everything = SemesterRange::default();
    let roster = ReportService::degree_roster(&store.db, &degree, &everything, &[])
        .await
        .unwrap();
    assert_eq!(roster.sections.len(), 3);
    assert_eq!(roster.sections[0].semester, Semester::new(2023, Term::Spring));
    assert!(roster.objective_courses.is_empty());
}

#[tokio::test]
async fn test_section_listings_are_ordered_by_semester() {
    let store = reporting_store().await;
    let everything = SemesterRange::default();

    let sections = ReportService::course_sections(&store.db, "CS101", &everything)
        .await
        .unwrap();
    let order: Vec<_> = sections
        .iter()
        .map(|s| (s.semester.to_string(), s.section_no.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("2023-Spring".to_owned(), "01"),
            ("2024-Fall".to_owned(), "01"),
            ("2024-Fall".to_owned(), "02"),
        ]
    );

    let up_to_2023 = SemesterRange::from_labels(None, Some("2023-Fall")).unwrap();
    let sections = ReportService::instructor_sections(&store.db, "I1", &up_to_2023)
        .await
        .unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].enrolled_count, 25);
}

#[tokio::test]
async fn test_catalog_and_link_views() {
    let store = reporting_store().await;

    let catalog = ReportService::catalog(&store.db).await.unwrap();
    assert_eq!(
        catalog.semesters,
        vec![Semester::new(2023, Term::Spring), FALL_2024]
    );
    assert_eq!(catalog.degrees.len(), 2);
    assert_eq!(catalog.instructors[0].name, "Ada Lovelace");

    let view = ReportService::degree_course_view(&store.db, &DegreeKey::new("SE", "BS"))
        .await
        .unwrap();
    let flags: Vec<_> = view
        .iter()
        .map(|row| (row.course_no.as_str(), row.linked, row.is_core))
        .collect();
    assert_eq!(flags, vec![("CS101", true, false), ("CS201", false, false)]);

    let key = DegreeCourseKey::new(DegreeKey::new("CS", "BS"), "CS101");
    let objectives = ReportService::course_objectives(&store.db, &key)
        .await
        .unwrap();
    assert_eq!(objectives.len(), 1);
    assert_eq!(objectives[0].code, "O1");
    assert_eq!(objectives[0].title, "Problem solving");
}
