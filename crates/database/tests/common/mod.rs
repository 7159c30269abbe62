#![allow(dead_code)]

use database::{
    config::StoreConfig,
    entities::{
        courses, degree_course_objectives, degree_courses, degrees, evaluations, instructors,
        objectives, sections, semesters,
    },
    error::MutationResult,
    services::coordinator::{MutationCoordinator, MutationOutcome},
};
use models::fields::Fields;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Schema,
};

/// A fresh in-memory store with the curriculum schema and a coordinator over it
pub struct TestStore {
    pub db: DatabaseConnection,
    pub coordinator: MutationCoordinator,
}

impl TestStore {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        // A single connection keeps every query on the same in-memory database
        options.max_connections(1).sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("in-memory sqlite should open");

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let tables = [
            schema.create_table_from_entity(degrees::Entity),
            schema.create_table_from_entity(courses::Entity),
            schema.create_table_from_entity(instructors::Entity),
            schema.create_table_from_entity(objectives::Entity),
            schema.create_table_from_entity(semesters::Entity),
            schema.create_table_from_entity(sections::Entity),
            schema.create_table_from_entity(degree_courses::Entity),
            schema.create_table_from_entity(degree_course_objectives::Entity),
            schema.create_table_from_entity(evaluations::Entity),
        ];
        for table in &tables {
            db.execute(backend.build(table))
                .await
                .expect("table should be created");
        }

        let mut config = StoreConfig::new("sqlite::memory:");
        config.isolation = None;
        let coordinator = MutationCoordinator::new(db.clone(), &config);

        Self { db, coordinator }
    }

    pub async fn submit(&self, action: &str, fields: &[(&str, &str)]) -> MutationResult<MutationOutcome> {
        let fields: Fields = fields.iter().copied().collect();
        self.coordinator.submit(action, &fields).await
    }

    /// Submits a mutation that the test expects to commit
    pub async fn apply(&self, action: &str, fields: &[(&str, &str)]) -> MutationOutcome {
        match self.submit(action, fields).await {
            Ok(outcome) => outcome,
            Err(err) => panic!("{action} should commit, got {err}"),
        }
    }

    pub async fn count<E>(&self, _entity: E) -> u64
    where
        E: EntityTrait,
        E::Model: Sync,
    {
        E::find()
            .count(&self.db)
            .await
            .expect("count should succeed")
    }

    /// Row counts of every table, for asserting that a rejection changed nothing
    pub async fn snapshot(&self) -> Vec<u64> {
        vec![
            self.count(degrees::Entity).await,
            self.count(courses::Entity).await,
            self.count(instructors::Entity).await,
            self.count(objectives::Entity).await,
            self.count(semesters::Entity).await,
            self.count(sections::Entity).await,
            self.count(degree_courses::Entity).await,
            self.count(degree_course_objectives::Entity).await,
            self.count(evaluations::Entity).await,
        ]
    }

    /// CS (BS) with sole core course CS101 assessing O1, elective CS201 with no
    /// objectives, and section CS101-01 in 2024 Fall with 30 students.
    /// SE (BS) exists with no curriculum.
    pub async fn seeded() -> Self {
        let store = Self::new().await;

        store.apply("upsert_degree", &[("name", "CS"), ("level", "BS")]).await;
        store.apply("upsert_degree", &[("name", "SE"), ("level", "BS")]).await;
        store
            .apply("upsert_course", &[("course_no", "CS101"), ("title", "Intro to Computing")])
            .await;
        store
            .apply("upsert_course", &[("course_no", "CS201"), ("title", "Data Structures")])
            .await;
        store
            .apply("upsert_objective", &[("code", "O1"), ("title", "Problem solving")])
            .await;
        store
            .apply("upsert_objective", &[("code", "O2"), ("title", "Communication")])
            .await;

        store.apply("link_course_to_degree", &cs_course("CS101", "0")).await;
        store.apply("link_objective_to_course", &cs_objective("CS101", "O1")).await;
        store.apply("link_course_to_degree", &cs_course("CS101", "1")).await;
        store.apply("link_course_to_degree", &cs_course("CS201", "0")).await;

        store
            .apply("upsert_instructor", &[("instructor_id", "I1"), ("name", "Ada Lovelace")])
            .await;
        store.apply("upsert_semester", &[("year", "2024"), ("term", "Fall")]).await;
        store.apply("upsert_section", &section("CS101", "01", "30")).await;

        store
    }
}

pub fn cs_course<'a>(course_no: &'a str, is_core: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "CS"),
        ("level", "BS"),
        ("course_no", course_no),
        ("is_core", is_core),
    ]
}

pub fn cs_objective<'a>(course_no: &'a str, code: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "CS"),
        ("level", "BS"),
        ("course_no", course_no),
        ("objective_code", code),
    ]
}

/// A 2024 Fall section taught by I1
pub fn section<'a>(course_no: &'a str, section_no: &'a str, enrolled: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("course_no", course_no),
        ("section_no", section_no),
        ("year", "2024"),
        ("term", "Fall"),
        ("instructor_id", "I1"),
        ("enrolled_count", enrolled),
    ]
}

/// Identifies CS101-01 2024 Fall against `code` in CS (BS), plus `extra` fields
pub fn evaluation<'a>(code: &'a str, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut fields = vec![
        ("course_no", "CS101"),
        ("section_no", "01"),
        ("year", "2024"),
        ("term", "Fall"),
        ("name", "CS"),
        ("level", "BS"),
        ("objective_code", code),
    ];
    fields.extend_from_slice(extra);
    fields
}
