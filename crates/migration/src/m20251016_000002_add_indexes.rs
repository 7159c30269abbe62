use sea_orm_migration::prelude::*;

use crate::m20251016_000001_create_curriculum_tables::{
    DegreeCourseObjectives, DegreeCourses, Evaluations, Sections,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Section listings by semester and by instructor
        manager
            .create_index(
                Index::create()
                    .name("idx_sections_year_term")
                    .table(Sections::Table)
                    .col(Sections::Year)
                    .col(Sections::Term)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sections_instructor_id")
                    .table(Sections::Table)
                    .col(Sections::InstructorId)
                    .to_owned(),
            )
            .await?;

        // Course reference checks on delete
        manager
            .create_index(
                Index::create()
                    .name("idx_degree_courses_course_no")
                    .table(DegreeCourses::Table)
                    .col(DegreeCourses::CourseNo)
                    .to_owned(),
            )
            .await?;

        // Other degrees sharing a course and objective
        manager
            .create_index(
                Index::create()
                    .name("idx_degree_course_objectives_course_objective")
                    .table(DegreeCourseObjectives::Table)
                    .col(DegreeCourseObjectives::CourseNo)
                    .col(DegreeCourseObjectives::ObjectiveCode)
                    .to_owned(),
            )
            .await?;

        // Rollups and reports scan one semester at a time
        manager
            .create_index(
                Index::create()
                    .name("idx_evaluations_year_term")
                    .table(Evaluations::Table)
                    .col(Evaluations::Year)
                    .col(Evaluations::Term)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_evaluations_degree_course_objective")
                    .table(Evaluations::Table)
                    .col(Evaluations::Name)
                    .col(Evaluations::Level)
                    .col(Evaluations::CourseNo)
                    .col(Evaluations::ObjectiveCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        manager
            .drop_index(
                Index::drop()
                    .name("idx_evaluations_degree_course_objective")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_evaluations_year_term").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_degree_course_objectives_course_objective")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_degree_courses_course_no")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_sections_instructor_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_sections_year_term").to_owned())
            .await?;

        Ok(())
    }
}
