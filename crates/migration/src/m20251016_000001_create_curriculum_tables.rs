use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reference data
        manager
            .create_table(
                Table::create()
                    .table(Degrees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Degrees::Name).string().not_null())
                    .col(ColumnDef::new(Degrees::Level).string().not_null())
                    .col(ColumnDef::new(Degrees::Description).text())
                    .primary_key(Index::create().col(Degrees::Name).col(Degrees::Level))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::CourseNo)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Instructors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instructors::InstructorId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Instructors::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Objectives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Objectives::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Objectives::Title).string().not_null())
                    .col(ColumnDef::new(Objectives::Description).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Semesters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Semesters::Year)
                            .integer()
                            .not_null()
                            .check(Expr::col(Semesters::Year).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Semesters::Term)
                            .string()
                            .not_null()
                            .check(Expr::col(Semesters::Term).is_in(["Spring", "Summer", "Fall"])),
                    )
                    .primary_key(Index::create().col(Semesters::Year).col(Semesters::Term))
                    .to_owned(),
            )
            .await?;

        // Offerings
        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sections::CourseNo).string().not_null())
                    .col(ColumnDef::new(Sections::Year).integer().not_null())
                    .col(ColumnDef::new(Sections::Term).string().not_null())
                    .col(ColumnDef::new(Sections::SectionNo).string().not_null())
                    .col(ColumnDef::new(Sections::InstructorId).string().not_null())
                    .col(
                        ColumnDef::new(Sections::EnrolledCount)
                            .integer()
                            .not_null()
                            .check(Expr::col(Sections::EnrolledCount).gte(0)),
                    )
                    .primary_key(
                        Index::create()
                            .col(Sections::CourseNo)
                            .col(Sections::Year)
                            .col(Sections::Term)
                            .col(Sections::SectionNo),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sections-course_no")
                            .from(Sections::Table, Sections::CourseNo)
                            .to(Courses::Table, Courses::CourseNo)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sections-semester")
                            .from(Sections::Table, (Sections::Year, Sections::Term))
                            .to(Semesters::Table, (Semesters::Year, Semesters::Term))
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sections-instructor_id")
                            .from(Sections::Table, Sections::InstructorId)
                            .to(Instructors::Table, Instructors::InstructorId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Curriculum: degrees own their course links, links own their objectives
        manager
            .create_table(
                Table::create()
                    .table(DegreeCourses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DegreeCourses::Name).string().not_null())
                    .col(ColumnDef::new(DegreeCourses::Level).string().not_null())
                    .col(ColumnDef::new(DegreeCourses::CourseNo).string().not_null())
                    .col(
                        ColumnDef::new(DegreeCourses::IsCore)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(DegreeCourses::Name)
                            .col(DegreeCourses::Level)
                            .col(DegreeCourses::CourseNo),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-degree_courses-degree")
                            .from(
                                DegreeCourses::Table,
                                (DegreeCourses::Name, DegreeCourses::Level),
                            )
                            .to(Degrees::Table, (Degrees::Name, Degrees::Level))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-degree_courses-course_no")
                            .from(DegreeCourses::Table, DegreeCourses::CourseNo)
                            .to(Courses::Table, Courses::CourseNo)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DegreeCourseObjectives::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DegreeCourseObjectives::Name).string().not_null())
                    .col(ColumnDef::new(DegreeCourseObjectives::Level).string().not_null())
                    .col(
                        ColumnDef::new(DegreeCourseObjectives::CourseNo)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DegreeCourseObjectives::ObjectiveCode)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DegreeCourseObjectives::Name)
                            .col(DegreeCourseObjectives::Level)
                            .col(DegreeCourseObjectives::CourseNo)
                            .col(DegreeCourseObjectives::ObjectiveCode),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-degree_course_objectives-degree_course")
                            .from(
                                DegreeCourseObjectives::Table,
                                (
                                    DegreeCourseObjectives::Name,
                                    DegreeCourseObjectives::Level,
                                    DegreeCourseObjectives::CourseNo,
                                ),
                            )
                            .to(
                                DegreeCourses::Table,
                                (
                                    DegreeCourses::Name,
                                    DegreeCourses::Level,
                                    DegreeCourses::CourseNo,
                                ),
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-degree_course_objectives-objective_code")
                            .from(
                                DegreeCourseObjectives::Table,
                                DegreeCourseObjectives::ObjectiveCode,
                            )
                            .to(Objectives::Table, Objectives::Code)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Outcome measurements
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Evaluations::CourseNo).string().not_null())
                    .col(ColumnDef::new(Evaluations::Year).integer().not_null())
                    .col(ColumnDef::new(Evaluations::Term).string().not_null())
                    .col(ColumnDef::new(Evaluations::SectionNo).string().not_null())
                    .col(ColumnDef::new(Evaluations::Name).string().not_null())
                    .col(ColumnDef::new(Evaluations::Level).string().not_null())
                    .col(ColumnDef::new(Evaluations::ObjectiveCode).string().not_null())
                    .col(ColumnDef::new(Evaluations::MethodLabel).string())
                    .col(
                        ColumnDef::new(Evaluations::ACount)
                            .integer()
                            .check(Expr::col(Evaluations::ACount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Evaluations::BCount)
                            .integer()
                            .check(Expr::col(Evaluations::BCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Evaluations::CCount)
                            .integer()
                            .check(Expr::col(Evaluations::CCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Evaluations::FCount)
                            .integer()
                            .check(Expr::col(Evaluations::FCount).gte(0)),
                    )
                    .col(ColumnDef::new(Evaluations::ImprovementText).text())
                    .primary_key(
                        Index::create()
                            .col(Evaluations::CourseNo)
                            .col(Evaluations::Year)
                            .col(Evaluations::Term)
                            .col(Evaluations::SectionNo)
                            .col(Evaluations::Name)
                            .col(Evaluations::Level)
                            .col(Evaluations::ObjectiveCode),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluations-section")
                            .from_tbl(Evaluations::Table)
                            .from_col(Evaluations::CourseNo)
                            .from_col(Evaluations::Year)
                            .from_col(Evaluations::Term)
                            .from_col(Evaluations::SectionNo)
                            .to_tbl(Sections::Table)
                            .to_col(Sections::CourseNo)
                            .to_col(Sections::Year)
                            .to_col(Sections::Term)
                            .to_col(Sections::SectionNo)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluations-degree_course_objective")
                            .from_tbl(Evaluations::Table)
                            .from_col(Evaluations::Name)
                            .from_col(Evaluations::Level)
                            .from_col(Evaluations::CourseNo)
                            .from_col(Evaluations::ObjectiveCode)
                            .to_tbl(DegreeCourseObjectives::Table)
                            .to_col(DegreeCourseObjectives::Name)
                            .to_col(DegreeCourseObjectives::Level)
                            .to_col(DegreeCourseObjectives::CourseNo)
                            .to_col(DegreeCourseObjectives::ObjectiveCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DegreeCourseObjectives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DegreeCourses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Semesters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Objectives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instructors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Degrees::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Degrees {
    Table,
    Name,
    Level,
    Description,
}

#[derive(Iden)]
pub(crate) enum Courses {
    Table,
    CourseNo,
    Title,
    Description,
}

#[derive(Iden)]
pub(crate) enum Instructors {
    Table,
    InstructorId,
    Name,
}

#[derive(Iden)]
pub(crate) enum Objectives {
    Table,
    Code,
    Title,
    Description,
}

#[derive(Iden)]
pub(crate) enum Semesters {
    Table,
    Year,
    Term,
}

#[derive(Iden)]
pub(crate) enum Sections {
    Table,
    CourseNo,
    Year,
    Term,
    SectionNo,
    InstructorId,
    EnrolledCount,
}

#[derive(Iden)]
pub(crate) enum DegreeCourses {
    Table,
    Name,
    Level,
    CourseNo,
    IsCore,
}

#[derive(Iden)]
pub(crate) enum DegreeCourseObjectives {
    Table,
    Name,
    Level,
    CourseNo,
    ObjectiveCode,
}

#[derive(Iden)]
pub(crate) enum Evaluations {
    Table,
    CourseNo,
    Year,
    Term,
    SectionNo,
    Name,
    Level,
    ObjectiveCode,
    MethodLabel,
    ACount,
    BCount,
    CCount,
    FCount,
    ImprovementText,
}
