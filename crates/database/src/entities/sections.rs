use models::{
    keys::SectionKey,
    term::{Semester, Term},
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A specific offering of a course
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_no: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub term: String, // Spring, Summer, Fall
    #[sea_orm(primary_key, auto_increment = false)]
    pub section_no: String,
    pub instructor_id: String,
    pub enrolled_count: i32,
}

impl Model {
    pub fn semester(&self) -> Option<Semester> {
        Term::from_str(&self.term)
            .ok()
            .map(|term| Semester::new(self.year, term))
    }

    pub fn key(&self) -> Option<SectionKey> {
        self.semester().map(|semester| {
            SectionKey::new(
                self.course_no.clone(),
                semester.year,
                semester.term,
                self.section_no.clone(),
            )
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseNo",
        to = "super::courses::Column::CourseNo",
        on_delete = "Restrict"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::semesters::Entity",
        from = "(Column::Year, Column::Term)",
        to = "(super::semesters::Column::Year, super::semesters::Column::Term)",
        on_delete = "Restrict"
    )]
    Semester,
    #[sea_orm(
        belongs_to = "super::instructors::Entity",
        from = "Column::InstructorId",
        to = "super::instructors::Column::InstructorId",
        on_delete = "Restrict"
    )]
    Instructor,
    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::semesters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::instructors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
