use models::evaluation::{EvaluationFields, GradeCounts};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome measurement for one section against one degree-scoped objective
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_no: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub term: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub section_no: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub level: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub objective_code: String,
    pub method_label: Option<String>,
    pub a_count: Option<i32>,
    pub b_count: Option<i32>,
    pub c_count: Option<i32>,
    pub f_count: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub improvement_text: Option<String>,
}

impl Model {
    pub fn counts(&self) -> GradeCounts {
        GradeCounts::new(self.a_count, self.b_count, self.c_count, self.f_count)
    }

    pub fn fields(&self) -> EvaluationFields {
        EvaluationFields {
            method_label: self.method_label.clone(),
            counts: self.counts(),
            improvement_text: self.improvement_text.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "(Column::CourseNo, Column::Year, Column::Term, Column::SectionNo)",
        to = "(super::sections::Column::CourseNo, super::sections::Column::Year, super::sections::Column::Term, super::sections::Column::SectionNo)",
        on_delete = "Restrict"
    )]
    Section,
    #[sea_orm(
        belongs_to = "super::degree_course_objectives::Entity",
        from = "(Column::Name, Column::Level, Column::CourseNo, Column::ObjectiveCode)",
        to = "(super::degree_course_objectives::Column::Name, super::degree_course_objectives::Column::Level, super::degree_course_objectives::Column::CourseNo, super::degree_course_objectives::Column::ObjectiveCode)",
        on_delete = "Cascade"
    )]
    DegreeCourseObjective,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::degree_course_objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DegreeCourseObjective.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
