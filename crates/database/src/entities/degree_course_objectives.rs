use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links an objective to a degree-course pairing; the unit that must be assessed
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "degree_course_objectives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub level: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_no: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub objective_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::degree_courses::Entity",
        from = "(Column::Name, Column::Level, Column::CourseNo)",
        to = "(super::degree_courses::Column::Name, super::degree_courses::Column::Level, super::degree_courses::Column::CourseNo)",
        on_delete = "Cascade"
    )]
    DegreeCourse,
    #[sea_orm(
        belongs_to = "super::objectives::Entity",
        from = "Column::ObjectiveCode",
        to = "super::objectives::Column::Code",
        on_delete = "Restrict"
    )]
    Objective,
    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
}

impl Related<super::degree_courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DegreeCourse.def()
    }
}

impl Related<super::objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Objective.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
