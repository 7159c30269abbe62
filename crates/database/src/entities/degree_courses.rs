use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Junction table placing a course in a degree, marked core or elective
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "degree_courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub level: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_no: String,
    pub is_core: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::degrees::Entity",
        from = "(Column::Name, Column::Level)",
        to = "(super::degrees::Column::Name, super::degrees::Column::Level)",
        on_delete = "Cascade"
    )]
    Degree,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseNo",
        to = "super::courses::Column::CourseNo",
        on_delete = "Restrict"
    )]
    Course,
    #[sea_orm(has_many = "super::degree_course_objectives::Entity")]
    DegreeCourseObjectives,
}

impl Related<super::degrees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Degree.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::degree_course_objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DegreeCourseObjectives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
