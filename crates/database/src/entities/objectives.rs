use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A learning outcome definition
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "objectives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::degree_course_objectives::Entity")]
    DegreeCourseObjectives,
}

impl Related<super::degree_course_objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DegreeCourseObjectives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
