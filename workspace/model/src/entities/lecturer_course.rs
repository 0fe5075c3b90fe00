use super::{course, lecturer};
use sea_orm::entity::prelude::*;

/// Assignment of a lecturer to a course. A pair appears at most once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lecturer_courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub lecturer_id: String,
    pub course_id: String,
    pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "lecturer::Entity",
        from = "Column::LecturerId",
        to = "lecturer::Column::Id"
    )]
    Lecturer,
    #[sea_orm(belongs_to = "course::Entity", from = "Column::CourseId", to = "course::Column::Id")]
    Course,
}

impl Related<lecturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecturer.def()
    }
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
