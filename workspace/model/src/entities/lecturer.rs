use sea_orm::entity::prelude::*;

/// A lecturer who teaches courses and takes attendance at lectures.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lecturers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub photo: Option<String>,
    pub access_code: Option<i32>,
    pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lecturer_course::Entity")]
    LecturerCourse,
    /// Lectures created by this lecturer.
    #[sea_orm(has_many = "super::lecture::Entity")]
    Lecture,
}

impl Related<super::lecturer_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LecturerCourse.def()
    }
}

impl Related<super::lecture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecture.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::lecturer_course::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::lecturer_course::Relation::Lecturer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
