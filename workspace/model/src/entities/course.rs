use sea_orm::entity::prelude::*;

/// A course offered by the institution, e.g. "CSC101 Intro to CS".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub title: String,
    /// Credit units, always greater than zero.
    pub unit: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lecture::Entity")]
    Lecture,
    #[sea_orm(has_many = "super::lecturer_course::Entity")]
    LecturerCourse,
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
}

impl Related<super::lecture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecture.def()
    }
}

impl Related<super::lecturer_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LecturerCourse.def()
    }
}

impl Related<super::student_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCourse.def()
    }
}

impl Related<super::lecturer::Entity> for Entity {
    fn to() -> RelationDef {
        super::lecturer_course::Relation::Lecturer.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::lecturer_course::Relation::Course.def().rev())
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Course.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
