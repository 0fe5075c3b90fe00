use sea_orm::entity::prelude::*;

/// A student who can be registered for courses and marked as a lecture attendee.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    /// The matriculation number printed on the student's ID card.
    #[sea_orm(unique)]
    pub matric_no: String,
    pub first_name: String,
    pub last_name: String,
    /// Base64 encoded photo.
    #[sea_orm(column_type = "Text", nullable)]
    pub photo: Option<String>,
    /// The last issued access code. `None` until access is requested.
    pub access_code: Option<i32>,
    pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
    #[sea_orm(has_many = "super::attendee::Entity")]
    Attendee,
}

impl Related<super::student_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCourse.def()
    }
}

impl Related<super::attendee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendee.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Student.def().rev())
    }
}

impl Related<super::lecture::Entity> for Entity {
    fn to() -> RelationDef {
        super::attendee::Relation::Lecture.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::attendee::Relation::Student.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
