use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(string(Students::Id).primary_key())
                    .col(string(Students::Email).unique_key())
                    .col(string(Students::MatricNo).unique_key())
                    .col(string(Students::FirstName))
                    .col(string(Students::LastName))
                    .col(text_null(Students::Photo))
                    .col(integer_null(Students::AccessCode))
                    .col(timestamp_with_time_zone(Students::DateCreated))
                    .to_owned(),
            )
            .await?;

        // Create lecturers table
        manager
            .create_table(
                Table::create()
                    .table(Lecturers::Table)
                    .if_not_exists()
                    .col(string(Lecturers::Id).primary_key())
                    .col(string(Lecturers::Email).unique_key())
                    .col(string(Lecturers::FirstName))
                    .col(string(Lecturers::LastName))
                    .col(text_null(Lecturers::Photo))
                    .col(integer_null(Lecturers::AccessCode))
                    .col(timestamp_with_time_zone(Lecturers::DateCreated))
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(string(Courses::Id).primary_key())
                    .col(string(Courses::Code))
                    .col(string(Courses::Title))
                    .col(integer(Courses::Unit))
                    .col(text_null(Courses::Description))
                    .col(timestamp_with_time_zone(Courses::DateCreated))
                    .to_owned(),
            )
            .await?;

        // Create lectures table
        manager
            .create_table(
                Table::create()
                    .table(Lectures::Table)
                    .if_not_exists()
                    .col(string(Lectures::Id).primary_key())
                    .col(string(Lectures::CourseId))
                    .col(string(Lectures::LecturerId))
                    .col(string(Lectures::Title))
                    .col(text(Lectures::Description))
                    .col(timestamp_with_time_zone(Lectures::DateCreated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lecture_course")
                            .from(Lectures::Table, Lectures::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lecture_lecturer")
                            .from(Lectures::Table, Lectures::LecturerId)
                            .to(Lecturers::Table, Lecturers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create lecturer_courses table (join table)
        manager
            .create_table(
                Table::create()
                    .table(LecturerCourses::Table)
                    .if_not_exists()
                    .col(string(LecturerCourses::Id).primary_key())
                    .col(string(LecturerCourses::LecturerId))
                    .col(string(LecturerCourses::CourseId))
                    .col(timestamp_with_time_zone(LecturerCourses::DateCreated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lecturer_courses_lecturer")
                            .from(LecturerCourses::Table, LecturerCourses::LecturerId)
                            .to(Lecturers::Table, Lecturers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lecturer_courses_course")
                            .from(LecturerCourses::Table, LecturerCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create student_courses table (join table)
        manager
            .create_table(
                Table::create()
                    .table(StudentCourses::Table)
                    .if_not_exists()
                    .col(string(StudentCourses::Id).primary_key())
                    .col(string(StudentCourses::StudentId))
                    .col(string(StudentCourses::CourseId))
                    .col(timestamp_with_time_zone(StudentCourses::DateCreated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_courses_student")
                            .from(StudentCourses::Table, StudentCourses::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_courses_course")
                            .from(StudentCourses::Table, StudentCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendees table (join table)
        manager
            .create_table(
                Table::create()
                    .table(Attendees::Table)
                    .if_not_exists()
                    .col(string(Attendees::Id).primary_key())
                    .col(string(Attendees::StudentId))
                    .col(string(Attendees::LectureId))
                    .col(timestamp_with_time_zone(Attendees::DateCreated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendees_student")
                            .from(Attendees::Table, Attendees::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendees_lecture")
                            .from(Attendees::Table, Attendees::LectureId)
                            .to(Lectures::Table, Lectures::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per pair in every join table
        manager
            .create_index(
                Index::create()
                    .name("idx_lecturer_courses_pair")
                    .table(LecturerCourses::Table)
                    .col(LecturerCourses::LecturerId)
                    .col(LecturerCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_courses_pair")
                    .table(StudentCourses::Table)
                    .col(StudentCourses::StudentId)
                    .col(StudentCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendees_pair")
                    .table(Attendees::Table)
                    .col(Attendees::StudentId)
                    .col(Attendees::LectureId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lectures_course")
                    .table(Lectures::Table)
                    .col(Lectures::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentCourses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LecturerCourses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lectures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lecturers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    Email,
    MatricNo,
    FirstName,
    LastName,
    Photo,
    AccessCode,
    DateCreated,
}

#[derive(DeriveIden)]
enum Lecturers {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Photo,
    AccessCode,
    DateCreated,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Code,
    Title,
    Unit,
    Description,
    DateCreated,
}

#[derive(DeriveIden)]
enum Lectures {
    Table,
    Id,
    CourseId,
    LecturerId,
    Title,
    Description,
    DateCreated,
}

#[derive(DeriveIden)]
enum LecturerCourses {
    Table,
    Id,
    LecturerId,
    CourseId,
    DateCreated,
}

#[derive(DeriveIden)]
enum StudentCourses {
    Table,
    Id,
    StudentId,
    CourseId,
    DateCreated,
}

#[derive(DeriveIden)]
enum Attendees {
    Table,
    Id,
    StudentId,
    LectureId,
    DateCreated,
}
