use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{attendee, course, lecture, lecturer, student};
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    // A single connection keeps every query on the same in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

fn next_id(prefix: &str) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    format!("{}-{}", prefix, NEXT.fetch_add(1, Ordering::SeqCst))
}

pub async fn new_course(db: &DatabaseConnection, code: &str) -> Result<course::Model> {
    course::ActiveModel {
        id: Set(next_id("course")),
        code: Set(code.to_string()),
        title: Set(format!("{} title", code)),
        unit: Set(2),
        description: Set(None),
        date_created: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn new_lecturer(db: &DatabaseConnection, email: &str) -> Result<lecturer::Model> {
    lecturer::ActiveModel {
        id: Set(next_id("lecturer")),
        email: Set(email.to_string()),
        first_name: Set("Bisi".to_string()),
        last_name: Set("Ade".to_string()),
        photo: Set(None),
        access_code: Set(None),
        date_created: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn new_student(db: &DatabaseConnection, matric_no: &str) -> Result<student::Model> {
    student::ActiveModel {
        id: Set(next_id("student")),
        email: Set(format!("{}@students.yabatech.edu.ng", matric_no.replace('/', "."))),
        matric_no: Set(matric_no.to_string()),
        first_name: Set("Ada".to_string()),
        last_name: Set("Obi".to_string()),
        photo: Set(None),
        access_code: Set(None),
        date_created: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn new_lecture(
    db: &DatabaseConnection,
    course: &course::Model,
    lecturer: &lecturer::Model,
) -> Result<lecture::Model> {
    lecture::ActiveModel {
        id: Set(next_id("lecture")),
        course_id: Set(course.id.clone()),
        lecturer_id: Set(lecturer.id.clone()),
        title: Set(format!("Lecture on {}", course.code)),
        description: Set(String::new()),
        date_created: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn mark(
    db: &DatabaseConnection,
    student: &student::Model,
    lecture: &lecture::Model,
) -> Result<attendee::Model> {
    attendee::ActiveModel {
        id: Set(next_id("attendee")),
        student_id: Set(student.id.clone()),
        lecture_id: Set(lecture.id.clone()),
        date_created: Set(Utc::now()),
    }
    .insert(db)
    .await
}
