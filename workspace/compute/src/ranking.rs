use std::collections::HashMap;

use common::{CourseRanking, LecturerRanking, StudentRanking};
use model::entities::{attendee, lecture, prelude::*};
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, EntityTrait, QuerySelect};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// Computes attendance rankings for students, courses and lecturers.
///
/// Each report loads the entities together with the associations leading to
/// their attendance rows, counts those rows and orders the entities by the
/// count, highest first. Entities with equal counts keep the order in which
/// the store returned them.
#[derive(Debug, Default)]
pub struct RankingComputer;

impl RankingComputer {
    pub fn new() -> Self {
        Self
    }

    /// Ranks students by the number of lectures they attended.
    #[instrument(skip(self, db))]
    pub async fn student_ranking(&self, db: &DatabaseConnection) -> Result<Vec<StudentRanking>> {
        let students = Student::find().find_with_related(Attendee).all(db).await?;
        debug!("Loaded {} students with attendance", students.len());

        let mut ranking: Vec<StudentRanking> = students
            .into_iter()
            .map(|(student, attendees)| StudentRanking {
                student_id: student.id,
                matric_no: student.matric_no,
                email: student.email,
                first_name: student.first_name,
                last_name: student.last_name,
                attendance_count: attendees.len() as u64,
            })
            .collect();

        sort_descending(&mut ranking, |r| r.attendance_count);
        info!("Computed student ranking with {} entries", ranking.len());
        Ok(ranking)
    }

    /// Ranks courses by the attendance recorded across all their lectures.
    #[instrument(skip(self, db))]
    pub async fn course_ranking(&self, db: &DatabaseConnection) -> Result<Vec<CourseRanking>> {
        let courses = Course::find().find_with_related(Lecture).all(db).await?;
        let per_lecture = attendance_per_lecture(db).await?;
        debug!(
            "Loaded {} courses, {} lectures have attendance",
            courses.len(),
            per_lecture.len()
        );

        let mut ranking: Vec<CourseRanking> = courses
            .into_iter()
            .map(|(course, lectures)| CourseRanking {
                attendance_count: sum_attendance(&lectures, &per_lecture),
                course_id: course.id,
                course_code: course.code,
                course_title: course.title,
                course_unit: course.unit,
            })
            .collect();

        sort_descending(&mut ranking, |r| r.attendance_count);
        info!("Computed course ranking with {} entries", ranking.len());
        Ok(ranking)
    }

    /// Ranks lecturers by the attendance recorded across the lectures they created.
    #[instrument(skip(self, db))]
    pub async fn lecturer_ranking(&self, db: &DatabaseConnection) -> Result<Vec<LecturerRanking>> {
        let lecturers = Lecturer::find().find_with_related(Lecture).all(db).await?;
        let per_lecture = attendance_per_lecture(db).await?;
        debug!("Loaded {} lecturers with lectures", lecturers.len());

        let mut ranking: Vec<LecturerRanking> = lecturers
            .into_iter()
            .map(|(lecturer, lectures)| LecturerRanking {
                attendance_count: sum_attendance(&lectures, &per_lecture),
                lecturer_id: lecturer.id,
                email: lecturer.email,
                first_name: lecturer.first_name,
                last_name: lecturer.last_name,
            })
            .collect();

        sort_descending(&mut ranking, |r| r.attendance_count);
        info!("Computed lecturer ranking with {} entries", ranking.len());
        Ok(ranking)
    }
}

/// Number of attendee rows per lecture id. Lectures without attendance are absent.
async fn attendance_per_lecture(db: &DatabaseConnection) -> Result<HashMap<String, u64>> {
    let rows: Vec<(String, i64)> = Attendee::find()
        .select_only()
        .column(attendee::Column::LectureId)
        .column_as(Expr::col(attendee::Column::Id).count(), "attendance_count")
        .group_by(attendee::Column::LectureId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(lecture_id, count)| (lecture_id, u64::try_from(count).unwrap_or_default()))
        .collect())
}

fn sum_attendance(lectures: &[lecture::Model], per_lecture: &HashMap<String, u64>) -> u64 {
    lectures
        .iter()
        .map(|l| per_lecture.get(&l.id).copied().unwrap_or(0))
        .sum()
}

// `sort_by` is stable, so ties keep their fetch order.
fn sort_descending<T>(items: &mut [T], key: impl Fn(&T) -> u64) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
