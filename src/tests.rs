mod integration_tests {
    use crate::test_utils::{TestApp, setup_test_app, setup_test_app_with_failing_mailer};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use model::entities::{attendee, lecturer, prelude::*, student};
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use serde_json::{Value, json};

    async fn post_ok(server: &TestServer, path: &str, body: Value) -> Value {
        let response = server.post(path).json(&body).await;
        if response.status_code() != StatusCode::OK {
            println!("Error response: {}", response.text());
            panic!("Expected 200 OK from {}, got {}", path, response.status_code());
        }
        response.json()
    }

    async fn create_course(server: &TestServer, code: &str, title: &str) -> String {
        let body = post_ok(
            server,
            "/courses",
            json!({ "courseCode": code, "courseTitle": title, "courseUnit": 3 }),
        )
        .await;
        body["result"]["courseId"].as_str().unwrap().to_string()
    }

    async fn create_lecturer(server: &TestServer, email: &str, first: &str, last: &str) -> String {
        let body = post_ok(
            server,
            "/lecturers",
            json!({ "email": email, "firstName": first, "lastName": last }),
        )
        .await;
        body["result"]["id"].as_str().unwrap().to_string()
    }

    async fn create_student(server: &TestServer, email: &str, matric: &str) -> String {
        let body = post_ok(
            server,
            "/students",
            json!({ "email": email, "matricNo": matric, "firstName": "Ada", "lastName": "Obi" }),
        )
        .await;
        body["result"]["id"].as_str().unwrap().to_string()
    }

    async fn assign(server: &TestServer, lecturer_id: &str, course_id: &str) {
        post_ok(
            server,
            "/lecturer-courses",
            json!({ "lecturerId": lecturer_id, "courseId": course_id }),
        )
        .await;
    }

    async fn register(server: &TestServer, student_id: &str, course_ids: &[&str]) -> Value {
        post_ok(
            server,
            "/student-courses",
            json!({ "studentId": student_id, "courseIds": course_ids }),
        )
        .await
    }

    async fn create_lecture(server: &TestServer, lecturer_id: &str, course_id: &str) -> Value {
        post_ok(
            server,
            "/lectures",
            json!({ "lecturerId": lecturer_id, "courseId": course_id }),
        )
        .await
    }

    /// Course, lecturer, student, assignment, registration and one lecture.
    struct Classroom {
        course_id: String,
        lecturer_id: String,
        student_id: String,
        lecture_id: String,
    }

    async fn classroom(server: &TestServer) -> Classroom {
        let course_id = create_course(server, "CSC101", "Intro to CS").await;
        let lecturer_id = create_lecturer(server, "kunle@yabatech.edu.ng", "Kunle", "Ade").await;
        let student_id = create_student(server, "ada@yabatech.edu.ng", "ND22001").await;
        assign(server, &lecturer_id, &course_id).await;
        register(server, &student_id, &[&course_id]).await;
        let lecture = create_lecture(server, &lecturer_id, &course_id).await;
        let lecture_id = lecture["result"]["id"].as_str().unwrap().to_string();
        Classroom {
            course_id,
            lecturer_id,
            student_id,
            lecture_id,
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let TestApp { server, .. } = setup_test_app().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_create_course_returns_envelope() {
        let TestApp { server, .. } = setup_test_app().await;

        let body = post_ok(
            &server,
            "/courses",
            json!({ "code": "CSC101", "title": "Intro to CS", "unit": 3, "description": "Basics" }),
        )
        .await;

        assert!(body["errorMessage"].is_null());
        assert!(body["warningResult"].is_null());
        assert!(!body["result"]["courseId"].as_str().unwrap().is_empty());
        assert_eq!(body["result"]["courseCode"], "CSC101");
        assert_eq!(body["result"]["courseTitle"], "Intro to CS");
        assert_eq!(body["result"]["courseUnit"], 3);
        assert_eq!(body["result"]["courseDescription"], "Basics");
    }

    #[tokio::test]
    async fn test_create_course_validation_writes_nothing() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let cases = [
            (
                json!({ "courseCode": "", "courseTitle": "Intro", "courseUnit": 3 }),
                "Course code cannot be null",
            ),
            (
                json!({ "courseCode": "CSC101", "courseTitle": "", "courseUnit": 3 }),
                "Course title cannot be null",
            ),
            (
                json!({ "courseCode": "CSC101", "courseTitle": "Intro", "courseUnit": 0 }),
                "Course unit cannot be less than or equal to zero",
            ),
            (
                json!({ "courseCode": "CSC101", "courseTitle": "Intro", "courseUnit": -2 }),
                "Course unit cannot be less than or equal to zero",
            ),
            // Code is reported before title and unit
            (json!({ "courseUnit": 0 }), "Course code cannot be null"),
        ];

        for (request, message) in cases {
            let response = server.post("/courses").json(&request).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["errorMessage"], message);
            assert!(body["result"].is_null());
        }

        assert_eq!(Course::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported_in_envelope() {
        let TestApp { server, .. } = setup_test_app().await;

        let response = server
            .post("/courses")
            .json(&json!({ "courseCode": "CSC101", "courseTitle": "Intro", "courseUnit": "three" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errorMessage"].is_string());
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_create_courses_batch() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let response = server
            .post("/courses/batch")
            .json(&json!([
                { "courseCode": "CSC101", "courseTitle": "Intro", "courseUnit": 3 },
                { "courseCode": "CSC102", "courseTitle": "", "courseUnit": 2 }
            ]))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Course title cannot be null");
        assert_eq!(Course::find().count(&db).await.unwrap(), 0);

        let body = post_ok(
            &server,
            "/courses/batch",
            json!([
                { "courseCode": "CSC101", "courseTitle": "Intro", "courseUnit": 3 },
                { "courseCode": "CSC102", "courseTitle": "Data Structures", "courseUnit": 2 }
            ]),
        )
        .await;
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
        assert_eq!(Course::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_lecturer_rejects_duplicate_email() {
        let TestApp { server, db, .. } = setup_test_app().await;

        create_lecturer(&server, "a@x.com", "A", "B").await;

        let response = server
            .post("/lecturers")
            .json(&json!({ "email": "a@x.com", "firstName": "C", "lastName": "D" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Email address already exist");

        let response = server
            .post("/lecturers")
            .json(&json!({ "email": "b@x.com", "firstName": "", "lastName": "D" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "First name cannot be null");

        assert_eq!(Lecturer::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_lecturers_batch_rejects_wholesale() {
        let TestApp { server, db, .. } = setup_test_app().await;

        create_lecturer(&server, "a@x.com", "A", "B").await;

        // Repeated within the batch
        let response = server
            .post("/lecturers/batch")
            .json(&json!([
                { "email": "b@x.com", "firstName": "B", "lastName": "B" },
                { "email": "b@x.com", "firstName": "C", "lastName": "C" }
            ]))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Email address b@x.com, already exist");

        // Already stored
        let response = server
            .post("/lecturers/batch")
            .json(&json!([
                { "email": "c@x.com", "firstName": "C", "lastName": "C" },
                { "email": "a@x.com", "firstName": "A", "lastName": "A" }
            ]))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Email address a@x.com, already exist");

        // Missing field
        let response = server
            .post("/lecturers/batch")
            .json(&json!([
                { "email": "d@x.com", "firstName": "D", "lastName": "D" },
                { "email": "e@x.com", "firstName": "E" }
            ]))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Last name cannot be null");

        assert_eq!(Lecturer::find().count(&db).await.unwrap(), 1);

        let body = post_ok(
            &server,
            "/lecturers/batch",
            json!([
                { "email": "d@x.com", "firstName": "D", "lastName": "D" },
                { "email": "e@x.com", "firstName": "E", "lastName": "E" }
            ]),
        )
        .await;
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
        assert_eq!(Lecturer::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_student_rejects_duplicates() {
        let TestApp { server, db, .. } = setup_test_app().await;

        create_student(&server, "ada@x.com", "ND22001").await;

        for request in [
            json!({ "email": "ada@x.com", "matricNo": "ND22002", "firstName": "A", "lastName": "O" }),
            json!({ "email": "bola@x.com", "matricNo": "ND22001", "firstName": "B", "lastName": "O" }),
        ] {
            let response = server.post("/students").json(&request).await;
            response.assert_status(StatusCode::FORBIDDEN);
            let body: Value = response.json();
            assert_eq!(
                body["errorMessage"],
                "A student with the specified email or matric number already exist"
            );
        }

        let response = server
            .post("/students")
            .json(&json!({ "email": "c@x.com", "firstName": "C", "lastName": "O" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Matric number cannot be null");

        assert_eq!(Student::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_students_batch_skips_collisions_as_warnings() {
        let TestApp { server, db, .. } = setup_test_app().await;

        create_student(&server, "ada@x.com", "ND22001").await;

        let body = post_ok(
            &server,
            "/students/batch",
            json!([
                { "email": "bola@x.com", "matricNo": "ND22002", "firstName": "Bola", "lastName": "O" },
                { "email": "chidi@x.com", "matricNo": "ND22001", "firstName": "Chidi", "lastName": "O" },
                { "email": "dayo@x.com", "matricNo": "ND22003", "firstName": "Dayo", "lastName": "O" }
            ]),
        )
        .await;

        let warnings = body["warningResult"]["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["code"], 17406);
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
        assert_eq!(Student::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_students_batch_skips_invalid_and_repeated_entries() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let body = post_ok(
            &server,
            "/students/batch",
            json!([
                { "email": "bola@x.com", "matricNo": "ND22002", "firstName": "Bola", "lastName": "O" },
                { "email": "bola@x.com", "matricNo": "ND22009", "firstName": "Bola", "lastName": "O" },
                { "email": "", "matricNo": "ND22003", "firstName": "Dayo", "lastName": "O" }
            ]),
        )
        .await;

        let warnings = body["warningResult"]["warnings"].as_array().unwrap();
        let codes: Vec<i64> = warnings.iter().map(|w| w["code"].as_i64().unwrap()).collect();
        assert_eq!(codes, vec![17406, 14226]);
        assert_eq!(Student::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_students_batch_reports_null_fields_as_warnings() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let body = post_ok(
            &server,
            "/students/batch",
            json!([
                { "email": "bola@x.com", "matricNo": "ND22002", "firstName": "Bola", "lastName": "O" },
                { "email": null, "matricNo": "ND22003", "firstName": "Dayo", "lastName": "O" }
            ]),
        )
        .await;

        let warnings = body["warningResult"]["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["code"], 14226);
        assert!(warnings[0]["detail"].as_str().unwrap().contains("Email cannot be null"));
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        assert_eq!(Student::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_null_required_fields_get_field_messages() {
        let TestApp { server, db, .. } = setup_test_app().await;
        let room = classroom(&server).await;

        let cases = [
            (
                "/courses",
                json!({ "courseCode": null, "courseTitle": "Intro", "courseUnit": 3 }),
                "Course code cannot be null",
            ),
            (
                "/courses",
                json!({ "courseCode": "MTH101", "courseTitle": null, "courseUnit": 3 }),
                "Course title cannot be null",
            ),
            (
                "/courses",
                json!({ "courseCode": "MTH101", "courseTitle": "Algebra", "courseUnit": null }),
                "Course unit cannot be less than or equal to zero",
            ),
            (
                "/courses/batch",
                json!([{ "code": null, "title": "Algebra", "unit": 2 }]),
                "Course code cannot be null",
            ),
            (
                "/lecturers",
                json!({ "email": null, "firstName": "A", "lastName": "B" }),
                "Email cannot be null",
            ),
            (
                "/lecturers",
                json!({ "email": "b@x.com", "firstName": null, "lastName": "B" }),
                "First name cannot be null",
            ),
            (
                "/lecturers/batch",
                json!([{ "email": "b@x.com", "firstName": "B", "lastName": null }]),
                "Last name cannot be null",
            ),
            (
                "/students",
                json!({ "email": "c@x.com", "matricNo": null, "firstName": "C", "lastName": "O" }),
                "Matric number cannot be null",
            ),
            (
                "/students/photo",
                json!({ "id": room.student_id, "encodedPhoto": null }),
                "This operation require a student's photo base 64 encoded format.",
            ),
            (
                "/lecturer-courses",
                json!({ "lecturerId": null, "courseId": room.course_id }),
                "Lecturer id is required",
            ),
            (
                "/lectures",
                json!({ "lecturerId": room.lecturer_id, "courseId": null }),
                "Course id is required",
            ),
            (
                "/attendance",
                json!({ "matricNo": null, "lectureId": room.lecture_id }),
                "The student's matric number is required",
            ),
            (
                "/attendance",
                json!({ "matricNo": "ND22001", "lectureId": null }),
                "Lecture's id is required",
            ),
            (
                "/student-courses",
                json!({ "studentId": null, "courseIds": [room.course_id] }),
                "Student id is required",
            ),
            (
                "/student-courses",
                json!({ "studentId": room.student_id, "courseIds": null }),
                "A minimum of one course is required.",
            ),
            (
                "/student-courses",
                json!({ "studentId": room.student_id, "courseIds": [room.course_id, null] }),
                "Not all course id are valid",
            ),
        ];

        for (path, request, message) in cases {
            let response = server.post(path).json(&request).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["errorMessage"], message, "unexpected message from {}", path);
        }

        assert_eq!(Course::find().count(&db).await.unwrap(), 1);
        assert_eq!(Lecturer::find().count(&db).await.unwrap(), 1);
        assert_eq!(Student::find().count(&db).await.unwrap(), 1);
        assert_eq!(Lecture::find().count(&db).await.unwrap(), 1);
        assert_eq!(Attendee::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_student_courses_reports_warnings() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let csc = create_course(&server, "CSC101", "Intro to CS").await;
        let mth = create_course(&server, "MTH101", "Algebra").await;
        let student_id = create_student(&server, "ada@x.com", "ND22001").await;

        let body = register(&server, &student_id, &[&csc]).await;
        assert!(body["warningResult"].is_null());

        let body = register(&server, &student_id, &[&csc, "missing-course", &mth, &mth]).await;
        let warnings = body["warningResult"]["warnings"].as_array().unwrap();
        let summary: Vec<(i64, i64)> = warnings
            .iter()
            .map(|w| (w["status"].as_i64().unwrap(), w["code"].as_i64().unwrap()))
            .collect();
        assert_eq!(summary, vec![(300, 17405), (404, 11745), (300, 17405)]);
        assert_eq!(body["result"].as_array().unwrap().len(), 1);

        assert_eq!(StudentCourse::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_register_student_courses_validation() {
        let TestApp { server, .. } = setup_test_app().await;

        let course_id = create_course(&server, "CSC101", "Intro to CS").await;
        let cases = [
            (json!({ "courseIds": [course_id] }), StatusCode::BAD_REQUEST, "Student id is required"),
            (
                json!({ "studentId": "s1", "courseIds": [] }),
                StatusCode::BAD_REQUEST,
                "A minimum of one course is required.",
            ),
            (
                json!({ "studentId": "s1", "courseIds": [course_id, ""] }),
                StatusCode::BAD_REQUEST,
                "Not all course id are valid",
            ),
            (
                json!({ "studentId": "s1", "courseIds": [course_id] }),
                StatusCode::NOT_FOUND,
                "Student with id: s1 could not be found",
            ),
        ];

        for (request, status, message) in cases {
            let response = server.post("/student-courses").json(&request).await;
            response.assert_status(status);
            let body: Value = response.json();
            assert_eq!(body["errorMessage"], message);
        }
    }

    #[tokio::test]
    async fn test_assignment_and_lecture_scenario() {
        let TestApp { server, .. } = setup_test_app().await;

        let course_id = create_course(&server, "CSC101", "Intro to CS").await;
        assert!(!course_id.is_empty());
        let lecturer_id = create_lecturer(&server, "a@x.com", "A", "B").await;

        assign(&server, &lecturer_id, &course_id).await;

        let response = server
            .post("/lecturer-courses")
            .json(&json!({ "lecturerId": lecturer_id, "courseId": course_id }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errorMessage"].as_str().unwrap().contains("formerly assigned"));

        let body = create_lecture(&server, &lecturer_id, &course_id).await;
        assert_eq!(body["result"]["title"], "Lecture 1 | Intro to CS (CSC101)");
        assert_eq!(
            body["result"]["description"],
            "This is lecture number 1 on Intro to CS taken by A B"
        );

        let body = post_ok(
            &server,
            "/lectures",
            json!({ "lecturerId": lecturer_id, "courseId": course_id, "title": "  ", "description": "Recursion" }),
        )
        .await;
        assert_eq!(body["result"]["title"], "Lecture 2 | Intro to CS (CSC101)");
        assert_eq!(body["result"]["description"], "Recursion");
    }

    #[tokio::test]
    async fn test_assign_requires_existing_entities() {
        let TestApp { server, .. } = setup_test_app().await;

        let course_id = create_course(&server, "CSC101", "Intro to CS").await;
        let lecturer_id = create_lecturer(&server, "a@x.com", "A", "B").await;

        let response = server
            .post("/lecturer-courses")
            .json(&json!({ "lecturerId": "nobody", "courseId": course_id }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/lecturer-courses")
            .json(&json!({ "lecturerId": lecturer_id, "courseId": "nothing" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/lecturer-courses")
            .json(&json!({ "courseId": course_id }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Lecturer id is required");
    }

    #[tokio::test]
    async fn test_create_lecture_requires_assignment() {
        let TestApp { server, db, .. } = setup_test_app().await;

        let course_id = create_course(&server, "CSC101", "Intro to CS").await;
        let lecturer_id = create_lecturer(&server, "a@x.com", "A", "B").await;

        let response = server
            .post("/lectures")
            .json(&json!({ "lecturerId": lecturer_id, "courseId": course_id }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        let error = &body["errorResult"]["errors"][0];
        assert_eq!(error["status"], 403);
        assert_eq!(error["code"], 19941);
        assert_eq!(error["title"], "Lecturer and Course Mismatch");
        assert_eq!(error["detail"], "The specified lecturer does not own the specified course");

        let response = server
            .post("/lectures")
            .json(&json!({ "lecturerId": lecturer_id }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Course id is required");

        assert_eq!(Lecture::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_attendance_is_idempotent() {
        let TestApp { server, db, .. } = setup_test_app().await;
        let room = classroom(&server).await;

        let request = json!({ "matricNo": "ND22001", "lectureId": room.lecture_id });
        let first = post_ok(&server, "/attendance", request.clone()).await;
        assert_eq!(first["result"], "Student attendance marked");

        let second = post_ok(&server, "/attendance", request).await;
        assert_eq!(second["result"], "Student attendance already taken");

        let rows = Attendee::find()
            .filter(attendee::Column::StudentId.eq(room.student_id.clone()))
            .filter(attendee::Column::LectureId.eq(room.lecture_id.clone()))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_mark_attendance_requires_registration() {
        let TestApp { server, db, .. } = setup_test_app().await;
        let room = classroom(&server).await;
        create_student(&server, "bola@x.com", "ND22002").await;

        let response = server
            .post("/attendance")
            .json(&json!({ "matricNo": "ND22002", "lectureId": room.lecture_id }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Student was not Register for Specified Course");
        let error = &body["errorResult"]["errors"][0];
        assert_eq!(error["code"], 19042);
        assert_eq!(
            error["detail"],
            "The specified student, Ada Obi (ND22002) was not registered for Intro to CS (CSC101)"
        );
        assert_eq!(Attendee::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_attendance_lookups_and_validation() {
        let TestApp { server, db, .. } = setup_test_app().await;
        let room = classroom(&server).await;

        let cases = [
            (
                json!({ "lectureId": room.lecture_id }),
                StatusCode::BAD_REQUEST,
                "The student's matric number is required".to_string(),
            ),
            (
                json!({ "matricNo": "ND22001" }),
                StatusCode::BAD_REQUEST,
                "Lecture's id is required".to_string(),
            ),
            (
                json!({ "matricNo": "ND99999", "lectureId": room.lecture_id }),
                StatusCode::NOT_FOUND,
                "Student with matric no: ND99999 was not found".to_string(),
            ),
            (
                json!({ "matricNo": "ND22001", "lectureId": "no-lecture" }),
                StatusCode::NOT_FOUND,
                "Lecture with id: no-lecture was not found".to_string(),
            ),
        ];

        for (request, status, message) in cases {
            let response = server.post("/attendance").json(&request).await;
            response.assert_status(status);
            let body: Value = response.json();
            assert_eq!(body["errorMessage"], message.as_str());
        }

        assert_eq!(Attendee::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lecturer_access_code_round_trip() {
        let TestApp { server, db, mailer } = setup_test_app().await;
        create_lecturer(&server, "a@x.com", "Ayo", "Bello").await;

        let response = server
            .get("/lecturers/access/request")
            .add_query_param("email", "a@x.com")
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"]["email"], "a@x.com");
        assert!(body["result"].get("accessCode").is_none());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address, "a@x.com");
        assert_eq!(sent[0].subject, "Verify Your Access");
        assert!(sent[0].html_body.contains("Hello Ayo,"));

        let code = mailer.last_code().unwrap();
        assert!((100_001..=999_999).contains(&code));
        let stored = Lecturer::find()
            .filter(lecturer::Column::Email.eq("a@x.com"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.access_code, Some(code));

        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .add_query_param("accessCode", code)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"], "Valid access code");

        let wrong = if code == 999_999 { 100_001 } else { code + 1 };
        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .add_query_param("accessCode", wrong)
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Invalid access code");

        // Codes are not single-use
        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .add_query_param("accessCode", code)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lecturer_access_validation() {
        let TestApp { server, .. } = setup_test_app().await;
        create_lecturer(&server, "a@x.com", "Ayo", "Bello").await;

        let response = server.get("/lecturers/access/request").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Lecturer's email is required");

        let response = server
            .get("/lecturers/access/request")
            .add_query_param("email", "nobody@x.com")
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errorMessage"], "Access code is required");

        // Never requested, so no code can match
        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .add_query_param("accessCode", 123456)
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/lecturers/access/verify")
            .add_query_param("email", "a@x.com")
            .add_query_param("accessCode", "abc")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_student_access_code_round_trip() {
        let TestApp { server, mailer, .. } = setup_test_app().await;
        create_student(&server, "ada@x.com", "ND22001").await;

        let response = server
            .get("/students/access/request")
            .add_query_param("matricNumber", "ND22001")
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"]["matricNo"], "ND22001");
        assert!(body["result"].get("accessCode").is_none());

        let code = mailer.last_code().unwrap();
        assert_eq!(mailer.sent()[0].to_address, "ada@x.com");

        let response = server
            .get("/students/access/verify")
            .add_query_param("matricNumber", "ND22001")
            .add_query_param("accessCode", code)
            .await;
        response.assert_status(StatusCode::OK);

        let wrong = if code == 999_999 { 100_001 } else { code + 1 };
        let response = server
            .get("/students/access/verify")
            .add_query_param("matricNumber", "ND22001")
            .add_query_param("accessCode", wrong)
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/students/access/request")
            .add_query_param("matricNumber", "ND99999")
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mail_failure_keeps_code() {
        let (server, db) = setup_test_app_with_failing_mailer().await;
        create_student(&server, "ada@x.com", "ND22001").await;

        let response = server
            .get("/students/access/request")
            .add_query_param("matricNumber", "ND22001")
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(
            body["errorMessage"],
            "An error occurred while trying to send a validation email."
        );

        let stored = Student::find()
            .filter(student::Column::MatricNo.eq("ND22001"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        let code = stored.access_code.expect("code should be stored");

        let response = server
            .get("/students/access/verify")
            .add_query_param("matricNumber", "ND22001")
            .add_query_param("accessCode", code)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fetch_course_and_lecturer() {
        let TestApp { server, .. } = setup_test_app().await;
        let room = classroom(&server).await;
        create_lecturer(&server, "idle@x.com", "Idle", "One").await;

        let response = server.get(&format!("/courses/{}", room.course_id)).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"]["courseCode"], "CSC101");
        assert_eq!(body["result"]["lecturers"][0]["id"], room.lecturer_id.as_str());

        let response = server.get("/courses/unknown").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get(&format!("/lecturers/{}", room.lecturer_id)).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"]["courses"][0]["courseId"], room.course_id.as_str());

        let response = server
            .get("/lecturers/by-email")
            .add_query_param("email", "idle@x.com")
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert!(body["result"]["courses"].is_null());

        let response = server.get("/lecturers/by-email").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = server.get("/lecturers").await.json();
        assert_eq!(body["result"].as_array().unwrap().len(), 2);

        let body: Value = server.get("/courses").await.json();
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_students_and_photo() {
        let TestApp { server, .. } = setup_test_app().await;
        let student_id = create_student(&server, "ada@x.com", "ND22001").await;

        let response = server.get("/students/ND22001").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["result"]["email"], "ada@x.com");
        assert!(body["result"].get("accessCode").is_none());

        let response = server.get("/students/ND00000").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/students/photo")
            .json(&json!({ "id": student_id, "encodedPhoto": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["errorMessage"],
            "This operation require a student's photo base 64 encoded format."
        );

        let response = server
            .post("/students/photo")
            .json(&json!({ "id": "nobody", "encodedPhoto": "aGVsbG8=" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body = post_ok(
            &server,
            "/students/photo",
            json!({ "id": student_id, "encodedPhoto": "aGVsbG8=" }),
        )
        .await;
        assert_eq!(body["result"]["photo"], "aGVsbG8=");

        let body: Value = server.get("/students").await.json();
        assert_eq!(body["result"][0]["photo"], "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_lecture_attendees_are_filtered_by_lecture() {
        let TestApp { server, .. } = setup_test_app().await;
        let room = classroom(&server).await;
        let other = create_lecture(&server, &room.lecturer_id, &room.course_id).await;
        let other_id = other["result"]["id"].as_str().unwrap().to_string();

        post_ok(
            &server,
            "/attendance",
            json!({ "matricNo": "ND22001", "lectureId": room.lecture_id }),
        )
        .await;

        let body: Value = server
            .get(&format!("/lectures/{}/attendees", room.lecture_id))
            .await
            .json();
        let attendees = body["result"].as_array().unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0]["matricNo"], "ND22001");

        let body: Value = server.get(&format!("/lectures/{}/attendees", other_id)).await.json();
        assert!(body["result"].as_array().unwrap().is_empty());

        let response = server.get("/lectures/missing/attendees").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lecturer_attendance_records() {
        let TestApp { server, .. } = setup_test_app().await;
        let room = classroom(&server).await;
        create_lecture(&server, &room.lecturer_id, &room.course_id).await;
        post_ok(
            &server,
            "/attendance",
            json!({ "matricNo": "ND22001", "lectureId": room.lecture_id }),
        )
        .await;

        let response = server
            .get(&format!("/lecturers/{}/attendance-records", room.lecturer_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let courses = body["result"]["courses"].as_array().unwrap();
        assert_eq!(courses.len(), 1);
        let lectures = courses[0]["lectures"].as_array().unwrap();
        assert_eq!(lectures.len(), 2);
        assert_eq!(lectures[0]["id"], room.lecture_id.as_str());
        assert_eq!(lectures[0]["attendees"].as_array().unwrap().len(), 1);
        assert!(lectures[1]["attendees"].as_array().unwrap().is_empty());

        let response = server.get("/lecturers/nobody/attendance-records").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ranking_reports() {
        let TestApp { server, .. } = setup_test_app().await;
        let room = classroom(&server).await;
        let second = create_lecture(&server, &room.lecturer_id, &room.course_id).await;
        let second_id = second["result"]["id"].as_str().unwrap().to_string();

        let bola = create_student(&server, "bola@x.com", "ND22002").await;
        register(&server, &bola, &[&room.course_id]).await;
        create_course(&server, "MTH101", "Algebra").await;
        create_lecturer(&server, "idle@x.com", "Idle", "One").await;

        for (matric, lecture) in [
            ("ND22001", &room.lecture_id),
            ("ND22001", &second_id),
            ("ND22002", &second_id),
        ] {
            post_ok(&server, "/attendance", json!({ "matricNo": matric, "lectureId": lecture })).await;
        }

        let body: Value = server.get("/reports/students-ranking").await.json();
        let students = body["result"].as_array().unwrap();
        assert_eq!(students[0]["matricNo"], "ND22001");
        assert_eq!(students[0]["attendanceCount"], 2);
        assert_eq!(students[1]["attendanceCount"], 1);

        let body: Value = server.get("/reports/courses-ranking").await.json();
        let courses = body["result"].as_array().unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0]["courseCode"], "CSC101");
        assert_eq!(courses[0]["attendanceCount"], 3);
        assert_eq!(courses[1]["attendanceCount"], 0);

        let body: Value = server.get("/reports/lecturers-ranking").await.json();
        let lecturers = body["result"].as_array().unwrap();
        assert_eq!(lecturers[0]["lecturerId"], room.lecturer_id.as_str());
        assert_eq!(lecturers[0]["attendanceCount"], 3);
        assert_eq!(lecturers[1]["attendanceCount"], 0);
    }
}
