use crate::{
    entities::{
        courses, degree_course_objectives, degree_courses, degrees, evaluations, instructors,
        objectives, sections, semesters,
    },
    error::{Missing, MutationError, MutationResult, Rule},
    services::invariants::{
        DegreeCurriculum, check_capacity, check_enrollment_change, check_unreferenced,
        lock_section, lock_section_evaluations,
    },
};
use log::debug;
use models::{
    evaluation::EvaluationFields,
    keys::{DcoKey, DegreeCourseKey, DegreeKey, EvaluationKey},
    mutation::{
        CourseInput, CourseLink, DegreeInput, EvaluationInput, InstructorInput, Mutation,
        ObjectiveInput, SectionInput,
    },
    term::Semester,
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select, sea_query::OnConflict,
};

/// Applies a parsed mutation on an open transaction.
///
/// Nothing here commits or rolls back; that belongs to the coordinator.
pub struct MutationService;

impl MutationService {
    pub async fn apply<C: ConnectionTrait>(conn: &C, mutation: &Mutation) -> MutationResult<()> {
        match mutation {
            Mutation::UpsertDegree(input) => Self::upsert_degree(conn, input).await,
            Mutation::DeleteDegree(key) => Self::delete_degree(conn, key).await,
            Mutation::UpsertCourse(input) => Self::upsert_course(conn, input).await,
            Mutation::DeleteCourse { course_no } => Self::delete_course(conn, course_no).await,
            Mutation::UpsertInstructor(input) => Self::upsert_instructor(conn, input).await,
            Mutation::DeleteInstructor { instructor_id } => {
                Self::delete_instructor(conn, instructor_id).await
            }
            Mutation::UpsertSemester(semester) => Self::upsert_semester(conn, semester).await,
            Mutation::DeleteSemester(semester) => Self::delete_semester(conn, semester).await,
            Mutation::UpsertObjective(input) => Self::upsert_objective(conn, input).await,
            Mutation::DeleteObjective { code } => Self::delete_objective(conn, code).await,
            Mutation::LinkCourseToDegree(link) => Self::link_course(conn, link).await,
            Mutation::UnlinkCourseFromDegree(key) => Self::unlink_course(conn, key).await,
            Mutation::LinkObjectiveToCourse(key) => Self::link_objective(conn, key).await,
            Mutation::UnlinkObjectiveFromCourse(key) => Self::unlink_objective(conn, key).await,
            Mutation::UpsertSection(input) => Self::upsert_section(conn, input).await,
            Mutation::RecordEvaluation(input) => Self::record_evaluation(conn, input).await,
            Mutation::CopyEvaluation {
                source,
                destination,
            } => Self::copy_evaluation(conn, source, destination).await,
        }
    }

    async fn upsert_degree<C: ConnectionTrait>(conn: &C, input: &DegreeInput) -> MutationResult<()> {
        let degree = degrees::ActiveModel {
            name: Set(input.key.name.clone()),
            level: Set(input.key.level.clone()),
            description: Set(input.description.clone()),
        };

        degrees::Entity::insert(degree)
            .on_conflict(
                OnConflict::columns([degrees::Column::Name, degrees::Column::Level])
                    .update_column(degrees::Column::Description)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Removes the degree together with every row scoped to it
    async fn delete_degree<C: ConnectionTrait>(conn: &C, key: &DegreeKey) -> MutationResult<()> {
        fetch_or(
            conn,
            degrees::Entity::find_by_id(degree_id(key)).lock_exclusive(),
            Missing::Degree(key.clone()),
        )
        .await?;

        // Lock the curriculum before touching it so concurrent link checks queue
        DegreeCurriculum::lock(conn, key).await?;

        let evaluations = evaluations::Entity::delete_many()
            .filter(evaluations::Column::Name.eq(key.name.as_str()))
            .filter(evaluations::Column::Level.eq(key.level.as_str()))
            .exec(conn)
            .await?;
        let objectives = degree_course_objectives::Entity::delete_many()
            .filter(degree_course_objectives::Column::Name.eq(key.name.as_str()))
            .filter(degree_course_objectives::Column::Level.eq(key.level.as_str()))
            .exec(conn)
            .await?;
        let courses = degree_courses::Entity::delete_many()
            .filter(degree_courses::Column::Name.eq(key.name.as_str()))
            .filter(degree_courses::Column::Level.eq(key.level.as_str()))
            .exec(conn)
            .await?;

        debug!(
            "Deleting degree {key} with {} course links, {} objective links and {} evaluations",
            courses.rows_affected, objectives.rows_affected, evaluations.rows_affected
        );

        degrees::Entity::delete_by_id(degree_id(key))
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn upsert_course<C: ConnectionTrait>(conn: &C, input: &CourseInput) -> MutationResult<()> {
        let course = courses::ActiveModel {
            course_no: Set(input.course_no.clone()),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
        };

        courses::Entity::insert(course)
            .on_conflict(
                OnConflict::column(courses::Column::CourseNo)
                    .update_columns([courses::Column::Title, courses::Column::Description])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn delete_course<C: ConnectionTrait>(conn: &C, course_no: &str) -> MutationResult<()> {
        fetch_or(
            conn,
            courses::Entity::find_by_id(course_no.to_owned()).lock_exclusive(),
            Missing::Course(course_no.to_owned()),
        )
        .await?;

        let links = degree_courses::Entity::find()
            .filter(degree_courses::Column::CourseNo.eq(course_no))
            .count(conn)
            .await?;
        check_unreferenced(|| format!("Course {course_no}"), "degree curricula", links)?;

        let offerings = sections::Entity::find()
            .filter(sections::Column::CourseNo.eq(course_no))
            .count(conn)
            .await?;
        check_unreferenced(|| format!("Course {course_no}"), "sections", offerings)?;

        courses::Entity::delete_by_id(course_no.to_owned())
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn upsert_instructor<C: ConnectionTrait>(
        conn: &C,
        input: &InstructorInput,
    ) -> MutationResult<()> {
        let instructor = instructors::ActiveModel {
            instructor_id: Set(input.instructor_id.clone()),
            name: Set(input.name.clone()),
        };

        instructors::Entity::insert(instructor)
            .on_conflict(
                OnConflict::column(instructors::Column::InstructorId)
                    .update_column(instructors::Column::Name)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn delete_instructor<C: ConnectionTrait>(
        conn: &C,
        instructor_id: &str,
    ) -> MutationResult<()> {
        fetch_or(
            conn,
            instructors::Entity::find_by_id(instructor_id.to_owned()).lock_exclusive(),
            Missing::Instructor(instructor_id.to_owned()),
        )
        .await?;

        let taught = sections::Entity::find()
            .filter(sections::Column::InstructorId.eq(instructor_id))
            .count(conn)
            .await?;
        check_unreferenced(|| format!("Instructor {instructor_id}"), "sections", taught)?;

        instructors::Entity::delete_by_id(instructor_id.to_owned())
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn upsert_semester<C: ConnectionTrait>(
        conn: &C,
        semester: &Semester,
    ) -> MutationResult<()> {
        let row = semesters::ActiveModel {
            year: Set(semester.year),
            term: Set(semester.term.as_str().to_owned()),
        };

        semesters::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([semesters::Column::Year, semesters::Column::Term])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn delete_semester<C: ConnectionTrait>(
        conn: &C,
        semester: &Semester,
    ) -> MutationResult<()> {
        fetch_or(
            conn,
            semesters::Entity::find_by_id(semester_id(semester)).lock_exclusive(),
            Missing::Semester(*semester),
        )
        .await?;

        let offered = sections::Entity::find()
            .filter(sections::Column::Year.eq(semester.year))
            .filter(sections::Column::Term.eq(semester.term))
            .count(conn)
            .await?;
        check_unreferenced(|| format!("Semester {semester}"), "sections", offered)?;

        semesters::Entity::delete_by_id(semester_id(semester))
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn upsert_objective<C: ConnectionTrait>(
        conn: &C,
        input: &ObjectiveInput,
    ) -> MutationResult<()> {
        let objective = objectives::ActiveModel {
            code: Set(input.code.clone()),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
        };

        objectives::Entity::insert(objective)
            .on_conflict(
                OnConflict::column(objectives::Column::Code)
                    .update_columns([objectives::Column::Title, objectives::Column::Description])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn delete_objective<C: ConnectionTrait>(conn: &C, code: &str) -> MutationResult<()> {
        fetch_or(
            conn,
            objectives::Entity::find_by_id(code.to_owned()).lock_exclusive(),
            Missing::Objective(code.to_owned()),
        )
        .await?;

        let links = degree_course_objectives::Entity::find()
            .filter(degree_course_objectives::Column::ObjectiveCode.eq(code))
            .count(conn)
            .await?;
        check_unreferenced(|| format!("Objective {code}"), "degree curricula", links)?;

        objectives::Entity::delete_by_id(code.to_owned())
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Inserts or re-flags a course in a degree, guarding both directions of
    /// the core flag
    async fn link_course<C: ConnectionTrait>(conn: &C, link: &CourseLink) -> MutationResult<()> {
        let key = &link.key;

        fetch_or(
            conn,
            degrees::Entity::find_by_id(degree_id(&key.degree)).lock_shared(),
            Missing::Degree(key.degree.clone()),
        )
        .await?;
        fetch_or(
            conn,
            courses::Entity::find_by_id(key.course_no.clone()).lock_shared(),
            Missing::Course(key.course_no.clone()),
        )
        .await?;

        let curriculum = DegreeCurriculum::lock(conn, &key.degree).await?;
        if link.is_core {
            curriculum.check_promotion(&key.course_no)?;
        } else {
            curriculum.check_demotion(&key.course_no)?;
        }

        let row = degree_courses::ActiveModel {
            name: Set(key.degree.name.clone()),
            level: Set(key.degree.level.clone()),
            course_no: Set(key.course_no.clone()),
            is_core: Set(link.is_core),
        };

        degree_courses::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    degree_courses::Column::Name,
                    degree_courses::Column::Level,
                    degree_courses::Column::CourseNo,
                ])
                .update_column(degree_courses::Column::IsCore)
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Removes a course from a degree along with its objective links and the
    /// evaluations recorded against them
    async fn unlink_course<C: ConnectionTrait>(
        conn: &C,
        key: &DegreeCourseKey,
    ) -> MutationResult<()> {
        let curriculum = DegreeCurriculum::lock(conn, &key.degree).await?;
        if curriculum.course(&key.course_no).is_none() {
            return Err(Missing::DegreeCourse(key.clone()).into());
        }
        curriculum.check_course_removal(&key.course_no)?;

        evaluations::Entity::delete_many()
            .filter(evaluations::Column::Name.eq(key.degree.name.as_str()))
            .filter(evaluations::Column::Level.eq(key.degree.level.as_str()))
            .filter(evaluations::Column::CourseNo.eq(key.course_no.as_str()))
            .exec(conn)
            .await?;
        degree_course_objectives::Entity::delete_many()
            .filter(degree_course_objectives::Column::Name.eq(key.degree.name.as_str()))
            .filter(degree_course_objectives::Column::Level.eq(key.degree.level.as_str()))
            .filter(degree_course_objectives::Column::CourseNo.eq(key.course_no.as_str()))
            .exec(conn)
            .await?;
        degree_courses::Entity::delete_by_id((
            key.degree.name.clone(),
            key.degree.level.clone(),
            key.course_no.clone(),
        ))
        .exec(conn)
        .await?;
        Ok(())
    }

    async fn link_objective<C: ConnectionTrait>(conn: &C, key: &DcoKey) -> MutationResult<()> {
        let objective = objectives::Entity::find_by_id(key.objective_code.clone())
            .lock_shared()
            .one(conn)
            .await?;
        let curriculum = DegreeCurriculum::lock(conn, key.degree()).await?;

        if curriculum.course(key.course_no()).is_none() {
            return Err(Missing::DegreeCourse(key.degree_course.clone()).into());
        }
        if objective.is_none() {
            return Err(Missing::Objective(key.objective_code.clone()).into());
        }

        degree_course_objectives::Entity::insert(dco_model(key))
            .on_conflict(
                OnConflict::columns([
                    degree_course_objectives::Column::Name,
                    degree_course_objectives::Column::Level,
                    degree_course_objectives::Column::CourseNo,
                    degree_course_objectives::Column::ObjectiveCode,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn unlink_objective<C: ConnectionTrait>(conn: &C, key: &DcoKey) -> MutationResult<()> {
        let curriculum = DegreeCurriculum::lock(conn, key.degree()).await?;
        if !curriculum.has_objective_link(key) {
            return Err(Missing::DegreeCourseObjective(key.clone()).into());
        }
        curriculum.check_objective_removal(key)?;

        evaluations::Entity::delete_many()
            .filter(evaluations::Column::Name.eq(key.degree().name.as_str()))
            .filter(evaluations::Column::Level.eq(key.degree().level.as_str()))
            .filter(evaluations::Column::CourseNo.eq(key.course_no()))
            .filter(evaluations::Column::ObjectiveCode.eq(key.objective_code.as_str()))
            .exec(conn)
            .await?;
        degree_course_objectives::Entity::delete_by_id((
            key.degree().name.clone(),
            key.degree().level.clone(),
            key.course_no().to_owned(),
            key.objective_code.clone(),
        ))
        .exec(conn)
        .await?;
        Ok(())
    }

    async fn upsert_section<C: ConnectionTrait>(
        conn: &C,
        input: &SectionInput,
    ) -> MutationResult<()> {
        let key = &input.key;

        fetch_or(
            conn,
            courses::Entity::find_by_id(key.course_no.clone()).lock_shared(),
            Missing::Course(key.course_no.clone()),
        )
        .await?;
        fetch_or(
            conn,
            semesters::Entity::find_by_id(semester_id(&key.semester())).lock_shared(),
            Missing::Semester(key.semester()),
        )
        .await?;
        fetch_or(
            conn,
            instructors::Entity::find_by_id(input.instructor_id.clone()).lock_shared(),
            Missing::Instructor(input.instructor_id.clone()),
        )
        .await?;

        lock_section(conn, key).await?;
        let recorded = lock_section_evaluations(conn, key).await?;
        check_enrollment_change(&recorded, input.enrolled_count)?;

        let section = sections::ActiveModel {
            course_no: Set(key.course_no.clone()),
            year: Set(key.year),
            term: Set(key.term.as_str().to_owned()),
            section_no: Set(key.section_no.clone()),
            instructor_id: Set(input.instructor_id.clone()),
            enrolled_count: Set(input.enrolled_count),
        };

        sections::Entity::insert(section)
            .on_conflict(
                OnConflict::columns([
                    sections::Column::CourseNo,
                    sections::Column::Year,
                    sections::Column::Term,
                    sections::Column::SectionNo,
                ])
                .update_columns([sections::Column::InstructorId, sections::Column::EnrolledCount])
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    async fn record_evaluation<C: ConnectionTrait>(
        conn: &C,
        input: &EvaluationInput,
    ) -> MutationResult<()> {
        let key = &input.key;

        let curriculum = DegreeCurriculum::lock(conn, &key.degree).await?;
        let section = lock_section(conn, &key.section)
            .await?
            .ok_or_else(|| Missing::Section(key.section.clone()))?;

        let dco = key.dco();
        if !curriculum.has_objective_link(&dco) {
            return Err(MutationError::InvalidObjective(dco));
        }
        check_capacity(&input.fields.counts, section.enrolled_count)?;

        Self::write_evaluation(conn, key, &input.fields).await
    }

    /// Duplicates an evaluation, nulls included, under another degree that
    /// assesses the same objective in the same course
    async fn copy_evaluation<C: ConnectionTrait>(
        conn: &C,
        source: &EvaluationKey,
        destination: &DegreeKey,
    ) -> MutationResult<()> {
        let recorded = evaluations::Entity::find_by_id(evaluation_id(source))
            .one(conn)
            .await?
            .ok_or_else(|| Missing::Evaluation(source.clone()))?;

        let target = source.for_degree(destination.clone());
        let curriculum = DegreeCurriculum::lock(conn, destination).await?;
        if !curriculum.has_objective_link(&target.dco()) {
            return Err(Rule::DestinationLacksObjective.into());
        }

        Self::write_evaluation(conn, &target, &recorded.fields()).await
    }

    async fn write_evaluation<C: ConnectionTrait>(
        conn: &C,
        key: &EvaluationKey,
        fields: &EvaluationFields,
    ) -> MutationResult<()> {
        let evaluation = evaluations::ActiveModel {
            course_no: Set(key.section.course_no.clone()),
            year: Set(key.section.year),
            term: Set(key.section.term.as_str().to_owned()),
            section_no: Set(key.section.section_no.clone()),
            name: Set(key.degree.name.clone()),
            level: Set(key.degree.level.clone()),
            objective_code: Set(key.objective_code.clone()),
            method_label: Set(fields.method_label.clone()),
            a_count: Set(fields.counts.a),
            b_count: Set(fields.counts.b),
            c_count: Set(fields.counts.c),
            f_count: Set(fields.counts.f),
            improvement_text: Set(fields.improvement_text.clone()),
        };

        evaluations::Entity::insert(evaluation)
            .on_conflict(
                OnConflict::columns([
                    evaluations::Column::CourseNo,
                    evaluations::Column::Year,
                    evaluations::Column::Term,
                    evaluations::Column::SectionNo,
                    evaluations::Column::Name,
                    evaluations::Column::Level,
                    evaluations::Column::ObjectiveCode,
                ])
                .update_columns([
                    evaluations::Column::MethodLabel,
                    evaluations::Column::ACount,
                    evaluations::Column::BCount,
                    evaluations::Column::CCount,
                    evaluations::Column::FCount,
                    evaluations::Column::ImprovementText,
                ])
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}

/// Runs `select` and maps an empty result to `missing`
async fn fetch_or<C, E>(conn: &C, select: Select<E>, missing: Missing) -> MutationResult<E::Model>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    select
        .one(conn)
        .await?
        .ok_or_else(|| MutationError::NotFound(missing))
}

fn degree_id(key: &DegreeKey) -> (String, String) {
    (key.name.clone(), key.level.clone())
}

fn semester_id(semester: &Semester) -> (i32, String) {
    (semester.year, semester.term.as_str().to_owned())
}

fn evaluation_id(key: &EvaluationKey) -> (String, i32, String, String, String, String, String) {
    (
        key.section.course_no.clone(),
        key.section.year,
        key.section.term.as_str().to_owned(),
        key.section.section_no.clone(),
        key.degree.name.clone(),
        key.degree.level.clone(),
        key.objective_code.clone(),
    )
}

fn dco_model(key: &DcoKey) -> degree_course_objectives::ActiveModel {
    degree_course_objectives::ActiveModel {
        name: Set(key.degree().name.clone()),
        level: Set(key.degree().level.clone()),
        course_no: Set(key.course_no().to_owned()),
        objective_code: Set(key.objective_code.clone()),
    }
}
