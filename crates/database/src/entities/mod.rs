pub mod courses;
pub mod degree_course_objectives;
pub mod degree_courses;
pub mod degrees;
pub mod evaluations;
pub mod instructors;
pub mod objectives;
pub mod sections;
pub mod semesters;
