use crate::data::student::{School, StudentDraft, StudentId};
use serde::Deserialize;

pub mod student;

#[derive(Deserialize)]
pub struct IdForm {
    pub id: StudentId,
}

/// What the add/edit form posts back. Field names follow the html inputs.
#[derive(Deserialize, Debug)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub school: School,
}

impl From<StudentForm> for StudentDraft {
    fn from(StudentForm { first_name, last_name, school }: StudentForm) -> Self {
        Self {
            first_name,
            last_name,
            school,
        }
    }
}
