use crate::error::{EmptyFieldSnafu, RosterError, RosterResult, UnknownSchoolSnafu};
use maud::{Markup, Render, html};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Assigned by the directory when a student is created, never by us.
pub type StudentId = u64;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum School {
    #[default]
    #[serde(rename = "IPRC-NGOMA")]
    Ngoma,
    #[serde(rename = "IPRC-MUSANZE")]
    Musanze,
    #[serde(rename = "IPRC-TUMBA")]
    Tumba,
}

impl School {
    pub const ALL: [Self; 3] = [Self::Ngoma, Self::Musanze, Self::Tumba];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ngoma => "IPRC-NGOMA",
            Self::Musanze => "IPRC-MUSANZE",
            Self::Tumba => "IPRC-TUMBA",
        }
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for School {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|school| school.as_str() == s)
            .ok_or_else(|| UnknownSchoolSnafu { original: s }.build())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub school: School,
}

impl Render for Student {
    fn render(&self) -> Markup {
        html! {
            (self.first_name) " " (self.last_name) " - " (self.school)
        }
    }
}

/// The in-progress record behind the add/edit form. Has no id until the
/// directory persists it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub school: School,
}

impl StudentDraft {
    pub fn ensure_complete(&self) -> RosterResult<()> {
        snafu::ensure!(
            !self.first_name.trim().is_empty(),
            EmptyFieldSnafu {
                field: "First name"
            }
        );
        snafu::ensure!(
            !self.last_name.trim().is_empty(),
            EmptyFieldSnafu { field: "Last name" }
        );
        Ok(())
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            school: student.school,
        }
    }
}
