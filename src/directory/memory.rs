use crate::{
    auth::Identity,
    data::student::{Student, StudentDraft, StudentId},
    directory::DirectoryBackend,
    error::{RosterResult, StudentNotFoundSnafu},
};
use async_trait::async_trait;
use snafu::OptionExt;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug)]
struct Roster {
    next_id: StudentId,
    //ids only ever grow, so key order is insertion order
    students: BTreeMap<StudentId, Student>,
}

/// In-process directory, used when no remote directory is configured.
#[derive(Debug)]
pub struct MemoryDirectory {
    roster: Mutex<Roster>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self {
            roster: Mutex::new(Roster {
                next_id: 1,
                students: BTreeMap::new(),
            }),
        }
    }
}

impl MemoryDirectory {
    #[cfg(test)]
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let students: BTreeMap<_, _> = students.into_iter().map(|s| (s.id, s)).collect();
        let next_id = students.keys().max().map_or(1, |max| max + 1);
        Self {
            roster: Mutex::new(Roster { next_id, students }),
        }
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Vec<Student> {
        self.roster.lock().await.students.values().cloned().collect()
    }
}

#[async_trait]
impl DirectoryBackend for MemoryDirectory {
    async fn get_students(&self, caller: &Identity) -> RosterResult<Vec<Student>> {
        let roster = self.roster.lock().await;
        trace!(principal = %caller.principal, count = roster.students.len(), "Listing students");
        Ok(roster.students.values().cloned().collect())
    }

    async fn add_student(&self, caller: &Identity, draft: &StudentDraft) -> RosterResult<()> {
        let mut roster = self.roster.lock().await;
        let id = roster.next_id;
        roster.next_id += 1;
        roster.students.insert(
            id,
            Student {
                id,
                first_name: draft.first_name.clone(),
                last_name: draft.last_name.clone(),
                school: draft.school,
            },
        );
        debug!(principal = %caller.principal, id, "Added student");
        Ok(())
    }

    async fn update_student(
        &self,
        caller: &Identity,
        id: StudentId,
        draft: &StudentDraft,
    ) -> RosterResult<()> {
        let mut roster = self.roster.lock().await;
        let student = roster
            .students
            .get_mut(&id)
            .context(StudentNotFoundSnafu { id })?;
        student.first_name.clone_from(&draft.first_name);
        student.last_name.clone_from(&draft.last_name);
        student.school = draft.school;
        debug!(principal = %caller.principal, id, "Updated student");
        Ok(())
    }

    async fn delete_student(&self, caller: &Identity, id: StudentId) -> RosterResult<()> {
        self.roster
            .lock()
            .await
            .students
            .remove(&id)
            .context(StudentNotFoundSnafu { id })?;
        debug!(principal = %caller.principal, id, "Deleted student");
        Ok(())
    }
}
