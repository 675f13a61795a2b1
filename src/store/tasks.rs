//! Tasks that staff complete for points, and their submissions

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::review::{self, ReviewStatus, ReviewTrail};
use crate::store::types::{next_id, today, Actor, Role};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(StoreError::invalid("Неверная сложность")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub detailed_description: String,
    pub points: i64,
    pub difficulty: Difficulty,
    pub requirements: Vec<String>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub detailed_description: String,
    pub points: i64,
    pub difficulty: Difficulty,
    /// One requirement per line
    pub requirements: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub id: u64,
    pub task_id: u64,
    pub user_id: u64,
    pub user_role: Role,
    pub user_name: String,
    pub title: String,
    pub submitted_at: String,
    pub status: ReviewStatus,
    pub proof: String,
    pub comment: Option<String>,
    #[serde(flatten)]
    pub review: ReviewTrail,
}

/// Who submits and what they attach as evidence
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub user_id: u64,
    pub user_role: Role,
    pub user_name: String,
    pub proof: String,
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    submissions: Vec<TaskSubmission>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn active(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.active).cloned().collect()
    }

    pub fn submissions(&self, user_id: Option<u64>) -> Vec<TaskSubmission> {
        self.submissions
            .iter()
            .filter(|s| user_id.map_or(true, |id| s.user_id == id))
            .cloned()
            .collect()
    }

    pub fn pending_submissions(&self) -> usize {
        self.submissions
            .iter()
            .filter(|s| s.status == ReviewStatus::Pending)
            .count()
    }

    pub fn create(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::invalid("Не указано название задания"));
        }
        if draft.points <= 0 {
            return Err(StoreError::invalid("Количество баллов должно быть положительным"));
        }

        let task = Task {
            id: next_id(self.tasks.iter().map(|t| t.id)),
            title: draft.title,
            description: draft.description,
            detailed_description: draft.detailed_description,
            points: draft.points,
            difficulty: draft.difficulty,
            requirements: split_requirements(&draft.requirements),
            active: true,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn submit(&mut self, task_id: u64, draft: SubmissionDraft) -> StoreResult<TaskSubmission> {
        let task = self.get(task_id).ok_or(StoreError::NotFound(Entity::Task))?;
        if draft.proof.trim().is_empty() {
            return Err(StoreError::invalid("Не указаны доказательства"));
        }

        let submission = TaskSubmission {
            id: next_id(self.submissions.iter().map(|s| s.id)),
            task_id,
            user_id: draft.user_id,
            user_role: draft.user_role,
            user_name: draft.user_name,
            title: task.title.clone(),
            submitted_at: today(),
            status: ReviewStatus::Pending,
            proof: draft.proof,
            comment: draft.comment,
            review: ReviewTrail::default(),
        };
        self.submissions.push(submission.clone());
        Ok(submission)
    }

    pub fn approve(&mut self, submission_id: u64, reviewer: &Actor) -> StoreResult<TaskSubmission> {
        let submission = self.submission_mut(submission_id)?;
        review::approve(
            &mut submission.status,
            &mut submission.review,
            reviewer,
            Entity::Submission,
        )?;
        Ok(submission.clone())
    }

    pub fn reject(
        &mut self,
        submission_id: u64,
        reviewer: &Actor,
        reason: Option<String>,
    ) -> StoreResult<TaskSubmission> {
        let submission = self.submission_mut(submission_id)?;
        review::reject(
            &mut submission.status,
            &mut submission.review,
            reviewer,
            reason,
            Entity::Submission,
        )?;
        Ok(submission.clone())
    }

    fn submission_mut(&mut self, id: u64) -> StoreResult<&mut TaskSubmission> {
        self.submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(Entity::Submission))
    }

    pub(crate) fn insert_seed_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub(crate) fn insert_seed_submission(&mut self, submission: TaskSubmission) {
        self.submissions.push(submission);
    }
}

/// Split newline-separated requirements, dropping blank lines
pub fn split_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
