//! Request and response shapes exchanged with front-ends.
//!
//! Identifiers cross this boundary as strings; the service parses them.

use crate::model::student::Student;
use serde::{Deserialize, Serialize};

/// Candidate values for registering a new student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCreateRequest {
    pub name: String,
    pub surname: String,
    pub age: i32,
    #[serde(default)]
    pub grades: Vec<i32>,
}

/// Full replacement of an existing student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdateRequest {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: i32,
    #[serde(default)]
    pub grades: Vec<i32>,
}

/// Grades to append; must contain at least one grade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddGradesRequest {
    pub id: String,
    pub grades: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullNameRequest {
    pub name: String,
    pub surname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdRequest {
    pub id: String,
}

impl StudentIdRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Detailed student view returned by single-record operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grades: Vec<i32>,
    /// `None` when the student has no grades yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_grade: Option<f64>,
}

impl From<&Student> for StudentResponse {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            name: student.name.clone(),
            surname: student.surname.clone(),
            age: student.age,
            grades: student.grades.clone(),
            avg_grade: (!student.grades.is_empty()).then(|| student.average_grade()),
        }
    }
}

/// Summary row returned by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentListItem {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grades: Vec<i32>,
}

impl StudentListItem {
    pub fn from_student(student: &Student, include_grades: bool) -> Self {
        Self {
            id: student.id.to_string(),
            name: student.name.clone(),
            surname: student.surname.clone(),
            age: student.age,
            grades: if include_grades {
                student.grades.clone()
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageResponse {
    pub id: String,
    pub average: f64,
}
