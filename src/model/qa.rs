//! Question-answer pairs about an image.

use serde::{Deserialize, Serialize};
use super::{Image, Object};

/// A question with its answer and the objects each one mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub id: u64,
    pub image_id: u64,
    pub question: String,
    pub answer: String,
    pub question_objects: Vec<Object>,
    pub answer_objects: Vec<Object>,
}

/// All question-answer pairs of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQuestions {
    pub image: Image,
    pub qas: Vec<QuestionAnswer>,
}
