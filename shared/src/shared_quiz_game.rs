use crate::constants::QUIZ_FEEDBACK_MS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizOffer {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// One question with a single right answer, as the page supplies it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub correct_feedback: String,
    pub incorrect_feedback: String,
    #[serde(default)]
    pub offer: Option<QuizOffer>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizError {
    EmptyQuiz,
    NoSuchOption(usize),
    NothingSelected,
    AlreadyAnswered,
    NoSuchQuestion(String),
    InvalidAnswer(String),
    StepIncomplete(usize),
    Finished,
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuiz => write!(f, "The quiz has no questions"),
            Self::NoSuchOption(index) => write!(f, "There is no answer {}", index),
            Self::NothingSelected => write!(f, "Pick an answer first"),
            Self::AlreadyAnswered => write!(f, "This question has already been answered"),
            Self::NoSuchQuestion(id) => write!(f, "Question '{}' is not on this step", id),
            Self::InvalidAnswer(id) => write!(f, "That is not a valid answer to '{}'", id),
            Self::StepIncomplete(step) => write!(f, "Answer every question on step {} to continue", step + 1),
            Self::Finished => write!(f, "The quiz is already finished"),
        }
    }
}

impl std::error::Error for QuizError {}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuizResult {
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub feedback: String,
    pub offer: Option<QuizOffer>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SingleQuiz {
    pub data: QuizQuestion,
    selected: Option<usize>,
    answered_at: Option<u64>,
    result: Option<QuizResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublicSingleQuiz {
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub answered: bool,
    pub is_correct: Option<bool>, // None until answered
    pub show_feedback: bool,
    pub result: Option<QuizResult>,
}

impl SingleQuiz {
    pub fn new(data: QuizQuestion) -> Result<Self, QuizError> {
        if data.options.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self {
            data,
            selected: None,
            answered_at: None,
            result: None,
        })
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }

    pub fn select(&mut self, option: usize) -> Result<(), QuizError> {
        if self.is_answered() {
            return Err(QuizError::AlreadyAnswered);
        }
        if option >= self.data.options.len() {
            return Err(QuizError::NoSuchOption(option));
        }
        self.selected = Some(option);
        Ok(())
    }

    /// Locks in the selected answer. Returns whether it was right.
    pub fn submit(&mut self, current_time: u64) -> Result<bool, QuizError> {
        if self.is_answered() {
            return Err(QuizError::AlreadyAnswered);
        }
        let index = self.selected.ok_or(QuizError::NothingSelected)?;
        let selected_answer = self.data.options[index].clone();
        let is_correct = selected_answer == self.data.correct_answer;
        let feedback = if is_correct {
            &self.data.correct_feedback
        } else {
            &self.data.incorrect_feedback
        };
        self.result = Some(QuizResult {
            question: self.data.question.clone(),
            selected_answer,
            correct_answer: self.data.correct_answer.clone(),
            is_correct,
            feedback: feedback.clone(),
            offer: self.data.offer.clone(),
        });
        self.answered_at = Some(current_time);
        Ok(is_correct)
    }

    pub fn show_feedback(&self, current_time: u64) -> bool {
        self.answered_at
            .map(|at| current_time.saturating_sub(at) < QUIZ_FEEDBACK_MS)
            .unwrap_or(false)
    }

    /// The result card, once the feedback has had its time on screen.
    pub fn result(&self, current_time: u64) -> Option<&QuizResult> {
        if self.is_answered() && !self.show_feedback(current_time) {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn retry(&mut self) {
        self.selected = None;
        self.answered_at = None;
        self.result = None;
    }

    pub fn to_public(&self, current_time: u64) -> PublicSingleQuiz {
        PublicSingleQuiz {
            question: self.data.question.clone(),
            options: self.data.options.clone(),
            selected: self.selected,
            answered: self.is_answered(),
            is_correct: self.result.as_ref().map(|r| r.is_correct),
            show_feedback: self.show_feedback(current_time),
            result: self.result(current_time).cloned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Radio,
    Image,
    Dropdown,
    Range,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

fn required_by_default() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StepQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub range: Option<RangeSpec>,
    #[serde(default = "required_by_default")]
    pub required: bool,
}

impl StepQuestion {
    fn accepts(&self, answer: &Answer) -> bool {
        match (self.kind, answer) {
            (QuestionKind::Range, Answer::Value(value)) => match self.range {
                Some(range) => value.is_finite() && *value >= range.min && *value <= range.max,
                None => value.is_finite(),
            },
            (QuestionKind::Range, Answer::Choice(_)) => false,
            (_, Answer::Choice(choice)) => {
                !choice.is_empty() && (self.options.is_empty() || self.options.contains(choice))
            }
            (_, Answer::Value(_)) => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuizStep {
    pub id: String,
    pub title: String,
    pub questions: Vec<StepQuestion>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Value(f64),
    Choice(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepAdvance {
    Advanced { step: usize },
    Finished { answers: HashMap<String, Answer> },
}

/// A questionnaire walked one step at a time. Matching the answers to
/// products is left to the page.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StepQuiz {
    pub steps: Vec<QuizStep>,
    current: usize,
    answers: HashMap<String, Answer>,
    finished: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublicStepQuiz {
    pub step: QuizStep,
    pub current_step: usize,
    pub total_steps: usize,
    pub progress_percent: f64,
    pub can_proceed: bool,
    pub answers: HashMap<String, Answer>,
    pub finished: bool,
}

impl StepQuiz {
    pub fn new(steps: Vec<QuizStep>) -> Result<Self, QuizError> {
        if steps.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self {
            steps,
            current: 0,
            answers: HashMap::new(),
            finished: false,
        })
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn answers(&self) -> &HashMap<String, Answer> {
        &self.answers
    }

    pub fn progress_percent(&self) -> f64 {
        (self.current + 1) as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn answer(&mut self, question_id: &str, answer: Answer) -> Result<(), QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        let question = self.steps[self.current]
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| QuizError::NoSuchQuestion(question_id.to_string()))?;
        if !question.accepts(&answer) {
            return Err(QuizError::InvalidAnswer(question_id.to_string()));
        }
        self.answers.insert(question_id.to_string(), answer);
        Ok(())
    }

    pub fn can_proceed(&self) -> bool {
        self.steps[self.current]
            .questions
            .iter()
            .filter(|q| q.required)
            .all(|q| self.answers.contains_key(&q.id))
    }

    pub fn next(&mut self) -> Result<StepAdvance, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if !self.can_proceed() {
            return Err(QuizError::StepIncomplete(self.current));
        }
        if self.current + 1 < self.steps.len() {
            self.current += 1;
            Ok(StepAdvance::Advanced { step: self.current })
        } else {
            self.finished = true;
            log::debug!("step quiz finished with {} answers", self.answers.len());
            Ok(StepAdvance::Finished {
                answers: self.answers.clone(),
            })
        }
    }

    /// Steps back, keeping the answers given so far.
    pub fn back(&mut self) -> Result<usize, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    pub fn retry(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.finished = false;
    }

    pub fn to_public(&self) -> PublicStepQuiz {
        PublicStepQuiz {
            step: self.steps[self.current].clone(),
            current_step: self.current,
            total_steps: self.steps.len(),
            progress_percent: self.progress_percent(),
            can_proceed: self.can_proceed(),
            answers: self.answers.clone(),
            finished: self.finished,
        }
    }
}
