#![forbid(unsafe_code)]

pub mod error;
pub mod exam;

pub use exam_core::Clock;

pub use error::{ExamError, ExamSection};
pub use exam::{
    ExamFlow, ExamPlan, ExamPlanner, ExamProgress, ExamSession, ExamStepResult, ExamTimer,
    RECENT_EXAM_LIMIT, RecentExams, TimerEvent,
};
