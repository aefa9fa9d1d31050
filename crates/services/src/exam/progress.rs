/// Aggregated view of exam progress, useful for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}
