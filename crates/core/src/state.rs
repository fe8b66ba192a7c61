use crate::types::ForensicCase;

/// The case list a front end works against, plus the current selection.
///
/// Cases are only ever replaced wholesale; nothing here edits a record in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseBook {
    cases: Vec<ForensicCase>,
    current: Option<String>,
}

impl CaseBook {
    pub fn new(cases: Vec<ForensicCase>) -> Self {
        Self {
            cases,
            current: None,
        }
    }

    pub fn cases(&self) -> &[ForensicCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, case_id: &str) -> Option<&ForensicCase> {
        self.cases.iter().find(|c| c.case_id == case_id)
    }

    /// Inserts a new case or replaces the one with the same id in place.
    /// Returns true when an existing case was replaced.
    pub fn add_case(&mut self, case: ForensicCase) -> bool {
        match self.cases.iter().position(|c| c.case_id == case.case_id) {
            Some(idx) => {
                self.cases[idx] = case;
                true
            }
            None => {
                self.cases.push(case);
                false
            }
        }
    }

    pub fn remove_case(&mut self, case_id: &str) -> Option<ForensicCase> {
        let idx = self.cases.iter().position(|c| c.case_id == case_id)?;
        if self.current.as_deref() == Some(case_id) {
            self.current = None;
        }
        Some(self.cases.remove(idx))
    }

    /// Selects a known case. Unknown ids leave the selection untouched.
    pub fn select_case(&mut self, case_id: &str) -> Option<&ForensicCase> {
        let idx = self.cases.iter().position(|c| c.case_id == case_id)?;
        self.current = Some(case_id.to_string());
        self.cases.get(idx)
    }

    pub fn current_case(&self) -> Option<&ForensicCase> {
        self.current.as_deref().and_then(|id| self.get(id))
    }
}
