//! Recipe session - the ordered step sequence and current position
//!
//! Single source of truth for step position. Navigation past either
//! boundary is a silent no-op; callers that need to know whether movement
//! occurred check the return value or the `is_first`/`is_last` predicates.

/// Sentinel text shown when a recipe carries no instructions
pub const NO_INSTRUCTIONS: &str = "No instructions available.";

/// Ordered instruction sequence with a cursor
#[derive(Debug, Clone)]
pub struct RecipeSession {
    name: String,
    steps: Vec<String>,
    current: usize,
}

impl RecipeSession {
    /// Create a session positioned on the first step
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            steps,
            current: 0,
        }
    }

    /// Recipe name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move to the next step; returns whether the cursor moved
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        tracing::debug!(step = self.current, "advanced");
        true
    }

    /// Move to the previous step; returns whether the cursor moved
    pub fn retreat(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        tracing::debug!(step = self.current, "retreated");
        true
    }

    /// Text of the current step, or [`NO_INSTRUCTIONS`] for an empty recipe
    #[must_use]
    pub fn current_step_text(&self) -> &str {
        self.steps
            .get(self.current)
            .map_or(NO_INSTRUCTIONS, String::as_str)
    }

    /// Zero-based index of the current step
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Number of steps in the recipe
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether the cursor is on the first step (true for an empty recipe)
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.current == 0
    }

    /// Whether the cursor is on the last step (true for an empty recipe)
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.steps.len() <= self.current + 1
    }
}
