/// Step change requested by a handler.
///
/// Returned as `Ok(Some(..))` from a handler; `Ok(None)` leaves the stored
/// step untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    AdvanceTo(String),
    End,
    /// End this conversation and apply the inner transition to the parent.
    EndToParent(Box<Transition>),
}

impl Transition {
    pub fn advance_to(step: impl Into<String>) -> Self {
        Transition::AdvanceTo(step.into())
    }

    pub fn end() -> Self {
        Transition::End
    }

    pub fn end_to_parent(parent: Transition) -> Self {
        Transition::EndToParent(Box::new(parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(
            Transition::advance_to("next"),
            Transition::AdvanceTo("next".to_string())
        );
        assert_eq!(
            Transition::end_to_parent(Transition::end()),
            Transition::EndToParent(Box::new(Transition::End))
        );
    }
}
